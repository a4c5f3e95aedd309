//! Verse-reference line parser
//!
//! Turns lines shaped like `창1:1 태초에 ...` into [`ParsedVerse`] values.
//! Anything that does not fit the shape is skipped without an error: headers,
//! blank lines, and stray text are the common case in scraped source files.

use crate::books::Book;
use regex::Regex;
use std::sync::LazyLock;

/// Leading letters, `chapter:verse`, whitespace, then the verse text.
///
/// `\d` is Unicode-aware, so full-width and other decimal digits match too.
static VERSE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\p{L}+)(\d+):(\d+)\s+(.*)$").expect("verse line pattern is valid")
});

static DECIMAL_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d$").expect("decimal digit pattern is valid"));

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    DECIMAL_DIGIT.is_match(c.encode_utf8(&mut buf))
}

/// Numeric value of a Unicode decimal digit (`Nd`).
///
/// `Nd` code points come in contiguous runs of ten starting at zero, so the
/// value is the offset from the start of the run modulo ten.
fn digit_value(c: char) -> Option<u32> {
    if let Some(d) = c.to_digit(10) {
        return Some(d);
    }
    if !is_decimal_digit(c) {
        return None;
    }

    let mut start = c as u32;
    while let Some(prev) = start
        .checked_sub(1)
        .and_then(char::from_u32)
        .filter(|&p| is_decimal_digit(p))
    {
        start = prev as u32;
    }
    Some((c as u32 - start) % 10)
}

/// Parse a run of decimal digits from any script; `None` on overflow
fn parse_number(digits: &str) -> Option<u32> {
    digits.chars().try_fold(0u32, |acc, c| {
        acc.checked_mul(10)?.checked_add(digit_value(c)?)
    })
}

/// A single verse extracted from a source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVerse {
    pub book: Book,
    pub chapter: u32,
    pub verse: u32,
    /// Trimmed, never empty
    pub text: String,
}

/// Parse one raw line.
///
/// Returns `None` when the line has no leading reference, the abbreviation is
/// unknown, a number overflows `u32`, or the trimmed text is empty.
pub fn parse_line(line: &str) -> Option<ParsedVerse> {
    let line = line.trim_start_matches('\u{feff}').trim();
    let caps = VERSE_LINE.captures(line)?;

    let book = Book::from_abbreviation(&caps[1])?;
    let chapter = parse_number(&caps[2])?;
    let verse = parse_number(&caps[3])?;
    let text = caps[4].trim();

    if text.is_empty() {
        return None;
    }

    Some(ParsedVerse {
        book,
        chapter,
        verse,
        text: text.to_string(),
    })
}

/// Lazily parse every line of `content`, dropping the ones that don't parse
pub fn parse_lines(content: &str) -> impl Iterator<Item = ParsedVerse> + '_ {
    content.lines().filter_map(parse_line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(name: &str) -> Book {
        Book::from_name(name).unwrap()
    }

    #[test]
    fn test_parse_genesis() {
        let parsed = parse_line("창1:1 태초에 하나님이 천지를 창조하시니라").unwrap();
        assert_eq!(parsed.book, book("창세기"));
        assert_eq!(parsed.chapter, 1);
        assert_eq!(parsed.verse, 1);
        assert_eq!(parsed.text, "태초에 하나님이 천지를 창조하시니라");
    }

    #[test]
    fn test_longer_abbreviation_wins() {
        let parsed = parse_line("요일1:1 태초부터 있는 생명의 말씀에 관하여는").unwrap();
        assert_eq!(parsed.book.name(), "요한1서");
        assert_ne!(parsed.book, book("요한복음"));

        let parsed = parse_line("요3:16 하나님이 세상을 이처럼 사랑하사").unwrap();
        assert_eq!(parsed.book.name(), "요한복음");
    }

    #[test]
    fn test_two_letter_abbreviations() {
        let parsed = parse_line("삼상17:45 다윗이 블레셋 사람에게 이르되").unwrap();
        assert_eq!(parsed.book.name(), "사무엘상");
        assert_eq!((parsed.chapter, parsed.verse), (17, 45));
    }

    #[test]
    fn test_multi_digit_numbers() {
        let parsed = parse_line("시119:176 잃은 양 같이 내가 방황하오니").unwrap();
        assert_eq!(parsed.book.name(), "시편");
        assert_eq!((parsed.chapter, parsed.verse), (119, 176));

        let parsed = parse_line("창001:002 땅이 혼돈하고").unwrap();
        assert_eq!((parsed.chapter, parsed.verse), (1, 2));
    }

    #[test]
    fn test_fullwidth_and_other_script_digits() {
        let parsed = parse_line("창１:１ 태초에 하나님이").unwrap();
        assert_eq!(parsed.book.name(), "창세기");
        assert_eq!((parsed.chapter, parsed.verse), (1, 1));
        assert_eq!(parsed.text, "태초에 하나님이");

        let parsed = parse_line("시１１９:１７６ 잃은 양 같이").unwrap();
        assert_eq!((parsed.chapter, parsed.verse), (119, 176));

        // Mixed ASCII and full-width, then Arabic-Indic digits
        let parsed = parse_line("요3:１6 하나님이 세상을").unwrap();
        assert_eq!((parsed.chapter, parsed.verse), (3, 16));
        let parsed = parse_line("창\u{0662}:\u{0663} 하나님이").unwrap();
        assert_eq!((parsed.chapter, parsed.verse), (2, 3));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("0"), Some(0));
        assert_eq!(parse_number("４２"), Some(42));
        assert_eq!(parse_number("\u{1D7D8}\u{1D7E2}"), Some(0));
        assert_eq!(parse_number("４294967295"), Some(4_294_967_295));
        assert_eq!(parse_number("４294967296"), None);
        assert_eq!(parse_number("①"), None);
    }

    #[test]
    fn test_only_leading_reference_is_used() {
        let parsed = parse_line("마5:3 심령이 가난한 자는 (눅6:20 참조) 복이 있나니").unwrap();
        assert_eq!(parsed.book.name(), "마태복음");
        assert_eq!((parsed.chapter, parsed.verse), (5, 3));
        assert_eq!(parsed.text, "심령이 가난한 자는 (눅6:20 참조) 복이 있나니");
    }

    #[test]
    fn test_surrounding_whitespace_and_bom() {
        let parsed = parse_line("\u{feff}  창1:3   하나님이 이르시되 빛이 있으라  \r").unwrap();
        assert_eq!(parsed.verse, 3);
        assert_eq!(parsed.text, "하나님이 이르시되 빛이 있으라");
    }

    #[test]
    fn test_rejected_lines() {
        let rejected = [
            "",
            "   ",
            "창세기",
            "제 1 장",
            "창1:1",
            "창1:1    ",
            "창1:1태초에",
            "없1:1 알 수 없는 약어",
            "1:1 책 이름 없음",
            "창 1:1 공백이 있는 참조",
            "창1-1 잘못된 구분자",
            "창99999999999:1 너무 큰 장 번호",
            "창①:1 원문자 숫자",
            "창세기1:1 약어가 아닌 전체 이름",
        ];

        for line in rejected {
            assert!(parse_line(line).is_none(), "line should be rejected: {line:?}");
        }
    }

    #[test]
    fn test_parse_lines_skips_noise() {
        let content = "쉬운성경\n\n창1:1 태초에 하나님께서\n머리말\n창1:2 땅은 아무 모양도 없이\n";
        let verses: Vec<_> = parse_lines(content).collect();
        assert_eq!(verses.len(), 2);
        assert_eq!(verses[0].verse, 1);
        assert_eq!(verses[1].verse, 2);
    }
}
