//! Canonical book order and abbreviation table
//!
//! Both tables are fixed at compile time. A [`Book`] is a handle to a position
//! in [`CANONICAL_BOOKS`], so anything resolved through the abbreviation table
//! is guaranteed to have a place in the output order.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Number of books in the canonical order
pub const BOOK_COUNT: usize = 66;

/// The 66 canonical book names in output order
#[rustfmt::skip]
pub static CANONICAL_BOOKS: [&str; BOOK_COUNT] = [
    // 구약
    "창세기", "출애굽기", "레위기", "민수기", "신명기", "여호수아", "사사기", "룻기",
    "사무엘상", "사무엘하", "열왕기상", "열왕기하", "역대상", "역대하", "에스라", "느헤미야",
    "에스더", "욥기", "시편", "잠언", "전도서", "아가", "이사야", "예레미야", "예레미야애가",
    "에스겔", "다니엘", "호세아", "요엘", "아모스", "오바댜", "요나", "미가", "나훔",
    "하박국", "스바냐", "학개", "스가랴", "말라기",
    // 신약
    "마태복음", "마가복음", "누가복음", "요한복음", "사도행전", "로마서", "고린도전서",
    "고린도후서", "갈라디아서", "에베소서", "빌립보서", "골로새서", "데살로니가전서",
    "데살로니가후서", "디모데전서", "디모데후서", "디도서", "빌레몬서", "히브리서",
    "야고보서", "베드로전서", "베드로후서", "요한1서", "요한2서", "요한3서", "유다서",
    "요한계시록",
];

/// Short labels used in verse references, indexed like [`CANONICAL_BOOKS`]
#[rustfmt::skip]
static ABBREVIATIONS: [&str; BOOK_COUNT] = [
    "창", "출", "레", "민", "신", "수", "삿", "룻",
    "삼상", "삼하", "왕상", "왕하", "대상", "대하", "스", "느",
    "에", "욥", "시", "잠", "전", "아", "사", "렘", "애",
    "겔", "단", "호", "욜", "암", "옵", "욘", "미", "나",
    "합", "습", "학", "슥", "말",
    "마", "막", "눅", "요", "행", "롬", "고전",
    "고후", "갈", "엡", "빌", "골", "살전",
    "살후", "딤전", "딤후", "딛", "몬", "히",
    "약", "벧전", "벧후", "요일", "요이", "요삼", "유",
    "계",
];

static BY_ABBREVIATION: LazyLock<HashMap<&'static str, Book>> = LazyLock::new(|| {
    ABBREVIATIONS
        .iter()
        .enumerate()
        .map(|(position, abbr)| (*abbr, Book(position as u8)))
        .collect()
});

static BY_NAME: LazyLock<HashMap<&'static str, Book>> = LazyLock::new(|| {
    CANONICAL_BOOKS
        .iter()
        .enumerate()
        .map(|(position, name)| (*name, Book(position as u8)))
        .collect()
});

/// One of the 66 canonical books
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Book(u8);

impl Book {
    /// Resolve a verse-reference label such as `"요일"`.
    ///
    /// Matching is exact on the whole label, so `"요일"` never falls back to
    /// the shorter `"요"`.
    pub fn from_abbreviation(abbr: &str) -> Option<Self> {
        BY_ABBREVIATION.get(abbr).copied()
    }

    /// Resolve a canonical full name such as `"요한1서"`
    pub fn from_name(name: &str) -> Option<Self> {
        BY_NAME.get(name).copied()
    }

    /// Iterate all books in canonical order
    pub fn all() -> impl Iterator<Item = Book> {
        (0..BOOK_COUNT as u8).map(Book)
    }

    pub fn name(self) -> &'static str {
        CANONICAL_BOOKS[self.0 as usize]
    }

    pub fn abbreviation(self) -> &'static str {
        ABBREVIATIONS[self.0 as usize]
    }

    /// Zero-based position in the canonical order
    pub fn position(self) -> usize {
        self.0 as usize
    }

    pub fn is_old_testament(self) -> bool {
        self.0 < 39
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tables_are_complete_and_unique() {
        let names: HashSet<_> = CANONICAL_BOOKS.iter().collect();
        let abbrs: HashSet<_> = ABBREVIATIONS.iter().collect();
        assert_eq!(names.len(), BOOK_COUNT);
        assert_eq!(abbrs.len(), BOOK_COUNT);
        assert_eq!(Book::all().count(), BOOK_COUNT);
    }

    #[test]
    fn test_abbreviation_resolution() {
        assert_eq!(Book::from_abbreviation("창").unwrap().name(), "창세기");
        assert_eq!(Book::from_abbreviation("삼상").unwrap().name(), "사무엘상");
        assert_eq!(Book::from_abbreviation("계").unwrap().name(), "요한계시록");
        assert!(Book::from_abbreviation("창세").is_none());
        assert!(Book::from_abbreviation("").is_none());
    }

    #[test]
    fn test_longer_abbreviation_is_not_shadowed() {
        assert_eq!(Book::from_abbreviation("요").unwrap().name(), "요한복음");
        assert_eq!(Book::from_abbreviation("요일").unwrap().name(), "요한1서");
        assert_eq!(Book::from_abbreviation("요이").unwrap().name(), "요한2서");
        assert_eq!(Book::from_abbreviation("요삼").unwrap().name(), "요한3서");
    }

    #[test]
    fn test_round_trip_through_name() {
        for book in Book::all() {
            assert_eq!(Book::from_name(book.name()), Some(book));
            assert_eq!(Book::from_abbreviation(book.abbreviation()), Some(book));
        }
    }

    #[test]
    fn test_canonical_positions() {
        let genesis = Book::from_name("창세기").unwrap();
        let malachi = Book::from_name("말라기").unwrap();
        let matthew = Book::from_name("마태복음").unwrap();
        let revelation = Book::from_name("요한계시록").unwrap();

        assert_eq!(genesis.position(), 0);
        assert_eq!(malachi.position(), 38);
        assert_eq!(matthew.position(), 39);
        assert_eq!(revelation.position(), 65);
        assert!(malachi.is_old_testament());
        assert!(!matthew.is_old_testament());
        assert!(genesis < revelation);
    }
}
