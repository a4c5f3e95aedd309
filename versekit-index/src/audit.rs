//! Checks for generated verse documents
//!
//! Coverage compares a document against a reference translation; the quality
//! scan flags verses that look cut off by the scraper or the text export.

use crate::books::Book;
use crate::index::{BibleDocument, Chapter, Chapters};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::debug;
use versekit_core::{ErrorContext, VerseKitError, VerseKitResult};

/// Placeholder some exports store in place of a missing verse
pub const MISSING_PLACEHOLDER: &str = "(없음)";

/// Verses shorter than this many characters are reported as suspicious
pub const MIN_VERSE_CHARS: usize = 10;

const TRUNCATED_START: [char; 6] = [',', '.', ':', ';', '!', '?'];

type RawDocument = BTreeMap<String, BTreeMap<String, BTreeMap<String, String>>>;

/// A document read back from JSON, plus the keys that could not be mapped
#[derive(Debug, Clone, Default)]
pub struct LoadedDocument {
    pub document: BibleDocument,
    /// Top-level keys that are not canonical book names
    pub unknown_books: Vec<String>,
    /// Chapter or verse keys that are not numbers, as `book chapter[:verse]`
    pub invalid_keys: Vec<String>,
}

/// Parse a verse document from JSON text
pub fn parse_document(json: &str) -> VerseKitResult<LoadedDocument> {
    let raw: RawDocument = serde_json::from_str(json)?;
    let mut loaded = LoadedDocument::default();
    let mut books = Vec::with_capacity(raw.len());

    for (book_name, raw_chapters) in raw {
        let Some(book) = Book::from_name(&book_name) else {
            loaded.unknown_books.push(book_name);
            continue;
        };

        let mut chapters = Chapters::new();
        for (chapter_key, raw_verses) in raw_chapters {
            let Ok(chapter) = chapter_key.parse::<u32>() else {
                loaded.invalid_keys.push(format!("{} {}", book_name, chapter_key));
                continue;
            };

            let mut verses = Chapter::new();
            for (verse_key, text) in raw_verses {
                match verse_key.parse::<u32>() {
                    Ok(verse) => {
                        verses.insert(verse, text);
                    }
                    Err(_) => loaded
                        .invalid_keys
                        .push(format!("{} {}:{}", book_name, chapter, verse_key)),
                }
            }
            chapters.insert(chapter, verses);
        }
        books.push((book, chapters));
    }

    loaded.document = BibleDocument::from_books(books);
    Ok(loaded)
}

/// Read and parse a verse document from disk
pub fn load_document(path: &Path) -> VerseKitResult<LoadedDocument> {
    let content = std::fs::read_to_string(path).map_err(|e| VerseKitError::Source {
        message: format!("Failed to read {}: {}", path.display(), e),
        source: Some(Box::new(e)),
        context: ErrorContext::new("audit").with_operation("load_document"),
    })?;

    let loaded = parse_document(&content)?;
    debug!(
        path = %path.display(),
        books = loaded.document.book_count(),
        verses = loaded.document.verse_count(),
        "Loaded verse document"
    );
    Ok(loaded)
}

/// Something the reference has that the target lacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Gap {
    Book(#[serde(serialize_with = "book_name")] Book),
    Chapter(#[serde(serialize_with = "book_name")] Book, u32),
    Verse(#[serde(serialize_with = "book_name")] Book, u32, u32),
}

fn book_name<S: serde::Serializer>(book: &Book, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(book.name())
}

impl fmt::Display for Gap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gap::Book(book) => write!(f, "[BOOK MISSING] {}", book),
            Gap::Chapter(book, chapter) => write!(f, "[CHAPTER MISSING] {} {}장", book, chapter),
            Gap::Verse(book, chapter, verse) => {
                write!(f, "[VERSE MISSING] {} {}:{}", book, chapter, verse)
            }
        }
    }
}

/// A verse that exists but has no text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmptyVerse {
    #[serde(serialize_with = "book_name")]
    pub book: Book,
    pub chapter: u32,
    pub verse: u32,
}

impl fmt::Display for EmptyVerse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[VERSE EMPTY] {} {}:{}", self.book, self.chapter, self.verse)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CoverageReport {
    pub missing: Vec<Gap>,
    pub empty: Vec<EmptyVerse>,
}

impl CoverageReport {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.empty.is_empty()
    }
}

/// Walk `reference` in canonical order and report what `target` is missing.
///
/// A missing book or chapter is reported once, not once per verse.
pub fn compare_coverage(reference: &BibleDocument, target: &BibleDocument) -> CoverageReport {
    let mut report = CoverageReport::default();

    for (book, ref_chapters) in reference.books() {
        let Some(target_chapters) = target.book(book) else {
            report.missing.push(Gap::Book(book));
            continue;
        };

        for (&chapter, ref_verses) in ref_chapters {
            let Some(target_verses) = target_chapters.get(&chapter) else {
                report.missing.push(Gap::Chapter(book, chapter));
                continue;
            };

            for &verse in ref_verses.keys() {
                match target_verses.get(&verse) {
                    None => report.missing.push(Gap::Verse(book, chapter, verse)),
                    Some(text) if text.trim().is_empty() => report.empty.push(EmptyVerse {
                        book,
                        chapter,
                        verse,
                    }),
                    Some(_) => {}
                }
            }
        }
    }

    report
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityIssueKind {
    /// Starts with punctuation, so the beginning was probably cut
    TruncatedStart,
    /// Fewer than [`MIN_VERSE_CHARS`] characters
    TooShort,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityIssue {
    #[serde(serialize_with = "book_name")]
    pub book: Book,
    pub chapter: u32,
    pub verse: u32,
    pub kind: QualityIssueKind,
    pub excerpt: String,
}

impl fmt::Display for QualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}:{}: \"{}\"",
            self.book, self.chapter, self.verse, self.excerpt
        )
    }
}

/// First `max_chars` characters of `text`
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Flag verses with a punctuation start or suspiciously short text
pub fn scan_quality(document: &BibleDocument) -> Vec<QualityIssue> {
    let mut issues = Vec::new();

    for (book, chapters) in document.books() {
        for (&chapter, verses) in chapters {
            for (&verse, text) in verses {
                let kind = if text.starts_with(TRUNCATED_START) {
                    QualityIssueKind::TruncatedStart
                } else if text.chars().count() < MIN_VERSE_CHARS && text != MISSING_PLACEHOLDER {
                    QualityIssueKind::TooShort
                } else {
                    continue;
                };

                issues.push(QualityIssue {
                    book,
                    chapter,
                    verse,
                    kind,
                    excerpt: excerpt(text, 30).to_string(),
                });
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::VerseIndex;

    fn document(lines: &str) -> BibleDocument {
        let mut index = VerseIndex::new();
        index.ingest_text(lines);
        index.finalize()
    }

    fn book(name: &str) -> Book {
        Book::from_name(name).unwrap()
    }

    #[test]
    fn test_parse_document_round_trip() {
        let original = document("창1:1 태초에 하나님이\n요일1:1 태초부터 있는");
        let loaded = parse_document(&original.to_json().unwrap()).unwrap();

        assert_eq!(loaded.document, original);
        assert!(loaded.unknown_books.is_empty());
        assert!(loaded.invalid_keys.is_empty());
    }

    #[test]
    fn test_parse_document_reports_unknown_keys() {
        let json = r#"{"요한일서":{"1":{"1":"a"}},"창세기":{"x":{"1":"a"},"1":{"1":"태초에","y":"b"}}}"#;
        let loaded = parse_document(json).unwrap();

        assert_eq!(loaded.unknown_books, vec!["요한일서".to_string()]);
        assert_eq!(
            loaded.invalid_keys,
            vec!["창세기 1:y".to_string(), "창세기 x".to_string()]
        );
        assert_eq!(loaded.document.lookup("창세기", 1, 1), Some("태초에"));
    }

    #[test]
    fn test_parse_document_rejects_bad_json() {
        assert!(matches!(
            parse_document("[1, 2, 3]"),
            Err(VerseKitError::Serialization(_))
        ));
    }

    #[test]
    fn test_compare_coverage() {
        let reference = document(
            "창1:1 태초에\n창1:2 땅이\n창2:1 천지와\n출1:1 이스라엘\n요3:16 하나님이",
        );
        let mut target = VerseIndex::new();
        target.ingest_text("창1:1 태초에\n요3:16 하나님이");
        let mut target = target.finalize();

        let report = compare_coverage(&reference, &target);
        assert_eq!(
            report.missing,
            vec![
                Gap::Verse(book("창세기"), 1, 2),
                Gap::Chapter(book("창세기"), 2),
                Gap::Book(book("출애굽기")),
            ]
        );
        assert!(report.empty.is_empty());

        // An empty verse read back from another export
        let json = r#"{"창세기":{"1":{"1":"태초에","2":" "},"2":{"1":"천지와"}},"출애굽기":{"1":{"1":"이스라엘"}},"요한복음":{"3":{"16":"하나님이"}}}"#;
        target = parse_document(json).unwrap().document;
        let report = compare_coverage(&reference, &target);
        assert!(report.missing.is_empty());
        assert_eq!(report.empty.len(), 1);
        assert_eq!(report.empty[0].to_string(), "[VERSE EMPTY] 창세기 1:2");
        assert!(!report.is_clean());
    }

    #[test]
    fn test_gap_display() {
        assert_eq!(Gap::Book(book("룻기")).to_string(), "[BOOK MISSING] 룻기");
        assert_eq!(
            Gap::Chapter(book("룻기"), 4).to_string(),
            "[CHAPTER MISSING] 룻기 4장"
        );
        assert_eq!(
            Gap::Verse(book("룻기"), 4, 22).to_string(),
            "[VERSE MISSING] 룻기 4:22"
        );
    }

    #[test]
    fn test_scan_quality() {
        let json = r#"{"창세기":{"1":{"1":"태초에 하나님이 천지를 창조하시니라","2":", 땅이 혼돈하고 공허하며","3":"빛이 있으라","4":"(없음)"}}}"#;
        let loaded = parse_document(json).unwrap();
        let issues = scan_quality(&loaded.document);

        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].verse, 2);
        assert_eq!(issues[0].kind, QualityIssueKind::TruncatedStart);
        assert_eq!(issues[1].verse, 3);
        assert_eq!(issues[1].kind, QualityIssueKind::TooShort);
    }

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        assert_eq!(excerpt("태초에 하나님이", 3), "태초에");
        assert_eq!(excerpt("짧음", 50), "짧음");
    }
}
