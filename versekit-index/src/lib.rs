//! VerseKit Index - Verse text to JSON conversion
//!
//! Parses verse-reference lines (`창1:1 ...`) from a tree of text files and
//! assembles them into a book / chapter / verse document in canonical order

pub mod audit;
pub mod books;
pub mod builder;
pub mod index;
pub mod parser;
pub mod reader;

pub use audit::{
    compare_coverage, load_document, parse_document, scan_quality, CoverageReport, Gap,
    LoadedDocument, QualityIssue, QualityIssueKind,
};
pub use books::{Book, BOOK_COUNT, CANONICAL_BOOKS};
pub use builder::{
    build_from_dir, sample_lookups, write_document, BuildOutcome, BuildReport, SampleLookup,
    SkippedFile, VerseIndexBuilder,
};
pub use index::{BibleDocument, Chapter, Chapters, VerseIndex};
pub use parser::{parse_line, parse_lines, ParsedVerse};
