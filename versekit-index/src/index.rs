//! In-memory verse index and its finalized, canonically ordered form

use crate::books::Book;
use crate::parser::{parse_line, parse_lines, ParsedVerse};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{BTreeMap, HashMap};

/// Verse number → text
pub type Chapter = BTreeMap<u32, String>;
/// Chapter number → verses
pub type Chapters = BTreeMap<u32, Chapter>;

/// Accumulates parsed verses; later writes to the same coordinate win
#[derive(Debug, Default)]
pub struct VerseIndex {
    books: HashMap<Book, Chapters>,
    events: usize,
}

impl VerseIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a verse, overwriting any previous text at the same coordinate
    pub fn insert(&mut self, parsed: ParsedVerse) {
        self.books
            .entry(parsed.book)
            .or_default()
            .entry(parsed.chapter)
            .or_default()
            .insert(parsed.verse, parsed.text);
        self.events += 1;
    }

    /// Parse a single raw line and store it if it is a verse.
    ///
    /// Returns whether the line produced a verse.
    pub fn ingest_line(&mut self, line: &str) -> bool {
        match parse_line(line) {
            Some(parsed) => {
                self.insert(parsed);
                true
            }
            None => false,
        }
    }

    /// Parse every line of a decoded file; returns how many verses were stored
    pub fn ingest_text(&mut self, content: &str) -> usize {
        let mut stored = 0;
        for parsed in parse_lines(content) {
            self.insert(parsed);
            stored += 1;
        }
        stored
    }

    pub fn get(&self, book: Book, chapter: u32, verse: u32) -> Option<&str> {
        self.books
            .get(&book)?
            .get(&chapter)?
            .get(&verse)
            .map(String::as_str)
    }

    /// Number of distinct books with at least one verse
    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    /// Accumulation events, overwrites included
    pub fn verse_events(&self) -> usize {
        self.events
    }

    /// Distinct (book, chapter, verse) coordinates
    pub fn unique_verses(&self) -> usize {
        self.books
            .values()
            .flat_map(|chapters| chapters.values())
            .map(Chapter::len)
            .sum()
    }

    /// Canonical books with no verses, in canonical order
    pub fn missing_books(&self) -> Vec<Book> {
        Book::all()
            .filter(|book| !self.books.contains_key(book))
            .collect()
    }

    /// Freeze the index into canonical book order
    pub fn finalize(self) -> BibleDocument {
        let mut books: Vec<(Book, Chapters)> = self.books.into_iter().collect();
        books.sort_unstable_by_key(|(book, _)| *book);
        BibleDocument { books }
    }
}

/// A finished index, books in canonical order.
///
/// Serializes as `{"<book>":{"<chapter>":{"<verse>":"<text>"}}}` with
/// chapters and verses in ascending numeric order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BibleDocument {
    books: Vec<(Book, Chapters)>,
}

impl BibleDocument {
    /// Build from arbitrary entries; books are re-sorted into canonical order
    /// and duplicates merged with later chapters taking precedence.
    pub fn from_books<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Book, Chapters)>,
    {
        let mut merged: BTreeMap<Book, Chapters> = BTreeMap::new();
        for (book, chapters) in entries {
            merged.entry(book).or_default().extend(chapters);
        }
        Self {
            books: merged.into_iter().collect(),
        }
    }

    pub fn books(&self) -> impl Iterator<Item = (Book, &Chapters)> {
        self.books.iter().map(|(book, chapters)| (*book, chapters))
    }

    pub fn book(&self, book: Book) -> Option<&Chapters> {
        self.books
            .binary_search_by_key(&book, |(b, _)| *b)
            .ok()
            .map(|i| &self.books[i].1)
    }

    pub fn get(&self, book: Book, chapter: u32, verse: u32) -> Option<&str> {
        self.book(book)?
            .get(&chapter)?
            .get(&verse)
            .map(String::as_str)
    }

    /// Look up by canonical book name, as the sample checks do
    pub fn lookup(&self, book_name: &str, chapter: u32, verse: u32) -> Option<&str> {
        self.get(Book::from_name(book_name)?, chapter, verse)
    }

    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    pub fn verse_count(&self) -> usize {
        self.books
            .iter()
            .flat_map(|(_, chapters)| chapters.values())
            .map(Chapter::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Compact JSON with non-ASCII text written literally
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Serialize for BibleDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.books.len()))?;
        for (book, chapters) in &self.books {
            map.serialize_entry(book.name(), chapters)?;
        }
        map.end()
    }
}
