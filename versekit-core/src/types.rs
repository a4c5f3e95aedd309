//! Configuration data types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Top-level configuration, loaded from `versekit.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerseKitConfig {
    pub index: IndexConfig,
    pub portable: PortableConfig,
}

/// Settings for converting a directory of verse text files into JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Directory scanned recursively for source files
    pub input_dir: PathBuf,
    /// Where the JSON document is written
    pub output_path: PathBuf,
    /// File extensions (without the dot) that are treated as sources
    pub extensions: Vec<String>,
    /// Encodings tried in order for every file
    pub encodings: Vec<TextEncoding>,
    /// Lookups echoed after a build for manual checking
    pub samples: Vec<SampleRef>,
}

/// Text encodings a source file may be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextEncoding {
    /// Korean Windows code page (UHC), a superset of EUC-KR
    #[serde(rename = "cp949", alias = "euc-kr", alias = "uhc")]
    Cp949,
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
}

impl TextEncoding {
    pub fn label(self) -> &'static str {
        match self {
            TextEncoding::Cp949 => "cp949",
            TextEncoding::Utf8 => "utf-8",
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Settings for producing a self-contained HTML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortableConfig {
    pub input_html: PathBuf,
    pub output_html: PathBuf,
}

/// A (book, chapter, verse) coordinate given by canonical book name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRef {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
}

impl SampleRef {
    pub fn new(book: &str, chapter: u32, verse: u32) -> Self {
        Self {
            book: book.to_string(),
            chapter,
            verse,
        }
    }
}

impl fmt::Display for SampleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.book, self.chapter, self.verse)
    }
}
