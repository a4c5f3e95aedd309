//! Directory-to-document conversion
//!
//! [`VerseIndexBuilder`] walks a source tree one file at a time, feeds every
//! decoded file through the line parser, and keeps enough bookkeeping to
//! report what happened once the index is finalized.

use crate::books::{Book, BOOK_COUNT};
use crate::index::{BibleDocument, VerseIndex};
use crate::reader::{collect_source_files, read_source};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use versekit_core::{
    log_operation_start, log_operation_success, ErrorContext, IndexConfig, SampleRef,
    TextEncoding, VerseKitError, VerseKitResult,
};

/// A source file that contributed nothing because it could not be read
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// What a build saw, for the summary printed after conversion
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub files_read: usize,
    pub skipped_files: Vec<SkippedFile>,
    pub books_populated: usize,
    /// Every stored verse, overwrites included
    pub verse_events: usize,
    pub unique_verses: usize,
    #[serde(serialize_with = "serialize_book_names")]
    pub missing_books: Vec<Book>,
}

fn serialize_book_names<S: serde::Serializer>(
    books: &[Book],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(books.iter().map(|book| book.name()))
}

impl BuildReport {
    pub fn is_complete(&self) -> bool {
        self.missing_books.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} files read, {} skipped, {}/{} books, {} verses ({} unique)",
            self.files_read,
            self.skipped_files.len(),
            self.books_populated,
            BOOK_COUNT,
            self.verse_events,
            self.unique_verses
        )
    }
}

/// Finalized document plus the report describing how it was built
#[derive(Debug)]
pub struct BuildOutcome {
    pub document: BibleDocument,
    pub report: BuildReport,
}

/// Incrementally builds a [`VerseIndex`] from source files
#[derive(Debug)]
pub struct VerseIndexBuilder {
    extensions: Vec<String>,
    encodings: Vec<TextEncoding>,
    index: VerseIndex,
    files_read: usize,
    skipped_files: Vec<SkippedFile>,
}

impl VerseIndexBuilder {
    pub fn new(config: &IndexConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
            encodings: config.encodings.clone(),
            index: VerseIndex::new(),
            files_read: 0,
            skipped_files: Vec::new(),
        }
    }

    /// Feed a single raw line; returns whether it held a verse
    pub fn ingest_line(&mut self, line: &str) -> bool {
        self.index.ingest_line(line)
    }

    /// Read, decode, and ingest one file. Returns the number of verses stored.
    pub fn ingest_file(&mut self, path: &Path) -> VerseKitResult<usize> {
        let (content, encoding) = read_source(path, &self.encodings)?;
        let stored = self.index.ingest_text(&content);
        self.files_read += 1;

        debug!(
            path = %path.display(),
            encoding = %encoding,
            verses = stored,
            "Ingested source file"
        );

        Ok(stored)
    }

    /// Ingest every matching file under `root`, in sorted order.
    ///
    /// Files that cannot be read or decoded are recorded and skipped; only a
    /// missing root is an error.
    pub fn ingest_dir(&mut self, root: &Path) -> VerseKitResult<()> {
        let files = collect_source_files(root, &self.extensions)?;
        info!(root = %root.display(), files = files.len(), "Collected source files");

        for path in files {
            match self.ingest_file(&path) {
                Ok(_) => {}
                Err(e) if e.is_recoverable() => {
                    e.log();
                    self.skipped_files.push(SkippedFile {
                        path,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    /// Finalize into canonical order and produce the build report
    pub fn finish(self) -> BuildOutcome {
        let report = BuildReport {
            files_read: self.files_read,
            skipped_files: self.skipped_files,
            books_populated: self.index.book_count(),
            verse_events: self.index.verse_events(),
            unique_verses: self.index.unique_verses(),
            missing_books: self.index.missing_books(),
        };

        if !report.is_complete() {
            warn!(
                missing = report.missing_books.len(),
                "Some canonical books have no verses"
            );
        }

        BuildOutcome {
            document: self.index.finalize(),
            report,
        }
    }
}

/// Build a document from `config.input_dir`
pub fn build_from_dir(config: &IndexConfig) -> VerseKitResult<BuildOutcome> {
    log_operation_start!("build_verse_index", input_dir = %config.input_dir.display());

    let mut builder = VerseIndexBuilder::new(config);
    builder.ingest_dir(&config.input_dir)?;
    let outcome = builder.finish();

    log_operation_success!("build_verse_index", summary = %outcome.report.summary());
    Ok(outcome)
}

/// Write `document` as compact JSON, creating parent directories.
///
/// Returns the number of bytes written.
pub fn write_document(document: &BibleDocument, path: &Path) -> VerseKitResult<u64> {
    let output_error = |operation: &str, e: Box<dyn std::error::Error + Send + Sync>| {
        VerseKitError::Output {
            message: format!("Failed to write {}: {}", path.display(), e),
            source: Some(e),
            context: ErrorContext::new("document_writer")
                .with_operation(operation)
                .with_suggestion("Check that the output directory is writable"),
        }
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| output_error("create_dir", Box::new(e)))?;
    }

    let file = File::create(path).map_err(|e| output_error("create_file", Box::new(e)))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, document)
        .map_err(|e| output_error("serialize", Box::new(e)))?;
    writer
        .flush()
        .map_err(|e| output_error("flush", Box::new(e)))?;

    let size = std::fs::metadata(path)?.len();
    info!(path = %path.display(), bytes = size, "Wrote verse document");
    Ok(size)
}

/// Result of echoing one sample coordinate back from a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleLookup {
    pub sample: SampleRef,
    pub text: Option<String>,
}

pub fn sample_lookups(document: &BibleDocument, samples: &[SampleRef]) -> Vec<SampleLookup> {
    samples
        .iter()
        .map(|sample| SampleLookup {
            sample: sample.clone(),
            text: document
                .lookup(&sample.book, sample.chapter, sample.verse)
                .map(str::to_owned),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn utf8_config(input_dir: &Path) -> IndexConfig {
        IndexConfig {
            input_dir: input_dir.to_path_buf(),
            ..IndexConfig::default()
        }
    }

    #[test]
    fn test_later_files_overwrite_earlier_ones() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("01.txt"), "창1:1 옛 번역\n창1:2 둘째 절").unwrap();
        fs::write(temp_dir.path().join("02.txt"), "창1:1 새 번역").unwrap();

        let outcome = build_from_dir(&utf8_config(temp_dir.path())).unwrap();

        assert_eq!(outcome.document.lookup("창세기", 1, 1), Some("새 번역"));
        assert_eq!(outcome.report.files_read, 2);
        assert_eq!(outcome.report.verse_events, 3);
        assert_eq!(outcome.report.unique_verses, 2);
        assert_eq!(outcome.report.books_populated, 1);
        assert_eq!(outcome.report.missing_books.len(), BOOK_COUNT - 1);
    }

    #[test]
    fn test_undecodable_file_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("bad.txt"), [0xFF, 0xFE, 0xFF]).unwrap();
        fs::write(temp_dir.path().join("good.txt"), "요3:16 하나님이 세상을").unwrap();

        let outcome = build_from_dir(&utf8_config(temp_dir.path())).unwrap();

        assert_eq!(outcome.report.files_read, 1);
        assert_eq!(outcome.report.skipped_files.len(), 1);
        assert!(outcome.report.skipped_files[0].path.ends_with("bad.txt"));
        assert_eq!(outcome.document.lookup("요한복음", 3, 16), Some("하나님이 세상을"));
    }

    #[test]
    fn test_missing_input_dir_is_an_error() {
        let config = utf8_config(Path::new("/no/such/bible/dir"));
        assert!(matches!(
            build_from_dir(&config),
            Err(VerseKitError::NotFound { .. })
        ));
    }

    #[test]
    fn test_write_document_creates_parents() {
        let temp_dir = TempDir::new().unwrap();
        let mut builder = VerseIndexBuilder::new(&IndexConfig::default());
        builder.ingest_line("창1:1 태초에");
        let outcome = builder.finish();

        let path = temp_dir.path().join("public").join("bible").join("ko.json");
        let size = write_document(&outcome.document, &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, r#"{"창세기":{"1":{"1":"태초에"}}}"#);
        assert_eq!(size, written.len() as u64);
    }

    #[test]
    fn test_sample_lookups() {
        let mut builder = VerseIndexBuilder::new(&IndexConfig::default());
        builder.ingest_line("창1:1 태초에");
        let outcome = builder.finish();

        let lookups = sample_lookups(
            &outcome.document,
            &[SampleRef::new("창세기", 1, 1), SampleRef::new("미가", 5, 1)],
        );
        assert_eq!(lookups[0].text.as_deref(), Some("태초에"));
        assert_eq!(lookups[1].text, None);
    }

    #[test]
    fn test_report_serializes_book_names() {
        let builder = VerseIndexBuilder::new(&IndexConfig::default());
        let report = builder.finish().report;
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["missing_books"][0], "창세기");
        assert_eq!(json["missing_books"].as_array().unwrap().len(), BOOK_COUNT);
    }
}
