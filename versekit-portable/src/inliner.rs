//! Image inlining for HTML files

use crate::mime::mime_type_for;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use regex::{Captures, Regex};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info};
use versekit_core::{
    log_operation_start, log_operation_success, ErrorContext, VerseKitError, VerseKitResult,
};

/// `<img ... src="` / the src value / the closing quote
static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(<img[^>]+src=["'])([^"']+)(["'])"#).expect("img src pattern is valid")
});

/// An image that stayed as a file reference because it could not be read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedImage {
    pub src: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InlineReport {
    /// Every `<img src>` seen, in document order
    pub found: usize,
    pub inlined: Vec<String>,
    /// Already data URIs or remote URLs
    pub skipped: Vec<String>,
    pub failed: Vec<FailedImage>,
}

impl InlineReport {
    pub fn summary(&self) -> String {
        format!(
            "{} images: {} inlined, {} already portable, {} failed",
            self.found,
            self.inlined.len(),
            self.skipped.len(),
            self.failed.len()
        )
    }
}

/// Whether `src` already works without local files next to the HTML
pub fn is_portable_src(src: &str) -> bool {
    let lower = src.trim_start().to_ascii_lowercase();
    lower.starts_with("data:")
        || lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("//")
}

/// Collapse `.` and `..` without touching the filesystem
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Replaces local image references with base64 data URIs
#[derive(Debug, Clone)]
pub struct ImageInliner {
    base_dir: PathBuf,
}

impl ImageInliner {
    /// Relative `src` values resolve against `base_dir`
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Resolve relative references against the directory holding `html_path`
    pub fn for_html_file<P: AsRef<Path>>(html_path: P) -> Self {
        let base_dir = html_path
            .as_ref()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::new(base_dir)
    }

    pub fn resolve(&self, src: &str) -> PathBuf {
        let src_path = Path::new(src);
        if src_path.is_absolute() {
            normalize_lexically(src_path)
        } else {
            normalize_lexically(&self.base_dir.join(src_path))
        }
    }

    /// Read the referenced file and return it as a `data:` URI
    pub fn encode_image(&self, src: &str) -> VerseKitResult<String> {
        let path = self.resolve(src);
        let bytes = std::fs::read(&path).map_err(|e| VerseKitError::Image {
            message: format!("Failed to read {}: {}", path.display(), e),
            src: src.to_string(),
            source: Some(Box::new(e)),
            context: ErrorContext::new("image_inliner")
                .with_operation("encode_image")
                .with_metadata("resolved_path", &path.to_string_lossy()),
        })?;

        Ok(format!(
            "data:{};base64,{}",
            mime_type_for(&path),
            BASE64.encode(bytes)
        ))
    }

    /// Rewrite every local `<img src>` in `html`.
    ///
    /// Images that fail to load keep their original tag and are listed in the
    /// report.
    pub fn inline_html(&self, html: &str) -> (String, InlineReport) {
        let mut report = InlineReport::default();

        let rewritten = IMG_SRC.replace_all(html, |caps: &Captures| {
            let src = &caps[2];
            report.found += 1;

            if is_portable_src(src) {
                debug!(src = %src, "Image already portable");
                report.skipped.push(src.to_string());
                return caps[0].to_string();
            }

            info!(src = %src, "Processing image");
            match self.encode_image(src) {
                Ok(data_uri) => {
                    report.inlined.push(src.to_string());
                    format!("{}{}{}", &caps[1], data_uri, &caps[3])
                }
                Err(e) => {
                    e.log();
                    report.failed.push(FailedImage {
                        src: src.to_string(),
                        reason: e.to_string(),
                    });
                    caps[0].to_string()
                }
            }
        });

        (rewritten.into_owned(), report)
    }
}

/// Read `input`, inline its images, and write the result to `output`
pub fn convert_file(input: &Path, output: &Path) -> VerseKitResult<InlineReport> {
    log_operation_start!("make_portable", input = %input.display());

    let html = std::fs::read_to_string(input).map_err(|e| VerseKitError::Source {
        message: format!("Failed to read HTML {}: {}", input.display(), e),
        source: Some(Box::new(e)),
        context: ErrorContext::new("image_inliner")
            .with_operation("read_html")
            .with_suggestion("Check that the input file exists and is UTF-8"),
    })?;

    let (portable, report) = ImageInliner::for_html_file(input).inline_html(&html);

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output, portable).map_err(|e| VerseKitError::Output {
        message: format!("Failed to write HTML {}: {}", output.display(), e),
        source: Some(Box::new(e)),
        context: ErrorContext::new("image_inliner").with_operation("write_html"),
    })?;

    log_operation_success!("make_portable", summary = %report.summary());
    Ok(report)
}
