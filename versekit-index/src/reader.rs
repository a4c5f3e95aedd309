//! Source discovery and text decoding

use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use versekit_core::{
    not_found_error, ErrorContext, TextEncoding, VerseKitError, VerseKitResult,
};
use walkdir::{DirEntry, WalkDir};

/// Hidden entries are skipped, except the walk root itself
fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            extensions
                .iter()
                .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Collect source files under `root` in a deterministic order.
///
/// Entries are visited depth-first with siblings sorted by file name, so the
/// last-writer-wins rule produces the same result on every run.
pub fn collect_source_files<P: AsRef<Path>>(
    root: P,
    extensions: &[String],
) -> VerseKitResult<Vec<PathBuf>> {
    let root = root.as_ref();

    if !root.is_dir() {
        return Err(not_found_error!(root.display(), "source_reader"));
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };

        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            trace!(path = %entry.path().display(), "Found source file");
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Strict decode with a single encoding; `None` on any malformed sequence
pub fn decode_with(bytes: &[u8], encoding: TextEncoding) -> Option<String> {
    match encoding {
        TextEncoding::Utf8 => {
            let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
            std::str::from_utf8(bytes).ok().map(str::to_owned)
        }
        TextEncoding::Cp949 => encoding_rs::EUC_KR
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|text| text.into_owned()),
    }
}

/// Decode `bytes` with the first encoding in `encodings` that accepts them
pub fn decode_text(
    path: &Path,
    bytes: &[u8],
    encodings: &[TextEncoding],
) -> VerseKitResult<(String, TextEncoding)> {
    for &encoding in encodings {
        if let Some(text) = decode_with(bytes, encoding) {
            return Ok((text, encoding));
        }
        debug!(path = %path.display(), encoding = %encoding, "Decode attempt failed");
    }

    let tried = encodings
        .iter()
        .map(|e| e.label())
        .collect::<Vec<_>>()
        .join(", ");

    Err(VerseKitError::Decode {
        message: format!("{} is not valid in any of: {}", path.display(), tried),
        path: path.to_path_buf(),
        context: ErrorContext::new("source_reader")
            .with_operation("decode_text")
            .with_metadata("encodings", &tried)
            .with_suggestion("Add the file's encoding to index.encodings"),
    })
}

/// Read and decode one source file
pub fn read_source(path: &Path, encodings: &[TextEncoding]) -> VerseKitResult<(String, TextEncoding)> {
    let bytes = std::fs::read(path).map_err(|e| VerseKitError::Decode {
        message: format!("Failed to read {}: {}", path.display(), e),
        path: path.to_path_buf(),
        context: ErrorContext::new("source_reader").with_operation("read_source"),
    })?;

    decode_text(path, &bytes, encodings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn cp949(text: &str) -> Vec<u8> {
        let (bytes, _, had_errors) = encoding_rs::EUC_KR.encode(text);
        assert!(!had_errors);
        bytes.into_owned()
    }

    #[test]
    fn test_collect_is_sorted_and_filtered() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("b_dir")).unwrap();
        fs::create_dir_all(root.join(".hidden")).unwrap();
        fs::write(root.join("b.txt"), "").unwrap();
        fs::write(root.join("a.TXT"), "").unwrap();
        fs::write(root.join("notes.md"), "").unwrap();
        fs::write(root.join(".secret.txt"), "").unwrap();
        fs::write(root.join("b_dir").join("c.txt"), "").unwrap();
        fs::write(root.join(".hidden").join("d.txt"), "").unwrap();

        let files = collect_source_files(root, &["txt".to_string()]).unwrap();
        let relative: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();

        assert_eq!(relative, vec!["a.TXT", "b.txt", "b_dir/c.txt"]);
    }

    #[test]
    fn test_collect_missing_root() {
        let result = collect_source_files("/no/such/source/dir", &["txt".to_string()]);
        assert!(matches!(result, Err(VerseKitError::NotFound { .. })));
    }

    #[test]
    fn test_decode_prefers_first_encoding() {
        let bytes = cp949("창1:1 태초에");
        let (text, used) =
            decode_text(Path::new("x.txt"), &bytes, &[TextEncoding::Cp949, TextEncoding::Utf8])
                .unwrap();
        assert_eq!(text, "창1:1 태초에");
        assert_eq!(used, TextEncoding::Cp949);
    }

    #[test]
    fn test_decode_falls_back() {
        // CP949 bytes are not valid UTF-8, so the second encoding is used
        let bytes = cp949("창1:1 태초에");
        let (text, used) =
            decode_text(Path::new("x.txt"), &bytes, &[TextEncoding::Utf8, TextEncoding::Cp949])
                .unwrap();
        assert_eq!(text, "창1:1 태초에");
        assert_eq!(used, TextEncoding::Cp949);
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let mut bytes = b"\xEF\xBB\xBF".to_vec();
        bytes.extend_from_slice("창1:1 태초에".as_bytes());
        assert_eq!(
            decode_with(&bytes, TextEncoding::Utf8).as_deref(),
            Some("창1:1 태초에")
        );
    }

    #[test]
    fn test_decode_failure_is_recoverable() {
        // 0xFF is neither a UTF-8 byte nor a CP949 lead byte
        let bytes = [0x41, 0xFF, 0xFF];
        let err = decode_text(
            Path::new("broken.txt"),
            &bytes,
            &[TextEncoding::Cp949, TextEncoding::Utf8],
        )
        .unwrap_err();

        assert!(err.is_recoverable());
        match err {
            VerseKitError::Decode { path, context, .. } => {
                assert_eq!(path, PathBuf::from("broken.txt"));
                assert_eq!(
                    context.metadata.get("encodings").map(String::as_str),
                    Some("cp949, utf-8")
                );
            }
            other => panic!("Expected Decode error, got {:?}", other),
        }
    }
}
