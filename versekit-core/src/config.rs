//! Configuration management

use crate::error::{ErrorContext, VerseKitError, VerseKitResult};
use crate::types::{IndexConfig, PortableConfig, SampleRef, TextEncoding, VerseKitConfig};

use std::path::{Path, PathBuf};

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("temp_easy_bible"),
            output_path: PathBuf::from("public/bible/ko_easy.json"),
            extensions: vec!["txt".to_string()],
            // CP949 accepts some UTF-8 byte runs as mojibake; UTF-8 never
            // accepts CP949 Hangul.
            encodings: vec![TextEncoding::Utf8, TextEncoding::Cp949],
            samples: vec![
                SampleRef::new("창세기", 1, 1),
                SampleRef::new("미가", 5, 1),
                SampleRef::new("요한복음", 3, 16),
            ],
        }
    }
}

impl Default for PortableConfig {
    fn default() -> Self {
        Self {
            input_html: PathBuf::from("1.html"),
            output_html: PathBuf::from("1_portable.html"),
        }
    }
}

impl VerseKitConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> VerseKitResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| VerseKitError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text; missing sections fall back to defaults
    pub fn from_toml_str(content: &str) -> VerseKitResult<Self> {
        let config: VerseKitConfig = toml::from_str(content).map_err(|e| VerseKitError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file, creating parent directories
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> VerseKitResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| VerseKitError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content).map_err(|e| VerseKitError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> VerseKitResult<()> {
        let index = &self.index;

        if index.extensions.iter().all(|ext| ext.trim().is_empty()) {
            return Err(crate::validation_error!(
                "At least one source file extension is required",
                "index.extensions",
                "config"
            ));
        }

        if index.encodings.is_empty() {
            return Err(crate::validation_error!(
                "At least one text encoding is required",
                "index.encodings",
                "config"
            ));
        }

        for sample in &index.samples {
            if sample.book.trim().is_empty() {
                return Err(crate::validation_error!(
                    "Sample book name must not be empty",
                    "index.samples",
                    "config"
                ));
            }
            if sample.chapter == 0 || sample.verse == 0 {
                return Err(crate::validation_error!(
                    format!("Sample {} must use chapter and verse numbers above 0", sample),
                    "index.samples",
                    "config"
                ));
            }
        }

        if self.portable.input_html == self.portable.output_html {
            return Err(crate::validation_error!(
                "portable.output_html must differ from portable.input_html",
                "portable.output_html",
                "config"
            ));
        }

        Ok(())
    }
}
