//! VerseKit CLI - Command-line interface for VerseKit
//!
//! Converts verse text exports into JSON, audits the result, and packages
//! HTML pages into single portable files

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use versekit_core::{
    init_logging, log_operation_error, performance, ErrorContext, LoggingConfig, TextEncoding,
    VerseKitConfig, VerseKitError, VerseKitResult,
};
use versekit_index::{
    audit::{excerpt, MISSING_PLACEHOLDER},
    build_from_dir, compare_coverage, load_document, sample_lookups, scan_quality,
    write_document, LoadedDocument, QualityIssueKind, BOOK_COUNT,
};

/// How many findings of each kind are printed before summarizing the rest
const DEFAULT_REPORT_LIMIT: usize = 50;

#[derive(Parser)]
#[command(name = "versekit")]
#[command(about = "Offline tools for Bible text exports and portable HTML")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a directory of verse text files into a JSON document
    Index {
        /// Directory containing the source text files
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output JSON path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Encodings to try in order (cp949, utf-8); repeat to set several
        #[arg(short, long = "encoding", value_parser = parse_encoding)]
        encodings: Vec<TextEncoding>,

        /// Source file extensions; repeat to set several
        #[arg(long = "extension")]
        extensions: Vec<String>,
    },

    /// Check a generated document for gaps and suspicious verses
    Audit {
        /// JSON document to check
        document: PathBuf,

        /// Reference document to compare coverage against
        #[arg(short, long)]
        reference: Option<PathBuf>,

        /// Maximum findings printed per category
        #[arg(long, default_value_t = DEFAULT_REPORT_LIMIT)]
        limit: usize,
    },

    /// Inline local images of an HTML file as base64 data URIs
    Portable {
        /// Input HTML file
        input: Option<PathBuf>,

        /// Output HTML file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        /// Show current configuration (the default)
        #[arg(long)]
        show: bool,

        /// Write the default configuration to the user config directory
        #[arg(long)]
        init: bool,

        /// Validate current configuration
        #[arg(long)]
        validate: bool,
    },
}

fn parse_encoding(value: &str) -> Result<TextEncoding, String> {
    match value.to_ascii_lowercase().as_str() {
        "cp949" | "euc-kr" | "uhc" => Ok(TextEncoding::Cp949),
        "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
        other => Err(format!("unsupported encoding '{}' (use cp949 or utf-8)", other)),
    }
}

fn main() -> VerseKitResult<()> {
    let cli = Cli::parse();

    let logging_config = if cli.verbose {
        LoggingConfig::verbose()
    } else {
        LoggingConfig::default()
    };

    init_logging(&logging_config).map_err(|e| VerseKitError::Config {
        message: format!("Failed to initialize logging: {}", e),
        source: Some(e),
        context: ErrorContext::new("cli")
            .with_operation("init_logging")
            .with_suggestion("Check the RUST_LOG filter syntax"),
    })?;

    info!("Starting VerseKit CLI v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Index {
            input,
            output,
            encodings,
            extensions,
        } => handle_index(config, input, output, encodings, extensions),
        Commands::Audit {
            document,
            reference,
            limit,
        } => handle_audit(&document, reference.as_deref(), limit),
        Commands::Portable { input, output } => handle_portable(config, input, output),
        Commands::Config {
            show,
            init,
            validate,
        } => handle_config(&config, show, init, validate),
    }
}

/// Default configuration file location
fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|d| d.join(".config")))
        .map(|d| d.join("versekit").join("config.toml"))
}

fn load_config(config_path: Option<&Path>) -> VerseKitResult<VerseKitConfig> {
    let config = if let Some(path) = config_path {
        info!("Loading configuration from {:?}", path);
        VerseKitConfig::from_file(path)?
    } else {
        let default_paths = [
            get_config_path(),
            dirs::home_dir().map(|d| d.join(".versekit").join("config.toml")),
            Some(PathBuf::from("versekit.toml")),
        ];

        match default_paths.into_iter().flatten().find(|p| p.exists()) {
            Some(path) => {
                info!("Loading configuration from {:?}", path);
                VerseKitConfig::from_file(&path)?
            }
            None => {
                info!("No configuration file found, using defaults");
                VerseKitConfig::default()
            }
        }
    };

    Ok(config)
}

/// Merge `index` flags into the loaded configuration and validate the result
fn apply_index_overrides(
    mut config: VerseKitConfig,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    encodings: Vec<TextEncoding>,
    extensions: Vec<String>,
) -> VerseKitResult<VerseKitConfig> {
    let index_config = &mut config.index;
    if let Some(input) = input {
        index_config.input_dir = input;
    }
    if let Some(output) = output {
        index_config.output_path = output;
    }
    if !encodings.is_empty() {
        index_config.encodings = encodings;
    }
    if !extensions.is_empty() {
        index_config.extensions = extensions;
    }

    config.validate()?;
    Ok(config)
}

/// Merge `portable` flags into the loaded configuration and validate the result
fn apply_portable_overrides(
    mut config: VerseKitConfig,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
) -> VerseKitResult<VerseKitConfig> {
    if let Some(input) = input {
        config.portable.input_html = input;
    }
    if let Some(output) = output {
        config.portable.output_html = output;
    }

    config.validate()?;
    Ok(config)
}

fn handle_index(
    config: VerseKitConfig,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    encodings: Vec<TextEncoding>,
    extensions: Vec<String>,
) -> VerseKitResult<()> {
    let config = apply_index_overrides(config, input, output, encodings, extensions)?;
    let index_config = &config.index;

    println!("🚀 Converting verse text to JSON");
    println!("📁 Source: {}", index_config.input_dir.display());

    let outcome = performance::measure_sync("build_verse_index", || build_from_dir(index_config))
        .map_err(|e| {
            log_operation_error!("build_verse_index", e);
            e
        })?;
    let report = &outcome.report;

    for skipped in &report.skipped_files {
        println!("❌ Read failed: {} ({})", skipped.path.display(), skipped.reason);
    }

    println!("\n📊 Statistics:");
    println!("   Files: {}", report.files_read);
    println!("   Books: {}/{}", report.books_populated, BOOK_COUNT);
    println!("   Verses: {}", report.verse_events);
    if report.unique_verses != report.verse_events {
        println!(
            "   Unique verses: {} ({} overwritten)",
            report.unique_verses,
            report.verse_events - report.unique_verses
        );
    }

    if !report.missing_books.is_empty() {
        let names: Vec<_> = report.missing_books.iter().map(|b| b.name()).collect();
        println!("\n⚠️  Missing books ({}): {}", names.len(), names.join(", "));
    }

    let size = write_document(&outcome.document, &index_config.output_path).map_err(|e| {
        log_operation_error!("write_document", e);
        e
    })?;

    println!("\n✅ Conversion complete!");
    println!("   File: {}", index_config.output_path.display());
    println!("   Size: {:.2} MB", size as f64 / 1024.0 / 1024.0);

    if !index_config.samples.is_empty() {
        println!("\n📖 Sample check:");
        for lookup in sample_lookups(&outcome.document, &index_config.samples) {
            let text = lookup.text.as_deref().unwrap_or(MISSING_PLACEHOLDER);
            println!("   {}: {}...", lookup.sample, excerpt(text, 50));
        }
    }

    Ok(())
}

fn print_limited<T: std::fmt::Display>(items: &[T], limit: usize) {
    for item in items.iter().take(limit) {
        println!("   {}", item);
    }
    if items.len() > limit {
        println!("   ... and {} more", items.len() - limit);
    }
}

/// Keys of a loaded document that were dropped because they did not map
fn key_warnings(loaded: &LoadedDocument) -> Vec<String> {
    let mut warnings = Vec::new();
    if !loaded.unknown_books.is_empty() {
        warnings.push(format!("Unknown book keys: {}", loaded.unknown_books.join(", ")));
    }
    warnings.extend(
        loaded
            .invalid_keys
            .iter()
            .map(|key| format!("Non-numeric key: {}", key)),
    );
    warnings
}

fn print_key_warnings(path: &Path, loaded: &LoadedDocument, limit: usize) {
    let warnings = key_warnings(loaded);
    if !warnings.is_empty() {
        println!("\n⚠️  Skipped keys in {} ({}):", path.display(), warnings.len());
        print_limited(&warnings, limit);
    }
}

fn handle_audit(document: &Path, reference: Option<&Path>, limit: usize) -> VerseKitResult<()> {
    let loaded = load_document(document)?;

    println!("📖 Auditing {}", document.display());
    println!(
        "   Books: {}/{}, verses: {}",
        loaded.document.book_count(),
        BOOK_COUNT,
        loaded.document.verse_count()
    );

    print_key_warnings(document, &loaded, limit);

    if let Some(reference_path) = reference {
        let reference_doc = load_document(reference_path)?;
        print_key_warnings(reference_path, &reference_doc, limit);
        let coverage = compare_coverage(&reference_doc.document, &loaded.document);

        println!("\n=== Coverage against {} ===", reference_path.display());
        println!("Missing items: {}", coverage.missing.len());
        print_limited(&coverage.missing, limit);
        println!("Empty items: {}", coverage.empty.len());
        print_limited(&coverage.empty, limit);
    }

    let issues = scan_quality(&loaded.document);
    let (truncated, too_short): (Vec<_>, Vec<_>) = issues
        .iter()
        .partition(|issue| issue.kind == QualityIssueKind::TruncatedStart);

    println!("\n=== Quality ===");
    println!("Truncated start (begins with punctuation): {}", truncated.len());
    print_limited(&truncated, limit);
    println!("Too short: {}", too_short.len());
    print_limited(&too_short, limit);
    println!("\nTotal issues: {}", issues.len());

    Ok(())
}

fn handle_portable(
    config: VerseKitConfig,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
) -> VerseKitResult<()> {
    let config = apply_portable_overrides(config, input, output)?;
    let input = config.portable.input_html;
    let output = config.portable.output_html;

    let report = versekit_portable::convert_file(&input, &output).map_err(|e| {
        log_operation_error!("make_portable", e, input = %input.display());
        e
    })?;

    for src in &report.inlined {
        println!("✅ Encoded: {}", src);
    }
    for failed in &report.failed {
        println!("❌ Failed to encode, keeping original: {} ({})", failed.src, failed.reason);
    }

    println!("📊 {}", report.summary());
    println!("Portable HTML created at: {}", output.display());
    Ok(())
}

fn handle_config(
    config: &VerseKitConfig,
    show: bool,
    init: bool,
    validate: bool,
) -> VerseKitResult<()> {
    if init {
        let config_path = get_config_path().ok_or_else(|| {
            versekit_core::config_error!("Could not determine a config directory", "config_init")
        })?;
        VerseKitConfig::default().save_to_file(&config_path)?;
        println!("✅ Configuration initialized at: {}", config_path.display());
    }

    if show || !(init || validate) {
        let rendered = toml::to_string_pretty(config).map_err(|e| VerseKitError::Config {
            message: format!("Failed to render configuration: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config_show"),
        })?;
        println!("📋 Current configuration:");
        println!("{}", rendered);
    }

    if validate {
        match config.validate() {
            Ok(()) => println!("✅ Configuration is valid"),
            Err(e) => {
                println!("❌ Configuration validation failed: {}", e);
                return Err(e);
            }
        }
    }

    Ok(())
}
