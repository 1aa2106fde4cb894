//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O, CSV, and workbook errors, and provides semantic variants
//! for configuration lookup, crawler invocation, and export parsing failures.
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Crawler config file not found: {}", .path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid settings file {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    #[error("Screaming Frog binary not found (tried: {})", format_tried(.tried))]
    BinaryNotFound { tried: Vec<PathBuf> },

    #[error("Screaming Frog failed: {message}{}", format_stderr(.stderr))]
    ExternalTool { message: String, stderr: String },

    #[error("Malformed row in {} at line {line}: {message}", .path.display())]
    CsvParse {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error(
        "No valid CSV rows found in {}. Expected Issues Overview and/or Accessibility Violations exports.",
        .dir.display()
    )]
    NoValidRows { dir: PathBuf },

    #[error("Input not found: {}", .path.display())]
    InputNotFound { path: PathBuf },

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },
}

impl Error {
    pub fn external<M: Into<String>>(message: M) -> Self {
        Error::ExternalTool {
            message: message.into(),
            stderr: String::new(),
        }
    }
}

fn format_tried(tried: &[PathBuf]) -> String {
    if tried.is_empty() {
        return "no candidates".to_string();
    }
    tried
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("\n{trimmed}")
    }
}
