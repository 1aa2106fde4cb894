use std::path::PathBuf;

use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Export folder is not a directory: {}", .path.display())]
    NotADirectory { path: PathBuf },

    #[error(transparent)]
    Library(#[from] sfreport::Error),
}
