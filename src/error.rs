// file: src/error.rs
// description: Custom error types, result alias and pipeline failure strings
// reference: https://docs.rs/thiserror

use crate::models::FAILURE_MARKER;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, UploadError>;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Setup check failed: {0}")]
    Setup(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid repository id '{repo_id}': {reason}")]
    InvalidRepoId { repo_id: String, reason: String },

    #[error("Folder not found: {requested} (tried {})", .tried.join(", "))]
    FolderNotFound {
        requested: String,
        tried: Vec<String>,
    },

    #[error("Folder is empty: {0}")]
    EmptyFolder(PathBuf),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("File operation failed for {path}: {source}")]
    FileOperation {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl UploadError {
    pub fn file_operation(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileOperation {
            path: path.into(),
            source,
        }
    }

    /// Single string handed back to the pipeline host when a run fails.
    pub fn failure_output(&self) -> String {
        let message = match self {
            Self::InvalidRepoId { .. } => "Invalid repository".to_string(),
            Self::FolderNotFound { .. } => "Folder not found".to_string(),
            Self::EmptyFolder(_) | Self::Archive(_) | Self::Zip(_) => {
                "Failed to create archive".to_string()
            }
            Self::Registry(_) | Self::Http(_) => "Upload failed".to_string(),
            Self::Setup(detail) => format!("Setup failed: {}", detail),
            other => format!("Error during processing: {}", other),
        };
        format!("{}{}", FAILURE_MARKER, message)
    }
}

impl From<serde_json::Error> for UploadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
