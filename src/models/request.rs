// file: src/models/request.rs
// description: invocation inputs and the receipt of a completed upload
// reference: internal data structures

use crate::models::RepoId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Prefix of every failure string returned to the pipeline host.
pub const FAILURE_MARKER: &str = "❌ ";

/// Raw string inputs of one invocation, exactly as the host supplied them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadRequest {
    pub token: String,
    pub repo_id: String,
    pub folder_path: String,
    #[serde(default)]
    pub archive_name: Option<String>,
}

impl UploadRequest {
    pub fn new(
        token: impl Into<String>,
        repo_id: impl Into<String>,
        folder_path: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            repo_id: repo_id.into(),
            folder_path: folder_path.into(),
            archive_name: None,
        }
    }

    pub fn with_archive_name(mut self, name: impl Into<String>) -> Self {
        self.archive_name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub url: String,
    pub repo_id: RepoId,
    pub archive_name: String,
    pub source_folder: PathBuf,
    pub files_archived: usize,
    pub archive_bytes: u64,
    pub sha256: String,
    #[serde(default)]
    pub commit_oid: Option<String>,
    pub created_repo: bool,
}
