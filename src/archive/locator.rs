// file: src/archive/locator.rs
// description: resolves a user supplied folder path against a fixed list of guesses
// reference: https://doc.rust-lang.org/std/fs/fn.canonicalize.html

use crate::config::SearchConfig;
use crate::error::{Result, UploadError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct FolderLocator {
    workspace_root: PathBuf,
}

impl FolderLocator {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            workspace_root: config.workspace_root,
        }
    }

    /// Paths tried in order, without duplicates.
    pub fn candidate_paths(&self, requested: &str) -> Vec<PathBuf> {
        let mut candidates: Vec<String> = Vec::new();

        if requested.starts_with('/') {
            candidates.push(requested.to_string());
        } else {
            candidates.push(format!("/{}", requested));
            candidates.push(requested.to_string());
        }

        candidates.push(format!("./{}", requested));
        candidates.push(format!("../{}", requested));

        let root = self.workspace_root.to_string_lossy();
        if requested.starts_with(&*root) {
            candidates.push(requested.to_string());
        } else {
            candidates.push(format!(
                "{}/{}",
                root.trim_end_matches('/'),
                requested.trim_start_matches('/')
            ));
        }

        let mut unique: Vec<PathBuf> = Vec::new();
        for candidate in candidates {
            let path = PathBuf::from(candidate);
            if !unique.contains(&path) {
                unique.push(path);
            }
        }
        unique
    }

    pub fn locate(&self, requested: &str) -> Result<PathBuf> {
        let requested = requested.trim();
        if requested.is_empty() {
            return Err(UploadError::Validation(
                "Folder path not provided".to_string(),
            ));
        }

        let candidates = self.candidate_paths(requested);
        for path in &candidates {
            debug!("Trying folder candidate: {}", path.display());
            if path.is_dir() {
                return canonical(path);
            }
        }

        Err(UploadError::FolderNotFound {
            requested: requested.to_string(),
            tried: candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
        })
    }
}

fn canonical(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).map_err(|e| UploadError::file_operation(path, e))
}
