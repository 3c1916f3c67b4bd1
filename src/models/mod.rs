// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod repo;
pub mod request;

pub use repo::{RepoId, RepoType};
pub use request::{FAILURE_MARKER, UploadReceipt, UploadRequest};
