// file: src/registry/mod.rs
// description: remote artifact registry access
// reference: internal module structure

pub mod client;

pub use client::{CommitInfo, HubClient, LocalFile, UploadMode};
