// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod archive;
pub mod config;
pub mod error;
pub mod models;
pub mod node;
pub mod pipeline;
pub mod registry;
pub mod utils;

pub use archive::{
    ArchiveBuilder, ArchiveSummary, Clock, FixedClock, FolderLocator, SystemClock,
    generate_archive_name,
};
pub use config::{ArchiveConfig, Config, RegistryConfig, SearchConfig};
pub use error::{Result, UploadError};
pub use models::{FAILURE_MARKER, RepoId, RepoType, UploadReceipt, UploadRequest};
pub use node::{NodeDescriptor, UploadNode};
pub use pipeline::{Preflight, UploadPipeline};
pub use registry::{CommitInfo, HubClient, LocalFile, UploadMode};
pub use utils::{
    HealthReport, HealthStatus, MemoryReporter, OperationTimer, PerformanceMetrics, Reporter,
    TracingReporter, Validator,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let config = Config::default_config();
        let _pipeline = UploadPipeline::new(config);
        let _descriptor = NodeDescriptor::upload_node();
    }
}
