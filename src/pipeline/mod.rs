// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: pipeline orchestration

mod orchestrator;
mod preflight;

pub use orchestrator::UploadPipeline;
pub use preflight::Preflight;
