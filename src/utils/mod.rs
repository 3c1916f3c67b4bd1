// file: src/utils/mod.rs
// description: utility functions module exports
// reference: internal module structure

pub mod logging;
pub mod reporter;
pub mod telemetry;
pub mod validation;

pub use reporter::{MemoryReporter, ReportLevel, Reporter, TracingReporter};
pub use telemetry::{HealthCheck, HealthReport, HealthStatus, OperationTimer, PerformanceMetrics};
pub use validation::Validator;
