// file: src/utils/telemetry.rs
// description: timers, transfer metrics and health reports for setup checks
// reference: https://docs.rs/tracing

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    fn icon(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "✓",
            HealthStatus::Degraded => "⚠",
            HealthStatus::Unhealthy => "✗",
        }
    }
}

/// Outcome of one precondition probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub component: String,
    pub status: HealthStatus,
    pub message: Option<String>,
    pub response_time_ms: u64,
}

impl HealthCheck {
    pub fn healthy(component: &str, response_time: Duration) -> Self {
        Self::with_status(component, HealthStatus::Healthy, None, response_time)
    }

    pub fn degraded(component: &str, message: String, response_time: Duration) -> Self {
        Self::with_status(component, HealthStatus::Degraded, Some(message), response_time)
    }

    pub fn unhealthy(component: &str, message: String, response_time: Duration) -> Self {
        Self::with_status(component, HealthStatus::Unhealthy, Some(message), response_time)
    }

    fn with_status(
        component: &str,
        status: HealthStatus,
        message: Option<String>,
        response_time: Duration,
    ) -> Self {
        Self {
            component: component.to_string(),
            status,
            message,
            response_time_ms: response_time.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub overall_status: HealthStatus,
    pub checks: Vec<HealthCheck>,
    pub timestamp: i64,
    pub version: String,
}

impl HealthReport {
    pub fn new(checks: Vec<HealthCheck>, version: String) -> Self {
        let overall_status = if checks.iter().any(|c| c.status == HealthStatus::Unhealthy) {
            HealthStatus::Unhealthy
        } else if checks.iter().any(|c| c.status == HealthStatus::Degraded) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        Self {
            overall_status,
            checks,
            timestamp: chrono::Utc::now().timestamp(),
            version,
        }
    }

    pub fn is_usable(&self) -> bool {
        self.overall_status != HealthStatus::Unhealthy
    }

    /// Messages of every failed probe, in check order.
    pub fn failures(&self) -> Vec<String> {
        self.checks
            .iter()
            .filter(|c| c.status == HealthStatus::Unhealthy)
            .map(|c| match &c.message {
                Some(msg) => format!("{}: {}", c.component, msg),
                None => c.component.clone(),
            })
            .collect()
    }

    pub fn format(&self) -> String {
        let mut output = format!(
            "{} Setup: {:?}\n\
             Version: {}\n\
             Timestamp: {}\n\n",
            self.overall_status.icon(),
            self.overall_status,
            self.version,
            chrono::DateTime::from_timestamp(self.timestamp, 0)
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "unknown".to_string())
        );

        for check in &self.checks {
            output.push_str(&format!(
                "{} {} ({:?}) - {}ms",
                check.status.icon(),
                check.component,
                check.status,
                check.response_time_ms
            ));

            if let Some(ref msg) = check.message {
                output.push_str(&format!("\n  {}", msg));
            }

            output.push('\n');
        }

        output
    }
}

pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        debug!("Starting operation: {}", operation);
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn finish_with_bytes(self, bytes: u64) -> Duration {
        let elapsed = self.start.elapsed();
        let secs = elapsed.as_secs_f64();
        info!(
            "Completed {} - {:.2} MB in {:.2}s ({:.2} MB/s)",
            self.operation,
            bytes as f64 / BYTES_PER_MB,
            secs,
            if secs > 0.0 {
                bytes as f64 / BYTES_PER_MB / secs
            } else {
                0.0
            }
        );
        elapsed
    }
}

/// Throughput summary for an archive or transfer step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub operation: String,
    pub files: usize,
    pub bytes: u64,
    pub duration_ms: u64,
    pub files_per_second: f64,
    pub megabytes_per_second: f64,
}

impl PerformanceMetrics {
    pub fn new(operation: &str, files: usize, bytes: u64, duration: Duration) -> Self {
        let duration_secs = duration.as_secs_f64();
        let (files_per_second, megabytes_per_second) = if duration_secs > 0.0 {
            (
                files as f64 / duration_secs,
                bytes as f64 / BYTES_PER_MB / duration_secs,
            )
        } else {
            (0.0, 0.0)
        };

        Self {
            operation: operation.to_string(),
            files,
            bytes,
            duration_ms: duration.as_millis() as u64,
            files_per_second,
            megabytes_per_second,
        }
    }

    pub fn format(&self) -> String {
        format!(
            "{}: {} files, {:.2} MB in {}ms ({:.2} files/sec, {:.2} MB/s)",
            self.operation,
            self.files,
            self.bytes as f64 / BYTES_PER_MB,
            self.duration_ms,
            self.files_per_second,
            self.megabytes_per_second
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_report_overall_status() {
        let checks = vec![
            HealthCheck::healthy("config", Duration::from_millis(1)),
            HealthCheck::degraded("registry", "slow".to_string(), Duration::from_millis(900)),
        ];
        let report = HealthReport::new(checks, "0.1.0".to_string());
        assert_eq!(report.overall_status, HealthStatus::Degraded);
        assert!(report.is_usable());
        assert!(report.failures().is_empty());
    }

    #[test]
    fn test_health_report_failures() {
        let checks = vec![
            HealthCheck::healthy("config", Duration::from_millis(1)),
            HealthCheck::unhealthy(
                "scratch_dir",
                "read-only filesystem".to_string(),
                Duration::from_millis(2),
            ),
        ];
        let report = HealthReport::new(checks, "0.1.0".to_string());
        assert!(!report.is_usable());
        assert_eq!(report.failures(), vec!["scratch_dir: read-only filesystem"]);
        assert!(report.format().contains("✗ scratch_dir (Unhealthy)"));
    }

    #[test]
    fn test_performance_metrics() {
        let metrics = PerformanceMetrics::new(
            "archive",
            100,
            20 * 1024 * 1024,
            Duration::from_secs(10),
        );
        assert_eq!(metrics.files_per_second, 10.0);
        assert_eq!(metrics.megabytes_per_second, 2.0);
        assert!(metrics.format().starts_with("archive: 100 files, 20.00 MB"));
    }

    #[test]
    fn test_performance_metrics_zero_duration() {
        let metrics = PerformanceMetrics::new("archive", 3, 10, Duration::ZERO);
        assert_eq!(metrics.files_per_second, 0.0);
        assert_eq!(metrics.megabytes_per_second, 0.0);
    }

    #[test]
    fn test_operation_timer() {
        let timer = OperationTimer::new("test");
        std::thread::sleep(Duration::from_millis(10));
        let elapsed = timer.finish_with_bytes(1024);
        assert!(elapsed >= Duration::from_millis(10));
    }
}
