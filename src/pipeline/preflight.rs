// file: src/pipeline/preflight.rs
// description: one-time precondition checks run before any upload
// reference: health check reporting from the telemetry utilities

use crate::config::Config;
use crate::error::{Result, UploadError};
use crate::registry::HubClient;
use crate::utils::{HealthCheck, HealthReport, HealthStatus, Validator};
use std::io::Write;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const SLOW_REGISTRY: Duration = Duration::from_secs(5);

pub struct Preflight<'a> {
    config: &'a Config,
    probe_registry: bool,
}

impl<'a> Preflight<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            probe_registry: true,
        }
    }

    /// Skips the network round-trip; only local checks run.
    pub fn offline(mut self) -> Self {
        self.probe_registry = false;
        self
    }

    pub async fn run(&self) -> HealthReport {
        let mut checks = vec![
            self.check_config(),
            self.check_endpoint(),
            self.check_scratch_dir(),
        ];

        let local_ok = checks.iter().all(|c| c.status == HealthStatus::Healthy);
        if self.probe_registry && local_ok {
            checks.push(self.check_registry().await);
        }

        HealthReport::new(checks, env!("CARGO_PKG_VERSION").to_string())
    }

    /// Fails with [`UploadError::Setup`] when any check is unhealthy.
    pub async fn ensure_ready(&self) -> Result<HealthReport> {
        let report = self.run().await;

        if !report.is_usable() {
            return Err(UploadError::Setup(report.failures().join("; ")));
        }

        for check in &report.checks {
            if let Some(msg) = &check.message {
                warn!("{}: {}", check.component, msg);
            }
        }

        info!("Setup checks passed ({:?})", report.overall_status);
        Ok(report)
    }

    fn check_config(&self) -> HealthCheck {
        let start = Instant::now();
        match self.config.validate() {
            Ok(()) => HealthCheck::healthy("config", start.elapsed()),
            Err(e) => HealthCheck::unhealthy("config", e.to_string(), start.elapsed()),
        }
    }

    fn check_endpoint(&self) -> HealthCheck {
        let start = Instant::now();
        match Validator::validate_url(&self.config.registry.endpoint) {
            Ok(()) => HealthCheck::healthy("registry_endpoint", start.elapsed()),
            Err(e) => HealthCheck::unhealthy("registry_endpoint", e.to_string(), start.elapsed()),
        }
    }

    fn check_scratch_dir(&self) -> HealthCheck {
        let start = Instant::now();
        let probe = tempfile::tempfile().and_then(|mut file| file.write_all(b"probe"));
        match probe {
            Ok(()) => HealthCheck::healthy("scratch_dir", start.elapsed()),
            Err(e) => HealthCheck::unhealthy(
                "scratch_dir",
                format!("Temporary directory is not writable: {}", e),
                start.elapsed(),
            ),
        }
    }

    async fn check_registry(&self) -> HealthCheck {
        let start = Instant::now();
        let client = match HubClient::new(&self.config.registry, "") {
            Ok(client) => client,
            Err(e) => return HealthCheck::unhealthy("registry", e.to_string(), start.elapsed()),
        };

        match client.ping().await {
            Ok(elapsed) if elapsed > SLOW_REGISTRY => HealthCheck::degraded(
                "registry",
                format!("{} answered slowly", client.endpoint()),
                elapsed,
            ),
            Ok(elapsed) => HealthCheck::healthy("registry", elapsed),
            Err(e) => HealthCheck::unhealthy(
                "registry",
                format!("{} unreachable: {}", client.endpoint(), e),
                start.elapsed(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_offline_checks_pass_with_defaults() {
        let config = Config::default_config();
        let report = Preflight::new(&config).offline().run().await;
        assert_eq!(report.overall_status, HealthStatus::Healthy);
        assert_eq!(report.checks.len(), 3);
    }

    #[tokio::test]
    async fn test_malformed_endpoint_is_setup_failure() {
        let mut config = Config::default_config();
        config.registry.endpoint = "not-a-url".to_string();

        let err = Preflight::new(&config).ensure_ready().await.unwrap_err();
        match err {
            UploadError::Setup(msg) => {
                assert!(msg.contains("config"));
                assert!(msg.contains("registry_endpoint"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_reachable_registry() {
        let mut server = Server::new_async().await;
        let _root = server.mock("GET", "/").with_status(200).create_async().await;

        let mut config = Config::default_config();
        config.registry.endpoint = server.url();

        let report = Preflight::new(&config).ensure_ready().await.unwrap();
        assert_eq!(report.checks.len(), 4);
        assert!(report.checks.iter().any(|c| c.component == "registry"));
    }

    #[tokio::test]
    async fn test_unreachable_registry() {
        let mut config = Config::default_config();
        config.registry.endpoint = "http://127.0.0.1:9".to_string();
        config.registry.timeout_secs = 2;

        let report = Preflight::new(&config).run().await;
        assert_eq!(report.overall_status, HealthStatus::Unhealthy);
        assert_eq!(report.failures().len(), 1);
    }
}
