// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{Result, UploadError};
use crate::models::RepoType;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_ENDPOINT: &str = "https://huggingface.co";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub registry: RegistryConfig,
    pub archive: ArchiveConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistryConfig {
    pub endpoint: String,
    #[serde(default)]
    pub repo_type: RepoType,
    pub revision: String,
    pub private: bool,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArchiveConfig {
    pub compression_level: i64,
    pub progress_interval: usize,
    pub show_progress: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    pub workspace_root: PathBuf,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let defaults = Self::default_config();
        let mut builder = config::Config::builder()
            .add_source(
                config::Config::try_from(&defaults)
                    .map_err(|e| UploadError::Config(e.to_string()))?,
            );

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder
                .add_source(config::File::from(Path::new("config/default.toml")).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("FOLDER_UPLOADER")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| UploadError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| UploadError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            registry: RegistryConfig {
                endpoint: DEFAULT_ENDPOINT.to_string(),
                repo_type: RepoType::Model,
                revision: "main".to_string(),
                private: false,
                timeout_secs: 300,
            },
            archive: ArchiveConfig {
                compression_level: 6,
                progress_interval: 50,
                show_progress: true,
            },
            search: SearchConfig {
                workspace_root: PathBuf::from("/workspace"),
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        let endpoint = self.registry.endpoint.trim();
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(UploadError::Config(format!(
                "registry.endpoint must be an http(s) URL, got '{}'",
                self.registry.endpoint
            )));
        }

        if self.registry.revision.trim().is_empty() {
            return Err(UploadError::Config(
                "registry.revision must not be empty".to_string(),
            ));
        }

        if self.registry.timeout_secs == 0 {
            return Err(UploadError::Config(
                "registry.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if !(0..=9).contains(&self.archive.compression_level) {
            return Err(UploadError::Config(format!(
                "archive.compression_level must be between 0 and 9, got {}",
                self.archive.compression_level
            )));
        }

        if self.archive.progress_interval == 0 {
            return Err(UploadError::Config(
                "archive.progress_interval must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
