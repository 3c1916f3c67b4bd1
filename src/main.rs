// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use folder_uploader::utils::logging::{format_error, format_info, format_success};
use folder_uploader::{
    Config, NodeDescriptor, Preflight, RepoId, UploadPipeline, UploadRequest,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "folder_uploader")]
#[command(author = "cipher")]
#[command(version)]
#[command(about = "Archive a folder and upload it to a Hugging Face Hub repository", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Archive a folder and upload it
    Upload {
        #[arg(long, env = "HF_TOKEN", default_value = "", hide_env_values = true)]
        token: String,

        /// Destination repository as owner/name
        #[arg(long)]
        repo: String,

        #[arg(long)]
        folder: String,

        /// Base name of the archive; defaults to the folder name
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        skip_preflight: bool,
    },

    /// Build the archive locally without uploading
    Archive {
        #[arg(long)]
        folder: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Run the setup checks and print the report
    Check {
        #[arg(long)]
        offline: bool,
    },

    /// Print the node descriptor consumed by the pipeline host
    Describe {
        #[arg(short, long)]
        pretty: bool,

        /// Upstream nodes that must finish before this one
        #[arg(long = "after", value_name = "NODE")]
        run_after: Vec<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    colored::control::set_override(cli.color);
    let _log_guard = folder_uploader::utils::logging::init_logger(cli.color, cli.verbose);

    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Upload {
            token,
            repo,
            folder,
            name,
            skip_preflight,
        } => {
            cmd_upload(config, token, repo, folder, name, skip_preflight).await?;
        }
        Commands::Archive {
            folder,
            name,
            output,
        } => {
            cmd_archive(config, &folder, name.as_deref(), output)?;
        }
        Commands::Check { offline } => {
            cmd_check(&config, offline).await?;
        }
        Commands::Describe { pretty, run_after } => {
            cmd_describe(pretty, run_after)?;
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<Config> {
    info!("Loading configuration from: {}", path.display());

    let source = if path.exists() {
        Some(path)
    } else {
        warn!(
            "Config file {} not found, using defaults and environment",
            path.display()
        );
        None
    };

    Config::load(source).context("Failed to load configuration")
}

async fn cmd_upload(
    config: Config,
    token: String,
    repo: String,
    folder: String,
    name: Option<String>,
    skip_preflight: bool,
) -> Result<()> {
    if let Err(err) = RepoId::parse(&repo) {
        println!("{}", err.failure_output());
        return Err(anyhow::Error::new(err).context("Upload did not start"));
    }

    if !skip_preflight {
        Preflight::new(&config)
            .ensure_ready()
            .await
            .context("Setup checks failed")?;
    }

    let mut request = UploadRequest::new(token, repo, folder);
    if let Some(name) = name {
        request = request.with_archive_name(name);
    }

    let pipeline = UploadPipeline::new(config);
    let output = pipeline.run_to_output(&request).await;

    println!("{}", output);

    if output.starts_with(folder_uploader::FAILURE_MARKER) {
        return Err(anyhow::anyhow!("Upload did not complete"));
    }

    Ok(())
}

fn cmd_archive(config: Config, folder: &str, name: Option<&str>, output: PathBuf) -> Result<()> {
    let pipeline = UploadPipeline::new(config);
    let summary = pipeline
        .archive_only(folder, name, &output)
        .context("Failed to create archive")?;

    println!(
        "{}",
        format_success(&format!(
            "{} ({} entries, {:.2} MB)",
            summary.path.display(),
            summary.entries.len(),
            summary.size_mb()
        ))
    );
    println!("{}", format_info(&format!("sha256: {}", summary.sha256)));
    println!("{}", format_info(&summary.metrics.format()));

    Ok(())
}

async fn cmd_check(config: &Config, offline: bool) -> Result<()> {
    let preflight = Preflight::new(config);
    let preflight = if offline { preflight.offline() } else { preflight };
    let report = preflight.run().await;

    println!("{}", report.format());

    if !report.is_usable() {
        println!("{}", format_error("Setup is not usable"));
        return Err(anyhow::anyhow!(
            "Setup checks failed: {}",
            report.failures().join("; ")
        ));
    }

    Ok(())
}

fn cmd_describe(pretty: bool, run_after: Vec<String>) -> Result<()> {
    let descriptor = NodeDescriptor::upload_node().with_run_after(run_after);
    let json = descriptor
        .to_json(pretty)
        .context("Failed to serialize node descriptor")?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_malformed_repo_stops_before_setup_checks() {
        let mut server = Server::new_async().await;
        let any_request = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let mut config = Config::default_config();
        config.registry.endpoint = server.url();

        let result = cmd_upload(
            config,
            String::new(),
            "alice".to_string(),
            "demo".to_string(),
            None,
            false,
        )
        .await;

        assert!(result.is_err());
        any_request.assert_async().await;
    }

    #[test]
    fn test_invalid_environment_override_is_an_error() {
        let key = "FOLDER_UPLOADER__ARCHIVE__COMPRESSION_LEVEL";
        unsafe { std::env::set_var(key, "12") };
        let result = load_config(Path::new("/nonexistent/uploader.toml"));
        unsafe { std::env::remove_var(key) };

        assert!(result.is_err());
    }
}
