// file: src/pipeline/orchestrator.rs
// description: resolve folder, validate inputs, build the archive and upload it
// reference: sequential upload workflow

use crate::archive::{
    ArchiveBuilder, ArchiveSummary, Clock, FolderLocator, SystemClock, generate_archive_name,
};
use crate::config::Config;
use crate::error::{Result, UploadError};
use crate::models::{RepoId, UploadReceipt, UploadRequest};
use crate::registry::{CommitInfo, HubClient, LocalFile};
use crate::utils::{OperationTimer, Reporter, TracingReporter, Validator};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const TOTAL_STEPS: usize = 4;
const SEPARATOR_WIDTH: usize = 50;
const VISIBLE_TOKEN_CHARS: usize = 10;

pub struct UploadPipeline {
    config: Config,
    reporter: Arc<dyn Reporter>,
    clock: Arc<dyn Clock>,
}

impl UploadPipeline {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            reporter: Arc::new(TracingReporter),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs the whole procedure and collapses the outcome into the single host string.
    pub async fn run_to_output(&self, request: &UploadRequest) -> String {
        match self.run(request).await {
            Ok(receipt) => receipt.url,
            Err(err) => {
                self.reporter.error(&err.to_string());
                err.failure_output()
            }
        }
    }

    pub async fn run(&self, request: &UploadRequest) -> Result<UploadReceipt> {
        self.reporter.info(&format!(
            "Folder Uploader v{}",
            env!("CARGO_PKG_VERSION")
        ));
        self.reporter.info(&"=".repeat(SEPARATOR_WIDTH));

        self.reporter.step(1, TOTAL_STEPS, "Validating inputs");
        let repo_id = self.validate_inputs(request)?;

        self.reporter.step(2, TOTAL_STEPS, "Locating folder");
        let folder = self.locate_folder(&request.folder_path)?;

        let archive_name =
            generate_archive_name(&folder, request.archive_name.as_deref(), self.clock.now());

        self.reporter.info("Settings:");
        self.reporter.info(&format!("  Folder: {}", folder.display()));
        self.reporter.info(&format!("  Archive: {}", archive_name));
        self.reporter.info(&format!("  Destination: {}", repo_id));
        self.reporter.info(&format!(
            "  Token: {}",
            Validator::mask_secret(&request.token, VISIBLE_TOKEN_CHARS)
        ));

        let scratch = tempfile::tempdir()?;
        let archive_path = scratch.path().join(&archive_name);

        self.reporter.step(3, TOTAL_STEPS, "Creating archive");
        let summary = self.build_archive_at(&folder, &archive_path)?;

        self.reporter.step(4, TOTAL_STEPS, "Uploading archive");
        let (commit, created_repo) = self
            .upload(&repo_id, &request.token, &summary, &archive_name)
            .await?;
        let url = commit.url;

        self.reporter.success("Process completed successfully");
        self.reporter.info(&"=".repeat(SEPARATOR_WIDTH));
        self.reporter.info(&format!("File: {}", archive_name));
        self.reporter.info(&format!("Repository: {}", repo_id));
        self.reporter.info(&format!("URL: {}", url));
        self.reporter.info(&"=".repeat(SEPARATOR_WIDTH));

        Ok(UploadReceipt {
            url,
            repo_id,
            archive_name,
            source_folder: folder,
            files_archived: summary.files,
            archive_bytes: summary.archive_bytes,
            sha256: summary.sha256,
            commit_oid: commit.commit_oid,
            created_repo,
        })
    }

    /// Builds the archive into `output_dir` without contacting the registry.
    pub fn archive_only(
        &self,
        folder_path: &str,
        archive_name: Option<&str>,
        output_dir: &Path,
    ) -> Result<ArchiveSummary> {
        let folder = self.locate_folder(folder_path)?;
        let name = generate_archive_name(&folder, archive_name, self.clock.now());

        std::fs::create_dir_all(output_dir)
            .map_err(|e| UploadError::file_operation(output_dir, e))?;
        self.build_archive_at(&folder, &output_dir.join(name))
    }

    fn validate_inputs(&self, request: &UploadRequest) -> Result<RepoId> {
        for warning in Validator::validate_token(&request.token) {
            self.reporter.warn(&warning);
        }

        Validator::validate_repo_id(&request.repo_id).inspect_err(|_| {
            self.reporter
                .error("Repository must be in the form 'owner/name'");
        })
    }

    fn locate_folder(&self, requested: &str) -> Result<PathBuf> {
        self.reporter
            .info(&format!("Looking for folder: {}", requested));
        let locator = FolderLocator::new(self.config.search.clone());

        match locator.locate(requested) {
            Ok(folder) => {
                self.reporter
                    .success(&format!("Folder found: {}", folder.display()));
                Ok(folder)
            }
            Err(err) => {
                if let UploadError::FolderNotFound { tried, .. } = &err {
                    self.reporter.error("Folder not found");
                    self.reporter.info("Paths tried:");
                    for path in tried {
                        self.reporter.info(&format!("  - {}", path));
                    }
                }
                Err(err)
            }
        }
    }

    fn build_archive_at(&self, folder: &Path, destination: &Path) -> Result<ArchiveSummary> {
        let timer = OperationTimer::new("archive");
        let builder = ArchiveBuilder::new(self.config.archive.clone());
        let summary = builder.build(folder, destination, self.reporter.as_ref())?;
        timer.finish_with_bytes(summary.source_bytes);
        Ok(summary)
    }

    async fn upload(
        &self,
        repo_id: &RepoId,
        token: &str,
        summary: &ArchiveSummary,
        archive_name: &str,
    ) -> Result<(CommitInfo, bool)> {
        self.reporter
            .info(&format!("Starting upload to: {}", repo_id));
        let client = HubClient::new(&self.config.registry, token)?;

        let created = client.ensure_repo(repo_id).await.inspect_err(|e| {
            self.reporter.error(&format!("Upload error: {}", e));
        })?;
        if created {
            self.reporter
                .info(&format!("Created repository: {}", repo_id));
        } else {
            self.reporter
                .info(&format!("Repository found: {}", repo_id));
        }

        self.reporter.info(&format!("Uploading: {}", archive_name));
        self.reporter
            .info("Upload in progress... (may take a while depending on size)");

        let timer = OperationTimer::new("upload");
        let commit_message = format!("Automatic upload: {}", archive_name);
        let file = LocalFile {
            path: &summary.path,
            sha256: &summary.sha256,
            size: summary.archive_bytes,
        };
        let commit = client
            .upload_file(repo_id, &file, archive_name, &commit_message)
            .await
            .inspect_err(|e| {
                self.reporter.error(&format!("Upload error: {}", e));
            })?;
        timer.finish_with_bytes(summary.archive_bytes);

        self.reporter.success("Upload completed successfully");
        self.reporter.info(&format!("Transfer: {:?}", commit.mode));
        self.reporter.info(&format!("URL: {}", commit.url));
        Ok((commit, created))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::FixedClock;
    use crate::models::FAILURE_MARKER;
    use crate::utils::{MemoryReporter, ReportLevel};
    use chrono::NaiveDate;
    use mockito::{Matcher, Server};
    use std::fs;
    use tempfile::TempDir;

    fn fixed_clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock(
            NaiveDate::from_ymd_opt(2024, 3, 9)
                .unwrap()
                .and_hms_opt(14, 5, 7)
                .unwrap(),
        ))
    }

    fn pipeline(endpoint: &str, reporter: Arc<MemoryReporter>) -> UploadPipeline {
        let mut config = Config::default_config();
        config.registry.endpoint = endpoint.to_string();
        config.registry.timeout_secs = 5;
        config.archive.show_progress = false;
        UploadPipeline::new(config)
            .with_reporter(reporter)
            .with_clock(fixed_clock())
    }

    fn demo_tree(temp: &TempDir) -> PathBuf {
        let root = temp.path().join("demo");
        fs::create_dir_all(root.join("b")).unwrap();
        fs::create_dir_all(root.join("d")).unwrap();
        fs::write(root.join("a.txt"), "alpha").unwrap();
        fs::write(root.join("b/c.txt"), "gamma").unwrap();
        root
    }

    fn preupload_answer(path: &str, mode: &str) -> String {
        serde_json::json!({ "files": [{ "path": path, "uploadMode": mode }] })
        .to_string()
    }

    #[tokio::test]
    async fn test_end_to_end_upload() {
        let temp = TempDir::new().unwrap();
        let root = demo_tree(&temp);

        let mut server = Server::new_async().await;
        let lookup = server
            .mock("GET", "/api/models/alice/packs")
            .with_status(404)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/api/repos/create")
            .with_status(200)
            .create_async()
            .await;
        let preupload = server
            .mock("POST", "/api/models/alice/packs/preupload/main")
            .with_status(200)
            .with_body(preupload_answer("demo_20240309_140507.zip", "lfs"))
            .create_async()
            .await;
        let batch = server
            .mock("POST", "/alice/packs.git/info/lfs/objects/batch")
            .with_status(200)
            .with_body_from_request(|request| {
                let sent: serde_json::Value =
                    serde_json::from_slice(request.body().unwrap()).unwrap();
                let object = &sent["objects"][0];
                serde_json::json!({
                    "objects": [{ "oid": object["oid"], "size": object["size"] }]
                })
                .to_string()
                .into_bytes()
            })
            .create_async()
            .await;
        let commit = server
            .mock("POST", "/api/models/alice/packs/commit/main")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#""path":"demo_20240309_140507.zip""#.to_string()),
                Matcher::Regex(r#""key":"lfsFile""#.to_string()),
            ]))
            .with_status(200)
            .with_body(r#"{"commitOid":"abc"}"#)
            .create_async()
            .await;

        let reporter = Arc::new(MemoryReporter::new());
        let pipeline = pipeline(&server.url(), reporter.clone());
        let request = UploadRequest::new(
            "hf_abcdefghijklmnopqrstuvwxyz",
            "alice/packs",
            root.to_str().unwrap(),
        );

        let receipt = pipeline.run(&request).await.unwrap();

        lookup.assert_async().await;
        create.assert_async().await;
        preupload.assert_async().await;
        batch.assert_async().await;
        commit.assert_async().await;
        assert_eq!(receipt.archive_name, "demo_20240309_140507.zip");
        assert_eq!(receipt.commit_oid.as_deref(), Some("abc"));
        assert_eq!(receipt.sha256.len(), 64);
        assert_eq!(receipt.files_archived, 2);
        assert!(receipt.created_repo);
        assert_eq!(
            receipt.url,
            format!("{}/alice/packs/blob/main/demo_20240309_140507.zip", server.url())
        );
        assert!(reporter.messages(ReportLevel::Warning).is_empty());
        assert!(reporter.contains("Token: hf_abcdefg..."));
    }

    #[tokio::test]
    async fn test_invalid_repo_rejected_before_network() {
        let temp = TempDir::new().unwrap();
        let root = demo_tree(&temp);

        let mut server = Server::new_async().await;
        let any_request = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let any_post = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let reporter = Arc::new(MemoryReporter::new());
        let pipeline = pipeline(&server.url(), reporter.clone());
        let request = UploadRequest::new("hf_token", "alice", root.to_str().unwrap());

        let output = pipeline.run_to_output(&request).await;

        assert_eq!(output, "❌ Invalid repository");
        any_request.assert_async().await;
        any_post.assert_async().await;
        assert!(!reporter.contains("Creating archive"));
    }

    #[tokio::test]
    async fn test_custom_name_and_token_warnings() {
        let temp = TempDir::new().unwrap();
        let root = demo_tree(&temp);

        let mut server = Server::new_async().await;
        let _lookup = server
            .mock("GET", "/api/models/alice/packs")
            .with_status(200)
            .create_async()
            .await;
        let _preupload = server
            .mock("POST", "/api/models/alice/packs/preupload/main")
            .with_status(200)
            .with_body(preupload_answer("release_20240309_140507.zip", "regular"))
            .create_async()
            .await;
        let _commit = server
            .mock("POST", "/api/models/alice/packs/commit/main")
            .with_status(200)
            .create_async()
            .await;

        let reporter = Arc::new(MemoryReporter::new());
        let pipeline = pipeline(&server.url(), reporter.clone());
        let request = UploadRequest::new("short", "alice/packs", root.to_str().unwrap())
            .with_archive_name("release.zip");

        let receipt = pipeline.run(&request).await.unwrap();

        assert_eq!(receipt.archive_name, "release_20240309_140507.zip");
        assert!(!receipt.created_repo);
        assert_eq!(reporter.messages(ReportLevel::Warning).len(), 2);
    }

    #[tokio::test]
    async fn test_empty_folder_output() {
        let temp = TempDir::new().unwrap();
        let empty = temp.path().join("empty");
        fs::create_dir_all(&empty).unwrap();

        let reporter = Arc::new(MemoryReporter::new());
        let pipeline = pipeline("http://127.0.0.1:9", reporter);
        let request = UploadRequest::new("hf_token", "alice/packs", empty.to_str().unwrap());

        let output = pipeline.run_to_output(&request).await;
        assert_eq!(output, format!("{}Failed to create archive", FAILURE_MARKER));
    }

    #[tokio::test]
    async fn test_missing_folder_output() {
        let reporter = Arc::new(MemoryReporter::new());
        let pipeline = pipeline("http://127.0.0.1:9", reporter.clone());
        let request = UploadRequest::new("hf_token", "alice/packs", "no-such-folder-7781");

        let output = pipeline.run_to_output(&request).await;
        assert_eq!(output, "❌ Folder not found");
        assert!(reporter.contains("Paths tried:"));
    }

    #[tokio::test]
    async fn test_upload_error_output() {
        let temp = TempDir::new().unwrap();
        let root = demo_tree(&temp);

        let mut server = Server::new_async().await;
        let _lookup = server
            .mock("GET", "/api/models/alice/packs")
            .with_status(200)
            .create_async()
            .await;
        let _preupload = server
            .mock("POST", "/api/models/alice/packs/preupload/main")
            .with_status(200)
            .with_body(preupload_answer("demo_20240309_140507.zip", "regular"))
            .create_async()
            .await;
        let _commit = server
            .mock("POST", "/api/models/alice/packs/commit/main")
            .with_status(500)
            .create_async()
            .await;

        let reporter = Arc::new(MemoryReporter::new());
        let pipeline = pipeline(&server.url(), reporter);
        let request = UploadRequest::new("hf_token", "alice/packs", root.to_str().unwrap());

        assert_eq!(pipeline.run_to_output(&request).await, "❌ Upload failed");
    }

    #[test]
    fn test_archive_only_writes_to_output_dir() {
        let temp = TempDir::new().unwrap();
        let root = demo_tree(&temp);
        let out = temp.path().join("out");

        let pipeline = pipeline("http://127.0.0.1:9", Arc::new(MemoryReporter::new()));
        let summary = pipeline
            .archive_only(root.to_str().unwrap(), None, &out)
            .unwrap();

        assert_eq!(summary.path, out.join("demo_20240309_140507.zip"));
        assert!(summary.path.exists());
        assert_eq!(summary.entries, vec!["a.txt", "b/c.txt", "d/"]);
    }
}
