// file: src/registry/client.rs
// description: Hugging Face Hub HTTP client for repo lookup, creation and single file commits
// reference: https://huggingface.co/docs/hub/api, https://github.com/git-lfs/git-lfs/blob/main/docs/api/batch.md

use crate::config::RegistryConfig;
use crate::error::{Result, UploadError};
use crate::models::{RepoId, RepoType};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

const SAMPLE_BYTES: u64 = 512;
const LFS_CONTENT_TYPE: &str = "application/vnd.git-lfs+json";

#[derive(Debug, Serialize)]
struct CreateRepoRequest<'a> {
    name: &'a str,
    organization: &'a str,
    #[serde(rename = "type")]
    repo_type: &'a str,
    private: bool,
}

#[derive(Debug, Serialize)]
struct PreuploadRequest<'a> {
    files: [PreuploadFile<'a>; 1],
}

#[derive(Debug, Serialize)]
struct PreuploadFile<'a> {
    path: &'a str,
    sample: String,
    size: u64,
}

#[derive(Debug, Default, Deserialize)]
struct PreuploadResponse {
    #[serde(default)]
    files: Vec<PreuploadVerdict>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreuploadVerdict {
    path: String,
    #[serde(default)]
    upload_mode: UploadMode,
}

/// Transport the Hub picked for a file during preupload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    #[default]
    Regular,
    Lfs,
}

#[derive(Debug, Serialize)]
struct LfsBatchRequest<'a> {
    operation: &'static str,
    transfers: [&'static str; 1],
    objects: [LfsPointer<'a>; 1],
    hash_algo: &'static str,
    #[serde(rename = "ref")]
    reference: LfsRef<'a>,
}

#[derive(Debug, Serialize)]
struct LfsPointer<'a> {
    oid: &'a str,
    size: u64,
}

#[derive(Debug, Serialize)]
struct LfsRef<'a> {
    name: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct LfsBatchResponse {
    #[serde(default)]
    objects: Vec<LfsObject>,
}

#[derive(Debug, Deserialize)]
struct LfsObject {
    oid: String,
    #[serde(default)]
    actions: Option<LfsActions>,
    #[serde(default)]
    error: Option<LfsObjectError>,
}

#[derive(Debug, Deserialize)]
struct LfsActions {
    #[serde(default)]
    upload: Option<LfsAction>,
    #[serde(default)]
    verify: Option<LfsAction>,
}

#[derive(Debug, Deserialize)]
struct LfsAction {
    href: String,
    #[serde(default)]
    header: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct LfsObjectError {
    code: i64,
    message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitResponse {
    #[serde(default)]
    commit_oid: Option<String>,
}

/// A local file ready to commit, with the digest the archiver already computed.
#[derive(Debug, Clone, Copy)]
pub struct LocalFile<'a> {
    pub path: &'a Path,
    pub sha256: &'a str,
    pub size: u64,
}

/// Result of a successful single-file commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub url: String,
    pub mode: UploadMode,
    pub commit_oid: Option<String>,
}

pub struct HubClient {
    client: Client,
    endpoint: String,
    token: String,
    repo_type: RepoType,
    revision: String,
    private: bool,
}

impl HubClient {
    pub fn new(config: &RegistryConfig, token: impl Into<String>) -> Result<Self> {
        let user_agent = format!("folder_uploader/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            token: token.into(),
            repo_type: config.repo_type,
            revision: config.revision.clone(),
            private: config.private,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        if self.token.is_empty() {
            request
        } else {
            request.bearer_auth(&self.token)
        }
    }

    fn repo_api_url(&self, repo: &RepoId) -> String {
        format!(
            "{}/api/{}/{}",
            self.endpoint,
            self.repo_type.api_segment(),
            repo
        )
    }

    fn lfs_batch_url(&self, repo: &RepoId) -> String {
        format!(
            "{}/{}{}.git/info/lfs/objects/batch",
            self.endpoint,
            self.repo_type.url_prefix(),
            repo
        )
    }

    /// Browsable URL of a file in the configured revision.
    pub fn file_url(&self, repo: &RepoId, path_in_repo: &str) -> String {
        format!(
            "{}/{}{}/blob/{}/{}",
            self.endpoint,
            self.repo_type.url_prefix(),
            repo,
            self.revision,
            path_in_repo
        )
    }

    /// Round-trip time to the endpoint; any HTTP answer counts as reachable.
    pub async fn ping(&self) -> Result<Duration> {
        let start = Instant::now();
        let response = self.client.get(&self.endpoint).send().await?;
        debug!(
            "Registry {} answered with {}",
            self.endpoint,
            response.status()
        );
        Ok(start.elapsed())
    }

    /// Lookup failures of any kind are reported as "absent".
    pub async fn repo_exists(&self, repo: &RepoId) -> bool {
        let request = self.authorized(self.client.get(self.repo_api_url(repo)));
        match request.send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                debug!("Repository lookup for {} returned {}", repo, response.status());
                false
            }
            Err(e) => {
                debug!("Repository lookup for {} failed: {}", repo, e);
                false
            }
        }
    }

    pub async fn create_repo(&self, repo: &RepoId) -> Result<()> {
        let url = format!("{}/api/repos/create", self.endpoint);
        let body = CreateRepoRequest {
            name: repo.name(),
            organization: repo.owner(),
            repo_type: self.repo_type.as_str(),
            private: self.private,
        };

        let response = self
            .authorized(self.client.post(url))
            .json(&body)
            .send()
            .await
            .map_err(|e| UploadError::Registry(format!("Failed to send create request: {}", e)))?;

        let status = response.status();
        if status.is_success() || status == StatusCode::CONFLICT {
            debug!("Create repository {} returned {}", repo, status);
            return Ok(());
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(UploadError::Registry(format!(
            "Creating repository {} failed with status {}: {}",
            repo, status, error_text
        )))
    }

    /// Returns `true` when the repository had to be created.
    pub async fn ensure_repo(&self, repo: &RepoId) -> Result<bool> {
        if self.repo_exists(repo).await {
            info!("Repository found: {}", repo);
            return Ok(false);
        }

        info!("Creating repository: {}", repo);
        self.create_repo(repo).await?;
        Ok(true)
    }

    /// Asks the Hub whether `path_in_repo` must travel inline or through LFS.
    pub async fn preupload(
        &self,
        repo: &RepoId,
        file: &LocalFile<'_>,
        path_in_repo: &str,
    ) -> Result<UploadMode> {
        let sample = read_sample(file.path).await?;
        let body = PreuploadRequest {
            files: [PreuploadFile {
                path: path_in_repo,
                sample: STANDARD.encode(&sample),
                size: file.size,
            }],
        };

        let url = format!("{}/preupload/{}", self.repo_api_url(repo), self.revision);
        let response = self
            .authorized(self.client.post(url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                UploadError::Registry(format!("Failed to send preupload request: {}", e))
            })?;
        let response = ensure_success(response, "Preupload").await?;

        let verdict: PreuploadResponse = response.json().await.map_err(|e| {
            UploadError::Registry(format!("Malformed preupload response: {}", e))
        })?;
        let mode = verdict
            .files
            .into_iter()
            .find(|f| f.path == path_in_repo)
            .map(|f| f.upload_mode)
            .ok_or_else(|| {
                UploadError::Registry(format!(
                    "Preupload response does not mention {}",
                    path_in_repo
                ))
            })?;

        debug!("Upload mode for {}: {:?}", path_in_repo, mode);
        Ok(mode)
    }

    /// Stores the file content as an LFS object keyed by its SHA-256.
    pub async fn upload_lfs(&self, repo: &RepoId, file: &LocalFile<'_>) -> Result<()> {
        let body = LfsBatchRequest {
            operation: "upload",
            transfers: ["basic"],
            objects: [LfsPointer {
                oid: file.sha256,
                size: file.size,
            }],
            hash_algo: "sha256",
            reference: LfsRef {
                name: &self.revision,
            },
        };

        let response = self
            .authorized(self.client.post(self.lfs_batch_url(repo)))
            .header(ACCEPT, LFS_CONTENT_TYPE)
            .header(CONTENT_TYPE, LFS_CONTENT_TYPE)
            .body(serde_json::to_vec(&body)?)
            .send()
            .await
            .map_err(|e| UploadError::Registry(format!("Failed to send LFS batch request: {}", e)))?;
        let response = ensure_success(response, "LFS batch").await?;

        let batch: LfsBatchResponse = response
            .json()
            .await
            .map_err(|e| UploadError::Registry(format!("Malformed LFS batch response: {}", e)))?;
        let object = batch
            .objects
            .into_iter()
            .find(|o| o.oid == file.sha256)
            .ok_or_else(|| {
                UploadError::Registry(format!("LFS batch response omits object {}", file.sha256))
            })?;

        if let Some(error) = object.error {
            return Err(UploadError::Registry(format!(
                "LFS object {} rejected ({}): {}",
                file.sha256, error.code, error.message
            )));
        }

        let Some(actions) = object.actions else {
            info!("LFS object {} already stored", file.sha256);
            return Ok(());
        };

        if let Some(upload) = actions.upload {
            if upload.header.contains_key("chunk_size") {
                return Err(UploadError::Registry(
                    "Multipart LFS transfer is not supported".to_string(),
                ));
            }
            self.put_object(&upload, file).await?;
        }

        if let Some(verify) = actions.verify {
            self.verify_object(&verify, file).await?;
        }

        Ok(())
    }

    /// One streamed PUT of the whole file.
    async fn put_object(&self, action: &LfsAction, file: &LocalFile<'_>) -> Result<()> {
        let source = tokio::fs::File::open(file.path)
            .await
            .map_err(|e| UploadError::file_operation(file.path, e))?;

        let mut request = self
            .client
            .put(&action.href)
            .header(CONTENT_LENGTH, file.size);
        for (name, value) in &action.header {
            request = request.header(name.as_str(), value.as_str());
        }

        debug!("Sending {} bytes to LFS storage", file.size);
        let response = request
            .body(Body::from(source))
            .send()
            .await
            .map_err(|e| UploadError::Registry(format!("Failed to send LFS object: {}", e)))?;
        ensure_success(response, "LFS upload").await?;
        Ok(())
    }

    async fn verify_object(&self, action: &LfsAction, file: &LocalFile<'_>) -> Result<()> {
        let mut request = self.authorized(self.client.post(&action.href));
        for (name, value) in &action.header {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .json(&LfsPointer {
                oid: file.sha256,
                size: file.size,
            })
            .send()
            .await
            .map_err(|e| UploadError::Registry(format!("Failed to send LFS verify: {}", e)))?;
        ensure_success(response, "LFS verify").await?;
        Ok(())
    }

    /// Commits one local file at `path_in_repo`, through LFS when the Hub asks for it.
    pub async fn upload_file(
        &self,
        repo: &RepoId,
        file: &LocalFile<'_>,
        path_in_repo: &str,
        commit_message: &str,
    ) -> Result<CommitInfo> {
        let mode = self.preupload(repo, file, path_in_repo).await?;

        let operation = match mode {
            UploadMode::Lfs => {
                self.upload_lfs(repo, file).await?;
                lfs_file_line(path_in_repo, file)
            }
            UploadMode::Regular => {
                let content = tokio::fs::read(file.path)
                    .await
                    .map_err(|e| UploadError::file_operation(file.path, e))?;
                regular_file_line(path_in_repo, &content)
            }
        };
        let body = commit_payload(commit_message, &operation)?;

        let url = format!(
            "{}/commit/{}",
            self.repo_api_url(repo),
            self.revision
        );
        debug!(
            "Committing {} ({} bytes, {:?}) to {}",
            path_in_repo, file.size, mode, url
        );

        let response = self
            .authorized(self.client.post(url))
            .header(CONTENT_TYPE, "application/x-ndjson")
            .body(body)
            .send()
            .await
            .map_err(|e| UploadError::Registry(format!("Failed to send commit request: {}", e)))?;
        let response = ensure_success(response, "Commit").await?;

        let commit: CommitResponse = response.json().await.unwrap_or_default();

        Ok(CommitInfo {
            url: self.file_url(repo, path_in_repo),
            mode,
            commit_oid: commit.commit_oid,
        })
    }
}

async fn ensure_success(response: Response, step: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(UploadError::Registry(format!(
        "{} failed with status {}: {}",
        step, status, error_text
    )))
}

async fn read_sample(path: &Path) -> Result<Vec<u8>> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| UploadError::file_operation(path, e))?;
    let mut sample = Vec::new();
    file.take(SAMPLE_BYTES)
        .read_to_end(&mut sample)
        .await
        .map_err(|e| UploadError::file_operation(path, e))?;
    Ok(sample)
}

fn lfs_file_line(path_in_repo: &str, file: &LocalFile<'_>) -> Value {
    json!({
        "key": "lfsFile",
        "value": {
            "path": path_in_repo,
            "algo": "sha256",
            "oid": file.sha256,
            "size": file.size
        }
    })
}

fn regular_file_line(path_in_repo: &str, content: &[u8]) -> Value {
    json!({
        "key": "file",
        "value": {
            "path": path_in_repo,
            "content": STANDARD.encode(content),
            "encoding": "base64"
        }
    })
}

/// NDJSON body: a header line followed by one file operation line.
fn commit_payload(summary: &str, operation: &Value) -> Result<String> {
    let header = json!({
        "key": "header",
        "value": { "summary": summary, "description": "" }
    });

    Ok(format!(
        "{}\n{}\n",
        serde_json::to_string(&header)?,
        serde_json::to_string(operation)?
    ))
}
