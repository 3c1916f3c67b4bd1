// file: src/node.rs
// description: host integration surface describing the upload step and running it
// reference: node descriptor exported as json for the pipeline host

use crate::models::UploadRequest;
use crate::pipeline::UploadPipeline;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const NODE_NAME: &str = "FolderUploadNode";
pub const NODE_DISPLAY_NAME: &str = "Folder Upload to Hugging Face";
pub const NODE_CATEGORY: &str = "upload";
pub const OUTPUT_NAME: &str = "download_url";

pub const INPUT_TOKEN: &str = "hf_token";
pub const INPUT_REPO_ID: &str = "repo_id";
pub const INPUT_FOLDER_PATH: &str = "folder_path";
pub const INPUT_ARCHIVE_NAME: &str = "zip_name";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValueKind {
    String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    pub name: String,
    pub kind: ValueKind,
    pub default: String,
    pub multiline: bool,
    pub required: bool,
}

impl InputSpec {
    fn string(name: &str, default: &str, required: bool) -> Self {
        Self {
            name: name.to_string(),
            kind: ValueKind::String,
            default: default.to_string(),
            multiline: false,
            required,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub name: String,
    pub kind: ValueKind,
}

/// What the host needs to place this step in a graph.
///
/// `run_after` names upstream nodes that must finish first; their outputs are
/// never read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    pub name: String,
    pub display_name: String,
    pub category: String,
    pub inputs: Vec<InputSpec>,
    pub outputs: Vec<OutputSpec>,
    #[serde(default)]
    pub run_after: Vec<String>,
}

impl NodeDescriptor {
    pub fn upload_node() -> Self {
        Self {
            name: NODE_NAME.to_string(),
            display_name: NODE_DISPLAY_NAME.to_string(),
            category: NODE_CATEGORY.to_string(),
            inputs: vec![
                InputSpec::string(INPUT_TOKEN, "hf_your_token_here", true),
                InputSpec::string(INPUT_REPO_ID, "user/repo", true),
                InputSpec::string(INPUT_FOLDER_PATH, "/workspace/packs/example", true),
                InputSpec::string(INPUT_ARCHIVE_NAME, "", false),
            ],
            outputs: vec![OutputSpec {
                name: OUTPUT_NAME.to_string(),
                kind: ValueKind::String,
            }],
            run_after: Vec::new(),
        }
    }

    pub fn with_run_after<I, S>(mut self, upstream: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for node in upstream {
            let node = node.into();
            if !self.run_after.contains(&node) {
                self.run_after.push(node);
            }
        }
        self
    }

    pub fn to_json(&self, pretty: bool) -> crate::Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

pub struct UploadNode {
    descriptor: NodeDescriptor,
    pipeline: UploadPipeline,
}

impl UploadNode {
    pub fn new(pipeline: UploadPipeline) -> Self {
        Self {
            descriptor: NodeDescriptor::upload_node(),
            pipeline,
        }
    }

    pub fn with_run_after<I, S>(mut self, upstream: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.descriptor = self.descriptor.with_run_after(upstream);
        self
    }

    pub fn descriptor(&self) -> &NodeDescriptor {
        &self.descriptor
    }

    /// Maps host inputs by name; missing optional inputs fall back to blank.
    pub fn request_from_inputs(inputs: &HashMap<String, String>) -> UploadRequest {
        let get = |key: &str| inputs.get(key).cloned().unwrap_or_default();
        let archive_name = get(INPUT_ARCHIVE_NAME);

        UploadRequest {
            token: get(INPUT_TOKEN),
            repo_id: get(INPUT_REPO_ID),
            folder_path: get(INPUT_FOLDER_PATH),
            archive_name: (!archive_name.trim().is_empty()).then_some(archive_name),
        }
    }

    /// Returns the node's single output: a URL or a marked failure message.
    pub async fn execute(&self, inputs: &HashMap<String, String>) -> String {
        let request = Self::request_from_inputs(inputs);
        self.pipeline.run_to_output(&request).await
    }
}
