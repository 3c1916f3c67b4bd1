// file: src/utils/validation.rs
// description: input validation for credentials, destinations and endpoints
// reference: input validation patterns

use crate::error::{Result, UploadError};
use crate::models::RepoId;

pub const TOKEN_PREFIX: &str = "hf_";
pub const MIN_TOKEN_LENGTH: usize = 20;

pub struct Validator;

impl Validator {
    /// Credential problems never abort a run; they come back as warnings.
    pub fn validate_token(token: &str) -> Vec<String> {
        let mut warnings = Vec::new();

        if token.is_empty() {
            warnings.push("Token not provided".to_string());
            return warnings;
        }

        if !token.starts_with(TOKEN_PREFIX) {
            warnings.push(format!(
                "Token may be invalid (expected it to start with '{}')",
                TOKEN_PREFIX
            ));
        }

        if token.len() < MIN_TOKEN_LENGTH {
            warnings.push("Token looks too short".to_string());
        }

        warnings
    }

    pub fn validate_repo_id(raw: &str) -> Result<RepoId> {
        RepoId::parse(raw)
    }

    pub fn validate_url(url: &str) -> Result<()> {
        let rest = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"));

        match rest {
            Some(host) if !host.is_empty() && !host.starts_with('/') => Ok(()),
            _ => Err(UploadError::Validation(format!(
                "Invalid URL format: {}",
                url
            ))),
        }
    }

    pub fn mask_secret(secret: &str, visible: usize) -> String {
        let prefix: String = secret.chars().take(visible).collect();
        format!("{}...", prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_token_warnings() {
        assert!(Validator::validate_token("hf_abcdefghijklmnopqrstuvwxyz").is_empty());
        assert_eq!(Validator::validate_token(""), vec!["Token not provided"]);

        let warnings = Validator::validate_token("abc");
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("hf_"));
        assert!(warnings[1].contains("short"));

        assert_eq!(Validator::validate_token("hf_short").len(), 1);
    }

    #[test]
    fn test_validate_repo_id() {
        assert!(Validator::validate_repo_id("alice/packs").is_ok());
        assert!(Validator::validate_repo_id("alice").is_err());
        assert!(Validator::validate_repo_id("alice/").is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(Validator::validate_url("https://huggingface.co").is_ok());
        assert!(Validator::validate_url("http://127.0.0.1:1234").is_ok());
        assert!(Validator::validate_url("huggingface.co").is_err());
        assert!(Validator::validate_url("https://").is_err());
        assert!(Validator::validate_url("ftp://example.com").is_err());
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(
            Validator::mask_secret("hf_abcdefghijklmnop", 10),
            "hf_abcdefg..."
        );
        assert_eq!(Validator::mask_secret("short", 10), "short...");
    }
}
