//! Static AWS credentials.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{DeployError, Result};

/// Access key pair plus an optional session token.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub session_token: Option<String>,
}

/// Contents of a JSON credentials file, e.g.
/// `{"accessKeyId": "...", "secretAccessKey": "...", "region": "us-west-2"}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsFile {
    #[serde(flatten)]
    pub credentials: Credentials,
    #[serde(default)]
    pub region: Option<String>,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Secret key with everything but the last four characters masked.
    /// Secrets shorter than eight characters are masked entirely.
    pub fn masked_secret(&self) -> String {
        let chars: Vec<char> = self.secret_access_key.chars().collect();
        let visible = if chars.len() < 8 { 0 } else { 4 };
        let tail: String = chars[chars.len() - visible..].iter().collect();
        format!("{}{}", "*".repeat(chars.len() - visible), tail)
    }
}

impl CredentialsFile {
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| DeployError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| {
            DeployError::Config(format!(
                "invalid credentials file {}: {}",
                path.display(),
                e
            ))
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &self.masked_secret())
            .field("session_token", &self.session_token.as_ref().map(|_| "<set>"))
            .finish()
    }
}
