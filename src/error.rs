//! Error types shared by packaging, remote calls and the runner.

use std::path::PathBuf;

use thiserror::Error;

use crate::timing::TimerError;

pub type Result<T> = std::result::Result<T, DeployError>;

#[derive(Debug, Error)]
pub enum DeployError {
    /// The deployment package could not be built.
    #[error("failed to package {}: {message}", path.display())]
    Packaging { path: PathBuf, message: String },

    /// Transport failure or error response from the function control plane.
    #[error("remote service error: {0}")]
    RemoteService(String),

    /// The requested function does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Object storage rejected or failed the upload.
    #[error("storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Timer(#[from] TimerError),
}

impl DeployError {
    pub(crate) fn packaging(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        Self::Packaging {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
