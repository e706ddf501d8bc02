//! Run options shared by the CLI, the runner and the benchmark matrix.
//!
//! The enums here are the only definition of the accepted sizes, hosting modes
//! and actions.

use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::error::{DeployError, Result};

/// Which package source directory to deploy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum PackageSize {
    Small,
    Medium,
    Large,
}

impl PackageSize {
    pub const ALL: [PackageSize; 3] = [PackageSize::Small, PackageSize::Medium, PackageSize::Large];

    /// Directory name under the package sources root.
    pub fn as_str(self) -> &'static str {
        match self {
            PackageSize::Small => "small",
            PackageSize::Medium => "medium",
            PackageSize::Large => "large",
        }
    }

    /// Source directory for this size under `lambda_dir`.
    pub fn source_dir(self, lambda_dir: &Path) -> PathBuf {
        lambda_dir.join(self.as_str())
    }
}

/// Where the deployment package is handed to the control plane from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Hosted {
    /// Zip bytes are sent inline with the request.
    Locally,
    /// Zip is uploaded to object storage first and referenced by key.
    S3,
}

impl Hosted {
    pub const ALL: [Hosted; 2] = [Hosted::Locally, Hosted::S3];

    pub fn as_str(self) -> &'static str {
        match self {
            Hosted::Locally => "locally",
            Hosted::S3 => "s3",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Action {
    Create,
    Update,
}

impl Action {
    pub const ALL: [Action; 2] = [Action::Create, Action::Update];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
        }
    }
}

impl fmt::Display for PackageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Hosted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated options for one deploy run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub action: Action,
    pub hosted: Hosted,
    pub size: PackageSize,
    /// Invoke the function after it has been created or updated.
    pub invoke: bool,
    /// Number of sequential invocations when `invoke` is set.
    pub num_invocations: u32,
}

impl RunOptions {
    /// Build run options, rejecting an invocation count of zero.
    pub fn new(
        action: Action,
        hosted: Hosted,
        size: PackageSize,
        invoke: bool,
        num_invocations: u32,
    ) -> Result<Self> {
        let options = Self {
            action,
            hosted,
            size,
            invoke,
            num_invocations,
        };
        options.validate()?;
        Ok(options)
    }

    /// Deploy only, no invocations.
    pub fn deploy_only(action: Action, hosted: Hosted, size: PackageSize) -> Self {
        Self {
            action,
            hosted,
            size,
            invoke: false,
            num_invocations: 1,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_invocations == 0 {
            return Err(DeployError::InvalidOptions(
                "number of invocations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for RunOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.action, self.hosted, self.size)
    }
}
