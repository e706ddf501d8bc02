//! Configuration management for lambench.
//!
//! Reads configuration from a .env file in the base directory and from
//! environment variables. Environment variables take precedence over .env.
//! Credentials and the execution role may also come from the JSON files the
//! deploy scripts have always used (`cred.json`, `lambda_config.json`).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::aws::{Credentials, CredentialsFile};
use crate::error::{DeployError, Result};
use crate::options::PackageSize;

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_RUNTIME: &str = "nodejs20.x";
pub const DEFAULT_HANDLER: &str = "index.handler";
pub const DEFAULT_BUCKET: &str = "lambda-packages";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 300;

/// Default credentials file, relative to the base directory.
pub const CREDENTIALS_FILE: &str = "cred.json";
/// File holding the execution role, relative to the base directory.
pub const LAMBDA_CONFIG_FILE: &str = "lambda_config.json";

#[derive(Debug, Deserialize)]
struct LambdaConfigFile {
    #[serde(rename = "Role")]
    role: String,
}

/// lambench configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory relative paths are resolved against
    pub base_dir: PathBuf,
    pub region: String,
    pub credentials: Option<Credentials>,
    /// Execution role ARN for newly created functions
    pub role: Option<String>,
    pub runtime: String,
    pub handler: String,
    /// Bucket used when packages are hosted on S3
    pub bucket: String,
    /// Package sources, one subdirectory per size (default: lambda)
    pub lambda_dir: PathBuf,
    /// Where built zips are written (default: lambda/deployment_packages)
    pub package_output_dir: PathBuf,
    pub lambda_endpoint: Option<String>,
    pub s3_endpoint: Option<String>,
    pub http_timeout: Duration,
}

impl Config {
    /// Load configuration from `<base_dir>/.env` and the process environment.
    pub fn load(base_dir: &Path) -> Result<Self> {
        let mut vars = HashMap::new();

        let env_path = base_dir.join(".env");
        if env_path.exists() {
            let iter = dotenvy::from_path_iter(&env_path)
                .map_err(|e| DeployError::Config(format!("{}: {}", env_path.display(), e)))?;
            for item in iter {
                let (key, value) = item
                    .map_err(|e| DeployError::Config(format!("{}: {}", env_path.display(), e)))?;
                vars.insert(key, value);
            }
        }

        // Environment variables override .env file
        vars.extend(std::env::vars());

        Self::from_vars(base_dir, &vars)
    }

    /// Build configuration from an explicit set of variables.
    pub fn from_vars(base_dir: &Path, vars: &HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let resolve = |value: String| {
            let path = PathBuf::from(value);
            if path.is_absolute() {
                path
            } else {
                base_dir.join(path)
            }
        };

        let credentials_path = get("LAMBENCH_CREDENTIALS").map(&resolve).or_else(|| {
            let default = base_dir.join(CREDENTIALS_FILE);
            default.exists().then_some(default)
        });
        let credentials_file = credentials_path
            .as_deref()
            .map(CredentialsFile::read)
            .transpose()?;

        let env_credentials = match (get("AWS_ACCESS_KEY_ID"), get("AWS_SECRET_ACCESS_KEY")) {
            (Some(id), Some(secret)) => {
                let creds = Credentials::new(id, secret);
                Some(match get("AWS_SESSION_TOKEN") {
                    Some(token) => creds.with_session_token(token),
                    None => creds,
                })
            }
            _ => None,
        };

        let region = get("AWS_REGION")
            .or_else(|| get("AWS_DEFAULT_REGION"))
            .or_else(|| credentials_file.as_ref().and_then(|f| f.region.clone()))
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let credentials = env_credentials.or_else(|| credentials_file.map(|f| f.credentials));

        let role = match get("LAMBDA_ROLE") {
            Some(role) => Some(role),
            None => read_role(&base_dir.join(LAMBDA_CONFIG_FILE))?,
        };

        let lambda_dir = get("LAMBDA_DIR")
            .map(&resolve)
            .unwrap_or_else(|| base_dir.join("lambda"));
        let package_output_dir = get("PACKAGE_OUTPUT_DIR")
            .map(&resolve)
            .unwrap_or_else(|| lambda_dir.join("deployment_packages"));

        let http_timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(secs.parse().map_err(|_| {
                DeployError::Config(format!("HTTP_TIMEOUT_SECS is not a number: {}", secs))
            })?),
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Self {
            base_dir: base_dir.to_path_buf(),
            region,
            credentials,
            role,
            runtime: get("LAMBDA_RUNTIME").unwrap_or_else(|| DEFAULT_RUNTIME.to_string()),
            handler: get("LAMBDA_HANDLER").unwrap_or_else(|| DEFAULT_HANDLER.to_string()),
            bucket: get("S3_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            lambda_dir,
            package_output_dir,
            lambda_endpoint: get("LAMBDA_ENDPOINT"),
            s3_endpoint: get("S3_ENDPOINT"),
            http_timeout,
        })
    }

    /// Credentials, or an error telling the user where to put them.
    pub fn credentials(&self) -> Result<&Credentials> {
        self.credentials.as_ref().ok_or_else(|| {
            DeployError::Config(format!(
                "no AWS credentials: set AWS_ACCESS_KEY_ID/AWS_SECRET_ACCESS_KEY or create {}",
                self.base_dir.join(CREDENTIALS_FILE).display()
            ))
        })
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  BASE_DIR: {}", self.base_dir.display());
        println!("  AWS_REGION: {}", self.region);
        match &self.credentials {
            Some(creds) => {
                println!("  AWS_ACCESS_KEY_ID: {}", creds.access_key_id);
                println!("  AWS_SECRET_ACCESS_KEY: {}", creds.masked_secret());
            }
            None => println!("  Credentials: NOT FOUND"),
        }
        println!(
            "  LAMBDA_ROLE: {}",
            self.role.as_deref().unwrap_or("(not set)")
        );
        println!("  LAMBDA_RUNTIME: {}", self.runtime);
        println!("  LAMBDA_HANDLER: {}", self.handler);
        println!("  S3_BUCKET: {}", self.bucket);
        println!("  LAMBDA_DIR: {}", self.lambda_dir.display());
        println!("  PACKAGE_OUTPUT_DIR: {}", self.package_output_dir.display());
        if let Some(endpoint) = &self.lambda_endpoint {
            println!("  LAMBDA_ENDPOINT: {}", endpoint);
        }
        if let Some(endpoint) = &self.s3_endpoint {
            println!("  S3_ENDPOINT: {}", endpoint);
        }
        println!("  HTTP_TIMEOUT_SECS: {}", self.http_timeout.as_secs());
        for size in PackageSize::ALL {
            let dir = size.source_dir(&self.lambda_dir);
            let status = if dir.is_dir() { "FOUND" } else { "NOT FOUND" };
            println!("  Package source '{}': {}", size, status);
        }
    }
}

fn read_role(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|e| DeployError::io(path, e))?;
    let parsed: LambdaConfigFile = serde_json::from_str(&content)
        .map_err(|e| DeployError::Config(format!("invalid {}: {}", path.display(), e)))?;
    Ok(Some(parsed.role))
}
