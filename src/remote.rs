//! Interfaces to the function control plane and object storage.
//!
//! The runner only talks to these traits. `crate::aws` provides the real
//! implementations.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;

/// A deployed function as reported by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionDescriptor {
    pub function_name: String,
    #[serde(default)]
    pub function_arn: Option<String>,
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(default)]
    pub code_size: Option<u64>,
    #[serde(default)]
    pub last_modified: Option<String>,
}

impl FunctionDescriptor {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            function_name: name.into(),
            function_arn: None,
            runtime: None,
            code_size: None,
            last_modified: None,
        }
    }
}

/// Where the control plane gets the function code from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeRef {
    /// Zip bytes sent with the request.
    ZipFile(Vec<u8>),
    /// Zip previously uploaded to object storage.
    S3 { bucket: String, key: String },
}

/// Everything needed to create a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSpec {
    pub name: String,
    pub handler: String,
    pub role: String,
    pub runtime: String,
    pub code: CodeRef,
}

/// Location of an uploaded object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bucket: String,
    pub key: String,
}

#[async_trait]
pub trait FunctionControlPlane: Send + Sync {
    async fn create_function(&self, spec: &FunctionSpec) -> Result<FunctionDescriptor>;

    /// Replace the code of an existing function.
    async fn update_function_code(&self, name: &str, code: &CodeRef)
        -> Result<FunctionDescriptor>;

    async fn list_functions(&self, limit: usize) -> Result<Vec<FunctionDescriptor>>;

    /// Invoke synchronously and return the response payload.
    async fn invoke(&self, name: &str) -> Result<Vec<u8>>;
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<StoredObject>;
}
