//! Shared test utilities for lambench tests.
#![allow(dead_code)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use lambench::error::{DeployError, Result};
use lambench::remote::{
    CodeRef, FunctionControlPlane, FunctionDescriptor, FunctionSpec, ObjectStore, StoredObject,
};
use lambench::runner::{DeploySettings, Runner};

pub const TEST_ROLE: &str = "arn:aws:iam::123456789012:role/lambda-basic";
pub const TEST_BUCKET: &str = "test-packages";

/// Test environment with a temporary base directory and package sources.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Base directory (project root simulation)
    pub base_dir: PathBuf,
    /// Package sources, one subdirectory per size
    pub lambda_dir: PathBuf,
    /// Where zips are written
    pub output_dir: PathBuf,
}

impl TestEnv {
    /// Create a new test environment with mock sources for every size.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base_dir = temp_dir.path().to_path_buf();
        let lambda_dir = base_dir.join("lambda");
        let output_dir = lambda_dir.join("deployment_packages");

        create_mock_sources(&lambda_dir);

        Self {
            _temp_dir: temp_dir,
            base_dir,
            lambda_dir,
            output_dir,
        }
    }

    pub fn settings(&self) -> DeploySettings {
        DeploySettings {
            role: Some(TEST_ROLE.to_string()),
            runtime: "nodejs20.x".to_string(),
            handler: "index.handler".to_string(),
            bucket: TEST_BUCKET.to_string(),
            lambda_dir: self.lambda_dir.clone(),
            package_output_dir: self.output_dir.clone(),
        }
    }

    pub fn runner(&self, functions: Arc<FakeControlPlane>, storage: Arc<FakeStore>) -> Runner {
        Runner::new(self.settings(), functions, storage)
    }
}

/// Create `small`, `medium` and `large` function sources.
pub fn create_mock_sources(lambda_dir: &Path) {
    for (size, extra_files) in [("small", 0), ("medium", 3), ("large", 20)] {
        let dir = lambda_dir.join(size);
        fs::create_dir_all(dir.join("node_modules/dep")).expect("Failed to create source dir");
        fs::write(
            dir.join("index.js"),
            "exports.handler = async () => ({ statusCode: 200 });\n",
        )
        .expect("Failed to write handler");
        for i in 0..extra_files {
            fs::write(
                dir.join("node_modules/dep").join(format!("file{}.js", i)),
                "module.exports = {};\n".repeat(50),
            )
            .expect("Failed to write dependency");
        }
    }
}

/// In-memory function control plane.
#[derive(Default)]
pub struct FakeControlPlane {
    pub existing: Mutex<Vec<FunctionDescriptor>>,
    pub created: Mutex<Vec<FunctionSpec>>,
    pub updated: Mutex<Vec<(String, CodeRef)>>,
    pub invoked: Mutex<Vec<String>>,
    /// Simulated latency of create, update and invoke
    pub latency: Duration,
    pub create_error: Option<String>,
}

impl FakeControlPlane {
    pub fn with_existing(names: &[&str]) -> Self {
        Self {
            existing: Mutex::new(names.iter().map(|n| FunctionDescriptor::named(*n)).collect()),
            ..Self::default()
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn failing_create(message: &str) -> Self {
        Self {
            create_error: Some(message.to_string()),
            ..Self::default()
        }
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl FunctionControlPlane for FakeControlPlane {
    async fn create_function(&self, spec: &FunctionSpec) -> Result<FunctionDescriptor> {
        self.delay().await;
        if let Some(message) = &self.create_error {
            return Err(DeployError::RemoteService(message.clone()));
        }
        self.created.lock().unwrap().push(spec.clone());
        let descriptor = FunctionDescriptor::named(spec.name.clone());
        self.existing.lock().unwrap().push(descriptor.clone());
        Ok(descriptor)
    }

    async fn update_function_code(
        &self,
        name: &str,
        code: &CodeRef,
    ) -> Result<FunctionDescriptor> {
        self.delay().await;
        let known = self
            .existing
            .lock()
            .unwrap()
            .iter()
            .any(|f| f.function_name == name);
        if !known {
            return Err(DeployError::NotFound(name.to_string()));
        }
        self.updated
            .lock()
            .unwrap()
            .push((name.to_string(), code.clone()));
        Ok(FunctionDescriptor::named(name))
    }

    async fn list_functions(&self, limit: usize) -> Result<Vec<FunctionDescriptor>> {
        Ok(self
            .existing
            .lock()
            .unwrap()
            .iter()
            .take(limit)
            .cloned()
            .collect())
    }

    async fn invoke(&self, name: &str) -> Result<Vec<u8>> {
        self.delay().await;
        self.invoked.lock().unwrap().push(name.to_string());
        Ok(br#"{"statusCode":200}"#.to_vec())
    }
}

/// In-memory object store.
#[derive(Default)]
pub struct FakeStore {
    /// (bucket, key, size in bytes)
    pub uploads: Mutex<Vec<(String, String, usize)>>,
    pub error: Option<String>,
}

impl FakeStore {
    pub fn failing(message: &str) -> Self {
        Self {
            error: Some(message.to_string()),
            ..Self::default()
        }
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn upload(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<StoredObject> {
        if let Some(message) = &self.error {
            return Err(DeployError::Storage(message.clone()));
        }
        self.uploads
            .lock()
            .unwrap()
            .push((bucket.to_string(), key.to_string(), body.len()));
        Ok(StoredObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }
}

/// Collects formatted tracing output for the current thread.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Route this thread's events into the capture until the guard drops.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::INFO)
            .without_time()
            .with_target(false)
            .with_level(false)
            .with_ansi(false)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
