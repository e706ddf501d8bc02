//! Timed create/update/invoke flow.
//!
//! Every step of a deploy is checkpointed on its own timer, the whole deploy is
//! wrapped in the timing harness, and the complete run (deploy plus optional
//! invocations) gets an outer timer. Each call builds its own timers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, LAMBDA_CONFIG_FILE};
use crate::error::{DeployError, Result};
use crate::options::{Action, Hosted, PackageSize, RunOptions};
use crate::package::{build_package, new_package_id};
use crate::remote::{CodeRef, FunctionControlPlane, FunctionDescriptor, FunctionSpec, ObjectStore};
use crate::timing::{time_execution, CheckpointTimer};

/// Settings the runner needs from configuration.
#[derive(Debug, Clone)]
pub struct DeploySettings {
    pub role: Option<String>,
    pub runtime: String,
    pub handler: String,
    pub bucket: String,
    pub lambda_dir: PathBuf,
    pub package_output_dir: PathBuf,
}

impl DeploySettings {
    /// Execution role, required to create functions.
    pub fn role(&self) -> Result<&str> {
        self.role.as_deref().ok_or_else(|| {
            DeployError::Config(format!(
                "no execution role: set LAMBDA_ROLE or add \"Role\" to {}",
                LAMBDA_CONFIG_FILE
            ))
        })
    }
}

impl From<&Config> for DeploySettings {
    fn from(config: &Config) -> Self {
        Self {
            role: config.role.clone(),
            runtime: config.runtime.clone(),
            handler: config.handler.clone(),
            bucket: config.bucket.clone(),
            lambda_dir: config.lambda_dir.clone(),
            package_output_dir: config.package_output_dir.clone(),
        }
    }
}

/// Outcome of one [`Runner::run`].
#[derive(Debug, Clone)]
pub struct RunReport {
    pub function: FunctionDescriptor,
    /// Time to package, upload and create or update the function
    pub deploy_elapsed: Duration,
    /// One entry per invocation, empty when not invoking
    pub invocations: Vec<Duration>,
    /// Wall time of the whole run
    pub total: Duration,
}

pub struct Runner {
    settings: DeploySettings,
    functions: Arc<dyn FunctionControlPlane>,
    storage: Arc<dyn ObjectStore>,
}

impl Runner {
    pub fn new(
        settings: DeploySettings,
        functions: Arc<dyn FunctionControlPlane>,
        storage: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            settings,
            functions,
            storage,
        }
    }

    /// Deploy according to `options`, then optionally invoke.
    ///
    /// The invocation series is awaited before the total is taken.
    pub async fn run(&self, options: &RunOptions) -> Result<RunReport> {
        options.validate()?;
        let mut timer = CheckpointTimer::new();

        let deployed = match options.action {
            Action::Create => {
                time_execution(
                    "Total create time",
                    self.create_function(options.hosted, options.size),
                )
                .await?
            }
            Action::Update => {
                let existing = self.find_existing_function().await?;
                time_execution(
                    "Total update time",
                    self.update_function(&existing, options.hosted, options.size),
                )
                .await?
            }
        };

        let invocations = if options.invoke {
            self.invoke_in_series(&deployed.value.function_name, options.num_invocations)
                .await?
        } else {
            Vec::new()
        };

        timer.checkpoint("Total time")?;
        timer.stop();

        Ok(RunReport {
            function: deployed.value,
            deploy_elapsed: deployed.elapsed,
            invocations,
            total: timer.latest_delta(),
        })
    }

    /// Package the `size` sources and create a new function from them.
    pub async fn create_function(
        &self,
        hosted: Hosted,
        size: PackageSize,
    ) -> Result<FunctionDescriptor> {
        let role = self.settings.role()?.to_string();
        let id = new_package_id();

        let mut timer = CheckpointTimer::new();
        let code = self.prepare_code(&mut timer, &id, hosted, size).await?;

        let spec = FunctionSpec {
            name: id,
            handler: self.settings.handler.clone(),
            role,
            runtime: self.settings.runtime.clone(),
            code,
        };
        let result = self.functions.create_function(&spec).await?;
        timer.checkpoint(&format!("Created Function: {}", result.function_name))?;
        timer.stop();

        Ok(result)
    }

    /// Any one existing function to update.
    pub async fn find_existing_function(&self) -> Result<FunctionDescriptor> {
        self.functions
            .list_functions(1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DeployError::NotFound("there are no functions to update".to_string()))
    }

    /// Replace the code of `existing` with a fresh package of the `size` sources.
    pub async fn update_function(
        &self,
        existing: &FunctionDescriptor,
        hosted: Hosted,
        size: PackageSize,
    ) -> Result<FunctionDescriptor> {
        let name = &existing.function_name;

        let mut timer = CheckpointTimer::new();
        let code = self.prepare_code(&mut timer, name, hosted, size).await?;

        let result = self.functions.update_function_code(name, &code).await?;
        timer.checkpoint(&format!("Updated Function: {}", result.function_name))?;
        timer.stop();

        Ok(result)
    }

    /// Invoke `name` `count` times, one after another.
    ///
    /// Returns the duration of each invocation in order.
    pub async fn invoke_in_series(&self, name: &str, count: u32) -> Result<Vec<Duration>> {
        let mut timer = CheckpointTimer::new();
        for i in 0..count {
            let payload = self.functions.invoke(name).await?;
            tracing::debug!("invocation {} returned {} bytes", i, payload.len());
            timer.checkpoint(&format!("Invocation {}", i))?;
        }
        timer.stop();
        Ok(timer.deltas()[1..].to_vec())
    }

    async fn prepare_code(
        &self,
        timer: &mut CheckpointTimer,
        package_id: &str,
        hosted: Hosted,
        size: PackageSize,
    ) -> Result<CodeRef> {
        let source = size.source_dir(&self.settings.lambda_dir);
        let build = {
            let source = source.clone();
            let output_dir = self.settings.package_output_dir.clone();
            let id = package_id.to_string();
            tokio::task::spawn_blocking(move || build_package(&source, &output_dir, &id))
        };
        let path = build
            .await
            .map_err(|e| DeployError::packaging(&source, e))??;
        timer.checkpoint("Created deployment package")?;

        let bundle = tokio::fs::read(&path)
            .await
            .map_err(|e| DeployError::io(&path, e))?;
        timer.checkpoint("Read bundle from file system")?;

        match hosted {
            Hosted::Locally => Ok(CodeRef::ZipFile(bundle)),
            Hosted::S3 => {
                let key = format!("{}Bundle", package_id);
                let stored = self
                    .storage
                    .upload(&self.settings.bucket, &key, bundle)
                    .await?;
                timer.checkpoint("Uploaded package to S3")?;
                Ok(CodeRef::S3 {
                    bucket: stored.bucket,
                    key: stored.key,
                })
            }
        }
    }
}
