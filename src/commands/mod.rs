//! CLI command handlers.
//!
//! Each submodule handles a specific CLI command:
//! - `run` - Deploy once and print step timings
//! - `bench` - Run the benchmark matrix
//! - `package` - Build a deployment package only
//! - `show` - Display information
//! - `clean` - Remove built packages

mod bench;
pub mod clean;
mod package;
mod run;
pub mod show;

pub use bench::cmd_bench;
pub use clean::cmd_clean;
pub use package::cmd_package;
pub use run::cmd_run;
pub use show::cmd_show;

use std::sync::Arc;

use anyhow::{Context, Result};

use lambench::aws;
use lambench::config::Config;
use lambench::runner::{DeploySettings, Runner};

/// Runner backed by the real Lambda and S3 clients.
fn aws_runner(config: &Config) -> Result<Runner> {
    let (lambda, s3) = aws::clients(config).context("Failed to set up AWS clients")?;
    Ok(Runner::new(
        DeploySettings::from(config),
        Arc::new(lambda),
        Arc::new(s3),
    ))
}

/// `1234.5ms`
fn millis(duration: std::time::Duration) -> String {
    format!("{:.1}ms", duration.as_secs_f64() * 1000.0)
}
