//! Package command - builds a deployment package without deploying it.

use std::fs;

use anyhow::{Context, Result};

use lambench::config::Config;
use lambench::options::PackageSize;
use lambench::package::{build_package, new_package_id};
use lambench::timing::time_blocking;

/// Execute the package command.
pub fn cmd_package(config: &Config, size: PackageSize) -> Result<()> {
    let source = size.source_dir(&config.lambda_dir);
    let id = new_package_id();

    let timed = time_blocking("Created deployment package", || {
        build_package(&source, &config.package_output_dir, &id)
    })
    .with_context(|| format!("Failed to package {}", source.display()))?;

    let bytes = fs::metadata(&timed.value)?.len();
    println!("Package: {}", timed.value.display());
    println!("  Size: {:.2} MB", bytes as f64 / 1024.0 / 1024.0);
    Ok(())
}
