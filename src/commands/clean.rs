//! Clean command - removes built deployment packages.

use std::fs;

use anyhow::{Context, Result};

use lambench::config::Config;

/// Execute the clean command.
pub fn cmd_clean(config: &Config) -> Result<()> {
    let dir = &config.package_output_dir;
    if !dir.exists() {
        println!("Nothing to clean ({} does not exist).", dir.display());
        return Ok(());
    }

    println!("Removing {}...", dir.display());
    fs::remove_dir_all(dir).with_context(|| format!("Failed to remove {}", dir.display()))?;
    println!("Clean complete.");
    Ok(())
}
