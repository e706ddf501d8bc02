//! Bench command - runs the size/hosting/action matrix.

use anyhow::{bail, Context, Result};

use lambench::benchmark::{matrix, run_matrix, MatrixFilter};
use lambench::config::Config;

use super::{aws_runner, millis};

/// Execute the bench command.
pub async fn cmd_bench(config: &Config, filter: &MatrixFilter, runs: usize) -> Result<()> {
    if runs == 0 {
        bail!("--runs must be at least 1");
    }
    let cases = matrix(filter);
    if cases.is_empty() {
        bail!("No benchmark cases match the given filter");
    }

    let runner = aws_runner(config)?;
    println!("=== Benchmark: {} cases x {} runs ===\n", cases.len(), runs);

    run_matrix(&runner, &cases, runs, |summary| {
        println!("Args: {}", summary.options);
        println!("Avg time: {}", millis(summary.average));
        println!("----------------------------------------------------");
    })
    .await
    .context("Benchmark aborted")?;

    Ok(())
}
