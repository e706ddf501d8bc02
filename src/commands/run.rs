//! Run command - deploys once and prints step timings.

use anyhow::{Context, Result};

use lambench::benchmark::average;
use lambench::config::Config;
use lambench::options::RunOptions;

use super::{aws_runner, millis};

/// Execute the run command.
pub async fn cmd_run(config: &Config, options: &RunOptions) -> Result<()> {
    let runner = aws_runner(config)?;

    println!("=== {} ===\n", options);
    let report = runner
        .run(options)
        .await
        .with_context(|| format!("Run failed ({})", options))?;

    println!();
    println!("Function:   {}", report.function.function_name);
    if let Some(arn) = &report.function.function_arn {
        println!("ARN:        {}", arn);
    }
    println!("Deploy:     {}", millis(report.deploy_elapsed));
    if !report.invocations.is_empty() {
        println!(
            "Invoked:    {} times, avg {}",
            report.invocations.len(),
            millis(average(&report.invocations))
        );
    }
    println!("Total:      {}", millis(report.total));
    Ok(())
}
