//! lambench - package, deploy and time serverless functions.
//!
//! Builds a zip from `lambda/<size>/`, ships it inline or through S3, creates
//! or updates a Lambda function, optionally invokes it, and prints how long
//! every step took.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};

use lambench::benchmark::{MatrixFilter, DEFAULT_RUNS};
use lambench::config::Config;
use lambench::logging;
use lambench::options::{Action, Hosted, PackageSize, RunOptions};

#[derive(Parser)]
#[command(name = "lambench")]
#[command(about = "Package, deploy and time serverless functions")]
#[command(
    after_help = "QUICK START:\n  lambench show config                                    Check credentials and paths\n  lambench run --size small --hosted locally --action create\n  lambench bench                                          Full matrix, 5 runs each"
)]
struct Cli {
    /// Directory holding .env, cred.json, lambda_config.json and lambda/ (default: current directory)
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or update a function once and print step timings
    Run {
        /// Package size
        #[arg(long, value_enum)]
        size: PackageSize,

        /// Package hosted locally or on S3
        #[arg(long, value_enum)]
        hosted: Hosted,

        /// Create or update the function
        #[arg(long, value_enum)]
        action: Action,

        /// Invoke the function after creating/updating
        #[arg(
            long,
            num_args = 0..=1,
            default_value_t = false,
            default_missing_value = "true",
            action = ArgAction::Set
        )]
        invoke: bool,

        /// Number of times to invoke the function
        #[arg(long = "num-invocations", alias = "numInvocations", default_value_t = 1)]
        num_invocations: u32,
    },

    /// Run every size/hosting/action combination several times and average
    Bench {
        /// Runs per combination
        #[arg(long, default_value_t = DEFAULT_RUNS)]
        runs: usize,

        /// Only this package size
        #[arg(long, value_enum)]
        size: Option<PackageSize>,

        /// Only this hosting mode
        #[arg(long, value_enum)]
        hosted: Option<Hosted>,

        /// Only this action
        #[arg(long, value_enum)]
        action: Option<Action>,
    },

    /// Build a deployment package without deploying it
    Package {
        #[arg(long, value_enum)]
        size: PackageSize,
    },

    /// Show information
    Show {
        #[command(subcommand)]
        what: ShowTarget,
    },

    /// Remove built deployment packages
    Clean,
}

#[derive(Subcommand)]
enum ShowTarget {
    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let base_dir = match cli.base_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let config = Config::load(&base_dir).context("Failed to load configuration")?;

    match cli.command {
        Commands::Run {
            size,
            hosted,
            action,
            invoke,
            num_invocations,
        } => {
            let options = RunOptions::new(action, hosted, size, invoke, num_invocations)?;
            commands::cmd_run(&config, &options).await?;
        }

        Commands::Bench {
            runs,
            size,
            hosted,
            action,
        } => {
            let filter = MatrixFilter {
                size,
                hosted,
                action,
            };
            commands::cmd_bench(&config, &filter, runs).await?;
        }

        Commands::Package { size } => {
            commands::cmd_package(&config, size)?;
        }

        Commands::Show { what } => {
            let show_target = match what {
                ShowTarget::Config => commands::show::ShowTarget::Config,
            };
            commands::cmd_show(&config, show_target)?;
        }

        Commands::Clean => {
            commands::cmd_clean(&config)?;
        }
    }

    Ok(())
}
