//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set. Otherwise lambench logs at info, or debug with
/// `verbose`. Checkpoint lines are info events, so they print by default.
pub fn init(verbose: bool) {
    let default = if verbose { "lambench=debug" } else { "lambench=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(verbose)
        .with_level(verbose)
        .try_init()
        .ok();
}
