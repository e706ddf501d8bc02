//! Repeated runs over every size/hosting/action combination.

use std::time::Duration;

use crate::error::Result;
use crate::options::{Action, Hosted, PackageSize, RunOptions};
use crate::runner::Runner;

/// Runs per combination unless told otherwise.
pub const DEFAULT_RUNS: usize = 5;

/// Narrows the benchmark matrix. `None` keeps every value.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatrixFilter {
    pub size: Option<PackageSize>,
    pub hosted: Option<Hosted>,
    pub action: Option<Action>,
}

/// Timings for one combination.
#[derive(Debug, Clone)]
pub struct CaseSummary {
    pub options: RunOptions,
    pub runs: Vec<Duration>,
    pub average: Duration,
}

/// Every combination that passes `filter`, sizes outermost and actions
/// innermost so each create is followed by an update of the same shape.
pub fn matrix(filter: &MatrixFilter) -> Vec<RunOptions> {
    let mut cases = Vec::new();
    for size in PackageSize::ALL {
        if filter.size.is_some_and(|s| s != size) {
            continue;
        }
        for hosted in Hosted::ALL {
            if filter.hosted.is_some_and(|h| h != hosted) {
                continue;
            }
            for action in Action::ALL {
                if filter.action.is_some_and(|a| a != action) {
                    continue;
                }
                cases.push(RunOptions::deploy_only(action, hosted, size));
            }
        }
    }
    cases
}

/// Run each case `runs` times and report the total time of every run.
///
/// `on_case` is called as soon as a case finishes. The first failing run aborts
/// the benchmark.
pub async fn run_matrix<F>(
    runner: &Runner,
    cases: &[RunOptions],
    runs: usize,
    mut on_case: F,
) -> Result<Vec<CaseSummary>>
where
    F: FnMut(&CaseSummary),
{
    let mut summaries = Vec::with_capacity(cases.len());
    for options in cases {
        let mut times = Vec::with_capacity(runs);
        for _ in 0..runs {
            let report = runner.run(options).await?;
            times.push(report.total);
        }
        let summary = CaseSummary {
            options: options.clone(),
            average: average(&times),
            runs: times,
        };
        on_case(&summary);
        summaries.push(summary);
    }
    Ok(summaries)
}

/// Mean of `durations`, zero when empty.
pub fn average(durations: &[Duration]) -> Duration {
    if durations.is_empty() {
        return Duration::ZERO;
    }
    let total: u128 = durations.iter().map(Duration::as_nanos).sum();
    let mean = total / durations.len() as u128;
    Duration::from_nanos(u64::try_from(mean).unwrap_or(u64::MAX))
}
