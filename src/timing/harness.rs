//! Wrap one operation with a fresh timer.

use std::future::Future;
use std::time::Duration;

use super::CheckpointTimer;

/// A value together with the time it took to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timed<T> {
    pub value: T,
    pub elapsed: Duration,
}

/// Await `operation` and report how long it took under `label`.
///
/// Errors from the operation are returned unchanged and no checkpoint is logged
/// for them.
pub async fn time_execution<T, E, F>(label: &str, operation: F) -> Result<Timed<T>, E>
where
    F: Future<Output = Result<T, E>>,
{
    let timer = CheckpointTimer::new();
    let value = operation.await?;
    Ok(seal(timer, label, value))
}

/// Blocking counterpart of [`time_execution`].
pub fn time_blocking<T, E, F>(label: &str, operation: F) -> Result<Timed<T>, E>
where
    F: FnOnce() -> Result<T, E>,
{
    let timer = CheckpointTimer::new();
    let value = operation()?;
    Ok(seal(timer, label, value))
}

// The timer never leaves this module before being sealed here, so it is
// always active when the final checkpoint is recorded.
fn seal<T>(mut timer: CheckpointTimer, label: &str, value: T) -> Timed<T> {
    let elapsed = timer.record(label);
    timer.stop();
    Timed { value, elapsed }
}
