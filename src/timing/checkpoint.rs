//! Checkpoint timer for multi-step operations.

use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

/// Tracing target used for checkpoint log lines.
pub const LOG_TARGET: &str = "lambench::timer";

/// Errors raised by [`CheckpointTimer`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("timer has already been stopped, cannot record checkpoint '{label}'")]
    AlreadySealed { label: String },
}

/// Lifecycle state of a [`CheckpointTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Accepting checkpoints.
    Active,
    /// Stopped for good. Checkpoints are rejected.
    Sealed,
}

/// Records a monotonic origin and the time spent between successive checkpoints.
///
/// Each delta is measured against the immediately preceding checkpoint, so the
/// sequence reports the cost of each discrete step. `deltas()[0]` is always zero
/// and belongs to the origin.
///
/// Time comes from tokio's monotonic clock, which tests can pause and advance.
#[derive(Debug)]
pub struct CheckpointTimer {
    origin: Instant,
    checkpoints: Vec<Instant>,
    deltas: Vec<Duration>,
    state: TimerState,
}

impl CheckpointTimer {
    /// Start a new timer at the current instant.
    pub fn new() -> Self {
        let origin = Instant::now();
        Self {
            origin,
            checkpoints: vec![origin],
            deltas: vec![Duration::ZERO],
            state: TimerState::Active,
        }
    }

    /// Record a checkpoint and log the time since the previous one.
    ///
    /// Fails without touching the timer if it has been stopped.
    pub fn checkpoint(&mut self, label: &str) -> Result<Duration, TimerError> {
        if self.state == TimerState::Sealed {
            return Err(TimerError::AlreadySealed {
                label: label.to_string(),
            });
        }
        Ok(self.record(label))
    }

    /// Append a checkpoint. Callers must have checked that the timer is active.
    pub(super) fn record(&mut self, label: &str) -> Duration {
        let now = Instant::now();
        let last = self.checkpoints[self.checkpoints.len() - 1];
        let delta = now.saturating_duration_since(last);

        self.checkpoints.push(now);
        self.deltas.push(delta);

        tracing::info!(target: LOG_TARGET, "{}", format_checkpoint(label, delta));
        delta
    }

    /// Delta recorded by the most recent checkpoint, zero if there is none yet.
    pub fn latest_delta(&self) -> Duration {
        self.deltas.last().copied().unwrap_or_default()
    }

    /// Seal the timer. Stopping an already stopped timer does nothing.
    pub fn stop(&mut self) {
        self.state = TimerState::Sealed;
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_sealed(&self) -> bool {
        self.state == TimerState::Sealed
    }

    pub fn origin(&self) -> Instant {
        self.origin
    }

    pub fn checkpoints(&self) -> &[Instant] {
        &self.checkpoints
    }

    pub fn deltas(&self) -> &[Duration] {
        &self.deltas
    }

    /// Time from the origin to the latest checkpoint.
    pub fn total(&self) -> Duration {
        self.deltas.iter().skip(1).sum()
    }
}

impl Default for CheckpointTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a checkpoint as `"<label> -- <seconds>s <milliseconds>ms"`.
///
/// Milliseconds carry the fractional sub-second part, e.g. `1s 250.5ms`.
pub fn format_checkpoint(label: &str, delta: Duration) -> String {
    let millis = f64::from(delta.subsec_nanos()) / 1_000_000.0;
    format!("{} -- {}s {}ms", label, delta.as_secs(), millis)
}
