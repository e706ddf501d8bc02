//! Timing utilities.
//!
//! - `checkpoint` - a sealable timer that records per-step deltas
//! - `harness` - wraps a single operation and reports how long it took

mod checkpoint;
mod harness;

pub use checkpoint::{format_checkpoint, CheckpointTimer, TimerError, TimerState, LOG_TARGET};
pub use harness::{time_blocking, time_execution, Timed};
