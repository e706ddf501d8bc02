//! lambench library exports.
//!
//! The binary in `main.rs` wires these together; integration tests use them
//! directly with in-memory remotes.

pub mod aws;
pub mod benchmark;
pub mod config;
pub mod error;
pub mod logging;
pub mod options;
pub mod package;
pub mod remote;
pub mod runner;
pub mod timing;

pub use error::{DeployError, Result};
