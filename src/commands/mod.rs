//! CLI command implementations.
//!
//! Available commands:
//! - **stats**: Write the statistics report for a batch of knowledge bases
//! - **init**: Initialize a new kbstats configuration file

pub mod init;
pub mod stats;

pub use init::init_config;
pub use stats::{run, ItemFailure, RunConfig, RunSummary};
