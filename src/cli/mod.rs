//! CLI module for kbstats
//!
//! This module provides the command-line interface, including:
//! - Argument parsing (`args`)
//! - Merging arguments with the config file (`config_builder`)
//! - Runtime setup (`setup`)

pub mod args;
pub mod config_builder;
pub mod setup;

pub use args::{Cli, Commands, StatsArgs};
pub use config_builder::build_run_config;
pub use setup::init_logging;

/// Parse CLI arguments using Clap
pub fn parse_args() -> Cli {
    args::parse_args()
}
