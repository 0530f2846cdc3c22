//! Merging command line arguments over the config file into a
//! [`RunConfig`].

use crate::cli::args::StatsArgs;
use crate::commands::RunConfig;
use crate::config::{FailurePolicy, KbstatsConfig};
use crate::errors::{Error, Result};
use std::time::Duration;

/// Command line values win over config file values, which win over the
/// defaults.
pub fn build_run_config(args: &StatsArgs, file: &KbstatsConfig) -> Result<RunConfig> {
    let timeout = match args.timeout {
        Some(0) => {
            return Err(Error::Configuration(
                "--timeout must be at least 1 second".to_string(),
            ))
        }
        Some(secs) => Some(Duration::from_secs(secs)),
        None => file.solver_timeout(),
    };
    if timeout == Some(Duration::ZERO) {
        return Err(Error::Configuration(
            "solver.timeout_secs must be at least 1".to_string(),
        ));
    }

    let failure_policy = if args.keep_going {
        FailurePolicy::Continue
    } else {
        file.failure_policy()
    };

    let config = RunConfig {
        knowledge_bases: args.knowledge_bases.clone(),
        feature_model: args.feature_model.clone(),
        feature_model_dir: args.feature_model_dir.clone(),
        output: args.output.clone().unwrap_or_else(|| file.output_path()),
        timeout,
        failure_policy,
    };

    if config.knowledge_bases.is_empty()
        && config.feature_model.is_none()
        && config.feature_model_dir.is_none()
    {
        log::warn!("No knowledge bases or feature models given; the report will be empty");
    }
    Ok(config)
}
