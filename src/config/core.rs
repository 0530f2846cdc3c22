use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Report path used when neither the command line nor the config file
/// names one.
pub const DEFAULT_OUTPUT_PATH: &str = "./statistics.txt";

/// Contents of `.kbstats.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KbstatsConfig {
    #[serde(default)]
    pub output: Option<OutputConfig>,

    #[serde(default)]
    pub solver: Option<SolverConfig>,

    #[serde(default)]
    pub batch: Option<BatchConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Report file path.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Wall-clock limit for each consistency check. Unset means unbounded.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default)]
    pub on_error: FailurePolicy,
}

/// What a batch does when a feature model file cannot be read or parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop the run at the first failing file.
    #[default]
    Abort,
    /// Log the failure, skip the file and keep going.
    Continue,
}

impl KbstatsConfig {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .as_ref()
            .and_then(|o| o.path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH))
    }

    pub fn solver_timeout(&self) -> Option<Duration> {
        self.solver
            .as_ref()
            .and_then(|s| s.timeout_secs)
            .map(Duration::from_secs)
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.batch
            .as_ref()
            .map(|b| b.on_error)
            .unwrap_or_default()
    }
}
