//! `.kbstats.toml` configuration: discovery, parsing and defaults.

mod core;
mod loader;

pub use core::{
    BatchConfig, FailurePolicy, KbstatsConfig, OutputConfig, SolverConfig, DEFAULT_OUTPUT_PATH,
};
pub use loader::{directory_ancestors, find_config, load_config, load_config_from, parse_config};

pub const CONFIG_FILE_NAME: &str = ".kbstats.toml";

/// Written by `kbstats init`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# kbstats configuration

[output]
# Report file, overwritten on every run
path = "./statistics.txt"

[solver]
# Wall-clock limit in seconds for each consistency check (unset = unbounded)
# timeout_secs = 60

[batch]
# "abort" stops at the first unreadable model file, "continue" skips it
on_error = "abort"
"#;
