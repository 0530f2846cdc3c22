use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kbstats")]
#[command(
    about = "Knowledge base statistics for CSP benchmarks and feature models",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Increase verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true
    )]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the statistics report for named benchmarks and feature models
    Stats(StatsArgs),

    /// Initialize configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsArgs {
    /// Named benchmark identifiers (PC, Renault), processed in order
    #[arg(short = 'k', long = "knowledge-base", value_name = "ID", num_args = 1..)]
    pub knowledge_bases: Vec<String>,

    /// A single feature model file
    #[arg(long = "fm", value_name = "FILE")]
    pub feature_model: Option<PathBuf>,

    /// A directory of feature model files
    #[arg(long = "fm-dir", value_name = "DIR")]
    pub feature_model_dir: Option<PathBuf>,

    /// Report file (defaults to ./statistics.txt)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Time limit in seconds for each consistency check
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Skip unreadable model files instead of stopping the run
    #[arg(long = "keep-going")]
    pub keep_going: bool,

    /// Configuration file (defaults to the nearest .kbstats.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
