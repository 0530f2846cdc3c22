use anyhow::{Context, Result};
use colored::*;
use kbstats::cli::{self, Commands, StatsArgs};
use kbstats::commands::{self, RunSummary};
use kbstats::config;
use std::path::Path;

fn main() -> Result<()> {
    let cli = cli::parse_args();
    cli::init_logging(cli.verbosity);

    match cli.command {
        Commands::Stats(args) => handle_stats_command(&args),
        Commands::Init { force } => commands::init_config(force),
    }
}

fn handle_stats_command(args: &StatsArgs) -> Result<()> {
    let file_config = match &args.config {
        Some(path) => config::load_config_from(path)?,
        None => config::load_config()?,
    };
    let run_config = cli::build_run_config(args, &file_config)?;

    let summary = commands::run(&run_config).with_context(|| {
        format!(
            "Statistics run stopped; completed entries remain in {}",
            run_config.output.display()
        )
    })?;
    print_summary(&summary, &run_config.output);
    Ok(())
}

fn print_summary(summary: &RunSummary, output: &Path) {
    println!(
        "{} {} {} to {}",
        "Wrote".green().bold(),
        summary.entries_written,
        if summary.entries_written == 1 {
            "entry"
        } else {
            "entries"
        },
        output.display()
    );

    if summary.failures.is_empty() {
        return;
    }
    println!(
        "{} {} model file(s):",
        "Skipped".yellow().bold(),
        summary.failures.len()
    );
    for failure in &summary.failures {
        println!("  {} {}", failure.path.display(), failure.error.to_string().dimmed());
    }
}
