//! The `stats` batch: render every configured knowledge base into one
//! numbered report.
//!
//! Sources are processed in a fixed order: named benchmarks as given, then
//! the single feature model file, then the files of the model directory in
//! listing order. One counter numbers entries across all of them.

use crate::config::FailurePolicy;
use crate::errors::{Error, Result};
use crate::fm::parsers;
use crate::fm::FeatureModel;
use crate::io;
use crate::kb::KnowledgeBase;
use crate::report::StatisticsEngine;
use crate::solver::{DpllSolver, SolveBudget};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Everything a run needs, after merging the config file and the command
/// line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Named benchmark identifiers, in processing order.
    pub knowledge_bases: Vec<String>,
    pub feature_model: Option<PathBuf>,
    pub feature_model_dir: Option<PathBuf>,
    pub output: PathBuf,
    /// Limit for each consistency check.
    pub timeout: Option<Duration>,
    pub failure_policy: FailurePolicy,
}

impl RunConfig {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            knowledge_bases: Vec::new(),
            feature_model: None,
            feature_model_dir: None,
            output: output.into(),
            timeout: None,
            failure_policy: FailurePolicy::Abort,
        }
    }

    fn budget(&self) -> SolveBudget {
        match self.timeout {
            Some(timeout) => SolveBudget::unbounded().with_timeout(timeout),
            None => SolveBudget::unbounded(),
        }
    }
}

/// A model file skipped under [`FailurePolicy::Continue`].
#[derive(Debug)]
pub struct ItemFailure {
    pub path: PathBuf,
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub entries_written: usize,
    pub failures: Vec<ItemFailure>,
}

/// Run the batch described by `config`, writing the report to
/// `config.output`.
///
/// Entries written before a fatal error stay in the report.
pub fn run(config: &RunConfig) -> Result<RunSummary> {
    let out = io::create_report(&config.output)?;
    let engine = StatisticsEngine::new(
        out,
        config.output.display().to_string(),
        Box::new(DpllSolver::new()),
        config.budget(),
    );
    let mut batch = Batch {
        engine,
        policy: config.failure_policy,
        counter: 0,
        summary: RunSummary::default(),
    };

    for id in &config.knowledge_bases {
        batch.named(id)?;
    }
    if let Some(path) = &config.feature_model {
        batch.model_file(path)?;
    }
    if let Some(dir) = &config.feature_model_dir {
        for path in io::list_directory(dir)? {
            batch.model_file(&path)?;
        }
    }

    Ok(batch.summary)
}

struct Batch<W: Write> {
    engine: StatisticsEngine<W>,
    policy: FailurePolicy,
    counter: usize,
    summary: RunSummary,
}

impl<W: Write> Batch<W> {
    fn named(&mut self, id: &str) -> Result<()> {
        let kb = KnowledgeBase::from_named(id)?;
        let sequence = self.counter + 1;
        self.engine.render_knowledge_base(sequence, &kb)?;
        self.wrote(sequence);
        Ok(())
    }

    fn model_file(&mut self, path: &Path) -> Result<()> {
        let fm = match load_model(path) {
            Ok(fm) => fm,
            Err(error) if error.is_item_local() && self.policy == FailurePolicy::Continue => {
                log::warn!("Skipping {}: {}", path.display(), error);
                self.summary.failures.push(ItemFailure {
                    path: path.to_path_buf(),
                    error,
                });
                return Ok(());
            }
            Err(error) => return Err(error),
        };

        let kb = KnowledgeBase::from_feature_model(&fm);
        let sequence = self.counter + 1;
        self.engine.render_feature_model(sequence, &kb, &fm)?;
        self.wrote(sequence);
        Ok(())
    }

    fn wrote(&mut self, sequence: usize) {
        self.counter = sequence;
        self.summary.entries_written += 1;
    }
}

fn load_model(path: &Path) -> Result<FeatureModel> {
    parsers::resolve(path)?.parse(path)
}
