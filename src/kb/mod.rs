//! Knowledge bases: the uniform statistics record the report is built from.
//!
//! A knowledge base is either a named benchmark from the built-in catalog or
//! one derived from a parsed feature model.

pub mod benchmark;
pub mod encoding;

use crate::errors::{Error, Result};
use crate::fm::FeatureModel;
use crate::solver::{Cnf, SolveBudget, SolveOutcome, Solver};
use benchmark::BenchmarkProfile;

/// Source reported for knowledge bases derived from feature models,
/// whatever dialect they were read from.
pub const FEATURE_MODEL_SOURCE: &str = "SPLOT";

#[derive(Debug, Clone)]
pub enum KnowledgeBase {
    Benchmark(&'static BenchmarkProfile),
    FeatureModel(FeatureModelKb),
}

/// A knowledge base derived from a feature model, with its CNF encoding.
#[derive(Debug, Clone)]
pub struct FeatureModelKb {
    name: String,
    num_variables: usize,
    num_constraints: usize,
    cnf: Cnf,
}

impl KnowledgeBase {
    /// Look up a named benchmark.
    pub fn from_named(id: &str) -> Result<Self> {
        benchmark::lookup(id)
            .map(KnowledgeBase::Benchmark)
            .ok_or_else(|| Error::UnsupportedKnowledgeBase(id.to_string()))
    }

    pub fn from_feature_model(fm: &FeatureModel) -> Self {
        KnowledgeBase::FeatureModel(FeatureModelKb {
            name: fm.name().to_string(),
            num_variables: fm.num_features(),
            num_constraints: fm.num_relationships() + fm.num_constraints(),
            cnf: encoding::encode(fm),
        })
    }

    pub fn name(&self) -> &str {
        match self {
            KnowledgeBase::Benchmark(profile) => profile.name,
            KnowledgeBase::FeatureModel(kb) => &kb.name,
        }
    }

    pub fn source(&self) -> &str {
        match self {
            KnowledgeBase::Benchmark(profile) => profile.source,
            KnowledgeBase::FeatureModel(_) => FEATURE_MODEL_SOURCE,
        }
    }

    pub fn num_variables(&self) -> usize {
        match self {
            KnowledgeBase::Benchmark(profile) => profile.num_variables,
            KnowledgeBase::FeatureModel(kb) => kb.num_variables,
        }
    }

    pub fn num_constraints(&self) -> usize {
        match self {
            KnowledgeBase::Benchmark(profile) => profile.num_constraints,
            KnowledgeBase::FeatureModel(kb) => kb.num_constraints,
        }
    }

    pub fn num_solver_variables(&self) -> usize {
        match self {
            KnowledgeBase::Benchmark(profile) => profile.num_solver_variables,
            KnowledgeBase::FeatureModel(kb) => kb.cnf.num_vars(),
        }
    }

    pub fn num_solver_constraints(&self) -> usize {
        match self {
            KnowledgeBase::Benchmark(profile) => profile.num_solver_constraints,
            KnowledgeBase::FeatureModel(kb) => kb.cnf.num_clauses(),
        }
    }

    /// Whether the knowledge base admits at least one solution.
    ///
    /// Feature models are solved with `solver` under `budget`. Catalogued
    /// benchmarks return their recorded verdict without running any search,
    /// so `solver` and `budget` are unused for them.
    pub fn is_consistent(&self, solver: &dyn Solver, budget: &SolveBudget) -> Result<bool> {
        let kb = match self {
            KnowledgeBase::Benchmark(profile) => return Ok(profile.consistent),
            KnowledgeBase::FeatureModel(kb) => kb,
        };

        log::debug!("Checking consistency of {} with {}", kb.name, solver.name());
        match solver.solve(&kb.cnf, budget) {
            SolveOutcome::Satisfiable => Ok(true),
            SolveOutcome::Unsatisfiable => Ok(false),
            SolveOutcome::Interrupted => Err(Error::SolveInterrupted {
                name: kb.name.clone(),
            }),
        }
    }
}
