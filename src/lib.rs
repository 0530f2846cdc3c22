// Export modules for library usage
pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod fm;
pub mod io;
pub mod kb;
pub mod report;
pub mod solver;

// Re-export commonly used types
pub use crate::commands::{run, ItemFailure, RunConfig, RunSummary};
pub use crate::config::{FailurePolicy, KbstatsConfig};
pub use crate::errors::{Error, Result};
pub use crate::fm::parsers::{get_parser, resolve, FeatureModelParser, FmFormat};
pub use crate::fm::{FeatureModel, RelationshipKind};
pub use crate::kb::KnowledgeBase;
pub use crate::report::{format_ratio, ReportEntry, StatisticsEngine};
pub use crate::solver::{Cnf, DpllSolver, SolveBudget, SolveOutcome, Solver};
