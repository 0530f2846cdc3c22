//! Propositional satisfiability for knowledge-base consistency checks.
//!
//! Knowledge bases are encoded into a [`Cnf`] and handed to a [`Solver`].
//! Every solve runs under a [`SolveBudget`] so callers can bound the run
//! time of an otherwise unbounded search; the default budget never
//! interrupts.

mod dpll;

pub use dpll::DpllSolver;

use std::fmt;
use std::ops::Not;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A propositional variable, numbered from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Var(u32);

impl Var {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn positive(self) -> Lit {
        Lit(self.0 << 1)
    }

    pub fn negative(self) -> Lit {
        Lit((self.0 << 1) | 1)
    }
}

/// A literal: a variable or its negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lit(u32);

impl Lit {
    pub fn var(self) -> Var {
        Var(self.0 >> 1)
    }

    pub fn is_negated(self) -> bool {
        self.0 & 1 == 1
    }

    /// Dense index usable for per-literal tables (`2 * var + sign`).
    pub fn code(self) -> usize {
        self.0 as usize
    }
}

impl Not for Lit {
    type Output = Lit;

    fn not(self) -> Lit {
        Lit(self.0 ^ 1)
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // DIMACS numbering
        let n = i64::from(self.var().0) + 1;
        if self.is_negated() {
            write!(f, "-{n}")
        } else {
            write!(f, "{n}")
        }
    }
}

/// A formula in conjunctive normal form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cnf {
    num_vars: usize,
    clauses: Vec<Vec<Lit>>,
}

impl Cnf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh variable.
    pub fn new_var(&mut self) -> Var {
        let var = Var(u32::try_from(self.num_vars).unwrap_or(u32::MAX));
        self.num_vars += 1;
        var
    }

    /// Append a clause. Clauses are stored verbatim, duplicates and
    /// tautologies included, so `num_clauses` reflects the encoding size.
    pub fn add_clause(&mut self, clause: impl IntoIterator<Item = Lit>) {
        self.clauses.push(clause.into_iter().collect());
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    pub fn clauses(&self) -> &[Vec<Lit>] {
        &self.clauses
    }

    /// Evaluate the formula under a complete assignment indexed by variable.
    pub fn evaluate(&self, assignment: &[bool]) -> bool {
        self.clauses.iter().all(|clause| {
            clause
                .iter()
                .any(|lit| assignment[lit.var().index()] != lit.is_negated())
        })
    }
}

/// Verdict of a bounded satisfiability search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveOutcome {
    Satisfiable,
    Unsatisfiable,
    /// The budget ran out before a verdict was reached.
    Interrupted,
}

/// Limits on a single solve: an optional wall-clock deadline and an
/// optional cancellation flag shared with the caller.
#[derive(Debug, Clone, Default)]
pub struct SolveBudget {
    timeout: Option<Duration>,
    cancel: Option<Arc<AtomicBool>>,
}

impl SolveBudget {
    /// A budget that never interrupts.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Start the clock for one solve.
    pub fn start(&self) -> BudgetClock<'_> {
        BudgetClock {
            deadline: self.timeout.map(|t| Instant::now() + t),
            cancel: self.cancel.as_deref(),
        }
    }
}

/// A running budget for one solve.
#[derive(Debug)]
pub struct BudgetClock<'a> {
    deadline: Option<Instant>,
    cancel: Option<&'a AtomicBool>,
}

impl BudgetClock<'_> {
    pub fn is_exhausted(&self) -> bool {
        if self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            return true;
        }
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// A satisfiability procedure.
pub trait Solver: Send + Sync {
    fn solve(&self, cnf: &Cnf, budget: &SolveBudget) -> SolveOutcome;

    fn name(&self) -> &'static str;
}
