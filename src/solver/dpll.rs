//! DPLL search with two-watched-literal unit propagation and chronological
//! backtracking.

use super::{BudgetClock, Cnf, Lit, SolveBudget, SolveOutcome, Solver, Var};

/// Number of search steps (decisions plus conflicts) between budget checks.
const DEFAULT_CHECK_INTERVAL: u64 = 256;

#[derive(Debug, Clone)]
pub struct DpllSolver {
    check_interval: u64,
}

impl Default for DpllSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DpllSolver {
    pub fn new() -> Self {
        Self {
            check_interval: DEFAULT_CHECK_INTERVAL,
        }
    }

    pub fn with_check_interval(mut self, steps: u64) -> Self {
        self.check_interval = steps.max(1);
        self
    }
}

impl Solver for DpllSolver {
    fn solve(&self, cnf: &Cnf, budget: &SolveBudget) -> SolveOutcome {
        let clock = budget.start();
        if clock.is_exhausted() {
            return SolveOutcome::Interrupted;
        }

        match Search::new(cnf) {
            Some(mut search) => search.run(&clock, self.check_interval),
            None => SolveOutcome::Unsatisfiable,
        }
    }

    fn name(&self) -> &'static str {
        "dpll"
    }
}

#[derive(Debug, Clone, Copy)]
struct Decision {
    trail_start: usize,
    lit: Lit,
    flipped: bool,
}

struct Search {
    /// Normalized clauses of length >= 2; positions 0 and 1 are watched.
    clauses: Vec<Vec<Lit>>,
    /// Clause indices per watched literal code.
    watches: Vec<Vec<usize>>,
    values: Vec<Option<bool>>,
    trail: Vec<Lit>,
    head: usize,
    decisions: Vec<Decision>,
    next_var: usize,
}

fn lit_value(values: &[Option<bool>], lit: Lit) -> Option<bool> {
    values[lit.var().index()].map(|v| v != lit.is_negated())
}

impl Search {
    /// Build the search state. Returns `None` when the input is trivially
    /// unsatisfiable (an empty clause or contradicting unit clauses).
    fn new(cnf: &Cnf) -> Option<Self> {
        let num_vars = cnf.num_vars();
        let mut search = Self {
            clauses: Vec::with_capacity(cnf.num_clauses()),
            watches: vec![Vec::new(); num_vars * 2],
            values: vec![None; num_vars],
            trail: Vec::with_capacity(num_vars),
            head: 0,
            decisions: Vec::new(),
            next_var: 0,
        };

        let mut units = Vec::new();
        for clause in cnf.clauses() {
            let mut lits = clause.clone();
            lits.sort_unstable();
            lits.dedup();

            // x and !x sort next to each other
            if lits.windows(2).any(|w| w[0].var() == w[1].var()) {
                continue;
            }

            match lits.len() {
                0 => return None,
                1 => units.push(lits[0]),
                _ => {
                    let index = search.clauses.len();
                    search.watches[lits[0].code()].push(index);
                    search.watches[lits[1].code()].push(index);
                    search.clauses.push(lits);
                }
            }
        }

        for unit in units {
            match lit_value(&search.values, unit) {
                Some(true) => {}
                Some(false) => return None,
                None => search.assign(unit),
            }
        }

        Some(search)
    }

    fn assign(&mut self, lit: Lit) {
        self.values[lit.var().index()] = Some(!lit.is_negated());
        self.trail.push(lit);
    }

    fn run(&mut self, clock: &BudgetClock<'_>, check_interval: u64) -> SolveOutcome {
        if !self.propagate() {
            return SolveOutcome::Unsatisfiable;
        }

        let mut steps: u64 = 0;
        loop {
            steps += 1;
            if steps % check_interval == 0 && clock.is_exhausted() {
                return SolveOutcome::Interrupted;
            }

            let Some(var) = self.pick_branch_var() else {
                return SolveOutcome::Satisfiable;
            };
            self.decisions.push(Decision {
                trail_start: self.trail.len(),
                lit: var.negative(),
                flipped: false,
            });
            self.assign(var.negative());

            while !self.propagate() {
                if !self.backtrack() {
                    return SolveOutcome::Unsatisfiable;
                }
                steps += 1;
                if steps % check_interval == 0 && clock.is_exhausted() {
                    return SolveOutcome::Interrupted;
                }
            }
        }
    }

    fn pick_branch_var(&mut self) -> Option<Var> {
        while self.next_var < self.values.len() {
            if self.values[self.next_var].is_none() {
                return Some(self.trail_var(self.next_var));
            }
            self.next_var += 1;
        }
        None
    }

    fn trail_var(&self, index: usize) -> Var {
        Var(u32::try_from(index).unwrap_or(u32::MAX))
    }

    /// Propagate all pending assignments. Returns `false` on conflict.
    fn propagate(&mut self) -> bool {
        while self.head < self.trail.len() {
            let false_lit = !self.trail[self.head];
            self.head += 1;

            let mut watchers = std::mem::take(&mut self.watches[false_lit.code()]);
            let mut conflict = false;
            let mut i = 0;

            while i < watchers.len() {
                let index = watchers[i];
                let clause = &mut self.clauses[index];
                if clause[0] == false_lit {
                    clause.swap(0, 1);
                }

                let first = clause[0];
                if lit_value(&self.values, first) == Some(true) {
                    i += 1;
                    continue;
                }

                let replacement =
                    (2..clause.len()).find(|&k| lit_value(&self.values, clause[k]) != Some(false));
                if let Some(k) = replacement {
                    clause.swap(1, k);
                    self.watches[clause[1].code()].push(index);
                    let _ = watchers.swap_remove(i);
                    continue;
                }

                if lit_value(&self.values, first) == Some(false) {
                    conflict = true;
                    break;
                }

                self.values[first.var().index()] = Some(!first.is_negated());
                self.trail.push(first);
                i += 1;
            }

            watchers.append(&mut self.watches[false_lit.code()]);
            self.watches[false_lit.code()] = watchers;

            if conflict {
                return false;
            }
        }
        true
    }

    /// Undo to the most recent unflipped decision and try its other branch.
    /// Returns `false` when the search space is exhausted.
    fn backtrack(&mut self) -> bool {
        while let Some(decision) = self.decisions.pop() {
            self.undo_to(decision.trail_start);
            if !decision.flipped {
                let lit = !decision.lit;
                self.decisions.push(Decision {
                    trail_start: decision.trail_start,
                    lit,
                    flipped: true,
                });
                self.assign(lit);
                return true;
            }
        }
        false
    }

    fn undo_to(&mut self, len: usize) {
        for lit in self.trail.drain(len..) {
            self.values[lit.var().index()] = None;
        }
        self.head = len;
        self.next_var = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    fn cnf_from(num_vars: usize, clauses: &[&[i32]]) -> Cnf {
        let mut cnf = Cnf::new();
        let vars: Vec<Var> = (0..num_vars).map(|_| cnf.new_var()).collect();
        for clause in clauses {
            cnf.add_clause(clause.iter().map(|&n| {
                let var = vars[n.unsigned_abs() as usize - 1];
                if n < 0 {
                    var.negative()
                } else {
                    var.positive()
                }
            }));
        }
        cnf
    }

    fn solve(cnf: &Cnf) -> SolveOutcome {
        DpllSolver::new().solve(cnf, &SolveBudget::unbounded())
    }

    #[test]
    fn empty_formula_is_satisfiable() {
        assert_eq!(solve(&Cnf::new()), SolveOutcome::Satisfiable);
    }

    #[test]
    fn empty_clause_is_unsatisfiable() {
        assert_eq!(solve(&cnf_from(1, &[&[]])), SolveOutcome::Unsatisfiable);
    }

    #[test]
    fn contradicting_units() {
        assert_eq!(
            solve(&cnf_from(1, &[&[1], &[-1]])),
            SolveOutcome::Unsatisfiable
        );
    }

    #[test]
    fn tautologies_are_ignored() {
        assert_eq!(
            solve(&cnf_from(2, &[&[1, -1], &[2, -2, 1]])),
            SolveOutcome::Satisfiable
        );
    }

    #[test]
    fn needs_backtracking() {
        // Negative-first branching must recover from x1 = false.
        let cnf = cnf_from(3, &[&[1, 2], &[1, -2], &[-1, 3], &[-3, 1]]);
        assert_eq!(solve(&cnf), SolveOutcome::Satisfiable);
    }

    #[test]
    fn pigeonhole_three_into_two_is_unsatisfiable() {
        // p(i, h) = pigeon i in hole h, variables 1..=6
        let p = |i: i32, h: i32| (i - 1) * 2 + h;
        let mut clauses: Vec<Vec<i32>> = (1..=3).map(|i| vec![p(i, 1), p(i, 2)]).collect();
        for h in 1..=2 {
            for i in 1..=3 {
                for j in (i + 1)..=3 {
                    clauses.push(vec![-p(i, h), -p(j, h)]);
                }
            }
        }
        let refs: Vec<&[i32]> = clauses.iter().map(Vec::as_slice).collect();
        assert_eq!(solve(&cnf_from(6, &refs)), SolveOutcome::Unsatisfiable);
    }

    #[test]
    fn cancelled_budget_interrupts_before_search() {
        let flag = Arc::new(AtomicBool::new(true));
        let budget = SolveBudget::unbounded().with_cancel_flag(flag);
        let cnf = cnf_from(2, &[&[1, 2]]);

        assert_eq!(
            DpllSolver::new().solve(&cnf, &budget),
            SolveOutcome::Interrupted
        );
    }
}
