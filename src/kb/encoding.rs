//! CNF encoding of feature models.
//!
//! Feature `i` becomes solver variable `i`. Tree relationships and
//! clause-shaped constraints map to clauses directly; any other constraint
//! is Tseitin-encoded with one auxiliary variable per AND, OR, implication
//! or equivalence gate, and asserted with a final unit clause.

use crate::fm::{FeatureModel, Formula, Relationship};
use crate::solver::{Cnf, Lit, Var};

pub fn encode(fm: &FeatureModel) -> Cnf {
    let mut cnf = Cnf::new();
    let vars: Vec<Var> = fm.features().iter().map(|_| cnf.new_var()).collect();
    let lit = |feature: usize| vars[feature].positive();

    // root is always selected
    cnf.add_clause([lit(0)]);

    for relationship in fm.relationships() {
        match relationship {
            Relationship::Mandatory { parent, child } => {
                cnf.add_clause([!lit(*child), lit(*parent)]);
                cnf.add_clause([!lit(*parent), lit(*child)]);
            }
            Relationship::Optional { parent, child } => {
                cnf.add_clause([!lit(*child), lit(*parent)]);
            }
            Relationship::Alternative { parent, children } => {
                encode_group(&mut cnf, lit(*parent), children.iter().map(|&c| lit(c)));
                for (i, &a) in children.iter().enumerate() {
                    for &b in &children[i + 1..] {
                        cnf.add_clause([!lit(a), !lit(b)]);
                    }
                }
            }
            Relationship::Or { parent, children } => {
                encode_group(&mut cnf, lit(*parent), children.iter().map(|&c| lit(c)));
            }
        }
    }

    for constraint in fm.constraints() {
        match constraint.as_clause() {
            Some(clause) => cnf.add_clause(
                clause
                    .into_iter()
                    .map(|(feature, negated)| if negated { !lit(feature) } else { lit(feature) }),
            ),
            None => {
                let top = Tseitin {
                    cnf: &mut cnf,
                    vars: &vars,
                }
                .gate(constraint);
                cnf.add_clause([top]);
            }
        }
    }

    log::debug!(
        "Encoded {} into {} variables and {} clauses",
        fm.name(),
        cnf.num_vars(),
        cnf.num_clauses()
    );
    cnf
}

/// Members imply the parent, and a selected parent needs at least one member.
fn encode_group(cnf: &mut Cnf, parent: Lit, members: impl Iterator<Item = Lit> + Clone) {
    for member in members.clone() {
        cnf.add_clause([!member, parent]);
    }
    cnf.add_clause(std::iter::once(!parent).chain(members));
}

struct Tseitin<'a> {
    cnf: &'a mut Cnf,
    vars: &'a [Var],
}

impl Tseitin<'_> {
    /// Return a literal equivalent to `formula`, adding gate definitions.
    fn gate(&mut self, formula: &Formula) -> Lit {
        match formula {
            Formula::Var(feature) => self.vars[*feature].positive(),
            Formula::Not(inner) => !self.gate(inner),
            Formula::And(parts) => {
                let inputs: Vec<Lit> = parts.iter().map(|p| self.gate(p)).collect();
                let g = self.cnf.new_var().positive();
                for &input in &inputs {
                    self.cnf.add_clause([!g, input]);
                }
                self.cnf
                    .add_clause(std::iter::once(g).chain(inputs.iter().map(|&l| !l)));
                g
            }
            Formula::Or(parts) => {
                let inputs: Vec<Lit> = parts.iter().map(|p| self.gate(p)).collect();
                let g = self.cnf.new_var().positive();
                for &input in &inputs {
                    self.cnf.add_clause([g, !input]);
                }
                self.cnf
                    .add_clause(std::iter::once(!g).chain(inputs.iter().copied()));
                g
            }
            Formula::Implies(lhs, rhs) => {
                let (a, b) = (self.gate(lhs), self.gate(rhs));
                let g = self.cnf.new_var().positive();
                self.cnf.add_clause([!g, !a, b]);
                self.cnf.add_clause([g, a]);
                self.cnf.add_clause([g, !b]);
                g
            }
            Formula::Iff(lhs, rhs) => {
                let (a, b) = (self.gate(lhs), self.gate(rhs));
                let g = self.cnf.new_var().positive();
                self.cnf.add_clause([!g, !a, b]);
                self.cnf.add_clause([!g, a, !b]);
                self.cnf.add_clause([g, a, b]);
                self.cnf.add_clause([g, !a, !b]);
                g
            }
        }
    }
}
