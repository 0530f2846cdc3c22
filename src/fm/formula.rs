//! Propositional formulas over feature indices, used for cross-tree
//! constraints.

use super::RelationshipKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    /// Feature index into [`super::FeatureModel::features`].
    Var(usize),
    Not(Box<Formula>),
    And(Vec<Formula>),
    Or(Vec<Formula>),
    Implies(Box<Formula>, Box<Formula>),
    Iff(Box<Formula>, Box<Formula>),
}

/// A literal over feature indices: `(feature, negated)`.
pub type FeatureLiteral = (usize, bool);

impl Formula {
    pub fn negate(formula: Formula) -> Formula {
        Formula::Not(Box::new(formula))
    }

    pub fn implies(lhs: Formula, rhs: Formula) -> Formula {
        Formula::Implies(Box::new(lhs), Box::new(rhs))
    }

    pub fn iff(lhs: Formula, rhs: Formula) -> Formula {
        Formula::Iff(Box::new(lhs), Box::new(rhs))
    }

    /// `¬(a ∧ b)`
    pub fn excludes(a: usize, b: usize) -> Formula {
        Formula::negate(Formula::And(vec![Formula::Var(a), Formula::Var(b)]))
    }

    fn literal(&self) -> Option<FeatureLiteral> {
        match self {
            Formula::Var(f) => Some((*f, false)),
            Formula::Not(inner) => inner.literal().map(|(f, negated)| (f, !negated)),
            _ => None,
        }
    }

    /// Flatten the formula into a single clause when it is one: a literal, a
    /// disjunction of clauses, an implication from a negated clause to a
    /// clause, or the negation of a conjunction of literals.
    pub fn as_clause(&self) -> Option<Vec<FeatureLiteral>> {
        match self {
            Formula::Var(_) => self.literal().map(|lit| vec![lit]),
            Formula::Or(parts) => {
                let mut clause = Vec::new();
                for part in parts {
                    clause.extend(part.as_clause()?);
                }
                Some(clause)
            }
            Formula::Implies(lhs, rhs) => {
                let mut clause = Formula::negate((**lhs).clone()).as_clause()?;
                clause.extend(rhs.as_clause()?);
                Some(clause)
            }
            Formula::Not(inner) => match inner.as_ref() {
                Formula::Var(f) => Some(vec![(*f, true)]),
                Formula::Not(twice) => twice.as_clause(),
                Formula::And(parts) => {
                    let mut clause = Vec::new();
                    for part in parts {
                        clause.extend(Formula::negate(part.clone()).as_clause()?);
                    }
                    Some(clause)
                }
                _ => None,
            },
            Formula::And(parts) if parts.len() == 1 => parts[0].as_clause(),
            Formula::And(_) | Formula::Iff(..) => None,
        }
    }

    /// Classify a cross-tree constraint as REQUIRES (`a → b`) or EXCLUDES
    /// (`¬(a ∧ b)`), judged on its two-literal clause form.
    pub fn constraint_kind(&self) -> Option<RelationshipKind> {
        let clause = self.as_clause()?;
        let [(a, a_negated), (b, b_negated)] = clause.as_slice() else {
            return None;
        };
        if a == b {
            return None;
        }
        match (*a_negated, *b_negated) {
            (true, true) => Some(RelationshipKind::Excludes),
            (true, false) | (false, true) => Some(RelationshipKind::Requires),
            (false, false) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(f: usize) -> Formula {
        Formula::Var(f)
    }

    fn not(f: Formula) -> Formula {
        Formula::negate(f)
    }

    #[test]
    fn implication_between_literals_is_requires() {
        let f = Formula::implies(var(1), var(2));
        assert_eq!(f.as_clause(), Some(vec![(1, true), (2, false)]));
        assert_eq!(f.constraint_kind(), Some(RelationshipKind::Requires));

        let clause_form = Formula::Or(vec![not(var(1)), var(2)]);
        assert_eq!(clause_form.constraint_kind(), Some(RelationshipKind::Requires));
    }

    #[test]
    fn negated_conjunction_is_excludes() {
        assert_eq!(
            Formula::excludes(3, 4).constraint_kind(),
            Some(RelationshipKind::Excludes)
        );
        assert_eq!(
            Formula::implies(var(3), not(var(4))).constraint_kind(),
            Some(RelationshipKind::Excludes)
        );
    }

    #[test]
    fn longer_clauses_have_no_kind() {
        let f = Formula::implies(var(1), Formula::Or(vec![var(2), var(3)]));
        assert_eq!(f.as_clause(), Some(vec![(1, true), (2, false), (3, false)]));
        assert_eq!(f.constraint_kind(), None);

        assert_eq!(Formula::Or(vec![var(1), var(2)]).constraint_kind(), None);
    }

    #[test]
    fn conjunction_and_equivalence_are_not_clauses() {
        assert_eq!(Formula::And(vec![var(1), var(2)]).as_clause(), None);
        assert_eq!(Formula::iff(var(1), var(2)).as_clause(), None);
        assert_eq!(
            Formula::implies(Formula::Or(vec![var(1), var(2)]), var(3)).as_clause(),
            None
        );
    }

    #[test]
    fn double_negation_collapses() {
        assert_eq!(not(not(var(5))).as_clause(), Some(vec![(5, false)]));
    }
}
