//! Built-in catalog of named CLib configuration benchmarks.
//!
//! The benchmark models themselves are not bundled. Each entry records the
//! published profile of the reference encoding, including its consistency
//! verdict.

/// Where the CLib benchmark suite is published.
pub const CLIB_SOURCE: &str = "https://www.itu.dk/research/cla/externals/clib/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkProfile {
    /// Identifier accepted on the command line.
    pub id: &'static str,
    pub name: &'static str,
    pub source: &'static str,
    pub num_variables: usize,
    pub num_constraints: usize,
    pub num_solver_variables: usize,
    pub num_solver_constraints: usize,
    pub consistent: bool,
}

static CATALOG: &[BenchmarkProfile] = &[
    BenchmarkProfile {
        id: "PC",
        name: "PCConfigurationProblem",
        source: CLIB_SOURCE,
        num_variables: 45,
        num_constraints: 36,
        num_solver_variables: 1158,
        num_solver_constraints: 644,
        consistent: true,
    },
    BenchmarkProfile {
        id: "Renault",
        name: "RenaultConfigurationProblem",
        source: CLIB_SOURCE,
        num_variables: 99,
        num_constraints: 113,
        num_solver_variables: 3_178_088,
        num_solver_constraints: 1_694_394,
        consistent: true,
    },
];

/// Find a benchmark by its exact (case-sensitive) identifier.
pub fn lookup(id: &str) -> Option<&'static BenchmarkProfile> {
    CATALOG.iter().find(|profile| profile.id == id)
}
