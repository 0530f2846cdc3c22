//! The statistics report: one numbered entry per knowledge base, written
//! and flushed as soon as it is computed.

use crate::errors::{Error, Result};
use crate::fm::{FeatureModel, RelationshipKind};
use crate::kb::KnowledgeBase;
use crate::solver::{SolveBudget, Solver};
use std::fmt;
use std::io::Write;

/// One rendered report entry.
#[derive(Debug, Clone, Copy)]
pub struct ReportEntry<'a> {
    /// 1-based position in the run.
    pub sequence: usize,
    pub kb: &'a KnowledgeBase,
    pub consistent: bool,
    /// Present for knowledge bases derived from a feature model.
    pub feature_model: Option<&'a FeatureModel>,
}

impl fmt::Display for ReportEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kb = self.kb;
        writeln!(f, "{}", self.sequence)?;
        writeln!(f, "Name: {}", kb.name())?;
        writeln!(f, "Source: {}", kb.source())?;
        writeln!(f, "#variables: {}", kb.num_variables())?;
        writeln!(f, "#constraints: {}", kb.num_constraints())?;
        writeln!(f, "#Choco variables: {}", kb.num_solver_variables())?;
        writeln!(f, "#Choco constraints: {}", kb.num_solver_constraints())?;
        writeln!(f, "Consistency: {}", self.consistent)?;

        let Some(fm) = self.feature_model else {
            return Ok(());
        };
        writeln!(f)?;
        writeln!(
            f,
            "CTC ratio: {}",
            format_ratio(fm.num_constraints(), kb.num_constraints())
        )?;
        writeln!(f, "#features: {}", fm.num_features())?;
        writeln!(f, "#relationships: {}", fm.num_relationships())?;
        writeln!(f, "#constraints: {}", fm.num_constraints())?;
        for kind in RelationshipKind::ALL {
            writeln!(f, "#{}: {}", kind.label(), fm.count(kind))?;
        }
        Ok(())
    }
}

/// Render `numerator / denominator` the way legacy reports spell doubles:
/// `0.4`, `1.0`, `5.0E-4`, `1.0E7`, `NaN`, `Infinity`.
pub fn format_ratio(numerator: usize, denominator: usize) -> String {
    format_double(numerator as f64 / denominator as f64)
}

fn format_double(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0.0".to_string();
    }

    let magnitude = value.abs();
    if (1e-3..1e7).contains(&magnitude) {
        let plain = value.to_string();
        return if plain.contains('.') {
            plain
        } else {
            format!("{plain}.0")
        };
    }

    let scientific = format!("{value:e}");
    match scientific.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => format!("{mantissa}E{exponent}"),
        Some((mantissa, exponent)) => format!("{mantissa}.0E{exponent}"),
        None => scientific,
    }
}

/// Writes report entries to a stream, running one consistency check per
/// entry.
pub struct StatisticsEngine<W: Write> {
    out: W,
    destination: String,
    solver: Box<dyn Solver>,
    budget: SolveBudget,
}

impl<W: Write> StatisticsEngine<W> {
    /// `destination` names the stream in output errors.
    pub fn new(
        out: W,
        destination: impl Into<String>,
        solver: Box<dyn Solver>,
        budget: SolveBudget,
    ) -> Self {
        Self {
            out,
            destination: destination.into(),
            solver,
            budget,
        }
    }

    /// Write the plain statistics entry for a knowledge base.
    pub fn render_knowledge_base(&mut self, sequence: usize, kb: &KnowledgeBase) -> Result<()> {
        self.render(sequence, kb, None)
    }

    /// Write the statistics entry for a knowledge base derived from `fm`,
    /// followed by the feature model breakdown.
    pub fn render_feature_model(
        &mut self,
        sequence: usize,
        kb: &KnowledgeBase,
        fm: &FeatureModel,
    ) -> Result<()> {
        self.render(sequence, kb, Some(fm))
    }

    fn render(
        &mut self,
        sequence: usize,
        kb: &KnowledgeBase,
        feature_model: Option<&FeatureModel>,
    ) -> Result<()> {
        let consistent = kb.is_consistent(self.solver.as_ref(), &self.budget)?;
        let entry = ReportEntry {
            sequence,
            kb,
            consistent,
            feature_model,
        };

        write!(self.out, "{entry}").map_err(|e| {
            Error::output("failed to write report entry", self.destination.clone(), e)
        })?;
        self.out.flush().map_err(|e| {
            Error::output("failed to flush report", self.destination.clone(), e)
        })?;
        log::info!("Wrote entry {sequence}: {}", kb.name());
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fm::tests::smartwatch;
    use crate::solver::DpllSolver;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::io;

    fn engine() -> StatisticsEngine<Vec<u8>> {
        StatisticsEngine::new(
            Vec::new(),
            "memory",
            Box::new(DpllSolver::new()),
            SolveBudget::unbounded(),
        )
    }

    #[test]
    fn renders_named_benchmark() {
        let mut engine = engine();
        let kb = KnowledgeBase::from_named("PC").unwrap();
        engine.render_knowledge_base(1, &kb).unwrap();

        let text = String::from_utf8(engine.into_inner()).unwrap();
        assert_eq!(
            text,
            indoc! {"
                1
                Name: PCConfigurationProblem
                Source: https://www.itu.dk/research/cla/externals/clib/
                #variables: 45
                #constraints: 36
                #Choco variables: 1158
                #Choco constraints: 644
                Consistency: true
            "}
        );
    }

    #[test]
    fn renders_feature_model_breakdown() {
        let fm = smartwatch();
        let kb = KnowledgeBase::from_feature_model(&fm);
        let mut engine = engine();
        engine.render_feature_model(3, &kb, &fm).unwrap();

        let text = String::from_utf8(engine.into_inner()).unwrap();
        assert_eq!(
            text,
            indoc! {"
                3
                Name: smartwatch.sxfm
                Source: SPLOT
                #variables: 12
                #constraints: 10
                #Choco variables: 12
                #Choco constraints: 21
                Consistency: true

                CTC ratio: 0.4
                #features: 12
                #relationships: 6
                #constraints: 4
                #MANDATORY: 2
                #OPTIONAL: 2
                #ALTERNATIVE: 1
                #OR: 1
                #REQUIRES: 2
                #EXCLUDES: 1
            "}
        );
    }

    #[test]
    fn ratio_spelling() {
        assert_eq!(format_ratio(4, 10), "0.4");
        assert_eq!(format_ratio(3, 3), "1.0");
        assert_eq!(format_ratio(1, 3), "0.3333333333333333");
        assert_eq!(format_ratio(1, 2000), "5.0E-4");
        assert_eq!(format_ratio(12_345_678, 1), "1.2345678E7");
        assert_eq!(format_ratio(0, 7), "0.0");
        assert_eq!(format_ratio(2, 0), "Infinity");
        assert_eq!(format_ratio(0, 0), "NaN");
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failures_are_output_errors() {
        let mut engine = StatisticsEngine::new(
            FailingWriter,
            "report.txt",
            Box::new(DpllSolver::new()),
            SolveBudget::unbounded(),
        );
        let kb = KnowledgeBase::from_named("Renault").unwrap();
        let err = engine.render_knowledge_base(1, &kb).unwrap_err();
        assert!(matches!(err, Error::Output { ref destination, .. } if destination == "report.txt"));
    }
}
