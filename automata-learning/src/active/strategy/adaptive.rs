use tracing::trace;

use super::LearningStrategy;
use crate::active::{ObservationTable, Oracle};

/// Interleaves closing the table and making it consistent. Every pass performs at most one closedness fix
/// followed by at most one consistency fix, refilling the table after each of them, until a pass changes
/// nothing. In contrast to the default stabilisation the resulting table is always closed *and*
/// consistent.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdaptiveQuerySelection;

impl LearningStrategy for AdaptiveQuerySelection {
    fn name(&self) -> &'static str {
        "adaptive"
    }

    fn stabilize(&mut self, table: &mut ObservationTable, oracle: &dyn Oracle) {
        let mut passes = 0;
        loop {
            let mut changed = false;
            if let Some(extension) = table.find_unclosed() {
                changed |= table.add_base(extension);
                table.fill(|w| oracle.output(w));
            }
            if let Some(inconsistency) = table.find_inconsistency() {
                changed |= table.add_experiment(inconsistency.experiment);
                table.fill(|w| oracle.output(w));
            }
            if !changed {
                break;
            }
            passes += 1;
        }
        trace!("adaptive stabilisation took {passes} passes");
    }
}

#[cfg(test)]
mod tests {
    use crate::active::{
        tests::{agree_up_to, ends_with_ab, mod_three_partial},
        DFAOracle, LStar, LearningStrategy, ObservationTable, Oracle, Outcome,
    };

    use super::AdaptiveQuerySelection;

    #[test_log::test]
    fn table_ends_closed_and_consistent() {
        let oracle = DFAOracle::new(ends_with_ab(), 4);
        let mut table = ObservationTable::new(oracle.alphabet().clone());
        table.add_counterexample(&['b', 'a', 'b']);
        table.fill(|w| oracle.output(w));
        assert!(!table.is_consistent());

        AdaptiveQuerySelection.stabilize(&mut table, &oracle);
        assert!(table.is_closed());
        assert!(table.is_consistent());
    }

    #[test_log::test]
    fn learns_partial_target() {
        let target = mod_three_partial();
        let mut learner = LStar::new(DFAOracle::new(target.clone(), 6));
        let inference = learner.infer_with(&mut AdaptiveQuerySelection);
        assert_eq!(inference.outcome, Outcome::Accepted);
        assert!(agree_up_to(&inference.hypothesis, &target, target.alphabet(), 6));
    }
}
