use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};
use tracing::trace;

use super::LearningStrategy;
use crate::active::{close_then_make_consistent, ObservationTable, Oracle};

/// Saves membership queries while the rows of new counterexample prefixes are filled: each query is only
/// posed with probability `threshold`, the remaining cells stay absent. Before the table is stabilised all
/// absent cells are resolved, so a hypothesis is never built on skipped queries, they are merely postponed
/// to the point where the table changes anyway.
///
/// The source of randomness is injected, [`SelectiveMembership::seeded`] uses a seeded [`StdRng`] so runs
/// are reproducible.
#[derive(Debug, Clone)]
pub struct SelectiveMembership<R: RngCore = StdRng> {
    threshold: f64,
    rng: R,
    skipped: usize,
}

impl SelectiveMembership<StdRng> {
    pub fn seeded(threshold: f64, seed: u64) -> Self {
        Self::new(threshold, StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> SelectiveMembership<R> {
    pub fn new(threshold: f64, rng: R) -> Self {
        Self {
            threshold,
            rng,
            skipped: 0,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// The number of queries that have been skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<R: RngCore> LearningStrategy for SelectiveMembership<R> {
    fn name(&self) -> &'static str {
        "selective"
    }

    fn admit_query(&mut self, word: &[char]) -> bool {
        if self.rng.gen::<f64>() < self.threshold {
            return true;
        }
        trace!("skipping membership query for {word:?}");
        self.skipped += 1;
        false
    }

    fn stabilize(&mut self, table: &mut ObservationTable, oracle: &dyn Oracle) {
        let resolved = table.fill(|w| oracle.output(w));
        if resolved > 0 {
            trace!("resolved {resolved} deferred cells");
        }
        close_then_make_consistent(table, oracle)
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::mock::StepRng, rngs::StdRng, SeedableRng};

    use super::SelectiveMembership;
    use crate::active::{
        tests::{agree_up_to, ends_with_ab},
        DFAOracle, Experiment, LStar, LearningStrategy, ObservationTable, Oracle, Outcome,
    };

    #[test]
    fn threshold_zero_skips_everything() {
        let oracle = DFAOracle::new(ends_with_ab(), 4);
        let mut table = ObservationTable::new(oracle.alphabet().clone());
        let mut selective = SelectiveMembership::new(0.0, StepRng::new(0, 1));
        table.add_counterexample(&['a', 'b']);

        let posed = table.fill_with(|w| oracle.output(w), |w| selective.admit_query(w));
        assert_eq!(posed, 0);
        assert_eq!(selective.skipped(), table.row_words().len());
        assert_eq!(table.cell(&['a', 'b'], &Experiment::empty()), None);

        selective.stabilize(&mut table, &oracle);
        assert_eq!(table.cell(&['a', 'b'], &Experiment::empty()), Some(true));
        assert!(table.is_closed());
    }

    #[test]
    fn threshold_one_admits_everything() {
        let mut selective = SelectiveMembership::seeded(1.0, 3);
        assert!((0..100).all(|_| selective.admit_query(&['a'])));
        assert_eq!(selective.skipped(), 0);
    }

    #[test_log::test]
    fn learns_with_skipped_queries() {
        let target = ends_with_ab();
        let mut learner = LStar::new(DFAOracle::new(target.clone(), 5));
        let mut selective = SelectiveMembership::new(0.3, StdRng::seed_from_u64(11));
        let inference = learner.infer_with(&mut selective);
        assert_eq!(inference.outcome, Outcome::Accepted);
        assert!(agree_up_to(&inference.hypothesis, &target, target.alphabet(), 6));
    }

    #[test]
    fn same_seed_same_decisions() {
        let decisions = |seed| {
            let mut selective = SelectiveMembership::seeded(0.5, seed);
            (0..64).map(|_| selective.admit_query(&[])).collect::<Vec<_>>()
        };
        assert_eq!(decisions(5), decisions(5));
    }
}
