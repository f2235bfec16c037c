use automata::prelude::*;
use tracing::debug;

use super::LearningStrategy;
use crate::active::{oracle::Counterexample, Experiment, ObservationTable, Oracle};

/// Replays all counterexamples that were processed before against every new hypothesis. The expected
/// output is taken from the table where possible, only if the cell is absent is the oracle asked. A
/// counterexample that is still misclassified is handed back to the learner as if the oracle had
/// produced it, which ends learning without posing another equivalence query.
#[derive(Debug, Clone, Copy, Default)]
pub struct CounterexampleReuse;

impl LearningStrategy for CounterexampleReuse {
    fn name(&self) -> &'static str {
        "reuse"
    }

    fn replay_counterexample(
        &mut self,
        table: &ObservationTable,
        oracle: &dyn Oracle,
        hypothesis: &DFA,
        previous: &[Counterexample],
    ) -> Option<Counterexample> {
        let misclassified = previous.iter().find(|counterexample| {
            let expected = table
                .cell(counterexample, &Experiment::empty())
                .unwrap_or_else(|| oracle.output(counterexample));
            hypothesis.accepts(counterexample.iter()) != expected
        })?;
        debug!(
            "stored counterexample {} is still misclassified",
            misclassified.show()
        );
        Some(misclassified.clone())
    }
}
