use automata::prelude::*;
use tracing::debug;

use super::LearningStrategy;

/// Prunes every assumption once all of them are learned: only the transitions leaving a state that is
/// reachable from the initial state are kept. The states themselves and the accepted language stay the
/// same, the orchestrator verifies the pruned assumptions again nonetheless.
#[derive(Debug, Clone, Copy, Default)]
pub struct HypothesisMerging;

impl LearningStrategy for HypothesisMerging {
    fn name(&self) -> &'static str {
        "merging"
    }

    fn merge_assumptions(&mut self, assumptions: &[DFA]) -> Option<Vec<DFA>> {
        Some(
            assumptions
                .iter()
                .map(|assumption| {
                    let pruned = assumption.retain_reachable_transitions();
                    debug!(
                        "pruned assumption from {} to {} transitions",
                        assumption.transition_count(),
                        pruned.transition_count()
                    );
                    pruned
                })
                .collect(),
        )
    }
}
