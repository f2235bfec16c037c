use automata::prelude::*;
use tracing::debug;

use super::LearningStrategy;

/// Shrinks the alphabet of an accepted hypothesis. A symbol is kept only if a single step on it from the
/// initial state changes whether the empty word is accepted, that is if the acceptance of the successor
/// differs from the acceptance of the initial state. Symbols without a transition from the initial state
/// are dropped. All transitions on dropped symbols are removed.
///
/// This is a heuristic that only looks one step ahead. It can change the accepted language, which the
/// fidelity check of the orchestrator then reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphabetMinimisation;

impl AlphabetMinimisation {
    pub fn relevant_symbols<Q: StateId>(dfa: &DFA<Q>) -> CharAlphabet {
        let initial = dfa.initial();
        let initially_accepting = dfa.is_accepting(initial);
        dfa.alphabet()
            .restrict(|sym| match dfa.try_successor(initial, sym) {
                Ok(successor) => dfa.is_accepting(successor) != initially_accepting,
                Err(err) => {
                    debug!("dropping symbol {sym}: {err}");
                    false
                }
            })
    }
}

impl LearningStrategy for AlphabetMinimisation {
    fn name(&self) -> &'static str {
        "minimise"
    }

    fn finalize(&mut self, hypothesis: DFA) -> DFA {
        let kept = Self::relevant_symbols(&hypothesis);
        debug!(
            "minimised alphabet from {} to {}",
            hypothesis.alphabet().show(),
            kept.show()
        );
        hypothesis.restrict_alphabet(kept)
    }
}
