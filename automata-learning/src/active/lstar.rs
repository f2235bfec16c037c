use automata::prelude::*;
use tracing::{debug, info, trace, warn};

use super::{
    oracle::{Counterexample, Oracle},
    strategy::{Baseline, LearningStrategy},
    ObservationTable,
};

/// How a run of the learner ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    /// The oracle found no counterexample for the final hypothesis.
    Accepted,
    /// A counterexample recurred, so learning was given up and the last hypothesis returned.
    Abandoned,
}

/// The result of running [`LStar`].
#[derive(Debug, Clone)]
pub struct Inference {
    pub hypothesis: DFA,
    /// The number of hypotheses that were constructed.
    pub iterations: usize,
    /// All distinct counterexamples in the order in which they were processed.
    pub counterexamples: Vec<Counterexample>,
    pub outcome: Outcome,
}

/// Drives the observation table to a closed and consistent state by first closing it completely and
/// then resolving inconsistencies, refilling the table after every change.
///
/// Resolving an inconsistency may leave the table unclosed again. The hypothesis is built regardless,
/// missing transitions then simply reject, and the next counterexample repairs the table.
pub fn close_then_make_consistent(table: &mut ObservationTable, oracle: &dyn Oracle) {
    while let Some(extension) = table.find_unclosed() {
        trace!("table not closed, promoting {}", extension.show());
        table.add_base(extension);
        table.fill(|w| oracle.output(w));
    }

    while let Some(inconsistency) = table.find_inconsistency() {
        trace!(
            "table not consistent for {} and {} on {}, adding experiment {}",
            inconsistency.left.show(),
            inconsistency.right.show(),
            inconsistency.symbol,
            inconsistency.experiment.show()
        );
        table.add_experiment(inconsistency.experiment);
        table.fill(|w| oracle.output(w));
    }
}

/// An implementation of the L* algorithm for learning DFAs.
///
/// The learner alternates between stabilising its [`ObservationTable`], building a hypothesis from it and
/// asking the oracle whether the hypothesis is correct. A counterexample is processed by adding all of its
/// prefixes to the base of the table. The learner remembers every counterexample it has seen: should one
/// recur, learning is abandoned and the current hypothesis is returned. This bounds the number of
/// iterations by the number of distinct counterexamples even if the oracle only approximates equivalence.
pub struct LStar<O: Oracle> {
    oracle: O,
    table: ObservationTable,
    counterexamples: Vec<Counterexample>,
    seen: math::Set<Counterexample>,
}

impl<O: Oracle> LStar<O> {
    /// Creates a learner over the alphabet of the oracle.
    pub fn new(oracle: O) -> Self {
        let alphabet = oracle.alphabet().clone();
        Self::with_alphabet(alphabet, oracle)
    }

    /// Creates a learner whose hypotheses range over the given alphabet, which may differ from the
    /// alphabet of the oracle.
    pub fn with_alphabet(alphabet: CharAlphabet, oracle: O) -> Self {
        Self {
            oracle,
            table: ObservationTable::new(alphabet),
            counterexamples: vec![],
            seen: math::Set::default(),
        }
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn table(&self) -> &ObservationTable {
        &self.table
    }

    pub fn into_oracle(self) -> O {
        self.oracle
    }

    /// Runs plain L*, see [`Self::infer_with`].
    pub fn infer(&mut self) -> Inference {
        self.infer_with(&mut Baseline)
    }

    /// Runs the learner with the given strategy until the oracle accepts a hypothesis or a counterexample
    /// recurs.
    pub fn infer_with(&mut self, strategy: &mut dyn LearningStrategy) -> Inference {
        let start = std::time::Instant::now();
        debug!("running L* with {} strategy", strategy.name());

        let oracle = &self.oracle;
        self.table.fill(|w| oracle.output(w));

        let mut iterations = 0;
        loop {
            iterations += 1;
            strategy.stabilize(&mut self.table, &self.oracle);
            trace!("L* iteration {iterations} with table\n{:?}", self.table);

            let hypothesis = self.table.hypothesis();
            debug!(
                "iteration {iterations}: hypothesis with {} states and {} transitions",
                hypothesis.size(),
                hypothesis.transition_count()
            );

            let counterexample = match strategy.replay_counterexample(
                &self.table,
                &self.oracle,
                &hypothesis,
                &self.counterexamples,
            ) {
                Some(replayed) => Some(replayed),
                None => self.oracle.equivalence(&hypothesis).err(),
            };

            let Some(counterexample) = counterexample else {
                info!(
                    "L* learned hypothesis with {} states in {iterations} iterations, took {}ms",
                    hypothesis.size(),
                    start.elapsed().as_millis()
                );
                return Inference {
                    hypothesis: strategy.finalize(hypothesis),
                    iterations,
                    counterexamples: self.counterexamples.clone(),
                    outcome: Outcome::Accepted,
                };
            };

            if self.seen.contains(&counterexample) {
                warn!(
                    "counterexample {} recurred after {iterations} iterations, abandoning",
                    counterexample.show()
                );
                return Inference {
                    hypothesis,
                    iterations,
                    counterexamples: self.counterexamples.clone(),
                    outcome: Outcome::Abandoned,
                };
            }

            self.refine(counterexample, strategy);
        }
    }

    fn refine(&mut self, counterexample: Counterexample, strategy: &mut dyn LearningStrategy) {
        debug!("processing counterexample {}", counterexample.show());
        let added = self.table.add_counterexample(&counterexample);
        trace!("added {} prefixes to the base", added.len());

        let oracle = &self.oracle;
        self.table
            .fill_with(|w| oracle.output(w), |w| strategy.admit_query(w));

        self.seen.insert(counterexample.clone());
        self.counterexamples.push(counterexample);
    }
}
