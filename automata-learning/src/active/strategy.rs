//! Variations of L* that differ in how queries are posed and how counterexamples and hypotheses are
//! processed. A [`LearningStrategy`] is handed to [`LStar::infer_with`](super::LStar::infer_with), the
//! learner calls into it at fixed points of its loop. The strategies are usually selected through a
//! [`StrategyKind`], which can be parsed from its name.
use std::{fmt::Display, str::FromStr};

use automata::prelude::*;
use thiserror::Error;

use super::{close_then_make_consistent, oracle::Counterexample, ObservationTable, Oracle};

mod adaptive;
pub use adaptive::AdaptiveQuerySelection;

mod merging;
pub use merging::HypothesisMerging;

mod minimise;
pub use minimise::AlphabetMinimisation;

mod reuse;
pub use reuse::CounterexampleReuse;

mod selective;
pub use selective::SelectiveMembership;

/// Hooks through which a strategy alters the behaviour of the learner. Every method has a default
/// implementation that does what plain L* does, so a strategy only overrides the points where it
/// deviates.
pub trait LearningStrategy {
    /// A short name used when logging.
    fn name(&self) -> &'static str;

    /// Decides whether the membership query for `word` should be posed while the rows of the prefixes of a
    /// new counterexample are filled. A rejected query leaves its cell absent.
    fn admit_query(&mut self, _word: &[char]) -> bool {
        true
    }

    /// Brings the table into a state from which a hypothesis is built.
    fn stabilize(&mut self, table: &mut ObservationTable, oracle: &dyn Oracle) {
        close_then_make_consistent(table, oracle)
    }

    /// Called before every equivalence query with all counterexamples processed so far. Returning one of
    /// them makes the learner treat it as the answer of the equivalence query, which then is not posed.
    fn replay_counterexample(
        &mut self,
        _table: &ObservationTable,
        _oracle: &dyn Oracle,
        _hypothesis: &DFA,
        _previous: &[Counterexample],
    ) -> Option<Counterexample> {
        None
    }

    /// Post-processes a hypothesis that the oracle has accepted.
    fn finalize(&mut self, hypothesis: DFA) -> DFA {
        hypothesis
    }

    /// Post-processes the assumptions once all of them are learned. `None` leaves them as they are, a
    /// returned list replaces them and has to be verified anew.
    fn merge_assumptions(&mut self, _assumptions: &[DFA]) -> Option<Vec<DFA>> {
        None
    }
}

/// Plain L*.
#[derive(Debug, Clone, Copy, Default)]
pub struct Baseline;

impl LearningStrategy for Baseline {
    fn name(&self) -> &'static str {
        "baseline"
    }
}

/// The probability with which [`SelectiveMembership`] poses a query unless configured otherwise.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Names one of the available strategies together with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StrategyKind {
    #[default]
    Baseline,
    CounterexampleReuse,
    Selective {
        threshold: f64,
        seed: u64,
    },
    AlphabetMinimisation,
    Adaptive,
    HypothesisMerging,
}

impl StrategyKind {
    /// Instantiates the strategy.
    pub fn build(&self) -> Box<dyn LearningStrategy> {
        match *self {
            StrategyKind::Baseline => Box::new(Baseline),
            StrategyKind::CounterexampleReuse => Box::new(CounterexampleReuse),
            StrategyKind::Selective { threshold, seed } => {
                Box::new(SelectiveMembership::seeded(threshold, seed))
            }
            StrategyKind::AlphabetMinimisation => Box::new(AlphabetMinimisation),
            StrategyKind::Adaptive => Box::new(AdaptiveQuerySelection),
            StrategyKind::HypothesisMerging => Box::new(HypothesisMerging),
        }
    }

    /// Replaces the seed of a selective strategy, other kinds are returned unchanged.
    pub fn with_seed(self, seed: u64) -> Self {
        match self {
            StrategyKind::Selective { threshold, .. } => StrategyKind::Selective { threshold, seed },
            other => other,
        }
    }
}

/// Returned when a string does not name a strategy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyParseError {
    #[error("unknown learning strategy `{0}`, expected one of baseline, reuse, selective, minimise, adaptive, merging")]
    Unknown(String),
    #[error("invalid threshold `{0}` for selective membership queries, expected a number in [0, 1]")]
    Threshold(String),
}

impl FromStr for StrategyKind {
    type Err = StrategyParseError;

    /// Parses the name of a strategy. The selective strategy optionally takes its threshold after an
    /// equals sign, as in `selective=0.7`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, parameter) = match s.trim().split_once('=') {
            Some((name, parameter)) => (name.trim(), Some(parameter.trim())),
            None => (s.trim(), None),
        };

        let kind = match name.to_ascii_lowercase().as_str() {
            "baseline" | "lstar" => StrategyKind::Baseline,
            "reuse" => StrategyKind::CounterexampleReuse,
            "selective" => {
                let threshold = match parameter {
                    Some(raw) => raw
                        .parse::<f64>()
                        .ok()
                        .filter(|t| (0.0..=1.0).contains(t))
                        .ok_or_else(|| StrategyParseError::Threshold(raw.to_string()))?,
                    None => DEFAULT_THRESHOLD,
                };
                return Ok(StrategyKind::Selective { threshold, seed: 0 });
            }
            "minimise" | "minimize" => StrategyKind::AlphabetMinimisation,
            "adaptive" => StrategyKind::Adaptive,
            "merging" => StrategyKind::HypothesisMerging,
            _ => return Err(StrategyParseError::Unknown(s.to_string())),
        };

        match parameter {
            Some(_) => Err(StrategyParseError::Unknown(s.to_string())),
            None => Ok(kind),
        }
    }
}

impl Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyKind::Baseline => write!(f, "baseline"),
            StrategyKind::CounterexampleReuse => write!(f, "reuse"),
            StrategyKind::Selective { threshold, .. } => write!(f, "selective={threshold}"),
            StrategyKind::AlphabetMinimisation => write!(f, "minimise"),
            StrategyKind::Adaptive => write!(f, "adaptive"),
            StrategyKind::HypothesisMerging => write!(f, "merging"),
        }
    }
}
