//! Active learning of deterministic finite automata with Angluin's L* algorithm, and compositional
//! (assume-guarantee) verification built on top of it.
//!
//! The [`active`] module contains the learner: an [`ObservationTable`](active::ObservationTable), the
//! [`Oracle`](active::Oracle) abstraction of a minimally adequate teacher, the [`LStar`](active::LStar)
//! learner itself and a number of [`LearningStrategy`](active::LearningStrategy) variants that alter how
//! queries and counterexamples are processed.
//!
//! The [`assume_guarantee`] module uses the learner to obtain one assumption automaton per system
//! component and checks a global property against the composition of those assumptions.
#![allow(missing_docs)]

/// Deals with active learning algorithms such as L*.
pub mod active;

/// Compositional verification of a property over a collection of components.
pub mod assume_guarantee;

pub mod prelude {
    pub use super::active::{
        DFAOracle, Inference, LStar, LearningStrategy, ObservationTable, Oracle, Outcome,
        QueryCounts, StrategyKind,
    };
    pub use super::assume_guarantee::{AgConfig, AssumeGuarantee, Failure, Mismatch, Report};
}
