use std::{fmt::Debug, hash::Hash};

use thiserror::Error;

use crate::Show;

mod dfa;
pub use dfa::DFA;

mod product;
pub use product::ProductIndex;

mod builder;
pub use builder::DFABuilder;

mod spec;
pub use spec::{build_automaton, AutomatonSpec};

/// A state identifier is an opaque value that names a state of a [`DFA`]. Learned automata use
/// `usize`, automata read from an [`AutomatonSpec`] use the symbolic names given there and product
/// automata use [`ProductIndex`].
pub trait StateId: Clone + Eq + Ord + Hash + Debug + Show {}
impl<Q: Clone + Eq + Ord + Hash + Debug + Show> StateId for Q {}

/// Errors that can occur when constructing or inspecting an automaton.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum AutomatonError {
    /// The given description of an automaton references states or symbols that do not exist.
    #[error("malformed automaton specification: {0}")]
    MalformedSpecification(String),
    /// A transition was requested that the (partial) transition function does not define.
    #[error("no transition from state `{state}` on symbol `{symbol}`")]
    UnresolvedTransition {
        /// The state from which the transition was attempted.
        state: String,
        /// The symbol on which no transition exists.
        symbol: char,
    },
}

impl AutomatonError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedSpecification(reason.into())
    }
}
