use std::collections::BTreeMap;

use tracing::debug;

use crate::alphabet::CharAlphabet;

use super::{AutomatonError, DFA};

/// A structured description of an automaton with symbolic state names, as it is typically read from a
/// configuration file. Symbols are given as strings, each of which has to consist of precisely one character.
///
/// Use [`build_automaton`] to turn a specification into a [`DFA`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AutomatonSpec {
    /// The names of all states.
    pub states: Vec<String>,
    /// The symbols of the alphabet, in the order in which they should be enumerated.
    pub alphabet: Vec<String>,
    /// The name of the initial state.
    pub start_state: String,
    /// The names of all accepting states.
    pub accept_states: Vec<String>,
    /// Maps a state name to a mapping from symbol to the name of the successor state.
    #[cfg_attr(feature = "serde", serde(default))]
    pub transitions: BTreeMap<String, BTreeMap<String, String>>,
}

fn parse_symbol(symbol: &str) -> Result<char, AutomatonError> {
    let mut chars = symbol.chars();
    match (chars.next(), chars.next()) {
        (Some(sym), None) => Ok(sym),
        _ => Err(AutomatonError::malformed(format!(
            "`{symbol}` is not a single symbol"
        ))),
    }
}

/// Builds a [`DFA`] from the given specification. Fails with [`AutomatonError::MalformedSpecification`]
/// if the start state, an accepting state or the source or destination of a transition is not among the
/// declared states, or if a symbol is not a single character of the declared alphabet.
pub fn build_automaton(spec: &AutomatonSpec) -> Result<DFA<String>, AutomatonError> {
    let alphabet = spec
        .alphabet
        .iter()
        .map(|s| parse_symbol(s))
        .collect::<Result<CharAlphabet, _>>()?;

    let mut transitions = vec![];
    for (source, mapping) in &spec.transitions {
        for (symbol, target) in mapping {
            transitions.push(((source.clone(), parse_symbol(symbol)?), target.clone()));
        }
    }

    let dfa = DFA::from_parts(
        spec.states.iter().cloned(),
        alphabet,
        transitions,
        spec.start_state.clone(),
        spec.accept_states.iter().cloned(),
    )?;
    debug!(
        "built automaton with {} states and {} transitions from specification",
        dfa.size(),
        dfa.transition_count()
    );
    Ok(dfa)
}

impl TryFrom<&AutomatonSpec> for DFA<String> {
    type Error = AutomatonError;

    fn try_from(value: &AutomatonSpec) -> Result<Self, Self::Error> {
        build_automaton(value)
    }
}
