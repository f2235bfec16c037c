use crate::alphabet::CharAlphabet;

use super::{AutomatonError, StateId, DFA};

/// Helper struct for the construction of [`DFA`]s. It collects states, edges, accepting states and
/// additional alphabet symbols and turns them into an automaton once the initial state is known.
///
/// # Example
///
/// We want to create a DFA with two states 0 and 1 over the alphabet `['a', 'b']`, where `a` switches
/// between the states and `b` loops. State 1 should be accepting, state 0 initial, so a word is accepted
/// iff it has an odd number of `a`s:
/// ```
/// use automata::prelude::*;
///
/// let dfa = DFA::builder()
///     .with_edges([(0, 'a', 1), (0, 'b', 0), (1, 'a', 0), (1, 'b', 1)])
///     .with_accepting([1])
///     .into_dfa(0)
///     .unwrap();
/// assert!(dfa.accepts("ab".chars()));
/// assert!(!dfa.accepts("aba".chars()));
/// ```
pub struct DFABuilder<Q = usize> {
    symbols: Vec<char>,
    states: Vec<Q>,
    edges: Vec<(Q, char, Q)>,
    accepting: Vec<Q>,
}

impl<Q> Default for DFABuilder<Q> {
    fn default() -> Self {
        Self {
            symbols: vec![],
            states: vec![],
            edges: vec![],
            accepting: vec![],
        }
    }
}

impl<Q: StateId> DFABuilder<Q> {
    /// By default, the only alphabet symbols in the automaton that is built are the ones that
    /// appear on at least one edge. This method can be used to force additional alphabet symbols to
    /// appear. Symbols given here come first in the alphabet order.
    pub fn with_alphabet_symbols<I>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = char>,
    {
        self.symbols.extend(symbols);
        self
    }

    /// Adds states that may not appear on any edge.
    pub fn with_states<I: IntoIterator<Item = Q>>(mut self, states: I) -> Self {
        self.states.extend(states);
        self
    }

    /// Adds a list of edges `(source, symbol, target)`. Later edges replace earlier ones with the same
    /// source and symbol.
    pub fn with_edges<I: IntoIterator<Item = (Q, char, Q)>>(mut self, edges: I) -> Self {
        self.edges.extend(edges);
        self
    }

    /// Marks the given states as accepting. Each of them must be a state of the automaton.
    pub fn with_accepting<I: IntoIterator<Item = Q>>(mut self, states: I) -> Self {
        self.accepting.extend(states);
        self
    }

    /// Builds the automaton with the given initial state. The states are the explicitly added ones, the
    /// endpoints of all edges and the initial state.
    pub fn into_dfa(self, initial: Q) -> Result<DFA<Q>, AutomatonError> {
        let alphabet = CharAlphabet::new(
            self.symbols
                .iter()
                .copied()
                .chain(self.edges.iter().map(|(_, a, _)| *a)),
        );
        let states: Vec<Q> = self
            .states
            .into_iter()
            .chain(
                self.edges
                    .iter()
                    .flat_map(|(q, _, p)| [q.clone(), p.clone()]),
            )
            .chain(std::iter::once(initial.clone()))
            .collect();
        DFA::from_parts(
            states,
            alphabet,
            self.edges.into_iter().map(|(q, a, p)| ((q, a), p)),
            initial,
            self.accepting,
        )
    }
}
