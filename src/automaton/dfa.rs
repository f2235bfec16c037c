use std::{borrow::Borrow, collections::VecDeque};

use itertools::Itertools;
use tracing::trace;

use crate::{
    alphabet::CharAlphabet,
    math::{Map, OrderedSet},
    Show,
};

use super::{AutomatonError, DFABuilder, ProductIndex, StateId};

/// A deterministic finite automaton (DFA) with a *partial* transition function. A DFA accepts a finite
/// word if reading it from the initial state succeeds and ends in an accepting state. Should some
/// symbol of the word have no outgoing transition from the current state, the word is rejected.
///
/// Instances are immutable, operations like [`DFA::intersection`] or [`DFA::restrict_alphabet`] produce
/// new automata. Learned hypotheses use `usize` state identifiers, which is the default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DFA<Q: StateId = usize> {
    states: OrderedSet<Q>,
    alphabet: CharAlphabet,
    transitions: Map<(Q, char), Q>,
    initial: Q,
    accepting: OrderedSet<Q>,
}

impl DFA {
    /// Returns a [`DFABuilder`] for an automaton with `usize` states.
    pub fn builder() -> DFABuilder {
        DFABuilder::default()
    }
}

impl<Q: StateId> DFA<Q> {
    /// Assembles a DFA from its components, verifying that the initial state, all accepting states and
    /// all transition endpoints are states of the automaton and that every transition is labeled with a
    /// symbol of the alphabet.
    pub fn from_parts<S, A, T>(
        states: S,
        alphabet: CharAlphabet,
        transitions: T,
        initial: Q,
        accepting: A,
    ) -> Result<Self, AutomatonError>
    where
        S: IntoIterator<Item = Q>,
        A: IntoIterator<Item = Q>,
        T: IntoIterator<Item = ((Q, char), Q)>,
    {
        let states: OrderedSet<Q> = states.into_iter().collect();
        if !states.contains(&initial) {
            return Err(AutomatonError::malformed(format!(
                "initial state {} is not a state",
                initial.show()
            )));
        }

        let accepting: OrderedSet<Q> = accepting.into_iter().collect();
        if let Some(q) = accepting.iter().find(|q| !states.contains(*q)) {
            return Err(AutomatonError::malformed(format!(
                "accepting state {} is not a state",
                q.show()
            )));
        }

        let mut map = Map::default();
        for ((source, sym), target) in transitions {
            if !states.contains(&source) {
                return Err(AutomatonError::malformed(format!(
                    "transition source {} is not a state",
                    source.show()
                )));
            }
            if !states.contains(&target) {
                return Err(AutomatonError::malformed(format!(
                    "transition from {} on {sym} leads to unknown state {}",
                    source.show(),
                    target.show()
                )));
            }
            if !alphabet.contains(sym) {
                return Err(AutomatonError::malformed(format!(
                    "symbol {sym} used by a transition from {} is not in the alphabet",
                    source.show()
                )));
            }
            map.insert((source, sym), target);
        }

        Ok(Self {
            states,
            alphabet,
            transitions: map,
            initial,
            accepting,
        })
    }

    /// Returns the number of states.
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// Returns a reference to the alphabet.
    pub fn alphabet(&self) -> &CharAlphabet {
        &self.alphabet
    }

    /// Returns the initial state.
    pub fn initial(&self) -> &Q {
        &self.initial
    }

    /// Iterates over all states in ascending order.
    pub fn states(&self) -> impl Iterator<Item = &Q> + '_ {
        self.states.iter()
    }

    /// Iterates over all accepting states in ascending order.
    pub fn accepting_states(&self) -> impl Iterator<Item = &Q> + '_ {
        self.accepting.iter()
    }

    /// Returns true if and only if `state` is accepting.
    pub fn is_accepting(&self, state: &Q) -> bool {
        self.accepting.contains(state)
    }

    /// Returns the number of defined transitions.
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    /// Returns all defined transitions as triples `(source, symbol, target)`, sorted by source and symbol.
    pub fn edges(&self) -> Vec<(&Q, char, &Q)> {
        self.transitions
            .iter()
            .map(|((q, a), p)| (q, *a, p))
            .sorted()
            .collect()
    }

    /// Returns the successor of `state` on `symbol` or `None` if the transition is not defined.
    pub fn successor(&self, state: &Q, symbol: char) -> Option<&Q> {
        self.transitions.get(&(state.clone(), symbol))
    }

    /// Like [`Self::successor`], but fails with [`AutomatonError::UnresolvedTransition`] if no transition exists.
    pub fn try_successor(&self, state: &Q, symbol: char) -> Result<&Q, AutomatonError> {
        self.successor(state, symbol)
            .ok_or_else(|| AutomatonError::UnresolvedTransition {
                state: state.show(),
                symbol,
            })
    }

    /// Runs the given word from the initial state. Returns the reached state, or `None` as soon as
    /// a symbol has no transition.
    pub fn reached_state<W>(&self, word: W) -> Option<&Q>
    where
        W: IntoIterator,
        W::Item: Borrow<char>,
    {
        word.into_iter()
            .try_fold(&self.initial, |q, sym| self.successor(q, *sym.borrow()))
    }

    /// Decides whether the given word is accepted. A missing transition leads to rejection.
    pub fn accepts<W>(&self, word: W) -> bool
    where
        W: IntoIterator,
        W::Item: Borrow<char>,
    {
        self.reached_state(word)
            .map(|q| self.is_accepting(q))
            .unwrap_or(false)
    }

    /// Computes the intersection of `self` with `other` through the classic product construction over
    /// the symbols both automata share. The resulting state set is the full Cartesian product of both state
    /// sets, so unreachable pairs are kept, and no minimization takes place. A pair of states has a
    /// transition on some symbol if and only if both components do.
    pub fn intersection<P: StateId>(&self, other: &DFA<P>) -> DFA<ProductIndex<Q, P>> {
        let alphabet = self.alphabet.intersection(&other.alphabet);

        let states: OrderedSet<_> = self
            .states
            .iter()
            .cartesian_product(other.states.iter())
            .map(|(l, r)| ProductIndex(l.clone(), r.clone()))
            .collect();
        let accepting = self
            .accepting
            .iter()
            .cartesian_product(other.accepting.iter())
            .map(|(l, r)| ProductIndex(l.clone(), r.clone()))
            .collect();

        let mut transitions = Map::default();
        for ProductIndex(l, r) in &states {
            for sym in alphabet.universe() {
                if let (Some(lp), Some(rp)) = (self.successor(l, sym), other.successor(r, sym)) {
                    transitions.insert(
                        (ProductIndex(l.clone(), r.clone()), sym),
                        ProductIndex(lp.clone(), rp.clone()),
                    );
                }
            }
        }
        trace!(
            "built product with {} states and {} transitions",
            states.len(),
            transitions.len()
        );

        DFA {
            states,
            alphabet,
            transitions,
            initial: ProductIndex(self.initial.clone(), other.initial.clone()),
            accepting,
        }
    }

    /// Renames the states to `0..n` following their order. This is a bijection, so the result accepts the
    /// same language and has precisely the same number of states and transitions.
    pub fn relabel(&self) -> DFA<usize> {
        let ids: Map<&Q, usize> = self.states.iter().enumerate().map(|(i, q)| (q, i)).collect();
        DFA {
            states: (0..self.states.len()).collect(),
            alphabet: self.alphabet.clone(),
            transitions: self
                .transitions
                .iter()
                .map(|((q, a), p)| ((ids[q], *a), ids[p]))
                .collect(),
            initial: ids[&self.initial],
            accepting: self.accepting.iter().map(|q| ids[q]).collect(),
        }
    }

    /// Computes the set of states that can be reached from the initial state.
    pub fn reachable_states(&self) -> OrderedSet<Q> {
        let mut seen = OrderedSet::from([self.initial.clone()]);
        let mut queue = VecDeque::from([&self.initial]);
        while let Some(q) = queue.pop_front() {
            for sym in self.alphabet.universe() {
                if let Some(p) = self.successor(q, sym) {
                    if seen.insert(p.clone()) {
                        queue.push_back(p);
                    }
                }
            }
        }
        seen
    }

    /// Returns a copy of `self` in which only the transitions that leave a reachable state are kept. The
    /// states themselves remain untouched.
    pub fn retain_reachable_transitions(&self) -> Self {
        let reachable = self.reachable_states();
        Self {
            transitions: self
                .transitions
                .iter()
                .filter(|((q, _), _)| reachable.contains(q))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            ..self.clone()
        }
    }

    /// Returns a copy of `self` over the given alphabet, dropping all transitions on symbols that are not
    /// part of it.
    pub fn restrict_alphabet(&self, alphabet: CharAlphabet) -> Self {
        Self {
            transitions: self
                .transitions
                .iter()
                .filter(|((_, a), _)| alphabet.contains(*a))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            alphabet,
            ..self.clone()
        }
    }
}

impl<Q: StateId> Show for DFA<Q> {
    fn show(&self) -> String {
        format!(
            "DFA over {} with {} states, initial {}, accepting {{{}}}, transitions [{}]",
            self.alphabet.show(),
            self.size(),
            self.initial.show(),
            self.accepting.iter().map(|q| q.show()).join(", "),
            self.edges()
                .into_iter()
                .map(|(q, a, p)| format!("{} -{a}-> {}", q.show(), p.show()))
                .join(", ")
        )
    }
}
