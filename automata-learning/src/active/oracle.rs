use std::{cell::Cell, ops::AddAssign};

use automata::{automaton::StateId, prelude::*};
use tracing::{debug, trace};

/// A word on which a hypothesis and the learned language disagree.
pub type Counterexample = Vec<char>;

/// Counts the queries an [`Oracle`] has answered so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueryCounts {
    pub membership: usize,
    pub equivalence: usize,
}

impl AddAssign for QueryCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.membership += rhs.membership;
        self.equivalence += rhs.equivalence;
    }
}

/// A trait that encapsulates a minimally adequate teacher (MAT) for active learning of regular languages.
/// It answers membership queries through [`Oracle::output`] and equivalence queries through
/// [`Oracle::equivalence`], the latter either accepting a hypothesis or producing a [`Counterexample`].
///
/// Queries take `&self`, implementations that keep statistics do so through interior mutability. The trait
/// is object safe so learning strategies can work with `&dyn Oracle`.
pub trait Oracle {
    fn alphabet(&self) -> &CharAlphabet;

    fn output(&self, word: &[char]) -> bool;

    fn equivalence(&self, hypothesis: &DFA) -> Result<(), Counterexample>;

    /// Returns how many queries have been posed so far.
    fn queries(&self) -> QueryCounts {
        QueryCounts::default()
    }
}

impl<O: Oracle + ?Sized> Oracle for &O {
    fn alphabet(&self) -> &CharAlphabet {
        O::alphabet(self)
    }

    fn output(&self, word: &[char]) -> bool {
        O::output(self, word)
    }

    fn equivalence(&self, hypothesis: &DFA) -> Result<(), Counterexample> {
        O::equivalence(self, hypothesis)
    }

    fn queries(&self) -> QueryCounts {
        O::queries(self)
    }
}

/// An oracle based on a reference [`DFA`]. It answers membership queries by running the word through the
/// automaton. Equivalence queries are *approximated*: all non-empty words over the alphabet of the reference
/// up to length `depth` are enumerated in length-lexicographic order and the first one on which reference and
/// hypothesis disagree is returned. If there is none, the hypothesis is accepted, even though it may well
/// differ from the reference on longer words. The depth has to be chosen large enough by the caller.
#[derive(Debug, Clone)]
pub struct DFAOracle<Q: StateId = usize> {
    automaton: DFA<Q>,
    depth: usize,
    membership: Cell<usize>,
    equivalence: Cell<usize>,
}

impl<Q: StateId> DFAOracle<Q> {
    /// Creates a new instance of a [`DFAOracle`] from the given automaton, equivalence queries consider all
    /// words of length at most `depth`.
    pub fn new(automaton: DFA<Q>, depth: usize) -> Self {
        Self {
            automaton,
            depth,
            membership: Cell::new(0),
            equivalence: Cell::new(0),
        }
    }

    pub fn automaton(&self) -> &DFA<Q> {
        &self.automaton
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl<Q: StateId> Oracle for DFAOracle<Q> {
    fn alphabet(&self) -> &CharAlphabet {
        self.automaton.alphabet()
    }

    fn output(&self, word: &[char]) -> bool {
        self.membership.set(self.membership.get() + 1);
        self.automaton.accepts(word)
    }

    fn equivalence(&self, hypothesis: &DFA) -> Result<(), Counterexample> {
        self.equivalence.set(self.equivalence.get() + 1);
        trace!(
            "equivalence query {} up to depth {}",
            self.equivalence.get(),
            self.depth
        );
        match words_up_to(self.automaton.alphabet(), self.depth)
            .find(|w| self.automaton.accepts(w) != hypothesis.accepts(w))
        {
            Some(counterexample) => {
                debug!(
                    "hypothesis with {} states misclassifies {}",
                    hypothesis.size(),
                    counterexample.show()
                );
                Err(counterexample)
            }
            None => Ok(()),
        }
    }

    fn queries(&self) -> QueryCounts {
        QueryCounts {
            membership: self.membership.get(),
            equivalence: self.equivalence.get(),
        }
    }
}
