//! Library for working with deterministic finite automata over character alphabets.
//!
//! The central type is [`DFA`](automaton::DFA), an immutable automaton whose transition function is
//! *partial*: if no transition exists for a state and a symbol, any word that attempts to take it is
//! rejected. Automata are either built by hand through the [`DFABuilder`](automaton::DFABuilder),
//! from an [`AutomatonSpec`](automaton::AutomatonSpec) (which is validated), or derived from other
//! automata, for example through the product construction in [`DFA::intersection`](automaton::DFA::intersection).
//!
//! Alphabets are ordered. The order in which the symbols of a [`CharAlphabet`](alphabet::CharAlphabet)
//! are declared is the order in which all enumerations in this crate (and the crates building upon it)
//! proceed, which makes every computation reproducible.
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use automata::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        alphabet::{CharAlphabet, Symbol},
        automaton::{
            build_automaton, AutomatonError, AutomatonSpec, DFABuilder, ProductIndex, StateId,
            DFA,
        },
        math,
        word::{words_of_length, words_up_to, Word},
        Show,
    };
}

/// This module contains some definitions of mathematical objects which are used throughout the crate and
/// do not really fit to the top level.
pub mod math;

/// Module that contains definitions for dealing with alphabets.
pub mod alphabet;
pub use alphabet::CharAlphabet;

/// Module that contains definitions for dealing with finite words and their enumeration.
pub mod word;

/// Defines deterministic finite automata, their construction and the product construction.
#[allow(clippy::upper_case_acronyms)]
pub mod automaton;
pub use automaton::DFA;

use itertools::Itertools;

/// Helper trait which can be used to display states, symbols, words and such.
pub trait Show {
    /// Returns a human readable representation of `self`, for a state index that should be
    /// for example q0, q1, q2, ... and for a word it is the concatenation of its symbols.
    /// This is mainly used for logging and debugging purposes.
    fn show(&self) -> String;
}

impl Show for usize {
    fn show(&self) -> String {
        self.to_string()
    }
}

impl Show for String {
    fn show(&self) -> String {
        self.clone()
    }
}

impl Show for char {
    fn show(&self) -> String {
        self.to_string()
    }
}

impl Show for bool {
    fn show(&self) -> String {
        match self {
            true => "+",
            false => "-",
        }
        .to_string()
    }
}

impl Show for [char] {
    fn show(&self) -> String {
        if self.is_empty() {
            return "ε".to_string();
        }
        self.iter().join("")
    }
}

impl Show for Vec<char> {
    fn show(&self) -> String {
        self.as_slice().show()
    }
}

impl<S: Show, T: Show> Show for (S, T) {
    fn show(&self) -> String {
        format!("({}, {})", self.0.show(), self.1.show())
    }
}

impl<S: Show + ?Sized> Show for &S {
    fn show(&self) -> String {
        S::show(*self)
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    /// Two states over `{a, b}`, `a` toggles between them and `b` is a self-loop. Only the
    /// state reached after an odd number of `a`s is accepting.
    pub fn toggle_dfa() -> DFA<usize> {
        DFA::builder()
            .with_edges([(0, 'a', 1), (0, 'b', 0), (1, 'a', 0), (1, 'b', 1)])
            .with_accepting([1])
            .into_dfa(0)
            .expect("toggle automaton is well formed")
    }

    #[test]
    fn show_words() {
        assert_eq!(Vec::<char>::new().show(), "ε");
        assert_eq!(vec!['a', 'b', 'a'].show(), "aba");
        assert_eq!((1usize, true).show(), "(1, +)");
    }

    #[test]
    fn toggle_acceptance() {
        let dfa = toggle_dfa();
        assert!(dfa.accepts("a".chars()));
        assert!(!dfa.accepts("aa".chars()));
        assert!(dfa.accepts("bab".chars()));
        assert!(!dfa.accepts("aba".chars()));
        assert!(!dfa.accepts("".chars()));
    }
}
