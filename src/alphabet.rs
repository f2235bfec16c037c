use itertools::Itertools;

use crate::Show;

/// A symbol is a single character. Words are sequences of symbols, see [`crate::word`].
pub type Symbol = char;

/// An ordered alphabet of [`Symbol`]s.
///
/// The order in which symbols are given upon creation is preserved (duplicates are dropped), and it
/// determines the order in which every enumeration over the alphabet proceeds. In particular, words of
/// equal length are always produced in lexicographic order with respect to this declaration order.
#[derive(Clone, Hash, PartialEq, Eq, Debug, PartialOrd, Ord, Default)]
pub struct CharAlphabet(pub(crate) Vec<char>);

/// Helper macro for creating a [`CharAlphabet`] alphabet. Is called simply with a list of symbols
/// that are separated by commata.
///
/// # Examples
/// ```
/// use automata::prelude::*;
/// let alphabet = automata::alphabet!(simple 'a', 'b', 'c');
/// assert_eq!(alphabet.size(), 3);
/// ```
#[macro_export]
macro_rules! alphabet {
    (simple $($c:literal),*) => {
        $crate::prelude::CharAlphabet::new(vec![$($c),*])
    };
}

impl CharAlphabet {
    /// Creates a new [`CharAlphabet`] alphabet from an iterator over the symbols, keeping the first
    /// occurrence of every symbol.
    pub fn new<I>(symbols: I) -> Self
    where
        I: IntoIterator<Item = char>,
    {
        Self(symbols.into_iter().unique().collect())
    }

    /// Returns an iterator over all symbols in declaration order.
    pub fn universe(&self) -> std::iter::Copied<std::slice::Iter<'_, char>> {
        self.0.iter().copied()
    }

    /// Returns true if the given symbol is present in the alphabet.
    pub fn contains(&self, symbol: char) -> bool {
        self.0.contains(&symbol)
    }

    /// Returns the number of symbols in the alphabet.
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the alphabet has no symbols.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the symbols that `self` shares with `other`, in the order of `self`.
    pub fn intersection(&self, other: &CharAlphabet) -> CharAlphabet {
        Self(
            self.universe()
                .filter(|sym| other.contains(*sym))
                .collect(),
        )
    }

    /// Returns the symbols of `self` followed by those symbols of `other` that do not appear in `self`.
    pub fn union(&self, other: &CharAlphabet) -> CharAlphabet {
        Self::new(self.universe().chain(other.universe()))
    }

    /// Returns a new alphabet that only contains the symbols of `self` for which `keep` returns true.
    pub fn restrict<F: FnMut(char) -> bool>(&self, mut keep: F) -> CharAlphabet {
        Self(self.universe().filter(|sym| keep(*sym)).collect())
    }
}

impl From<Vec<char>> for CharAlphabet {
    fn from(value: Vec<char>) -> Self {
        Self::new(value)
    }
}

impl FromIterator<char> for CharAlphabet {
    fn from_iter<T: IntoIterator<Item = char>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl Show for CharAlphabet {
    fn show(&self) -> String {
        format!("{{{}}}", self.0.iter().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::CharAlphabet;
    use crate::Show;

    #[test]
    fn declaration_order_is_kept() {
        let alphabet = CharAlphabet::new(['c', 'a', 'c', 'b']);
        assert_eq!(alphabet.universe().collect::<Vec<_>>(), vec!['c', 'a', 'b']);
        assert_eq!(alphabet.show(), "{c, a, b}");
    }

    #[test]
    fn restriction_keeps_order() {
        let alphabet: CharAlphabet = "abcd".chars().collect();
        let restricted = alphabet.restrict(|sym| sym != 'b');
        assert_eq!(restricted.universe().collect::<Vec<_>>(), vec!['a', 'c', 'd']);
        assert!(!restricted.contains('b'));
        assert!(alphabet.restrict(|_| false).is_empty());
    }

    #[test]
    fn shared_symbols() {
        let left = crate::alphabet!(simple 'a', 'b', 'c');
        let right = crate::alphabet!(simple 'c', 'a', 'd');
        assert_eq!(left.intersection(&right), crate::alphabet!(simple 'a', 'c'));
        assert_eq!(
            left.union(&right),
            crate::alphabet!(simple 'a', 'b', 'c', 'd')
        );
    }
}
