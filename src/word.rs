use itertools::{Either, Itertools};

use crate::alphabet::CharAlphabet;

/// A finite word is simply a sequence of symbols, the empty word is represented by the empty vector.
pub type Word = Vec<char>;

/// Returns an iterator over all words of exactly `length` symbols over `alphabet`, in lexicographic order
/// with respect to the declaration order of the alphabet. For `length == 0` this yields just the empty word.
pub fn words_of_length(alphabet: &CharAlphabet, length: usize) -> impl Iterator<Item = Word> + '_ {
    if length == 0 {
        Either::Left(std::iter::once(vec![]))
    } else {
        Either::Right(
            std::iter::repeat(alphabet.universe())
                .take(length)
                .multi_cartesian_product(),
        )
    }
}

/// Enumerates all **non-empty** words over `alphabet` whose length is at most `max_length`. Words are
/// produced in length-lexicographic order, i.e. first by increasing length and words of equal length in
/// lexicographic order. The empty word is not part of the enumeration.
///
/// ```
/// use automata::prelude::*;
/// let alphabet = automata::alphabet!(simple 'a', 'b');
/// let words: Vec<String> = words_up_to(&alphabet, 2)
///     .map(|w| w.into_iter().collect())
///     .collect();
/// assert_eq!(words, vec!["a", "b", "aa", "ab", "ba", "bb"]);
/// ```
pub fn words_up_to(alphabet: &CharAlphabet, max_length: usize) -> impl Iterator<Item = Word> + '_ {
    (1..=max_length).flat_map(move |length| words_of_length(alphabet, length))
}

/// Returns all non-empty prefixes of `word`, shortest first.
pub fn prefixes(word: &[char]) -> impl Iterator<Item = Word> + '_ {
    (1..=word.len()).map(move |i| word[..i].to_vec())
}

/// Concatenates the two given words into a new one.
pub fn concat(left: &[char], right: &[char]) -> Word {
    left.iter().chain(right.iter()).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumeration_order() {
        let alphabet = crate::alphabet!(simple 'b', 'a');
        let words = words_up_to(&alphabet, 2).collect_vec();
        assert_eq!(
            words,
            vec![
                vec!['b'],
                vec!['a'],
                vec!['b', 'b'],
                vec!['b', 'a'],
                vec!['a', 'b'],
                vec!['a', 'a']
            ]
        );
        assert_eq!(words_up_to(&alphabet, 5).count(), 2 + 4 + 8 + 16 + 32);
    }

    #[test]
    fn empty_word_only_of_length_zero() {
        let alphabet = crate::alphabet!(simple 'a');
        assert_eq!(words_of_length(&alphabet, 0).collect_vec(), vec![vec![]]);
        assert_eq!(words_up_to(&alphabet, 0).count(), 0);
        assert_eq!(words_up_to(&CharAlphabet::default(), 3).count(), 0);
    }

    #[test]
    fn prefixes_and_concatenation() {
        let word = vec!['a', 'b', 'c'];
        assert_eq!(
            prefixes(&word).collect_vec(),
            vec![vec!['a'], vec!['a', 'b'], vec!['a', 'b', 'c']]
        );
        assert_eq!(prefixes(&[]).count(), 0);
        assert_eq!(concat(&['a'], &['b', 'c']), word);
    }
}
