use std::fmt::Debug;

use automata::{
    prelude::*,
    word::{concat, prefixes},
};
use bimap::BiBTreeMap;
use owo_colors::OwoColorize;
use tracing::trace;

/// A suffix that is appended to the words of the table to distinguish them. The empty experiment is
/// always present and comes first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Experiment(pub(crate) Vec<char>);

impl Experiment {
    /// The empty experiment, whose column records whether the row word itself is accepted.
    pub fn empty() -> Self {
        Self(vec![])
    }

    pub fn symbols(&self) -> &[char] {
        &self.0
    }
}

impl From<Vec<char>> for Experiment {
    fn from(value: Vec<char>) -> Self {
        Self(value)
    }
}

impl Show for Experiment {
    fn show(&self) -> String {
        self.0.show()
    }
}

/// The observed outputs for one word, one entry per experiment in the order of the experiments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutputRow(pub(crate) Vec<bool>);

impl From<Vec<bool>> for OutputRow {
    fn from(value: Vec<bool>) -> Self {
        Self(value)
    }
}

/// Witnesses that a table is not consistent: `left` and `right` have the same row, but not after
/// appending `symbol` to both. The `experiment` to add is `symbol` itself while that is not yet an
/// experiment. Otherwise it is `symbol` followed by the first experiment on which the extended rows
/// differ, which is never present already and tells `left` and `right` apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inconsistency {
    pub left: Word,
    pub right: Word,
    pub symbol: char,
    pub experiment: Experiment,
}

/// The observation table of L*. It consists of the base `S` (access words, seeded with the empty word),
/// the experiments `E` (seeded with the empty experiment) and the outputs `T`, which map a word from
/// `S ∪ S·Σ` together with an experiment to the result of the membership query for their concatenation.
///
/// The table only ever grows: words and experiments are appended if they are not yet present and cells
/// are filled if they are absent. A cell that has been filled is never queried or overwritten again.
pub struct ObservationTable {
    alphabet: CharAlphabet,
    base: Vec<Word>,
    experiments: Vec<Experiment>,
    outputs: math::Map<(Word, Experiment), bool>,
}

impl ObservationTable {
    /// Creates a table with `S = [ε]`, `E = [ε]` and no outputs.
    pub fn new(alphabet: CharAlphabet) -> Self {
        Self {
            alphabet,
            base: vec![vec![]],
            experiments: vec![Experiment::empty()],
            outputs: math::Map::default(),
        }
    }

    pub fn alphabet(&self) -> &CharAlphabet {
        &self.alphabet
    }

    pub fn base(&self) -> &[Word] {
        &self.base
    }

    pub fn experiments(&self) -> &[Experiment] {
        &self.experiments
    }

    /// Returns the number of cells that have been filled so far.
    pub fn filled(&self) -> usize {
        self.outputs.len()
    }

    /// Looks up a cell, `None` means that it has not been filled (yet).
    pub fn cell(&self, word: &[char], experiment: &Experiment) -> Option<bool> {
        self.outputs
            .get(&(word.to_vec(), experiment.clone()))
            .copied()
    }

    /// Returns all words whose rows the table tracks: first the base `S`, then for each word of the base
    /// (in order) its one letter extensions (in alphabet order).
    pub fn row_words(&self) -> Vec<Word> {
        self.base
            .iter()
            .cloned()
            .chain(self.base.iter().flat_map(|s| {
                self.alphabet
                    .universe()
                    .map(move |a| concat(s, &[a]))
            }))
            .collect()
    }

    /// Fills every absent cell by posing a membership query for the concatenation of row word and
    /// experiment. Returns the number of queries posed.
    pub fn fill<M>(&mut self, membership: M) -> usize
    where
        M: FnMut(&[char]) -> bool,
    {
        self.fill_with(membership, |_| true)
    }

    /// Like [`Self::fill`], but consults `admit` before every query. If it returns `false`, the query is
    /// not posed and the cell remains absent, so a later pass will try to fill it again.
    pub fn fill_with<M, F>(&mut self, mut membership: M, mut admit: F) -> usize
    where
        M: FnMut(&[char]) -> bool,
        F: FnMut(&[char]) -> bool,
    {
        let mut queried = 0;
        for word in self.row_words() {
            for i in 0..self.experiments.len() {
                let key = (word.clone(), self.experiments[i].clone());
                if self.outputs.contains_key(&key) {
                    continue;
                }
                let query = concat(&word, self.experiments[i].symbols());
                if !admit(&query) {
                    trace!("query {} deferred", query.show());
                    continue;
                }
                let output = membership(&query);
                trace!("query {} answered with {}", query.show(), output.show());
                self.outputs.insert(key, output);
                queried += 1;
            }
        }
        queried
    }

    /// Computes the row of `word`: the outputs for every experiment, in order. Absent cells count as `false`.
    pub fn row(&self, word: &[char]) -> OutputRow {
        let word = word.to_vec();
        self.experiments
            .iter()
            .map(|e| {
                self.outputs
                    .get(&(word.clone(), e.clone()))
                    .copied()
                    .unwrap_or(false)
            })
            .collect::<Vec<_>>()
            .into()
    }

    /// Searches for a one letter extension `s·a` of a base word whose row differs from the rows of all base
    /// words. Base words are considered in order and for each of them the symbols in alphabet order.
    pub fn find_unclosed(&self) -> Option<Word> {
        let known: math::Set<OutputRow> = self.base.iter().map(|s| self.row(s)).collect();
        self.base
            .iter()
            .flat_map(|s| self.alphabet.universe().map(move |a| concat(s, &[a])))
            .find(|ext| !known.contains(&self.row(ext)))
    }

    pub fn is_closed(&self) -> bool {
        self.find_unclosed().is_none()
    }

    /// Searches for two distinct base words with the same row and a symbol, such that the rows of the
    /// extensions by that symbol differ. Pairs are considered in the order of the base, the symbols in
    /// alphabet order.
    pub fn find_inconsistency(&self) -> Option<Inconsistency> {
        for left in &self.base {
            let left_row = self.row(left);
            for right in &self.base {
                if left == right || self.row(right) != left_row {
                    continue;
                }
                for symbol in self.alphabet.universe() {
                    let l = self.row(&concat(left, &[symbol]));
                    let r = self.row(&concat(right, &[symbol]));
                    if l == r {
                        continue;
                    }
                    let Some(position) = l.0.iter().zip(&r.0).position(|(x, y)| x != y) else {
                        continue;
                    };
                    let single = Experiment(vec![symbol]);
                    let experiment = if self.experiments.contains(&single) {
                        Experiment(concat(&[symbol], self.experiments[position].symbols()))
                    } else {
                        single
                    };
                    return Some(Inconsistency {
                        left: left.clone(),
                        right: right.clone(),
                        symbol,
                        experiment,
                    });
                }
            }
        }
        None
    }

    pub fn is_consistent(&self) -> bool {
        self.find_inconsistency().is_none()
    }

    /// Appends `word` to the base unless it is already present. Returns whether it was added.
    pub fn add_base(&mut self, word: Word) -> bool {
        if self.base.contains(&word) {
            return false;
        }
        trace!("adding {} to base", word.show());
        self.base.push(word);
        true
    }

    /// Appends `experiment` unless it is already present. Returns whether it was added.
    pub fn add_experiment(&mut self, experiment: Experiment) -> bool {
        if self.experiments.contains(&experiment) {
            return false;
        }
        trace!("adding experiment {}", experiment.show());
        self.experiments.push(experiment);
        true
    }

    /// Adds every non-empty prefix of `counterexample` to the base, skipping those that are already
    /// present. Returns the prefixes that were added.
    pub fn add_counterexample(&mut self, counterexample: &[char]) -> Vec<Word> {
        prefixes(counterexample)
            .filter(|prefix| self.add_base(prefix.clone()))
            .collect()
    }

    /// Constructs a hypothesis from the table. Every distinct row among the base words becomes a state
    /// (numbered in the order in which the rows are first seen), the initial state is the one of the empty
    /// word and a state is accepting if the cell for the empty experiment is `true`. A transition from the
    /// state of `s` on `a` is only inserted if the row of `s·a` is the row of some state, so for a table that
    /// is not closed the result may lack transitions.
    pub fn hypothesis(&self) -> DFA {
        let mut states: BiBTreeMap<OutputRow, usize> = BiBTreeMap::new();
        for s in &self.base {
            let row = self.row(s);
            if !states.contains_left(&row) {
                let id = states.len();
                states.insert(row, id);
            }
        }

        let state_of = |word: &[char]| states.get_by_left(&self.row(word)).copied();
        let initial = state_of(&[][..]).expect("the empty word is always part of the base");

        let accepting = self
            .base
            .iter()
            .filter(|s| self.cell(s, &Experiment::empty()).unwrap_or(false))
            .filter_map(|s| state_of(s.as_slice()))
            .collect::<Vec<_>>();

        let mut transitions = vec![];
        for s in &self.base {
            let Some(source) = state_of(s.as_slice()) else {
                continue;
            };
            for a in self.alphabet.universe() {
                if let Some(target) = state_of(concat(s, &[a]).as_slice()) {
                    transitions.push(((source, a), target));
                }
            }
        }

        for id in 0..states.len() {
            if let Some(row) = states.get_by_right(&id) {
                trace!("state {id} has row {}", row.0.iter().map(Show::show).collect::<String>());
            }
        }

        DFA::from_parts(
            0..states.len(),
            self.alphabet.clone(),
            transitions,
            initial,
            accepting,
        )
        .expect("hypothesis only references its own states and symbols")
    }
}

impl Debug for ObservationTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut builder = tabled::builder::Builder::default();
        let mut header = vec!["S/E".to_string()];
        for e in &self.experiments {
            header.push(e.show());
        }
        builder.push_record(header);

        let base_len = self.base.len();
        for (i, word) in self.row_words().into_iter().enumerate() {
            let mut record = if i < base_len {
                vec![word.show().blue().to_string()]
            } else {
                vec![word.show()]
            };
            for e in &self.experiments {
                record.push(
                    self.cell(&word, e)
                        .map(|b| b.show())
                        .unwrap_or_else(|| "?".to_string()),
                );
            }
            builder.push_record(record);
        }

        write!(f, "{}", builder.build())
    }
}

#[cfg(test)]
mod tests {
    use automata::{prelude::*, word::words_up_to};

    use super::{Experiment, ObservationTable};
    use crate::active::tests::toggle;

    #[test_log::test]
    fn fill_never_requeries() {
        let target = toggle();
        let mut table = ObservationTable::new(target.alphabet().clone());
        let mut queries = 0;
        let mut membership = |w: &[char]| {
            queries += 1;
            target.accepts(w)
        };
        assert_eq!(table.fill(&mut membership), 3);
        assert_eq!(table.fill(&mut membership), 0);
        assert_eq!(queries, 3);
        assert_eq!(table.cell(&['a'], &Experiment::empty()), Some(true));
        assert_eq!(table.cell(&['a', 'a'], &Experiment::empty()), None);
    }

    #[test]
    fn deferred_cells_default_to_false() {
        let target = toggle();
        let mut table = ObservationTable::new(target.alphabet().clone());
        let filled = table.fill_with(|w| target.accepts(w), |w| w.is_empty());
        assert_eq!(filled, 1);
        assert_eq!(table.row(&['a']).0, vec![false]);
        assert_eq!(table.fill(|w| target.accepts(w)), 2);
        assert_eq!(table.row(&['a']).0, vec![true]);
    }

    #[test_log::test]
    fn closed_and_consistent_fixpoint() {
        let target = toggle();
        let mut table = ObservationTable::new(target.alphabet().clone());
        table.fill(|w| target.accepts(w));

        assert_eq!(table.find_unclosed(), Some(vec!['a']));
        let mut extensions = 0;
        loop {
            if let Some(ext) = table.find_unclosed() {
                table.add_base(ext);
            } else if let Some(inconsistency) = table.find_inconsistency() {
                table.add_experiment(inconsistency.experiment);
            } else {
                break;
            }
            table.fill(|w| target.accepts(w));
            extensions += 1;
            assert!(extensions < 10, "table did not stabilise:\n{table:?}");
        }
        assert_eq!(extensions, 1);
        assert!(table.is_closed() && table.is_consistent());

        let hypothesis = table.hypothesis();
        assert_eq!(hypothesis.size(), 2);
        assert_eq!(hypothesis.accepts("".chars()), target.accepts("".chars()));
        for word in words_up_to(target.alphabet(), 4) {
            assert_eq!(hypothesis.accepts(&word), target.accepts(&word));
        }
    }

    #[test]
    fn inconsistency_yields_distinguishing_experiment() {
        // accepts exactly the word "ab"
        let target = DFA::builder()
            .with_edges([(0, 'a', 1), (1, 'b', 2)])
            .with_alphabet_symbols(['a', 'b'])
            .with_accepting([2])
            .into_dfa(0)
            .unwrap();
        let mut table = ObservationTable::new(target.alphabet().clone());
        table.add_base(vec!['a']);
        table.fill(|w| target.accepts(w));

        let inconsistency = table.find_inconsistency().unwrap();
        assert_eq!(inconsistency.left, Vec::<char>::new());
        assert_eq!(inconsistency.right, vec!['a']);
        assert_eq!(inconsistency.symbol, 'b');
        assert_eq!(inconsistency.experiment, Experiment(vec!['b']));

        assert!(table.add_experiment(inconsistency.experiment.clone()));
        assert!(!table.add_experiment(inconsistency.experiment));
        table.fill(|w| target.accepts(w));
        assert!(table.is_consistent());
    }

    #[test]
    fn inconsistency_prefers_single_symbol_then_extends() {
        // accepts exactly the word "aab"
        let target = DFA::builder()
            .with_edges([(0, 'a', 1), (1, 'a', 2), (2, 'b', 3)])
            .with_alphabet_symbols(['a', 'b'])
            .with_accepting([3])
            .into_dfa(0)
            .unwrap();
        let mut table = ObservationTable::new(target.alphabet().clone());
        table.add_base(vec!['b']);
        table.add_base(vec!['a']);
        table.add_experiment(Experiment(vec!['b']));
        table.fill(|w| target.accepts(w));

        let first = table.find_inconsistency().unwrap();
        assert_eq!(first.left, Vec::<char>::new());
        assert_eq!(first.right, vec!['a']);
        assert_eq!(first.symbol, 'a');
        assert_eq!(first.experiment, Experiment(vec!['a']));
        assert!(table.add_experiment(first.experiment));
        table.fill(|w| target.accepts(w));

        // the column of "a" does not separate ε from "a", so the experiment is extended
        let second = table.find_inconsistency().unwrap();
        assert_eq!(second.symbol, 'a');
        assert_eq!(second.experiment, Experiment(vec!['a', 'b']));
        assert!(table.add_experiment(second.experiment));
        table.fill(|w| target.accepts(w));
        assert_ne!(table.row(&[]), table.row(&['a']));
    }

    #[test]
    fn counterexample_prefixes_are_added_once() {
        let mut table = ObservationTable::new(crate::active::tests::toggle().alphabet().clone());
        table.add_base(vec!['a']);
        let added = table.add_counterexample(&['a', 'b', 'a']);
        assert_eq!(added, vec![vec!['a', 'b'], vec!['a', 'b', 'a']]);
        assert_eq!(table.base().len(), 4);
        assert!(table.add_counterexample(&['a', 'b']).is_empty());
    }

    #[test]
    fn unclosed_table_yields_partial_hypothesis() {
        let target = toggle();
        let mut table = ObservationTable::new(target.alphabet().clone());
        table.fill(|w| target.accepts(w));
        let hypothesis = table.hypothesis();
        assert_eq!(hypothesis.size(), 1);
        // the row of "a" is not known, so there is no transition on it
        assert!(hypothesis.successor(&0, 'a').is_none());
        assert_eq!(hypothesis.successor(&0, 'b'), Some(&0));
    }
}
