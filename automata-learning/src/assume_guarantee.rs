use std::fmt::Display;

use automata::{
    automaton::{AutomatonError, StateId},
    prelude::*,
};
use tracing::{debug, info, warn};

use crate::active::{DFAOracle, LStar, LearningStrategy, Oracle, QueryCounts, StrategyKind};

/// Bounds for learning and for the checks that follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AgConfig {
    /// The maximal length of the words that the oracle inspects when answering an equivalence query.
    pub search_depth: usize,
    /// The maximal length of the words that fidelity and property checks enumerate.
    pub max_length: usize,
}

impl Default for AgConfig {
    fn default() -> Self {
        Self {
            search_depth: 6,
            max_length: 6,
        }
    }
}

/// A word on which two automata that were expected to agree disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mismatch {
    #[cfg_attr(feature = "serde", serde(with = "word_string"))]
    pub word: Word,
    /// The output of the reference, i.e. the component or the property.
    pub expected: bool,
    /// The output of the automaton under scrutiny.
    pub actual: bool,
}

impl Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "on {} expected {} but got {}",
            self.word.show(),
            self.expected,
            self.actual
        )
    }
}

#[cfg(feature = "serde")]
mod word_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(word: &[char], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&word.iter().collect::<String>())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<char>, D::Error> {
        Ok(String::deserialize(deserializer)?.chars().collect())
    }
}

/// The reason for which verification did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Failure {
    /// The assumption learned for the component with the given index does not agree with it.
    Fidelity { component: usize, mismatch: Mismatch },
    /// The property is not the conjunction of the components.
    Property(Mismatch),
    /// The intersection of all assumptions does not agree with the property.
    CombinedAssumption(Mismatch),
    /// There are no components, so there is nothing to combine.
    NoAssumptions,
}

impl Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Failure::Fidelity {
                component,
                mismatch,
            } => write!(f, "assumption for component {component} is unfaithful {mismatch}"),
            Failure::Property(mismatch) => write!(f, "property does not hold {mismatch}"),
            Failure::CombinedAssumption(mismatch) => {
                write!(f, "combined assumption disagrees with property {mismatch}")
            }
            Failure::NoAssumptions => write!(f, "no assumptions to combine"),
        }
    }
}

/// Summarises a verification run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Report {
    /// The number of hypotheses constructed over all components, plus one for each assumption that was
    /// post-processed after learning.
    pub iterations: usize,
    pub membership_queries: usize,
    pub equivalence_queries: usize,
    /// The size of the assumption learned last.
    pub hypothesis_size: usize,
    /// The number of counterexamples processed over all components.
    pub counterexamples: usize,
    pub property_holds: bool,
    pub failure: Option<Failure>,
}

/// Assume-guarantee reasoning over a collection of components, each given as a [`DFA`].
///
/// For every component an assumption is learned with [`LStar`] from a [`DFAOracle`] that wraps the
/// component. Each assumption has to agree with its component on all words up to
/// [`AgConfig::max_length`] (fidelity). Afterwards, the property is checked against the conjunction of the
/// components and finally against the intersection of all assumptions, again on all words up to the
/// maximal length.
///
/// All words are formed over the alphabet of the session, which is the union of the alphabets of the
/// components unless set with [`AssumeGuarantee::with_alphabet`]. The way in which assumptions are learned
/// is determined by a [`LearningStrategy`], plain L* is used by default.
pub struct AssumeGuarantee<Q: StateId = String> {
    components: Vec<DFA<Q>>,
    property: DFA<Q>,
    alphabet: CharAlphabet,
    config: AgConfig,
    strategy: Box<dyn LearningStrategy>,
    assumptions: Vec<DFA>,
    iterations: usize,
    queries: QueryCounts,
    hypothesis_size: usize,
    counterexamples: usize,
    property_holds: bool,
    failure: Option<Failure>,
}

impl AssumeGuarantee<String> {
    /// Builds the components and the property from their specifications.
    pub fn from_specs(
        components: &[AutomatonSpec],
        property: &AutomatonSpec,
        config: AgConfig,
    ) -> Result<Self, AutomatonError> {
        let components = components
            .iter()
            .map(build_automaton)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(components, build_automaton(property)?, config))
    }
}

impl<Q: StateId> AssumeGuarantee<Q> {
    pub fn new(components: Vec<DFA<Q>>, property: DFA<Q>, config: AgConfig) -> Self {
        let alphabet = components
            .iter()
            .fold(CharAlphabet::default(), |acc, c| acc.union(c.alphabet()));
        Self {
            components,
            property,
            alphabet,
            config,
            strategy: StrategyKind::default().build(),
            assumptions: vec![],
            iterations: 0,
            queries: QueryCounts::default(),
            hypothesis_size: 0,
            counterexamples: 0,
            property_holds: false,
            failure: None,
        }
    }

    pub fn with_alphabet(mut self, alphabet: CharAlphabet) -> Self {
        self.alphabet = alphabet;
        self
    }

    pub fn with_strategy(self, kind: StrategyKind) -> Self {
        self.with_boxed_strategy(kind.build())
    }

    pub fn with_boxed_strategy(mut self, strategy: Box<dyn LearningStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn alphabet(&self) -> &CharAlphabet {
        &self.alphabet
    }

    pub fn config(&self) -> &AgConfig {
        &self.config
    }

    pub fn assumptions(&self) -> &[DFA] {
        &self.assumptions
    }

    pub fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }

    fn reset(&mut self) {
        self.assumptions.clear();
        self.iterations = 0;
        self.queries = QueryCounts::default();
        self.hypothesis_size = 0;
        self.counterexamples = 0;
        self.property_holds = false;
        self.failure = None;
    }

    /// Learns one assumption per component and verifies its fidelity. Stops at the first component whose
    /// assumption is unfaithful and returns `false` in that case, the failure is then available through
    /// [`Self::failure`]. Calling this again starts over.
    pub fn learn_assumptions(&mut self) -> bool {
        self.reset();
        let start = std::time::Instant::now();
        info!(
            "learning assumptions for {} components over {} with {} strategy",
            self.components.len(),
            self.alphabet.show(),
            self.strategy.name()
        );

        for (index, component) in self.components.iter().enumerate() {
            let oracle = DFAOracle::new(
                component.restrict_alphabet(self.alphabet.clone()),
                self.config.search_depth,
            );
            let mut learner = LStar::with_alphabet(self.alphabet.clone(), oracle);
            let inference = learner.infer_with(self.strategy.as_mut());

            self.iterations += inference.iterations;
            self.queries += learner.oracle().queries();
            self.hypothesis_size = inference.hypothesis.size();
            self.counterexamples += inference.counterexamples.len();
            debug!(
                "learned assumption with {} states for component {index} after {} iterations ({:?})",
                inference.hypothesis.size(),
                inference.iterations,
                inference.outcome
            );

            if let Err(mismatch) = self.verify_fidelity(&inference.hypothesis, component) {
                warn!("assumption for component {index} is unfaithful {mismatch}");
                self.failure = Some(Failure::Fidelity {
                    component: index,
                    mismatch,
                });
                return false;
            }
            self.assumptions.push(inference.hypothesis);
        }

        if let Some(merged) = self.strategy.merge_assumptions(&self.assumptions) {
            for (index, (assumption, component)) in
                merged.iter().zip(&self.components).enumerate()
            {
                self.iterations += 1;
                if let Err(mismatch) = self.verify_fidelity(assumption, component) {
                    warn!("merged assumption for component {index} is unfaithful {mismatch}");
                    self.failure = Some(Failure::Fidelity {
                        component: index,
                        mismatch,
                    });
                    return false;
                }
            }
            self.assumptions = merged;
        }

        info!(
            "learned {} assumptions in {} iterations, took {}ms",
            self.assumptions.len(),
            self.iterations,
            start.elapsed().as_millis()
        );
        true
    }

    /// Compares `assumption` with `component` on all non-empty words up to the maximal length, in
    /// length-lexicographic order. The first disagreement is returned.
    pub fn verify_fidelity<P: StateId>(
        &self,
        assumption: &DFA,
        component: &DFA<P>,
    ) -> Result<(), Mismatch> {
        self.first_disagreement(|w| component.accepts(w), |w| assumption.accepts(w))
    }

    /// Checks that the property accepts precisely those words that all components accept.
    pub fn verify_system_property(&self) -> Result<(), Mismatch> {
        self.first_disagreement(
            |w| self.components.iter().all(|c| c.accepts(w)),
            |w| self.property.accepts(w),
        )
    }

    /// Intersects all learned assumptions from left to right. Returns `None` if there are none.
    pub fn combine_assumptions(&self) -> Option<DFA> {
        let mut assumptions = self.assumptions.iter();
        let first = assumptions.next()?.clone();
        Some(assumptions.fold(first, |combined, assumption| {
            combined.intersection(assumption).relabel()
        }))
    }

    /// Checks that the combined assumption agrees with the property.
    pub fn verify_combined(&self, combined: &DFA) -> Result<(), Mismatch> {
        self.first_disagreement(|w| self.property.accepts(w), |w| combined.accepts(w))
    }

    /// Learns the assumptions and checks the property against the components.
    pub fn verify(&mut self) -> bool {
        if !self.learn_assumptions() {
            return false;
        }
        match self.verify_system_property() {
            Ok(()) => {
                info!("system satisfies property under learned assumptions");
                true
            }
            Err(mismatch) => {
                info!("system does not satisfy property {mismatch}");
                self.failure = Some(Failure::Property(mismatch));
                false
            }
        }
    }

    /// Runs [`Self::verify`] and, if it succeeds, checks the property against the combined assumption.
    pub fn verify_with_combined_assumptions(&mut self) -> Report {
        let start = std::time::Instant::now();
        self.property_holds = self.verify() && self.check_combined();
        info!(
            "verification finished with property {}, took {}ms",
            if self.property_holds { "holding" } else { "violated" },
            start.elapsed().as_millis()
        );
        self.report()
    }

    fn check_combined(&mut self) -> bool {
        let Some(combined) = self.combine_assumptions() else {
            self.failure = Some(Failure::NoAssumptions);
            return false;
        };
        debug!("combined assumption has {} states", combined.size());
        match self.verify_combined(&combined) {
            Ok(()) => true,
            Err(mismatch) => {
                info!("combined assumption disagrees with property {mismatch}");
                self.failure = Some(Failure::CombinedAssumption(mismatch));
                false
            }
        }
    }

    /// Summarises the last run.
    pub fn report(&self) -> Report {
        Report {
            iterations: self.iterations,
            membership_queries: self.queries.membership,
            equivalence_queries: self.queries.equivalence,
            hypothesis_size: self.hypothesis_size,
            counterexamples: self.counterexamples,
            property_holds: self.property_holds,
            failure: self.failure.clone(),
        }
    }

    fn first_disagreement<E, A>(&self, expected: E, actual: A) -> Result<(), Mismatch>
    where
        E: Fn(&[char]) -> bool,
        A: Fn(&[char]) -> bool,
    {
        match words_up_to(&self.alphabet, self.config.max_length)
            .map(|word| {
                let (e, a) = (expected(&word), actual(&word));
                (word, e, a)
            })
            .find(|(_, e, a)| e != a)
        {
            Some((word, expected, actual)) => Err(Mismatch {
                word,
                expected,
                actual,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use automata::prelude::*;

    use super::{AgConfig, AssumeGuarantee, Failure, Mismatch};
    use crate::active::StrategyKind;

    fn parity(counted: char, other: char) -> DFA {
        DFA::builder()
            .with_edges([(0, counted, 1), (1, counted, 0), (0, other, 0), (1, other, 1)])
            .with_alphabet_symbols(['a', 'b'])
            .with_accepting([0])
            .into_dfa(0)
            .unwrap()
    }

    fn even_a() -> DFA {
        parity('a', 'b')
    }

    fn even_b() -> DFA {
        parity('b', 'a')
    }

    #[test_log::test]
    fn single_component_satisfies_itself() {
        let mut ag = AssumeGuarantee::new(vec![even_a()], even_a(), AgConfig::default());
        let report = ag.verify_with_combined_assumptions();
        assert!(report.property_holds);
        assert_eq!(report.failure, None);
        assert_eq!(report.hypothesis_size, 2);
        assert!(report.iterations >= 1);
        assert!(report.membership_queries > 0);
        assert_eq!(report.equivalence_queries, report.iterations);
    }

    #[test_log::test]
    fn mutated_property_is_violated() {
        let odd_a = DFA::builder()
            .with_edges([(0, 'a', 1), (1, 'a', 0), (0, 'b', 0), (1, 'b', 1)])
            .with_accepting([1])
            .into_dfa(0)
            .unwrap();
        let mut ag = AssumeGuarantee::new(vec![even_a()], odd_a, AgConfig::default());
        let report = ag.verify_with_combined_assumptions();
        assert!(!report.property_holds);
        assert_eq!(
            report.failure,
            Some(Failure::Property(Mismatch {
                word: vec!['a'],
                expected: false,
                actual: true
            }))
        );
    }

    #[test_log::test]
    fn learned_assumptions_are_faithful() {
        let mut ag = AssumeGuarantee::new(vec![even_a(), even_b()], even_a(), AgConfig::default());
        assert!(ag.learn_assumptions());
        assert_eq!(ag.assumptions().len(), 2);
        assert_eq!(ag.verify_fidelity(&ag.assumptions()[0], &even_a()), Ok(()));
        assert_eq!(ag.verify_fidelity(&ag.assumptions()[1], &even_b()), Ok(()));
        assert!(ag.verify_fidelity(&ag.assumptions()[0], &even_b()).is_err());
    }

    #[test_log::test]
    fn composition_of_two_components() {
        let property = even_a().intersection(&even_b()).relabel();
        let mut ag = AssumeGuarantee::new(vec![even_a(), even_b()], property, AgConfig::default());
        let report = ag.verify_with_combined_assumptions();
        assert!(report.property_holds, "{:?}", report.failure);
        assert_eq!(ag.combine_assumptions().map(|c| c.size()), Some(4));
    }

    #[test_log::test]
    fn shallow_search_is_unfaithful() {
        let aaaa = DFA::builder()
            .with_edges([(0, 'a', 1), (1, 'a', 2), (2, 'a', 3), (3, 'a', 4)])
            .with_accepting([4])
            .into_dfa(0)
            .unwrap();
        let config = AgConfig {
            search_depth: 3,
            max_length: 6,
        };
        let mut ag = AssumeGuarantee::new(vec![aaaa.clone()], aaaa, config);
        let report = ag.verify_with_combined_assumptions();
        assert!(!report.property_holds);
        assert_eq!(
            report.failure,
            Some(Failure::Fidelity {
                component: 0,
                mismatch: Mismatch {
                    word: vec!['a', 'a', 'a', 'a'],
                    expected: true,
                    actual: false
                }
            })
        );
    }

    #[test_log::test]
    fn merging_counts_extra_iterations() {
        let run = |kind| {
            let property = even_a().intersection(&even_b()).relabel();
            AssumeGuarantee::new(vec![even_a(), even_b()], property, AgConfig::default())
                .with_strategy(kind)
                .verify_with_combined_assumptions()
        };
        let baseline = run(StrategyKind::Baseline);
        let merging = run(StrategyKind::HypothesisMerging);
        assert!(merging.property_holds);
        assert_eq!(merging.iterations, baseline.iterations + 2);
        assert_eq!(merging.membership_queries, baseline.membership_queries);
    }

    #[test_log::test]
    fn minimised_alphabet_breaks_fidelity() {
        let mut ag = AssumeGuarantee::new(vec![even_a()], even_a(), AgConfig::default())
            .with_strategy(StrategyKind::AlphabetMinimisation);
        let report = ag.verify_with_combined_assumptions();
        assert!(!report.property_holds);
        assert_eq!(
            report.failure,
            Some(Failure::Fidelity {
                component: 0,
                mismatch: Mismatch {
                    word: vec!['b'],
                    expected: true,
                    actual: false
                }
            })
        );
    }

    #[test_log::test]
    fn every_strategy_verifies_parity() {
        for kind in ["baseline", "reuse", "selective=0.4", "adaptive", "merging"] {
            let kind: StrategyKind = kind.parse().unwrap();
            let property = even_a().intersection(&even_b()).relabel();
            let report = AssumeGuarantee::new(vec![even_a(), even_b()], property, AgConfig::default())
                .with_strategy(kind.with_seed(2))
                .verify_with_combined_assumptions();
            assert!(report.property_holds, "{kind} failed with {:?}", report.failure);
        }
    }

    #[test]
    fn no_components_no_assumptions() {
        let mut ag = AssumeGuarantee::new(vec![], even_a(), AgConfig::default())
            .with_alphabet(CharAlphabet::new(['a']));
        let report = ag.verify_with_combined_assumptions();
        assert!(!report.property_holds);
        assert!(matches!(report.failure, Some(Failure::Property(_))));

        let mut ag = AssumeGuarantee::new(vec![], even_a(), AgConfig::default());
        let report = ag.verify_with_combined_assumptions();
        assert_eq!(report.failure, Some(Failure::NoAssumptions));
    }

    #[test_log::test]
    fn from_specifications() {
        let spec = |accepting: &str| AutomatonSpec {
            states: vec!["even".into(), "odd".into()],
            alphabet: vec!["a".into(), "b".into()],
            start_state: "even".into(),
            accept_states: vec![accepting.into()],
            transitions: [
                ("even", [("a", "odd"), ("b", "even")]),
                ("odd", [("a", "even"), ("b", "odd")]),
            ]
            .into_iter()
            .map(|(q, edges)| {
                (
                    q.to_string(),
                    edges
                        .into_iter()
                        .map(|(a, p)| (a.to_string(), p.to_string()))
                        .collect::<BTreeMap<_, _>>(),
                )
            })
            .collect(),
        };

        let mut ag =
            AssumeGuarantee::from_specs(&[spec("even")], &spec("even"), AgConfig::default())
                .unwrap();
        assert!(ag.verify_with_combined_assumptions().property_holds);

        let mut dangling = spec("even");
        dangling.start_state = "nowhere".into();
        assert!(AssumeGuarantee::from_specs(&[dangling], &spec("even"), AgConfig::default()).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn report_serializes_words_as_strings() {
        let mut ag = AssumeGuarantee::new(vec![even_a()], even_b(), AgConfig::default());
        let report = ag.verify_with_combined_assumptions();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["property_holds"], false);
        assert_eq!(json["failure"]["kind"], "property");
        assert_eq!(json["failure"]["word"], "a");
        assert_eq!(json["failure"]["expected"], false);
        assert_eq!(json["failure"]["actual"], true);
    }
}
