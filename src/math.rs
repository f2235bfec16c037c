/// Type alias for sets, we use this to hide which type of `HashSet` we are actually using.
pub type Set<S> = fxhash::FxHashSet<S>;
/// Type alias for maps, we use this to hide which type of `HashMap` we are actually using.
pub type Map<K, V> = fxhash::FxHashMap<K, V>;

/// Type alias for ordered sets. These are used wherever iteration order has to be reproducible,
/// for example for the states of an automaton.
pub type OrderedSet<S> = std::collections::BTreeSet<S>;
