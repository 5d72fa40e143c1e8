//! Default set and map implementations used throughout the crate.

/// Alias for the default (hash) set implementation.
pub type Set<S> = fxhash::FxHashSet<S>;

/// Alias for the default (hash) map implementation.
pub type Map<K, V> = fxhash::FxHashMap<K, V>;
