//! Aliases for the hash-set type used throughout this crate.

/// A hash-set based on [`hashbrown::HashSet`].
pub type HashSet<K> = hashbrown::HashSet<K>;
