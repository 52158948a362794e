//! Aliases for the hash-map type used throughout this crate.

pub use hashbrown::hash_map::Entry;

/// A hash-map based on [`hashbrown::HashMap`].
pub type HashMap<K, V> = hashbrown::HashMap<K, V>;
