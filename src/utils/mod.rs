//! Various unsorted geometrical and logical operators.

pub use self::sorted_pair::SortedPair;

pub mod hashmap;
pub mod hashset;
mod sorted_pair;
