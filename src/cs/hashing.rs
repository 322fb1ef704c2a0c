//! Hash table implementations.

pub mod separate;
pub use separate::{ChainedHashMap, ChainedHashMapBuilder};
