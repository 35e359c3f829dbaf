//! Precomputed pairwise distances.
//!
//! Provides a dense, symmetric distance table over every site of an instance.

mod table;

pub use table::DistanceTable;
