//! Domain model types for fuel tanker routing.
//!
//! Provides the core abstractions: garages, depots with per-product stock,
//! product-specific demand nodes, trucks with a home garage, and the
//! instance that ties them to a precomputed distance table.

mod instance;
mod product;
mod site;
mod truck;

pub use instance::{Difficulty, Instance, InstanceMeta};
pub use product::Product;
pub use site::{DemandNode, Depot, Garage, NodeKind};
pub use truck::Truck;
