//! # tanker-routing
//!
//! Multi-depot, multi-product fuel tanker routing: feasible instance
//! generation, a mixed-integer linear model with MTZ subtour elimination,
//! a solver boundary, and route decoding.
//!
//! ## Modules
//!
//! - [`geometry`] — Planar points and coordinate rounding
//! - [`distance`] — Precomputed distance table
//! - [`models`] — Domain types (Garage, Depot, DemandNode, Truck, Instance)
//! - [`generator`] — Seeded instance generator with difficulty presets
//! - [`milp`] — Variables, constraint families, model checking and LP export
//! - [`solver`] — Solver trait, limits and status; greedy constructive solver
//! - [`decoder`] — Route reconstruction with a bounded walk
//! - [`record`] — JSON records for instances and solutions
//! - [`pipeline`] — Build, solve, decode and record in one call
//! - [`error`] — Error types per stage

pub mod decoder;
pub mod distance;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod milp;
pub mod models;
pub mod pipeline;
pub mod record;
pub mod solver;
