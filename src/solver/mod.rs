//! Solver boundary.
//!
//! A [`Solver`] turns a [`RoutingModel`](crate::milp::RoutingModel) into a
//! [`SolveOutcome`] within [`SolveLimits`]. External MILP solvers plug in
//! through this trait (feeding the LP export and reading values back with
//! [`Assignment::from_named_values`](crate::milp::Assignment::from_named_values));
//! [`GreedySolver`] is a built-in constructive fallback, built on
//! [`first_fit_decreasing`] packing.

mod greedy;
mod outcome;
mod packing;

pub use greedy::GreedySolver;
pub use packing::{first_fit_decreasing, PackedBin};
pub use outcome::{SolveLimits, SolveOutcome, SolveStatus, Solver};
