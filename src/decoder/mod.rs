//! Solution decoding.
//!
//! Turns an [`Assignment`](crate::milp::Assignment) back into ordered
//! per-truck routes with a bounded walk. Trucks whose arcs do not close are
//! reported as [`Anomaly`] values instead of aborting the decode.

mod decode;
mod route;

pub use decode::{decode, DecodedSolution};
pub use route::{Anomaly, AnomalyReason, DecodedRoute, FleetMetrics, TruckOutcome};
