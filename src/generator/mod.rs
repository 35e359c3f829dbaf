//! Feasible instance generation.
//!
//! - [`GeneratorConfig`] — site counts, demand range, fleet and stock margins
//! - [`InstanceGenerator`] — seeded construction; closed-form stock and
//!   fleet sized from single-product truck loads

mod config;
mod instance_generator;

pub use config::GeneratorConfig;
pub use instance_generator::InstanceGenerator;
