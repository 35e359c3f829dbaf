//! Mixed-integer linear model of the tanker routing problem.
//!
//! - [`VariableLayout`] — typed keys ([`VarKey`]) mapped to dense [`VarId`]s
//! - [`RoutingModel`] — objective, bounds and the fifteen
//!   [`ConstraintFamily`] groups built from an [`Instance`](crate::models::Instance)
//! - [`Assignment`] — solver output, checked with [`RoutingModel::check`]
//!
//! The model can also be exported in CPLEX LP format with
//! [`RoutingModel::write_lp`].

mod assignment;
mod builder;
mod constraint;
mod expr;
mod lp_format;
mod model;
mod variables;

pub use assignment::{Assignment, BINARY_THRESHOLD};
pub use constraint::{Constraint, ConstraintFamily, Sense};
pub use expr::LinearExpr;
pub use model::{ModelViolation, RoutingModel, FEASIBILITY_TOLERANCE};
pub use variables::{VarBounds, VarId, VarKey, VarKind, VariableLayout};
