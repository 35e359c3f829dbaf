//! Named linear constraints grouped into families.

use std::fmt;

use super::{Assignment, LinearExpr};

/// Relation between a constraint's left-hand side and its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    /// `lhs <= rhs`
    LessEq,
    /// `lhs == rhs`
    Equal,
}

impl Sense {
    /// Operator as written in LP files.
    pub fn symbol(self) -> &'static str {
        match self {
            Sense::LessEq => "<=",
            Sense::Equal => "=",
        }
    }
}

/// The fifteen constraint families of the routing model, in build order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConstraintFamily {
    NoSelfLoop,
    GarageEgress,
    FlowConservation,
    GarageReturn,
    SingleDepot,
    DepotRouting,
    SingleProduct,
    ProductCompatibility,
    NoDirectGarageToStation,
    DepotRequiresEgress,
    DemandCoverage,
    Capacity,
    SubtourElimination,
    StockCeiling,
    LoadConservation,
}

impl ConstraintFamily {
    /// Every family, in build order.
    pub const ALL: [ConstraintFamily; 15] = [
        ConstraintFamily::NoSelfLoop,
        ConstraintFamily::GarageEgress,
        ConstraintFamily::FlowConservation,
        ConstraintFamily::GarageReturn,
        ConstraintFamily::SingleDepot,
        ConstraintFamily::DepotRouting,
        ConstraintFamily::SingleProduct,
        ConstraintFamily::ProductCompatibility,
        ConstraintFamily::NoDirectGarageToStation,
        ConstraintFamily::DepotRequiresEgress,
        ConstraintFamily::DemandCoverage,
        ConstraintFamily::Capacity,
        ConstraintFamily::SubtourElimination,
        ConstraintFamily::StockCeiling,
        ConstraintFamily::LoadConservation,
    ];

    /// 1-based family number.
    pub fn number(self) -> usize {
        self as usize + 1
    }

    /// Short snake_case label.
    pub fn label(self) -> &'static str {
        match self {
            ConstraintFamily::NoSelfLoop => "no_self_loop",
            ConstraintFamily::GarageEgress => "garage_egress",
            ConstraintFamily::FlowConservation => "flow_conservation",
            ConstraintFamily::GarageReturn => "garage_return",
            ConstraintFamily::SingleDepot => "single_depot",
            ConstraintFamily::DepotRouting => "depot_routing",
            ConstraintFamily::SingleProduct => "single_product",
            ConstraintFamily::ProductCompatibility => "product_compatibility",
            ConstraintFamily::NoDirectGarageToStation => "no_direct_garage_to_station",
            ConstraintFamily::DepotRequiresEgress => "depot_requires_egress",
            ConstraintFamily::DemandCoverage => "demand_coverage",
            ConstraintFamily::Capacity => "capacity",
            ConstraintFamily::SubtourElimination => "subtour_elimination",
            ConstraintFamily::StockCeiling => "stock_ceiling",
            ConstraintFamily::LoadConservation => "load_conservation",
        }
    }
}

impl fmt::Display for ConstraintFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) {}", self.number(), self.label())
    }
}

/// A named linear constraint `expr (sense) rhs`.
///
/// Every variable sits on the left-hand side; the right-hand side is a
/// constant.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    name: String,
    family: ConstraintFamily,
    expr: LinearExpr,
    sense: Sense,
    rhs: f64,
}

impl Constraint {
    /// Creates a constraint.
    pub fn new(
        name: impl Into<String>,
        family: ConstraintFamily,
        expr: LinearExpr,
        sense: Sense,
        rhs: f64,
    ) -> Self {
        Self {
            name: name.into(),
            family,
            expr,
            sense,
            rhs,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn family(&self) -> ConstraintFamily {
        self.family
    }

    pub fn expr(&self) -> &LinearExpr {
        &self.expr
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    /// Returns `true` if the assignment satisfies the constraint up to `tol`.
    pub fn is_satisfied_by(&self, assignment: &Assignment, tol: f64) -> bool {
        let lhs = self.expr.evaluate(assignment);
        match self.sense {
            Sense::LessEq => lhs <= self.rhs + tol,
            Sense::Equal => (lhs - self.rhs).abs() <= tol,
        }
    }
}
