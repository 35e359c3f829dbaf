//! The assembled routing model.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::error::ModelError;
use crate::models::Instance;

use super::builder::ModelBuilder;
use super::{
    Assignment, Constraint, ConstraintFamily, LinearExpr, Sense, VarBounds, VarId, VarKey, VarKind,
    VariableLayout,
};

/// Absolute tolerance used by [`RoutingModel::check`].
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// One way an assignment fails the model.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelViolation {
    /// A linear constraint does not hold.
    Constraint {
        name: String,
        family: ConstraintFamily,
        lhs: f64,
        sense: Sense,
        rhs: f64,
    },
    /// A variable lies outside its bounds.
    Bound {
        variable: String,
        value: f64,
        lower: f64,
        upper: f64,
    },
    /// A binary variable is fractional.
    Integrality { variable: String, value: f64 },
}

impl ModelViolation {
    /// Family of a violated constraint; `None` for bound and integrality
    /// violations.
    pub fn family(&self) -> Option<ConstraintFamily> {
        match self {
            ModelViolation::Constraint { family, .. } => Some(*family),
            _ => None,
        }
    }
}

/// A mixed-integer linear program for one instance.
///
/// Variables, bounds, objective and constraints are fixed at build time.
/// Node and truck ids are kept so variables and constraints can be named
/// without the instance.
///
/// # Examples
///
/// ```
/// use tanker_routing::generator::{GeneratorConfig, InstanceGenerator};
/// use tanker_routing::milp::{ConstraintFamily, RoutingModel};
///
/// let instance = InstanceGenerator::new(GeneratorConfig::easy())
///     .unwrap()
///     .generate(7)
///     .unwrap();
/// let model = RoutingModel::build(&instance).unwrap();
/// let counts = model.family_counts();
/// assert_eq!(counts[&ConstraintFamily::DemandCoverage], instance.stations().len());
/// ```
#[derive(Debug, Clone)]
pub struct RoutingModel {
    layout: VariableLayout,
    bounds: Vec<VarBounds>,
    objective: LinearExpr,
    constraints: Vec<Constraint>,
    node_ids: Vec<String>,
    truck_ids: Vec<String>,
}

impl RoutingModel {
    /// Builds the model of a validated instance.
    ///
    /// Fails without building anything if the instance does not validate.
    pub fn build(instance: &Instance) -> Result<Self, ModelError> {
        instance.validate()?;

        let layout = VariableLayout::for_instance(instance);
        let builder = ModelBuilder::new(instance, &layout);
        let bounds = builder.bounds();
        let objective = builder.objective();
        let constraints = builder.constraints();

        let model = Self {
            bounds,
            objective,
            constraints,
            node_ids: (0..instance.num_nodes())
                .map(|node| instance.node_id(node).to_string())
                .collect(),
            truck_ids: instance.fleet().iter().map(|t| t.id().to_string()).collect(),
            layout,
        };

        for (family, count) in model.family_counts() {
            debug!(family = family.label(), number = family.number(), count, "constraint family");
        }
        info!(
            variables = model.num_variables(),
            constraints = model.num_constraints(),
            nodes = model.node_ids.len(),
            trucks = model.truck_ids.len(),
            "routing model built"
        );
        Ok(model)
    }

    /// Variable index layout.
    pub fn layout(&self) -> &VariableLayout {
        &self.layout
    }

    pub fn num_variables(&self) -> usize {
        self.layout.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Objective to minimize: total distance over selected arcs.
    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    /// Constraints in family order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Constraints of one family.
    pub fn constraints_of(
        &self,
        family: ConstraintFamily,
    ) -> impl Iterator<Item = &Constraint> + '_ {
        self.constraints.iter().filter(move |c| c.family() == family)
    }

    /// Number of constraints per family. Every family is present, possibly
    /// with a zero count.
    pub fn family_counts(&self) -> BTreeMap<ConstraintFamily, usize> {
        let mut counts: BTreeMap<ConstraintFamily, usize> =
            ConstraintFamily::ALL.iter().map(|&f| (f, 0)).collect();
        for constraint in &self.constraints {
            *counts.entry(constraint.family()).or_default() += 1;
        }
        counts
    }

    pub fn bounds(&self, var: VarId) -> VarBounds {
        self.bounds[var.index()]
    }

    pub fn kind(&self, var: VarId) -> VarKind {
        self.layout.kind(var)
    }

    /// Node id at a node index.
    pub fn node_id(&self, node: usize) -> &str {
        &self.node_ids[node]
    }

    /// Truck id at a truck index.
    pub fn truck_id(&self, truck: usize) -> &str {
        &self.truck_ids[truck]
    }

    /// Composite variable name, e.g. `x_G1_D1_K1`, `u_S3_G_K2` or
    /// `L_K1_D2_diesel`.
    pub fn var_name(&self, var: VarId) -> String {
        match self.layout.key(var) {
            VarKey::Arc { from, to, truck } => format!(
                "x_{}_{}_{}",
                self.node_ids[from], self.node_ids[to], self.truck_ids[truck]
            ),
            VarKey::DepotChoice { truck, depot } => format!(
                "y_{}_{}",
                self.truck_ids[truck],
                self.node_ids[self.depot_offset() + depot]
            ),
            VarKey::ProductChoice { truck, product } => {
                format!("z_{}_{}", self.truck_ids[truck], product)
            }
            VarKey::Order { station, truck } => format!(
                "u_{}_{}",
                self.node_ids[self.station_offset() + station],
                self.truck_ids[truck]
            ),
            VarKey::Load {
                truck,
                depot,
                product,
            } => format!(
                "L_{}_{}_{}",
                self.truck_ids[truck],
                self.node_ids[self.depot_offset() + depot],
                product
            ),
        }
    }

    fn depot_offset(&self) -> usize {
        self.node_ids.len() - self.layout.num_stations() - self.layout.num_depots()
    }

    fn station_offset(&self) -> usize {
        self.node_ids.len() - self.layout.num_stations()
    }

    /// Objective value under an assignment.
    pub fn objective_value(&self, assignment: &Assignment) -> f64 {
        self.objective.evaluate(assignment)
    }

    /// Lists every bound, integrality and constraint violation, using
    /// [`FEASIBILITY_TOLERANCE`]. An empty list means the assignment is
    /// feasible.
    pub fn check(&self, assignment: &Assignment) -> Vec<ModelViolation> {
        let tol = FEASIBILITY_TOLERANCE;
        let mut violations = Vec::new();

        for var in self.layout.ids() {
            let value = assignment.value(var);
            let bounds = self.bounds(var);
            if !bounds.contains(value, tol) {
                violations.push(ModelViolation::Bound {
                    variable: self.var_name(var),
                    value,
                    lower: bounds.lower,
                    upper: bounds.upper,
                });
            }
            if self.kind(var) == VarKind::Binary && (value - value.round()).abs() > tol {
                violations.push(ModelViolation::Integrality {
                    variable: self.var_name(var),
                    value,
                });
            }
        }

        for constraint in &self.constraints {
            if !constraint.is_satisfied_by(assignment, tol) {
                violations.push(ModelViolation::Constraint {
                    name: constraint.name().to_string(),
                    family: constraint.family(),
                    lhs: constraint.expr().evaluate(assignment),
                    sense: constraint.sense(),
                    rhs: constraint.rhs(),
                });
            }
        }
        violations
    }

    /// Returns `true` if [`RoutingModel::check`] finds nothing.
    pub fn is_feasible(&self, assignment: &Assignment) -> bool {
        self.check(assignment).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::models::{DemandNode, Depot, Garage, InstanceMeta, Product, Truck};

    /// G1 at the origin, D1 at (3,4), one gasoline station at (6,8).
    fn single_station() -> Instance {
        Instance::new(
            InstanceMeta::default(),
            vec![Garage::new("G1", Point::new(0.0, 0.0))],
            vec![Depot::new("D1", Point::new(3.0, 4.0)).with_stock(Product::Gasoline, 500)],
            vec![DemandNode::new(1, Product::Gasoline, 300, Point::new(6.0, 8.0))],
            vec![Truck::new("K1", 400)],
        )
    }

    fn round_trip(model: &RoutingModel) -> Assignment {
        let layout = model.layout();
        let mut a = Assignment::at_lower_bounds(model);
        a.set(layout.arc(0, 1, 0), 1.0);
        a.set(layout.arc(1, 2, 0), 1.0);
        a.set(layout.arc(2, 0, 0), 1.0);
        a.set(layout.depot_choice(0, 0), 1.0);
        a.set(layout.product_choice(0, Product::Gasoline), 1.0);
        a.set(layout.order(0, 0), 300.0);
        a.set(layout.load(0, 0, Product::Gasoline), 300.0);
        a
    }

    #[test]
    fn test_family_counts() {
        let inst = single_station();
        let model = RoutingModel::build(&inst).unwrap();
        let counts = model.family_counts();
        // n = 3, K = 1, D = 1, S = 1
        assert_eq!(counts[&ConstraintFamily::NoSelfLoop], 3);
        assert_eq!(counts[&ConstraintFamily::GarageEgress], 1);
        assert_eq!(counts[&ConstraintFamily::FlowConservation], 2);
        assert_eq!(counts[&ConstraintFamily::GarageReturn], 1);
        assert_eq!(counts[&ConstraintFamily::SingleDepot], 1);
        assert_eq!(counts[&ConstraintFamily::DepotRouting], 1);
        assert_eq!(counts[&ConstraintFamily::SingleProduct], 1);
        assert_eq!(counts[&ConstraintFamily::ProductCompatibility], 1);
        assert_eq!(counts[&ConstraintFamily::NoDirectGarageToStation], 1);
        assert_eq!(counts[&ConstraintFamily::DepotRequiresEgress], 2);
        assert_eq!(counts[&ConstraintFamily::DemandCoverage], 1);
        assert_eq!(counts[&ConstraintFamily::Capacity], 1);
        assert_eq!(counts[&ConstraintFamily::SubtourElimination], 0);
        assert_eq!(counts[&ConstraintFamily::StockCeiling], 2);
        assert_eq!(counts[&ConstraintFamily::LoadConservation], 2);
        assert_eq!(model.num_variables(), 9 + 1 + 2 + 1 + 2);
    }

    #[test]
    fn test_constraints_are_in_family_order() {
        let model = RoutingModel::build(&single_station()).unwrap();
        let families: Vec<_> = model.constraints().iter().map(|c| c.family()).collect();
        let mut sorted = families.clone();
        sorted.sort();
        assert_eq!(families, sorted);
    }

    #[test]
    fn test_round_trip_is_feasible() {
        let model = RoutingModel::build(&single_station()).unwrap();
        let a = round_trip(&model);
        assert_eq!(model.check(&a), vec![]);
        // 5 + 5 + 10
        assert!((model.objective_value(&a) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_demand_equal_to_capacity_is_feasible() {
        let inst = Instance::new(
            InstanceMeta::default(),
            vec![Garage::new("G1", Point::new(0.0, 0.0))],
            vec![Depot::new("D1", Point::new(3.0, 4.0)).with_stock(Product::Gasoline, 400)],
            vec![DemandNode::new(1, Product::Gasoline, 400, Point::new(6.0, 8.0))],
            vec![Truck::new("K1", 400)],
        );
        let model = RoutingModel::build(&inst).unwrap();
        let layout = model.layout();
        let mut a = round_trip(&model);
        a.set(layout.order(0, 0), 400.0);
        a.set(layout.load(0, 0, Product::Gasoline), 400.0);
        assert!(model.is_feasible(&a));
        assert_eq!(model.bounds(layout.order(0, 0)).lower, 400.0);
        assert_eq!(model.bounds(layout.order(0, 0)).upper, 400.0);
    }

    #[test]
    fn test_skipping_the_depot_is_rejected() {
        let model = RoutingModel::build(&single_station()).unwrap();
        let layout = model.layout();
        let mut a = round_trip(&model);
        a.set(layout.arc(0, 1, 0), 0.0);
        a.set(layout.arc(1, 2, 0), 0.0);
        a.set(layout.arc(0, 2, 0), 1.0);
        let families: Vec<_> = model.check(&a).iter().filter_map(|v| v.family()).collect();
        assert!(families.contains(&ConstraintFamily::NoDirectGarageToStation));
    }

    #[test]
    fn test_station_only_cycle_violates_subtour_elimination() {
        // Two gasoline stations served by a detached loop S1 -> S2 -> S1.
        let inst = Instance::new(
            InstanceMeta::default(),
            vec![Garage::new("G1", Point::new(0.0, 0.0))],
            vec![Depot::new("D1", Point::new(3.0, 4.0)).with_stock(Product::Gasoline, 1000)],
            vec![
                DemandNode::new(1, Product::Gasoline, 100, Point::new(6.0, 8.0)),
                DemandNode::new(2, Product::Gasoline, 100, Point::new(9.0, 12.0)),
            ],
            vec![Truck::new("K1", 400)],
        );
        let model = RoutingModel::build(&inst).unwrap();
        let layout = model.layout();
        let mut a = Assignment::at_lower_bounds(&model);
        a.set(layout.arc(2, 3, 0), 1.0);
        a.set(layout.arc(3, 2, 0), 1.0);
        a.set(layout.product_choice(0, Product::Gasoline), 1.0);
        a.set(layout.load(0, 0, Product::Gasoline), 200.0);

        let families: Vec<_> = model.check(&a).iter().filter_map(|v| v.family()).collect();
        assert!(families.contains(&ConstraintFamily::SubtourElimination));
    }

    #[test]
    fn test_fractional_binary_is_reported() {
        let model = RoutingModel::build(&single_station()).unwrap();
        let mut a = round_trip(&model);
        let var = model.layout().depot_choice(0, 0);
        a.set(var, 0.5);
        assert!(model.check(&a).iter().any(|v| matches!(
            v,
            ModelViolation::Integrality { variable, .. } if variable == "y_K1_D1"
        )));
    }

    #[test]
    fn test_var_names() {
        let model = RoutingModel::build(&single_station()).unwrap();
        let layout = model.layout();
        assert_eq!(model.var_name(layout.arc(0, 1, 0)), "x_G1_D1_K1");
        assert_eq!(model.var_name(layout.depot_choice(0, 0)), "y_K1_D1");
        assert_eq!(
            model.var_name(layout.product_choice(0, Product::Diesel)),
            "z_K1_diesel"
        );
        assert_eq!(model.var_name(layout.order(0, 0)), "u_S1_G_K1");
        assert_eq!(
            model.var_name(layout.load(0, 0, Product::Gasoline)),
            "L_K1_D1_gasoline"
        );
    }

    #[test]
    fn test_invalid_instance_is_rejected() {
        let inst = Instance::new(
            InstanceMeta::default(),
            vec![Garage::new("G1", Point::new(0.0, 0.0))],
            vec![],
            vec![DemandNode::new(1, Product::Gasoline, 300, Point::new(6.0, 8.0))],
            vec![Truck::new("K1", 400)],
        );
        assert!(matches!(
            RoutingModel::build(&inst),
            Err(ModelError::Instance(_))
        ));
    }

    #[test]
    fn test_build_is_deterministic() {
        let inst = single_station();
        let a = RoutingModel::build(&inst).unwrap();
        let b = RoutingModel::build(&inst).unwrap();
        assert_eq!(a.constraints(), b.constraints());
        assert_eq!(a.objective(), b.objective());
    }
}
