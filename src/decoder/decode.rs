//! Route reconstruction from arc values.

use tracing::{debug, warn};

use crate::error::ModelError;
use crate::milp::{Assignment, RoutingModel, VariableLayout};
use crate::models::{Instance, Product};

use super::{Anomaly, AnomalyReason, DecodedRoute, FleetMetrics, TruckOutcome};

/// Per-truck outcomes plus fleet metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSolution {
    trucks: Vec<TruckOutcome>,
    metrics: FleetMetrics,
}

impl DecodedSolution {
    /// One outcome per truck, in fleet order.
    pub fn trucks(&self) -> &[TruckOutcome] {
        &self.trucks
    }

    pub fn metrics(&self) -> &FleetMetrics {
        &self.metrics
    }

    /// Closed routes, in fleet order.
    pub fn routes(&self) -> impl Iterator<Item = &DecodedRoute> {
        self.trucks.iter().filter_map(TruckOutcome::route)
    }

    /// Anomalous trucks, in fleet order.
    pub fn anomalies(&self) -> impl Iterator<Item = &Anomaly> {
        self.trucks.iter().filter_map(TruckOutcome::anomaly)
    }

    /// Returns `true` if every truck is unused or closed.
    pub fn is_clean(&self) -> bool {
        self.anomalies().next().is_none()
    }
}

/// Rebuilds each truck's route from the selected arcs of `assignment`.
///
/// Each truck is walked from its home garage along the unique selected
/// successor of every node. The walk ends at the first garage reached, or
/// is reported as an [`Anomaly`] when it dead-ends, branches, or exceeds
/// |V| + 2 nodes. An anomaly never stops the other trucks from decoding.
///
/// Fails only if the model or assignment does not belong to the instance.
///
/// # Examples
///
/// ```
/// use tanker_routing::decoder::decode;
/// use tanker_routing::generator::{GeneratorConfig, InstanceGenerator};
/// use tanker_routing::milp::RoutingModel;
/// use tanker_routing::solver::{GreedySolver, SolveLimits, Solver};
///
/// let instance = InstanceGenerator::new(GeneratorConfig::easy())
///     .unwrap()
///     .generate(5)
///     .unwrap();
/// let model = RoutingModel::build(&instance).unwrap();
/// let outcome = GreedySolver::new(&instance).solve(&model, &SolveLimits::default());
/// let decoded = decode(&instance, &model, outcome.assignment.as_ref().unwrap()).unwrap();
/// assert!(decoded.is_clean());
/// let served: usize = decoded.routes().map(|r| r.stations().len()).sum();
/// assert_eq!(served, instance.stations().len());
/// ```
pub fn decode(
    instance: &Instance,
    model: &RoutingModel,
    assignment: &Assignment,
) -> Result<DecodedSolution, ModelError> {
    if *model.layout() != VariableLayout::for_instance(instance) {
        return Err(ModelError::LayoutMismatch);
    }
    if assignment.len() != model.num_variables() {
        return Err(ModelError::AssignmentSize {
            expected: model.num_variables(),
            actual: assignment.len(),
        });
    }

    let decoder = Decoder {
        instance,
        layout: model.layout(),
        assignment,
    };
    let trucks: Vec<TruckOutcome> = (0..instance.fleet().len())
        .map(|k| decoder.truck(k))
        .collect();
    for anomaly in trucks.iter().filter_map(TruckOutcome::anomaly) {
        warn!(
            truck = instance.fleet()[anomaly.truck()].id(),
            reason = %anomaly.reason(),
            walked = anomaly.partial_route().len(),
            "route decoding anomaly"
        );
    }

    let metrics = decoder.metrics(model.objective_value(assignment));
    debug!(
        trucks_used = metrics.trucks_used,
        routes = trucks.iter().filter(|t| t.route().is_some()).count(),
        total_load = metrics.total_load,
        "decoded solution"
    );
    Ok(DecodedSolution { trucks, metrics })
}

struct Decoder<'a> {
    instance: &'a Instance,
    layout: &'a VariableLayout,
    assignment: &'a Assignment,
}

impl Decoder<'_> {
    fn successors(&self, node: usize, truck: usize) -> Vec<usize> {
        (0..self.instance.num_nodes())
            .filter(|&j| j != node && self.assignment.is_selected(self.layout.arc(node, j, truck)))
            .collect()
    }

    fn path_distance(&self, nodes: &[usize]) -> f64 {
        nodes
            .windows(2)
            .map(|w| self.instance.distance(w[0], w[1]))
            .sum()
    }

    fn truck(&self, truck: usize) -> TruckOutcome {
        let home = self.instance.fleet()[truck].home_garage();
        if self.successors(home, truck).is_empty() {
            return TruckOutcome::Unused;
        }

        let limit = self.instance.num_nodes() + 2;
        let mut nodes = vec![home];
        let mut current = home;
        let reason = loop {
            let next = match self.successors(current, truck).as_slice() {
                [] => break AnomalyReason::DeadEnd { node: current },
                [next] => *next,
                many => {
                    break AnomalyReason::Branching {
                        node: current,
                        successors: many.to_vec(),
                    }
                }
            };
            nodes.push(next);
            if self.instance.is_garage(next) {
                return TruckOutcome::Closed(self.route(truck, nodes));
            }
            if nodes.len() > limit {
                break AnomalyReason::StepLimitExceeded { limit };
            }
            current = next;
        };

        TruckOutcome::Anomaly(Anomaly {
            truck,
            distance: self.path_distance(&nodes),
            partial_route: nodes,
            reason,
        })
    }

    fn route(&self, truck: usize, nodes: Vec<usize>) -> DecodedRoute {
        let first_station = self.instance.demand_node(0);
        let stations = nodes
            .iter()
            .filter(|&&n| self.instance.demand_nodes().contains(&n))
            .map(|&n| n - first_station)
            .collect();
        let depot = (0..self.instance.depots().len())
            .find(|&d| self.assignment.is_selected(self.layout.depot_choice(truck, d)));
        let product = Product::ALL
            .into_iter()
            .find(|&p| self.assignment.is_selected(self.layout.product_choice(truck, p)));
        let load = product.map_or(0.0, |p| {
            (0..self.instance.depots().len())
                .map(|d| self.assignment.value(self.layout.load(truck, d, p)))
                .sum()
        });

        DecodedRoute {
            truck,
            distance: self.path_distance(&nodes),
            nodes,
            stations,
            depot,
            product,
            load,
        }
    }

    fn metrics(&self, total_distance: f64) -> FleetMetrics {
        let n = self.instance.num_nodes();
        let depots = self.instance.depots().len();
        let trucks = self.instance.fleet().len();

        let trucks_used = (0..trucks)
            .filter(|&k| {
                (0..n).any(|i| {
                    (0..n).any(|j| i != j && self.assignment.is_selected(self.layout.arc(i, j, k)))
                })
            })
            .count();

        let total_load: f64 = (0..trucks)
            .flat_map(|k| (0..depots).map(move |d| (k, d)))
            .flat_map(|(k, d)| Product::ALL.map(|p| (k, d, p)))
            .map(|(k, d, p)| self.assignment.value(self.layout.load(k, d, p)))
            .sum();

        let fleet_capacity = self.instance.fleet_capacity();
        let utilization = if fleet_capacity > 0 {
            total_load / fleet_capacity as f64
        } else {
            0.0
        };

        let depots_used = (0..depots)
            .filter(|&d| {
                (0..trucks).any(|k| self.assignment.is_selected(self.layout.depot_choice(k, d)))
            })
            .collect();

        FleetMetrics {
            total_distance,
            trucks_used,
            trucks_available: trucks,
            total_load,
            average_load: (trucks_used > 0).then(|| total_load / trucks_used as f64),
            fleet_capacity,
            utilization,
            depots_used,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{GeneratorConfig, InstanceGenerator};
    use crate::geometry::Point;
    use crate::models::{DemandNode, Depot, Garage, InstanceMeta, Truck};
    use crate::solver::{GreedySolver, SolveLimits, Solver};
    use proptest::prelude::*;

    /// G1 (0,0), D1 (3,4), S1_G (6,8), S2_G (9,12); two trucks.
    fn two_stations() -> Instance {
        Instance::new(
            InstanceMeta::default(),
            vec![Garage::new("G1", Point::new(0.0, 0.0))],
            vec![Depot::new("D1", Point::new(3.0, 4.0)).with_stock(Product::Gasoline, 1000)],
            vec![
                DemandNode::new(1, Product::Gasoline, 100, Point::new(6.0, 8.0)),
                DemandNode::new(2, Product::Gasoline, 200, Point::new(9.0, 12.0)),
            ],
            vec![Truck::new("K1", 400), Truck::new("K2", 400)],
        )
    }

    #[test]
    fn test_trivial_round_trip() {
        let inst = Instance::new(
            InstanceMeta::default(),
            vec![Garage::new("G1", Point::new(0.0, 0.0))],
            vec![Depot::new("D1", Point::new(3.0, 4.0)).with_stock(Product::Gasoline, 500)],
            vec![DemandNode::new(1, Product::Gasoline, 300, Point::new(6.0, 8.0))],
            vec![Truck::new("K1", 400)],
        );
        let model = RoutingModel::build(&inst).unwrap();
        let layout = model.layout();
        let mut a = Assignment::at_lower_bounds(&model);
        a.set(layout.arc(0, 1, 0), 1.0);
        a.set(layout.arc(1, 2, 0), 1.0);
        a.set(layout.arc(2, 0, 0), 1.0);
        a.set(layout.depot_choice(0, 0), 1.0);
        a.set(layout.product_choice(0, Product::Gasoline), 1.0);
        a.set(layout.order(0, 0), 300.0);
        a.set(layout.load(0, 0, Product::Gasoline), 300.0);
        assert!(model.is_feasible(&a));
        let decoded = decode(&inst, &model, &a).unwrap();

        let routes: Vec<_> = decoded.routes().collect();
        assert_eq!(routes.len(), 1);
        let route = routes[0];
        assert_eq!(route.node_ids(&inst), vec!["G1", "D1", "S1_G", "G1"]);
        let expected = inst.distance(0, 1) + inst.distance(1, 2) + inst.distance(2, 0);
        assert!((route.distance() - expected).abs() < 1e-9);
        assert_eq!(route.load(), 300.0);
        assert_eq!(route.depot(), Some(0));
        assert_eq!(route.product(), Some(Product::Gasoline));
        assert_eq!(route.stations(), &[0]);

        let m = decoded.metrics();
        assert_eq!(m.trucks_used, 1);
        assert_eq!(m.total_load, 300.0);
        assert_eq!(m.average_load, Some(300.0));
        assert!((m.utilization - 0.75).abs() < 1e-12);
        assert_eq!(m.depots_used, vec![0]);
        assert!((m.total_distance - expected).abs() < 1e-9);
    }

    #[test]
    fn test_unused_truck() {
        let inst = two_stations();
        let model = RoutingModel::build(&inst).unwrap();
        let a = Assignment::at_lower_bounds(&model);
        let decoded = decode(&inst, &model, &a).unwrap();
        assert!(decoded.trucks().iter().all(|t| *t == TruckOutcome::Unused));
        assert_eq!(decoded.metrics().trucks_used, 0);
        assert_eq!(decoded.metrics().average_load, None);
    }

    #[test]
    fn test_step_limit_anomaly() {
        let inst = two_stations();
        let model = RoutingModel::build(&inst).unwrap();
        let layout = model.layout();
        let mut a = Assignment::at_lower_bounds(&model);
        // K1: G1 -> D1 -> S1 -> S2 -> S1 -> ... never returns.
        a.set(layout.arc(0, 1, 0), 1.0);
        a.set(layout.arc(1, 2, 0), 1.0);
        a.set(layout.arc(2, 3, 0), 1.0);
        a.set(layout.arc(3, 2, 0), 1.0);
        // K2: a proper trip to S2.
        a.set(layout.arc(0, 1, 1), 1.0);
        a.set(layout.arc(1, 3, 1), 1.0);
        a.set(layout.arc(3, 0, 1), 1.0);

        let decoded = decode(&inst, &model, &a).unwrap();
        let anomaly = decoded.trucks()[0].anomaly().unwrap();
        assert_eq!(
            anomaly.reason(),
            &AnomalyReason::StepLimitExceeded { limit: 6 }
        );
        assert_eq!(anomaly.partial_route().len(), 7);
        assert_eq!(&anomaly.partial_route()[..4], &[0, 1, 2, 3]);

        let route = decoded.trucks()[1].route().unwrap();
        assert_eq!(route.nodes(), &[0, 1, 3, 0]);
        assert!(!decoded.is_clean());
        assert_eq!(decoded.metrics().trucks_used, 2);
    }

    #[test]
    fn test_dead_end_and_branching() {
        let inst = two_stations();
        let model = RoutingModel::build(&inst).unwrap();
        let layout = model.layout();
        let mut a = Assignment::at_lower_bounds(&model);
        a.set(layout.arc(0, 1, 0), 1.0);
        a.set(layout.arc(1, 2, 0), 1.0);
        a.set(layout.arc(0, 1, 1), 1.0);
        a.set(layout.arc(1, 2, 1), 1.0);
        a.set(layout.arc(1, 3, 1), 1.0);

        let decoded = decode(&inst, &model, &a).unwrap();
        assert_eq!(
            decoded.trucks()[0].anomaly().unwrap().reason(),
            &AnomalyReason::DeadEnd { node: 2 }
        );
        assert_eq!(
            decoded.trucks()[1].anomaly().unwrap().reason(),
            &AnomalyReason::Branching {
                node: 1,
                successors: vec![2, 3],
            }
        );
    }

    #[test]
    fn test_foreign_assignment_is_rejected() {
        let inst = two_stations();
        let model = RoutingModel::build(&inst).unwrap();
        let other = InstanceGenerator::new(GeneratorConfig::easy())
            .unwrap()
            .generate(9)
            .unwrap();
        let a = Assignment::at_lower_bounds(&model);
        assert_eq!(decode(&other, &model, &a), Err(ModelError::LayoutMismatch));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_decode_is_idempotent_and_conserves_load(seed in any::<u64>()) {
            let inst = InstanceGenerator::new(GeneratorConfig::easy())
                .unwrap()
                .generate(seed)
                .unwrap();
            let model = RoutingModel::build(&inst).unwrap();
            let outcome = GreedySolver::new(&inst).solve(&model, &SolveLimits::default());
            let a = outcome.assignment.unwrap();

            let first = decode(&inst, &model, &a).unwrap();
            let second = decode(&inst, &model, &a).unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert!(first.is_clean());

            for route in first.routes() {
                let delivered: f64 = route
                    .stations()
                    .iter()
                    .map(|&s| f64::from(inst.stations()[s].demand()))
                    .sum();
                prop_assert!((route.load() - delivered).abs() < 1e-6);
                prop_assert!(route.load() <= f64::from(inst.fleet()[route.truck()].capacity()));
                let product = route.product().unwrap();
                prop_assert!(route
                    .stations()
                    .iter()
                    .all(|&s| inst.stations()[s].product() == product));
            }
            prop_assert!((first.metrics().total_load - inst.total_demand() as f64).abs() < 1e-6);
        }
    }
}
