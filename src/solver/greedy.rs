//! Nearest-neighbor constructive solver.
//!
//! Demand nodes of each product are packed into truck loads with
//! [`first_fit_decreasing`], using the smallest truck capacity so every load
//! fits every truck. Loads are then handed out largest first: the next free
//! truck takes the load from the depot nearest its garage that still holds
//! enough of the product, and visits its demand nodes in nearest-neighbor
//! order before returning home.
//!
//! The result is a feasible assignment, never a proven optimum.
//!
//! # Complexity
//!
//! O(S² + L·D) where S = demand nodes and L = loads.

use std::cmp::Reverse;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::milp::{Assignment, RoutingModel, VariableLayout};
use crate::models::{Instance, Product};

use super::{first_fit_decreasing, SolveLimits, SolveOutcome, SolveStatus, Solver};

/// One planned trip.
#[derive(Debug, Clone, PartialEq)]
struct Trip {
    truck: usize,
    depot: usize,
    product: Product,
    stations: Vec<usize>,
}

/// Why planning stopped without trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    /// Time budget spent or cancellation raised.
    Budget,
    /// No free truck, or no depot holding enough stock, for a pending load.
    DeadEnd,
}

/// Constructive solver for instances that the model was built from.
///
/// # Examples
///
/// ```
/// use tanker_routing::generator::{GeneratorConfig, InstanceGenerator};
/// use tanker_routing::milp::RoutingModel;
/// use tanker_routing::solver::{GreedySolver, SolveLimits, SolveStatus, Solver};
///
/// let instance = InstanceGenerator::new(GeneratorConfig::easy())
///     .unwrap()
///     .generate(42)
///     .unwrap();
/// let model = RoutingModel::build(&instance).unwrap();
/// let outcome = GreedySolver::new(&instance).solve(&model, &SolveLimits::default());
/// assert_eq!(outcome.status, SolveStatus::Feasible);
/// assert!(model.is_feasible(outcome.assignment.as_ref().unwrap()));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct GreedySolver<'a> {
    instance: &'a Instance,
}

impl<'a> GreedySolver<'a> {
    pub fn new(instance: &'a Instance) -> Self {
        Self { instance }
    }

    /// Plans every trip.
    fn plan(&self, limits: &SolveLimits, started: Instant) -> Result<Vec<Trip>, Stop> {
        let inst = self.instance;
        if inst.stations().is_empty() {
            return Ok(Vec::new());
        }

        let capacity = inst
            .fleet()
            .iter()
            .map(|t| i64::from(t.capacity()))
            .min()
            .ok_or(Stop::DeadEnd)?;
        let mut loads = Vec::new();
        for product in Product::ALL {
            let items: Vec<(usize, i64)> = inst
                .stations()
                .iter()
                .enumerate()
                .filter(|(_, s)| s.product() == product)
                .map(|(s, node)| (s, i64::from(node.demand())))
                .collect();
            loads.extend(
                first_fit_decreasing(&items, capacity)
                    .into_iter()
                    .map(|bin| (product, bin)),
            );
        }
        loads.sort_by_key(|(_, bin)| Reverse(bin.load));
        debug!(loads = loads.len(), trucks = inst.fleet().len(), "packed truck loads");

        let mut trucks: Vec<usize> = (0..inst.fleet().len()).collect();
        trucks.sort_by_key(|&k| Reverse(inst.fleet()[k].capacity()));
        let mut trucks = trucks.into_iter();

        let mut stock: Vec<[i64; Product::COUNT]> = inst
            .depots()
            .iter()
            .map(|d| Product::ALL.map(|p| i64::from(d.stock(p))))
            .collect();

        let mut trips = Vec::with_capacity(loads.len());
        for (product, bin) in loads {
            if limits.should_stop(started) {
                return Err(Stop::Budget);
            }
            let truck = trucks.next().ok_or(Stop::DeadEnd)?;
            let garage = inst.fleet()[truck].home_garage();
            let depot = (0..inst.depots().len())
                .filter(|&d| stock[d][product.index()] >= bin.load)
                .min_by(|&a, &b| {
                    inst.distance(garage, inst.depot_node(a))
                        .total_cmp(&inst.distance(garage, inst.depot_node(b)))
                })
                .ok_or(Stop::DeadEnd)?;
            stock[depot][product.index()] -= bin.load;

            trips.push(Trip {
                truck,
                depot,
                product,
                stations: self.nearest_neighbor_order(inst.depot_node(depot), bin.items),
            });
        }
        Ok(trips)
    }

    /// Orders `pending` demand nodes by repeatedly moving to the nearest one.
    fn nearest_neighbor_order(&self, start: usize, mut pending: Vec<usize>) -> Vec<usize> {
        let inst = self.instance;
        let mut route = Vec::with_capacity(pending.len());
        let mut current = start;

        loop {
            let candidates: Vec<usize> = pending.iter().map(|&s| inst.demand_node(s)).collect();
            let Some(next) = inst.distances().nearest_neighbor(current, &candidates) else {
                break;
            };
            let station = next - inst.demand_node(0);
            pending.retain(|&s| s != station);
            route.push(station);
            current = next;
        }
        route
    }

    /// Writes the variables of each trip onto an all-lower-bound assignment.
    fn assign(&self, model: &RoutingModel, trips: &[Trip]) -> Assignment {
        let inst = self.instance;
        let layout: &VariableLayout = model.layout();
        let mut a = Assignment::at_lower_bounds(model);

        for trip in trips {
            let k = trip.truck;
            let garage = inst.fleet()[k].home_garage();
            let depot_node = inst.depot_node(trip.depot);

            a.set(layout.depot_choice(k, trip.depot), 1.0);
            a.set(layout.product_choice(k, trip.product), 1.0);
            a.set(layout.arc(garage, depot_node, k), 1.0);

            let mut prev = depot_node;
            let mut load = 0.0;
            for &s in &trip.stations {
                let node = inst.demand_node(s);
                a.set(layout.arc(prev, node, k), 1.0);
                load += f64::from(inst.stations()[s].demand());
                a.set(layout.order(s, k), load);
                prev = node;
            }
            a.set(layout.arc(prev, garage, k), 1.0);
            a.set(layout.load(k, trip.depot, trip.product), load);
        }
        a
    }
}

impl Solver for GreedySolver<'_> {
    fn solve(&self, model: &RoutingModel, limits: &SolveLimits) -> SolveOutcome {
        let started = Instant::now();

        if *model.layout() != VariableLayout::for_instance(self.instance) {
            warn!("model was not built from this instance");
            return SolveOutcome::unsolved(SolveStatus::NotSolved, started.elapsed());
        }

        let trips = match self.plan(limits, started) {
            Ok(trips) => trips,
            Err(stop) => {
                let status = match stop {
                    Stop::Budget => SolveStatus::TimedOut,
                    Stop::DeadEnd => SolveStatus::NotSolved,
                };
                let outcome = SolveOutcome::unsolved(status, started.elapsed());
                info!(status = %outcome.status, "greedy construction stopped without a solution");
                return outcome;
            }
        };

        // Nothing to deliver: staying home is optimal.
        let status = if trips.is_empty() {
            SolveStatus::Optimal
        } else {
            SolveStatus::Feasible
        };
        let assignment = self.assign(model, &trips);
        let outcome = SolveOutcome::solved(model, status, assignment, started.elapsed());
        info!(
            status = %outcome.status,
            trips = trips.len(),
            objective = outcome.objective,
            "greedy construction finished"
        );
        outcome
    }
}
