//! Decoded per-truck results.

use std::fmt;

use crate::models::{Instance, Product};

/// A closed trip: home garage → depot → demand nodes → garage.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRoute {
    pub(super) truck: usize,
    pub(super) nodes: Vec<usize>,
    pub(super) distance: f64,
    pub(super) stations: Vec<usize>,
    pub(super) depot: Option<usize>,
    pub(super) product: Option<Product>,
    pub(super) load: f64,
}

impl DecodedRoute {
    /// Truck index in the fleet.
    pub fn truck(&self) -> usize {
        self.truck
    }

    /// Node indices in visiting order, starting and ending at a garage.
    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    /// Node ids in visiting order.
    pub fn node_ids<'i>(&self, instance: &'i Instance) -> Vec<&'i str> {
        self.nodes.iter().map(|&n| instance.node_id(n)).collect()
    }

    /// Sum of table distances along the route.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Demand-node ordinals served, in visiting order.
    pub fn stations(&self) -> &[usize] {
        &self.stations
    }

    /// Depot ordinal selected for the truck, if any.
    pub fn depot(&self) -> Option<usize> {
        self.depot
    }

    /// Product selected for the truck, if any.
    pub fn product(&self) -> Option<Product> {
        self.product
    }

    /// Quantity loaded for the selected product over all depots.
    pub fn load(&self) -> f64 {
        self.load
    }
}

/// Why a truck's arcs could not be read as a closed route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnomalyReason {
    /// The walk visited more than `limit` nodes without reaching a garage.
    StepLimitExceeded { limit: usize },
    /// The walk reached a node with no outgoing arc.
    DeadEnd { node: usize },
    /// A node on the walk has several outgoing arcs.
    Branching { node: usize, successors: Vec<usize> },
}

impl fmt::Display for AnomalyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnomalyReason::StepLimitExceeded { limit } => {
                write!(f, "no garage reached within {limit} nodes")
            }
            AnomalyReason::DeadEnd { node } => write!(f, "node {node} has no successor"),
            AnomalyReason::Branching { node, successors } => {
                write!(f, "node {node} has successors {successors:?}")
            }
        }
    }
}

/// A truck whose selected arcs do not form a closed route.
#[derive(Debug, Clone, PartialEq)]
pub struct Anomaly {
    pub(super) truck: usize,
    pub(super) partial_route: Vec<usize>,
    pub(super) distance: f64,
    pub(super) reason: AnomalyReason,
}

impl Anomaly {
    pub fn truck(&self) -> usize {
        self.truck
    }

    /// Nodes walked before the walk was abandoned.
    pub fn partial_route(&self) -> &[usize] {
        &self.partial_route
    }

    /// Distance of the partial route.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn reason(&self) -> &AnomalyReason {
        &self.reason
    }
}

/// Decoding result for one truck.
#[derive(Debug, Clone, PartialEq)]
pub enum TruckOutcome {
    /// No arc leaves the home garage.
    Unused,
    /// A closed route.
    Closed(DecodedRoute),
    /// Arcs that do not close back to a garage.
    Anomaly(Anomaly),
}

impl TruckOutcome {
    pub fn route(&self) -> Option<&DecodedRoute> {
        match self {
            TruckOutcome::Closed(route) => Some(route),
            _ => None,
        }
    }

    pub fn anomaly(&self) -> Option<&Anomaly> {
        match self {
            TruckOutcome::Anomaly(anomaly) => Some(anomaly),
            _ => None,
        }
    }
}

/// Aggregate figures over the fleet.
#[derive(Debug, Clone, PartialEq)]
pub struct FleetMetrics {
    /// Objective value: total distance over selected arcs.
    pub total_distance: f64,
    /// Trucks with at least one selected arc.
    pub trucks_used: usize,
    /// Fleet size.
    pub trucks_available: usize,
    /// Sum of every load variable.
    pub total_load: f64,
    /// `total_load / trucks_used`, or `None` if no truck moved.
    pub average_load: Option<f64>,
    /// Sum of truck capacities.
    pub fleet_capacity: i64,
    /// `total_load / fleet_capacity` as a fraction in `[0, 1]`.
    pub utilization: f64,
    /// Depot ordinals selected by at least one truck.
    pub depots_used: Vec<usize>,
}
