//! Problem instance: sites, fleet and distances.

use std::collections::{BTreeMap, HashSet};
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::distance::DistanceTable;
use crate::error::InstanceError;
use crate::geometry::Point;

use super::{DemandNode, Depot, Garage, NodeKind, Product, Truck};

/// Difficulty label of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    #[default]
    Custom,
}

impl Difficulty {
    /// Lowercase label, as written in instance files.
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Custom => "custom",
        }
    }
}

/// Descriptive metadata carried along with an instance.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InstanceMeta {
    /// Difficulty label.
    pub difficulty: Difficulty,
    /// Free-form description.
    pub description: String,
    /// Seed the instance was generated from, if any.
    pub seed: Option<u64>,
}

/// A fuel delivery routing instance.
///
/// Nodes are indexed in a fixed order: garages `0..G`, then depots
/// `G..G+D`, then demand nodes `G+D..V`. The distance table uses the same
/// order.
///
/// # Examples
///
/// ```
/// use tanker_routing::geometry::Point;
/// use tanker_routing::models::{
///     DemandNode, Depot, Garage, Instance, InstanceMeta, NodeKind, Product, Truck,
/// };
///
/// let instance = Instance::new(
///     InstanceMeta::default(),
///     vec![Garage::new("G1", Point::new(0.0, 0.0))],
///     vec![Depot::new("D1", Point::new(3.0, 4.0)).with_stock(Product::Gasoline, 500)],
///     vec![DemandNode::new(1, Product::Gasoline, 300, Point::new(6.0, 8.0))],
///     vec![Truck::new("K1", 400)],
/// );
/// assert_eq!(instance.num_nodes(), 3);
/// assert_eq!(instance.node_kind(1), NodeKind::Depot);
/// assert_eq!(instance.distance(0, 2), 10.0);
/// assert!(instance.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    meta: InstanceMeta,
    garages: Vec<Garage>,
    depots: Vec<Depot>,
    stations: Vec<DemandNode>,
    fleet: Vec<Truck>,
    distances: DistanceTable,
}

impl Instance {
    /// Creates an instance, computing the distance table from site locations.
    pub fn new(
        meta: InstanceMeta,
        garages: Vec<Garage>,
        depots: Vec<Depot>,
        stations: Vec<DemandNode>,
        fleet: Vec<Truck>,
    ) -> Self {
        let points: Vec<Point> = garages
            .iter()
            .map(Garage::location)
            .chain(depots.iter().map(Depot::location))
            .chain(stations.iter().map(DemandNode::location))
            .collect();
        let distances = DistanceTable::from_points(&points);
        Self::with_distances(meta, garages, depots, stations, fleet, distances)
    }

    /// Creates an instance with an explicit distance table.
    ///
    /// The table is not checked here; call [`Instance::validate`].
    pub fn with_distances(
        meta: InstanceMeta,
        garages: Vec<Garage>,
        depots: Vec<Depot>,
        stations: Vec<DemandNode>,
        fleet: Vec<Truck>,
        distances: DistanceTable,
    ) -> Self {
        Self {
            meta,
            garages,
            depots,
            stations,
            fleet,
            distances,
        }
    }

    /// Instance metadata.
    pub fn meta(&self) -> &InstanceMeta {
        &self.meta
    }

    /// Garages, in node order.
    pub fn garages(&self) -> &[Garage] {
        &self.garages
    }

    /// Depots, in node order.
    pub fn depots(&self) -> &[Depot] {
        &self.depots
    }

    /// Demand nodes, in node order.
    pub fn stations(&self) -> &[DemandNode] {
        &self.stations
    }

    /// The fleet.
    pub fn fleet(&self) -> &[Truck] {
        &self.fleet
    }

    /// The precomputed distance table.
    pub fn distances(&self) -> &DistanceTable {
        &self.distances
    }

    /// Total number of nodes |V|.
    pub fn num_nodes(&self) -> usize {
        self.garages.len() + self.depots.len() + self.stations.len()
    }

    /// Node indices of garages.
    pub fn garage_nodes(&self) -> Range<usize> {
        0..self.garages.len()
    }

    /// Node indices of depots.
    pub fn depot_nodes(&self) -> Range<usize> {
        let start = self.garages.len();
        start..start + self.depots.len()
    }

    /// Node indices of demand nodes.
    pub fn demand_nodes(&self) -> Range<usize> {
        let start = self.garages.len() + self.depots.len();
        start..start + self.stations.len()
    }

    /// Node index of the `d`-th depot.
    pub fn depot_node(&self, depot: usize) -> usize {
        self.garages.len() + depot
    }

    /// Node index of the `s`-th demand node.
    pub fn demand_node(&self, station: usize) -> usize {
        self.garages.len() + self.depots.len() + station
    }

    /// Kind of the node at `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node >= num_nodes()`.
    pub fn node_kind(&self, node: usize) -> NodeKind {
        let g = self.garages.len();
        let d = self.depots.len();
        assert!(node < self.num_nodes(), "node index {node} out of range");
        if node < g {
            NodeKind::Garage
        } else if node < g + d {
            NodeKind::Depot
        } else {
            NodeKind::Demand
        }
    }

    /// Returns `true` if `node` is a garage.
    pub fn is_garage(&self, node: usize) -> bool {
        node < self.garages.len()
    }

    /// ID of the node at `node`.
    pub fn node_id(&self, node: usize) -> &str {
        match self.node_kind(node) {
            NodeKind::Garage => self.garages[node].id(),
            NodeKind::Depot => self.depots[node - self.garages.len()].id(),
            NodeKind::Demand => {
                self.stations[node - self.garages.len() - self.depots.len()].id()
            }
        }
    }

    /// Location of the node at `node`.
    pub fn node_location(&self, node: usize) -> Point {
        match self.node_kind(node) {
            NodeKind::Garage => self.garages[node].location(),
            NodeKind::Depot => self.depots[node - self.garages.len()].location(),
            NodeKind::Demand => {
                self.stations[node - self.garages.len() - self.depots.len()].location()
            }
        }
    }

    /// Finds the node index of a site ID.
    pub fn node_index(&self, id: &str) -> Option<usize> {
        (0..self.num_nodes()).find(|&node| self.node_id(node) == id)
    }

    /// Precomputed distance between two nodes.
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.distances.get(from, to)
    }

    /// Aggregate demand for one product.
    pub fn demand_for(&self, product: Product) -> i64 {
        self.stations
            .iter()
            .filter(|s| s.product() == product)
            .map(|s| i64::from(s.demand()))
            .sum()
    }

    /// Aggregate demand over all products.
    pub fn total_demand(&self) -> i64 {
        self.stations.iter().map(|s| i64::from(s.demand())).sum()
    }

    /// Aggregate depot stock for one product.
    pub fn stock_for(&self, product: Product) -> i64 {
        self.depots
            .iter()
            .map(|d| i64::from(d.stock(product)))
            .sum()
    }

    /// Aggregate fleet capacity.
    pub fn fleet_capacity(&self) -> i64 {
        self.fleet.iter().map(|t| i64::from(t.capacity())).sum()
    }

    /// Checks structural and aggregate feasibility preconditions.
    ///
    /// Passing validation means the instance is well formed and that
    /// aggregate stock and capacity cover demand; it does not prove that a
    /// feasible routing exists.
    pub fn validate(&self) -> Result<(), InstanceError> {
        if self.garages.is_empty() && !self.fleet.is_empty() {
            return Err(InstanceError::NoGarages);
        }
        let total_demand = self.total_demand();
        if self.depots.is_empty() && !self.stations.is_empty() {
            return Err(InstanceError::NoDepots {
                demand: total_demand,
            });
        }

        let mut seen = HashSet::new();
        let ids = (0..self.num_nodes())
            .map(|node| self.node_id(node))
            .chain(self.fleet.iter().map(Truck::id));
        for id in ids {
            if !seen.insert(id) {
                return Err(InstanceError::DuplicateId(id.to_string()));
            }
        }

        for station in &self.stations {
            if station.demand() <= 0 {
                return Err(InstanceError::NonPositiveDemand {
                    id: station.id().to_string(),
                    demand: station.demand(),
                });
            }
        }
        for depot in &self.depots {
            for product in Product::ALL {
                if depot.stock(product) < 0 {
                    return Err(InstanceError::NegativeStock {
                        id: depot.id().to_string(),
                        product,
                        stock: depot.stock(product),
                    });
                }
            }
        }
        for truck in &self.fleet {
            if truck.capacity() <= 0 {
                return Err(InstanceError::NonPositiveCapacity {
                    id: truck.id().to_string(),
                    capacity: truck.capacity(),
                });
            }
            if truck.home_garage() >= self.garages.len() {
                return Err(InstanceError::UnknownHomeGarage {
                    truck: truck.id().to_string(),
                    garage: truck.home_garage(),
                });
            }
        }

        self.validate_colocation()?;
        self.validate_distances()?;
        self.validate_supply(total_demand)
    }

    fn validate_colocation(&self) -> Result<(), InstanceError> {
        let mut locations: BTreeMap<usize, Point> = BTreeMap::new();
        for station in &self.stations {
            let first = *locations
                .entry(station.station())
                .or_insert(station.location());
            if first != station.location() {
                return Err(InstanceError::SplitStation {
                    station: station.station(),
                });
            }
        }
        Ok(())
    }

    fn validate_distances(&self) -> Result<(), InstanceError> {
        if self.distances.size() != self.num_nodes() {
            return Err(InstanceError::DistanceTableSize {
                expected: self.num_nodes(),
                actual: self.distances.size(),
            });
        }
        if let Some((from, to)) = self.distances.first_invalid_entry() {
            return Err(InstanceError::InvalidDistance {
                from: self.node_id(from).to_string(),
                to: self.node_id(to).to_string(),
                value: self.distances.get(from, to),
            });
        }
        Ok(())
    }

    fn validate_supply(&self, total_demand: i64) -> Result<(), InstanceError> {
        if self.stations.is_empty() {
            return Ok(());
        }
        // Ordering variables are bounded by [demand, capacity] for every
        // (node, truck) pair, so every node must fit the smallest truck.
        let min_capacity = self.fleet.iter().map(Truck::capacity).min().unwrap_or(0);
        if let Some(station) = self.stations.iter().find(|s| s.demand() > min_capacity) {
            return Err(InstanceError::DemandExceedsCapacity {
                id: station.id().to_string(),
                demand: station.demand(),
                capacity: min_capacity,
            });
        }
        let capacity = self.fleet_capacity();
        if capacity < total_demand {
            return Err(InstanceError::InsufficientFleet {
                capacity,
                demand: total_demand,
            });
        }
        for product in Product::ALL {
            let stock = self.stock_for(product);
            let demand = self.demand_for(product);
            if stock < demand {
                return Err(InstanceError::InsufficientStock {
                    product,
                    stock,
                    demand,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Instance {
        let shared = Point::new(6.0, 8.0);
        Instance::new(
            InstanceMeta::default(),
            vec![Garage::new("G1", Point::new(0.0, 0.0))],
            vec![Depot::new("D1", Point::new(3.0, 4.0))
                .with_stock(Product::Gasoline, 1000)
                .with_stock(Product::Diesel, 1000)],
            vec![
                DemandNode::new(1, Product::Gasoline, 300, shared),
                DemandNode::new(1, Product::Diesel, 200, shared),
            ],
            vec![Truck::new("K1", 400), Truck::new("K2", 400)],
        )
    }

    #[test]
    fn test_node_layout() {
        let inst = sample();
        assert_eq!(inst.num_nodes(), 4);
        assert_eq!(inst.garage_nodes(), 0..1);
        assert_eq!(inst.depot_nodes(), 1..2);
        assert_eq!(inst.demand_nodes(), 2..4);
        assert_eq!(inst.depot_node(0), 1);
        assert_eq!(inst.demand_node(1), 3);
        assert_eq!(inst.node_id(3), "S1_D");
        assert_eq!(inst.node_index("D1"), Some(1));
        assert_eq!(inst.node_index("nope"), None);
        assert!(inst.is_garage(0));
        assert!(!inst.is_garage(1));
    }

    #[test]
    fn test_aggregates() {
        let inst = sample();
        assert_eq!(inst.total_demand(), 500);
        assert_eq!(inst.demand_for(Product::Gasoline), 300);
        assert_eq!(inst.stock_for(Product::Diesel), 1000);
        assert_eq!(inst.fleet_capacity(), 800);
    }

    #[test]
    fn test_colocated_distance_zero() {
        let inst = sample();
        assert_eq!(inst.distance(2, 3), 0.0);
        assert_eq!(inst.distance(1, 2), 5.0);
    }

    #[test]
    fn test_validate_ok() {
        assert_eq!(sample().validate(), Ok(()));
    }

    #[test]
    fn test_validate_no_depots() {
        let inst = Instance::new(
            InstanceMeta::default(),
            vec![Garage::new("G1", Point::new(0.0, 0.0))],
            vec![],
            vec![DemandNode::new(1, Product::Gasoline, 300, Point::new(1.0, 1.0))],
            vec![Truck::new("K1", 400)],
        );
        assert_eq!(
            inst.validate(),
            Err(InstanceError::NoDepots { demand: 300 })
        );
    }

    #[test]
    fn test_validate_unknown_garage() {
        let inst = Instance::new(
            InstanceMeta::default(),
            vec![Garage::new("G1", Point::new(0.0, 0.0))],
            vec![],
            vec![],
            vec![Truck::new("K1", 400).with_home_garage(3)],
        );
        assert!(matches!(
            inst.validate(),
            Err(InstanceError::UnknownHomeGarage { garage: 3, .. })
        ));
    }

    #[test]
    fn test_validate_duplicate_id() {
        let inst = Instance::new(
            InstanceMeta::default(),
            vec![
                Garage::new("G1", Point::new(0.0, 0.0)),
                Garage::new("G1", Point::new(1.0, 0.0)),
            ],
            vec![],
            vec![],
            vec![],
        );
        assert_eq!(
            inst.validate(),
            Err(InstanceError::DuplicateId("G1".into()))
        );
    }

    #[test]
    fn test_validate_split_station() {
        let inst = Instance::new(
            InstanceMeta::default(),
            vec![Garage::new("G1", Point::new(0.0, 0.0))],
            vec![Depot::new("D1", Point::new(3.0, 4.0))
                .with_stock(Product::Gasoline, 1000)
                .with_stock(Product::Diesel, 1000)],
            vec![
                DemandNode::new(1, Product::Gasoline, 300, Point::new(6.0, 8.0)),
                DemandNode::new(1, Product::Diesel, 200, Point::new(6.0, 8.5)),
            ],
            vec![Truck::new("K1", 400), Truck::new("K2", 400)],
        );
        assert_eq!(
            inst.validate(),
            Err(InstanceError::SplitStation { station: 1 })
        );
    }

    #[test]
    fn test_validate_demand_exceeds_capacity() {
        let inst = Instance::new(
            InstanceMeta::default(),
            vec![Garage::new("G1", Point::new(0.0, 0.0))],
            vec![Depot::new("D1", Point::new(3.0, 4.0)).with_stock(Product::Gasoline, 1000)],
            vec![DemandNode::new(1, Product::Gasoline, 500, Point::new(6.0, 8.0))],
            vec![Truck::new("K1", 400), Truck::new("K2", 400)],
        );
        assert!(matches!(
            inst.validate(),
            Err(InstanceError::DemandExceedsCapacity { demand: 500, capacity: 400, .. })
        ));
    }

    #[test]
    fn test_validate_insufficient_stock() {
        let inst = Instance::new(
            InstanceMeta::default(),
            vec![Garage::new("G1", Point::new(0.0, 0.0))],
            vec![Depot::new("D1", Point::new(3.0, 4.0)).with_stock(Product::Gasoline, 100)],
            vec![DemandNode::new(1, Product::Gasoline, 300, Point::new(6.0, 8.0))],
            vec![Truck::new("K1", 400)],
        );
        assert_eq!(
            inst.validate(),
            Err(InstanceError::InsufficientStock {
                product: Product::Gasoline,
                stock: 100,
                demand: 300,
            })
        );
    }

    #[test]
    fn test_validate_bad_distance_table() {
        let base = sample();
        let mut table = base.distances().clone();
        table.set(0, 1, 42.0);
        let inst = Instance::with_distances(
            base.meta().clone(),
            base.garages().to_vec(),
            base.depots().to_vec(),
            base.stations().to_vec(),
            base.fleet().to_vec(),
            table,
        );
        assert!(matches!(
            inst.validate(),
            Err(InstanceError::InvalidDistance { .. })
        ));

        let short = Instance::with_distances(
            base.meta().clone(),
            base.garages().to_vec(),
            base.depots().to_vec(),
            base.stations().to_vec(),
            base.fleet().to_vec(),
            DistanceTable::new(2),
        );
        assert_eq!(
            short.validate(),
            Err(InstanceError::DistanceTableSize {
                expected: 4,
                actual: 2,
            })
        );
    }
}
