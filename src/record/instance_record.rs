//! JSON form of an [`Instance`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::distance::DistanceTable;
use crate::error::RecordError;
use crate::geometry::Point;
use crate::models::{
    DemandNode, Depot, Difficulty, Garage, Instance, InstanceMeta, Product, Truck,
};

/// Instance metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaRecord {
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// A garage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteRecord {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

/// A depot with its stock per product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepotRecord {
    pub id: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub stock_gasoline: i32,
    #[serde(default)]
    pub stock_diesel: i32,
}

/// A product-specific demand node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    pub id: String,
    pub physical_station: usize,
    pub product: Product,
    pub demand: i32,
    pub x: f64,
    pub y: f64,
}

/// All sites, grouped by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitesRecord {
    pub garages: Vec<SiteRecord>,
    pub depots: Vec<DepotRecord>,
    pub stations: Vec<StationRecord>,
}

/// A truck; `home_garage` is a garage id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruckRecord {
    pub id: String,
    pub capacity: i32,
    pub home_garage: String,
}

/// Site id → distance-matrix index, per site kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SiteIndexMap {
    pub garages: BTreeMap<String, usize>,
    pub depots: BTreeMap<String, usize>,
    pub stations: BTreeMap<String, usize>,
}

impl SiteIndexMap {
    /// Returns `true` when no site kind lists any id.
    pub fn is_empty(&self) -> bool {
        self.garages.is_empty() && self.depots.is_empty() && self.stations.is_empty()
    }
}

/// Serialized instance.
///
/// Sites are listed in node order and `distance_matrix` uses that order.
/// An empty matrix is recomputed from coordinates on load; an empty
/// `site_index_map` is not checked.
///
/// # Examples
///
/// ```
/// use tanker_routing::generator::{GeneratorConfig, InstanceGenerator};
/// use tanker_routing::models::Instance;
/// use tanker_routing::record::InstanceRecord;
///
/// let instance = InstanceGenerator::new(GeneratorConfig::easy())
///     .unwrap()
///     .generate(11)
///     .unwrap();
/// let json = InstanceRecord::from(&instance).to_json_string().unwrap();
/// let back = Instance::try_from(InstanceRecord::from_json_str(&json).unwrap()).unwrap();
/// assert_eq!(back, instance);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub meta: MetaRecord,
    pub sites: SitesRecord,
    #[serde(alias = "flotte")]
    pub fleet: Vec<TruckRecord>,
    #[serde(default)]
    pub distance_matrix: Vec<Vec<f64>>,
    #[serde(default)]
    pub site_index_map: SiteIndexMap,
}

impl InstanceRecord {
    pub fn from_json_str(json: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks every site against `site_index_map`. A map that lists any
    /// id must list all of them.
    fn check_index_map(&self) -> Result<(), RecordError> {
        if self.site_index_map.is_empty() {
            return Ok(());
        }
        let g = self.sites.garages.len();
        let d = self.sites.depots.len();
        let expected = self
            .sites
            .garages
            .iter()
            .enumerate()
            .map(|(i, s)| (&self.site_index_map.garages, s.id.as_str(), i))
            .chain(
                self.sites
                    .depots
                    .iter()
                    .enumerate()
                    .map(|(i, s)| (&self.site_index_map.depots, s.id.as_str(), g + i)),
            )
            .chain(
                self.sites
                    .stations
                    .iter()
                    .enumerate()
                    .map(|(i, s)| (&self.site_index_map.stations, s.id.as_str(), g + d + i)),
            );
        for (map, id, index) in expected {
            match map.get(id) {
                None => return Err(RecordError::MissingIndex(id.to_string())),
                Some(&found) if found != index => {
                    return Err(RecordError::IndexMismatch {
                        id: id.to_string(),
                        expected: index,
                        found,
                    })
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

impl From<&Instance> for InstanceRecord {
    fn from(instance: &Instance) -> Self {
        let garages: Vec<SiteRecord> = instance
            .garages()
            .iter()
            .map(|g| SiteRecord {
                id: g.id().to_string(),
                x: g.location().x(),
                y: g.location().y(),
            })
            .collect();
        let depots: Vec<DepotRecord> = instance
            .depots()
            .iter()
            .map(|d| DepotRecord {
                id: d.id().to_string(),
                x: d.location().x(),
                y: d.location().y(),
                stock_gasoline: d.stock(Product::Gasoline),
                stock_diesel: d.stock(Product::Diesel),
            })
            .collect();
        let stations: Vec<StationRecord> = instance
            .stations()
            .iter()
            .map(|s| StationRecord {
                id: s.id().to_string(),
                physical_station: s.station(),
                product: s.product(),
                demand: s.demand(),
                x: s.location().x(),
                y: s.location().y(),
            })
            .collect();
        let fleet = instance
            .fleet()
            .iter()
            .map(|t| TruckRecord {
                id: t.id().to_string(),
                capacity: t.capacity(),
                home_garage: instance.garages()[t.home_garage()].id().to_string(),
            })
            .collect();

        let site_index_map = SiteIndexMap {
            garages: instance
                .garage_nodes()
                .map(|n| (instance.node_id(n).to_string(), n))
                .collect(),
            depots: instance
                .depot_nodes()
                .map(|n| (instance.node_id(n).to_string(), n))
                .collect(),
            stations: instance
                .demand_nodes()
                .map(|n| (instance.node_id(n).to_string(), n))
                .collect(),
        };

        let meta = instance.meta();
        Self {
            meta: MetaRecord {
                difficulty: meta.difficulty,
                description: meta.description.clone(),
                seed: meta.seed,
            },
            sites: SitesRecord {
                garages,
                depots,
                stations,
            },
            fleet,
            distance_matrix: instance.distances().to_rows(),
            site_index_map,
        }
    }
}

impl TryFrom<InstanceRecord> for Instance {
    type Error = RecordError;

    /// Rebuilds and validates an instance.
    fn try_from(record: InstanceRecord) -> Result<Self, Self::Error> {
        record.check_index_map()?;

        let garage_index: BTreeMap<&str, usize> = record
            .sites
            .garages
            .iter()
            .enumerate()
            .map(|(i, g)| (g.id.as_str(), i))
            .collect();
        let fleet = record
            .fleet
            .iter()
            .map(|t| {
                garage_index
                    .get(t.home_garage.as_str())
                    .map(|&g| Truck::new(t.id.clone(), t.capacity).with_home_garage(g))
                    .ok_or_else(|| RecordError::UnknownGarage {
                        truck: t.id.clone(),
                        garage: t.home_garage.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let garages = record
            .sites
            .garages
            .iter()
            .map(|g| Garage::new(g.id.clone(), Point::new(g.x, g.y)))
            .collect();
        let depots = record
            .sites
            .depots
            .iter()
            .map(|d| {
                Depot::new(d.id.clone(), Point::new(d.x, d.y))
                    .with_stock(Product::Gasoline, d.stock_gasoline)
                    .with_stock(Product::Diesel, d.stock_diesel)
            })
            .collect();
        let stations = record
            .sites
            .stations
            .iter()
            .map(|s| {
                DemandNode::new(s.physical_station, s.product, s.demand, Point::new(s.x, s.y))
                    .with_id(s.id.clone())
            })
            .collect();
        let meta = InstanceMeta {
            difficulty: record.meta.difficulty,
            description: record.meta.description,
            seed: record.meta.seed,
        };

        let instance = if record.distance_matrix.is_empty() {
            Instance::new(meta, garages, depots, stations, fleet)
        } else {
            let nodes = record.distance_matrix.len();
            let table = DistanceTable::from_rows(&record.distance_matrix)
                .ok_or(RecordError::MatrixShape { nodes })?;
            Instance::with_distances(meta, garages, depots, stations, fleet, table)
        };
        instance.validate()?;
        Ok(instance)
    }
}
