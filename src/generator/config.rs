//! Generator configuration.
//!
//! [`GeneratorConfig`] holds every parameter that shapes a generated
//! instance: site counts, demand range, fleet sizing and safety margins.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::Difficulty;

/// Configuration for [`InstanceGenerator`](super::InstanceGenerator).
///
/// The fleet is homogeneous: one truck per single-product load (demand
/// packed first-fit decreasing at `truck_capacity`, never fewer than
/// `ceil(total_demand / truck_capacity)`) plus `truck_margin` spares.
///
/// # Presets
///
/// ```
/// use tanker_routing::generator::GeneratorConfig;
///
/// let easy = GeneratorConfig::easy();
/// assert_eq!(easy.num_stations, 5);
/// assert!(easy.validate().is_ok());
/// ```
///
/// # Builder Pattern
///
/// ```
/// use tanker_routing::generator::GeneratorConfig;
///
/// let config = GeneratorConfig::medium()
///     .with_stations(8)
///     .with_demand_range(500, 1500)
///     .with_truck_capacity(6000);
/// assert_eq!(config.max_demand, 1500);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Difficulty label written into the instance metadata.
    pub difficulty: Difficulty,

    /// Number of garages.
    pub num_garages: usize,

    /// Number of depots.
    pub num_depots: usize,

    /// Number of physical stations (each yields one or two demand nodes).
    pub num_stations: usize,

    /// Smallest demand drawn for a demand node (inclusive).
    pub min_demand: i32,

    /// Largest demand drawn for a demand node (inclusive).
    pub max_demand: i32,

    /// Capacity of every truck.
    pub truck_capacity: i32,

    /// Extra trucks on top of the minimum fleet.
    pub truck_margin: usize,

    /// Multiplier applied to aggregate demand when sizing depot stock.
    ///
    /// Must be greater than 1.0.
    pub stock_margin: f64,

    /// Probability that a physical station requests a given product.
    pub product_probability: f64,

    /// Side length of the square grid sites are placed on.
    pub grid_size: f64,
}

impl GeneratorConfig {
    /// One garage, one depot, five stations on a 50×50 grid.
    pub fn easy() -> Self {
        Self {
            difficulty: Difficulty::Easy,
            num_garages: 1,
            num_depots: 1,
            num_stations: 5,
            min_demand: 1000,
            max_demand: 3000,
            truck_capacity: 15000,
            truck_margin: 3,
            stock_margin: 1.5,
            product_probability: 0.6,
            grid_size: 50.0,
        }
    }

    /// Two garages, two depots, fifteen stations on a 100×100 grid.
    pub fn medium() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            num_garages: 2,
            num_depots: 2,
            num_stations: 15,
            min_demand: 2000,
            max_demand: 5000,
            truck_capacity: 20000,
            truck_margin: 2,
            grid_size: 100.0,
            ..Self::easy()
        }
    }

    /// Three garages, three depots, forty stations on a 200×200 grid, no
    /// spare trucks.
    pub fn hard() -> Self {
        Self {
            difficulty: Difficulty::Hard,
            num_garages: 3,
            num_depots: 3,
            num_stations: 40,
            min_demand: 3000,
            max_demand: 8000,
            truck_capacity: 25000,
            truck_margin: 0,
            grid_size: 200.0,
            ..Self::easy()
        }
    }

    /// Returns the preset for a difficulty; `Custom` maps to the easy values.
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self::easy(),
            Difficulty::Medium => Self::medium(),
            Difficulty::Hard => Self::hard(),
            Difficulty::Custom => Self {
                difficulty: Difficulty::Custom,
                ..Self::easy()
            },
        }
    }

    /// Sets the number of garages.
    pub fn with_garages(mut self, n: usize) -> Self {
        self.num_garages = n;
        self
    }

    /// Sets the number of depots.
    pub fn with_depots(mut self, n: usize) -> Self {
        self.num_depots = n;
        self
    }

    /// Sets the number of physical stations.
    pub fn with_stations(mut self, n: usize) -> Self {
        self.num_stations = n;
        self
    }

    /// Sets the inclusive demand range.
    pub fn with_demand_range(mut self, min: i32, max: i32) -> Self {
        self.min_demand = min;
        self.max_demand = max;
        self
    }

    /// Sets the capacity of every truck.
    pub fn with_truck_capacity(mut self, capacity: i32) -> Self {
        self.truck_capacity = capacity;
        self
    }

    /// Sets the number of spare trucks.
    pub fn with_truck_margin(mut self, margin: usize) -> Self {
        self.truck_margin = margin;
        self
    }

    /// Sets the stock safety margin.
    pub fn with_stock_margin(mut self, margin: f64) -> Self {
        self.stock_margin = margin;
        self
    }

    /// Sets the per-product presence probability.
    pub fn with_product_probability(mut self, p: f64) -> Self {
        self.product_probability = p;
        self
    }

    /// Sets the grid side length.
    pub fn with_grid_size(mut self, size: f64) -> Self {
        self.grid_size = size;
        self
    }

    /// Checks the configuration before any random draw.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_garages == 0 {
            return Err(ConfigError::NoGarages);
        }
        if self.num_depots == 0 {
            return Err(ConfigError::NoDepots);
        }
        if self.num_stations == 0 {
            return Err(ConfigError::NoStations);
        }
        if self.min_demand <= 0 || self.min_demand > self.max_demand {
            return Err(ConfigError::InvalidDemandRange {
                min: self.min_demand,
                max: self.max_demand,
            });
        }
        if self.truck_capacity <= 0 {
            return Err(ConfigError::NonPositiveCapacity(self.truck_capacity));
        }
        if self.max_demand > self.truck_capacity {
            return Err(ConfigError::DemandExceedsCapacity {
                max_demand: self.max_demand,
                capacity: self.truck_capacity,
            });
        }
        // NaN fails both comparisons.
        if !(self.stock_margin > 1.0 && self.stock_margin.is_finite()) {
            return Err(ConfigError::StockMarginTooSmall(self.stock_margin));
        }
        if !(0.0..=1.0).contains(&self.product_probability) {
            return Err(ConfigError::InvalidProbability(self.product_probability));
        }
        if !(self.grid_size > 0.0 && self.grid_size.is_finite()) {
            return Err(ConfigError::InvalidGridSize(self.grid_size));
        }
        Ok(())
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::easy()
    }
}
