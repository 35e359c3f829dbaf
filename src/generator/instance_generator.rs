//! Seeded instance generation with feasibility margins.
//!
//! Construction order matters: demand is drawn first, then depot stock and
//! fleet size are derived from it, so supply covers demand whatever the
//! draws were. A truck carries one product on one trip, so the fleet is
//! sized from a per-product packing of demand into truck loads rather than
//! from total demand alone.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::error::{ConfigError, GenerationError};
use crate::geometry::Point;
use crate::models::{DemandNode, Depot, Garage, Instance, InstanceMeta, Product, Truck};
use crate::solver::first_fit_decreasing;

use super::GeneratorConfig;

/// Generates feasible tanker routing instances.
///
/// Every random draw goes through the RNG passed in (or seeded from the
/// `seed` argument), so the same configuration and seed always produce the
/// same instance.
///
/// # Examples
///
/// ```
/// use tanker_routing::generator::{GeneratorConfig, InstanceGenerator};
///
/// let generator = InstanceGenerator::new(GeneratorConfig::easy()).unwrap();
/// let a = generator.generate(42).unwrap();
/// let b = generator.generate(42).unwrap();
/// assert_eq!(a, b);
/// assert!(a.fleet_capacity() >= a.total_demand());
/// ```
#[derive(Debug, Clone)]
pub struct InstanceGenerator {
    config: GeneratorConfig,
}

impl InstanceGenerator {
    /// Creates a generator, rejecting an invalid configuration.
    pub fn new(config: GeneratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates an instance from a seed.
    pub fn generate(&self, seed: u64) -> Result<Instance, GenerationError> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.build(&mut rng, Some(seed))
    }

    /// Generates an instance drawing from a caller-supplied RNG.
    pub fn generate_with_rng<R: Rng>(&self, rng: &mut R) -> Result<Instance, GenerationError> {
        self.build(rng, None)
    }

    fn build<R: Rng>(&self, rng: &mut R, seed: Option<u64>) -> Result<Instance, GenerationError> {
        let cfg = &self.config;
        let grid = cfg.grid_size;

        let garages: Vec<Garage> = (1..=cfg.num_garages)
            .map(|i| Garage::new(format!("G{i}"), Point::random_within(&mut *rng, grid, grid)))
            .collect();
        let depot_locations: Vec<Point> = (0..cfg.num_depots)
            .map(|_| Point::random_within(&mut *rng, grid, grid))
            .collect();
        let stations = self.generate_stations(rng);

        let depots = self.size_depots(&depot_locations, &stations);
        let fleet = self.size_fleet(&stations);

        let meta = InstanceMeta {
            difficulty: cfg.difficulty,
            description: format!(
                "Randomly generated {} instance",
                cfg.difficulty.as_str()
            ),
            seed,
        };
        let instance = Instance::new(meta, garages, depots, stations, fleet);
        check_margins(&instance)?;
        instance.validate()?;

        info!(
            seed,
            stations = cfg.num_stations,
            demand_nodes = instance.stations().len(),
            trucks = instance.fleet().len(),
            total_demand = instance.total_demand(),
            fleet_capacity = instance.fleet_capacity(),
            "generated instance"
        );
        Ok(instance)
    }

    /// Draws physical stations and expands them into demand nodes.
    ///
    /// Each product is present with `product_probability`; a station that
    /// drew no product gets exactly one, chosen uniformly.
    fn generate_stations<R: Rng>(&self, rng: &mut R) -> Vec<DemandNode> {
        let cfg = &self.config;
        let mut nodes = Vec::with_capacity(cfg.num_stations * Product::COUNT);

        for station in 1..=cfg.num_stations {
            let location = Point::random_within(rng, cfg.grid_size, cfg.grid_size);
            let before = nodes.len();

            for product in Product::ALL {
                if rng.random_bool(cfg.product_probability) {
                    let demand = rng.random_range(cfg.min_demand..=cfg.max_demand);
                    nodes.push(DemandNode::new(station, product, demand, location));
                }
            }

            if nodes.len() == before {
                let product = Product::ALL[rng.random_range(0..Product::COUNT)];
                let demand = rng.random_range(cfg.min_demand..=cfg.max_demand);
                nodes.push(DemandNode::new(station, product, demand, location));
            }
        }
        nodes
    }

    /// Splits `demand × stock_margin` evenly across depots, per product.
    ///
    /// The integer share never drops below `ceil(demand / depots)`, which
    /// keeps aggregate stock at or above aggregate demand for tiny demands.
    fn size_depots(&self, locations: &[Point], stations: &[DemandNode]) -> Vec<Depot> {
        let n = locations.len() as i64;
        let shares: Vec<i32> = Product::ALL
            .iter()
            .map(|&product| {
                let demand: i64 = stations
                    .iter()
                    .filter(|s| s.product() == product)
                    .map(|s| i64::from(s.demand()))
                    .sum();
                let with_margin = (demand as f64 * self.config.stock_margin) as i64 / n;
                let minimum = (demand + n - 1) / n;
                let share = with_margin.max(minimum);
                debug!(%product, demand, share, "depot stock share");
                i32::try_from(share).unwrap_or(i32::MAX)
            })
            .collect();

        locations
            .iter()
            .enumerate()
            .map(|(i, &location)| {
                Product::ALL.iter().fold(
                    Depot::new(format!("D{}", i + 1), location),
                    |depot, &product| depot.with_stock(product, shares[product.index()]),
                )
            })
            .collect()
    }

    /// Homogeneous fleet: one truck per packed load plus the configured
    /// margin, assigned round-robin to garages.
    ///
    /// The load count is never below `ceil(total_demand / capacity)`.
    fn size_fleet(&self, stations: &[DemandNode]) -> Vec<Truck> {
        let cfg = &self.config;
        let capacity = i64::from(cfg.truck_capacity);
        let total: i64 = stations.iter().map(|s| i64::from(s.demand())).sum();
        let by_total = ((total + capacity - 1) / capacity) as usize;
        let loads: usize = Product::ALL
            .iter()
            .map(|&product| {
                let items: Vec<(usize, i64)> = stations
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.product() == product)
                    .map(|(i, s)| (i, i64::from(s.demand())))
                    .collect();
                first_fit_decreasing(&items, capacity).len()
            })
            .sum();
        let num_trucks = by_total.max(loads) + cfg.truck_margin;
        debug!(total, by_total, loads, num_trucks, "fleet sizing");

        (0..num_trucks)
            .map(|i| {
                Truck::new(format!("K{}", i + 1), cfg.truck_capacity)
                    .with_home_garage(i % cfg.num_garages)
            })
            .collect()
    }
}

/// Fails fast if stock or fleet falls short of demand.
///
/// Besides aggregate capacity, the fleet must hold at least
/// `ceil(demand_p / capacity)` trucks per product, since no truck serves two
/// products.
fn check_margins(instance: &Instance) -> Result<(), GenerationError> {
    for product in Product::ALL {
        let stock = instance.stock_for(product);
        let demand = instance.demand_for(product);
        if stock < demand {
            return Err(GenerationError::InsufficientStock {
                product,
                stock,
                demand,
            });
        }
    }
    let capacity = instance.fleet_capacity();
    let demand = instance.total_demand();
    if capacity < demand {
        return Err(GenerationError::InsufficientFleet { capacity, demand });
    }

    let largest = instance
        .fleet()
        .iter()
        .map(|t| i64::from(t.capacity()))
        .max()
        .unwrap_or(0);
    if largest > 0 {
        let required: usize = Product::ALL
            .iter()
            .map(|&p| ((instance.demand_for(p) + largest - 1) / largest) as usize)
            .sum();
        if instance.fleet().len() < required {
            return Err(GenerationError::TooFewTrucks {
                trucks: instance.fleet().len(),
                required,
            });
        }
    }
    Ok(())
}
