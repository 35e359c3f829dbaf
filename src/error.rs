//! Error types for each pipeline stage.
//!
//! Generation and model-building errors are fatal: no partial instance or
//! model is ever returned. Solver-level outcomes (infeasible, timed out) are
//! not errors; they travel as [`SolveStatus`](crate::solver::SolveStatus).

use thiserror::Error;

use crate::models::Product;

/// Invalid generator configuration, rejected before any random draw.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("at least one garage is required")]
    NoGarages,
    #[error("at least one depot is required")]
    NoDepots,
    #[error("at least one physical station is required")]
    NoStations,
    #[error("invalid demand range [{min}, {max}]")]
    InvalidDemandRange { min: i32, max: i32 },
    #[error("truck capacity must be positive, got {0}")]
    NonPositiveCapacity(i32),
    #[error("maximum demand {max_demand} exceeds truck capacity {capacity}")]
    DemandExceedsCapacity { max_demand: i32, capacity: i32 },
    #[error("stock margin must be greater than 1.0, got {0}")]
    StockMarginTooSmall(f64),
    #[error("product probability must lie in [0, 1], got {0}")]
    InvalidProbability(f64),
    #[error("grid size must be positive and finite, got {0}")]
    InvalidGridSize(f64),
}

/// Failure while generating an instance.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("stock for {product} ({stock}) does not cover demand ({demand})")]
    InsufficientStock {
        product: Product,
        stock: i64,
        demand: i64,
    },
    #[error("fleet capacity {capacity} does not cover total demand {demand}")]
    InsufficientFleet { capacity: i64, demand: i64 },
    #[error("fleet has {trucks} trucks, single-product loads need at least {required}")]
    TooFewTrucks { trucks: usize, required: usize },
    #[error(transparent)]
    Instance(#[from] InstanceError),
}

/// A structurally invalid instance.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InstanceError {
    #[error("instance has trucks but no garage")]
    NoGarages,
    #[error("instance has demand {demand} but no depot")]
    NoDepots { demand: i64 },
    #[error("duplicate node or truck id {0}")]
    DuplicateId(String),
    #[error("demand node {id} has non-positive demand {demand}")]
    NonPositiveDemand { id: String, demand: i32 },
    #[error("truck {id} has non-positive capacity {capacity}")]
    NonPositiveCapacity { id: String, capacity: i32 },
    #[error("depot {id} has negative stock {stock} for {product}")]
    NegativeStock {
        id: String,
        product: Product,
        stock: i32,
    },
    #[error("truck {truck} refers to unknown garage index {garage}")]
    UnknownHomeGarage { truck: String, garage: usize },
    #[error("demand node {id} needs {demand} but the smallest truck holds {capacity}")]
    DemandExceedsCapacity {
        id: String,
        demand: i32,
        capacity: i32,
    },
    #[error("fleet capacity {capacity} does not cover total demand {demand}")]
    InsufficientFleet { capacity: i64, demand: i64 },
    #[error("stock for {product} ({stock}) does not cover demand ({demand})")]
    InsufficientStock {
        product: Product,
        stock: i64,
        demand: i64,
    },
    #[error("demand nodes of physical station {station} do not share coordinates")]
    SplitStation { station: usize },
    #[error("distance table covers {actual} nodes, expected {expected}")]
    DistanceTableSize { expected: usize, actual: usize },
    #[error("invalid distance {value} between {from} and {to}")]
    InvalidDistance { from: String, to: String, value: f64 },
}

/// Failure while building or querying a routing model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("invalid instance: {0}")]
    Instance(#[from] InstanceError),
    #[error("assignment has {actual} values, model has {expected} variables")]
    AssignmentSize { expected: usize, actual: usize },
    #[error("unknown variable {0}")]
    UnknownVariable(String),
    #[error("variable {name} has non-finite value {value}")]
    NonFiniteValue { name: String, value: f64 },
    #[error("model was built from a different instance")]
    LayoutMismatch,
}

/// Failure while reading or checking an interchange record.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("truck {truck} refers to unknown garage {garage}")]
    UnknownGarage { truck: String, garage: String },
    #[error("site {id} is mapped to index {found}, expected {expected}")]
    IndexMismatch {
        id: String,
        expected: usize,
        found: usize,
    },
    #[error("site {0} is missing from the site index map")]
    MissingIndex(String),
    #[error("distance matrix is not square over {nodes} nodes")]
    MatrixShape { nodes: usize },
    #[error(transparent)]
    Instance(#[from] InstanceError),
    #[error("solution references nodes missing from the instance: {0:?}")]
    Incoherent(Vec<String>),
}
