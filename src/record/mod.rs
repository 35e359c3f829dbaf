//! JSON interchange records.
//!
//! - [`InstanceRecord`] — sites, fleet, distance matrix and site index map;
//!   converts to and from [`Instance`](crate::models::Instance)
//! - [`SolutionRecord`] — routes, anomalies and fleet results of one solve

mod instance_record;
mod solution_record;

pub use instance_record::{
    DepotRecord, InstanceRecord, MetaRecord, SiteIndexMap, SiteRecord, SitesRecord,
    StationRecord, TruckRecord,
};
pub use solution_record::{
    AnomalyRecord, ResultsRecord, RouteRecord, SolutionMeta, SolutionRecord,
};
