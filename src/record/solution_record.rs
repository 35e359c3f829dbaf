//! JSON form of a decoded solution.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::decoder::{DecodedSolution, TruckOutcome};
use crate::error::RecordError;
use crate::models::{Instance, Product};
use crate::solver::{SolveOutcome, SolveStatus};

/// Run metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionMeta {
    /// Name of the instance the solution belongs to.
    pub instance: String,
    pub status: SolveStatus,
    pub optimality_guaranteed: bool,
    pub solve_time_sec: f64,
}

/// Fleet-wide figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsRecord {
    pub total_distance: f64,
    pub trucks_used: usize,
    pub trucks_available: usize,
    pub total_load: f64,
    pub utilization_pct: f64,
    pub depots_used: Vec<String>,
}

/// One closed route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub truck: String,
    /// Node ids in visiting order.
    pub route: Vec<String>,
    pub product: Option<Product>,
    pub depot: Option<String>,
    /// Number of demand nodes served.
    pub stations: usize,
    pub distance: f64,
    pub load: f64,
    pub fill_rate_pct: f64,
}

/// One truck whose arcs did not close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub truck: String,
    pub partial_route: Vec<String>,
    pub distance: f64,
    pub reason: String,
}

/// Serialized solve result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionRecord {
    pub meta: SolutionMeta,
    pub results: ResultsRecord,
    pub routes: Vec<RouteRecord>,
    #[serde(default)]
    pub anomalies: Vec<AnomalyRecord>,
}

impl SolutionRecord {
    /// Builds the record of one solve. Without a decoded solution (no
    /// incumbent) the results are zero and no route is listed.
    pub fn new(
        instance_name: impl Into<String>,
        instance: &Instance,
        outcome: &SolveOutcome,
        decoded: Option<&DecodedSolution>,
    ) -> Self {
        let meta = SolutionMeta {
            instance: instance_name.into(),
            status: outcome.status,
            optimality_guaranteed: outcome.optimality_guaranteed(),
            solve_time_sec: outcome.elapsed.as_secs_f64(),
        };

        let Some(decoded) = decoded else {
            return Self {
                meta,
                results: ResultsRecord {
                    total_distance: 0.0,
                    trucks_used: 0,
                    trucks_available: instance.fleet().len(),
                    total_load: 0.0,
                    utilization_pct: 0.0,
                    depots_used: Vec::new(),
                },
                routes: Vec::new(),
                anomalies: Vec::new(),
            };
        };

        let ids = |nodes: &[usize]| -> Vec<String> {
            nodes.iter().map(|&n| instance.node_id(n).to_string()).collect()
        };
        let mut routes = Vec::new();
        let mut anomalies = Vec::new();
        for truck_outcome in decoded.trucks() {
            match truck_outcome {
                TruckOutcome::Unused => {}
                TruckOutcome::Closed(route) => {
                    let truck = &instance.fleet()[route.truck()];
                    routes.push(RouteRecord {
                        truck: truck.id().to_string(),
                        route: ids(route.nodes()),
                        product: route.product(),
                        depot: route.depot().map(|d| instance.depots()[d].id().to_string()),
                        stations: route.stations().len(),
                        distance: route.distance(),
                        load: route.load(),
                        fill_rate_pct: route.load() / f64::from(truck.capacity()) * 100.0,
                    });
                }
                TruckOutcome::Anomaly(anomaly) => anomalies.push(AnomalyRecord {
                    truck: instance.fleet()[anomaly.truck()].id().to_string(),
                    partial_route: ids(anomaly.partial_route()),
                    distance: anomaly.distance(),
                    reason: anomaly.reason().to_string(),
                }),
            }
        }

        let m = decoded.metrics();
        Self {
            meta,
            results: ResultsRecord {
                total_distance: m.total_distance,
                trucks_used: m.trucks_used,
                trucks_available: m.trucks_available,
                total_load: m.total_load,
                utilization_pct: m.utilization * 100.0,
                depots_used: m
                    .depots_used
                    .iter()
                    .map(|&d| instance.depots()[d].id().to_string())
                    .collect(),
            },
            routes,
            anomalies,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that the record refers only to nodes and trucks of `instance`.
    ///
    /// Unknown ids are an error. A differing fleet size is returned as a
    /// warning, since the record may come from an edited instance.
    pub fn verify_against(&self, instance: &Instance) -> Result<Vec<String>, RecordError> {
        let known: BTreeSet<&str> = (0..instance.num_nodes())
            .map(|n| instance.node_id(n))
            .chain(instance.fleet().iter().map(|t| t.id()))
            .collect();

        let missing: BTreeSet<&str> = self
            .routes
            .iter()
            .flat_map(|r| r.route.iter().chain(std::iter::once(&r.truck)))
            .chain(
                self.anomalies
                    .iter()
                    .flat_map(|a| a.partial_route.iter().chain(std::iter::once(&a.truck))),
            )
            .map(String::as_str)
            .filter(|id| !known.contains(id))
            .collect();
        if !missing.is_empty() {
            return Err(RecordError::Incoherent(
                missing.into_iter().map(str::to_string).collect(),
            ));
        }

        let mut warnings = Vec::new();
        if self.results.trucks_available != instance.fleet().len() {
            let message = format!(
                "solution lists {} trucks, instance has {}",
                self.results.trucks_available,
                instance.fleet().len()
            );
            warn!(%message, "solution and instance disagree");
            warnings.push(message);
        }
        Ok(warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode;
    use crate::generator::{GeneratorConfig, InstanceGenerator};
    use crate::milp::RoutingModel;
    use crate::solver::{GreedySolver, SolveLimits, Solver};
    use std::time::Duration;

    fn solved() -> (Instance, SolutionRecord) {
        let inst = InstanceGenerator::new(GeneratorConfig::easy())
            .unwrap()
            .generate(21)
            .unwrap();
        let model = RoutingModel::build(&inst).unwrap();
        let outcome = GreedySolver::new(&inst).solve(&model, &SolveLimits::default());
        let decoded = decode(&inst, &model, outcome.assignment.as_ref().unwrap()).unwrap();
        let record = SolutionRecord::new("easy_21", &inst, &outcome, Some(&decoded));
        (inst, record)
    }

    #[test]
    fn test_record_contents() {
        let (inst, record) = solved();
        assert_eq!(record.meta.instance, "easy_21");
        assert_eq!(record.meta.status, SolveStatus::Feasible);
        assert!(!record.meta.optimality_guaranteed);
        assert_eq!(record.results.trucks_available, inst.fleet().len());
        assert_eq!(record.results.trucks_used, record.routes.len());
        let served: usize = record.routes.iter().map(|r| r.stations).sum();
        assert_eq!(served, inst.stations().len());
        for route in &record.routes {
            assert_eq!(route.route.first(), route.route.last());
            assert!(route.fill_rate_pct > 0.0 && route.fill_rate_pct <= 100.0);
        }
        assert!(record.anomalies.is_empty());
    }

    #[test]
    fn test_json_round_trip() {
        let (_, record) = solved();
        let json = record.to_json_string().unwrap();
        assert!(json.contains("\"optimality_guaranteed\": false"));
        assert_eq!(SolutionRecord::from_json_str(&json).unwrap(), record);
    }

    #[test]
    fn test_verify_against() {
        let (inst, mut record) = solved();
        assert_eq!(record.verify_against(&inst).unwrap(), Vec::<String>::new());

        record.results.trucks_available += 1;
        assert_eq!(record.verify_against(&inst).unwrap().len(), 1);

        record.routes[0].route.insert(1, "D42".into());
        assert!(matches!(
            record.verify_against(&inst),
            Err(RecordError::Incoherent(ids)) if ids == vec!["D42".to_string()]
        ));
    }

    #[test]
    fn test_unsolved_record() {
        let inst = InstanceGenerator::new(GeneratorConfig::easy())
            .unwrap()
            .generate(1)
            .unwrap();
        let outcome = SolveOutcome::unsolved(SolveStatus::TimedOut, Duration::from_millis(5));
        let record = SolutionRecord::new("easy_1", &inst, &outcome, None);
        assert_eq!(record.meta.status, SolveStatus::TimedOut);
        assert!(record.routes.is_empty());
        assert_eq!(record.results.trucks_available, inst.fleet().len());
    }
}
