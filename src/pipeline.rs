//! End-to-end planning: build → solve → decode → record.

use tracing::info;

use crate::decoder::{decode, DecodedSolution};
use crate::error::ModelError;
use crate::milp::RoutingModel;
use crate::models::Instance;
use crate::record::SolutionRecord;
use crate::solver::{SolveLimits, SolveOutcome, Solver};

/// Everything one planning run produced.
#[derive(Debug, Clone)]
pub struct PlanReport {
    /// The model handed to the solver.
    pub model: RoutingModel,
    /// Solver status, incumbent and timing.
    pub outcome: SolveOutcome,
    /// Decoded routes; `None` when the solver returned no incumbent.
    pub decoded: Option<DecodedSolution>,
    /// Serializable summary of the run.
    pub record: SolutionRecord,
}

/// Builds the model of `instance`, solves it within `limits` and decodes
/// the result.
///
/// Only an invalid instance (or a solver returning an assignment of the
/// wrong shape) is an error. Infeasible and timed-out solves complete
/// normally; their status is carried in the report.
///
/// # Examples
///
/// ```
/// use tanker_routing::generator::{GeneratorConfig, InstanceGenerator};
/// use tanker_routing::pipeline::plan;
/// use tanker_routing::solver::{GreedySolver, SolveLimits, SolveStatus};
///
/// let instance = InstanceGenerator::new(GeneratorConfig::easy())
///     .unwrap()
///     .generate(3)
///     .unwrap();
/// let report = plan("easy_3", &instance, &GreedySolver::new(&instance), &SolveLimits::default())
///     .unwrap();
/// assert_eq!(report.record.meta.status, SolveStatus::Feasible);
/// assert!(report.decoded.is_some());
/// ```
pub fn plan<S>(
    name: &str,
    instance: &Instance,
    solver: &S,
    limits: &SolveLimits,
) -> Result<PlanReport, ModelError>
where
    S: Solver + ?Sized,
{
    let model = RoutingModel::build(instance)?;
    let outcome = solver.solve(&model, limits);
    info!(
        instance = name,
        status = %outcome.status,
        objective = outcome.objective,
        elapsed_ms = outcome.elapsed.as_millis() as u64,
        "solve finished"
    );

    let decoded = outcome
        .assignment
        .as_ref()
        .map(|a| decode(instance, &model, a))
        .transpose()?;
    let record = SolutionRecord::new(name, instance, &outcome, decoded.as_ref());

    Ok(PlanReport {
        model,
        outcome,
        decoded,
        record,
    })
}
