//! Solver contract: limits in, status and assignment out.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::milp::{Assignment, RoutingModel};

/// Budget for one solve call.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tanker_routing::solver::SolveLimits;
///
/// let limits = SolveLimits::new(Duration::from_secs(300));
/// let cancel = limits.cancel_flag();
/// cancel.store(true, std::sync::atomic::Ordering::Relaxed);
/// assert!(limits.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct SolveLimits {
    time_limit: Duration,
    cancel: Arc<AtomicBool>,
}

impl SolveLimits {
    /// Limits with a wall-clock budget and a fresh cancellation flag.
    pub fn new(time_limit: Duration) -> Self {
        Self {
            time_limit,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shares an existing cancellation flag.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }

    /// Flag that aborts an in-flight solve when set.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Returns `true` once the solve started at `started` must stop.
    pub fn should_stop(&self, started: Instant) -> bool {
        self.is_cancelled() || started.elapsed() >= self.time_limit
    }
}

impl Default for SolveLimits {
    /// 300 seconds, the usual budget for a full MILP solve.
    fn default() -> Self {
        Self::new(Duration::from_secs(300))
    }
}

/// Terminal status of a solve call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// Proven optimal solution.
    Optimal,
    /// Best solution found within the budget; optimality not proven.
    Feasible,
    /// The model has no feasible solution.
    Infeasible,
    /// Budget exhausted or cancelled before any solution was found.
    TimedOut,
    /// Stopped inside the budget with neither a solution nor a proof of
    /// infeasibility.
    NotSolved,
}

impl SolveStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Feasible => "feasible",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::TimedOut => "timed_out",
            SolveStatus::NotSolved => "not_solved",
        }
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a solve call.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    /// Terminal status.
    pub status: SolveStatus,
    /// Incumbent assignment; present for `Optimal` and `Feasible`.
    pub assignment: Option<Assignment>,
    /// Objective value of the incumbent.
    pub objective: Option<f64>,
    /// Wall-clock time spent in the solver.
    pub elapsed: Duration,
}

impl SolveOutcome {
    /// Outcome carrying an incumbent.
    pub fn solved(
        model: &RoutingModel,
        status: SolveStatus,
        assignment: Assignment,
        elapsed: Duration,
    ) -> Self {
        Self {
            status,
            objective: Some(model.objective_value(&assignment)),
            assignment: Some(assignment),
            elapsed,
        }
    }

    /// Outcome without an incumbent.
    pub fn unsolved(status: SolveStatus, elapsed: Duration) -> Self {
        Self {
            status,
            assignment: None,
            objective: None,
            elapsed,
        }
    }

    /// Returns `true` only for a proven optimum.
    pub fn optimality_guaranteed(&self) -> bool {
        self.status == SolveStatus::Optimal
    }
}

/// A MILP solver.
///
/// Implementations must return within [`SolveLimits::time_limit`] and
/// abort to [`SolveStatus::TimedOut`] (or `Feasible` with an incumbent)
/// when the budget runs out or the cancellation flag is raised.
/// `TimedOut` is reserved for that case; a solver that gives up early
/// reports [`SolveStatus::NotSolved`].
pub trait Solver {
    fn solve(&self, model: &RoutingModel, limits: &SolveLimits) -> SolveOutcome;
}
