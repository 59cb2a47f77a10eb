//! Solver interface for the edge model.

use super::{EdgeModel, LinearConstraint};

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverStatus {
    /// Proven optimal solution found.
    Optimal,
    /// Feasible (but not necessarily optimal) solution found.
    Feasible,
    /// No feasible solution exists.
    Infeasible,
    /// Model is invalid or malformed.
    ModelInvalid,
    /// Time or node limit reached without a solution.
    Timeout,
}

/// Solution from an exact solver.
#[derive(Debug, Clone)]
pub struct MipSolution {
    /// Solver status.
    pub status: SolverStatus,
    /// One value per edge position; empty when no solution was found.
    pub values: Vec<f64>,
    /// Objective value of `values`.
    pub objective_value: Option<f64>,
    /// Search nodes explored.
    pub nodes: u64,
    /// Integer candidates for which the lazy callback returned cuts.
    pub lazy_rounds: usize,
    /// Solve time in milliseconds.
    pub solve_time_ms: u64,
}

impl MipSolution {
    /// Creates an empty solution with the given status.
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            values: Vec::new(),
            objective_value: None,
            nodes: 0,
            lazy_rounds: 0,
            solve_time_ms: 0,
        }
    }

    /// Whether a feasible solution was found.
    pub fn is_solution_found(&self) -> bool {
        matches!(self.status, SolverStatus::Optimal | SolverStatus::Feasible)
    }
}

/// Solver configuration.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    /// Maximum solve time in milliseconds.
    pub time_limit_ms: u64,
    /// Maximum number of search nodes; `None` for unlimited.
    pub node_limit: Option<u64>,
    /// Stop after finding the first feasible solution.
    pub stop_after_first: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: 60_000,
            node_limit: None,
            stop_after_first: false,
        }
    }
}

impl SolverConfig {
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = Some(nodes.max(1));
        self
    }

    pub fn with_stop_after_first(mut self, stop: bool) -> Self {
        self.stop_after_first = stop;
        self
    }
}

/// Callback invoked on every integer candidate the solver finds.
///
/// Returning an empty vector accepts the candidate. Returned constraints are
/// added to the model as lazy rows and the candidate is rejected if it
/// violates any of them.
pub trait LazyConstraints {
    fn separate(&mut self, values: &[f64]) -> Vec<LinearConstraint>;
}

/// Accepts every candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLazyConstraints;

impl LazyConstraints for NoLazyConstraints {
    fn separate(&mut self, _values: &[f64]) -> Vec<LinearConstraint> {
        Vec::new()
    }
}

/// Trait for exact solver implementations.
///
/// Implementors minimize the model objective subject to the degree
/// equalities, the current variable bounds and the model's cuts, and
/// consult `lazy` on every integer candidate. Cuts produced by `lazy` are
/// appended to `model`, so they stay active for later solves.
///
/// This can wrap an external MIP solver or be the bundled
/// [`EnumerativeSolver`](super::EnumerativeSolver).
pub trait ExactSolver {
    fn solve(
        &self,
        model: &mut EdgeModel,
        config: &SolverConfig,
        lazy: &mut dyn LazyConstraints,
    ) -> MipSolution;
}
