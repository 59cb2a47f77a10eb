//! Branch-and-cut with lazy subtour elimination.
//!
//! The exact solver works on the degree-only relaxation of the edge model.
//! Every integer candidate it finds is passed to a [`SubtourSeparator`]; if
//! the candidate decomposes into several cycles, one cut per closed short
//! cycle is returned and the solver keeps searching. A candidate that forms
//! a single Hamiltonian cycle is accepted unchanged.
//!
//! # Examples
//!
//! ```
//! use u_tsp::branch_cut::BranchAndCut;
//! use u_tsp::instance::{Instance, Metric, Point};
//! use u_tsp::model::{EdgeModel, EnumerativeSolver, SolverConfig};
//!
//! let points = vec![
//!     Point::new(0.0, 0.0),
//!     Point::new(1.0, 0.0),
//!     Point::new(1.0, 1.0),
//!     Point::new(0.0, 1.0),
//! ];
//! let instance = Instance::from_points(points, Metric::Euclidean).unwrap();
//! let mut model = EdgeModel::new(&instance);
//! let (tour, stats) = BranchAndCut::solve(
//!     &instance,
//!     &mut model,
//!     &EnumerativeSolver::new(),
//!     &SolverConfig::default(),
//! )
//! .unwrap();
//! assert!((tour.cost() - 4.0).abs() < 1e-9);
//! assert_eq!(stats.cuts_added, 0);
//! ```

use crate::cuts::CutGenerator;
use crate::error::{Error, Result};
use crate::instance::Instance;
use crate::model::{
    EdgeModel, ExactSolver, LazyConstraints, LinearConstraint, MipSolution, SolverConfig,
    SolverStatus,
};
use crate::tour::{EdgeIncidence, Tour};

/// Lazy-constraint callback that separates subtours.
#[derive(Debug, Clone)]
pub struct SubtourSeparator {
    generator: CutGenerator,
    rounds: usize,
    cuts_added: usize,
}

impl SubtourSeparator {
    pub fn new(n: usize) -> Self {
        Self {
            generator: CutGenerator::new(n),
            rounds: 0,
            cuts_added: 0,
        }
    }

    /// Candidates rejected so far.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Cuts returned so far.
    pub fn cuts_added(&self) -> usize {
        self.cuts_added
    }
}

impl LazyConstraints for SubtourSeparator {
    fn separate(&mut self, values: &[f64]) -> Vec<LinearConstraint> {
        let cuts = self.generator.generate(values);
        if !cuts.is_empty() {
            self.rounds += 1;
            self.cuts_added += cuts.len();
        }
        cuts.iter().map(|cut| cut.to_constraint()).collect()
    }
}

/// Statistics of one branch-and-cut solve.
#[derive(Debug, Clone)]
pub struct BranchCutStats {
    pub status: SolverStatus,
    pub objective: f64,
    pub nodes: u64,
    /// Integer candidates rejected as subtours.
    pub separation_rounds: usize,
    pub cuts_added: usize,
    pub solve_time_ms: u64,
}

/// Runs an [`ExactSolver`] with subtour separation.
pub struct BranchAndCut;

impl BranchAndCut {
    /// Solves `model` to a Hamiltonian cycle.
    ///
    /// Cuts found during the solve remain in `model`. Bounds are not touched.
    ///
    /// # Errors
    /// [`Error::Solver`] when the solver ends without an integer solution,
    /// [`Error::MalformedInstance`] when model and instance disagree on the
    /// node count.
    pub fn solve<S: ExactSolver + ?Sized>(
        instance: &Instance,
        model: &mut EdgeModel,
        solver: &S,
        config: &SolverConfig,
    ) -> Result<(Tour, BranchCutStats)> {
        let n = instance.node_count();
        if model.node_count() != n {
            return Err(Error::malformed_instance(format!(
                "model has {} nodes, instance has {n}",
                model.node_count()
            )));
        }

        let mut separator = SubtourSeparator::new(n);
        let solution = solver.solve(model, config, &mut separator);
        let tour = Self::extract(instance, &solution)?;

        let stats = BranchCutStats {
            status: solution.status,
            objective: tour.cost(),
            nodes: solution.nodes,
            separation_rounds: separator.rounds(),
            cuts_added: separator.cuts_added(),
            solve_time_ms: solution.solve_time_ms,
        };
        log::info!(
            "branch_cut: status={:?} cost={:.4} nodes={} rounds={} cuts={} time_ms={}",
            stats.status,
            stats.objective,
            stats.nodes,
            stats.separation_rounds,
            stats.cuts_added,
            stats.solve_time_ms
        );
        Ok((tour, stats))
    }

    /// The tour encoded by a solver result.
    ///
    /// Values `>= 0.5` count as present edges.
    pub fn extract(instance: &Instance, solution: &MipSolution) -> Result<Tour> {
        if !solution.is_solution_found() {
            log::warn!("branch_cut: no integer solution status={:?}", solution.status);
            return Err(Error::Solver {
                status: solution.status,
            });
        }
        EdgeIncidence::from_values(instance.node_count(), &solution.values)?.to_tour(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{Metric, Point};
    use crate::model::EnumerativeSolver;

    fn two_clusters() -> Instance {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(10.0, 0.0),
            Point::new(11.0, 0.0),
            Point::new(10.0, 1.0),
        ];
        Instance::from_points(points, Metric::Euclidean).unwrap()
    }

    #[test]
    fn test_separator_counts() {
        let index = crate::tour::EdgeIndex::new(6);
        let mut values = vec![0.0; index.len()];
        for (i, j) in [(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5)] {
            values[index.position(i, j)] = 1.0;
        }
        let mut separator = SubtourSeparator::new(6);
        let rows = separator.separate(&values);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.rhs == 2.0 && r.terms.len() == 3));
        assert_eq!(separator.rounds(), 1);
        assert_eq!(separator.cuts_added(), 2);
    }

    #[test]
    fn test_subtours_are_cut_away() {
        let instance = two_clusters();
        let mut model = EdgeModel::new(&instance);
        let (tour, stats) = BranchAndCut::solve(
            &instance,
            &mut model,
            &EnumerativeSolver::new(),
            &SolverConfig::default(),
        )
        .unwrap();

        assert_eq!(tour.len(), 6);
        assert!(crate::tour::is_permutation(tour.order(), 6));
        assert!(stats.cuts_added >= 2);
        assert_eq!(model.cut_count(), stats.cuts_added);
        assert_eq!(stats.status, SolverStatus::Optimal);

        // (0,1)-(0,0)-(1,0)-(10,0)-(11,0)-(10,1)-(0,1)
        let expected = 22.0 + 2f64.sqrt();
        assert!((tour.cost() - expected).abs() < 1e-9, "tour cost {}", tour.cost());
    }

    #[test]
    fn test_solver_failure_surfaces_status() {
        let instance = two_clusters();
        let mut model = EdgeModel::new(&instance);
        for other in 1..6 {
            model.set_upper(model.index().position(0, other), 0.0);
        }
        let err = BranchAndCut::solve(
            &instance,
            &mut model,
            &EnumerativeSolver::new(),
            &SolverConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Solver {
                status: SolverStatus::Infeasible
            }
        ));
    }

    #[test]
    fn test_node_count_mismatch() {
        let instance = two_clusters();
        let small = Instance::from_fn(4, |i, j| (i + j) as f64).unwrap();
        let mut model = EdgeModel::new(&small);
        let result = BranchAndCut::solve(
            &instance,
            &mut model,
            &EnumerativeSolver::new(),
            &SolverConfig::default(),
        );
        assert!(matches!(result, Err(Error::MalformedInstance(_))));
    }
}
