//! Depth-first branch-and-bound over edge variables.

use std::time::{Duration, Instant};

use super::{
    EdgeModel, ExactSolver, LazyConstraints, LinearConstraint, MipSolution, SolverConfig,
    SolverStatus,
};

const EPS: f64 = 1e-9;
const CLOCK_INTERVAL: u64 = 1024;

/// Exact solver for small edge models.
///
/// Decides variables in position order, trying 1 before 0, and prunes on:
///
/// - degree: no node exceeds degree 2, and every node can still reach it
/// - bounds: forced variables take their forced value only
/// - cuts: rows with non-negative coefficients are checked incrementally
/// - cost: the partial cost plus half of each node's cheapest remaining
///   incidences cannot beat the incumbent
///
/// Complete assignments are handed to the lazy callback; returned rows are
/// appended to the model and stay active for the rest of the search.
///
/// # Limitations
///
/// - Exponential in the number of free variables
/// - Intended for instances of roughly ten nodes or fewer
pub struct EnumerativeSolver;

impl EnumerativeSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EnumerativeSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ExactSolver for EnumerativeSolver {
    fn solve(
        &self,
        model: &mut EdgeModel,
        config: &SolverConfig,
        lazy: &mut dyn LazyConstraints,
    ) -> MipSolution {
        let start_time = Instant::now();
        if let Err(reason) = model.validate() {
            log::warn!("enumerative: invalid model: {reason}");
            return MipSolution::empty(SolverStatus::ModelInvalid);
        }

        let deadline = start_time.checked_add(Duration::from_millis(config.time_limit_ms));
        let mut search = Search::new(model, lazy, config, deadline);
        search.descend(0);

        let status = match (&search.best, search.interrupted) {
            (Some(_), false) if !search.stopped_early => SolverStatus::Optimal,
            (Some(_), _) => SolverStatus::Feasible,
            (None, true) => SolverStatus::Timeout,
            (None, false) => SolverStatus::Infeasible,
        };
        let nodes = search.nodes;
        let lazy_rounds = search.lazy_rounds;
        let (values, objective_value) = match search.best.take() {
            Some((values, cost)) => (values, Some(cost)),
            None => (Vec::new(), None),
        };
        let solve_time_ms = start_time.elapsed().as_millis() as u64;

        log::debug!(
            "enumerative: status={status:?} objective={objective_value:?} nodes={nodes} \
             lazy_rounds={lazy_rounds} cuts={} time_ms={solve_time_ms}",
            model.cut_count()
        );

        MipSolution {
            status,
            values,
            objective_value,
            nodes,
            lazy_rounds,
            solve_time_ms,
        }
    }
}

// ============================================================================
// Search state
// ============================================================================

struct Search<'a> {
    model: &'a mut EdgeModel,
    lazy: &'a mut dyn LazyConstraints,
    pairs: Vec<(usize, usize)>,
    values: Vec<f64>,
    degree: Vec<usize>,
    /// Undecided incident variables per node.
    open: Vec<usize>,
    /// Per node: incident positions ascending, with the minimum cost over
    /// that position and every later one that may still be 1.
    suffix_min: Vec<Vec<(usize, f64)>>,
    /// Per position: `(cut, coefficient)`.
    memberships: Vec<Vec<(usize, f64)>>,
    cut_lhs: Vec<f64>,
    cut_monotone: Vec<bool>,
    cost: f64,
    best: Option<(Vec<f64>, f64)>,
    nodes: u64,
    lazy_rounds: usize,
    deadline: Option<Instant>,
    node_limit: Option<u64>,
    stop_after_first: bool,
    interrupted: bool,
    stopped_early: bool,
}

impl<'a> Search<'a> {
    fn new(
        model: &'a mut EdgeModel,
        lazy: &'a mut dyn LazyConstraints,
        config: &SolverConfig,
        deadline: Option<Instant>,
    ) -> Self {
        let n = model.node_count();
        let m = model.variable_count();
        let pairs: Vec<(usize, usize)> = model.index().pairs().collect();

        let mut incident: Vec<Vec<usize>> = vec![Vec::with_capacity(n - 1); n];
        for (p, &(i, j)) in pairs.iter().enumerate() {
            incident[i].push(p);
            incident[j].push(p);
        }
        let suffix_min = incident
            .iter()
            .map(|positions| {
                let mut running = f64::INFINITY;
                let mut table: Vec<(usize, f64)> = positions
                    .iter()
                    .rev()
                    .map(|&p| {
                        if !model.is_forbidden(p) {
                            running = running.min(model.objective()[p]);
                        }
                        (p, running)
                    })
                    .collect();
                table.reverse();
                table
            })
            .collect();

        let mut search = Self {
            model,
            lazy,
            pairs,
            values: vec![0.0; m],
            degree: vec![0; n],
            open: vec![n - 1; n],
            suffix_min,
            memberships: vec![Vec::new(); m],
            cut_lhs: Vec::new(),
            cut_monotone: Vec::new(),
            cost: 0.0,
            best: None,
            nodes: 0,
            lazy_rounds: 0,
            deadline,
            node_limit: config.node_limit,
            stop_after_first: config.stop_after_first,
            interrupted: false,
            stopped_early: false,
        };
        for k in 0..search.model.cut_count() {
            search.register_cut(k, 0.0);
        }
        search
    }

    fn done(&self) -> bool {
        self.interrupted || self.stopped_early
    }

    fn out_of_budget(&self) -> bool {
        if self.node_limit.is_some_and(|limit| self.nodes >= limit) {
            return true;
        }
        self.nodes % CLOCK_INTERVAL == 0 && self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    fn descend(&mut self, p: usize) {
        if self.done() {
            return;
        }
        self.nodes += 1;
        if self.out_of_budget() {
            self.interrupted = true;
            return;
        }
        if p == self.pairs.len() {
            self.leaf();
            return;
        }
        if self.pruned_by_bound(p) {
            return;
        }

        let (i, j) = self.pairs[p];
        let (lower, upper) = self.model.bounds(p);

        if upper >= 0.5 && self.degree[i] < 2 && self.degree[j] < 2 && self.cuts_allow(p) {
            self.assign(p, true);
            if self.reachable(i) && self.reachable(j) {
                self.descend(p + 1);
            }
            self.unassign(p, true);
        }
        if self.done() {
            return;
        }
        if lower < 0.5 {
            self.assign(p, false);
            if self.reachable(i) && self.reachable(j) {
                self.descend(p + 1);
            }
            self.unassign(p, false);
        }
    }

    /// Whether `node` can still end with degree 2.
    #[inline]
    fn reachable(&self, node: usize) -> bool {
        self.degree[node] + self.open[node] >= 2
    }

    fn pruned_by_bound(&self, p: usize) -> bool {
        let Some((_, best)) = self.best.as_ref() else {
            return false;
        };
        let mut extra = 0.0;
        for (node, table) in self.suffix_min.iter().enumerate() {
            let missing = 2 - self.degree[node];
            if missing == 0 {
                continue;
            }
            let k = table.partition_point(|&(q, _)| q < p);
            let cheapest = table.get(k).map_or(f64::INFINITY, |&(_, c)| c);
            extra += missing as f64 * cheapest;
        }
        self.cost + 0.5 * extra >= best - EPS
    }

    fn cuts_allow(&self, p: usize) -> bool {
        let cuts = self.model.cuts();
        self.memberships[p].iter().all(|&(k, coef)| {
            !self.cut_monotone[k] || self.cut_lhs[k] + coef <= cuts[k].rhs + EPS
        })
    }

    fn assign(&mut self, p: usize, one: bool) {
        let (i, j) = self.pairs[p];
        self.open[i] -= 1;
        self.open[j] -= 1;
        if one {
            self.values[p] = 1.0;
            self.degree[i] += 1;
            self.degree[j] += 1;
            self.cost += self.model.objective()[p];
            for &(k, coef) in &self.memberships[p] {
                self.cut_lhs[k] += coef;
            }
        }
    }

    fn unassign(&mut self, p: usize, one: bool) {
        let (i, j) = self.pairs[p];
        self.open[i] += 1;
        self.open[j] += 1;
        if one {
            self.values[p] = 0.0;
            self.degree[i] -= 1;
            self.degree[j] -= 1;
            self.cost -= self.model.objective()[p];
            for &(k, coef) in &self.memberships[p] {
                self.cut_lhs[k] -= coef;
            }
        }
    }

    fn leaf(&mut self) {
        if !self.model.cuts().iter().all(|c| c.is_satisfied(&self.values)) {
            return;
        }

        let rows = self.lazy.separate(&self.values);
        if !rows.is_empty() {
            self.lazy_rounds += 1;
            let mut rejected = false;
            for row in rows {
                rejected |= !row.is_satisfied(&self.values);
                self.add_cut(row);
            }
            if rejected {
                return;
            }
        }

        let improves = self
            .best
            .as_ref()
            .map_or(true, |(_, best)| self.cost < best - EPS);
        if improves {
            log::trace!("enumerative: incumbent cost={:.4} nodes={}", self.cost, self.nodes);
            self.best = Some((self.values.clone(), self.cost));
        }
        if self.stop_after_first {
            self.stopped_early = true;
        }
    }

    fn add_cut(&mut self, row: LinearConstraint) {
        let lhs = row.lhs(&self.values);
        self.model.add_cut(row);
        self.register_cut(self.model.cut_count() - 1, lhs);
    }

    fn register_cut(&mut self, k: usize, lhs: f64) {
        let row = &self.model.cuts()[k];
        for &(p, coef) in &row.terms {
            self.memberships[p].push((k, coef));
        }
        self.cut_monotone.push(row.terms.iter().all(|&(_, c)| c >= 0.0));
        self.cut_lhs.push(lhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{Instance, Metric, Point};
    use crate::model::NoLazyConstraints;
    use crate::tour::EdgeIncidence;

    fn two_clusters() -> Instance {
        // Two triangles far apart: degree-only optimum is two subtours
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(100.0, 0.0),
            Point::new(101.0, 0.0),
            Point::new(100.0, 1.0),
        ];
        Instance::from_points(points, Metric::Euclidean).unwrap()
    }

    fn square() -> Instance {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        Instance::from_points(points, Metric::Euclidean).unwrap()
    }

    /// Rejects candidates with a fixed row set, once.
    struct RejectOnce(Option<LinearConstraint>);

    impl LazyConstraints for RejectOnce {
        fn separate(&mut self, _values: &[f64]) -> Vec<LinearConstraint> {
            self.0.take().into_iter().collect()
        }
    }

    #[test]
    fn test_square_optimum() {
        let instance = square();
        let mut model = EdgeModel::new(&instance);
        let solution =
            EnumerativeSolver::new().solve(&mut model, &SolverConfig::default(), &mut NoLazyConstraints);

        assert_eq!(solution.status, SolverStatus::Optimal);
        let cost = solution.objective_value.unwrap();
        assert!((cost - 4.0).abs() < 1e-9);
        assert!(model.is_feasible(&solution.values));
        let tour = EdgeIncidence::from_values(4, &solution.values)
            .unwrap()
            .to_tour(&instance)
            .unwrap();
        assert!((tour.cost() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_degree_only_optimum_has_subtours() {
        let instance = two_clusters();
        let mut model = EdgeModel::new(&instance);
        let solution =
            EnumerativeSolver::new().solve(&mut model, &SolverConfig::default(), &mut NoLazyConstraints);

        assert_eq!(solution.status, SolverStatus::Optimal);
        let incidence = EdgeIncidence::from_values(6, &solution.values).unwrap();
        assert!(incidence.to_tour(&instance).is_err());
    }

    #[test]
    fn test_lazy_row_is_added_and_respected() {
        let instance = square();
        let index = crate::tour::EdgeIndex::new(4);
        // Forbid the perimeter edge (0,1)
        let row = LinearConstraint::new(vec![(index.position(0, 1), 1.0)], 0.0);
        let mut lazy = RejectOnce(Some(row));
        let mut model = EdgeModel::new(&instance);
        let solution = EnumerativeSolver::new().solve(&mut model, &SolverConfig::default(), &mut lazy);

        assert_eq!(solution.status, SolverStatus::Optimal);
        assert_eq!(model.cut_count(), 1);
        assert_eq!(solution.lazy_rounds, 1);
        assert_eq!(solution.values[index.position(0, 1)], 0.0);
        assert!((solution.objective_value.unwrap() - (2.0 + 2.0 * 2f64.sqrt())).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_respected() {
        let instance = square();
        let mut model = EdgeModel::new(&instance);
        let index = model.index();
        let diagonal = index.position(0, 2);
        model.set_lower(diagonal, 1.0);

        let solution =
            EnumerativeSolver::new().solve(&mut model, &SolverConfig::default(), &mut NoLazyConstraints);
        assert!(solution.is_solution_found());
        assert_eq!(solution.values[diagonal], 1.0);
    }

    #[test]
    fn test_infeasible_bounds() {
        let instance = square();
        let mut model = EdgeModel::new(&instance);
        for other in 1..4 {
            model.set_upper(model.index().position(0, other), 0.0);
        }
        let solution =
            EnumerativeSolver::new().solve(&mut model, &SolverConfig::default(), &mut NoLazyConstraints);
        assert_eq!(solution.status, SolverStatus::Infeasible);
        assert!(solution.values.is_empty());
    }

    #[test]
    fn test_invalid_model() {
        let instance = square();
        let mut model = EdgeModel::new(&instance);
        model.set_lower(0, 1.0);
        model.set_upper(0, 0.0);
        let solution =
            EnumerativeSolver::new().solve(&mut model, &SolverConfig::default(), &mut NoLazyConstraints);
        assert_eq!(solution.status, SolverStatus::ModelInvalid);
    }

    #[test]
    fn test_node_limit_interrupts() {
        let instance = two_clusters();
        let mut model = EdgeModel::new(&instance);
        let config = SolverConfig::default().with_node_limit(3);
        let solution = EnumerativeSolver::new().solve(&mut model, &config, &mut NoLazyConstraints);
        assert_eq!(solution.status, SolverStatus::Timeout);
        assert!(solution.nodes <= 3);
    }

    #[test]
    fn test_stop_after_first() {
        let instance = square();
        let mut model = EdgeModel::new(&instance);
        let config = SolverConfig::default().with_stop_after_first(true);
        let solution = EnumerativeSolver::new().solve(&mut model, &config, &mut NoLazyConstraints);
        assert_eq!(solution.status, SolverStatus::Feasible);
        assert!(model.is_feasible(&solution.values));
    }
}
