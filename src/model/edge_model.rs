//! Edge-variable model definition.

use crate::instance::{CandidateList, Instance};
use crate::tour::{EdgeIncidence, EdgeIndex};

const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// A linear `≤` row over edge variables.
///
/// `Σ coef · x[pos] ≤ rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    /// `(position, coefficient)` pairs.
    pub terms: Vec<(usize, f64)>,
    /// Right-hand side.
    pub rhs: f64,
}

impl LinearConstraint {
    pub fn new(terms: Vec<(usize, f64)>, rhs: f64) -> Self {
        Self { terms, rhs }
    }

    /// Left-hand side at `values`.
    pub fn lhs(&self, values: &[f64]) -> f64 {
        self.terms.iter().map(|&(p, c)| c * values[p]).sum()
    }

    pub fn is_satisfied(&self, values: &[f64]) -> bool {
        self.lhs(values) <= self.rhs + FEASIBILITY_TOLERANCE
    }
}

/// Symmetric TSP model over one binary variable per unordered pair.
///
/// Degree-2 equalities are implicit in the formulation. Every variable has
/// current bounds `(lower, upper)` and a *base* upper bound: 1 in a dense
/// model, 0 for edges a sparse model excludes. [`reset_bounds`] restores
/// the base bounds.
///
/// [`reset_bounds`]: EdgeModel::reset_bounds
///
/// # Examples
///
/// ```
/// use u_tsp::instance::Instance;
/// use u_tsp::model::EdgeModel;
///
/// let instance = Instance::from_fn(4, |i, j| (i + j) as f64).unwrap();
/// let mut model = EdgeModel::new(&instance);
/// assert_eq!(model.variable_count(), 6);
///
/// model.set_lower(2, 1.0);
/// assert!(model.is_fixed_one(2));
/// model.reset_bounds();
/// assert!(model.is_free(2));
/// ```
#[derive(Debug, Clone)]
pub struct EdgeModel {
    index: EdgeIndex,
    objective: Vec<f64>,
    lower: Vec<f64>,
    upper: Vec<f64>,
    base_upper: Vec<f64>,
    cuts: Vec<LinearConstraint>,
}

impl EdgeModel {
    /// Dense model: every pair is a free binary variable.
    pub fn new(instance: &Instance) -> Self {
        let index = EdgeIndex::new(instance.node_count());
        let objective: Vec<f64> = index.pairs().map(|(i, j)| instance.distance(i, j)).collect();
        let m = objective.len();
        Self {
            index,
            objective,
            lower: vec![0.0; m],
            upper: vec![1.0; m],
            base_upper: vec![1.0; m],
            cuts: Vec::new(),
        }
    }

    /// Sparse model: only pairs among the `k` nearest of either endpoint
    /// are free; all other variables are fixed to 0 in the base bounds.
    pub fn sparse(instance: &Instance, candidates: &CandidateList, k: usize) -> Self {
        let mut model = Self::new(instance);
        let mut excluded = 0;
        for (p, (i, j)) in model.index.pairs().enumerate() {
            if !candidates.is_candidate(i, j, k) {
                model.base_upper[p] = 0.0;
                model.upper[p] = 0.0;
                excluded += 1;
            }
        }
        log::debug!(
            "model: sparse edge set k={k} excluded={excluded} of {}",
            model.variable_count()
        );
        model
    }

    pub fn index(&self) -> EdgeIndex {
        self.index
    }

    pub fn node_count(&self) -> usize {
        self.index.node_count()
    }

    pub fn variable_count(&self) -> usize {
        self.objective.len()
    }

    /// Objective coefficients (edge distances), by position.
    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    /// Objective at `values`.
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective
            .iter()
            .zip(values)
            .map(|(c, v)| c * v)
            .sum()
    }

    #[inline]
    pub fn bounds(&self, p: usize) -> (f64, f64) {
        (self.lower[p], self.upper[p])
    }

    pub fn set_lower(&mut self, p: usize, value: f64) {
        self.lower[p] = value;
    }

    pub fn set_upper(&mut self, p: usize, value: f64) {
        self.upper[p] = value;
    }

    /// Restores every variable to its base bounds.
    pub fn reset_bounds(&mut self) {
        self.lower.fill(0.0);
        self.upper.copy_from_slice(&self.base_upper);
    }

    /// Forced to 1.
    #[inline]
    pub fn is_fixed_one(&self, p: usize) -> bool {
        self.lower[p] >= 0.5
    }

    /// Forced to 0.
    #[inline]
    pub fn is_forbidden(&self, p: usize) -> bool {
        self.upper[p] < 0.5
    }

    /// Neither forced to 0 nor to 1.
    #[inline]
    pub fn is_free(&self, p: usize) -> bool {
        !self.is_fixed_one(p) && !self.is_forbidden(p)
    }

    /// Whether the base bounds exclude this variable.
    pub fn is_excluded(&self, p: usize) -> bool {
        self.base_upper[p] < 0.5
    }

    /// Returns every edge of `incidence` to the base edge set.
    ///
    /// A sparse model may exclude edges of a tour found elsewhere; admitting
    /// them keeps that tour feasible. Returns the number of edges admitted.
    pub fn admit(&mut self, incidence: &EdgeIncidence) -> usize {
        let mut admitted = 0;
        for p in incidence.positions() {
            if self.is_excluded(p) {
                self.base_upper[p] = 1.0;
                self.upper[p] = 1.0;
                admitted += 1;
            }
        }
        admitted
    }

    /// Positions currently forced to 1, ascending.
    pub fn fixed_positions(&self) -> Vec<usize> {
        (0..self.variable_count())
            .filter(|&p| self.is_fixed_one(p))
            .collect()
    }

    /// Positions of the `n − 1` variables incident to `node`.
    pub fn degree_row(&self, node: usize) -> Vec<usize> {
        (0..self.node_count())
            .filter_map(|other| self.index.pos(node, other))
            .collect()
    }

    pub fn add_cut(&mut self, cut: LinearConstraint) {
        self.cuts.push(cut);
    }

    pub fn add_cuts(&mut self, cuts: impl IntoIterator<Item = LinearConstraint>) {
        self.cuts.extend(cuts);
    }

    pub fn cuts(&self) -> &[LinearConstraint] {
        &self.cuts
    }

    pub fn cut_count(&self) -> usize {
        self.cuts.len()
    }

    /// Whether `values` satisfy bounds, degree equalities and every cut.
    pub fn is_feasible(&self, values: &[f64]) -> bool {
        if values.len() != self.variable_count() {
            return false;
        }
        let within_bounds = values.iter().enumerate().all(|(p, &v)| {
            v >= self.lower[p] - FEASIBILITY_TOLERANCE && v <= self.upper[p] + FEASIBILITY_TOLERANCE
        });
        if !within_bounds {
            return false;
        }
        let degrees_ok = (0..self.node_count()).all(|node| {
            let degree: f64 = self.degree_row(node).iter().map(|&p| values[p]).sum();
            (degree - 2.0).abs() <= FEASIBILITY_TOLERANCE
        });
        degrees_ok && self.cuts.iter().all(|c| c.is_satisfied(values))
    }

    /// Checks structural consistency.
    pub fn validate(&self) -> Result<(), String> {
        if self.node_count() < 3 {
            return Err(format!(
                "a tour model needs at least 3 nodes, got {}",
                self.node_count()
            ));
        }
        for p in 0..self.variable_count() {
            if self.lower[p] > self.upper[p] {
                let (i, j) = self.index.pair(p);
                return Err(format!(
                    "variable x({i},{j}) has lower bound {} above upper bound {}",
                    self.lower[p], self.upper[p]
                ));
            }
        }
        let m = self.variable_count();
        for (k, cut) in self.cuts.iter().enumerate() {
            if let Some(&(p, _)) = cut.terms.iter().find(|&&(p, _)| p >= m) {
                return Err(format!("cut {k} references position {p} of {m}"));
            }
        }
        Ok(())
    }
}
