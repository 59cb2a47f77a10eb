//! Subtour separation for branch-and-cut.
//!
//! When the exact solver reports an integer candidate, its present edges are
//! scanned in canonical pair order. A [`ComponentTracker`] merges fragments
//! as edges arrive; an edge whose endpoints already share a fragment closes
//! a cycle, and if that cycle misses some node a [`SubtourCut`] forbids it:
//!
//! ```text
//! Σ_{i<j ∈ S} x_ij ≤ |S| − 1
//! ```
//!
//! # Key Types
//!
//! - [`ComponentTracker`]: label-array union-find with closure detection
//! - [`SubtourCut`]: one subtour-elimination constraint
//! - [`CutGenerator`]: full scan over a candidate solution
//!
//! # References
//!
//! Dantzig, Fulkerson & Johnson (1954), "Solution of a Large-Scale
//! Traveling-Salesman Problem", *Operations Research* 2(4), 393-410.

mod generator;
mod tracker;

pub use generator::CutGenerator;
pub use tracker::ComponentTracker;

use crate::model::LinearConstraint;

/// A subtour-elimination constraint over one fragment.
///
/// Covers every pair of the fragment's nodes with coefficient 1 and bounds
/// the sum by `size − 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtourCut {
    /// Fragment nodes, ascending.
    pub nodes: Vec<usize>,
    /// Edge positions of every pair inside the fragment, ascending.
    pub edges: Vec<usize>,
    /// Right-hand side, `nodes.len() − 1`.
    pub rhs: usize,
}

impl SubtourCut {
    /// Number of nodes in the fragment.
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// The cut as a `≤` row for the exact model.
    pub fn to_constraint(&self) -> LinearConstraint {
        LinearConstraint::new(
            self.edges.iter().map(|&p| (p, 1.0)).collect(),
            self.rhs as f64,
        )
    }

    /// Left-hand side evaluated at `values`.
    pub fn lhs(&self, values: &[f64]) -> f64 {
        self.edges.iter().map(|&p| values[p]).sum()
    }

    /// Whether `values` violate this cut.
    pub fn is_violated(&self, values: &[f64]) -> bool {
        self.lhs(values) > self.rhs as f64 + 1e-9
    }
}
