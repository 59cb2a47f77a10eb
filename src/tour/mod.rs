//! Tour encodings.
//!
//! A tour is a single Hamiltonian cycle over all nodes. Three encodings
//! are used across the crate:
//!
//! - [`Tour`]: explicit visiting order plus cached cost (genetic population,
//!   construction output, final result)
//! - [`Successors`]: `next[node]` map (2-opt refinement)
//! - [`EdgeIncidence`]: one 0/1 value per unordered pair (boundary with
//!   the exact model, indexed by [`EdgeIndex`])

mod edges;

pub use edges::{EdgeIncidence, EdgeIndex};

use crate::error::{Error, Result};
use crate::instance::Instance;

/// Whether `order` contains every value of `0..n` exactly once.
pub fn is_permutation(order: &[usize], n: usize) -> bool {
    if order.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &v in order {
        if v >= n || seen[v] {
            return false;
        }
        seen[v] = true;
    }
    true
}

/// A Hamiltonian cycle in visiting order, with its cached cost.
///
/// The order is always a permutation of `0..n`; constructors reject
/// anything else. The cycle closes from the last node back to the first.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tour {
    order: Vec<usize>,
    cost: f64,
}

impl Tour {
    /// Builds a tour from a visiting order, computing its cost.
    pub fn from_order(instance: &Instance, order: Vec<usize>) -> Result<Self> {
        let n = instance.node_count();
        if !is_permutation(&order, n) {
            return Err(Error::invalid_tour(format!(
                "order of length {} is not a permutation of 0..{n}",
                order.len()
            )));
        }
        let cost = instance.cycle_cost(&order);
        Ok(Self { order, cost })
    }

    /// Builds a tour by following successors from `start`.
    pub fn from_successors(instance: &Instance, next: &Successors, start: usize) -> Result<Self> {
        let order = next.walk(start)?;
        Self::from_order(instance, order)
    }

    /// Visiting order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Total cycle cost.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Always false for a validated tour; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Successor form of this tour.
    pub fn successors(&self) -> Successors {
        let n = self.order.len();
        let mut next = vec![0; n];
        for k in 0..n {
            next[self.order[k]] = self.order[(k + 1) % n];
        }
        Successors(next)
    }

    /// Cycle edges as `(from, to)` pairs in visiting order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.order.len();
        (0..n).map(move |k| (self.order[k], self.order[(k + 1) % n]))
    }
}

/// Successor map: `next[node]` is the node visited after `node`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Successors(pub Vec<usize>);

impl Successors {
    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn next(&self, node: usize) -> usize {
        self.0[node]
    }

    /// Follows successors from `start`, returning the visiting order.
    ///
    /// Fails unless the map is a single cycle through every node.
    pub fn walk(&self, start: usize) -> Result<Vec<usize>> {
        let n = self.0.len();
        if start >= n {
            return Err(Error::invalid_tour(format!(
                "start node {start} out of range for {n} nodes"
            )));
        }
        let mut order = Vec::with_capacity(n);
        let mut visited = vec![false; n];
        let mut node = start;
        for _ in 0..n {
            if node >= n || visited[node] {
                return Err(Error::invalid_tour(format!(
                    "successor walk from {start} revisits or leaves range at {node}"
                )));
            }
            visited[node] = true;
            order.push(node);
            node = self.0[node];
        }
        if node != start {
            return Err(Error::invalid_tour(format!(
                "successor walk from {start} does not close after {n} steps"
            )));
        }
        Ok(order)
    }

    /// Cost of the cycle described by this map.
    pub fn cost(&self, instance: &Instance) -> f64 {
        (0..self.0.len())
            .map(|node| instance.distance(node, self.0[node]))
            .sum()
    }
}
