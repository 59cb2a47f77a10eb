//! Nearest-neighbour construction heuristics.
//!
//! All variants walk the [`CandidateList`]: from the current node, one
//! random draw picks a rank through cumulative [`SkipPolicy`] thresholds;
//! if that candidate is already visited, the scan moves forward through the
//! candidate list (wrapping to the nearest) until an unvisited node is found.
//!
//! # Variants
//!
//! | Function | Start | Thresholds | Output |
//! |----------|-------|------------|--------|
//! | [`randomized_nearest_neighbor`] | random | 0.90 / 0.99 / 1.00 | [`Tour`] |
//! | [`seeding_nearest_neighbor`] | random or fixed | 0.50 / 0.60 / 0.80 / 1.00 | [`Tour`] |
//! | [`polish_nearest_neighbor`] | node 0 | 0.85 / 1.00 | [`EdgeIncidence`] |
//!
//! # Complexity
//! O(n) steps, each O(n) in the worst case (every candidate visited).

use crate::error::{Error, Result};
use crate::instance::{CandidateList, Instance};
use crate::tour::{EdgeIncidence, Tour};
use rand::Rng;

/// Cumulative probability thresholds over candidate ranks.
///
/// A draw `u ∈ [0, 1)` selects the first rank `r` with `u < thresholds[r]`.
/// The last threshold must be 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkipPolicy {
    thresholds: &'static [f64],
}

impl SkipPolicy {
    /// 90 % nearest, 9 % second, 1 % third.
    pub const NEAREST: SkipPolicy = SkipPolicy {
        thresholds: &[0.90, 0.99, 1.0],
    };

    /// Flatter distribution over the four nearest, for population diversity.
    pub const SEEDING: SkipPolicy = SkipPolicy {
        thresholds: &[0.50, 0.60, 0.80, 1.0],
    };

    /// 85 % nearest, 15 % second.
    pub const POLISH: SkipPolicy = SkipPolicy {
        thresholds: &[0.85, 1.0],
    };

    /// Always the nearest unvisited candidate.
    pub const fn greedy() -> Self {
        SkipPolicy { thresholds: &[1.0] }
    }

    /// Draws a rank.
    pub fn draw<R: Rng>(&self, rng: &mut R) -> usize {
        if self.thresholds.len() == 1 {
            return 0;
        }
        let u: f64 = rng.random();
        self.thresholds
            .iter()
            .position(|&t| u < t)
            .unwrap_or(self.thresholds.len() - 1)
    }
}

/// Where the walk begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Start {
    /// Uniformly random node.
    Random,
    /// A fixed node.
    Node(usize),
}

/// Walks the candidate list under `policy`, returning the visiting order.
///
/// # Errors
/// [`Error::MalformedInstance`] if a fixed start node is out of range.
pub fn nearest_neighbor_order<R: Rng>(
    candidates: &CandidateList,
    start: Start,
    policy: SkipPolicy,
    rng: &mut R,
) -> Result<Vec<usize>> {
    let n = candidates.node_count();
    let mut current = match start {
        Start::Random => rng.random_range(0..n),
        Start::Node(node) if node < n => node,
        Start::Node(node) => {
            return Err(Error::malformed_instance(format!(
                "start node {node} out of range for {n} nodes"
            )));
        }
    };

    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    visited[current] = true;
    order.push(current);

    for _ in 1..n {
        let list = candidates.neighbors(current);
        let mut rank = policy.draw(rng).min(list.len() - 1);
        while visited[list[rank]] {
            rank += 1;
            if rank >= list.len() {
                rank = 0;
            }
        }
        current = list[rank];
        visited[current] = true;
        order.push(current);
    }

    Ok(order)
}

/// Randomized nearest-neighbour tour from a random start.
pub fn randomized_nearest_neighbor<R: Rng>(
    instance: &Instance,
    candidates: &CandidateList,
    rng: &mut R,
) -> Result<Tour> {
    let order = nearest_neighbor_order(candidates, Start::Random, SkipPolicy::NEAREST, rng)?;
    Tour::from_order(instance, order)
}

/// Nearest-neighbour tour for seeding a genetic population.
///
/// When `start` is `None` the walk begins at a random node.
pub fn seeding_nearest_neighbor<R: Rng>(
    instance: &Instance,
    candidates: &CandidateList,
    start: Option<usize>,
    rng: &mut R,
) -> Result<Tour> {
    let start = start.map_or(Start::Random, Start::Node);
    let order = nearest_neighbor_order(candidates, start, SkipPolicy::SEEDING, rng)?;
    Tour::from_order(instance, order)
}

/// Nearest-neighbour walk from node 0, returned as an incidence vector.
///
/// Used to seed recombination directly in the exact model's encoding.
pub fn polish_nearest_neighbor<R: Rng>(
    instance: &Instance,
    candidates: &CandidateList,
    rng: &mut R,
) -> Result<(EdgeIncidence, f64)> {
    let order = nearest_neighbor_order(candidates, Start::Node(0), SkipPolicy::POLISH, rng)?;
    let tour = Tour::from_order(instance, order)?;
    Ok((EdgeIncidence::from_tour(&tour), tour.cost()))
}
