//! Candidate-edge index.

use super::Instance;
use crate::error::{Error, Result};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// For every node, all other nodes ordered by non-decreasing distance.
///
/// Ties are broken by node index (stable sort over an index-ordered
/// input). Built once per instance and shared read-only by construction,
/// repair and neighbour lookups.
///
/// # Complexity
/// O(n² log n) time, O(n²) space
///
/// # Examples
///
/// ```
/// use u_tsp::instance::{CandidateList, Instance};
///
/// let instance = Instance::from_fn(4, |i, j| (j - i) as f64).unwrap();
/// let candidates = CandidateList::build(&instance).unwrap();
/// assert_eq!(candidates.neighbors(0), &[1, 2, 3]);
/// assert_eq!(candidates.neighbors(2), &[1, 3, 0]);
/// ```
#[derive(Debug, Clone)]
pub struct CandidateList {
    lists: Vec<Vec<usize>>,
}

impl CandidateList {
    /// Builds the index for `instance`.
    pub fn build(instance: &Instance) -> Result<Self> {
        let n = instance.node_count();
        if n < 2 {
            return Err(Error::malformed_instance(format!(
                "candidate list needs at least 2 nodes, got {n}"
            )));
        }

        #[cfg(feature = "parallel")]
        let lists: Vec<Vec<usize>> = (0..n)
            .into_par_iter()
            .map(|i| sorted_neighbors(instance, i))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let lists: Vec<Vec<usize>> = (0..n).map(|i| sorted_neighbors(instance, i)).collect();

        log::debug!("candidates: built index nodes={n}");

        Ok(Self { lists })
    }

    /// Number of nodes covered.
    pub fn node_count(&self) -> usize {
        self.lists.len()
    }

    /// All other nodes, nearest first.
    #[inline]
    pub fn neighbors(&self, node: usize) -> &[usize] {
        &self.lists[node]
    }

    /// The `rank`-th nearest neighbour (0 = nearest).
    #[inline]
    pub fn nearest(&self, node: usize, rank: usize) -> usize {
        self.lists[node][rank]
    }

    /// Rank of `other` in `node`'s list, `None` when `other == node`.
    pub fn rank_of(&self, node: usize, other: usize) -> Option<usize> {
        self.lists[node].iter().position(|&v| v == other)
    }

    /// Whether `{i, j}` is among the `k` nearest of either endpoint.
    pub fn is_candidate(&self, i: usize, j: usize, k: usize) -> bool {
        if i == j {
            return false;
        }
        let k = k.min(self.lists[i].len());
        self.lists[i][..k].contains(&j) || self.lists[j][..k].contains(&i)
    }
}

fn sorted_neighbors(instance: &Instance, node: usize) -> Vec<usize> {
    let mut others: Vec<usize> = (0..instance.node_count()).filter(|&j| j != node).collect();
    // sort_by is stable: equal distances keep ascending index order
    others.sort_by(|&a, &b| {
        instance
            .distance(node, a)
            .partial_cmp(&instance.distance(node, b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    others
}
