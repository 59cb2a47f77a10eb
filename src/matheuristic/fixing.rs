//! Choosing which edges to fix.

use rand::Rng;

use crate::tour::{EdgeIncidence, Tour};

/// Node pairs forced to 1 in the current pass, in the order they were
/// chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedEdges {
    pairs: Vec<(usize, usize)>,
}

impl FixedEdges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, i: usize, j: usize) {
        self.pairs.push((i, j));
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    /// Empties the list, returning its pairs.
    pub fn drain(&mut self) -> Vec<(usize, usize)> {
        std::mem::take(&mut self.pairs)
    }
}

/// Samples edges of `reference`, each kept with probability `probability`.
///
/// A sample that fixes `N − 1` or more edges is drawn again, up to
/// `max_resamples` times. With `probability >= 1.0` every edge is kept and
/// no resampling happens. If the cap is reached, the last sample is cut
/// down to its first `N − 2` pairs.
pub fn sample_single_parent<R: Rng>(
    reference: &EdgeIncidence,
    probability: f64,
    max_resamples: usize,
    rng: &mut R,
) -> FixedEdges {
    let n = reference.node_count();
    let index = reference.index();
    let limit = n.saturating_sub(1);

    if probability >= 1.0 {
        let mut fixed = FixedEdges::new();
        for p in reference.positions() {
            let (i, j) = index.pair(p);
            fixed.push(i, j);
        }
        return fixed;
    }

    let mut attempts = 0;
    loop {
        let mut fixed = FixedEdges::new();
        for p in reference.positions() {
            if rng.random::<f64>() < probability {
                let (i, j) = index.pair(p);
                fixed.push(i, j);
            }
        }
        if fixed.len() < limit {
            return fixed;
        }
        if attempts >= max_resamples {
            log::debug!(
                "matheuristic: resample cap reached fixed={} limit={limit}",
                fixed.len()
            );
            fixed.pairs.truncate(n.saturating_sub(2));
            return fixed;
        }
        attempts += 1;
    }
}

/// Edges both parents traverse, in either direction.
///
/// For every node `i` with mother-successor `m`, the edge `{i, m}` is kept
/// when the father also goes `i → m` or `m → i`.
///
/// # Panics
/// Panics if the parents have different lengths.
pub fn common_edges(mother: &Tour, father: &Tour) -> FixedEdges {
    assert_eq!(mother.len(), father.len(), "parents must cover the same nodes");
    let m_next = mother.successors();
    let f_next = father.successors();

    let mut fixed = FixedEdges::new();
    for i in 0..mother.len() {
        let m = m_next.next(i);
        if f_next.next(i) == m || f_next.next(m) == i {
            fixed.push(i, m);
        }
    }
    fixed
}

/// Positions of edges neither parent uses.
pub fn common_absent(mother: &EdgeIncidence, father: &EdgeIncidence) -> Vec<usize> {
    assert_eq!(mother.node_count(), father.node_count(), "node count mismatch");
    (0..mother.index().len())
        .filter(|&p| !mother.is_set(p) && !father.is_set(p))
        .collect()
}
