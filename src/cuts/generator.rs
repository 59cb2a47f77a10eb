//! Cut generation over a candidate integer solution.

use super::{ComponentTracker, SubtourCut};
use crate::tour::{EdgeIncidence, EdgeIndex};

/// Scans a candidate solution and returns its violated subtour cuts.
///
/// Reuses one [`ComponentTracker`] across calls; its labels are reset at
/// the start of every scan.
///
/// # Examples
///
/// ```
/// use u_tsp::cuts::CutGenerator;
/// use u_tsp::tour::EdgeIndex;
///
/// // Two disjoint triangles over 6 nodes
/// let index = EdgeIndex::new(6);
/// let mut values = vec![0.0; index.len()];
/// for (i, j) in [(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5)] {
///     values[index.position(i, j)] = 1.0;
/// }
///
/// let mut generator = CutGenerator::new(6);
/// let cuts = generator.generate(&values);
/// assert_eq!(cuts.len(), 2);
/// assert!(cuts.iter().all(|c| c.edges.len() == 3 && c.rhs == 2));
/// ```
#[derive(Debug, Clone)]
pub struct CutGenerator {
    tracker: ComponentTracker,
    index: EdgeIndex,
}

impl CutGenerator {
    pub fn new(n: usize) -> Self {
        Self {
            tracker: ComponentTracker::new(n),
            index: EdgeIndex::new(n),
        }
    }

    pub fn node_count(&self) -> usize {
        self.tracker.node_count()
    }

    /// Cuts violated by `values` (one entry per edge position, `>= 0.5`
    /// meaning present).
    ///
    /// Edges are processed in `(i asc, j > i asc)` order. A closure whose
    /// fragment covers all nodes is the Hamiltonian cycle itself and yields
    /// no cut, so an empty result means the candidate is accepted.
    ///
    /// # Panics
    /// Panics if `values` does not have one entry per edge.
    pub fn generate(&mut self, values: &[f64]) -> Vec<SubtourCut> {
        assert_eq!(values.len(), self.index.len(), "one value per edge expected");
        self.scan(|p| values[p] >= 0.5)
    }

    /// Cuts violated by an incidence vector.
    pub fn generate_from_incidence(&mut self, incidence: &EdgeIncidence) -> Vec<SubtourCut> {
        assert_eq!(incidence.node_count(), self.node_count(), "node count mismatch");
        self.scan(|p| incidence.is_set(p))
    }

    /// Fragment labels left by the last scan.
    pub fn labels(&self) -> &[usize] {
        self.tracker.labels()
    }

    fn scan<F: Fn(usize) -> bool>(&mut self, present: F) -> Vec<SubtourCut> {
        let n = self.node_count();
        self.tracker.reset();

        let mut cuts = Vec::new();
        for (p, (i, j)) in self.index.pairs().enumerate() {
            if !present(p) {
                continue;
            }
            if let Some(cut) = self.tracker.join(i, j) {
                if cut.size() < n {
                    cuts.push(cut);
                }
            }
        }

        if cuts.is_empty() {
            log::trace!("cuts: candidate accepted nodes={n}");
        } else {
            log::debug!(
                "cuts: separated subtours count={} sizes={:?}",
                cuts.len(),
                cuts.iter().map(SubtourCut::size).collect::<Vec<_>>()
            );
        }
        cuts
    }
}
