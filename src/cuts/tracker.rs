//! Fragment labels for subtour detection.

use super::SubtourCut;
use crate::tour::EdgeIndex;

/// Label-array union-find over nodes.
///
/// `label[i]` is the id of the fragment containing node `i`. A merge
/// relabels every node of the absorbed fragment, which is O(n); the tracker
/// runs once per edge of one candidate solution, so n merges at most.
///
/// The surviving label of a merge is always that of the first argument.
/// Scanning edges in `(i asc, j > i asc)` order therefore makes the set of
/// emitted cuts reproducible.
#[derive(Debug, Clone)]
pub struct ComponentTracker {
    labels: Vec<usize>,
    edges: EdgeIndex,
}

impl ComponentTracker {
    /// All-distinct labels over `n` nodes.
    pub fn new(n: usize) -> Self {
        Self {
            labels: (0..n).collect(),
            edges: EdgeIndex::new(n),
        }
    }

    /// Restores `label[i] = i`.
    pub fn reset(&mut self) {
        for (i, label) in self.labels.iter_mut().enumerate() {
            *label = i;
        }
    }

    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn label(&self, node: usize) -> usize {
        self.labels[node]
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Nodes carrying `label`, ascending.
    pub fn fragment(&self, label: usize) -> Vec<usize> {
        (0..self.labels.len())
            .filter(|&k| self.labels[k] == label)
            .collect()
    }

    /// Merges the fragments of `i` and `j`.
    ///
    /// Returns `false` when they already share a fragment.
    pub fn merge(&mut self, i: usize, j: usize) -> bool {
        let keep = self.labels[i];
        let absorbed = self.labels[j];
        if keep == absorbed {
            return false;
        }
        for label in self.labels.iter_mut() {
            if *label == absorbed {
                *label = keep;
            }
        }
        true
    }

    /// Processes edge `{i, j}`.
    ///
    /// Different fragments are merged and `None` is returned. If `i` and `j`
    /// already share a fragment the edge closes a cycle: the cut over that
    /// fragment is returned and labels are left as they are.
    pub fn join(&mut self, i: usize, j: usize) -> Option<SubtourCut> {
        if self.merge(i, j) {
            return None;
        }
        Some(self.cut_for(self.labels[i]))
    }

    /// Cut over every pair inside the fragment `label`.
    fn cut_for(&self, label: usize) -> SubtourCut {
        let nodes = self.fragment(label);
        let mut edges = Vec::with_capacity(nodes.len() * nodes.len().saturating_sub(1) / 2);
        for (a, &h) in nodes.iter().enumerate() {
            for &k in &nodes[a + 1..] {
                edges.push(self.edges.position(h, k));
            }
        }
        SubtourCut {
            rhs: nodes.len().saturating_sub(1),
            nodes,
            edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_first_label() {
        let mut tracker = ComponentTracker::new(5);
        assert!(tracker.merge(1, 3));
        assert_eq!(tracker.labels(), &[0, 1, 2, 1, 4]);
        assert!(tracker.merge(3, 4));
        assert_eq!(tracker.labels(), &[0, 1, 2, 1, 1]);
        assert!(tracker.merge(0, 4));
        assert_eq!(tracker.labels(), &[0, 0, 2, 0, 0]);
        // Relabel of a fragment reached through the second argument
        assert_eq!(tracker.label(1), 0);
        assert!(!tracker.merge(3, 1));
    }

    #[test]
    fn test_join_closing_triangle() {
        let mut tracker = ComponentTracker::new(6);
        assert!(tracker.join(0, 1).is_none());
        assert!(tracker.join(0, 2).is_none());
        let cut = tracker.join(1, 2).expect("closing edge emits a cut");

        assert_eq!(cut.nodes, vec![0, 1, 2]);
        assert_eq!(cut.size(), 3);
        assert_eq!(cut.rhs, 2);
        let index = EdgeIndex::new(6);
        assert_eq!(
            cut.edges,
            vec![index.position(0, 1), index.position(0, 2), index.position(1, 2)]
        );
        // labels untouched by the closing edge
        assert_eq!(tracker.labels(), &[0, 0, 0, 3, 4, 5]);
    }

    #[test]
    fn test_reset() {
        let mut tracker = ComponentTracker::new(4);
        tracker.merge(0, 1);
        tracker.merge(2, 3);
        tracker.reset();
        assert_eq!(tracker.labels(), &[0, 1, 2, 3]);
        assert_eq!(tracker.fragment(2), vec![2]);
    }
}
