//! Consistency pass over fixed edges.

use super::fixing::FixedEdges;
use super::guard::BoundSession;
use crate::cuts::ComponentTracker;

/// Forbids the direct edge between the two ends of every fixed chain.
///
/// Fixed edges form disjoint paths. Closing a path that misses some node
/// would create a subtour the solver must later cut away, so its closing
/// edge is forced to 0 up front. A path covering all `N` nodes is left
/// alone: its closing edge completes the tour. Edges already fixed or
/// forbidden are not touched.
///
/// Drains `fixed` and returns the number of edges forbidden.
pub fn preprocess(session: &mut BoundSession<'_>, fixed: &mut FixedEdges) -> usize {
    let index = session.index();
    let n = index.node_count();
    let pairs = fixed.drain();

    let mut tracker = ComponentTracker::new(n);
    let mut degree = vec![0usize; n];
    for &(i, j) in &pairs {
        degree[i] += 1;
        degree[j] += 1;
        tracker.merge(i, j);
    }

    // Chain ends grouped by fragment label
    let mut ends: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut sizes = vec![0usize; n];
    for node in 0..n {
        sizes[tracker.label(node)] += 1;
        if degree[node] == 1 {
            ends[tracker.label(node)].push(node);
        }
    }

    let mut forbidden = 0;
    for (label, chain_ends) in ends.iter().enumerate() {
        if chain_ends.len() != 2 || sizes[label] >= n {
            continue;
        }
        let p = index.position(chain_ends[0], chain_ends[1]);
        if session.model().is_free(p) {
            session.forbid_position(p);
            forbidden += 1;
        }
    }

    log::debug!(
        "matheuristic: preprocessed fixed={} forbidden={forbidden}",
        pairs.len()
    );
    forbidden
}
