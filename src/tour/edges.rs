//! Edge indexing and incidence vectors.

use super::Tour;
use crate::error::{Error, Result};
use crate::instance::Instance;

/// Canonical index of unordered node pairs.
///
/// Maps `{i, j}` with `i != j` to `0..n(n-1)/2`, row by row over `i < j`:
/// `pos(i, j) = i·n + j − (i+1)(i+2)/2`. Symmetric in its arguments and
/// undefined on the diagonal.
///
/// # Examples
///
/// ```
/// use u_tsp::tour::EdgeIndex;
///
/// let edges = EdgeIndex::new(4);
/// assert_eq!(edges.len(), 6);
/// assert_eq!(edges.pos(0, 1), Some(0));
/// assert_eq!(edges.pos(3, 2), Some(5));
/// assert_eq!(edges.pos(1, 1), None);
/// assert_eq!(edges.pair(4), (1, 3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeIndex {
    n: usize,
}

impl EdgeIndex {
    pub fn new(n: usize) -> Self {
        Self { n }
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.n
    }

    /// Number of unordered pairs, `n(n-1)/2`.
    pub fn len(&self) -> usize {
        self.n * self.n.saturating_sub(1) / 2
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of `{i, j}`, `None` when `i == j`.
    #[inline]
    pub fn pos(&self, i: usize, j: usize) -> Option<usize> {
        if i == j {
            return None;
        }
        let (i, j) = if i < j { (i, j) } else { (j, i) };
        Some(i * self.n + j - (i + 1) * (i + 2) / 2)
    }

    /// Index of `{i, j}`.
    ///
    /// # Panics
    /// Panics if `i == j`.
    #[inline]
    pub fn position(&self, i: usize, j: usize) -> usize {
        self.pos(i, j).expect("edge index undefined for a self-loop")
    }

    /// Inverse of [`pos`](Self::pos): the pair `(i, j)`, `i < j`, stored at `p`.
    pub fn pair(&self, p: usize) -> (usize, usize) {
        assert!(p < self.len(), "edge position {p} out of range");
        let mut rest = p;
        let mut i = 0;
        loop {
            let row = self.n - 1 - i;
            if rest < row {
                return (i, i + 1 + rest);
            }
            rest -= row;
            i += 1;
        }
    }

    /// All pairs `(i, j)`, `i < j`, in position order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> {
        let n = self.n;
        (0..n).flat_map(move |i| ((i + 1)..n).map(move |j| (i, j)))
    }
}

/// A 0/1 value per unordered pair.
///
/// Each slot corresponds to one binary decision variable of the exact
/// model. A tour has exactly `n` present edges and every node has degree 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeIncidence {
    index: EdgeIndex,
    present: Vec<bool>,
}

impl EdgeIncidence {
    /// All-absent vector over `n` nodes.
    pub fn empty(n: usize) -> Self {
        let index = EdgeIndex::new(n);
        Self {
            present: vec![false; index.len()],
            index,
        }
    }

    /// Incidence vector of a tour's cycle edges.
    pub fn from_tour(tour: &Tour) -> Self {
        let mut incidence = Self::empty(tour.len());
        for (a, b) in tour.edges() {
            incidence.set(a, b, true);
        }
        incidence
    }

    /// Reads solver values, treating `>= 0.5` as present.
    pub fn from_values(n: usize, values: &[f64]) -> Result<Self> {
        let index = EdgeIndex::new(n);
        if values.len() != index.len() {
            return Err(Error::invalid_tour(format!(
                "{} incidence values for {n} nodes, expected {}",
                values.len(),
                index.len()
            )));
        }
        Ok(Self {
            present: values.iter().map(|&v| v >= 0.5).collect(),
            index,
        })
    }

    pub fn index(&self) -> EdgeIndex {
        self.index
    }

    pub fn node_count(&self) -> usize {
        self.index.node_count()
    }

    pub fn set(&mut self, i: usize, j: usize, value: bool) {
        let p = self.index.position(i, j);
        self.present[p] = value;
    }

    pub fn contains(&self, i: usize, j: usize) -> bool {
        self.index.pos(i, j).is_some_and(|p| self.present[p])
    }

    /// Whether the variable at position `p` is 1.
    #[inline]
    pub fn is_set(&self, p: usize) -> bool {
        self.present[p]
    }

    /// Number of present edges.
    pub fn count(&self) -> usize {
        self.present.iter().filter(|&&v| v).count()
    }

    /// Positions of present edges, ascending.
    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.present
            .iter()
            .enumerate()
            .filter_map(|(p, &v)| v.then_some(p))
    }

    /// Values as `0.0`/`1.0`, the form an exact solver reports.
    pub fn to_values(&self) -> Vec<f64> {
        self.present
            .iter()
            .map(|&v| if v { 1.0 } else { 0.0 })
            .collect()
    }

    /// Sum of distances of present edges.
    pub fn cost(&self, instance: &Instance) -> f64 {
        self.positions()
            .map(|p| {
                let (i, j) = self.index.pair(p);
                instance.distance(i, j)
            })
            .sum()
    }

    /// Reconstructs the visiting order by walking present edges from node 0.
    ///
    /// At each node the walk moves to the first incident present edge whose
    /// other endpoint is not yet visited. Fails unless the present edges form
    /// exactly one Hamiltonian cycle.
    pub fn to_tour(&self, instance: &Instance) -> Result<Tour> {
        let n = self.node_count();
        if n != instance.node_count() {
            return Err(Error::invalid_tour(format!(
                "incidence over {n} nodes, instance has {}",
                instance.node_count()
            )));
        }

        let mut adjacency: Vec<Vec<usize>> = vec![Vec::with_capacity(2); n];
        for p in self.positions() {
            let (i, j) = self.index.pair(p);
            adjacency[i].push(j);
            adjacency[j].push(i);
        }
        if let Some(node) = (0..n).find(|&v| adjacency[v].len() != 2) {
            return Err(Error::invalid_tour(format!(
                "node {node} has degree {}, expected 2",
                adjacency[node].len()
            )));
        }

        let mut visited = vec![false; n];
        let mut order = Vec::with_capacity(n);
        let mut node = 0;
        loop {
            visited[node] = true;
            order.push(node);
            match adjacency[node].iter().copied().find(|&v| !visited[v]) {
                Some(next) => node = next,
                None => break,
            }
        }

        if order.len() != n {
            return Err(Error::invalid_tour(format!(
                "present edges close a subtour of {} nodes out of {n}",
                order.len()
            )));
        }
        Tour::from_order(instance, order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pos_is_bijection() {
        for n in 2..12 {
            let index = EdgeIndex::new(n);
            let mut seen = vec![false; index.len()];
            for i in 0..n {
                for j in 0..n {
                    if i == j {
                        assert_eq!(index.pos(i, j), None);
                        continue;
                    }
                    let p = index.pos(i, j).unwrap();
                    assert_eq!(Some(p), index.pos(j, i));
                    assert!(p < index.len());
                    if i < j {
                        assert!(!seen[p], "duplicate position {p} for n={n}");
                        seen[p] = true;
                        assert_eq!(index.pair(p), (i, j));
                    }
                }
            }
            assert!(seen.iter().all(|&s| s));
        }
    }

    #[test]
    fn test_pairs_follow_position_order() {
        let index = EdgeIndex::new(5);
        for (p, (i, j)) in index.pairs().enumerate() {
            assert_eq!(index.position(i, j), p);
        }
    }

    #[test]
    fn test_incidence_roundtrip_through_tour() {
        let instance = Instance::from_fn(5, |i, j| (i + j) as f64).unwrap();
        let tour = Tour::from_order(&instance, vec![0, 3, 1, 4, 2]).unwrap();
        let incidence = EdgeIncidence::from_tour(&tour);

        assert_eq!(incidence.count(), 5);
        assert!(incidence.contains(3, 0));
        assert!(incidence.contains(2, 0));
        assert!(!incidence.contains(0, 1));
        assert!((incidence.cost(&instance) - tour.cost()).abs() < 1e-12);

        let back = incidence.to_tour(&instance).unwrap();
        assert!((back.cost() - tour.cost()).abs() < 1e-12);
        assert_eq!(EdgeIncidence::from_tour(&back), incidence);
    }

    #[test]
    fn test_from_values_threshold() {
        let values = [0.9, 0.1, 0.5, 0.49, 0.0, 1.0];
        let incidence = EdgeIncidence::from_values(4, &values).unwrap();
        let present: Vec<usize> = incidence.positions().collect();
        assert_eq!(present, vec![0, 2, 5]);
        assert!(EdgeIncidence::from_values(4, &[1.0; 5]).is_err());
    }

    #[test]
    fn test_to_tour_rejects_subtours() {
        let instance = Instance::from_fn(6, |_, _| 1.0).unwrap();
        let mut incidence = EdgeIncidence::empty(6);
        for (a, b) in [(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)] {
            incidence.set(a, b, true);
        }
        assert!(matches!(
            incidence.to_tour(&instance),
            Err(Error::InvalidTour(_))
        ));

        incidence.set(2, 0, false);
        assert!(incidence.to_tour(&instance).is_err());
    }
}
