//! Problem instances.
//!
//! An [`Instance`] is a fixed node indexing `0..n` with a dense,
//! symmetric distance matrix. It can be built from 2-D points and a
//! [`Metric`], or from any distance function over node indices.
//!
//! # Key Types
//!
//! - [`Point`]: a 2-D coordinate
//! - [`Metric`]: pluggable distance over points (TSPLIB edge weight types)
//! - [`Instance`]: validated distance matrix shared by every heuristic
//! - [`CandidateList`]: per-node neighbours sorted by distance
//!
//! # References
//!
//! Reinelt (1991), "TSPLIB - A Traveling Salesman Problem Library",
//! *ORSA Journal on Computing* 3(4), 376-384.

mod candidates;

pub use candidates::CandidateList;

use crate::error::{Error, Result};

/// A 2-D coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Distance function over two points.
///
/// The rounded variants follow the TSPLIB conventions so that tour costs
/// are comparable with published optima.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Metric {
    /// Plain Euclidean distance.
    #[default]
    Euclidean,
    /// Euclidean distance rounded to the nearest integer (`EUC_2D`).
    Euc2d,
    /// Euclidean distance rounded up (`CEIL_2D`).
    Ceil2d,
    /// L1 distance (`MAN_2D`).
    Manhattan,
    /// L∞ distance (`MAX_2D`).
    Maximum,
    /// Pseudo-Euclidean distance (`ATT`).
    Att,
}

impl Metric {
    /// Distance between `a` and `b` under this metric.
    pub fn distance(self, a: Point, b: Point) -> f64 {
        let dx = a.x - b.x;
        let dy = a.y - b.y;
        match self {
            Metric::Euclidean => (dx * dx + dy * dy).sqrt(),
            Metric::Euc2d => (dx * dx + dy * dy).sqrt().round(),
            Metric::Ceil2d => (dx * dx + dy * dy).sqrt().ceil(),
            Metric::Manhattan => dx.abs() + dy.abs(),
            Metric::Maximum => dx.abs().max(dy.abs()),
            Metric::Att => {
                let r = ((dx * dx + dy * dy) / 10.0).sqrt();
                let t = r.round();
                if t < r {
                    t + 1.0
                } else {
                    t
                }
            }
        }
    }
}

/// A validated TSP instance.
///
/// The matrix is symmetric with a zero diagonal; every off-diagonal entry
/// is finite and non-negative. Construction fails fast otherwise, before
/// any heuristic or model is built.
///
/// # Examples
///
/// ```
/// use u_tsp::instance::{Instance, Metric, Point};
///
/// let square = vec![
///     Point::new(0.0, 0.0),
///     Point::new(0.0, 1.0),
///     Point::new(1.0, 1.0),
///     Point::new(1.0, 0.0),
/// ];
/// let instance = Instance::from_points(square, Metric::Euclidean).unwrap();
/// assert_eq!(instance.node_count(), 4);
/// assert!((instance.distance(0, 2) - 2f64.sqrt()).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct Instance {
    n: usize,
    distances: Vec<f64>,
    points: Option<Vec<Point>>,
}

impl Instance {
    /// Builds an instance from coordinates and a metric.
    pub fn from_points(points: Vec<Point>, metric: Metric) -> Result<Self> {
        let n = points.len();
        let mut instance = Self::from_fn(n, |i, j| metric.distance(points[i], points[j]))?;
        instance.points = Some(points);
        Ok(instance)
    }

    /// Builds an instance from a distance function over node indices.
    ///
    /// `distance` is evaluated once per unordered pair `i < j`; the matrix
    /// is mirrored from those values.
    pub fn from_fn<F>(n: usize, distance: F) -> Result<Self>
    where
        F: Fn(usize, usize) -> f64,
    {
        if n < 2 {
            return Err(Error::malformed_instance(format!(
                "need at least 2 nodes, got {n}"
            )));
        }

        let mut distances = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = distance(i, j);
                if !d.is_finite() || d < 0.0 {
                    return Err(Error::malformed_instance(format!(
                        "distance({i}, {j}) = {d} is not a finite non-negative value"
                    )));
                }
                distances[i * n + j] = d;
                distances[j * n + i] = d;
            }
        }

        log::debug!("instance: built distance matrix nodes={n}");

        Ok(Self {
            n,
            distances,
            points: None,
        })
    }

    /// Builds an instance from a full row-major matrix.
    ///
    /// Only the upper triangle is read.
    pub fn from_matrix(n: usize, matrix: &[f64]) -> Result<Self> {
        if matrix.len() != n * n {
            return Err(Error::malformed_instance(format!(
                "matrix has {} entries, expected {}",
                matrix.len(),
                n * n
            )));
        }
        Self::from_fn(n, |i, j| matrix[i * n + j])
    }

    /// Number of nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.n
    }

    /// Distance between nodes `i` and `j`.
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distances[i * self.n + j]
    }

    /// Coordinates, when the instance was built from points.
    pub fn points(&self) -> Option<&[Point]> {
        self.points.as_deref()
    }

    /// Cost of the closed cycle visiting `order` in sequence.
    pub fn cycle_cost(&self, order: &[usize]) -> f64 {
        if order.len() < 2 {
            return 0.0;
        }
        let mut cost = 0.0;
        for w in order.windows(2) {
            cost += self.distance(w[0], w[1]);
        }
        cost + self.distance(order[order.len() - 1], order[0])
    }
}
