//! Tour observers and plottable edge lists.
//!
//! Solvers report every new best tour to a [`TourSink`]. Sinks never affect
//! the search; [`NullSink`] discards everything.

use crate::instance::Point;
use crate::tour::Tour;

/// Receives tours as a solver improves them.
pub trait TourSink {
    /// `label` names the phase that produced the tour (`"genetic"`,
    /// `"matheuristic"`, …).
    fn on_tour(&mut self, tour: &Tour, label: &str);
}

/// Discards every tour.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl TourSink for NullSink {
    fn on_tour(&mut self, _tour: &Tour, _label: &str) {}
}

/// Writes a one-line summary of every tour through `log::info!`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl TourSink for LogSink {
    fn on_tour(&mut self, tour: &Tour, label: &str) {
        log::info!("plot: {label} cost={:.4} nodes={}", tour.cost(), tour.len());
    }
}

/// Keeps every reported tour with its label.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub tours: Vec<(String, Tour)>,
}

impl TourSink for RecordingSink {
    fn on_tour(&mut self, tour: &Tour, label: &str) {
        self.tours.push((label.to_string(), tour.clone()));
    }
}

/// Cycle edges in visiting order, closing edge last.
pub fn edge_list(tour: &Tour) -> Vec<(usize, usize)> {
    tour.edges().collect()
}

/// Line segments of the cycle for a 2-D plot.
///
/// Returns `None` if some node has no coordinate.
pub fn segments(tour: &Tour, points: &[Point]) -> Option<Vec<(Point, Point)>> {
    tour.edges()
        .map(|(a, b)| Some((*points.get(a)?, *points.get(b)?)))
        .collect()
}
