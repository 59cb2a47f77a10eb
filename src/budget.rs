//! Wall-clock budget shared across repeated solver calls.

use std::time::{Duration, Instant};

use crate::model::SolverConfig;

/// A wall-clock allowance started at construction.
///
/// Each exact solve receives only the time that remains, so a sequence of
/// solves never exceeds the overall limit by more than one call's overrun.
///
/// ```
/// use u_tsp::budget::TimeBudget;
///
/// let budget = TimeBudget::new(Some(60_000));
/// assert!(!budget.is_exhausted());
/// assert!(budget.residual_ms().unwrap() <= 60_000);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TimeBudget {
    start: Instant,
    limit: Option<Duration>,
}

impl TimeBudget {
    /// Starts a budget of `limit_ms` milliseconds; `None` never expires.
    pub fn new(limit_ms: Option<u64>) -> Self {
        Self {
            start: Instant::now(),
            limit: limit_ms.map(Duration::from_millis),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(None)
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Milliseconds left, clamped at zero; `None` when unlimited.
    pub fn residual_ms(&self) -> Option<u64> {
        self.limit
            .map(|limit| limit.saturating_sub(self.start.elapsed()).as_millis() as u64)
    }

    pub fn is_exhausted(&self) -> bool {
        self.residual_ms() == Some(0)
    }

    /// `base` with its time limit lowered to the residual time.
    pub fn solver_config(&self, base: &SolverConfig) -> SolverConfig {
        let mut config = base.clone();
        if let Some(residual) = self.residual_ms() {
            config.time_limit_ms = config.time_limit_ms.min(residual);
        }
        config
    }
}
