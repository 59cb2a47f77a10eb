//! Matheuristic configuration.

use crate::model::SolverConfig;

/// Configuration for the [`Matheuristic`](super::Matheuristic) loop.
///
/// ```
/// use u_tsp::matheuristic::MatheuristicConfig;
///
/// let config = MatheuristicConfig::default()
///     .with_fixing_probability(0.8)
///     .with_max_rounds(10);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatheuristicConfig {
    /// Probability of fixing each edge of the reference tour.
    pub fixing_probability: f64,

    /// Resampling attempts while a sample fixes `N − 1` or more edges.
    ///
    /// Ignored when `fixing_probability >= 1.0`.
    pub max_resamples: usize,

    /// Maximum fix/solve/release rounds.
    pub max_rounds: usize,

    /// Rounds without a strictly better tour before stopping (0 disables).
    pub stagnation_limit: usize,

    /// In two-parent recombination, also forbid every edge both parents
    /// omit, restricting the solve to the union of their edges.
    pub forbid_common_absent: bool,

    /// Wall-clock limit over all rounds; `None` for no limit.
    pub time_limit_ms: Option<u64>,

    /// Per-solve limits, further capped by the remaining wall-clock time.
    pub solver: SolverConfig,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for MatheuristicConfig {
    fn default() -> Self {
        Self {
            fixing_probability: 0.7,
            max_resamples: 16,
            max_rounds: 30,
            stagnation_limit: 10,
            forbid_common_absent: true,
            time_limit_ms: None,
            solver: SolverConfig::default().with_time_limit_ms(10_000),
            seed: None,
        }
    }
}

impl MatheuristicConfig {
    /// Sets the fixing probability, clamped to `[0, 1]`.
    pub fn with_fixing_probability(mut self, p: f64) -> Self {
        self.fixing_probability = p.clamp(0.0, 1.0);
        self
    }

    pub fn with_max_resamples(mut self, n: usize) -> Self {
        self.max_resamples = n;
        self
    }

    pub fn with_max_rounds(mut self, n: usize) -> Self {
        self.max_rounds = n;
        self
    }

    pub fn with_stagnation_limit(mut self, n: usize) -> Self {
        self.stagnation_limit = n;
        self
    }

    pub fn with_forbid_common_absent(mut self, enabled: bool) -> Self {
        self.forbid_common_absent = enabled;
        self
    }

    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.fixing_probability) {
            return Err("fixing_probability must be within [0, 1]".into());
        }
        if self.max_rounds == 0 {
            return Err("max_rounds must be at least 1".into());
        }
        if self.time_limit_ms == Some(0) {
            return Err("time_limit_ms must be positive or None".into());
        }
        if self.solver.time_limit_ms == 0 {
            return Err("solver.time_limit_ms must be positive".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MatheuristicConfig::default();
        assert_eq!(config.max_resamples, 16);
        assert!(config.forbid_common_absent);
        assert_eq!(config.solver.time_limit_ms, 10_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_probability_clamped() {
        let config = MatheuristicConfig::default().with_fixing_probability(1.7);
        assert_eq!(config.fixing_probability, 1.0);
    }

    #[test]
    fn test_validate_rejects() {
        assert!(MatheuristicConfig::default().with_max_rounds(0).validate().is_err());
        assert!(MatheuristicConfig::default().with_time_limit_ms(0).validate().is_err());
        let config = MatheuristicConfig::default()
            .with_solver(SolverConfig::default().with_time_limit_ms(0));
        assert!(config.validate().is_err());

        let mut config = MatheuristicConfig::default();
        config.fixing_probability = -0.1;
        assert!(config.validate().is_err());
    }
}
