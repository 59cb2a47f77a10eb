//! Genetic engine configuration.
//!
//! [`GeneticConfig`] holds all parameters that control the evolutionary loop.

/// Configuration for the [`GeneticRunner`](super::GeneticRunner).
///
/// # Defaults
///
/// ```
/// use u_tsp::genetic::GeneticConfig;
///
/// let config = GeneticConfig::default();
/// assert_eq!(config.population_size, 50);
/// assert_eq!(config.max_generations, 200);
/// assert!((config.mutation_rate - 0.01).abs() < 1e-12);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_tsp::genetic::GeneticConfig;
///
/// let config = GeneticConfig::default()
///     .with_population_size(80)
///     .with_offspring_count(40)
///     .with_two_opt(false)
///     .with_seed(7);
/// assert_eq!(config.offspring_count, 40);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneticConfig {
    /// Number of tours kept from one generation to the next.
    pub population_size: usize,

    /// Maximum number of generations before termination.
    pub max_generations: usize,

    /// Children bred per generation.
    ///
    /// `0` means one child per population slot.
    pub offspring_count: usize,

    /// Probability that a child receives one random gene before repair.
    pub mutation_rate: f64,

    /// Whether children may be refined by 2-opt.
    ///
    /// When enabled a child is refined with probability `1 / floor(N / 2)`.
    pub two_opt: bool,

    /// Seed the population from random start nodes instead of spreading
    /// start nodes `0, 1, 2, …` over the population.
    pub random_start: bool,

    /// Generations without a strictly better best tour before stopping.
    ///
    /// Set to 0 to disable stagnation-based termination.
    pub stagnation_limit: usize,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,

    /// Optional wall-clock time limit in milliseconds.
    ///
    /// Checked at the start of each generation, so the actual runtime may
    /// exceed the limit by one generation's worth of work.
    pub time_limit_ms: Option<u64>,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            max_generations: 200,
            offspring_count: 0,
            mutation_rate: 0.01,
            two_opt: true,
            random_start: true,
            stagnation_limit: 50,
            seed: None,
            time_limit_ms: None,
        }
    }
}

impl GeneticConfig {
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    pub fn with_offspring_count(mut self, n: usize) -> Self {
        self.offspring_count = n;
        self
    }

    /// Sets the mutation rate, clamped to `[0, 1]`.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_two_opt(mut self, enabled: bool) -> Self {
        self.two_opt = enabled;
        self
    }

    pub fn with_random_start(mut self, enabled: bool) -> Self {
        self.random_start = enabled;
        self
    }

    /// Sets the stagnation limit (0 to disable).
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Effective number of children per generation.
    pub fn children_per_generation(&self) -> usize {
        if self.offspring_count == 0 {
            self.population_size
        } else {
            self.offspring_count
        }
    }

    /// Preset for fast runs: small population, few generations.
    ///
    /// - Population: 30, Generations: 50, Time limit: 5s
    pub fn fast() -> Self {
        Self {
            population_size: 30,
            max_generations: 50,
            stagnation_limit: 15,
            time_limit_ms: Some(5_000),
            ..Self::default()
        }
    }

    /// Preset for balanced runs.
    ///
    /// - Population: 50, Generations: 200, Time limit: 30s
    pub fn balanced() -> Self {
        Self {
            population_size: 50,
            max_generations: 200,
            stagnation_limit: 50,
            time_limit_ms: Some(30_000),
            ..Self::default()
        }
    }

    /// Preset for quality runs: large population, many generations.
    ///
    /// - Population: 100, Generations: 500, Time limit: 120s
    pub fn quality() -> Self {
        Self {
            population_size: 100,
            max_generations: 500,
            stagnation_limit: 100,
            time_limit_ms: Some(120_000),
            ..Self::default()
        }
    }

    /// Selects a preset from the node count.
    ///
    /// - `n < 100` → [`fast()`](Self::fast)
    /// - `100 ≤ n < 1000` → [`balanced()`](Self::balanced)
    /// - `n ≥ 1000` → [`quality()`](Self::quality)
    pub fn auto_select(node_count: usize) -> Self {
        if node_count < 100 {
            Self::fast()
        } else if node_count < 1000 {
            Self::balanced()
        } else {
            Self::quality()
        }
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.population_size < 2 {
            return Err("population_size must be at least 2".into());
        }
        if self.max_generations == 0 {
            return Err("max_generations must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err("mutation_rate must be within [0, 1]".into());
        }
        if self.time_limit_ms == Some(0) {
            return Err("time_limit_ms must be positive or None".into());
        }
        Ok(())
    }
}
