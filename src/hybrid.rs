//! End-to-end pipeline.
//!
//! Candidate lists, then the genetic engine, then edge-fixing rounds over
//! the exact model seeded with the genetic best. Between the two, the best
//! tour is recombined with a few polish nearest-neighbour walks. One
//! wall-clock limit covers all phases; each phase gets what the previous
//! ones left.
//!
//! ```
//! use u_tsp::hybrid::{HybridConfig, HybridSolver};
//! use u_tsp::instance::{Instance, Metric, Point};
//! use u_tsp::model::EnumerativeSolver;
//!
//! let points = vec![
//!     Point::new(0.0, 0.0),
//!     Point::new(1.0, 0.0),
//!     Point::new(1.0, 1.0),
//!     Point::new(0.0, 1.0),
//!     Point::new(0.5, 1.5),
//! ];
//! let instance = Instance::from_points(points, Metric::Euclidean).unwrap();
//! let config = HybridConfig::fast().with_seed(7);
//! let result = HybridSolver::solve(&instance, &EnumerativeSolver::new(), &config).unwrap();
//! assert_eq!(result.best.len(), 5);
//! assert!(result.best_cost <= result.genetic.best_cost);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::budget::TimeBudget;
use crate::construct::polish_nearest_neighbor;
use crate::error::{Error, Result};
use crate::genetic::{GeneticConfig, GeneticResult, GeneticRunner};
use crate::instance::{CandidateList, Instance};
use crate::matheuristic::{Matheuristic, MatheuristicConfig, MatheuristicResult};
use crate::model::{EdgeModel, ExactSolver};
use crate::plot::{NullSink, TourSink};
use crate::random::rng_from_option;
use crate::tour::{EdgeIncidence, Tour};

// ============================================================================
// Config
// ============================================================================

/// Configuration for [`HybridSolver`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HybridConfig {
    pub genetic: GeneticConfig,
    pub matheuristic: MatheuristicConfig,

    /// Build the exact model over the `k` nearest neighbours of each node
    /// only. `None` keeps every pair. The genetic best is always admitted.
    pub sparse_neighbors: Option<usize>,

    /// Run one two-parent round between the two best distinct individuals
    /// of the final population before the single-parent rounds.
    pub recombine: bool,

    /// Polish nearest-neighbour walks recombined with the incumbent, one
    /// two-parent round each. Duplicate walks are skipped. 0 disables, as
    /// does `recombine = false`.
    pub polish_walks: usize,

    /// Wall-clock limit over all phases; `None` defers to the phase limits.
    pub time_limit_ms: Option<u64>,

    /// Seed shared by every phase. Overrides the phase seeds.
    pub seed: Option<u64>,
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            genetic: GeneticConfig::default(),
            matheuristic: MatheuristicConfig::default(),
            sparse_neighbors: Some(10),
            recombine: true,
            polish_walks: 4,
            time_limit_ms: None,
            seed: None,
        }
    }
}

impl HybridConfig {
    pub fn with_genetic(mut self, genetic: GeneticConfig) -> Self {
        self.genetic = genetic;
        self
    }

    pub fn with_matheuristic(mut self, matheuristic: MatheuristicConfig) -> Self {
        self.matheuristic = matheuristic;
        self
    }

    /// Sets the sparse neighbourhood size, at least 2.
    pub fn with_sparse_neighbors(mut self, k: usize) -> Self {
        self.sparse_neighbors = Some(k.max(2));
        self
    }

    pub fn with_dense_model(mut self) -> Self {
        self.sparse_neighbors = None;
        self
    }

    pub fn with_recombine(mut self, enabled: bool) -> Self {
        self.recombine = enabled;
        self
    }

    pub fn with_polish_walks(mut self, walks: usize) -> Self {
        self.polish_walks = walks;
        self
    }

    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Small population and few rounds.
    pub fn fast() -> Self {
        Self {
            genetic: GeneticConfig::fast(),
            matheuristic: MatheuristicConfig::default()
                .with_max_rounds(10)
                .with_stagnation_limit(5),
            time_limit_ms: Some(10_000),
            ..Self::default()
        }
    }

    pub fn balanced() -> Self {
        Self {
            genetic: GeneticConfig::balanced(),
            time_limit_ms: Some(60_000),
            ..Self::default()
        }
    }

    pub fn quality() -> Self {
        Self {
            genetic: GeneticConfig::quality(),
            matheuristic: MatheuristicConfig::default()
                .with_max_rounds(100)
                .with_stagnation_limit(25),
            sparse_neighbors: Some(15),
            time_limit_ms: Some(300_000),
            ..Self::default()
        }
    }

    /// Picks the genetic preset by instance size.
    pub fn auto_select(node_count: usize) -> Self {
        Self {
            genetic: GeneticConfig::auto_select(node_count),
            ..Self::default()
        }
    }

    /// Validates this configuration and both phase configurations.
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.genetic.validate().map_err(|e| format!("genetic: {e}"))?;
        self.matheuristic
            .validate()
            .map_err(|e| format!("matheuristic: {e}"))?;
        if self.sparse_neighbors.is_some_and(|k| k < 2) {
            return Err("sparse_neighbors must be at least 2".into());
        }
        if self.time_limit_ms == Some(0) {
            return Err("time_limit_ms must be positive or None".into());
        }
        Ok(())
    }
}

// ============================================================================
// Result
// ============================================================================

/// Outcome of a pipeline run with per-phase statistics.
#[derive(Debug, Clone)]
pub struct HybridResult {
    pub best: Tour,
    pub best_cost: f64,
    pub genetic: GeneticResult,
    /// Cost of the two-parent child, when that round produced one.
    pub recombined_cost: Option<f64>,
    /// Polish rounds attempted and how many improved the incumbent.
    pub polish_rounds: usize,
    pub polish_improvements: usize,
    /// `None` when no time remained after the genetic phase.
    pub matheuristic: Option<MatheuristicResult>,
    /// Variables free in the exact model's base bounds.
    pub model_variables: usize,
    pub elapsed_ms: u64,
    pub cancelled: bool,
}

// ============================================================================
// Solver
// ============================================================================

/// Pipeline runner.
pub struct HybridSolver;

impl HybridSolver {
    pub fn solve<S: ExactSolver + ?Sized>(
        instance: &Instance,
        solver: &S,
        config: &HybridConfig,
    ) -> Result<HybridResult> {
        Self::solve_with_sink(instance, solver, config, &mut NullSink, None)
    }

    /// Runs every phase, reporting each strictly better tour to `sink`.
    ///
    /// Cancellation is checked between phases and inside the genetic and
    /// matheuristic loops.
    pub fn solve_with_sink<S: ExactSolver + ?Sized>(
        instance: &Instance,
        solver: &S,
        config: &HybridConfig,
        sink: &mut dyn TourSink,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<HybridResult> {
        config.validate().map_err(Error::InvalidConfig)?;
        let n = instance.node_count();
        if n < 3 {
            return Err(Error::malformed_instance(format!(
                "hybrid pipeline needs at least 3 nodes, got {n}"
            )));
        }
        let budget = TimeBudget::new(config.time_limit_ms);
        let mut rng = rng_from_option(config.seed.or(config.genetic.seed));
        let is_cancelled = || cancel.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed));

        // 1. Candidate edges
        let candidates = CandidateList::build(instance)?;

        // 2. Genetic phase
        let mut genetic_config = config.genetic.clone();
        genetic_config.time_limit_ms = capped(genetic_config.time_limit_ms, &budget);
        let genetic = GeneticRunner::run_with_rng(
            instance,
            &candidates,
            &genetic_config,
            &mut rng,
            sink,
            cancel.clone(),
        )?;
        let mut best = genetic.best.clone();
        log::info!(
            "hybrid: genetic phase best={:.4} generations={} elapsed_ms={}",
            genetic.best_cost,
            genetic.generations,
            budget.elapsed_ms()
        );

        // 3. Exact model around the genetic best
        let mut model = match config.sparse_neighbors {
            Some(k) => EdgeModel::sparse(instance, &candidates, k),
            None => EdgeModel::new(instance),
        };
        model.admit(&EdgeIncidence::from_tour(&best));
        let polish = if config.recombine && config.polish_walks > 0 {
            polish_pool(instance, &candidates, &best, config.polish_walks, &mut rng)?
        } else {
            Vec::new()
        };
        for tour in &polish {
            model.admit(&EdgeIncidence::from_tour(tour));
        }
        let model_variables = (0..model.variable_count())
            .filter(|&p| !model.is_excluded(p))
            .count();

        let mut cancelled = genetic.cancelled || is_cancelled();
        let mut recombined_cost = None;
        let mut matheuristic = None;

        // 4. Two-parent round
        if config.recombine && !cancelled && !budget.is_exhausted() {
            if let Some(partner) = second_parent(&genetic, &best) {
                match Matheuristic::recombine(
                    instance,
                    &mut model,
                    solver,
                    &best,
                    partner,
                    &config.matheuristic,
                    &budget,
                ) {
                    Ok((child, _)) => {
                        recombined_cost = Some(child.cost());
                        if child.cost() < best.cost() {
                            best = child;
                            sink.on_tour(&best, "recombine");
                        }
                    }
                    Err(Error::Solver { status }) => {
                        log::warn!("hybrid: recombination gave no tour status={status:?}");
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        // 5. Polish rounds
        let mut polish_rounds = 0;
        let mut polish_improvements = 0;
        for partner in &polish {
            cancelled = cancelled || is_cancelled();
            if cancelled || budget.is_exhausted() {
                break;
            }
            if EdgeIncidence::from_tour(partner) == EdgeIncidence::from_tour(&best) {
                continue;
            }
            polish_rounds += 1;
            match Matheuristic::recombine(
                instance,
                &mut model,
                solver,
                &best,
                partner,
                &config.matheuristic,
                &budget,
            ) {
                Ok((child, _)) if child.cost() < best.cost() => {
                    log::debug!(
                        "hybrid: polish round={polish_rounds} improved {:.4} -> {:.4}",
                        best.cost(),
                        child.cost()
                    );
                    best = child;
                    polish_improvements += 1;
                    sink.on_tour(&best, "polish");
                }
                Ok(_) => {}
                Err(Error::Solver { status }) => {
                    log::warn!("hybrid: polish round={polish_rounds} status={status:?}");
                }
                Err(err) => return Err(err),
            }
        }

        // 6. Single-parent rounds
        cancelled = cancelled || is_cancelled();
        if !cancelled && !budget.is_exhausted() {
            let mut fixing_config = config.matheuristic.clone();
            fixing_config.time_limit_ms = capped(fixing_config.time_limit_ms, &budget);
            let result = Matheuristic::run_with_rng(
                instance,
                &mut model,
                solver,
                &best,
                &fixing_config,
                &mut rng,
                sink,
                cancel.clone(),
            )?;
            cancelled = result.cancelled;
            if result.best_cost < best.cost() {
                best = result.best.clone();
            }
            matheuristic = Some(result);
        }

        log::info!(
            "hybrid: finished best={:.4} genetic={:.4} elapsed_ms={}",
            best.cost(),
            genetic.best_cost,
            budget.elapsed_ms()
        );

        Ok(HybridResult {
            best_cost: best.cost(),
            best,
            genetic,
            recombined_cost,
            polish_rounds,
            polish_improvements,
            matheuristic,
            model_variables,
            elapsed_ms: budget.elapsed_ms(),
            cancelled,
        })
    }
}

/// The tighter of a phase limit and what remains of the overall budget.
fn capped(phase_ms: Option<u64>, budget: &TimeBudget) -> Option<u64> {
    let limit = match (phase_ms, budget.residual_ms()) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    };
    limit.map(|ms| ms.max(1))
}

/// Cheapest individual whose edge set differs from `best`.
fn second_parent<'a>(genetic: &'a GeneticResult, best: &Tour) -> Option<&'a Tour> {
    let reference = EdgeIncidence::from_tour(best);
    genetic
        .population
        .iter()
        .filter(|ind| EdgeIncidence::from_tour(&ind.tour) != reference)
        .min_by(|a, b| a.cost().total_cmp(&b.cost()))
        .map(|ind| &ind.tour)
}

/// Up to `walks` polish walks, each with an edge set distinct from `best`
/// and from the others.
fn polish_pool<R: rand::Rng>(
    instance: &Instance,
    candidates: &CandidateList,
    best: &Tour,
    walks: usize,
    rng: &mut R,
) -> Result<Vec<Tour>> {
    let mut seen = vec![EdgeIncidence::from_tour(best)];
    let mut pool = Vec::with_capacity(walks);
    for _ in 0..walks {
        let (incidence, _) = polish_nearest_neighbor(instance, candidates, rng)?;
        if seen.contains(&incidence) {
            continue;
        }
        pool.push(incidence.to_tour(instance)?);
        seen.push(incidence);
    }
    log::debug!("hybrid: polish pool size={} of {walks} walks", pool.len());
    Ok(pool)
}
