//! Genetic evolutionary loop execution.
//!
//! [`GeneticRunner`] orchestrates the complete evolutionary process:
//! seeding → breeding (crossover, mutation, repair, 2-opt) → roulette
//! assembly of the next generation → repeat.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::Rng;

use super::config::GeneticConfig;
use super::operators::{crossover, mutate, repair};
use super::selection::next_generation;
use super::types::{best_index, Individual};
use crate::budget::TimeBudget;
use crate::construct::seeding_nearest_neighbor;
use crate::error::{Error, Result};
use crate::instance::{CandidateList, Instance};
use crate::plot::{NullSink, TourSink};
use crate::random::rng_from_option;
use crate::tour::Tour;
use crate::two_opt::refine_tour;

/// Result of a genetic run.
#[derive(Debug, Clone)]
pub struct GeneticResult {
    /// Cheapest tour seen during the entire run.
    pub best: Tour,

    /// Same as `best.cost()`.
    pub best_cost: f64,

    /// Total number of generations executed.
    pub generations: usize,

    /// Whether the run stopped on the stagnation limit.
    pub stagnated: bool,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// Whether the run stopped on the time limit.
    pub timed_out: bool,

    /// Best cost after seeding and after each generation.
    pub cost_history: Vec<f64>,

    /// The last generation.
    pub population: Vec<Individual>,
}

/// Executes the genetic loop.
///
/// # Usage
///
/// ```
/// use u_tsp::genetic::{GeneticConfig, GeneticRunner};
/// use u_tsp::instance::{CandidateList, Instance, Metric, Point};
///
/// let points = (0..12)
///     .map(|k| {
///         let a = k as f64 * std::f64::consts::TAU / 12.0;
///         Point::new(a.cos(), a.sin())
///     })
///     .collect();
/// let instance = Instance::from_points(points, Metric::Euclidean).unwrap();
/// let candidates = CandidateList::build(&instance).unwrap();
///
/// let config = GeneticConfig::fast().with_seed(42);
/// let result = GeneticRunner::run(&instance, &candidates, &config).unwrap();
/// assert_eq!(result.best.len(), 12);
/// ```
pub struct GeneticRunner;

impl GeneticRunner {
    /// Runs the genetic engine with an RNG seeded from `config.seed`.
    ///
    /// # Errors
    /// [`Error::InvalidConfig`] for an invalid configuration,
    /// [`Error::MalformedInstance`] when `candidates` was built for another
    /// instance size.
    pub fn run(
        instance: &Instance,
        candidates: &CandidateList,
        config: &GeneticConfig,
    ) -> Result<GeneticResult> {
        Self::run_with_cancel(instance, candidates, config, None)
    }

    /// Runs the genetic engine with an optional cancellation token.
    ///
    /// If `cancel` is `Some` and the flag is set to `true`, the run stops
    /// before the next generation and returns the best tour found so far.
    pub fn run_with_cancel(
        instance: &Instance,
        candidates: &CandidateList,
        config: &GeneticConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<GeneticResult> {
        let mut rng = rng_from_option(config.seed);
        Self::run_with_rng(instance, candidates, config, &mut rng, &mut NullSink, cancel)
    }

    /// Runs the genetic engine on a caller-supplied RNG, reporting every
    /// strictly better tour to `sink`.
    pub fn run_with_rng<R: Rng>(
        instance: &Instance,
        candidates: &CandidateList,
        config: &GeneticConfig,
        rng: &mut R,
        sink: &mut dyn TourSink,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<GeneticResult> {
        config.validate().map_err(Error::InvalidConfig)?;
        let n = instance.node_count();
        if candidates.node_count() != n {
            return Err(Error::malformed_instance(format!(
                "candidate list covers {} nodes, instance has {n}",
                candidates.node_count()
            )));
        }
        let budget = TimeBudget::new(config.time_limit_ms);

        // 1. Seed population
        let mut population: Vec<Individual> = (0..config.population_size)
            .map(|k| {
                let start = if config.random_start { None } else { Some(k % n) };
                seeding_nearest_neighbor(instance, candidates, start, rng).map(Individual::new)
            })
            .collect::<Result<_>>()?;

        // 2. Track best
        let mut best = population[best_index(&population)].tour.clone();
        sink.on_tour(&best, "genetic");
        let mut cost_history = Vec::with_capacity(config.max_generations + 1);
        cost_history.push(best.cost());
        log::debug!(
            "genetic: seeded population={} best={:.4}",
            population.len(),
            best.cost()
        );

        let mut generations = 0;
        let mut stagnation = 0;
        let mut stagnated = false;
        let mut cancelled = false;
        let mut timed_out = false;

        // 3. Evolutionary loop
        for gen in 0..config.max_generations {
            if cancel.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                cancelled = true;
                break;
            }
            if budget.is_exhausted() {
                timed_out = true;
                break;
            }

            let mut children = Vec::with_capacity(config.children_per_generation());
            for _ in 0..config.children_per_generation() {
                let (f, m) = pick_parents(population.len(), rng);
                let child = Self::breed(
                    instance,
                    candidates,
                    &population[f].tour,
                    &population[m].tour,
                    config,
                    rng,
                )?;
                children.push(Individual::new(child));
            }

            let child_best = best_index(&children);
            if children[child_best].cost() < best.cost() {
                best = children[child_best].tour.clone();
                stagnation = 0;
                sink.on_tour(&best, "genetic");
                log::debug!("genetic: generation={} best={:.4}", gen + 1, best.cost());
            } else {
                stagnation += 1;
            }

            population = next_generation(population, children, config.population_size, rng)?;
            generations = gen + 1;
            cost_history.push(best.cost());

            if config.stagnation_limit > 0 && stagnation >= config.stagnation_limit {
                stagnated = true;
                break;
            }
        }

        log::info!(
            "genetic: finished generations={generations} best={:.4} stagnated={stagnated} \
             cancelled={cancelled} timed_out={timed_out} elapsed_ms={}",
            best.cost(),
            budget.elapsed_ms()
        );

        Ok(GeneticResult {
            best_cost: best.cost(),
            best,
            generations,
            stagnated,
            cancelled,
            timed_out,
            cost_history,
            population,
        })
    }

    /// Breeds one child: crossover, optional mutation, repair, optional
    /// 2-opt.
    ///
    /// Mutation runs before repair, so the returned tour is always a valid
    /// permutation.
    pub fn breed<R: Rng>(
        instance: &Instance,
        candidates: &CandidateList,
        father: &Tour,
        mother: &Tour,
        config: &GeneticConfig,
        rng: &mut R,
    ) -> Result<Tour> {
        let n = instance.node_count();
        let mut raw = crossover(father.order(), mother.order(), rng);
        if rng.random_bool(config.mutation_rate) {
            mutate(&mut raw, n, rng);
        }
        let mut child = Tour::from_order(instance, repair(candidates, &raw)?)?;
        if config.two_opt && two_opt_fires(n, rng) {
            refine_tour(instance, &mut child)?;
        }
        Ok(child)
    }
}

/// Draws whether a child is refined: probability `1 / floor(n / 2)`.
pub fn two_opt_fires<R: Rng>(n: usize, rng: &mut R) -> bool {
    let window = (n / 2).max(1);
    rng.random_range(0..window) == 0
}

/// Two distinct uniform indices below `len` (equal only when `len == 1`).
fn pick_parents<R: Rng>(len: usize, rng: &mut R) -> (usize, usize) {
    if len < 2 {
        return (0, 0);
    }
    let father = rng.random_range(0..len);
    let mut mother = rng.random_range(0..len - 1);
    if mother >= father {
        mother += 1;
    }
    (father, mother)
}

// ============================================================================
// Tests
// ============================================================================
