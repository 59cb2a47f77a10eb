//! Fitness-proportional roulette over a merged generation.
//!
//! Individual `k` owns `round(fitness_k · scale)` consecutive slots of the
//! wheel, where `scale` is the smallest power of ten that lifts the smallest
//! fitness to at least 100. The wheel is stored as cumulative slot counts,
//! so a draw is one uniform integer plus a binary search.
//!
//! # References
//!
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and
//!   Machine Learning*, ch. 1
//!
//! # Complexity
//! O(n) build, O(log n) per draw

use rand::Rng;

use super::types::Individual;
use crate::error::{Error, Result};

const MIN_SLOTS: f64 = 100.0;

/// Roulette wheel over one pool of individuals.
#[derive(Debug, Clone)]
pub struct RoulettePool {
    cumulative: Vec<u64>,
    scale: f64,
}

impl RoulettePool {
    /// Builds the wheel and stamps `identity = index` on every individual.
    ///
    /// # Panics
    /// Panics if `pool` is empty.
    pub fn build(pool: &mut [Individual]) -> Self {
        assert!(!pool.is_empty(), "cannot build a roulette over an empty pool");

        let min_fitness = pool
            .iter()
            .map(|ind| ind.fitness)
            .fold(f64::INFINITY, f64::min);
        let scale = scale_for(min_fitness);

        let mut total: u64 = 0;
        let cumulative = pool
            .iter_mut()
            .enumerate()
            .map(|(k, individual)| {
                individual.identity = k;
                let slots = (individual.fitness * scale).round().max(1.0) as u64;
                total = total.saturating_add(slots);
                total
            })
            .collect();

        Self { cumulative, scale }
    }

    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Total number of wheel slots.
    pub fn total_slots(&self) -> u64 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    /// Slots owned by `identity`.
    pub fn slots(&self, identity: usize) -> u64 {
        let before = if identity == 0 {
            0
        } else {
            self.cumulative[identity - 1]
        };
        self.cumulative[identity] - before
    }

    /// One spin: the identity owning a uniformly drawn slot.
    pub fn draw<R: Rng>(&self, rng: &mut R) -> usize {
        let slot = rng.random_range(0..self.total_slots());
        self.cumulative.partition_point(|&c| c <= slot)
    }

    /// `count` distinct identities, in draw order.
    ///
    /// A spin landing on an identity already drawn is repeated.
    ///
    /// # Errors
    /// [`Error::SelectionExhausted`] if `count` exceeds the pool size.
    pub fn select_distinct<R: Rng>(&self, count: usize, rng: &mut R) -> Result<Vec<usize>> {
        if count > self.len() {
            return Err(Error::SelectionExhausted {
                requested: count,
                available: self.len(),
            });
        }
        let mut taken = vec![false; self.len()];
        let mut chosen = Vec::with_capacity(count);
        while chosen.len() < count {
            let identity = self.draw(rng);
            if !taken[identity] {
                taken[identity] = true;
                chosen.push(identity);
            }
        }
        Ok(chosen)
    }
}

/// Smallest power of ten with `min_fitness · scale ≥ 100`.
fn scale_for(min_fitness: f64) -> f64 {
    let mut scale = 1.0;
    if min_fitness <= 0.0 || !min_fitness.is_finite() {
        return scale;
    }
    while min_fitness * scale < MIN_SLOTS {
        scale *= 10.0;
    }
    scale
}

/// Merges parents and children and draws the next generation.
///
/// Identities are the merged-pool indices; each one is taken at most once.
///
/// # Errors
/// [`Error::SelectionExhausted`] if the merged pool has fewer than `size`
/// individuals.
pub fn next_generation<R: Rng>(
    parents: Vec<Individual>,
    children: Vec<Individual>,
    size: usize,
    rng: &mut R,
) -> Result<Vec<Individual>> {
    let mut pool = parents;
    pool.extend(children);
    if pool.is_empty() {
        return Err(Error::SelectionExhausted {
            requested: size,
            available: 0,
        });
    }
    let roulette = RoulettePool::build(&mut pool);
    let chosen = roulette.select_distinct(size, rng)?;

    let mut slots: Vec<Option<Individual>> = pool.into_iter().map(Some).collect();
    Ok(chosen
        .into_iter()
        .filter_map(|identity| slots[identity].take())
        .collect())
}
