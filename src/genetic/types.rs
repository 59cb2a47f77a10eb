//! Population members.

use crate::tour::Tour;

/// A tour in the population.
///
/// `identity` is assigned when a roulette pool is built over the merged
/// parent and child generations; selection never draws the same identity
/// twice within one assembly. It carries no meaning outside that call.
#[derive(Debug, Clone)]
pub struct Individual {
    pub tour: Tour,
    pub fitness: f64,
    pub identity: usize,
}

impl Individual {
    pub fn new(tour: Tour) -> Self {
        Self {
            fitness: fitness_of(tour.cost()),
            tour,
            identity: 0,
        }
    }

    #[inline]
    pub fn cost(&self) -> f64 {
        self.tour.cost()
    }
}

/// `1 / (1 + cost)`: strictly decreasing in cost, within `(0, 1]` for
/// non-negative costs.
#[inline]
pub fn fitness_of(cost: f64) -> f64 {
    1.0 / (1.0 + cost)
}

/// Index of the cheapest individual; the first one wins ties.
///
/// # Panics
/// Panics if `population` is empty.
pub fn best_index(population: &[Individual]) -> usize {
    assert!(!population.is_empty(), "population must not be empty");
    let mut best = 0;
    for (k, individual) in population.iter().enumerate().skip(1) {
        if individual.cost() < population[best].cost() {
            best = k;
        }
    }
    best
}
