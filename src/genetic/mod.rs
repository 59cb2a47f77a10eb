//! Genetic engine over visiting orders.
//!
//! A population seeded by randomized nearest-neighbour walks evolves by
//! single-point crossover. Children are mutated, repaired back into
//! permutations with the candidate lists, and occasionally polished by
//! 2-opt. Parents and children are then merged and the next generation is
//! drawn by fitness-proportional roulette without repeats.
//!
//! # Key Types
//!
//! - [`GeneticConfig`]: population size, rates, termination, presets
//! - [`GeneticRunner`]: executes the evolutionary loop
//! - [`GeneticResult`]: best tour, history, last generation
//! - [`RoulettePool`]: cumulative-count roulette wheel
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and
//!   Machine Learning*
//! - Croes (1958), "A Method for Solving Traveling-Salesman Problems"

mod config;
mod operators;
mod runner;
mod selection;
mod types;

pub use config::GeneticConfig;
pub use operators::{crossover, find_isolated, mutate, repair};
pub use runner::{two_opt_fires, GeneticResult, GeneticRunner};
pub use selection::{next_generation, RoulettePool};
pub use types::{best_index, fitness_of, Individual};
