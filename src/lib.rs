//! Hybrid travelling salesman engine.
//!
//! Combines three searches over a symmetric TSP instance:
//!
//! - **Branch-and-cut**: an external exact solver works on the edge model
//!   while a component tracker rejects every integer candidate made of
//!   disconnected cycles and returns the violated subtour cuts.
//! - **Genetic engine**: population of tours evolved by single-point
//!   crossover, point mutation, candidate-list repair, optional 2-opt,
//!   and roulette selection without repeats.
//! - **Matheuristic**: edges of good tours are fixed in the exact model and
//!   the shrunk model is re-solved. Bounds are released after every round.
//!
//! [`hybrid::HybridSolver`] chains them: genetic search first, then
//! edge-fixing rounds seeded with its best tour.
//!
//! # Architecture
//!
//! The exact solver is a collaborator behind [`model::ExactSolver`]. The
//! crate ships [`model::EnumerativeSolver`], a depth-first branch-and-bound
//! that is exact for small instances, so every layer runs without an
//! external MIP backend. All randomness flows through one injectable
//! [`rand::Rng`]; all fallible operations return [`Result`].

pub mod branch_cut;
pub mod budget;
pub mod construct;
pub mod cuts;
pub mod error;
pub mod genetic;
pub mod hybrid;
pub mod instance;
pub mod matheuristic;
pub mod model;
pub mod plot;
pub mod random;
pub mod tour;
pub mod two_opt;

pub use error::{Error, Result};
