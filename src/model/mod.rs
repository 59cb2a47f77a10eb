//! Exact model boundary.
//!
//! The crate never solves integer programs itself in production; it builds
//! and mutates an [`EdgeModel`] and hands it to an [`ExactSolver`]. The
//! model is the classic symmetric TSP formulation:
//!
//! ```text
//! min  Σ d_ij x_ij
//! s.t. Σ_j x_ij = 2          for every node i
//!      Σ a_k x_k ≤ b         for every lazy cut added so far
//!      l_ij ≤ x_ij ≤ u_ij,   x_ij ∈ {0, 1}
//! ```
//!
//! # Key Components
//!
//! - [`EdgeModel`]: variables, objective, per-variable bounds, cuts
//! - [`LinearConstraint`]: a `≤` row
//! - [`ExactSolver`]: interface for solver implementations
//! - [`LazyConstraints`]: callback consulted on every integer candidate
//! - [`EnumerativeSolver`]: depth-first branch-and-bound for small instances
//!
//! # Design
//!
//! [`ExactSolver`] lets external MIP backends be plugged in behind a thin
//! adapter. [`EnumerativeSolver`] honours the same contract so the cut loop
//! and the matheuristics can run and be tested without one; it is exponential
//! and meant for tens of variables, not for real instances.

mod edge_model;
mod enumerative;
mod solver;

pub use edge_model::{EdgeModel, LinearConstraint};
pub use enumerative::EnumerativeSolver;
pub use solver::{
    ExactSolver, LazyConstraints, MipSolution, NoLazyConstraints, SolverConfig, SolverStatus,
};
