//! Edge-fixing matheuristics.
//!
//! Part of an incumbent tour is frozen in the exact model and the
//! remaining free edges are optimized by branch-and-cut. Every round runs
//! inside a [`BoundSession`], so the model is back at its base bounds
//! before the next round starts, whether the solve succeeded or not.
//!
//! Two variants share the machinery:
//!
//! - single parent: edges of one tour fixed at random
//!   ([`Matheuristic::fix_and_solve`], repeated by [`Matheuristic::run`])
//! - two parents: the edges both tours share are fixed and, optionally,
//!   the edges neither uses are forbidden ([`Matheuristic::recombine`])
//!
//! Before solving, [`preprocess`] forbids the closing edge of every fixed
//! chain that does not span all nodes.
//!
//! # References
//!
//! - Fischetti & Lodi (2003), "Local branching"
//! - Danna, Rothberg & Le Pape (2005), "Exploring relaxation induced
//!   neighborhoods to improve MIP solutions"

mod config;
mod fixing;
mod guard;
mod preprocess;
mod runner;

pub use config::MatheuristicConfig;
pub use fixing::{common_absent, common_edges, sample_single_parent, FixedEdges};
pub use guard::BoundSession;
pub use preprocess::preprocess;
pub use runner::{Matheuristic, MatheuristicResult};
