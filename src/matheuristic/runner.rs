//! Fix, solve, release.
//!
//! One round fixes part of a reference tour in the exact model, solves the
//! restricted model with subtour separation, and releases every bound. The
//! loop accepts a round's tour only when it is strictly cheaper.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::Rng;

use super::config::MatheuristicConfig;
use super::fixing::{common_absent, common_edges, sample_single_parent, FixedEdges};
use super::guard::BoundSession;
use super::preprocess::preprocess;
use crate::branch_cut::{BranchAndCut, BranchCutStats};
use crate::budget::TimeBudget;
use crate::error::{Error, Result};
use crate::instance::Instance;
use crate::model::{EdgeModel, ExactSolver};
use crate::plot::{NullSink, TourSink};
use crate::random::rng_from_option;
use crate::tour::{EdgeIncidence, Tour};

const IMPROVEMENT_EPS: f64 = 1e-9;

/// Result of a matheuristic run.
#[derive(Debug, Clone)]
pub struct MatheuristicResult {
    /// Cheapest tour seen, the initial tour included.
    pub best: Tour,
    pub best_cost: f64,
    /// Rounds attempted.
    pub rounds: usize,
    /// Rounds that produced a strictly cheaper tour.
    pub improvements: usize,
    /// Rounds whose solve ended without a tour.
    pub failed_rounds: usize,
    pub stagnated: bool,
    pub cancelled: bool,
    pub timed_out: bool,
    /// Best cost at the start and after each round.
    pub cost_history: Vec<f64>,
}

/// Edge-fixing intensification around incumbent tours.
pub struct Matheuristic;

impl Matheuristic {
    /// Single-parent round: fixes a random subset of `reference`'s edges.
    ///
    /// Bounds are back at their base values when this returns, whatever the
    /// outcome.
    ///
    /// # Errors
    /// [`Error::MalformedInstance`] when the instance, model and tour
    /// disagree on the node count; [`Error::Solver`] when the restricted
    /// solve yields no tour.
    pub fn fix_and_solve<S: ExactSolver + ?Sized, R: Rng>(
        instance: &Instance,
        model: &mut EdgeModel,
        solver: &S,
        reference: &Tour,
        config: &MatheuristicConfig,
        budget: &TimeBudget,
        rng: &mut R,
    ) -> Result<(Tour, BranchCutStats)> {
        check_sizes(instance, model, &[reference])?;
        let incidence = EdgeIncidence::from_tour(reference);
        model.admit(&incidence);
        let mut fixed = sample_single_parent(
            &incidence,
            config.fixing_probability,
            config.max_resamples,
            rng,
        );
        Self::solve_fixed(instance, model, solver, &mut fixed, &[], config, budget)
    }

    /// Two-parent round: fixes the edges both parents share and, when
    /// `forbid_common_absent` is set, forbids every edge both omit.
    pub fn recombine<S: ExactSolver + ?Sized>(
        instance: &Instance,
        model: &mut EdgeModel,
        solver: &S,
        mother: &Tour,
        father: &Tour,
        config: &MatheuristicConfig,
        budget: &TimeBudget,
    ) -> Result<(Tour, BranchCutStats)> {
        check_sizes(instance, model, &[mother, father])?;
        let m = EdgeIncidence::from_tour(mother);
        let f = EdgeIncidence::from_tour(father);
        model.admit(&m);
        model.admit(&f);

        let mut fixed = common_edges(mother, father);
        let forbidden = if config.forbid_common_absent {
            common_absent(&m, &f)
        } else {
            Vec::new()
        };
        Self::solve_fixed(instance, model, solver, &mut fixed, &forbidden, config, budget)
    }

    fn solve_fixed<S: ExactSolver + ?Sized>(
        instance: &Instance,
        model: &mut EdgeModel,
        solver: &S,
        fixed: &mut FixedEdges,
        forbidden: &[usize],
        config: &MatheuristicConfig,
        budget: &TimeBudget,
    ) -> Result<(Tour, BranchCutStats)> {
        let mut session = BoundSession::new(model);
        for &(i, j) in fixed.pairs() {
            session.fix(i, j);
        }
        for &p in forbidden {
            session.forbid_position(p);
        }
        preprocess(&mut session, fixed);
        log::debug!(
            "matheuristic: solving fixed={} forbidden={}",
            session.fixed_count(),
            session.forbidden_count()
        );

        let solver_config = budget.solver_config(&config.solver);
        BranchAndCut::solve(instance, session.model_mut(), solver, &solver_config)
    }

    /// Repeats single-parent rounds from the incumbent.
    ///
    /// Uses an RNG seeded from `config.seed`.
    pub fn run<S: ExactSolver + ?Sized>(
        instance: &Instance,
        model: &mut EdgeModel,
        solver: &S,
        initial: &Tour,
        config: &MatheuristicConfig,
    ) -> Result<MatheuristicResult> {
        let mut rng = rng_from_option(config.seed);
        Self::run_with_rng(instance, model, solver, initial, config, &mut rng, &mut NullSink, None)
    }

    /// Repeats single-parent rounds from the incumbent until the round
    /// limit, the stagnation limit, the time limit or cancellation.
    ///
    /// Rounds that end with a solver status and no tour are counted and
    /// skipped; other errors abort the run.
    #[allow(clippy::too_many_arguments)]
    pub fn run_with_rng<S: ExactSolver + ?Sized, R: Rng>(
        instance: &Instance,
        model: &mut EdgeModel,
        solver: &S,
        initial: &Tour,
        config: &MatheuristicConfig,
        rng: &mut R,
        sink: &mut dyn TourSink,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<MatheuristicResult> {
        config.validate().map_err(Error::InvalidConfig)?;
        check_sizes(instance, model, &[initial])?;
        let budget = TimeBudget::new(config.time_limit_ms);

        let mut best = initial.clone();
        let mut cost_history = vec![best.cost()];
        let mut rounds = 0;
        let mut improvements = 0;
        let mut failed_rounds = 0;
        let mut stagnation = 0;
        let mut stagnated = false;
        let mut cancelled = false;
        let mut timed_out = false;

        while rounds < config.max_rounds {
            if cancel.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                cancelled = true;
                break;
            }
            if budget.is_exhausted() {
                timed_out = true;
                break;
            }
            rounds += 1;

            match Self::fix_and_solve(instance, model, solver, &best, config, &budget, rng) {
                Ok((tour, _)) if tour.cost() < best.cost() - IMPROVEMENT_EPS => {
                    log::debug!(
                        "matheuristic: round={rounds} improved {:.4} -> {:.4}",
                        best.cost(),
                        tour.cost()
                    );
                    best = tour;
                    improvements += 1;
                    stagnation = 0;
                    sink.on_tour(&best, "matheuristic");
                }
                Ok(_) => stagnation += 1,
                Err(Error::Solver { status }) => {
                    log::warn!("matheuristic: round={rounds} solver status={status:?}");
                    failed_rounds += 1;
                    stagnation += 1;
                }
                Err(err) => return Err(err),
            }
            cost_history.push(best.cost());

            if config.stagnation_limit > 0 && stagnation >= config.stagnation_limit {
                stagnated = true;
                break;
            }
        }

        log::info!(
            "matheuristic: finished rounds={rounds} improvements={improvements} \
             failed={failed_rounds} best={:.4} elapsed_ms={}",
            best.cost(),
            budget.elapsed_ms()
        );

        Ok(MatheuristicResult {
            best_cost: best.cost(),
            best,
            rounds,
            improvements,
            failed_rounds,
            stagnated,
            cancelled,
            timed_out,
            cost_history,
        })
    }
}

/// Instance, model and tours must agree on the node count.
fn check_sizes(instance: &Instance, model: &EdgeModel, tours: &[&Tour]) -> Result<()> {
    let n = instance.node_count();
    if model.node_count() != n {
        return Err(Error::malformed_instance(format!(
            "model has {} nodes, instance has {n}",
            model.node_count()
        )));
    }
    if let Some(tour) = tours.iter().find(|tour| tour.len() != n) {
        return Err(Error::malformed_instance(format!(
            "tour has {} nodes, instance has {n}",
            tour.len()
        )));
    }
    Ok(())
}
