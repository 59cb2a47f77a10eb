//! 2-opt local search on successor maps.
//!
//! Removes crossings by exchanging edge pairs `(u → u')` and `(v → v')`
//! for `(u → v)` and `(u' → v')`, reversing the sub-path `u' … v`.
//! Each improving exchange restarts the scan (first improvement); the
//! search ends at a 2-opt local optimum.
//!
//! The gain of a move is computed from the four endpoints only:
//! `Δ = d(u,v) + d(u',v') − d(u,u') − d(v,v')`. A move is applied when
//! `Δ < −1e-9`, so cost never increases and the search terminates.
//!
//! # Complexity
//! O(n²) per scan, O(n) per applied move.
//!
//! # References
//!
//! Croes (1958), "A Method for Solving Traveling-Salesman Problems",
//! *Operations Research* 6(6), 791-812.

use crate::error::{Error, Result};
use crate::instance::Instance;
use crate::tour::{Successors, Tour};

const IMPROVEMENT_EPSILON: f64 = 1e-9;

/// Counters from one refinement.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TwoOptStats {
    /// Full or partial scans started.
    pub passes: usize,
    /// Exchanges applied.
    pub moves: usize,
    /// Total cost reduction (non-negative).
    pub improvement: f64,
}

/// Refines `next` in place to a 2-opt local optimum.
///
/// Deterministic for a fixed tour and distance matrix. Running it again on
/// its own result applies no move.
///
/// # Errors
/// [`Error::MalformedInstance`] if `next` does not cover the instance's
/// nodes, [`Error::InvalidTour`] if it is not a single cycle. `next` is
/// left untouched in both cases.
pub fn refine(instance: &Instance, next: &mut Successors) -> Result<TwoOptStats> {
    let n = next.len();
    if n != instance.node_count() {
        return Err(Error::malformed_instance(format!(
            "successor map has {n} nodes, instance has {}",
            instance.node_count()
        )));
    }
    next.walk(0)?;

    let mut stats = TwoOptStats::default();
    if n < 4 {
        return Ok(stats);
    }

    let mut order = Vec::with_capacity(n);
    loop {
        stats.passes += 1;
        cycle_order(next, &mut order);

        match find_improving_move(instance, next, &order) {
            Some((u, v, delta)) => {
                reverse_between(next, u, v);
                stats.moves += 1;
                stats.improvement -= delta;
            }
            None => break,
        }
    }

    log::trace!(
        "two_opt: local optimum passes={} moves={} improvement={:.6}",
        stats.passes,
        stats.moves,
        stats.improvement
    );
    Ok(stats)
}

/// Refines a tour in visiting-order form, keeping its first node in place.
pub fn refine_tour(instance: &Instance, tour: &mut Tour) -> Result<TwoOptStats> {
    let mut next = tour.successors();
    let stats = refine(instance, &mut next)?;
    if stats.moves > 0 {
        let start = tour.order()[0];
        *tour = Tour::from_successors(instance, &next, start)?;
    }
    Ok(stats)
}

/// Whether no improving exchange exists.
pub fn is_local_optimum(instance: &Instance, next: &Successors) -> bool {
    let mut order = Vec::with_capacity(next.len());
    cycle_order(next, &mut order);
    next.len() < 4 || find_improving_move(instance, next, &order).is_none()
}

/// Cycle order starting at node 0.
fn cycle_order(next: &Successors, order: &mut Vec<usize>) {
    order.clear();
    let mut node = 0;
    for _ in 0..next.len() {
        order.push(node);
        node = next.next(node);
    }
}

/// First pair `(u, v)`, `u` before `v` in cycle order, whose exchange gains.
fn find_improving_move(
    instance: &Instance,
    next: &Successors,
    order: &[usize],
) -> Option<(usize, usize, f64)> {
    let n = order.len();
    for a in 0..n - 2 {
        let u = order[a];
        let u_next = next.next(u);
        let d_u = instance.distance(u, u_next);
        for &v in &order[a + 2..] {
            let v_next = next.next(v);
            if v_next == u {
                continue;
            }
            let delta = instance.distance(u, v) + instance.distance(u_next, v_next)
                - d_u
                - instance.distance(v, v_next);
            if delta < -IMPROVEMENT_EPSILON {
                return Some((u, v, delta));
            }
        }
    }
    None
}

/// Replaces `u → u'` and `v → v'` with `u → v` and `u' → v'`, re-pointing
/// every successor on the path `u' … v`.
fn reverse_between(next: &mut Successors, u: usize, v: usize) {
    let u_next = next.0[u];
    let v_next = next.0[v];

    let mut from = u_next;
    let mut to = next.0[from];
    while from != v {
        let after = next.0[to];
        next.0[to] = from;
        from = to;
        to = after;
    }

    next.0[u] = v;
    next.0[u_next] = v_next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{Metric, Point};
    use crate::random::create_rng;
    use crate::tour::is_permutation;
    use rand::seq::SliceRandom;
    use rand::Rng;

    fn random_instance(n: usize, seed: u64) -> Instance {
        let mut rng = create_rng(seed);
        let points = (0..n)
            .map(|_| Point::new(rng.random_range(0.0..100.0), rng.random_range(0.0..100.0)))
            .collect();
        Instance::from_points(points, Metric::Euclidean).unwrap()
    }

    #[test]
    fn test_uncrosses_square() {
        let instance = Instance::from_points(
            vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 1.0),
                Point::new(1.0, 1.0),
                Point::new(1.0, 0.0),
            ],
            Metric::Euclidean,
        )
        .unwrap();
        let mut tour = Tour::from_order(&instance, vec![0, 2, 1, 3]).unwrap();
        let stats = refine_tour(&instance, &mut tour).unwrap();

        assert_eq!(stats.moves, 1);
        assert!((tour.cost() - 4.0).abs() < 1e-12);
        assert_eq!(tour.order()[0], 0);
        assert!((stats.improvement - (2.0 * 2f64.sqrt() - 2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_never_increases_cost_and_keeps_cycle() {
        let instance = random_instance(60, 4);
        let mut rng = create_rng(12);
        for _ in 0..5 {
            let mut order: Vec<usize> = (0..60).collect();
            order.shuffle(&mut rng);
            let tour = Tour::from_order(&instance, order).unwrap();

            let mut refined = tour.clone();
            let stats = refine_tour(&instance, &mut refined).unwrap();

            assert!(is_permutation(refined.order(), 60));
            assert!(refined.cost() <= tour.cost() + 1e-9);
            assert!((tour.cost() - refined.cost() - stats.improvement).abs() < 1e-6);
            assert!(is_local_optimum(&instance, &refined.successors()));
        }
    }

    #[test]
    fn test_idempotent_at_local_optimum() {
        let instance = random_instance(35, 6);
        let mut order: Vec<usize> = (0..35).collect();
        order.shuffle(&mut create_rng(3));
        let mut next = Tour::from_order(&instance, order).unwrap().successors();

        refine(&instance, &mut next).unwrap();
        let once = next.clone();
        let cost = next.cost(&instance);

        let stats = refine(&instance, &mut next).unwrap();
        assert_eq!(stats.moves, 0);
        assert_eq!(stats.passes, 1);
        assert_eq!(next, once);
        assert_eq!(next.cost(&instance), cost);
    }

    #[test]
    fn test_tiny_tours_untouched() {
        let instance = Instance::from_fn(3, |i, j| (i * j) as f64 + 1.0).unwrap();
        let mut next = Successors(vec![1, 2, 0]);
        let stats = refine(&instance, &mut next).unwrap();
        assert_eq!(stats, TwoOptStats::default());
        assert_eq!(next, Successors(vec![1, 2, 0]));
    }

    #[test]
    fn test_rejects_disjoint_cycles() {
        let instance = random_instance(6, 8);
        // Two triangles 0-1-2 and 3-4-5
        let mut next = Successors(vec![1, 2, 0, 4, 5, 3]);
        let err = refine(&instance, &mut next).unwrap_err();
        assert!(matches!(err, Error::InvalidTour(_)));
        assert_eq!(next, Successors(vec![1, 2, 0, 4, 5, 3]));
    }

    #[test]
    fn test_rejects_size_mismatch() {
        let instance = random_instance(6, 9);
        let mut next = Successors(vec![1, 2, 3, 4, 0]);
        assert!(matches!(
            refine(&instance, &mut next),
            Err(Error::MalformedInstance(_))
        ));
    }

    #[test]
    fn test_reverse_between_repoints_path() {
        // 0 -> 1 -> 2 -> 3 -> 4 -> 5 -> 0, exchange (0,1) and (3,4)
        let mut next = Successors(vec![1, 2, 3, 4, 5, 0]);
        reverse_between(&mut next, 0, 3);
        assert_eq!(next.walk(0).unwrap(), vec![0, 3, 2, 1, 4, 5]);
    }
}
