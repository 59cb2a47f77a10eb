//! Recombination operators over the visiting-order encoding.
//!
//! Single-point crossover and point mutation work on raw sequences that may
//! repeat or omit nodes. [`repair`] turns any such sequence back into a
//! permutation using the candidate lists.
//!
//! # Operators
//!
//! - [`crossover`]: prefix from the father, suffix from the mother, O(n)
//! - [`mutate`]: one random position gets one random node, O(1)
//! - [`find_isolated`]: nodes missing from a sequence, O(n)
//! - [`repair`]: splice every missing node after a nearby present one,
//!   O(n·k) where k is the number of missing nodes

use rand::Rng;

use crate::error::{Error, Result};
use crate::instance::CandidateList;

/// Single-point crossover.
///
/// Draws `c` uniformly in `[0, n)` and returns `father[..=c]` followed by
/// `mother[c+1..]`. The result may contain duplicates and omissions.
///
/// # Panics
/// Panics if parents have different lengths or are empty.
pub fn crossover<R: Rng>(father: &[usize], mother: &[usize], rng: &mut R) -> Vec<usize> {
    let n = father.len();
    assert_eq!(n, mother.len(), "parents must have equal length");
    assert!(n > 0, "parents must not be empty");

    let c = rng.random_range(0..n);
    let mut child = Vec::with_capacity(n);
    child.extend_from_slice(&father[..=c]);
    child.extend_from_slice(&mother[c + 1..]);
    child
}

/// Overwrites one uniformly random position with a uniformly random node in
/// `[0, n)`.
pub fn mutate<R: Rng>(child: &mut [usize], n: usize, rng: &mut R) {
    if child.is_empty() || n == 0 {
        return;
    }
    let position = rng.random_range(0..child.len());
    child[position] = rng.random_range(0..n);
}

/// Nodes of `0..n` absent from `sequence`, ascending.
pub fn find_isolated(sequence: &[usize], n: usize) -> Vec<usize> {
    let mut present = vec![false; n];
    for &node in sequence {
        if node < n {
            present[node] = true;
        }
    }
    (0..n).filter(|&node| !present[node]).collect()
}

/// Turns a raw child into a permutation of `0..n`.
///
/// Every isolated node is matched to its nearest candidate that is neither
/// isolated nor already claimed by another isolated node. The first
/// occurrence of each present node is kept in order, and every isolated
/// node is spliced directly after its match.
///
/// If every present node is already claimed, an isolated node anchors on
/// the nearest isolated node that has been matched but not claimed, and is
/// spliced after it. Such an anchor always exists, so repair never fails on
/// well-formed input.
///
/// # Errors
/// [`Error::RepairFailed`] if `child` does not have `n` entries or holds a
/// value outside `0..n`.
///
/// # Examples
///
/// ```
/// use u_tsp::genetic::repair;
/// use u_tsp::instance::{CandidateList, Instance};
///
/// // Nodes on a line at 0, 1, 2, 3
/// let instance = Instance::from_fn(4, |i, j| (i as f64 - j as f64).abs()).unwrap();
/// let candidates = CandidateList::build(&instance).unwrap();
///
/// // Node 1 repeated, node 2 missing; 2 goes after its nearest present node
/// let repaired = repair(&candidates, &[0, 1, 1, 3]).unwrap();
/// assert_eq!(repaired, vec![0, 1, 2, 3]);
/// ```
pub fn repair(candidates: &CandidateList, child: &[usize]) -> Result<Vec<usize>> {
    let n = candidates.node_count();
    if child.len() != n {
        return Err(Error::repair_failed(format!(
            "child has {} entries, expected {n}",
            child.len()
        )));
    }
    if let Some(&bad) = child.iter().find(|&&node| node >= n) {
        return Err(Error::repair_failed(format!(
            "child holds node {bad} outside 0..{n}"
        )));
    }

    let isolated = find_isolated(child, n);
    if isolated.is_empty() {
        return Ok(child.to_vec());
    }

    let mut is_isolated = vec![false; n];
    for &node in &isolated {
        is_isolated[node] = true;
    }

    // follower[a] = isolated node spliced right after a
    let mut follower: Vec<Option<usize>> = vec![None; n];
    let mut matched = vec![false; n];
    for &node in &isolated {
        let neighbors = candidates.neighbors(node);
        let anchor = neighbors
            .iter()
            .copied()
            .find(|&c| !is_isolated[c] && follower[c].is_none())
            .or_else(|| {
                neighbors
                    .iter()
                    .copied()
                    .find(|&c| is_isolated[c] && matched[c] && follower[c].is_none())
            })
            .ok_or_else(|| {
                Error::repair_failed(format!("no eligible anchor for isolated node {node}"))
            })?;
        follower[anchor] = Some(node);
        matched[node] = true;
    }

    let mut seen = vec![false; n];
    let mut repaired = Vec::with_capacity(n);
    for &node in child {
        if seen[node] {
            continue;
        }
        seen[node] = true;
        repaired.push(node);
        let mut cursor = node;
        while let Some(next) = follower[cursor] {
            repaired.push(next);
            cursor = next;
        }
    }

    log::trace!(
        "genetic: repaired child isolated={} nodes={n}",
        isolated.len()
    );
    debug_assert_eq!(repaired.len(), n);
    Ok(repaired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{Instance, Metric, Point};
    use crate::tour::is_permutation;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn line(n: usize) -> CandidateList {
        let points = (0..n).map(|i| Point::new(i as f64, 0.0)).collect();
        let instance = Instance::from_points(points, Metric::Euclidean).unwrap();
        CandidateList::build(&instance).unwrap()
    }

    #[test]
    fn test_crossover_prefix_suffix() {
        let father = [0, 1, 2, 3, 4, 5];
        let mother = [5, 4, 3, 2, 1, 0];
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let child = crossover(&father, &mother, &mut rng);
            assert_eq!(child.len(), 6);
            // some c with child[..=c] == father[..=c] and the rest from mother
            let c = (0..6)
                .find(|&c| child[..=c] == father[..=c] && child[c + 1..] == mother[c + 1..])
                .expect("breakpoint exists");
            assert!(c < 6);
        }
    }

    #[test]
    fn test_mutate_changes_at_most_one_position() {
        let mut rng = StdRng::seed_from_u64(11);
        let original = vec![0, 1, 2, 3, 4, 5, 6, 7];
        for _ in 0..50 {
            let mut child = original.clone();
            mutate(&mut child, 8, &mut rng);
            let changed = child.iter().zip(&original).filter(|(a, b)| a != b).count();
            assert!(changed <= 1);
            assert!(child.iter().all(|&v| v < 8));
        }
    }

    #[test]
    fn test_find_isolated() {
        assert_eq!(find_isolated(&[0, 0, 3, 3, 1], 5), vec![2, 4]);
        assert!(find_isolated(&[2, 0, 1], 3).is_empty());
    }

    #[test]
    fn test_repair_valid_input_unchanged() {
        let candidates = line(5);
        assert_eq!(repair(&candidates, &[4, 2, 0, 1, 3]).unwrap(), vec![4, 2, 0, 1, 3]);
    }

    #[test]
    fn test_repair_splices_after_nearest() {
        let candidates = line(6);
        // 3 and 5 missing; 3 → nearest non-isolated unclaimed is 2, 5 → 4
        let repaired = repair(&candidates, &[0, 2, 1, 4, 2, 0]).unwrap();
        assert_eq!(repaired, vec![0, 2, 3, 1, 4, 5]);
    }

    #[test]
    fn test_repair_claims_are_exclusive() {
        // 1 and 3 both have 2 as nearest node
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 1.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, -1.5),
            Point::new(20.0, 0.0),
        ];
        let instance = Instance::from_points(points, Metric::Euclidean).unwrap();
        let candidates = CandidateList::build(&instance).unwrap();

        // 1 claims 2; 3 skips 2 (claimed) and 1 (isolated), lands on 0
        let repaired = repair(&candidates, &[0, 2, 2, 4, 0]).unwrap();
        assert_eq!(repaired, vec![0, 3, 2, 1, 4]);
    }

    #[test]
    fn test_repair_chains_when_present_nodes_run_out() {
        let candidates = line(5);
        // Only node 0 present: 1 anchors on 0, 2 on 1, 3 on 2, 4 on 3
        let repaired = repair(&candidates, &[0, 0, 0, 0, 0]).unwrap();
        assert_eq!(repaired, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_repair_rejects_malformed_child() {
        let candidates = line(4);
        assert!(matches!(
            repair(&candidates, &[0, 1, 2]),
            Err(Error::RepairFailed(_))
        ));
        assert!(matches!(
            repair(&candidates, &[0, 1, 2, 9]),
            Err(Error::RepairFailed(_))
        ));
    }

    #[test]
    fn test_crossover_then_repair_is_permutation() {
        let candidates = line(9);
        let mut rng = StdRng::seed_from_u64(5);
        let father = [0, 1, 2, 3, 4, 5, 6, 7, 8];
        let mother = [8, 6, 4, 2, 0, 7, 5, 3, 1];
        for _ in 0..100 {
            let mut child = crossover(&father, &mother, &mut rng);
            mutate(&mut child, 9, &mut rng);
            let repaired = repair(&candidates, &child).unwrap();
            assert!(is_permutation(&repaired, 9));
        }
    }
}
