use proptest::prelude::*;
use rand::seq::SliceRandom;
use u_tsp::cuts::CutGenerator;
use u_tsp::genetic::{crossover, mutate, repair, Individual, RoulettePool};
use u_tsp::instance::{CandidateList, Instance, Metric, Point};
use u_tsp::random::create_rng;
use u_tsp::tour::{is_permutation, EdgeIncidence, EdgeIndex, Tour};
use u_tsp::two_opt::{is_local_optimum, refine_tour};

fn points(range: std::ops::Range<usize>) -> impl Strategy<Value = Vec<Point>> {
    prop::collection::vec((0.0..100.0f64, 0.0..100.0f64), range)
        .prop_map(|coords| coords.into_iter().map(|(x, y)| Point::new(x, y)).collect())
}

prop_compose! {
    /// An instance plus a sequence over its nodes with duplicates and gaps.
    fn instance_and_child()
        (pts in points(4..30))
        (child in prop::collection::vec(0..pts.len(), pts.len()), pts in Just(pts))
        -> (Instance, Vec<usize>)
    {
        (Instance::from_points(pts, Metric::Euclidean).unwrap(), child)
    }
}

proptest! {
    #[test]
    fn edge_position_is_a_bijection(n in 2usize..60) {
        let index = EdgeIndex::new(n);
        let mut seen = vec![false; index.len()];
        for (i, j) in index.pairs() {
            let p = index.position(i, j);
            prop_assert!(p < index.len());
            prop_assert!(!seen[p]);
            seen[p] = true;
            prop_assert_eq!(index.position(j, i), p);
            prop_assert_eq!(index.pair(p), (i, j));
        }
        prop_assert!(seen.into_iter().all(|s| s));
    }

    #[test]
    fn repair_always_yields_a_permutation((instance, child) in instance_and_child()) {
        let candidates = CandidateList::build(&instance).unwrap();
        let repaired = repair(&candidates, &child).unwrap();
        prop_assert!(is_permutation(&repaired, instance.node_count()));
    }

    #[test]
    fn breeding_operators_keep_tours_valid(pts in points(4..25), seed in any::<u64>()) {
        let instance = Instance::from_points(pts, Metric::Euclidean).unwrap();
        let candidates = CandidateList::build(&instance).unwrap();
        let n = instance.node_count();
        let mut rng = create_rng(seed);

        let mut father: Vec<usize> = (0..n).collect();
        let mut mother: Vec<usize> = (0..n).collect();
        father.shuffle(&mut rng);
        mother.shuffle(&mut rng);

        let mut child = crossover(&father, &mother, &mut rng);
        prop_assert_eq!(child.len(), n);
        mutate(&mut child, n, &mut rng);
        let repaired = repair(&candidates, &child).unwrap();
        prop_assert!(Tour::from_order(&instance, repaired).is_ok());
    }

    #[test]
    fn two_opt_never_worsens(pts in points(4..40), seed in any::<u64>()) {
        let instance = Instance::from_points(pts, Metric::Euclidean).unwrap();
        let n = instance.node_count();
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut create_rng(seed));
        let mut tour = Tour::from_order(&instance, order).unwrap();
        let before = tour.cost();

        refine_tour(&instance, &mut tour).unwrap();
        prop_assert!(tour.cost() <= before + 1e-9);
        prop_assert!(is_permutation(tour.order(), n));
        prop_assert!(is_local_optimum(&instance, &tour.successors()));
    }

    #[test]
    fn roulette_draws_distinct_members(
        pts in points(5..15),
        pool_size in 2usize..30,
        seed in any::<u64>(),
    ) {
        let instance = Instance::from_points(pts, Metric::Euclidean).unwrap();
        let n = instance.node_count();
        let mut rng = create_rng(seed);
        let mut pool: Vec<Individual> = (0..pool_size)
            .map(|_| {
                let mut order: Vec<usize> = (0..n).collect();
                order.shuffle(&mut rng);
                Individual::new(Tour::from_order(&instance, order).unwrap())
            })
            .collect();

        let roulette = RoulettePool::build(&mut pool);
        let count = pool_size / 2 + 1;
        let mut picked = roulette.select_distinct(count, &mut rng).unwrap();
        prop_assert_eq!(picked.len(), count);
        picked.sort_unstable();
        picked.dedup();
        prop_assert_eq!(picked.len(), count);
        prop_assert!(picked.iter().all(|&id| id < pool_size));
    }

    #[test]
    fn one_cut_per_disjoint_cycle(sizes in prop::collection::vec(3usize..7, 1..6), seed in any::<u64>()) {
        let n: usize = sizes.iter().sum();
        let mut nodes: Vec<usize> = (0..n).collect();
        nodes.shuffle(&mut create_rng(seed));

        let mut incidence = EdgeIncidence::empty(n);
        let mut offset = 0;
        for &size in &sizes {
            let cycle = &nodes[offset..offset + size];
            for k in 0..size {
                incidence.set(cycle[k], cycle[(k + 1) % size], true);
            }
            offset += size;
        }

        let cuts = CutGenerator::new(n).generate_from_incidence(&incidence);
        let expected = if sizes.len() > 1 { sizes.len() } else { 0 };
        prop_assert_eq!(cuts.len(), expected);
        for cut in &cuts {
            prop_assert_eq!(cut.rhs, cut.size() - 1);
            prop_assert_eq!(cut.edges.len(), cut.size() * (cut.size() - 1) / 2);
        }
    }
}
