use rand::Rng;
use u_tsp::branch_cut::BranchAndCut;
use u_tsp::budget::TimeBudget;
use u_tsp::construct::{nearest_neighbor_order, SkipPolicy, Start};
use u_tsp::cuts::CutGenerator;
use u_tsp::genetic::GeneticConfig;
use u_tsp::hybrid::{HybridConfig, HybridSolver};
use u_tsp::instance::{CandidateList, Instance, Metric, Point};
use u_tsp::matheuristic::{sample_single_parent, Matheuristic, MatheuristicConfig};
use u_tsp::model::{EdgeModel, EnumerativeSolver, SolverConfig, SolverStatus};
use u_tsp::plot::{LogSink, NullSink};
use u_tsp::random::create_rng;
use u_tsp::tour::{EdgeIncidence, EdgeIndex, Tour};

fn square() -> Instance {
    let points = vec![
        Point::new(0.0, 0.0),
        Point::new(0.0, 1.0),
        Point::new(1.0, 1.0),
        Point::new(1.0, 0.0),
    ];
    Instance::from_points(points, Metric::Euclidean).unwrap()
}

fn scattered(n: usize, seed: u64) -> Instance {
    let mut rng = create_rng(seed);
    let points = (0..n)
        .map(|_| Point::new(rng.random_range(0.0..50.0), rng.random_range(0.0..50.0)))
        .collect();
    Instance::from_points(points, Metric::Euclidean).unwrap()
}

#[test]
fn square_greedy_walk_is_the_perimeter() {
    let instance = square();
    let candidates = CandidateList::build(&instance).unwrap();
    let mut rng = create_rng(0);
    let order =
        nearest_neighbor_order(&candidates, Start::Node(0), SkipPolicy::greedy(), &mut rng).unwrap();
    let tour = Tour::from_order(&instance, order).unwrap();
    assert!((tour.cost() - 4.0).abs() < 1e-12);
}

#[test]
fn square_randomized_walks_are_hamiltonian() {
    let instance = square();
    let candidates = CandidateList::build(&instance).unwrap();
    let crossed = 2.0 + 2.0 * std::f64::consts::SQRT_2;
    let mut rng = create_rng(1);
    for policy in [SkipPolicy::NEAREST, SkipPolicy::SEEDING, SkipPolicy::POLISH] {
        for _ in 0..50 {
            let order =
                nearest_neighbor_order(&candidates, Start::Node(0), policy, &mut rng).unwrap();
            assert_eq!(order[0], 0);
            let tour = Tour::from_order(&instance, order).unwrap();
            let cost = tour.cost();
            assert!((cost - 4.0).abs() < 1e-9 || (cost - crossed).abs() < 1e-9, "cost {cost}");
        }
    }
}

#[test]
fn two_triangles_give_two_cuts() {
    let index = EdgeIndex::new(6);
    let mut values = vec![0.0; index.len()];
    for (i, j) in [(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5)] {
        values[index.position(i, j)] = 1.0;
    }

    let cuts = CutGenerator::new(6).generate(&values);
    assert_eq!(cuts.len(), 2);
    assert_eq!(cuts[0].nodes, vec![0, 1, 2]);
    assert_eq!(cuts[1].nodes, vec![3, 4, 5]);
    for cut in &cuts {
        assert_eq!(cut.edges.len(), 3);
        assert_eq!(cut.rhs, 2);
        assert!(cut.is_violated(&values));
    }
}

#[test]
fn fixing_every_edge_of_the_optimum_returns_it() {
    let instance = scattered(7, 3);
    let solver = EnumerativeSolver::new();

    let mut model = EdgeModel::new(&instance);
    let (optimal, stats) =
        BranchAndCut::solve(&instance, &mut model, &solver, &SolverConfig::default()).unwrap();
    assert_eq!(stats.status, SolverStatus::Optimal);

    let incidence = EdgeIncidence::from_tour(&optimal);
    let mut rng = create_rng(4);
    let fixed = sample_single_parent(&incidence, 1.0, 16, &mut rng);
    assert_eq!(fixed.len(), 7);

    let config = MatheuristicConfig::default().with_fixing_probability(1.0);
    let (tour, _) = Matheuristic::fix_and_solve(
        &instance,
        &mut model,
        &solver,
        &optimal,
        &config,
        &TimeBudget::unlimited(),
        &mut rng,
    )
    .unwrap();

    assert_eq!(EdgeIncidence::from_tour(&tour), incidence);
    assert!((tour.cost() - optimal.cost()).abs() < 1e-9);
    assert!(model.fixed_positions().is_empty());
}

#[test]
fn hybrid_matches_branch_and_cut_optimum() {
    let instance = scattered(8, 9);
    let solver = EnumerativeSolver::new();

    let mut model = EdgeModel::new(&instance);
    let (optimal, _) =
        BranchAndCut::solve(&instance, &mut model, &solver, &SolverConfig::default()).unwrap();

    let config = HybridConfig::default()
        .with_dense_model()
        .with_matheuristic(
            MatheuristicConfig::default()
                .with_fixing_probability(0.3)
                .with_max_rounds(25)
                .with_stagnation_limit(0),
        )
        .with_seed(21);
    let result = HybridSolver::solve(&instance, &solver, &config).unwrap();

    assert!(result.best_cost >= optimal.cost() - 1e-9);
    assert!((result.best_cost - optimal.cost()).abs() < 1e-6);
}

#[test]
fn logging_sink_leaves_the_search_unchanged() {
    let instance = scattered(7, 12);
    let solver = EnumerativeSolver::new();
    let config = HybridConfig::default()
        .with_genetic(
            GeneticConfig::default()
                .with_population_size(20)
                .with_max_generations(20),
        )
        .with_matheuristic(
            MatheuristicConfig::default()
                .with_fixing_probability(0.4)
                .with_max_rounds(10),
        )
        .with_seed(8);

    let logged = HybridSolver::solve_with_sink(&instance, &solver, &config, &mut LogSink, None)
        .unwrap();
    let silent = HybridSolver::solve_with_sink(&instance, &solver, &config, &mut NullSink, None)
        .unwrap();

    assert_eq!(logged.best, silent.best);
    assert_eq!(logged.polish_rounds, silent.polish_rounds);
    assert!(logged.best_cost <= logged.genetic.best_cost + 1e-9);
}
