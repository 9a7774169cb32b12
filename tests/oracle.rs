mod test_utils;

use transition_oracle::lang::{Sentence, Token};
use transition_oracle::logging;
use transition_oracle::oracle::{
    self, Algorithm, CubicChart, DynamicOracle, ExhaustiveSearch, Grammar, HatForest,
    LinearRecurrence, QuadraticRecurrence, Reachability, Score, Sequence, StaticOracle, Step,
};
use transition_oracle::syntax::transition::{
    Action, ArcEager, Hat, HatCodec, NormalArcEager, RevisedArcEager, Swap, TransitionSystem,
    WholeHat,
};
use transition_oracle::syntax::DependencyGraph;

fn arc_eager() -> TransitionSystem {
    TransitionSystem::ArcEager(ArcEager::new(false, false))
}

fn normal_arc_eager() -> TransitionSystem {
    TransitionSystem::NormalArcEager(NormalArcEager::new(false, false))
}

fn revised_arc_eager() -> TransitionSystem {
    TransitionSystem::RevisedArcEager(RevisedArcEager::new(false, false))
}

fn hat() -> TransitionSystem {
    TransitionSystem::Hat(Hat::new(false, HatCodec::default()))
}

fn dynamic(system: TransitionSystem) -> DynamicOracle {
    DynamicOracle::new(system, logging::discard()).unwrap()
}

#[test]
fn test_score_semiring() {
    let a = Score::new(3);
    let b = Score::from(5);
    assert_eq!(a.plus(b), b);
    assert_eq!(a.times(b), Score::new(8));
    assert_eq!(a.times(Score::ONE), a);
    assert_eq!(a.plus(Score::ZERO), a);
    assert_eq!(a.times(Score::ZERO), Score::ZERO);
    assert_eq!(Score::ZERO.times(Score::ZERO), Score::ZERO);
    assert!(!Score::ZERO.is_finite());
    assert_eq!(Score::ZERO.value(), None);
    assert_eq!(Score::ZERO.to_string(), "-inf");
    assert_eq!(b.to_string(), "5");
}

#[test]
fn test_grammars_of_systems() {
    assert_eq!(Grammar::for_system(&arc_eager()), Some(Grammar::ArcEager));
    assert_eq!(Grammar::for_system(&normal_arc_eager()), Some(Grammar::ArcEager));
    assert_eq!(Grammar::for_system(&revised_arc_eager()), Some(Grammar::Revised));
    assert_eq!(Grammar::for_system(&hat()), Some(Grammar::Hat));
    assert_eq!(dynamic(hat()).grammar(), Grammar::Hat);
    let unsupported = vec![TransitionSystem::Swap(Swap), TransitionSystem::WholeHat(WholeHat)];
    for system in unsupported {
        assert_eq!(Grammar::for_system(&system), None);
        match DynamicOracle::new(system, logging::discard()) {
            Err(oracle::Error::Unsupported(_)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }
}

#[test]
fn test_cubic_chart_matches_exhaustive_search() {
    let mut rng = test_utils::rng(10);
    for system in vec![arc_eager(), revised_arc_eager()] {
        let grammar = Grammar::for_system(&system).unwrap();
        for n in 1..7 {
            for trial in 0..12 {
                let sentence = test_utils::random_sentence(&mut rng, n, trial % 2 == 0);
                let gold = test_utils::gold(&sentence);
                let mut search = ExhaustiveSearch::new(&system, &gold);
                let mut chart = CubicChart::new(false);
                for steps in 0..2 * n + 2 {
                    let config =
                        test_utils::random_walk(&system, &sentence, &gold, &mut rng, steps);
                    let expected = search.reach(&config).unwrap();
                    let actual = chart.reach(grammar, &Sequence::new(&config), &gold);
                    assert_eq!(
                        actual, expected,
                        "system: {}, heads: {:?}, config: {}",
                        system,
                        gold.heads(),
                        config
                    );
                }
            }
        }
    }
}

#[test]
fn test_engines_agree_on_projective_trees() {
    let mut rng = test_utils::rng(11);
    for system in vec![arc_eager(), revised_arc_eager()] {
        let grammar = Grammar::for_system(&system).unwrap();
        for n in 1..12 {
            for _ in 0..10 {
                let sentence = test_utils::random_sentence(&mut rng, n, true);
                let gold = test_utils::gold(&sentence);
                let mut shared = CubicChart::new(true);
                let mut quadratic = QuadraticRecurrence::new();
                let mut linear = LinearRecurrence::new();
                for steps in 0..2 * n + 2 {
                    let config =
                        test_utils::random_walk(&system, &sentence, &gold, &mut rng, steps);
                    let seq = Sequence::new(&config);
                    let expected = CubicChart::new(false).reach(grammar, &seq, &gold);
                    assert_eq!(shared.reach(grammar, &seq, &gold), expected, "config: {}", config);
                    assert_eq!(
                        quadratic.reach(grammar, &seq, &gold),
                        expected,
                        "config: {}",
                        config
                    );
                    assert_eq!(linear.reach(grammar, &seq, &gold), expected, "config: {}", config);
                }
            }
        }
    }
}

#[test]
fn test_quadratic_cells_grow_with_the_square() {
    let mut rng = test_utils::rng(12);
    let system = arc_eager();
    let mut cells = vec![];
    for &n in &[16, 32, 64] {
        // every word hangs from the root, so each buffer word is a run of its own
        let heads: Vec<Option<usize>> = (0..=n)
            .map(|i| if i == 0 { None } else { Some(0) })
            .collect();
        let sentence = test_utils::sentence_from_heads(&mut rng, &heads);
        let gold = test_utils::gold(&sentence);
        let mut config = system.initial(&sentence);
        for _ in 0..n / 2 {
            system.apply(&mut config, &Action::Shift).unwrap();
        }
        let seq = Sequence::new(&config);
        let mut quadratic = QuadraticRecurrence::new();
        assert_eq!(quadratic.reach(Grammar::ArcEager, &seq, &gold), Score::from(n / 2));
        assert!(quadratic.cells() <= (n + 1) * (n + 1));
        cells.push(quadratic.cells() as f64);
    }
    for pair in cells.windows(2) {
        let ratio = pair[1] / pair[0];
        assert!(ratio > 3.0 && ratio < 5.0, "cells: {:?}", cells);
    }
}

#[test]
fn test_linear_engine_updates_incrementally() {
    let mut rng = test_utils::rng(20);
    let system = arc_eager();
    let mut oracle = dynamic(system.clone())
        .algorithm(Algorithm::Linear)
        .stray_probability(0.3);
    for &n in &[5, 12, 25, 50] {
        let sentence = test_utils::random_sentence(&mut rng, n, true);
        let gold = test_utils::gold(&sentence);
        let mut stateless = LinearRecurrence::new();
        oracle.reset();
        assert_eq!(oracle.linear().queries(), 0);
        let mut config = system.initial(&sentence);
        while !system.is_final(&config) {
            for action in system.candidate_actions(&config, &gold) {
                let mut next = config.clone();
                system.apply(&mut next, &action).unwrap();
                let expected = stateless.reach(Grammar::ArcEager, &Sequence::new(&next), &gold);
                assert_eq!(oracle.reach(&next, &gold).unwrap(), expected, "config: {}", next);
            }
            let action = oracle.step_action(&config, &gold, &mut rng, None).unwrap();
            system.apply(&mut config, &action).unwrap();
        }
        let linear = oracle.linear();
        assert!(linear.queries() >= n);
        assert!(
            linear.updates() <= gold.len() + 6 * linear.queries(),
            "n: {}, updates: {}, queries: {}",
            n,
            linear.updates(),
            linear.queries()
        );
    }
}

#[test]
fn test_hat_forest_matches_exhaustive_search() {
    let mut rng = test_utils::rng(19);
    let system = hat();
    for n in 1..6 {
        for trial in 0..12 {
            let sentence = test_utils::random_sentence(&mut rng, n, trial % 2 == 0);
            let gold = test_utils::gold(&sentence);
            let mut search = ExhaustiveSearch::new(&system, &gold);
            let mut forest = HatForest::new();
            for steps in 0..2 * n + 2 {
                let config = test_utils::random_walk(&system, &sentence, &gold, &mut rng, steps);
                let expected = search.reach(&config).unwrap();
                let seq = Sequence::new(&config);
                assert_eq!(
                    forest.reach(Grammar::Hat, &seq, &gold),
                    expected,
                    "heads: {:?}, config: {}",
                    gold.heads(),
                    config
                );
                assert_eq!(CubicChart::new(false).reach(Grammar::Hat, &seq, &gold), expected);
                assert_eq!(QuadraticRecurrence::new().reach(Grammar::Hat, &seq, &gold), expected);
            }
        }
    }
}

#[test]
fn test_chart_reuse_cache() {
    let sentence = test_utils::cat_sat();
    let gold = test_utils::gold(&sentence);
    let system = arc_eager();
    let mut chart = CubicChart::new(true);
    assert!(chart.reuse());
    let config = system.initial(&sentence);
    let first = chart.reach(Grammar::ArcEager, &Sequence::new(&config), &gold);
    assert_eq!(first, Score::new(4));
    assert!(chart.cached_cells() > 0);
    let second = chart.reach(Grammar::ArcEager, &Sequence::new(&config), &gold);
    assert_eq!(first, second);
    chart.reset();
    assert_eq!(chart.cached_cells(), 0);
}

#[test]
fn test_dynamic_scores_on_fixture() {
    let sentence = test_utils::cat_sat();
    let gold = test_utils::gold(&sentence);
    let mut oracle = dynamic(arc_eager());
    let config = arc_eager().initial(&sentence);

    assert_eq!(oracle.reach(&config, &gold).unwrap(), Score::new(4));
    let scores = oracle.score_map(&config, &gold).unwrap();
    assert_eq!(scores.len(), 2);
    assert_eq!(scores["Shift"], Score::new(4));
    assert_eq!(scores["RightArc(dep)"], Score::new(3));
    assert_eq!(oracle.best_actions(&config, &gold).unwrap(), vec![Action::Shift]);

    let mut rng = test_utils::rng(0);
    let step = oracle.step(&config, &gold, &mut rng, None).unwrap();
    assert_eq!(
        step,
        Step {
            optimal: Action::Shift,
            followed: Action::Shift,
        }
    );

    let mut stray = dynamic(arc_eager()).stray_probability(1.0);
    let step = stray.step(&config, &gold, &mut rng, None).unwrap();
    assert_eq!(step.optimal, Action::Shift);
    assert_eq!(step.followed, Action::RightArc("dep".to_string()));
    let followed = stray
        .step_action(&config, &gold, &mut rng, Some(&["RightArc(dep)".to_string()][..]))
        .unwrap();
    assert_eq!(followed, Action::RightArc("dep".to_string()));
}

#[test]
fn test_dynamic_oracle_on_final_configuration() {
    let sentence = test_utils::cat_sat();
    let gold = test_utils::gold(&sentence);
    let system = arc_eager();
    let mut oracle = dynamic(system.clone());
    let config = oracle::StaticOracle::new(system).derive(&sentence, &gold).unwrap();
    assert_eq!(oracle.reach(&config, &gold).unwrap(), Score::ONE);
    assert!(oracle.scores(&config, &gold).unwrap().is_empty());
    let mut rng = test_utils::rng(0);
    match oracle.step(&config, &gold, &mut rng, None) {
        Err(oracle::Error::Exhausted(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_action_scores_predict_the_next_total() {
    let mut rng = test_utils::rng(13);
    for system in vec![arc_eager(), normal_arc_eager(), revised_arc_eager(), hat()] {
        let mut oracle = dynamic(system.clone());
        for n in 1..8 {
            for trial in 0..10 {
                let sentence = test_utils::random_sentence(&mut rng, n, trial % 2 == 0);
                let gold = test_utils::gold(&sentence);
                oracle.reset();
                let mut config = system.initial(&sentence);
                let mut previous: Option<Score> = None;
                while !system.is_final(&config) {
                    let total = Score::from(config.num_correct(&gold))
                        .times(oracle.reach(&config, &gold).unwrap());
                    if let Some(previous) = previous {
                        assert_eq!(total, previous, "config: {}", config);
                    }
                    let scores = oracle.scores(&config, &gold).unwrap();
                    let best = scores.iter().map(|&(_, s)| s).fold(Score::ZERO, Score::plus);
                    assert_eq!(best, total, "system: {}, config: {}", system, config);
                    let step = oracle.step(&config, &gold, &mut rng, None).unwrap();
                    let optimal = scores.iter().find(|&&(ref a, _)| *a == step.optimal).unwrap();
                    assert_eq!(optimal.1, total);

                    // follow any action, optimal or not
                    let i = rng_index(&mut rng, scores.len());
                    let (ref action, score) = scores[i];
                    system.apply(&mut config, action).unwrap();
                    previous = Some(score);
                }
                if let Some(previous) = previous {
                    assert_eq!(Score::from(config.num_correct(&gold)), previous);
                }
            }
        }
    }
}

fn rng_index<R: rand::Rng>(rng: &mut R, len: usize) -> usize {
    rng.gen_range(0..len)
}

#[test]
fn test_validation_mode_accepts_exact_engines() {
    let mut rng = test_utils::rng(14);
    for &algorithm in &[Algorithm::Quadratic, Algorithm::Linear] {
        for system in vec![arc_eager(), normal_arc_eager(), revised_arc_eager()] {
            let mut oracle = DynamicOracle::new(system.clone(), logging::discard())
                .unwrap()
                .algorithm(algorithm)
                .reuse(true)
                .validate(true)
                .stray_probability(0.3);
            for n in 1..10 {
                for trial in 0..6 {
                    let projective = trial % 2 == 0;
                    let sentence = test_utils::random_sentence(&mut rng, n, projective);
                    let gold = test_utils::gold(&sentence);
                    oracle.reset();
                    let mut config = system.initial(&sentence);
                    while !system.is_final(&config) {
                        let action = oracle
                            .step_action(&config, &gold, &mut rng, None)
                            .unwrap_or_else(|e| panic!("{:?} on {}: {}", algorithm, config, e));
                        system.apply(&mut config, &action).unwrap();
                    }
                }
            }
        }
    }
}

#[test]
fn test_dynamic_oracle_without_strays_reaches_gold() {
    let mut rng = test_utils::rng(15);
    for system in vec![arc_eager(), normal_arc_eager(), revised_arc_eager(), hat()] {
        for &algorithm in &[Algorithm::Cubic, Algorithm::Quadratic, Algorithm::Linear] {
            let mut oracle = dynamic(system.clone()).algorithm(algorithm);
            for n in 1..10 {
                for _ in 0..5 {
                    let sentence = test_utils::random_sentence(&mut rng, n, true);
                    let gold = test_utils::gold(&sentence);
                    oracle.reset();
                    let mut config = system.initial(&sentence);
                    while !system.is_final(&config) {
                        let action = oracle.step_action(&config, &gold, &mut rng, None).unwrap();
                        system.apply(&mut config, &action).unwrap();
                    }
                    assert_eq!(config.num_correct(&gold), n, "system: {}", system);
                }
            }
        }
    }
}

fn gold_path_systems() -> Vec<TransitionSystem> {
    let mut systems = vec![];
    for &early_reduce in &[false, true] {
        for &strict in &[false, true] {
            systems.push(TransitionSystem::ArcEager(ArcEager::new(early_reduce, strict)));
            systems.push(TransitionSystem::NormalArcEager(NormalArcEager::new(
                early_reduce,
                strict,
            )));
            systems.push(TransitionSystem::RevisedArcEager(RevisedArcEager::new(
                early_reduce,
                strict,
            )));
        }
    }
    for &left_dependents_first in &[false, true] {
        systems.push(TransitionSystem::Hat(Hat::new(
            left_dependents_first,
            HatCodec::default(),
        )));
    }
    systems
}

#[test]
fn test_dynamic_oracle_follows_the_static_oracle_on_gold_paths() {
    let mut rng = test_utils::rng(16);
    let systems = gold_path_systems();
    for n in 1..9 {
        for _ in 0..8 {
            let sentence = test_utils::random_sentence(&mut rng, n, true);
            let gold = test_utils::gold(&sentence);
            for system in &systems {
                let expected = StaticOracle::new(system.clone())
                    .derive(&sentence, &gold)
                    .unwrap();
                let mut oracle = dynamic(system.clone());
                let mut config = system.initial(&sentence);
                while !system.is_final(&config) {
                    let step = oracle.step(&config, &gold, &mut rng, None).unwrap();
                    assert_eq!(step.followed, step.optimal);
                    system.apply(&mut config, &step.optimal).unwrap();
                }
                assert_eq!(
                    config.actions(),
                    expected.actions(),
                    "system: {:?}, heads: {:?}",
                    system,
                    gold.heads()
                );
            }
        }
    }
}

/// Correct arcs at the end of a derivation that takes the first non-optimal
/// action at each of its first `k` chances and optimal actions otherwise.
fn total_after_strays(
    oracle: &mut DynamicOracle,
    sentence: &Sentence<Token<'static>>,
    gold: &DependencyGraph,
    k: usize,
) -> usize {
    let system = oracle.system().clone();
    let mut rng = test_utils::rng(0);
    let mut config = system.initial(sentence);
    let mut strays = 0;
    oracle.reset();
    while !system.is_final(&config) {
        let scores = oracle.scores(&config, gold).unwrap();
        let best = scores.iter().map(|&(_, s)| s).fold(Score::ZERO, Score::plus);
        let action = match scores.iter().find(|&&(_, s)| s < best) {
            Some(&(ref action, _)) if strays < k => {
                strays += 1;
                action.clone()
            }
            _ => oracle.step(&config, gold, &mut rng, None).unwrap().optimal,
        };
        system.apply(&mut config, &action).unwrap();
    }
    config.num_correct(gold)
}

#[test]
fn test_forced_mistakes_never_raise_the_total() {
    let mut rng = test_utils::rng(21);
    for system in vec![arc_eager(), revised_arc_eager(), hat()] {
        let mut oracle = dynamic(system.clone());
        for n in 2..9 {
            for trial in 0..6 {
                let sentence = test_utils::random_sentence(&mut rng, n, trial % 2 == 0);
                let gold = test_utils::gold(&sentence);
                let initial = system.initial(&sentence);
                let best = oracle.reach(&initial, &gold).unwrap();
                let totals: Vec<usize> = (0..6)
                    .map(|k| total_after_strays(&mut oracle, &sentence, &gold, k))
                    .collect();
                assert_eq!(Score::from(totals[0]), best, "system: {}", system);
                for pair in totals.windows(2) {
                    assert!(
                        pair[1] <= pair[0],
                        "system: {}, heads: {:?}, totals: {:?}",
                        system,
                        gold.heads(),
                        totals
                    );
                }
            }
        }
    }
}
