mod test_utils;

use transition_oracle::syntax::graph::{self, DependencyGraph};
use transition_oracle::syntax::{is_projective, projectivize};

fn graph(heads: &[Option<usize>]) -> Result<DependencyGraph, graph::Error> {
    let deprels = vec![None; heads.len()];
    DependencyGraph::from_heads(heads, &deprels)
}

#[test]
fn test_invalid_graphs() {
    assert!(graph(&[]).is_err());
    match graph(&[Some(0), None]) {
        Err(graph::Error::RootHasHead) => {}
        other => panic!("unexpected result: {:?}", other),
    }
    match graph(&[None, None]) {
        Err(graph::Error::MissingHead(1)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
    match graph(&[None, Some(5)]) {
        Err(graph::Error::HeadOutOfRange(1, 5)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
    match graph(&[None, Some(2), Some(1)]) {
        Err(graph::Error::Cycle(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
    let deprels = vec![None; 2];
    assert!(DependencyGraph::from_heads(&[None, Some(0), Some(1)], &deprels).is_err());
}

#[test]
fn test_graph_queries() {
    let sentence = test_utils::cat_sat();
    let gold = test_utils::gold(&sentence);
    assert_eq!(gold.len(), 5);
    assert_eq!(gold.head(1), Some(2));
    assert_eq!(gold.head(0), None);
    assert_eq!(gold.deprel(4), Some("punct"));
    assert_eq!(gold.upos(3), Some("VERB"));
    assert_eq!(gold.children(3), &[2, 4]);
    assert!(gold.is_dependent_of(2, 3));
    assert!(!gold.is_dependent_of(3, 2));
    assert!(gold.is_linked(3, 2));
    assert!(!gold.is_linked(1, 3));
    assert!(gold.dominates(3, 1));
    assert!(!gold.dominates(1, 3));
    assert!(gold.is_projective());
    assert_eq!(gold.projective_order(), vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_non_projective_graph() {
    let sentence = test_utils::crossing();
    let gold = test_utils::gold(&sentence);
    assert!(!gold.is_projective());
    // in-order traversal: root, b, a, d, c
    assert_eq!(gold.projective_order(), vec![0, 2, 1, 4, 3]);
    let mpc = gold.mpc();
    assert_eq!(mpc, vec![0, 1, 2, 3, 4]);

    let projective = test_utils::gold(&test_utils::cat_sat());
    assert_eq!(projective.mpc(), vec![0; 5]);
}

#[test]
fn test_projectivize() {
    let heads = test_utils::gold(&test_utils::crossing()).heads().to_vec();
    assert!(!is_projective(&heads));
    let lifted = projectivize(&heads);
    assert!(is_projective(&lifted));
    assert_eq!(lifted[0], None);
    // the arc 1 -> 4 is lifted to 3 -> 4
    assert_eq!(lifted[4], Some(3));
    assert_eq!(lifted[1], Some(2));
    assert!(graph(&lifted).is_ok());
}

#[test]
fn test_projectivize_random_trees() {
    let mut rng = test_utils::rng(6);
    for n in 1..15 {
        for _ in 0..20 {
            let heads = test_utils::random_heads(&mut rng, n);
            let lifted = projectivize(&heads);
            assert!(is_projective(&lifted), "{:?} -> {:?}", heads, lifted);
            assert!(graph(&lifted).is_ok());
            if is_projective(&heads) {
                assert_eq!(lifted, heads);
            }
            assert_eq!(graph(&heads).unwrap().is_projective(), is_projective(&heads));

            let projective = test_utils::random_projective_heads(&mut rng, n);
            assert!(is_projective(&projective));
            assert_eq!(projectivize(&projective), projective);
        }
    }
}
