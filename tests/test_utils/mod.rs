#![allow(dead_code)]

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use transition_oracle::lang::{Sentence, Token};
use transition_oracle::syntax::transition::{Configuration, TransitionSystem};
use transition_oracle::syntax::DependencyGraph;

pub static UPOS: [&str; 4] = ["NOUN", "VERB", "DET", "ADJ"];

pub fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// "The cat sat ." with heads 2, 3, 0, 3.
pub fn cat_sat() -> Sentence<Token<'static>> {
    Sentence::from_rows(&[
        ("The", "DET", 2, "det"),
        ("cat", "NOUN", 3, "nsubj"),
        ("sat", "VERB", 0, "root"),
        (".", "PUNCT", 3, "punct"),
    ])
}

/// Token 4 hangs from token 1 over token 2, whose head is the root.
pub fn crossing() -> Sentence<Token<'static>> {
    Sentence::from_rows(&[
        ("a", "NOUN", 3, "nmod"),
        ("b", "VERB", 0, "root"),
        ("c", "NOUN", 2, "obj"),
        ("d", "ADJ", 1, "amod"),
    ])
}

pub fn gold(sentence: &Sentence<Token<'static>>) -> DependencyGraph {
    DependencyGraph::from_sentence(sentence).unwrap()
}

/// Random projective head vector over `n` tokens, root at 0.
pub fn random_projective_heads<R: Rng>(rng: &mut R, n: usize) -> Vec<Option<usize>> {
    let mut heads = vec![None; n + 1];
    build_projective(rng, &mut heads, 1, n, 0);
    heads
}

fn build_projective<R: Rng>(
    rng: &mut R,
    heads: &mut Vec<Option<usize>>,
    lo: usize,
    hi: usize,
    head: usize,
) {
    if lo > hi {
        return;
    }
    let r = rng.gen_range(lo..=hi);
    heads[r] = Some(head);
    if head < lo && rng.gen_bool(0.5) {
        build_projective(rng, heads, lo, r - 1, r);
        build_projective(rng, heads, r + 1, hi, head);
    } else if head > hi && rng.gen_bool(0.5) {
        build_projective(rng, heads, lo, r - 1, head);
        build_projective(rng, heads, r + 1, hi, r);
    } else {
        build_projective(rng, heads, lo, r - 1, r);
        build_projective(rng, heads, r + 1, hi, r);
    }
}

/// Random head vector over `n` tokens with no projectivity constraint.
pub fn random_heads<R: Rng>(rng: &mut R, n: usize) -> Vec<Option<usize>> {
    let mut order: Vec<usize> = (1..=n).collect();
    order.shuffle(rng);
    let mut placed = vec![0];
    let mut heads = vec![None; n + 1];
    for v in order {
        let h = placed[rng.gen_range(0..placed.len())];
        heads[v] = Some(h);
        placed.push(v);
    }
    heads
}

pub fn sentence_from_heads<R: Rng>(
    rng: &mut R,
    heads: &[Option<usize>],
) -> Sentence<Token<'static>> {
    let rows: Vec<(String, String, usize, String)> = heads
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, head)| {
            (
                format!("w{}", i),
                UPOS[rng.gen_range(0..UPOS.len())].to_string(),
                head.unwrap(),
                format!("l{}", i % 3),
            )
        })
        .collect();
    Sentence::from_rows(&rows)
}

pub fn random_sentence<R: Rng>(
    rng: &mut R,
    n: usize,
    projective: bool,
) -> Sentence<Token<'static>> {
    let heads = if projective {
        random_projective_heads(rng, n)
    } else {
        random_heads(rng, n)
    };
    sentence_from_heads(rng, &heads)
}

/// Takes up to `steps` random candidate actions from the initial configuration.
pub fn random_walk<R: Rng>(
    system: &TransitionSystem,
    sentence: &Sentence<Token<'static>>,
    gold: &DependencyGraph,
    rng: &mut R,
    steps: usize,
) -> Configuration {
    let mut config = system.initial(sentence);
    for _ in 0..steps {
        if system.is_final(&config) {
            break;
        }
        let candidates = system.candidate_actions(&config, gold);
        match candidates.choose(rng) {
            Some(action) => system.apply(&mut config, action).unwrap(),
            None => break,
        }
    }
    config
}
