use std::cmp;

use crate::syntax::graph::DependencyGraph;

use super::{Grammar, HatForest, Reachability, Score, Sequence};

/// Buffer run that no gold arc between two buffer elements leaves.
#[derive(Debug)]
struct Run {
    /// Gold arcs with both ends in the run.
    inside: i64,
    /// Stack position of the gold head of the spine top.
    hang: Option<usize>,
}

/// Component recurrence over the stack and the buffer runs.
///
/// The buffer splits into the shortest runs closed under the gold arcs
/// between buffer elements. While a run is processed the stack only meets its
/// spine, the chain of gold heads from the first element of the run, so a
/// run is one decision: which stack element `s_x` stays on top. The elements
/// above it are popped, those headed by the spine with a gold arc, and the
/// spine top may take `s_x` as its head.
///
/// `V(i, c)` is the best gain from run `c` on with `s_i` on top:
///
/// ```text
/// V(i, c) = inside(c) + P(c, i) + max over x <= i of (G(c, x) - P(c, x) + V(x, c + 1))
/// ```
///
/// where `P(c, i)` counts the stack elements up to `s_i` the spine of `c`
/// heads. The maximum is kept as a running prefix, so a query fills one
/// cell per stack element and run, O(n^2) at worst. Exact for projective
/// gold trees, where every run is a gold subtree; otherwise an estimate.
#[derive(Debug, Default)]
pub struct QuadraticRecurrence {
    cells: usize,
}

impl QuadraticRecurrence {
    pub fn new() -> Self {
        QuadraticRecurrence { cells: 0 }
    }

    /// Cells filled by the last query.
    pub fn cells(&self) -> usize {
        self.cells
    }
}

impl Reachability for QuadraticRecurrence {
    fn reach(&mut self, grammar: Grammar, seq: &Sequence, gold: &DependencyGraph) -> Score {
        if grammar == Grammar::Hat {
            return HatForest::new().reach(grammar, seq, gold);
        }
        let t = seq.stack_len();
        let n = seq.len();
        let mut position = vec![None; gold.len()];
        for i in 0..n {
            position[seq.token(i)] = Some(i);
        }
        let head_at = |i: usize| gold.head(seq.token(i)).and_then(|h| position[h]);

        let mut extent: Vec<usize> = (0..n).collect();
        for i in t..n {
            if let Some(h) = head_at(i).filter(|&h| h >= t) {
                let (lo, hi) = (cmp::min(i, h), cmp::max(i, h));
                extent[lo] = cmp::max(extent[lo], hi);
            }
        }

        let mut runs = vec![];
        // spine[i]: the run whose spine holds buffer position i
        let mut spine = vec![None; n];
        let mut a = t;
        while a < n {
            let mut e = extent[a];
            let mut k = a;
            while k < e {
                k += 1;
                e = cmp::max(e, extent[k]);
            }
            let inside = (a..=e)
                .filter(|&i| head_at(i).map_or(false, |h| h >= a && h <= e))
                .count();
            let mut top = a;
            spine[top] = Some(runs.len());
            while let Some(h) = head_at(top).filter(|&h| h >= a && h <= e) {
                top = h;
                spine[top] = Some(runs.len());
            }
            runs.push(Run {
                inside: inside as i64,
                hang: head_at(top).filter(|&h| h < t),
            });
            a = e + 1;
        }
        if t == 0 {
            self.cells = 0;
            return Score::new(runs.iter().map(|r| r.inside).sum());
        }

        // popped[y]: the run whose spine can take s_y off the stack with its gold arc
        let mut popped = vec![None; t];
        for y in 1..t {
            if seq.is_headless(y) {
                popped[y] = head_at(y).and_then(|h| spine[h]);
            }
        }

        let mut next: Vec<i64> = vec![0; t];
        if grammar == Grammar::Revised {
            // late arcs along a stack that stays to the end
            for i in 1..t {
                let late = seq.is_headless(i) && head_at(i) == Some(i - 1);
                next[i] = next[i - 1] + late as i64;
            }
        }
        self.cells = t;
        for (c, run) in runs.iter().enumerate().rev() {
            let mut current = vec![0i64; t];
            let mut pops = 0;
            let mut best = i64::MIN;
            for i in 0..t {
                if popped[i] == Some(c) {
                    pops += 1;
                }
                let hang = (run.hang == Some(i)) as i64;
                best = cmp::max(best, hang - pops + next[i]);
                current[i] = run.inside + pops + best;
            }
            next = current;
            self.cells += t;
        }
        Score::new(next[t - 1])
    }
}
