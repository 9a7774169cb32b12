use std::collections::HashMap;

use crate::syntax::graph::DependencyGraph;

use super::{Grammar, HatForest, Reachability, Score, Sequence};

struct Table {
    size: usize,
    cells: Vec<Score>,
}

impl Table {
    fn new(size: usize) -> Self {
        Table {
            size: size,
            cells: vec![Score::ZERO; size * size],
        }
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> Score {
        self.cells[i * self.size + j]
    }

    #[inline]
    fn set(&mut self, i: usize, j: usize, score: Score) {
        self.cells[i * self.size + j] = score;
    }
}

/// Cells of one span: complete left/right, incomplete left/right and the
/// incomplete right item built with a late arc.
type Cell = [Score; 5];

/// Eisner-style chart over the sequence, O(n^3) per query.
///
/// The hat grammar is not projective and goes to `HatForest`.
///
/// Spans lying entirely inside the buffer do not depend on the stack, so with
/// `reuse` their cells are kept across the queries of one sentence, keyed by
/// their boundary tokens.
#[derive(Debug, Default)]
pub struct CubicChart {
    reuse: bool,
    cache: HashMap<(Grammar, usize, usize), Cell>,
    heads: Vec<Option<usize>>,
}

impl CubicChart {
    pub fn new(reuse: bool) -> Self {
        CubicChart {
            reuse: reuse,
            cache: HashMap::new(),
            heads: vec![],
        }
    }

    pub fn reuse(&self) -> bool {
        self.reuse
    }

    /// Drops every cached cell.
    pub fn reset(&mut self) {
        self.cache.clear();
        self.heads.clear();
    }

    pub fn cached_cells(&self) -> usize {
        self.cache.len()
    }

    fn sync(&mut self, gold: &DependencyGraph) {
        if self.heads.as_slice() != gold.heads() {
            self.reset();
            self.heads = gold.heads().to_vec();
        }
    }
}

impl Reachability for CubicChart {
    fn reach(&mut self, grammar: Grammar, seq: &Sequence, gold: &DependencyGraph) -> Score {
        if grammar == Grammar::Hat {
            return HatForest::new().reach(grammar, seq, gold);
        }
        if self.reuse {
            self.sync(gold);
        }
        // the virtual root takes chart position 0
        let offset = if grammar == Grammar::ArcEager { 1 } else { 0 };
        let m = seq.len() + offset;
        if m == 0 {
            return Score::ONE;
        }
        let buffer_start = offset + seq.stack_len();
        let weight = |h: usize, d: usize| -> Option<i64> {
            if offset == 0 {
                seq.arc_weight(gold, h, d)
            } else if d == 0 {
                None
            } else if h == 0 {
                if seq.is_root_attachable(d - 1) {
                    Some(0)
                } else {
                    None
                }
            } else {
                seq.arc_weight(gold, h - 1, d - 1)
            }
        };
        let late = |h: usize, d: usize| -> Option<i64> {
            if grammar == Grammar::Revised {
                seq.late_weight(gold, h, d)
            } else {
                None
            }
        };

        let mut complete_left = Table::new(m);
        let mut complete_right = Table::new(m);
        let mut incomplete_left = Table::new(m);
        let mut incomplete_right = Table::new(m);
        let mut late_right = Table::new(m);
        for i in 0..m {
            complete_left.set(i, i, Score::ONE);
            complete_right.set(i, i, Score::ONE);
        }

        for span in 1..m {
            for i in 0..(m - span) {
                let j = i + span;
                let cacheable = self.reuse && i >= buffer_start;
                if cacheable {
                    let key = (grammar, seq.token(i - offset), seq.token(j - offset));
                    if let Some(cell) = self.cache.get(&key) {
                        complete_left.set(i, j, cell[0]);
                        complete_right.set(i, j, cell[1]);
                        incomplete_left.set(i, j, cell[2]);
                        incomplete_right.set(i, j, cell[3]);
                        late_right.set(i, j, cell[4]);
                        continue;
                    }
                }

                let mut join = Score::ZERO;
                for r in i..j {
                    join = join.plus(complete_right.get(i, r).times(complete_left.get(r + 1, j)));
                }
                let arc = |w: Option<i64>| w.map_or(Score::ZERO, |w| join.times(Score::new(w)));
                incomplete_right.set(i, j, arc(weight(i, j)));
                incomplete_left.set(i, j, arc(weight(j, i)));
                late_right.set(i, j, arc(late(i, j)));

                let mut left = Score::ZERO;
                for r in i..j {
                    left = left.plus(complete_left.get(i, r).times(incomplete_left.get(r, j)));
                }
                complete_left.set(i, j, left);
                let mut right = Score::ZERO;
                for r in (i + 1)..(j + 1) {
                    right = right.plus(incomplete_right.get(i, r).times(complete_right.get(r, j)));
                }
                complete_right.set(i, j, right);

                if cacheable {
                    let key = (grammar, seq.token(i - offset), seq.token(j - offset));
                    self.cache.insert(
                        key,
                        [
                            left,
                            right,
                            incomplete_left.get(i, j),
                            incomplete_right.get(i, j),
                            late_right.get(i, j),
                        ],
                    );
                }
            }
        }

        if grammar == Grammar::ArcEager {
            return complete_right.get(0, m - 1);
        }
        // right spine: the elements still on the stack at the end
        let mut spine = vec![Score::ZERO; m];
        spine[m - 1] = Score::ONE;
        for i in (0..(m - 1)).rev() {
            let mut best = Score::ZERO;
            for k in (i + 1)..m {
                let item = incomplete_right.get(i, k).plus(late_right.get(i, k));
                best = best.plus(item.times(spine[k]));
            }
            spine[i] = best;
        }
        spine[0]
    }
}
