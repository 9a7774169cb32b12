use crate::syntax::graph::DependencyGraph;
use crate::syntax::transition::Configuration;

use super::{Grammar, QuadraticRecurrence, Reachability, Score, Sequence};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Place {
    Gone,
    Stack { headless: bool },
    Buffer,
}

/// Arc-decomposed reachability.
///
/// Under the arc-eager grammar with a projective gold tree, the gold arcs that
/// are reachable one by one are also reachable together, so the score is a
/// count: every headless element other than the root whose gold head is
/// still around, unless both sit on the stack. Other inputs go to the
/// quadratic recurrence.
///
/// `reach_config` keeps the count between queries. Each element knows where
/// it is and how many of its gold dependents are headless on the stack or in
/// the buffer, so moving one element updates the count in constant time.
#[derive(Debug, Default)]
pub struct LinearRecurrence {
    fallback: QuadraticRecurrence,
    projective: bool,
    place: Vec<Place>,
    stack: Vec<(usize, bool)>,
    front: usize,
    stack_deps: Vec<usize>,
    buffer_deps: Vec<usize>,
    count: i64,
    queries: usize,
    updates: usize,
}

impl LinearRecurrence {
    pub fn new() -> Self {
        LinearRecurrence::default()
    }

    pub fn applies(grammar: Grammar, gold: &DependencyGraph) -> bool {
        grammar == Grammar::ArcEager && gold.is_projective()
    }

    /// Forgets the tracked sentence.
    pub fn reset(&mut self) {
        self.place.clear();
        self.stack.clear();
        self.stack_deps.clear();
        self.buffer_deps.clear();
        self.front = 0;
        self.count = 0;
        self.queries = 0;
        self.updates = 0;
    }

    /// Incremental queries since the last reset.
    pub fn queries(&self) -> usize {
        self.queries
    }

    /// Elements moved since the last reset.
    pub fn updates(&self) -> usize {
        self.updates
    }

    /// Reachability of `config`, updated from the previous query.
    ///
    /// Queries between two resets must come from the derivation of one
    /// sentence: the candidates of a configuration, then those of the one
    /// followed, and so on. Each query then moves a constant number of
    /// elements, O(n) for the whole sentence.
    pub fn reach_config(
        &mut self,
        grammar: Grammar,
        config: &Configuration,
        gold: &DependencyGraph,
    ) -> Score {
        if self.place.len() != gold.len() {
            self.rebuild(gold);
        }
        if grammar != Grammar::ArcEager || !self.projective {
            return self.fallback.reach(grammar, &Sequence::new(config), gold);
        }
        self.queries += 1;
        self.sync(config, gold);
        Score::new(self.count)
    }

    fn rebuild(&mut self, gold: &DependencyGraph) {
        let n = gold.len();
        self.reset();
        self.projective = gold.is_projective();
        self.place = vec![Place::Gone; n];
        self.stack_deps = vec![0; n];
        self.buffer_deps = vec![0; n];
        self.front = n;
    }

    fn sync(&mut self, config: &Configuration, gold: &DependencyGraph) {
        let prefix = config.prefix();
        let front = config.front().unwrap_or(gold.len());
        let entry = |i: usize| (prefix[i], !config.is_headed(prefix[i]));
        while let Some(&(v, headless)) = self.stack.last() {
            let i = self.stack.len() - 1;
            if i < prefix.len() && entry(i) == (v, headless) {
                break;
            }
            self.stack.pop();
            let place = if v >= front { Place::Buffer } else { Place::Gone };
            self.set_place(gold, v, place);
        }
        for i in self.stack.len()..prefix.len() {
            let (v, headless) = entry(i);
            self.stack.push((v, headless));
            self.set_place(gold, v, Place::Stack { headless: headless });
        }
        if front > self.front {
            for v in self.front..front {
                if self.place[v] == Place::Buffer {
                    self.set_place(gold, v, Place::Gone);
                }
            }
        } else {
            for v in front..self.front {
                if self.place[v] == Place::Gone {
                    self.set_place(gold, v, Place::Buffer);
                }
            }
        }
        self.front = front;
    }

    /// Whether the gold arc into `v` counts.
    fn own(&self, gold: &DependencyGraph, v: usize) -> i64 {
        let h = match gold.head(v) {
            Some(h) => h,
            None => return 0,
        };
        match (self.place[v], self.place[h]) {
            (Place::Stack { headless: true }, Place::Buffer) => 1,
            (Place::Buffer, Place::Stack { .. }) | (Place::Buffer, Place::Buffer) => 1,
            _ => 0,
        }
    }

    /// Counted gold arcs out of `v`.
    fn below(&self, v: usize) -> i64 {
        match self.place[v] {
            Place::Gone => 0,
            Place::Stack { .. } => self.buffer_deps[v] as i64,
            Place::Buffer => (self.stack_deps[v] + self.buffer_deps[v]) as i64,
        }
    }

    fn set_place(&mut self, gold: &DependencyGraph, v: usize, place: Place) {
        let old = self.place[v];
        if old == place {
            return;
        }
        self.updates += 1;
        self.count -= self.own(gold, v) + self.below(v);
        if let Some(h) = gold.head(v) {
            match old {
                Place::Stack { headless: true } => self.stack_deps[h] -= 1,
                Place::Buffer => self.buffer_deps[h] -= 1,
                _ => {}
            }
            match place {
                Place::Stack { headless: true } => self.stack_deps[h] += 1,
                Place::Buffer => self.buffer_deps[h] += 1,
                _ => {}
            }
        }
        self.place[v] = place;
        self.count += self.own(gold, v) + self.below(v);
    }
}

impl Reachability for LinearRecurrence {
    fn reach(&mut self, grammar: Grammar, seq: &Sequence, gold: &DependencyGraph) -> Score {
        if !LinearRecurrence::applies(grammar, gold) {
            return self.fallback.reach(grammar, seq, gold);
        }
        let mut position = vec![None; gold.len()];
        for i in 0..seq.len() {
            position[seq.token(i)] = Some(i);
        }
        let mut count = 0;
        for d in 0..seq.len() {
            let token = seq.token(d);
            if token == 0 || !seq.is_headless(d) {
                continue;
            }
            let h = match gold.head(token).and_then(|h| position[h]) {
                Some(h) => h,
                None => continue,
            };
            if !(seq.is_stack(h) && seq.is_stack(d)) {
                count += 1;
            }
        }
        Score::from(count)
    }
}
