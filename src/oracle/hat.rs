use std::collections::BTreeMap;

use crate::syntax::graph::DependencyGraph;

use super::{Grammar, Reachability, Score, Sequence};

/// Kept part of a component, seen from the element that heads it so far.
///
/// Field order matters: states sort by their flags first and by `balance`
/// last, which is what `prune` relies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Open {
    /// Holds the hat or a buffer element.
    free: bool,
    /// Holds a fixed element with dependents and no free descendant.
    needy: bool,
    /// The element itself is fixed and has no kept dependents.
    bare: bool,
    /// Some closed component holds a free element or is needy.
    live_closed: bool,
    /// Fixed elements waiting for a free descendant, minus the closed
    /// components that can be hung below them.
    balance: i64,
}

/// An element while its dependents are being merged in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Partial {
    free: bool,
    needy: bool,
    any_child: bool,
    all_bare: bool,
    live_closed: bool,
    balance: i64,
}

type States<S> = BTreeMap<S, usize>;

fn relax<S: Ord>(states: &mut States<S>, state: S, cost: usize) {
    let entry = states.entry(state).or_insert(cost);
    if cost < *entry {
        *entry = cost;
    }
}

/// Drops every state beaten by one with the same flags, a lower balance and
/// no higher cost.
fn prune<S: Ord + Copy, F: Fn(&S) -> (S, i64)>(states: States<S>, flags: F) -> States<S> {
    let mut kept = BTreeMap::new();
    let mut group: Option<(S, usize)> = None;
    for (state, cost) in states {
        let (key, _) = flags(&state);
        match group {
            Some((k, best)) if k == key && best <= cost => continue,
            _ => {}
        }
        group = Some((key, cost));
        kept.insert(state, cost);
    }
    kept
}

fn open_flags(state: &Open) -> (Open, i64) {
    (Open { balance: 0, ..*state }, state.balance)
}

fn partial_flags(state: &Partial) -> (Partial, i64) {
    (Partial { balance: 0, ..*state }, state.balance)
}

/// Reachability for the focus-shift system.
///
/// Reductions at the hat allow any tree over the remaining elements as long
/// as every fixed prefix element that takes dependents has a descendant that
/// is the hat or still in the buffer: a fixed element only takes the hat when
/// one of its dependents hands it over. The engine looks for the fewest gold
/// arcs to give up, keeping the rest, over the gold forest of the remaining
/// elements. A kept forest is completed to a tree when the components that
/// hold a free element or need one can be hung below the elements that need
/// one.
#[derive(Debug, Default)]
pub struct HatForest;

impl HatForest {
    pub fn new() -> Self {
        HatForest
    }

    fn finish(seq: &Sequence, v: usize, states: States<Partial>) -> States<Open> {
        let fixed = !seq.is_free(v);
        let mut open = BTreeMap::new();
        for (p, cost) in states {
            let waiting = fixed && p.any_child && p.all_bare;
            let state = Open {
                free: p.free,
                needy: p.needy || waiting,
                bare: fixed && !p.any_child,
                live_closed: p.live_closed,
                balance: p.balance + waiting as i64,
            };
            relax(&mut open, state, cost);
        }
        prune(open, open_flags)
    }

    fn merge(states: &States<Partial>, below: &States<Open>) -> States<Partial> {
        let mut merged = BTreeMap::new();
        for (p, &pc) in states {
            for (o, &oc) in below {
                let live = o.free || o.needy;
                let cut = Partial {
                    live_closed: p.live_closed || o.live_closed || live,
                    balance: p.balance + o.balance - live as i64,
                    ..*p
                };
                relax(&mut merged, cut, pc + oc + 1);
                let keep = Partial {
                    free: p.free || o.free,
                    needy: p.needy || o.needy,
                    any_child: true,
                    all_bare: p.all_bare && o.bare,
                    live_closed: p.live_closed || o.live_closed,
                    balance: p.balance + o.balance,
                };
                relax(&mut merged, keep, pc + oc);
            }
        }
        prune(merged, partial_flags)
    }
}

impl Reachability for HatForest {
    fn reach(&mut self, _grammar: Grammar, seq: &Sequence, gold: &DependencyGraph) -> Score {
        let n = seq.len();
        let mut position = vec![None; gold.len()];
        for i in 0..n {
            position[seq.token(i)] = Some(i);
        }
        let mut children = vec![vec![]; n];
        let mut tops = vec![];
        let mut arcs = 0;
        for i in 0..n {
            match gold.head(seq.token(i)).and_then(|h| position[h]) {
                Some(h) => {
                    children[h].push(i);
                    arcs += 1;
                }
                None => tops.push(i),
            }
        }

        // post-order over the gold forest
        let mut order = Vec::with_capacity(n);
        let mut pending: Vec<(usize, bool)> = tops.iter().map(|&t| (t, false)).collect();
        while let Some((v, expanded)) = pending.pop() {
            if expanded {
                order.push(v);
            } else {
                pending.push((v, true));
                pending.extend(children[v].iter().map(|&w| (w, false)));
            }
        }

        let mut done: Vec<Option<States<Open>>> = vec![None; n];
        for &v in &order {
            let mut states = BTreeMap::new();
            states.insert(
                Partial {
                    free: seq.is_free(v),
                    needy: false,
                    any_child: false,
                    all_bare: true,
                    live_closed: false,
                    balance: 0,
                },
                0,
            );
            for &w in &children[v] {
                if let Some(below) = done[w].take() {
                    states = HatForest::merge(&states, &below);
                }
            }
            done[v] = Some(HatForest::finish(seq, v, states));
        }

        let root = position[0];
        // closed components hanging from nowhere yet: (balance, live_closed)
        let mut closed: BTreeMap<(i64, bool), usize> = BTreeMap::new();
        closed.insert((0, false), 0);
        for &t in tops.iter().filter(|&&t| Some(t) != root) {
            let mut next = BTreeMap::new();
            if let Some(ref states) = done[t] {
                for (&(balance, live_closed), &gc) in &closed {
                    for (o, &oc) in states {
                        let live = o.free || o.needy;
                        let key = (
                            balance + o.balance - live as i64,
                            live_closed || o.live_closed || live,
                        );
                        relax(&mut next, key, gc + oc);
                    }
                }
            }
            closed = next;
        }

        let empty = Open {
            free: false,
            needy: false,
            bare: false,
            live_closed: false,
            balance: 0,
        };
        let rooted = match root.and_then(|r| done[r].take()) {
            Some(states) => states,
            None => {
                let mut states = BTreeMap::new();
                states.insert(empty, 0);
                states
            }
        };

        let mut best: Option<usize> = None;
        for (o, &oc) in &rooted {
            for (&(balance, live_closed), &gc) in &closed {
                // a component hung directly under a root component that needs
                // nothing fixes nothing
                let wasted = (live_closed || o.live_closed) && !o.needy;
                if balance + o.balance + wasted as i64 <= 0 {
                    let cost = oc + gc;
                    best = Some(best.map_or(cost, |b| b.min(cost)));
                }
            }
        }
        match best {
            Some(cost) => Score::from(arcs - cost),
            None => Score::ZERO,
        }
    }
}
