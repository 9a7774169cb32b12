use std::collections::HashMap;

use crate::syntax::graph::DependencyGraph;
use crate::syntax::transition::{Action, Configuration, ConfigurationKey, TransitionSystem};

use super::{Error, Score};

/// Memoised search over every continuation of a configuration.
///
/// Exponential in the worst case; meant for short sentences where it serves
/// as the reference for the reachability engines.
#[derive(Debug)]
pub struct ExhaustiveSearch<'a> {
    system: &'a TransitionSystem,
    gold: &'a DependencyGraph,
    memo: HashMap<ConfigurationKey, Score>,
}

impl<'a> ExhaustiveSearch<'a> {
    pub fn new(system: &'a TransitionSystem, gold: &'a DependencyGraph) -> Self {
        ExhaustiveSearch {
            system: system,
            gold: gold,
            memo: HashMap::new(),
        }
    }

    /// Gold arcs still obtainable from `config`, `Score::ZERO` when no final
    /// configuration can be reached.
    pub fn reach(&mut self, config: &Configuration) -> Result<Score, Error> {
        if self.system.is_final(config) {
            return Ok(Score::ONE);
        }
        let key = config.key();
        if let Some(&score) = self.memo.get(&key) {
            return Ok(score);
        }
        let base = config.num_correct(self.gold);
        let mut best = Score::ZERO;
        for action in self.system.candidate_actions(config, self.gold) {
            let mut next = config.clone();
            self.system.apply(&mut next, &action)?;
            let gain = Score::from(next.num_correct(self.gold) - base);
            best = best.plus(gain.times(self.reach(&next)?));
        }
        self.memo.insert(key, best);
        Ok(best)
    }

    /// Total correct arcs after each applicable action and its best continuation.
    pub fn scores(&mut self, config: &Configuration) -> Result<Vec<(Action, Score)>, Error> {
        let mut scores = vec![];
        for action in self.system.candidate_actions(config, self.gold) {
            let mut next = config.clone();
            self.system.apply(&mut next, &action)?;
            let score = Score::from(next.num_correct(self.gold)).times(self.reach(&next)?);
            scores.push((action, score));
        }
        Ok(scores)
    }
}
