use crate::lang::{Sentence, Tokenized};
use crate::syntax::graph::DependencyGraph;
use crate::syntax::transition::{Action, Configuration, TransitionSystem};

use super::Error;

/// Canonical gold derivation by direct inspection of the gold tree.
#[derive(Clone, Debug)]
pub struct StaticOracle {
    system: TransitionSystem,
}

impl StaticOracle {
    pub fn new(system: TransitionSystem) -> Self {
        StaticOracle { system: system }
    }

    pub fn system(&self) -> &TransitionSystem {
        &self.system
    }

    pub fn action(&self, config: &Configuration, gold: &DependencyGraph) -> Result<Action, Error> {
        self.system
            .static_action(config, gold)
            .ok_or_else(|| Error::Exhausted(config.to_string()))
    }

    /// Runs the oracle from the initial configuration to a final one.
    pub fn derive<T: Tokenized>(
        &self,
        sentence: &Sentence<T>,
        gold: &DependencyGraph,
    ) -> Result<Configuration, Error> {
        self.derive_with(sentence, gold, |_, _| ()).map(|(config, _)| config)
    }

    /// Like `derive`, collecting `extract` of every configuration and the
    /// action taken in it.
    pub fn derive_with<T: Tokenized, FO, F: FnMut(&Configuration, &Action) -> FO>(
        &self,
        sentence: &Sentence<T>,
        gold: &DependencyGraph,
        mut extract: F,
    ) -> Result<(Configuration, Vec<FO>), Error> {
        let mut config = self.system.initial(sentence);
        let mut features = Vec::with_capacity(2 * config.len());
        while !self.system.is_final(&config) {
            let action = self.action(&config, gold)?;
            features.push(extract(&config, &action));
            self.system.apply(&mut config, &action)?;
        }
        Ok((config, features))
    }
}
