use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use slog::Logger;

use crate::syntax::graph::DependencyGraph;
use crate::syntax::transition::{Action, ActionKind, Configuration, Mark, TransitionSystem};

use super::{
    Algorithm, CubicChart, Error, Grammar, HatForest, LinearRecurrence, QuadraticRecurrence,
    Reachability, Score, Sequence,
};

/// How to choose among actions with the best score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    /// First in a fixed order that prefers arcs over reductions over shifts.
    Priority,
    Random,
    /// First in the ranking of a preliminary classifier.
    Classifier,
}

impl Default for TieBreak {
    fn default() -> Self {
        TieBreak::Priority
    }
}

static EAGER_PRIORITY: [ActionKind; 10] = [
    ActionKind::LeftArc,
    ActionKind::RightArc,
    ActionKind::ReduceCorrect,
    ActionKind::Link,
    ActionKind::ReduceToHat,
    ActionKind::ReduceFromHat,
    ActionKind::ReduceWhole,
    ActionKind::Reduce,
    ActionKind::Swap,
    ActionKind::Shift,
];

/// Without early reduction a headed top stays until nothing else is left.
static LAZY_PRIORITY: [ActionKind; 10] = [
    ActionKind::LeftArc,
    ActionKind::RightArc,
    ActionKind::ReduceCorrect,
    ActionKind::Link,
    ActionKind::ReduceToHat,
    ActionKind::ReduceFromHat,
    ActionKind::ReduceWhole,
    ActionKind::Swap,
    ActionKind::Shift,
    ActionKind::Reduce,
];

fn priority(order: &[ActionKind], action: &Action) -> usize {
    let kind = action.kind();
    order
        .iter()
        .position(|&k| k == kind)
        .unwrap_or(order.len())
}

/// Dynamic oracle for the arc-eager family and the hat system.
#[derive(Debug)]
pub struct DynamicOracle {
    system: TransitionSystem,
    grammar: Grammar,
    algorithm: Algorithm,
    chart: CubicChart,
    quadratic: QuadraticRecurrence,
    linear: LinearRecurrence,
    forest: HatForest,
    validate: bool,
    stray_probability: f64,
    tie_break: TieBreak,
    logger: Logger,
}

impl DynamicOracle {
    /// Fails with `Error::Unsupported` for the swap and whole-hat systems.
    pub fn new(system: TransitionSystem, logger: Logger) -> Result<Self, Error> {
        let grammar = match Grammar::for_system(&system) {
            Some(grammar) => grammar,
            None => return Err(Error::Unsupported(system.name())),
        };
        Ok(DynamicOracle {
            system: system,
            grammar: grammar,
            algorithm: Algorithm::default(),
            chart: CubicChart::new(false),
            quadratic: QuadraticRecurrence::new(),
            linear: LinearRecurrence::new(),
            forest: HatForest::new(),
            validate: false,
            stray_probability: 0.0,
            tie_break: TieBreak::default(),
            logger: logger,
        })
    }

    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Keeps buffer-only chart cells across the queries of one sentence.
    pub fn reuse(mut self, reuse: bool) -> Self {
        self.chart = CubicChart::new(reuse);
        self
    }

    /// Cross-checks the selected algorithm against the cubic chart.
    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn stray_probability(mut self, p: f64) -> Self {
        self.stray_probability = p.max(0.0).min(1.0);
        self
    }

    pub fn tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn system(&self) -> &TransitionSystem {
        &self.system
    }

    pub fn grammar(&self) -> Grammar {
        self.grammar
    }

    /// Forgets everything cached for the current sentence.
    pub fn reset(&mut self) {
        self.chart.reset();
        self.linear.reset();
    }

    /// The incremental state of the linear engine.
    pub fn linear(&self) -> &LinearRecurrence {
        &self.linear
    }

    fn engine_reach(&mut self, config: &Configuration, gold: &DependencyGraph) -> Score {
        let grammar = self.grammar;
        if grammar == Grammar::Hat {
            return self.forest.reach(grammar, &Sequence::new(config), gold);
        }
        match self.algorithm {
            Algorithm::Cubic => self.chart.reach(grammar, &Sequence::new(config), gold),
            Algorithm::Quadratic => self.quadratic.reach(grammar, &Sequence::new(config), gold),
            Algorithm::Linear => self.linear.reach_config(grammar, config, gold),
        }
    }

    /// Gold arcs that some continuation of `config` can still create.
    pub fn reach(
        &mut self,
        config: &Configuration,
        gold: &DependencyGraph,
    ) -> Result<Score, Error> {
        if self.system.is_final(config) {
            return Ok(Score::ONE);
        }
        if config.top_mark() == Some(Mark::Undirected) {
            // a pending link: only the two directed arcs continue
            let base = config.num_correct(gold);
            let mut best = Score::ZERO;
            for action in self.system.candidate_actions(config, gold) {
                let mut next = config.clone();
                self.system.apply(&mut next, &action)?;
                let gain = Score::from(next.num_correct(gold) - base);
                best = best.plus(gain.times(self.reach(&next, gold)?));
            }
            return Ok(best);
        }
        let score = self.engine_reach(config, gold);
        if self.validate && self.algorithm != Algorithm::Cubic && self.grammar != Grammar::Hat {
            let expected = self.chart.reach(self.grammar, &Sequence::new(config), gold);
            if expected != score {
                if gold.is_projective() {
                    error!(self.logger, "reachability algorithms disagree";
                           "algorithm" => ?self.algorithm, "chart" => %expected,
                           "actual" => %score, "config" => %config);
                    return Err(Error::AlgorithmDisagreement {
                        algorithm: self.algorithm,
                        expected: expected,
                        actual: score,
                        config: config.to_string(),
                    });
                }
                debug!(self.logger, "approximate reachability on a non-projective tree";
                       "algorithm" => ?self.algorithm, "chart" => %expected,
                       "actual" => %score, "config" => %config);
            }
        }
        Ok(score)
    }

    /// Total correct arcs after each applicable action and its best
    /// continuation, in candidate order.
    pub fn scores(
        &mut self,
        config: &Configuration,
        gold: &DependencyGraph,
    ) -> Result<Vec<(Action, Score)>, Error> {
        let mut scores = vec![];
        if self.system.is_final(config) {
            return Ok(scores);
        }
        for action in self.system.candidate_actions(config, gold) {
            let mut next = config.clone();
            self.system.apply(&mut next, &action)?;
            let score = Score::from(next.num_correct(gold)).times(self.reach(&next, gold)?);
            scores.push((action, score));
        }
        Ok(scores)
    }

    /// Scores keyed by classifier-facing action names.
    pub fn score_map(
        &mut self,
        config: &Configuration,
        gold: &DependencyGraph,
    ) -> Result<BTreeMap<String, Score>, Error> {
        let scores = self.scores(config, gold)?;
        Ok(scores
            .into_iter()
            .map(|(action, score)| (self.system.action_name(config, &action), score))
            .collect())
    }

    /// Every action attaining the maximum score.
    pub fn best_actions(
        &mut self,
        config: &Configuration,
        gold: &DependencyGraph,
    ) -> Result<Vec<Action>, Error> {
        let scores = self.scores(config, gold)?;
        Ok(DynamicOracle::split(scores).0)
    }

    fn split(scores: Vec<(Action, Score)>) -> (Vec<Action>, Vec<Action>) {
        let best = scores
            .iter()
            .map(|&(_, s)| s)
            .fold(Score::ZERO, Score::plus);
        let mut optimal = vec![];
        let mut others = vec![];
        for (action, score) in scores {
            if score == best {
                optimal.push(action);
            } else {
                others.push(action);
            }
        }
        (optimal, others)
    }

    /// The action to follow during training.
    ///
    /// With the stray probability a non-optimal applicable action is taken,
    /// preferring the first one in `ranking`. Otherwise an optimal action is
    /// chosen according to the tie-break policy.
    pub fn step_action<R: Rng>(
        &mut self,
        config: &Configuration,
        gold: &DependencyGraph,
        rng: &mut R,
        ranking: Option<&[String]>,
    ) -> Result<Action, Error> {
        self.step(config, gold, rng, ranking).map(|step| step.followed)
    }

    /// Both the optimal action, which is what a learner should predict, and
    /// the action actually followed.
    ///
    /// Among optimal actions the classifier ranking comes first with the
    /// `classifier` tie-break, then the static oracle's action, then a fixed
    /// order that matches the static oracle's reduce policy. A final
    /// configuration has no step and gives `Error::Exhausted`.
    pub fn step<R: Rng>(
        &mut self,
        config: &Configuration,
        gold: &DependencyGraph,
        rng: &mut R,
        ranking: Option<&[String]>,
    ) -> Result<Step, Error> {
        if self.system.is_final(config) {
            debug!(self.logger, "no step from a final configuration"; "config" => %config);
            return Err(Error::Exhausted(config.to_string()));
        }
        let scores = self.scores(config, gold)?;
        if scores.is_empty() {
            warn!(self.logger, "no applicable action"; "config" => %config);
            return Err(Error::Exhausted(config.to_string()));
        }
        let (optimal, others) = DynamicOracle::split(scores);
        let system = &self.system;
        let find_ranked = |candidates: &[Action]| -> Option<Action> {
            ranking.and_then(|names| {
                names.iter().find_map(|name| {
                    candidates
                        .iter()
                        .find(|a| system.action_name(config, a) == *name)
                        .cloned()
                })
            })
        };

        let order: &[ActionKind] = if system.early_reduce() {
            &EAGER_PRIORITY
        } else {
            &LAZY_PRIORITY
        };
        let preferred = || {
            system
                .static_action(config, gold)
                .filter(|a| optimal.contains(a))
                .or_else(|| optimal.iter().min_by_key(|a| priority(order, a)).cloned())
        };
        let best = match self.tie_break {
            TieBreak::Random => optimal.choose(rng).cloned(),
            TieBreak::Classifier => find_ranked(&optimal).or_else(preferred),
            TieBreak::Priority => preferred(),
        };
        let best = best.ok_or_else(|| Error::Exhausted(config.to_string()))?;

        let stray = !others.is_empty()
            && self.stray_probability > 0.0
            && rng.gen_bool(self.stray_probability);
        let followed = if stray {
            find_ranked(&others).or_else(|| others.choose(rng).cloned())
        } else {
            None
        };
        Ok(Step {
            followed: followed.unwrap_or_else(|| best.clone()),
            optimal: best,
        })
    }
}

/// Outcome of one dynamic-oracle step.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub optimal: Action,
    pub followed: Action,
}
