//! Training and parsing loops on top of the oracles.
//!
//! Feature extraction and classification are left to the `FeatureExtractor`
//! and `Classifier` implementations handed in by the caller. The driver only
//! moves configurations forward, labels them through an oracle and checks the
//! legality of predicted actions.

use std::error;
use std::fmt;

use rand::Rng;
use slog::Logger;

pub use self::features::WindowFeatures;
pub use self::frequency::{FrequencyClassifier, FrequencyClassifierFactory};

mod features;
mod frequency;

use crate::config::ParserConfig;
use crate::lang::{Sentence, Tokenized};
use crate::oracle::{self, DynamicOracle, StaticOracle};
use crate::syntax::graph::{self, DependencyGraph};
use crate::syntax::transition::{self, Action, Configuration, TransitionSystem};

pub trait FeatureExtractor {
    fn extract(&self, config: &Configuration) -> Vec<String>;
}

/// Features of a configuration paired with the name of the action to predict.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    pub features: Vec<String>,
    pub action: String,
}

pub trait Classifier {
    fn train(&mut self, observations: &[Observation]) -> Result<(), Error>;

    /// Action names, best first.
    fn predict(&self, features: &[String]) -> Vec<String>;

    fn probability(&self, features: &[String], action: &str) -> f64;
}

pub trait ClassifierFactory {
    type Output: Classifier;

    fn create(&self) -> Self::Output;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrainReport {
    pub sentences: usize,
    pub skipped: usize,
    pub observations: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParseOutcome {
    pub heads: Vec<Option<usize>>,
    pub deprels: Vec<Option<String>>,
    /// Whether a final configuration was reached with every token attached.
    pub complete: bool,
    pub actions: Vec<Action>,
}

#[derive(Debug)]
pub struct Driver {
    system: TransitionSystem,
    static_oracle: StaticOracle,
    dynamic: Option<DynamicOracle>,
    logger: Logger,
}

impl Driver {
    pub fn new(config: &ParserConfig, logger: Logger) -> Result<Self, Error> {
        let dynamic = if config.dynamic {
            Some(config.dynamic_oracle(logger.new(o!("oracle" => "dynamic")))?)
        } else {
            None
        };
        Ok(Driver {
            system: config.system(),
            static_oracle: config.static_oracle(),
            dynamic: dynamic,
            logger: logger,
        })
    }

    pub fn system(&self) -> &TransitionSystem {
        &self.system
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic.is_some()
    }

    /// Runs one sentence through the oracle and collects an observation per
    /// step.
    ///
    /// With the dynamic oracle the label is an optimal action while the
    /// configuration follows the possibly stray action, ranked by
    /// `preliminary` when given.
    pub fn observe<T, E, R>(
        &mut self,
        sentence: &Sentence<T>,
        extractor: &E,
        rng: &mut R,
        preliminary: Option<&dyn Classifier>,
    ) -> Result<Vec<Observation>, Error>
    where
        T: Tokenized,
        E: FeatureExtractor + ?Sized,
        R: Rng,
    {
        let gold = DependencyGraph::from_sentence(sentence)?;
        let system = &self.system;
        let dynamic = match self.dynamic {
            Some(ref mut dynamic) => dynamic,
            None => {
                let (_, observations) =
                    self.static_oracle
                        .derive_with(sentence, &gold, |config, action| Observation {
                            features: extractor.extract(config),
                            action: system.action_name(config, action),
                        })?;
                return Ok(observations);
            }
        };

        dynamic.reset();
        let mut config = system.initial(sentence);
        let mut observations = Vec::with_capacity(2 * config.len());
        while !system.is_final(&config) {
            let features = extractor.extract(&config);
            let ranking = preliminary.map(|classifier| classifier.predict(&features));
            let step = dynamic.step(&config, &gold, rng, ranking.as_ref().map(Vec::as_slice))?;
            if step.followed != step.optimal {
                debug!(self.logger, "stray";
                       "step" => config.step(), "optimal" => %step.optimal,
                       "followed" => %step.followed);
            }
            observations.push(Observation {
                action: system.action_name(&config, &step.optimal),
                features: features,
            });
            system.apply(&mut config, &step.followed)?;
        }
        Ok(observations)
    }

    /// Trains a fresh classifier on the observations of every sentence the
    /// oracle can handle.
    ///
    /// A `preliminary` classifier, typically one trained in an earlier round,
    /// ranks the actions the dynamic oracle chooses from.
    pub fn train<T, E, F, R>(
        &mut self,
        corpus: &[Sentence<T>],
        extractor: &E,
        factory: &F,
        rng: &mut R,
        preliminary: Option<&dyn Classifier>,
    ) -> Result<(F::Output, TrainReport), Error>
    where
        T: Tokenized,
        E: FeatureExtractor + ?Sized,
        F: ClassifierFactory,
        R: Rng,
    {
        let mut report = TrainReport::default();
        let mut observations = vec![];
        for (index, sentence) in corpus.iter().enumerate() {
            report.sentences += 1;
            match self.observe(sentence, extractor, rng, preliminary) {
                Ok(mut obs) => observations.append(&mut obs),
                Err(e) => {
                    warn!(self.logger, "skipped a sentence";
                          "sentence" => index, "error" => %e);
                    report.skipped += 1;
                }
            }
        }
        report.observations = observations.len();
        info!(self.logger, "collected observations";
              "system" => self.system.name(), "sentences" => report.sentences,
              "skipped" => report.skipped, "observations" => report.observations);

        let mut classifier = factory.create();
        classifier.train(&observations)?;
        Ok((classifier, report))
    }

    /// Parses greedily, applying the best-ranked prediction that names a
    /// legal action.
    pub fn parse<T, E, C>(
        &self,
        sentence: &Sentence<T>,
        extractor: &E,
        classifier: &C,
    ) -> Result<ParseOutcome, Error>
    where
        T: Tokenized,
        E: FeatureExtractor + ?Sized,
        C: Classifier + ?Sized,
    {
        let system = &self.system;
        let mut config = system.initial(sentence);
        let mut exhausted = false;
        while !system.is_final(&config) {
            let features = extractor.extract(&config);
            let action = classifier
                .predict(&features)
                .iter()
                .filter_map(|name| system.parse_action(&config, name))
                .find(|action| system.is_applicable(&config, action));
            match action {
                Some(action) => system.apply(&mut config, &action)?,
                None => {
                    warn!(self.logger, "no predicted action is applicable";
                          "step" => config.step(), "config" => %config);
                    exhausted = true;
                    break;
                }
            }
        }
        let heads = config.heads();
        let complete = !exhausted && heads.iter().skip(1).all(Option::is_some);
        Ok(ParseOutcome {
            deprels: config.deprels(),
            heads: heads,
            complete: complete,
            actions: config.actions().to_vec(),
        })
    }
}

/// Unlabeled and labeled attachment scores over the tokens after the root.
pub fn attachment_scores(
    gold: &DependencyGraph,
    heads: &[Option<usize>],
    deprels: &[Option<String>],
) -> (f64, f64) {
    let total = gold.len().saturating_sub(1);
    if total == 0 {
        return (0.0, 0.0);
    }
    let mut unlabeled = 0;
    let mut labeled = 0;
    for id in 1..gold.len() {
        let head = heads.get(id).cloned().unwrap_or(None);
        if head.is_none() || head != gold.head(id) {
            continue;
        }
        unlabeled += 1;
        let deprel = deprels.get(id).and_then(|d| d.as_ref().map(String::as_str));
        if deprel == gold.deprel(id) {
            labeled += 1;
        }
    }
    (
        unlabeled as f64 / total as f64,
        labeled as f64 / total as f64,
    )
}

#[derive(Debug)]
pub enum Error {
    Oracle(oracle::Error),
    Transition(transition::Error),
    Graph(graph::Error),
    Classifier(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Oracle(ref e) => write!(f, "oracle error: {}", e),
            Error::Transition(ref e) => write!(f, "transition error: {}", e),
            Error::Graph(ref e) => write!(f, "invalid gold tree: {}", e),
            Error::Classifier(ref message) => write!(f, "classifier error: {}", message),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Oracle(ref e) => Some(e),
            Error::Transition(ref e) => Some(e),
            Error::Graph(ref e) => Some(e),
            Error::Classifier(_) => None,
        }
    }
}

impl From<oracle::Error> for Error {
    fn from(err: oracle::Error) -> Self {
        Error::Oracle(err)
    }
}

impl From<transition::Error> for Error {
    fn from(err: transition::Error) -> Self {
        Error::Transition(err)
    }
}

impl From<graph::Error> for Error {
    fn from(err: graph::Error) -> Self {
        Error::Graph(err)
    }
}
