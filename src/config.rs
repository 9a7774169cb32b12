//! Parser and oracle settings, loaded from JSON.

use std::error;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use slog::Logger;

use crate::logging;
use crate::oracle::{self, Algorithm, DynamicOracle, StaticOracle, TieBreak};
use crate::syntax::transition::{
    ArcEager, Hat, HatCodec, NormalArcEager, RevisedArcEager, Swap, TransitionSystem, WholeHat,
};
use crate::utils::env::VarError;
use crate::utils::rand::{seeded_rng, ChaCha8Rng};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SystemKind {
    ArcEager,
    NormalArcEager,
    RevisedArcEager,
    Hat,
    Swap,
    WholeHat,
}

impl Default for SystemKind {
    fn default() -> Self {
        SystemKind::ArcEager
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub system: SystemKind,
    pub early_reduce: bool,
    /// Arcs in left-to-right attachment order.
    pub strict: bool,
    /// The static oracle gives up on sentences it can no longer derive.
    pub fail_closed: bool,
    pub left_dependents_first: bool,
    pub view_min: isize,
    pub view_max: isize,
    /// Probability of following a non-optimal action while training.
    pub stray_probability: f64,
    pub tie_break: TieBreak,
    pub algorithm: Algorithm,
    pub reuse: bool,
    pub validate: bool,
    /// Falls back to the `SEED` environment variable when absent.
    pub seed: Option<u64>,
    /// Use the dynamic oracle for training observations.
    pub dynamic: bool,
    pub logging: logging::Config,
}

impl Default for ParserConfig {
    fn default() -> Self {
        let codec = HatCodec::default();
        ParserConfig {
            system: SystemKind::default(),
            early_reduce: false,
            strict: false,
            fail_closed: false,
            left_dependents_first: false,
            view_min: codec.view_min,
            view_max: codec.view_max,
            stray_probability: 0.0,
            tie_break: TieBreak::default(),
            algorithm: Algorithm::default(),
            reuse: false,
            validate: false,
            seed: None,
            dynamic: false,
            logging: logging::Config::default(),
        }
    }
}

impl ParserConfig {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(Error::Parse)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = File::open(path).map_err(Error::Io)?;
        serde_json::from_reader(BufReader::new(file)).map_err(Error::Parse)
    }

    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(Error::Parse)
    }

    pub fn system(&self) -> TransitionSystem {
        let base = ArcEager::new(self.early_reduce, self.strict).fail_closed(self.fail_closed);
        match self.system {
            SystemKind::ArcEager => TransitionSystem::ArcEager(base),
            SystemKind::NormalArcEager => {
                TransitionSystem::NormalArcEager(NormalArcEager { base: base })
            }
            SystemKind::RevisedArcEager => {
                TransitionSystem::RevisedArcEager(RevisedArcEager { base: base })
            }
            SystemKind::Hat => TransitionSystem::Hat(Hat::new(
                self.left_dependents_first,
                HatCodec::new(self.view_min, self.view_max),
            )),
            SystemKind::Swap => TransitionSystem::Swap(Swap),
            SystemKind::WholeHat => TransitionSystem::WholeHat(WholeHat),
        }
    }

    pub fn static_oracle(&self) -> StaticOracle {
        StaticOracle::new(self.system())
    }

    pub fn dynamic_oracle(&self, logger: Logger) -> Result<DynamicOracle, oracle::Error> {
        Ok(DynamicOracle::new(self.system(), logger)?
            .algorithm(self.algorithm)
            .reuse(self.reuse)
            .validate(self.validate)
            .stray_probability(self.stray_probability)
            .tie_break(self.tie_break))
    }

    pub fn rng(&self) -> Result<ChaCha8Rng, Error> {
        seeded_rng(self.seed).map_err(Error::Env)
    }

    pub fn logger(&self) -> Result<Logger, Error> {
        logging::create_logger(&self.logging).map_err(Error::Logging)
    }
}

#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Parse(serde_json::Error),
    Env(VarError),
    Logging(logging::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref e) => write!(f, "could not read the configuration: {}", e),
            Error::Parse(ref e) => write!(f, "invalid configuration: {}", e),
            Error::Env(ref e) => write!(f, "invalid seed: {}", e),
            Error::Logging(ref e) => write!(f, "could not create the logger: {}", e),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Io(ref e) => Some(e),
            Error::Parse(ref e) => Some(e),
            Error::Env(ref e) => Some(e),
            Error::Logging(ref e) => Some(e),
        }
    }
}
