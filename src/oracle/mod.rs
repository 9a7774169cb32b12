//! Oracles for the transition systems.
//!
//! The static oracle follows the canonical gold derivation. The dynamic oracle
//! scores every applicable action by the number of gold arcs that remain
//! reachable after it, computed as a best projective derivation over the
//! stack followed by the buffer.

use std::cmp;
use std::error;
use std::fmt;

pub use self::chart::CubicChart;
pub use self::dynamic::{DynamicOracle, Step, TieBreak};
pub use self::exhaustive::ExhaustiveSearch;
pub use self::hat::HatForest;
pub use self::linear::LinearRecurrence;
pub use self::quadratic::QuadraticRecurrence;
pub use self::static_oracle::StaticOracle;

mod chart;
mod dynamic;
mod exhaustive;
mod hat;
mod linear;
mod quadratic;
mod static_oracle;

use crate::syntax::graph::DependencyGraph;
use crate::syntax::transition::{self, Configuration, TransitionSystem};

/// Element of the (max, +) semiring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(i64);

impl Score {
    /// Impossible derivation.
    pub const ZERO: Score = Score(i64::MIN);
    pub const ONE: Score = Score(0);

    pub fn new(value: i64) -> Self {
        Score(value)
    }

    #[inline]
    pub fn plus(self, other: Score) -> Score {
        cmp::max(self, other)
    }

    #[inline]
    pub fn times(self, other: Score) -> Score {
        if self == Score::ZERO || other == Score::ZERO {
            Score::ZERO
        } else {
            Score(self.0 + other.0)
        }
    }

    pub fn is_finite(&self) -> bool {
        *self != Score::ZERO
    }

    pub fn value(&self) -> Option<i64> {
        if self.is_finite() {
            Some(self.0)
        } else {
            None
        }
    }
}

impl From<usize> for Score {
    fn from(value: usize) -> Self {
        Score(value as i64)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.value() {
            Some(v) => write!(f, "{}", v),
            None => write!(f, "-inf"),
        }
    }
}

/// Bilexical grammar whose derivations are the futures of a configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Grammar {
    /// Unattached elements hang from a virtual root left of the sequence.
    ArcEager,
    /// Everything ends in one tree under the root; the right spine may use
    /// the late arcs created by `ReduceCorrect`.
    Revised,
    /// Any tree over the prefix and the buffer in which every fixed prefix
    /// element with dependents dominates the hat or a buffer element.
    Hat,
}

impl Grammar {
    pub fn for_system(system: &TransitionSystem) -> Option<Grammar> {
        match *system {
            TransitionSystem::ArcEager(_) | TransitionSystem::NormalArcEager(_) => {
                Some(Grammar::ArcEager)
            }
            TransitionSystem::RevisedArcEager(_) => Some(Grammar::Revised),
            TransitionSystem::Hat(_) => Some(Grammar::Hat),
            TransitionSystem::Swap(_) | TransitionSystem::WholeHat(_) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Cubic,
    Quadratic,
    Linear,
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::Cubic
    }
}

/// Stack followed by buffer, the linear order the grammars parse.
#[derive(Clone, Debug)]
pub struct Sequence {
    tokens: Vec<usize>,
    stack_len: usize,
    headless: Vec<bool>,
    hat: usize,
}

impl Sequence {
    pub fn new(config: &Configuration) -> Self {
        let mut tokens = config.prefix().to_vec();
        tokens.extend(config.suffix());
        let headless = tokens.iter().map(|&v| !config.is_headed(v)).collect();
        Sequence {
            tokens: tokens,
            stack_len: config.prefix_len(),
            headless: headless,
            hat: config.hat(),
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn stack_len(&self) -> usize {
        self.stack_len
    }

    pub fn buffer_len(&self) -> usize {
        self.tokens.len() - self.stack_len
    }

    #[inline]
    pub fn token(&self, i: usize) -> usize {
        self.tokens[i]
    }

    #[inline]
    pub fn is_stack(&self, i: usize) -> bool {
        i < self.stack_len
    }

    #[inline]
    pub fn is_headless(&self, i: usize) -> bool {
        self.headless[i]
    }

    /// Position of the hat on the stack.
    pub fn hat(&self) -> usize {
        self.hat
    }

    /// True for the hat and the buffer, the positions that can still move
    /// the hat onto their future heads.
    #[inline]
    pub fn is_free(&self, i: usize) -> bool {
        i == self.hat || !self.is_stack(i)
    }

    #[inline]
    fn gain(&self, gold: &DependencyGraph, h: usize, d: usize) -> i64 {
        if gold.is_dependent_of(self.tokens[d], self.tokens[h]) {
            1
        } else {
            0
        }
    }

    /// Weight of a future arc `h -> d` between sequence positions, `None` when
    /// no continuation can create it.
    ///
    /// A headed stack element keeps its head, which is always its left stack
    /// neighbour; a headless stack element can only be attached by the buffer.
    pub fn arc_weight(&self, gold: &DependencyGraph, h: usize, d: usize) -> Option<i64> {
        if h == d {
            return None;
        }
        if self.is_stack(d) {
            if !self.headless[d] {
                if h + 1 == d {
                    Some(0)
                } else {
                    None
                }
            } else if self.tokens[d] != 0 && !self.is_stack(h) {
                Some(self.gain(gold, h, d))
            } else {
                None
            }
        } else {
            Some(self.gain(gold, h, d))
        }
    }

    /// Weight of a `ReduceCorrect` arc `h -> d` on the final stack.
    pub fn late_weight(&self, gold: &DependencyGraph, h: usize, d: usize) -> Option<i64> {
        if h == d || !self.headless[d] || self.tokens[d] == 0 {
            return None;
        }
        if !self.is_stack(d) || h + 1 == d {
            Some(self.gain(gold, h, d))
        } else {
            None
        }
    }

    /// True when `d` may be left unattached under the virtual root.
    pub fn is_root_attachable(&self, d: usize) -> bool {
        d == 0 || !self.is_stack(d) || self.headless[d]
    }
}

/// A reachability engine: the maximum number of gold arcs any continuation of
/// the sequence can still create.
pub trait Reachability {
    fn reach(&mut self, grammar: Grammar, seq: &Sequence, gold: &DependencyGraph) -> Score;
}

#[derive(Debug)]
pub enum Error {
    /// No action can be taken in a non-final configuration.
    Exhausted(String),
    Unsupported(&'static str),
    AlgorithmDisagreement {
        algorithm: Algorithm,
        expected: Score,
        actual: Score,
        config: String,
    },
    Transition(transition::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Exhausted(ref config) => write!(f, "no action available in {}", config),
            Error::Unsupported(system) => {
                write!(f, "no dynamic oracle for the {} system", system)
            }
            Error::AlgorithmDisagreement {
                algorithm,
                expected,
                actual,
                ref config,
            } => write!(
                f,
                "{:?} reachability {} differs from chart {} in {}",
                algorithm, actual, expected, config
            ),
            Error::Transition(ref e) => write!(f, "{}", e),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Transition(ref e) => Some(e),
            _ => None,
        }
    }
}

impl From<transition::Error> for Error {
    fn from(e: transition::Error) -> Self {
        Error::Transition(e)
    }
}
