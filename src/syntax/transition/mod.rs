use std::error;
use std::fmt;
use std::str::FromStr;

pub use self::arc_eager::*;
pub use self::hat::*;
pub use self::state::*;
pub use self::swap::*;
pub use self::whole_hat::*;

mod arc_eager;
mod hat;
mod state;
mod swap;
mod whole_hat;

use crate::lang::{Sentence, Tokenized};
use crate::syntax::graph::DependencyGraph;

/// Relation used for non-gold arcs proposed by oracles.
pub static DEFAULT_DEPREL: &str = "dep";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Shift,
    Reduce,
    LeftArc(String),
    RightArc(String),
    Link,
    ReduceCorrect(String),
    ReduceToHat(isize, String),
    ReduceFromHat(isize, String),
    Swap,
    /// Offsets count from the top of the prefix (0 = top).
    ReduceWhole {
        parent: usize,
        children: Vec<usize>,
        deprels: Vec<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Shift,
    Reduce,
    LeftArc,
    RightArc,
    Link,
    ReduceCorrect,
    ReduceToHat,
    ReduceFromHat,
    Swap,
    ReduceWhole,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match *self {
            ActionKind::Shift => "Shift",
            ActionKind::Reduce => "Reduce",
            ActionKind::LeftArc => "LeftArc",
            ActionKind::RightArc => "RightArc",
            ActionKind::Link => "Link",
            ActionKind::ReduceCorrect => "ReduceCorrect",
            ActionKind::ReduceToHat => "ReduceToHat",
            ActionKind::ReduceFromHat => "ReduceFromHat",
            ActionKind::Swap => "Swap",
            ActionKind::ReduceWhole => "ReduceWhole",
        }
    }
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match *self {
            Action::Shift => ActionKind::Shift,
            Action::Reduce => ActionKind::Reduce,
            Action::LeftArc(_) => ActionKind::LeftArc,
            Action::RightArc(_) => ActionKind::RightArc,
            Action::Link => ActionKind::Link,
            Action::ReduceCorrect(_) => ActionKind::ReduceCorrect,
            Action::ReduceToHat(..) => ActionKind::ReduceToHat,
            Action::ReduceFromHat(..) => ActionKind::ReduceFromHat,
            Action::Swap => ActionKind::Swap,
            Action::ReduceWhole { .. } => ActionKind::ReduceWhole,
        }
    }

    pub fn deprel(&self) -> Option<&str> {
        match *self {
            Action::LeftArc(ref l)
            | Action::RightArc(ref l)
            | Action::ReduceCorrect(ref l)
            | Action::ReduceToHat(_, ref l)
            | Action::ReduceFromHat(_, ref l) => Some(l.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = self.kind().as_str();
        match *self {
            Action::LeftArc(ref l) | Action::RightArc(ref l) | Action::ReduceCorrect(ref l) => {
                write!(f, "{}({})", kind, l)
            }
            Action::ReduceToHat(i, ref l) | Action::ReduceFromHat(i, ref l) => {
                write!(f, "{}({},{})", kind, i, l)
            }
            Action::ReduceWhole {
                parent,
                ref children,
                ref deprels,
            } => {
                let children: Vec<String> = children.iter().map(|c| c.to_string()).collect();
                write!(
                    f,
                    "{}({};{};{})",
                    kind,
                    parent,
                    children.join(","),
                    deprels.join(",")
                )
            }
            _ => write!(f, "{}", kind),
        }
    }
}

/// Splits `Name(a,b)` into the name and its raw argument string.
pub(crate) fn split_name(name: &str) -> (&str, Option<&str>) {
    match name.find('(') {
        Some(open) if name.ends_with(')') => (&name[..open], Some(&name[open + 1..name.len() - 1])),
        _ => (name, None),
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Error> {
        let invalid = || Error::UnknownAction(name.to_string());
        let (kind, args) = split_name(name);
        let action = match (kind, args) {
            ("Shift", None) => Action::Shift,
            ("Reduce", None) => Action::Reduce,
            ("Link", None) => Action::Link,
            ("Swap", None) => Action::Swap,
            ("LeftArc", Some(l)) => Action::LeftArc(l.to_string()),
            ("RightArc", Some(l)) => Action::RightArc(l.to_string()),
            ("ReduceCorrect", Some(l)) => Action::ReduceCorrect(l.to_string()),
            ("ReduceToHat", Some(args)) | ("ReduceFromHat", Some(args)) => {
                let mut parts = args.splitn(2, ',');
                let index = parts
                    .next()
                    .and_then(|i| i.parse::<isize>().ok())
                    .ok_or_else(invalid)?;
                let label = parts.next().ok_or_else(invalid)?.to_string();
                if kind == "ReduceToHat" {
                    Action::ReduceToHat(index, label)
                } else {
                    Action::ReduceFromHat(index, label)
                }
            }
            ("ReduceWhole", Some(args)) => {
                let parts: Vec<&str> = args.split(';').collect();
                if parts.len() != 3 {
                    return Err(invalid());
                }
                let parent = parts[0].parse::<usize>().map_err(|_| invalid())?;
                let mut children = vec![];
                for c in parts[1].split(',').filter(|c| !c.is_empty()) {
                    children.push(c.parse::<usize>().map_err(|_| invalid())?);
                }
                let deprels: Vec<String> = parts[2]
                    .split(',')
                    .filter(|l| !l.is_empty())
                    .map(|l| l.to_string())
                    .collect();
                if children.len() != deprels.len() {
                    return Err(invalid());
                }
                Action::ReduceWhole {
                    parent: parent,
                    children: children,
                    deprels: deprels,
                }
            }
            _ => return Err(invalid()),
        };
        Ok(action)
    }
}

/// Label of the arc `head -> dependent`: the gold label when the arc is in the
/// gold tree, otherwise `DEFAULT_DEPREL`.
pub fn gold_deprel(gold: &DependencyGraph, dependent: usize, head: usize) -> String {
    if gold.is_dependent_of(dependent, head) {
        gold.deprel(dependent).unwrap_or(DEFAULT_DEPREL).to_string()
    } else {
        DEFAULT_DEPREL.to_string()
    }
}

/// Common contract of the transition systems.
pub trait System {
    fn name(&self) -> &'static str;

    fn action_kinds(&self) -> &'static [ActionKind];

    fn is_applicable(&self, config: &Configuration, action: &Action) -> bool;

    /// Applies an action that `is_applicable` accepted.
    fn apply_unchecked(&self, config: &mut Configuration, action: &Action) -> Result<(), Error>;

    fn apply(&self, config: &mut Configuration, action: &Action) -> Result<(), Error> {
        if !self.is_applicable(config, action) {
            return Err(Error::IllegalAction(action.to_string()));
        }
        self.apply_unchecked(config, action)?;
        config.record(action.clone());
        Ok(())
    }

    fn is_final(&self, config: &Configuration) -> bool;

    /// The action of the canonical gold derivation, `None` when no action
    /// leads towards the gold tree.
    fn static_action(&self, config: &Configuration, gold: &DependencyGraph) -> Option<Action>;

    /// Every applicable action, labelled after the gold tree.
    fn candidate_actions(&self, config: &Configuration, gold: &DependencyGraph) -> Vec<Action>;

    /// Name handed to and read back from classifiers.
    fn action_name(&self, _config: &Configuration, action: &Action) -> String {
        action.to_string()
    }

    fn parse_action(&self, _config: &Configuration, name: &str) -> Option<Action> {
        name.parse::<Action>().ok()
    }
}

#[derive(Clone, Debug)]
pub enum TransitionSystem {
    ArcEager(ArcEager),
    NormalArcEager(NormalArcEager),
    RevisedArcEager(RevisedArcEager),
    Hat(Hat),
    Swap(Swap),
    WholeHat(WholeHat),
}

impl TransitionSystem {
    pub fn as_system(&self) -> &dyn System {
        match *self {
            TransitionSystem::ArcEager(ref s) => s,
            TransitionSystem::NormalArcEager(ref s) => s,
            TransitionSystem::RevisedArcEager(ref s) => s,
            TransitionSystem::Hat(ref s) => s,
            TransitionSystem::Swap(ref s) => s,
            TransitionSystem::WholeHat(ref s) => s,
        }
    }

    /// Whether the static oracle pops a headed top as soon as it is complete.
    pub fn early_reduce(&self) -> bool {
        match *self {
            TransitionSystem::ArcEager(ref s) => s.early_reduce,
            TransitionSystem::NormalArcEager(ref s) => s.base.early_reduce,
            TransitionSystem::RevisedArcEager(ref s) => s.base.early_reduce,
            _ => false,
        }
    }

    pub fn initial<T: Tokenized>(&self, sentence: &Sentence<T>) -> Configuration {
        Configuration::new(sentence)
    }

    pub fn name(&self) -> &'static str {
        self.as_system().name()
    }

    pub fn action_kinds(&self) -> &'static [ActionKind] {
        self.as_system().action_kinds()
    }

    pub fn is_applicable(&self, config: &Configuration, action: &Action) -> bool {
        self.as_system().is_applicable(config, action)
    }

    pub fn apply(&self, config: &mut Configuration, action: &Action) -> Result<(), Error> {
        self.as_system().apply(config, action)
    }

    pub fn is_final(&self, config: &Configuration) -> bool {
        self.as_system().is_final(config)
    }

    pub fn static_action(&self, config: &Configuration, gold: &DependencyGraph) -> Option<Action> {
        self.as_system().static_action(config, gold)
    }

    /// Every applicable action; none once the configuration is final.
    pub fn candidate_actions(&self, config: &Configuration, gold: &DependencyGraph) -> Vec<Action> {
        let system = self.as_system();
        if system.is_final(config) {
            return vec![];
        }
        system.candidate_actions(config, gold)
    }

    pub fn action_name(&self, config: &Configuration, action: &Action) -> String {
        self.as_system().action_name(config, action)
    }

    pub fn parse_action(&self, config: &Configuration, name: &str) -> Option<Action> {
        self.as_system().parse_action(config, name)
    }
}

impl fmt::Display for TransitionSystem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    InvalidOperation,
    InvalidArgument,
    IllegalAction(String),
    UnknownAction(String),
}

impl Error {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Error::InvalidOperation => "invalid operation",
            Error::InvalidArgument => "invalid argument",
            Error::IllegalAction(_) => "illegal action",
            Error::UnknownAction(_) => "unknown action",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::IllegalAction(ref a) | Error::UnknownAction(ref a) => {
                write!(f, "{}: {}", self.as_str(), a)
            }
            _ => write!(f, "{}", self.as_str()),
        }
    }
}

impl error::Error for Error {}
