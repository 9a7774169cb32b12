use crate::syntax::graph::DependencyGraph;

use super::{gold_deprel, Action, ActionKind, Configuration, Error, Mark, System};

/// Shift: (s, i|b, A) => (s|i, b, A)
fn apply_shift(config: &mut Configuration) {
    let b0 = config.remove_suffix_left();
    config.add_prefix_right(b0);
}

/// Reduce: (s|i, b, A) => (s, b, A)
fn apply_reduce(config: &mut Configuration) {
    config.remove_prefix_right();
}

/// Left Arc: (s|i, j|b, A) => (s, j|b, A +(j,l,i))
fn apply_left_arc(config: &mut Configuration, label: &str) -> Result<(), Error> {
    let s0 = config.prefix_right(0);
    let b0 = config.suffix_left(0);
    config.attach(s0, b0, label)?;
    config.remove_prefix_right();
    Ok(())
}

/// Right Arc: (s|i, j|b, A) => (s|i|j, b, A +(i,l,j))
fn apply_right_arc(config: &mut Configuration, label: &str) -> Result<(), Error> {
    let s0 = config.prefix_right(0);
    let b0 = config.suffix_left(0);
    config.attach(b0, s0, label)?;
    config.remove_suffix_left();
    config.add_prefix_right(b0);
    Ok(())
}

fn is_allowed_shift(config: &Configuration) -> bool {
    config.suffix_len() > 0
}

fn is_allowed_reduce(config: &Configuration) -> bool {
    config.prefix_len() > 1 && config.is_headed(config.prefix_right(0))
}

fn is_allowed_left_arc(config: &Configuration) -> bool {
    match (config.top(), config.front()) {
        (Some(s0), Some(_)) => s0 != 0 && !config.is_headed(s0),
        _ => false,
    }
}

fn is_allowed_right_arc(config: &Configuration) -> bool {
    config.top().is_some() && config.suffix_len() > 0
}

static ARC_EAGER_ACTIONS: [ActionKind; 4] = [
    ActionKind::Shift,
    ActionKind::Reduce,
    ActionKind::LeftArc,
    ActionKind::RightArc,
];

static NORMAL_ARC_EAGER_ACTIONS: [ActionKind; 5] = [
    ActionKind::Shift,
    ActionKind::Reduce,
    ActionKind::Link,
    ActionKind::LeftArc,
    ActionKind::RightArc,
];

static REVISED_ARC_EAGER_ACTIONS: [ActionKind; 5] = [
    ActionKind::Shift,
    ActionKind::Reduce,
    ActionKind::LeftArc,
    ActionKind::RightArc,
    ActionKind::ReduceCorrect,
];

/// Arc-eager transition system.
///
/// The flags only shape the static oracle. `early_reduce` pops a headed top as
/// soon as its gold dependents are all attached. `strict` builds every arc in
/// left-to-right order: a word takes its head only after its dependents on the
/// left (and, for LeftArc, all of its dependents) are attached. `fail_closed`
/// gives up (returns `None`) once the top can no longer reach its gold head,
/// instead of shifting on.
#[derive(Clone, Debug, Default)]
pub struct ArcEager {
    pub early_reduce: bool,
    pub strict: bool,
    pub fail_closed: bool,
}

impl ArcEager {
    pub fn new(early_reduce: bool, strict: bool) -> Self {
        ArcEager {
            early_reduce: early_reduce,
            strict: strict,
            fail_closed: false,
        }
    }

    pub fn fail_closed(mut self, fail_closed: bool) -> Self {
        self.fail_closed = fail_closed;
        self
    }

    fn left_dependents_attached(config: &Configuration, gold: &DependencyGraph, v: usize) -> bool {
        gold.children(v)
            .iter()
            .take_while(|&&d| d < v)
            .all(|&d| config.head(d) == Some(v))
    }

    /// The gold action between the top and the front, ignoring marks.
    fn oracle(&self, config: &Configuration, gold: &DependencyGraph) -> Option<Action> {
        let s0 = config.top()?;
        let b0 = config.front()?;
        if s0 != 0
            && !config.is_headed(s0)
            && gold.is_dependent_of(s0, b0)
            && (!self.strict || config.is_complete_in(s0, gold))
        {
            return Some(Action::LeftArc(gold_deprel(gold, s0, b0)));
        }
        if gold.is_dependent_of(b0, s0)
            && (!self.strict || ArcEager::left_dependents_attached(config, gold, b0))
        {
            return Some(Action::RightArc(gold_deprel(gold, b0, s0)));
        }
        let linked_below = (1..config.prefix_len())
            .map(|i| config.prefix_right(i))
            .any(|k| gold.is_linked(k, b0));
        if config.is_headed(s0) {
            if self.early_reduce && config.is_complete_in(s0, gold) {
                return Some(Action::Reduce);
            }
            if linked_below {
                return Some(Action::Reduce);
            }
        } else if self.fail_closed && (linked_below || gold.head(s0).map_or(false, |h| h < s0)) {
            // s0 can neither be popped nor reach its head any more.
            return None;
        }
        Some(Action::Shift)
    }

    fn candidates(&self, config: &Configuration, gold: &DependencyGraph) -> Vec<Action> {
        let mut actions = vec![];
        if is_allowed_shift(config) {
            actions.push(Action::Shift);
        }
        if is_allowed_reduce(config) {
            actions.push(Action::Reduce);
        }
        if let (Some(s0), Some(b0)) = (config.top(), config.front()) {
            if is_allowed_left_arc(config) {
                actions.push(Action::LeftArc(gold_deprel(gold, s0, b0)));
            }
            if is_allowed_right_arc(config) {
                actions.push(Action::RightArc(gold_deprel(gold, b0, s0)));
            }
        }
        actions
    }
}

impl System for ArcEager {
    fn name(&self) -> &'static str {
        "arc-eager"
    }

    fn action_kinds(&self) -> &'static [ActionKind] {
        &ARC_EAGER_ACTIONS
    }

    fn is_applicable(&self, config: &Configuration, action: &Action) -> bool {
        match *action {
            Action::Shift => is_allowed_shift(config),
            Action::Reduce => is_allowed_reduce(config),
            Action::LeftArc(_) => is_allowed_left_arc(config),
            Action::RightArc(_) => is_allowed_right_arc(config),
            _ => false,
        }
    }

    fn apply_unchecked(&self, config: &mut Configuration, action: &Action) -> Result<(), Error> {
        match *action {
            Action::Shift => apply_shift(config),
            Action::Reduce => apply_reduce(config),
            Action::LeftArc(ref l) => apply_left_arc(config, l)?,
            Action::RightArc(ref l) => apply_right_arc(config, l)?,
            _ => return Err(Error::IllegalAction(action.to_string())),
        }
        Ok(())
    }

    fn is_final(&self, config: &Configuration) -> bool {
        config.suffix_len() == 0
    }

    fn static_action(&self, config: &Configuration, gold: &DependencyGraph) -> Option<Action> {
        self.oracle(config, gold)
    }

    fn candidate_actions(&self, config: &Configuration, gold: &DependencyGraph) -> Vec<Action> {
        self.candidates(config, gold)
    }
}

/// Arc-eager with the arc direction deferred behind a `Link` action that marks
/// the top as `Undirected`.
#[derive(Clone, Debug, Default)]
pub struct NormalArcEager {
    pub base: ArcEager,
}

impl NormalArcEager {
    pub fn new(early_reduce: bool, strict: bool) -> Self {
        NormalArcEager {
            base: ArcEager::new(early_reduce, strict),
        }
    }

    fn is_linked(config: &Configuration) -> bool {
        config.top_mark() == Some(Mark::Undirected)
    }
}

impl System for NormalArcEager {
    fn name(&self) -> &'static str {
        "normal-arc-eager"
    }

    fn action_kinds(&self) -> &'static [ActionKind] {
        &NORMAL_ARC_EAGER_ACTIONS
    }

    fn is_applicable(&self, config: &Configuration, action: &Action) -> bool {
        let linked = NormalArcEager::is_linked(config);
        match *action {
            Action::Shift => !linked && is_allowed_shift(config),
            Action::Reduce => !linked && is_allowed_reduce(config),
            Action::Link => {
                !linked && (is_allowed_left_arc(config) || is_allowed_right_arc(config))
            }
            Action::LeftArc(_) => linked && is_allowed_left_arc(config),
            Action::RightArc(_) => linked && is_allowed_right_arc(config),
            _ => false,
        }
    }

    fn apply_unchecked(&self, config: &mut Configuration, action: &Action) -> Result<(), Error> {
        match *action {
            Action::Link => {
                let top = config.prefix_len() - 1;
                config.set_mark(top, Some(Mark::Undirected));
            }
            Action::LeftArc(ref l) => {
                let top = config.prefix_len() - 1;
                config.set_mark(top, None);
                apply_left_arc(config, l)?;
            }
            Action::RightArc(ref l) => {
                let top = config.prefix_len() - 1;
                config.set_mark(top, None);
                apply_right_arc(config, l)?;
            }
            _ => self.base.apply_unchecked(config, action)?,
        }
        Ok(())
    }

    fn is_final(&self, config: &Configuration) -> bool {
        config.suffix_len() == 0 && !NormalArcEager::is_linked(config)
    }

    fn static_action(&self, config: &Configuration, gold: &DependencyGraph) -> Option<Action> {
        let action = self.base.oracle(config, gold)?;
        let linked = NormalArcEager::is_linked(config);
        match action {
            Action::LeftArc(_) | Action::RightArc(_) if !linked => Some(Action::Link),
            _ if linked => match action {
                Action::LeftArc(_) | Action::RightArc(_) => Some(action),
                _ => None,
            },
            _ => Some(action),
        }
    }

    fn candidate_actions(&self, config: &Configuration, gold: &DependencyGraph) -> Vec<Action> {
        let mut actions: Vec<Action> = self
            .base
            .candidates(config, gold)
            .into_iter()
            .filter(|a| self.is_applicable(config, a))
            .collect();
        if self.is_applicable(config, &Action::Link) {
            actions.push(Action::Link);
        }
        actions
    }
}

/// Arc-eager that always ends in a tree: once the buffer is exhausted,
/// `ReduceCorrect` attaches a headless top to the element below it.
#[derive(Clone, Debug, Default)]
pub struct RevisedArcEager {
    pub base: ArcEager,
}

impl RevisedArcEager {
    pub fn new(early_reduce: bool, strict: bool) -> Self {
        RevisedArcEager {
            base: ArcEager::new(early_reduce, strict),
        }
    }

    fn is_allowed_reduce_correct(config: &Configuration) -> bool {
        config.suffix_len() == 0
            && config.prefix_len() > 1
            && !config.is_headed(config.prefix_right(0))
    }
}

impl System for RevisedArcEager {
    fn name(&self) -> &'static str {
        "revised-arc-eager"
    }

    fn action_kinds(&self) -> &'static [ActionKind] {
        &REVISED_ARC_EAGER_ACTIONS
    }

    fn is_applicable(&self, config: &Configuration, action: &Action) -> bool {
        match *action {
            Action::ReduceCorrect(_) => RevisedArcEager::is_allowed_reduce_correct(config),
            _ => self.base.is_applicable(config, action),
        }
    }

    fn apply_unchecked(&self, config: &mut Configuration, action: &Action) -> Result<(), Error> {
        match *action {
            Action::ReduceCorrect(ref l) => {
                let s0 = config.prefix_right(0);
                let s1 = config.prefix_right(1);
                config.attach(s0, s1, l)?;
                config.remove_prefix_right();
                Ok(())
            }
            _ => self.base.apply_unchecked(config, action),
        }
    }

    fn is_final(&self, config: &Configuration) -> bool {
        config.suffix_len() == 0 && config.prefix_len() == 1
    }

    fn static_action(&self, config: &Configuration, gold: &DependencyGraph) -> Option<Action> {
        if config.suffix_len() > 0 {
            return self.base.oracle(config, gold);
        }
        let s0 = config.top()?;
        if s0 == 0 {
            return None;
        }
        if config.is_headed(s0) {
            Some(Action::Reduce)
        } else {
            let s1 = config.prefix_right(1);
            if self.base.fail_closed && !gold.is_dependent_of(s0, s1) {
                return None;
            }
            Some(Action::ReduceCorrect(gold_deprel(gold, s0, s1)))
        }
    }

    fn candidate_actions(&self, config: &Configuration, gold: &DependencyGraph) -> Vec<Action> {
        let mut actions = self.base.candidates(config, gold);
        if RevisedArcEager::is_allowed_reduce_correct(config) {
            let s0 = config.prefix_right(0);
            let s1 = config.prefix_right(1);
            actions.push(Action::ReduceCorrect(gold_deprel(gold, s0, s1)));
        }
        actions
    }
}
