use crate::syntax::graph::DependencyGraph;

use super::{gold_deprel, Action, ActionKind, Configuration, Error, System};

static SWAP_ACTIONS: [ActionKind; 4] = [
    ActionKind::Shift,
    ActionKind::LeftArc,
    ActionKind::RightArc,
    ActionKind::Swap,
];

/// Arc-standard with an online reordering `Swap` action, which makes every
/// non-projective tree derivable.
///
/// References:
/// - http://aclweb.org/anthology/P09-1040
/// - http://aclweb.org/anthology/W09-3811
#[derive(Clone, Debug, Default)]
pub struct Swap;

impl Swap {
    /// Shift: (s, i|b, A) => (s|i, b, A)
    fn apply_shift(config: &mut Configuration) {
        let b0 = config.remove_suffix_left();
        config.add_prefix_right(b0);
    }

    /// Left Arc: (s|i|j, b, A) => (s|j, b, A +(j,l,i))
    fn apply_left_arc(config: &mut Configuration, label: &str) -> Result<(), Error> {
        let s0 = config.prefix_right(0);
        let s1 = config.prefix_right(1);
        config.attach(s1, s0, label)?;
        let pos = config.prefix_len() - 2;
        config.remove_prefix_at(pos);
        Ok(())
    }

    /// Right Arc: (s|i|j, b, A) => (s|i, b, A +(i,l,j))
    fn apply_right_arc(config: &mut Configuration, label: &str) -> Result<(), Error> {
        let s0 = config.prefix_right(0);
        let s1 = config.prefix_right(1);
        config.attach(s0, s1, label)?;
        config.remove_prefix_right();
        Ok(())
    }

    /// Swap: (s|i|j, b, A) => (s|j, i|b, A)
    fn apply_swap(config: &mut Configuration) {
        let s0 = config.remove_prefix_right();
        let s1 = config.remove_prefix_right();
        config.add_prefix_right(s0);
        config.add_suffix_left(s1);
    }

    fn is_allowed_shift(config: &Configuration) -> bool {
        config.suffix_len() > 0
    }

    fn is_allowed_left_arc(config: &Configuration) -> bool {
        config.prefix_len() > 2
    }

    fn is_allowed_right_arc(config: &Configuration) -> bool {
        config.prefix_len() > 1
    }

    fn is_allowed_swap(config: &Configuration) -> bool {
        config.prefix_len() > 2 && config.prefix_right(1) < config.prefix_right(0)
    }
}

impl System for Swap {
    fn name(&self) -> &'static str {
        "swap"
    }

    fn action_kinds(&self) -> &'static [ActionKind] {
        &SWAP_ACTIONS
    }

    fn is_applicable(&self, config: &Configuration, action: &Action) -> bool {
        match *action {
            Action::Shift => Swap::is_allowed_shift(config),
            Action::LeftArc(_) => Swap::is_allowed_left_arc(config),
            Action::RightArc(_) => Swap::is_allowed_right_arc(config),
            Action::Swap => Swap::is_allowed_swap(config),
            _ => false,
        }
    }

    fn apply_unchecked(&self, config: &mut Configuration, action: &Action) -> Result<(), Error> {
        match *action {
            Action::Shift => Swap::apply_shift(config),
            Action::LeftArc(ref l) => Swap::apply_left_arc(config, l)?,
            Action::RightArc(ref l) => Swap::apply_right_arc(config, l)?,
            Action::Swap => Swap::apply_swap(config),
            _ => return Err(Error::IllegalAction(action.to_string())),
        }
        Ok(())
    }

    fn is_final(&self, config: &Configuration) -> bool {
        config.suffix_len() == 0 && config.prefix_len() == 1
    }

    /// Lazy swap oracle: arcs as soon as the dependent is complete, swaps only
    /// when the top and the front belong to different maximal projective
    /// components.
    fn static_action(&self, config: &Configuration, gold: &DependencyGraph) -> Option<Action> {
        if config.prefix_len() > 1 {
            let s0 = config.prefix_right(0);
            let s1 = config.prefix_right(1);
            if s1 != 0 && gold.is_dependent_of(s1, s0) && config.is_complete_in(s1, gold) {
                return Some(Action::LeftArc(gold_deprel(gold, s1, s0)));
            }
            if gold.is_dependent_of(s0, s1) && config.is_complete_in(s0, gold) {
                return Some(Action::RightArc(gold_deprel(gold, s0, s1)));
            }
            if s1 != 0 {
                let order = gold.projective_order();
                if order[s0] < order[s1] {
                    let mpc = gold.mpc();
                    let lazy = config.front().map_or(true, |b0| mpc[s0] != mpc[b0]);
                    if lazy && Swap::is_allowed_swap(config) {
                        return Some(Action::Swap);
                    }
                }
            }
        }
        if Swap::is_allowed_shift(config) {
            Some(Action::Shift)
        } else {
            None
        }
    }

    fn candidate_actions(&self, config: &Configuration, gold: &DependencyGraph) -> Vec<Action> {
        let mut actions = vec![];
        if Swap::is_allowed_shift(config) {
            actions.push(Action::Shift);
        }
        if config.prefix_len() > 1 {
            let s0 = config.prefix_right(0);
            let s1 = config.prefix_right(1);
            if Swap::is_allowed_left_arc(config) {
                actions.push(Action::LeftArc(gold_deprel(gold, s1, s0)));
            }
            if Swap::is_allowed_right_arc(config) {
                actions.push(Action::RightArc(gold_deprel(gold, s0, s1)));
            }
        }
        if Swap::is_allowed_swap(config) {
            actions.push(Action::Swap);
        }
        actions
    }
}
