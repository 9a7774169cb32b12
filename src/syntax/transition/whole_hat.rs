use crate::syntax::graph::DependencyGraph;

use super::{gold_deprel, Action, ActionKind, Configuration, Error, Mark, System};

static WHOLE_HAT_ACTIONS: [ActionKind; 2] = [ActionKind::Shift, ActionKind::ReduceWhole];

/// Generalisation of the hat system that attaches a whole set of complete
/// dependents to one parent in a single step, then marks the parent complete.
#[derive(Clone, Debug, Default)]
pub struct WholeHat;

impl WholeHat {
    fn position(config: &Configuration, offset: usize) -> Option<usize> {
        if offset < config.prefix_len() {
            Some(config.prefix_len() - 1 - offset)
        } else {
            None
        }
    }

    fn is_allowed_reduce(
        config: &Configuration,
        parent: usize,
        children: &[usize],
        deprels: &[String],
    ) -> bool {
        if children.len() != deprels.len() {
            return false;
        }
        let parent = match WholeHat::position(config, parent) {
            Some(p) => p,
            None => return false,
        };
        if config.mark(parent) == Some(Mark::Complete) {
            return false;
        }
        let mut seen = Vec::with_capacity(children.len());
        for &child in children {
            let c = match WholeHat::position(config, child) {
                Some(c) => c,
                None => return false,
            };
            if c == parent
                || c == 0
                || seen.contains(&c)
                || config.mark(c) != Some(Mark::Complete)
            {
                return false;
            }
            seen.push(c);
        }
        true
    }

    fn apply_reduce(
        config: &mut Configuration,
        parent: usize,
        children: &[usize],
        deprels: &[String],
    ) -> Result<(), Error> {
        let p = WholeHat::position(config, parent).ok_or(Error::InvalidArgument)?;
        let head = config.prefix_left(p);
        let mut positions = Vec::with_capacity(children.len());
        for (&child, deprel) in children.iter().zip(deprels) {
            let c = WholeHat::position(config, child).ok_or(Error::InvalidArgument)?;
            config.attach(config.prefix_left(c), head, deprel)?;
            positions.push(c);
        }
        config.set_mark(p, Some(Mark::Complete));
        positions.sort();
        for &c in positions.iter().rev() {
            config.remove_prefix_at(c);
        }
        Ok(())
    }
}

impl System for WholeHat {
    fn name(&self) -> &'static str {
        "whole-hat"
    }

    fn action_kinds(&self) -> &'static [ActionKind] {
        &WHOLE_HAT_ACTIONS
    }

    fn is_applicable(&self, config: &Configuration, action: &Action) -> bool {
        match *action {
            Action::Shift => config.suffix_len() > 0,
            Action::ReduceWhole {
                parent,
                ref children,
                ref deprels,
            } => WholeHat::is_allowed_reduce(config, parent, children, deprels),
            _ => false,
        }
    }

    fn apply_unchecked(&self, config: &mut Configuration, action: &Action) -> Result<(), Error> {
        match *action {
            Action::Shift => {
                let b0 = config.remove_suffix_left();
                config.add_prefix_right(b0);
                Ok(())
            }
            Action::ReduceWhole {
                parent,
                ref children,
                ref deprels,
            } => WholeHat::apply_reduce(config, parent, children, deprels),
            _ => Err(Error::IllegalAction(action.to_string())),
        }
    }

    fn is_final(&self, config: &Configuration) -> bool {
        config.suffix_len() == 0
            && (0..config.prefix_len()).all(|i| config.mark(i) == Some(Mark::Complete))
    }

    fn static_action(&self, config: &Configuration, gold: &DependencyGraph) -> Option<Action> {
        for offset in 0..config.prefix_len() {
            let p = config.prefix_len() - 1 - offset;
            if config.mark(p) == Some(Mark::Complete) {
                continue;
            }
            let v = config.prefix_left(p);
            let mut children = vec![];
            let mut ready = true;
            for &c in gold.children(v) {
                if config.head(c) == Some(v) {
                    continue;
                }
                match config.prefix().iter().position(|&u| u == c) {
                    Some(q) if config.mark(q) == Some(Mark::Complete) => {
                        children.push(config.prefix_len() - 1 - q)
                    }
                    _ => {
                        ready = false;
                        break;
                    }
                }
            }
            if ready {
                let deprels = children
                    .iter()
                    .map(|&c| gold_deprel(gold, config.prefix_right(c), v))
                    .collect();
                return Some(Action::ReduceWhole {
                    parent: offset,
                    children: children,
                    deprels: deprels,
                });
            }
        }
        if config.suffix_len() > 0 {
            Some(Action::Shift)
        } else {
            None
        }
    }

    /// Shift, plus for every incomplete element the reduction of all complete
    /// stack elements that are its gold dependents, and the empty reduction.
    fn candidate_actions(&self, config: &Configuration, gold: &DependencyGraph) -> Vec<Action> {
        let mut actions = vec![];
        if config.suffix_len() > 0 {
            actions.push(Action::Shift);
        }
        for offset in 0..config.prefix_len() {
            let p = config.prefix_len() - 1 - offset;
            if config.mark(p) == Some(Mark::Complete) {
                continue;
            }
            let v = config.prefix_left(p);
            let children: Vec<usize> = (1..config.prefix_len())
                .filter(|&q| {
                    q != p
                        && config.mark(q) == Some(Mark::Complete)
                        && gold.is_dependent_of(config.prefix_left(q), v)
                })
                .map(|q| config.prefix_len() - 1 - q)
                .collect();
            if !children.is_empty() {
                let deprels = children
                    .iter()
                    .map(|&c| gold_deprel(gold, config.prefix_right(c), v))
                    .collect();
                actions.push(Action::ReduceWhole {
                    parent: offset,
                    children: children,
                    deprels: deprels,
                });
            }
            actions.push(Action::ReduceWhole {
                parent: offset,
                children: vec![],
                deprels: vec![],
            });
        }
        actions
    }
}
