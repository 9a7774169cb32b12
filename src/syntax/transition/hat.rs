use std::fmt;

use crate::syntax::graph::DependencyGraph;

use super::{gold_deprel, split_name, Action, ActionKind, Configuration, Error, System};

static HAT_ACTIONS: [ActionKind; 3] = [
    ActionKind::Shift,
    ActionKind::ReduceToHat,
    ActionKind::ReduceFromHat,
];

/// Offset from the hat as seen by a classifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HatIndex {
    Exact(isize),
    /// Nearest element with this POS left of the view window.
    Left(String),
    /// Nearest element with this POS right of the view window.
    Right(String),
}

impl fmt::Display for HatIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            HatIndex::Exact(i) => write!(f, "{}", i),
            HatIndex::Left(ref pos) => write!(f, "<{}", pos),
            HatIndex::Right(ref pos) => write!(f, ">{}", pos),
        }
    }
}

impl HatIndex {
    pub fn parse(s: &str) -> Option<HatIndex> {
        if s.starts_with('<') {
            Some(HatIndex::Left(s[1..].to_string()))
        } else if s.starts_with('>') {
            Some(HatIndex::Right(s[1..].to_string()))
        } else {
            s.parse::<isize>().ok().map(HatIndex::Exact)
        }
    }
}

static UNKNOWN_UPOS: &str = "_";

/// Lossy coding of hat offsets: offsets inside `[view_min, view_max]` stay
/// exact, others collapse to a direction and the POS of the target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HatCodec {
    pub view_min: isize,
    pub view_max: isize,
}

impl Default for HatCodec {
    fn default() -> Self {
        HatCodec {
            view_min: -2,
            view_max: 2,
        }
    }
}

impl HatCodec {
    pub fn new(view_min: isize, view_max: isize) -> Self {
        HatCodec {
            view_min: view_min,
            view_max: view_max,
        }
    }

    fn upos_at(config: &Configuration, position: usize) -> String {
        config
            .upos(config.prefix_left(position))
            .unwrap_or(UNKNOWN_UPOS)
            .to_string()
    }

    pub fn compress(&self, config: &Configuration, offset: isize) -> HatIndex {
        if offset >= self.view_min && offset <= self.view_max {
            return HatIndex::Exact(offset);
        }
        let position = config.hat() as isize + offset;
        if position < 0 || position >= config.prefix_len() as isize {
            return HatIndex::Exact(offset);
        }
        let upos = HatCodec::upos_at(config, position as usize);
        if offset < 0 {
            HatIndex::Left(upos)
        } else {
            HatIndex::Right(upos)
        }
    }

    /// Resolves a coded offset against the configuration; `None` when no
    /// prefix element matches.
    pub fn decompress(&self, config: &Configuration, index: &HatIndex) -> Option<isize> {
        let hat = config.hat() as isize;
        let len = config.prefix_len() as isize;
        match *index {
            HatIndex::Exact(offset) => {
                let position = hat + offset;
                if offset != 0 && position >= 0 && position < len {
                    Some(offset)
                } else {
                    None
                }
            }
            HatIndex::Left(ref upos) => {
                let start = hat + self.view_min.min(0) - 1;
                (0..=start)
                    .rev()
                    .find(|&p| HatCodec::upos_at(config, p as usize) == *upos)
                    .map(|p| p - hat)
            }
            HatIndex::Right(ref upos) => {
                let start = hat + self.view_max.max(0) + 1;
                (start..len)
                    .find(|&p| HatCodec::upos_at(config, p as usize) == *upos)
                    .map(|p| p - hat)
            }
        }
    }
}

/// Focus-shift system: reductions happen around a movable hat instead of the
/// stack top.
#[derive(Clone, Debug, Default)]
pub struct Hat {
    pub left_dependents_first: bool,
    pub codec: HatCodec,
}

impl Hat {
    pub fn new(left_dependents_first: bool, codec: HatCodec) -> Self {
        Hat {
            left_dependents_first: left_dependents_first,
            codec: codec,
        }
    }

    fn target(config: &Configuration, offset: isize) -> Option<usize> {
        let position = config.hat() as isize + offset;
        if offset == 0 || position < 0 || position >= config.prefix_len() as isize {
            None
        } else {
            Some(position as usize)
        }
    }

    fn is_allowed_reduce_to_hat(config: &Configuration, offset: isize) -> bool {
        // the root only ever heads
        Hat::target(config, offset).map_or(false, |p| p != 0)
    }

    fn is_allowed_reduce_from_hat(config: &Configuration, offset: isize) -> bool {
        config.hat() != 0 && Hat::target(config, offset).is_some()
    }

    /// Shift: the front moves onto the prefix and takes the hat.
    fn apply_shift(config: &mut Configuration) {
        let b0 = config.remove_suffix_left();
        config.add_prefix_right(b0);
        let top = config.prefix_len() - 1;
        config.set_hat(top);
    }

    fn apply_reduce_to_hat(
        config: &mut Configuration,
        offset: isize,
        label: &str,
    ) -> Result<(), Error> {
        let hat = config.hat();
        let p = Hat::target(config, offset).ok_or(Error::InvalidArgument)?;
        let (dep, head) = (config.prefix_left(p), config.prefix_left(hat));
        config.attach(dep, head, label)?;
        config.remove_prefix_at(p);
        config.set_hat(if p < hat { hat - 1 } else { hat });
        Ok(())
    }

    fn apply_reduce_from_hat(
        config: &mut Configuration,
        offset: isize,
        label: &str,
    ) -> Result<(), Error> {
        let hat = config.hat();
        let p = Hat::target(config, offset).ok_or(Error::InvalidArgument)?;
        let (dep, head) = (config.prefix_left(hat), config.prefix_left(p));
        config.attach(dep, head, label)?;
        config.remove_prefix_at(hat);
        config.set_hat(if p < hat { p } else { p - 1 });
        Ok(())
    }
}

impl System for Hat {
    fn name(&self) -> &'static str {
        "hat"
    }

    fn action_kinds(&self) -> &'static [ActionKind] {
        &HAT_ACTIONS
    }

    fn is_applicable(&self, config: &Configuration, action: &Action) -> bool {
        match *action {
            Action::Shift => config.suffix_len() > 0,
            Action::ReduceToHat(i, _) => Hat::is_allowed_reduce_to_hat(config, i),
            Action::ReduceFromHat(i, _) => Hat::is_allowed_reduce_from_hat(config, i),
            _ => false,
        }
    }

    fn apply_unchecked(&self, config: &mut Configuration, action: &Action) -> Result<(), Error> {
        match *action {
            Action::Shift => Hat::apply_shift(config),
            Action::ReduceToHat(i, ref l) => Hat::apply_reduce_to_hat(config, i, l)?,
            Action::ReduceFromHat(i, ref l) => Hat::apply_reduce_from_hat(config, i, l)?,
            _ => return Err(Error::IllegalAction(action.to_string())),
        }
        Ok(())
    }

    fn is_final(&self, config: &Configuration) -> bool {
        config.suffix_len() == 0 && config.prefix_len() == 1
    }

    fn static_action(&self, config: &Configuration, gold: &DependencyGraph) -> Option<Action> {
        let hat = config.hat();
        let h = config.prefix_left(hat);
        let dependents = (1..config.prefix_len()).filter(|&p| {
            let d = config.prefix_left(p);
            p != hat && gold.is_dependent_of(d, h) && config.is_complete_in(d, gold)
        });
        let chosen = if self.left_dependents_first {
            dependents.min()
        } else {
            dependents.min_by_key(|&p| (p as isize - hat as isize).abs())
        };
        if let Some(p) = chosen {
            let d = config.prefix_left(p);
            let offset = p as isize - hat as isize;
            return Some(Action::ReduceToHat(offset, gold_deprel(gold, d, h)));
        }
        if hat != 0 && config.is_complete_in(h, gold) {
            if let Some(head) = gold.head(h) {
                if let Some(p) = config.prefix().iter().position(|&v| v == head) {
                    let offset = p as isize - hat as isize;
                    return Some(Action::ReduceFromHat(offset, gold_deprel(gold, h, head)));
                }
            }
        }
        if config.suffix_len() > 0 {
            Some(Action::Shift)
        } else {
            None
        }
    }

    fn candidate_actions(&self, config: &Configuration, gold: &DependencyGraph) -> Vec<Action> {
        let mut actions = vec![];
        if config.suffix_len() > 0 {
            actions.push(Action::Shift);
        }
        let hat = config.hat() as isize;
        let h = config.prefix_left(config.hat());
        for p in 0..config.prefix_len() {
            let offset = p as isize - hat;
            let v = config.prefix_left(p);
            if Hat::is_allowed_reduce_to_hat(config, offset) {
                actions.push(Action::ReduceToHat(offset, gold_deprel(gold, v, h)));
            }
            if Hat::is_allowed_reduce_from_hat(config, offset) {
                actions.push(Action::ReduceFromHat(offset, gold_deprel(gold, h, v)));
            }
        }
        actions
    }

    fn action_name(&self, config: &Configuration, action: &Action) -> String {
        match *action {
            Action::ReduceToHat(i, ref l) | Action::ReduceFromHat(i, ref l) => format!(
                "{}({},{})",
                action.kind().as_str(),
                self.codec.compress(config, i),
                l
            ),
            _ => action.to_string(),
        }
    }

    fn parse_action(&self, config: &Configuration, name: &str) -> Option<Action> {
        match split_name(name) {
            (kind @ "ReduceToHat", Some(args)) | (kind @ "ReduceFromHat", Some(args)) => {
                let mut parts = args.splitn(2, ',');
                let index = HatIndex::parse(parts.next()?)?;
                let label = parts.next()?.to_string();
                let offset = self.codec.decompress(config, &index)?;
                if kind == "ReduceToHat" {
                    Some(Action::ReduceToHat(offset, label))
                } else {
                    Some(Action::ReduceFromHat(offset, label))
                }
            }
            _ => name.parse::<Action>().ok(),
        }
    }
}
