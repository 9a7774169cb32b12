use crate::syntax::transition::{Configuration, Mark};

use super::FeatureExtractor;

static NONE: &str = "<NONE>";

/// Forms and POS tags of a window over the top of the stack, the front of the
/// buffer and the hat, with a few conjunctions.
#[derive(Clone, Debug)]
pub struct WindowFeatures {
    pub stack: usize,
    pub buffer: usize,
}

impl Default for WindowFeatures {
    fn default() -> Self {
        WindowFeatures {
            stack: 2,
            buffer: 2,
        }
    }
}

impl WindowFeatures {
    pub fn new(stack: usize, buffer: usize) -> Self {
        WindowFeatures {
            stack: stack,
            buffer: buffer,
        }
    }
}

fn upos(config: &Configuration, id: Option<usize>) -> &str {
    id.and_then(|id| config.upos(id)).unwrap_or(NONE)
}

fn form(config: &Configuration, id: Option<usize>) -> &str {
    id.map(|id| config.form(id)).unwrap_or(NONE)
}

impl FeatureExtractor for WindowFeatures {
    fn extract(&self, config: &Configuration) -> Vec<String> {
        let mut features = Vec::with_capacity(2 * (self.stack + self.buffer) + 6);
        let stack_at = |i: usize| {
            if i < config.prefix_len() {
                Some(config.prefix_right(i))
            } else {
                None
            }
        };
        let buffer_at = |i: usize| {
            if i < config.suffix_len() {
                Some(config.suffix_left(i))
            } else {
                None
            }
        };
        for i in 0..self.stack {
            let s = stack_at(i);
            features.push(format!("s{}.w={}", i, form(config, s)));
            features.push(format!("s{}.p={}", i, upos(config, s)));
        }
        for i in 0..self.buffer {
            let b = buffer_at(i);
            features.push(format!("b{}.w={}", i, form(config, b)));
            features.push(format!("b{}.p={}", i, upos(config, b)));
        }
        let (s0, b0) = (stack_at(0), buffer_at(0));
        features.push(format!("s0.p+b0.p={}+{}", upos(config, s0), upos(config, b0)));
        features.push(format!(
            "s0.h={}",
            s0.map_or(false, |s| config.is_headed(s))
        ));
        let mark = match config.top_mark() {
            Some(Mark::Undirected) => "undirected",
            Some(Mark::Complete) => "complete",
            None => NONE,
        };
        features.push(format!("s0.m={}", mark));
        if config.hat() > 0 {
            let h = Some(config.prefix_left(config.hat()));
            features.push(format!("h.p={}", upos(config, h)));
            features.push(format!("h.d={}", config.prefix_len() - 1 - config.hat()));
        }
        features
    }
}
