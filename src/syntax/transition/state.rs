use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use crate::lang::{Phrasal, Sentence, Tokenized};
use crate::syntax::graph::DependencyGraph;

use super::{Action, Error};

/// Auxiliary label of a prefix slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mark {
    /// A pending arc whose direction is not yet decided.
    Undirected,
    /// Every dependent has been attached.
    Complete,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Vertex {
    id: usize,
    parent: Option<usize>,
    deprel: Option<String>,
    children: Vec<usize>,
}

impl Vertex {
    fn new(id: usize) -> Self {
        Vertex {
            id: id,
            parent: None,
            deprel: None,
            children: vec![],
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn deprel(&self) -> Option<&str> {
        self.deprel.as_ref().map(|s| s.as_str())
    }

    /// Attached dependents in sentence order.
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    pub fn left_children(&self) -> &[usize] {
        let split = self.children.iter().take_while(|&&c| c < self.id).count();
        &self.children[..split]
    }

    pub fn right_children(&self) -> &[usize] {
        let split = self.children.iter().take_while(|&&c| c < self.id).count();
        &self.children[split..]
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct Word {
    form: String,
    upos: Option<String>,
}

/// Parser state: a prefix (stack) of vertices carrying optional marks, and a
/// suffix (buffer) of vertices not yet processed.
///
/// Positions in the prefix count from the left starting at 0; `prefix_right(0)`
/// is the top. Every vertex is either in the prefix, in the suffix, or attached
/// to a head and removed from both.
#[derive(Clone, Debug)]
pub struct Configuration {
    words: Arc<Vec<Word>>,
    vertices: Vec<Vertex>,
    prefix: Vec<usize>,
    marks: Vec<Option<Mark>>,
    suffix: VecDeque<usize>,
    hat: usize,
    actions: Vec<Action>,
}

impl Configuration {
    pub fn new<T: Tokenized>(sentence: &Sentence<T>) -> Self {
        let words = sentence
            .tokens()
            .iter()
            .map(|t| Word {
                form: t.form().to_string(),
                upos: t.upos().map(|s| s.to_string()),
            })
            .collect::<Vec<_>>();
        Configuration::with_words(words)
    }

    /// Unannotated configuration over `len` vertices, the root included.
    pub fn with_len(len: usize) -> Self {
        let words = (0..len)
            .map(|i| Word {
                form: i.to_string(),
                upos: None,
            })
            .collect();
        Configuration::with_words(words)
    }

    fn with_words(words: Vec<Word>) -> Self {
        let n = words.len();
        Configuration {
            words: Arc::new(words),
            vertices: (0..n).map(Vertex::new).collect(),
            prefix: vec![0],
            marks: vec![None],
            suffix: (1..n).collect(),
            hat: 0,
            actions: Vec::with_capacity(2 * n),
        }
    }

    /// Number of vertices, the root included.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.len() <= 1
    }

    pub fn form(&self, id: usize) -> &str {
        &self.words[id].form
    }

    pub fn upos(&self, id: usize) -> Option<&str> {
        self.words[id].upos.as_ref().map(|s| s.as_str())
    }

    pub fn vertex(&self, id: usize) -> &Vertex {
        &self.vertices[id]
    }

    pub fn head(&self, id: usize) -> Option<usize> {
        self.vertices[id].parent
    }

    pub fn is_headed(&self, id: usize) -> bool {
        self.vertices[id].parent.is_some()
    }

    pub fn prefix_len(&self) -> usize {
        self.prefix.len()
    }

    pub fn suffix_len(&self) -> usize {
        self.suffix.len()
    }

    pub fn prefix(&self) -> &[usize] {
        &self.prefix
    }

    pub fn suffix(&self) -> impl Iterator<Item = usize> + '_ {
        self.suffix.iter().cloned()
    }

    pub fn prefix_left(&self, i: usize) -> usize {
        assert!(
            i < self.prefix.len(),
            "prefix position {} out of range (length {})",
            i,
            self.prefix.len()
        );
        self.prefix[i]
    }

    pub fn prefix_right(&self, i: usize) -> usize {
        assert!(
            i < self.prefix.len(),
            "prefix position {} from the right out of range (length {})",
            i,
            self.prefix.len()
        );
        self.prefix[self.prefix.len() - 1 - i]
    }

    pub fn suffix_left(&self, i: usize) -> usize {
        assert!(
            i < self.suffix.len(),
            "suffix position {} out of range (length {})",
            i,
            self.suffix.len()
        );
        self.suffix[i]
    }

    pub fn top(&self) -> Option<usize> {
        self.prefix.last().cloned()
    }

    pub fn front(&self) -> Option<usize> {
        self.suffix.front().cloned()
    }

    pub fn add_prefix_right(&mut self, id: usize) {
        self.prefix.push(id);
        self.marks.push(None);
    }

    pub fn remove_prefix_right(&mut self) -> usize {
        assert!(!self.prefix.is_empty(), "remove from an empty prefix");
        self.marks.pop();
        match self.prefix.pop() {
            Some(id) => id,
            None => unreachable!(),
        }
    }

    /// Removes the prefix slot at position `i` from the left.
    pub fn remove_prefix_at(&mut self, i: usize) -> usize {
        assert!(
            i < self.prefix.len(),
            "prefix position {} out of range (length {})",
            i,
            self.prefix.len()
        );
        self.marks.remove(i);
        self.prefix.remove(i)
    }

    pub fn remove_suffix_left(&mut self) -> usize {
        match self.suffix.pop_front() {
            Some(id) => id,
            None => panic!("remove from an empty suffix"),
        }
    }

    pub fn add_suffix_left(&mut self, id: usize) {
        self.suffix.push_front(id);
    }

    pub fn mark(&self, i: usize) -> Option<Mark> {
        assert!(
            i < self.marks.len(),
            "prefix position {} out of range (length {})",
            i,
            self.marks.len()
        );
        self.marks[i]
    }

    pub fn set_mark(&mut self, i: usize, mark: Option<Mark>) {
        assert!(
            i < self.marks.len(),
            "prefix position {} out of range (length {})",
            i,
            self.marks.len()
        );
        self.marks[i] = mark;
    }

    pub fn top_mark(&self) -> Option<Mark> {
        self.marks.last().cloned().and_then(|m| m)
    }

    pub fn hat(&self) -> usize {
        self.hat
    }

    pub fn set_hat(&mut self, i: usize) {
        assert!(
            i < self.prefix.len(),
            "hat position {} out of range (length {})",
            i,
            self.prefix.len()
        );
        self.hat = i;
    }

    /// Creates the arc `head -> dependent`; the only way arcs come into being.
    pub fn attach(&mut self, dependent: usize, head: usize, deprel: &str) -> Result<(), Error> {
        let n = self.vertices.len();
        if dependent >= n || head >= n || dependent == head || dependent == 0 {
            return Err(Error::InvalidArgument);
        }
        if self.vertices[dependent].parent.is_some() {
            return Err(Error::InvalidOperation);
        }
        let mut v = head;
        while let Some(p) = self.vertices[v].parent {
            if p == dependent {
                return Err(Error::InvalidOperation);
            }
            v = p;
        }
        {
            let d = &mut self.vertices[dependent];
            d.parent = Some(head);
            d.deprel = Some(deprel.to_string());
        }
        let children = &mut self.vertices[head].children;
        let pos = children.binary_search(&dependent).unwrap_or_else(|e| e);
        children.insert(pos, dependent);
        Ok(())
    }

    pub(crate) fn record(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Actions applied so far.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn step(&self) -> usize {
        self.actions.len()
    }

    pub fn heads(&self) -> Vec<Option<usize>> {
        self.vertices.iter().map(|v| v.parent).collect()
    }

    pub fn deprels(&self) -> Vec<Option<String>> {
        self.vertices.iter().map(|v| v.deprel.clone()).collect()
    }

    /// Number of attached arcs that agree with the gold head.
    pub fn num_correct(&self, gold: &DependencyGraph) -> usize {
        self.vertices
            .iter()
            .filter(|v| v.parent.is_some() && v.parent == gold.head(v.id))
            .count()
    }

    /// True when every gold dependent of `id` has been attached to it.
    pub fn is_complete_in(&self, id: usize, gold: &DependencyGraph) -> bool {
        gold.children(id)
            .iter()
            .all(|&c| self.vertices[c].parent == Some(id))
    }

    /// State without history, usable as a memoisation key.
    pub fn key(&self) -> ConfigurationKey {
        ConfigurationKey {
            prefix: self.prefix.clone(),
            marks: self.marks.clone(),
            suffix: self.suffix.iter().cloned().collect(),
            hat: self.hat,
            heads: self.heads(),
        }
    }
}

impl PartialEq for Configuration {
    fn eq(&self, other: &Self) -> bool {
        self.prefix == other.prefix
            && self.marks == other.marks
            && self.suffix == other.suffix
            && self.hat == other.hat
            && self.vertices == other.vertices
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConfigurationKey {
    prefix: Vec<usize>,
    marks: Vec<Option<Mark>>,
    suffix: Vec<usize>,
    hat: usize,
    heads: Vec<Option<usize>>,
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;
        for (i, &id) in self.prefix.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            if i == self.hat && self.hat > 0 {
                write!(f, "^")?;
            }
            write!(f, "{}:{}", id, self.form(id))?;
            match self.marks[i] {
                Some(Mark::Undirected) => write!(f, "~")?,
                Some(Mark::Complete) => write!(f, "*")?,
                None => {}
            }
        }
        write!(f, " |")?;
        for &id in self.suffix.iter() {
            write!(f, " {}:{}", id, self.form(id))?;
        }
        write!(f, "]")
    }
}
