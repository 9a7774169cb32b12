//! Read-only index over a gold dependency tree.
//!
//! Vertex 0 is the artificial root and has no head. Every other vertex has
//! exactly one head and the head relation is acyclic.

use std::error;
use std::fmt;

use crate::lang::{Phrasal, Sentence, Tokenized};

#[derive(Clone, Debug)]
pub struct DependencyGraph {
    heads: Vec<Option<usize>>,
    deprels: Vec<Option<String>>,
    upos: Vec<Option<String>>,
    children: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// Builds the gold graph from the head fields of a sentence.
    pub fn from_sentence<T: Tokenized>(sentence: &Sentence<T>) -> Result<Self, Error> {
        let heads: Vec<Option<usize>> = sentence.iter().map(|t| t.head()).collect();
        let deprels: Vec<Option<String>> = sentence
            .iter()
            .map(|t| t.deprel().map(|s| s.to_string()))
            .collect();
        let mut graph = DependencyGraph::from_heads(&heads, &deprels)?;
        graph.upos = sentence
            .tokens()
            .iter()
            .map(|t| t.upos().map(|s| s.to_string()))
            .collect();
        Ok(graph)
    }

    pub fn from_heads(heads: &[Option<usize>], deprels: &[Option<String>]) -> Result<Self, Error> {
        let n = heads.len();
        if n == 0 {
            return Err(Error::Empty);
        }
        if deprels.len() != n {
            return Err(Error::LengthMismatch(n, deprels.len()));
        }
        let mut children = vec![vec![]; n];
        for (d, head) in heads.iter().enumerate() {
            match (d, *head) {
                (0, None) => {}
                (0, Some(_)) => return Err(Error::RootHasHead),
                (_, None) => return Err(Error::MissingHead(d)),
                (_, Some(h)) if h >= n => return Err(Error::HeadOutOfRange(d, h)),
                (_, Some(h)) if h == d => return Err(Error::Cycle(d)),
                (_, Some(h)) => children[h].push(d),
            }
        }
        // Every vertex must reach the root within n steps.
        for d in 1..n {
            let mut v = d;
            let mut steps = 0;
            while let Some(h) = heads[v] {
                v = h;
                steps += 1;
                if steps > n {
                    return Err(Error::Cycle(d));
                }
            }
        }
        Ok(DependencyGraph {
            heads: heads.to_vec(),
            deprels: deprels.to_vec(),
            upos: vec![None; n],
            children: children,
        })
    }

    /// Number of vertices, root included.
    pub fn len(&self) -> usize {
        self.heads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heads.len() <= 1
    }

    pub fn head(&self, dependent: usize) -> Option<usize> {
        self.heads.get(dependent).and_then(|h| *h)
    }

    pub fn deprel(&self, dependent: usize) -> Option<&str> {
        self.deprels
            .get(dependent)
            .and_then(|d| d.as_ref().map(|s| s.as_str()))
    }

    pub fn upos(&self, vertex: usize) -> Option<&str> {
        self.upos
            .get(vertex)
            .and_then(|u| u.as_ref().map(|s| s.as_str()))
    }

    pub fn heads(&self) -> &[Option<usize>] {
        &self.heads
    }

    pub fn deprels(&self) -> &[Option<String>] {
        &self.deprels
    }

    /// Gold dependents of `head` in sentence order.
    pub fn children(&self, head: usize) -> &[usize] {
        &self.children[head]
    }

    #[inline]
    pub fn is_dependent_of(&self, child: usize, head: usize) -> bool {
        self.head(child) == Some(head)
    }

    /// True when there is a gold arc between `a` and `b` in either direction.
    #[inline]
    pub fn is_linked(&self, a: usize, b: usize) -> bool {
        self.is_dependent_of(a, b) || self.is_dependent_of(b, a)
    }

    /// True when `ancestor` dominates `vertex` (reflexively).
    pub fn dominates(&self, ancestor: usize, vertex: usize) -> bool {
        let mut v = vertex;
        loop {
            if v == ancestor {
                return true;
            }
            match self.head(v) {
                Some(h) => v = h,
                None => return false,
            }
        }
    }

    pub fn is_projective(&self) -> bool {
        self.projective_order()
            .iter()
            .enumerate()
            .all(|(v, &rank)| v == rank)
    }

    /// Rank of every vertex in the in-order traversal of the tree.
    ///
    /// A tree is projective exactly when this order is the identity.
    pub fn projective_order(&self) -> Vec<usize> {
        let mut order = vec![0; self.len()];
        let mut next = 0;
        self.visit_inorder(0, &mut order, &mut next);
        order
    }

    fn visit_inorder(&self, v: usize, order: &mut [usize], next: &mut usize) {
        for &c in self.children[v].iter().filter(|&&c| c < v) {
            self.visit_inorder(c, order, next);
        }
        order[v] = *next;
        *next += 1;
        for &c in self.children[v].iter().filter(|&&c| c > v) {
            self.visit_inorder(c, order, next);
        }
    }

    /// Maximal projective components.
    ///
    /// Runs the arc-standard oracle without swaps and labels every vertex
    /// with the top of the partial tree it ends up in.
    pub fn mpc(&self) -> Vec<usize> {
        let n = self.len();
        let mut attached = vec![0; n];
        let mut parent: Vec<Option<usize>> = vec![None; n];
        let mut stack = vec![0];
        let mut front = 1;
        loop {
            if stack.len() >= 2 {
                let s0 = stack[stack.len() - 1];
                let s1 = stack[stack.len() - 2];
                if s1 != 0
                    && self.is_dependent_of(s1, s0)
                    && attached[s1] == self.children[s1].len()
                {
                    parent[s1] = Some(s0);
                    attached[s0] += 1;
                    stack.remove(stack.len() - 2);
                    continue;
                }
                if self.is_dependent_of(s0, s1) && attached[s0] == self.children[s0].len() {
                    parent[s0] = Some(s1);
                    attached[s1] += 1;
                    stack.pop();
                    continue;
                }
            }
            if front < n {
                stack.push(front);
                front += 1;
            } else {
                break;
            }
        }
        (0..n)
            .map(|mut v| {
                while let Some(p) = parent[v] {
                    v = p;
                }
                v
            })
            .collect()
    }
}

#[derive(Debug, PartialEq)]
pub enum Error {
    Empty,
    LengthMismatch(usize, usize),
    RootHasHead,
    MissingHead(usize),
    HeadOutOfRange(usize, usize),
    Cycle(usize),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Empty => write!(f, "empty graph"),
            Error::LengthMismatch(heads, deprels) => write!(
                f,
                "{} heads but {} labels",
                heads, deprels
            ),
            Error::RootHasHead => write!(f, "root must not have a head"),
            Error::MissingHead(d) => write!(f, "vertex {} has no head", d),
            Error::HeadOutOfRange(d, h) => write!(f, "head {} of vertex {} is out of range", h, d),
            Error::Cycle(d) => write!(f, "vertex {} is part of a cycle", d),
        }
    }
}

impl error::Error for Error {}
