use std::borrow::Cow;
use std::fmt;
use std::ops::{Deref, Index};

use crate::lang::{Phrasal, Tokenized};

pub static ROOT_FORM: &str = "<ROOT>";
pub static ROOT_UPOS: &str = "ROOT";

#[derive(Clone, Debug, PartialEq)]
pub struct Token<'a> {
    id: usize,
    form: Cow<'a, str>,
    lemma: Option<Cow<'a, str>>,
    upos: Option<Cow<'a, str>>,
    head: Option<usize>,
    deprel: Option<Cow<'a, str>>,
}

impl<'a> Token<'a> {
    pub fn new<S: Into<Cow<'a, str>>>(
        id: usize,
        form: S,
        lemma: Option<S>,
        upos: Option<S>,
        head: Option<usize>,
        deprel: Option<S>,
    ) -> Self {
        Token {
            id: id,
            form: form.into(),
            lemma: lemma.map(|s| s.into()),
            upos: upos.map(|s| s.into()),
            head: head,
            deprel: deprel.map(|s| s.into()),
        }
    }

    pub fn root() -> Self {
        Token::new(0, ROOT_FORM, Some(ROOT_FORM), Some(ROOT_UPOS), None, None)
    }

    /// Same token with the gold attachment replaced.
    pub fn with_head<S: Into<Cow<'a, str>>>(
        mut self,
        head: Option<usize>,
        deprel: Option<S>,
    ) -> Self {
        self.head = head;
        self.deprel = deprel.map(|s| s.into());
        self
    }
}

impl<'a> Tokenized for Token<'a> {
    fn id(&self) -> usize {
        self.id
    }

    fn form(&self) -> &str {
        &self.form
    }

    fn lemma(&self) -> Option<&str> {
        self.lemma.as_ref().map(|x| x.deref())
    }

    fn upos(&self) -> Option<&str> {
        self.upos.as_ref().map(|x| x.deref())
    }

    fn head(&self) -> Option<usize> {
        self.head
    }

    fn deprel(&self) -> Option<&str> {
        self.deprel.as_ref().map(|x| x.deref())
    }
}

impl<'a> fmt::Display for Token<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.id, self.form)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Sentence<T: Tokenized> {
    raw: String,
    tokens: Vec<T>,
}

impl<'a> Sentence<Token<'a>> {
    /// Whitespace-tokenized sentence without annotation, rooted at position 0.
    pub fn new<S: Into<String>>(raw: S) -> Self {
        let raw = raw.into();
        let mut tokens = vec![Token::root()];
        tokens.extend(raw.split_whitespace().enumerate().map(|(i, word)| {
            Token::new(i + 1, word.to_string(), None, None, None, None)
        }));
        Sentence {
            raw: raw,
            tokens: tokens,
        }
    }

    /// Builds an annotated sentence from `(form, upos, head, deprel)` rows,
    /// prepending the root.
    pub fn from_rows<S: AsRef<str>>(rows: &[(S, S, usize, S)]) -> Self {
        let mut tokens = Vec::with_capacity(rows.len() + 1);
        tokens.push(Token::root());
        for (i, &(ref form, ref upos, head, ref deprel)) in rows.iter().enumerate() {
            tokens.push(Token::new(
                i + 1,
                form.as_ref().to_string(),
                None,
                Some(upos.as_ref().to_string()),
                Some(head),
                Some(deprel.as_ref().to_string()),
            ));
        }
        Sentence::from_tokens(tokens)
    }
}

impl<T: Tokenized> Sentence<T> {
    pub fn iter(&self) -> ::std::slice::Iter<T> {
        self.tokens.iter()
    }
}

impl<T: Tokenized> fmt::Display for Sentence<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "raw: {}", self.raw)
    }
}

impl<T: Tokenized> Phrasal for Sentence<T> {
    type Token = T;

    fn from_tokens(tokens: Vec<T>) -> Self {
        Sentence {
            raw: tokens
                .iter()
                .skip(1)
                .map(|t| t.form().to_string())
                .collect::<Vec<String>>()
                .join(" "),
            tokens: tokens,
        }
    }

    fn raw(&self) -> &str {
        &self.raw
    }

    fn token(&self, index: usize) -> Option<&Self::Token> {
        self.tokens.get(index)
    }

    fn tokens(&self) -> &[Self::Token] {
        &self.tokens
    }
}

impl<T: Tokenized> Index<usize> for Sentence<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.tokens[index]
    }
}
