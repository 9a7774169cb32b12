//! CoNLL-U reading and writing.
//!
//! Only the columns the transition systems consume are kept: ID, FORM, LEMMA,
//! UPOS, HEAD and DEPREL. Multiword ranges (`1-2`) and empty nodes (`1.1`) are
//! skipped.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use crate::lang::{Phrasal, Sentence, Token, Tokenized};

static FIELD_DELIMITER: &str = "\t";
static EMPTY_FIELD: &str = "_";
const NUM_FIELDS: usize = 10;

#[inline]
fn invalid<E: Into<Box<dyn std::error::Error + Send + Sync>>>(e: E) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e)
}

#[inline]
fn optional_str(field: &str) -> Option<&str> {
    if field == EMPTY_FIELD {
        None
    } else {
        Some(field)
    }
}

#[inline]
fn optional_usize(field: &str) -> io::Result<Option<usize>> {
    match optional_str(field) {
        Some(s) => s.parse::<usize>().map(Some).map_err(invalid),
        None => Ok(None),
    }
}

/// A single CoNLL-U line; `None` for multiword ranges and empty nodes.
#[derive(Debug)]
pub struct Line(pub Option<Token<'static>>);

impl Line {
    pub fn parse(line: &str) -> io::Result<Line> {
        let cols: Vec<&str> = line.split(FIELD_DELIMITER).collect();
        if cols.len() != NUM_FIELDS {
            return Err(invalid(format!(
                "expected {} fields, found {}",
                NUM_FIELDS,
                cols.len()
            )));
        }
        if cols[0].contains('-') || cols[0].contains('.') {
            return Ok(Line(None));
        }
        let id = cols[0].parse::<usize>().map_err(invalid)?;
        // HEAD 0 is the artificial root, which `Token::root` occupies.
        let head = optional_usize(cols[6])?;
        let token = Token::new(
            id,
            cols[1].to_string(),
            optional_str(cols[2]).map(|s| s.to_string()),
            optional_str(cols[3]).map(|s| s.to_string()),
            head,
            optional_str(cols[7]).map(|s| s.to_string()),
        );
        Ok(Line(Some(token)))
    }
}

/// Reads up to `num` sentences, each starting with the artificial root.
pub fn read_upto<R: BufRead>(
    reader: &mut R,
    num: usize,
    buf: &mut Vec<Sentence<Token<'static>>>,
) -> io::Result<usize> {
    let mut count = 0;
    let mut line = String::new();
    let mut tokens = vec![Token::root()];
    while count < num {
        match reader.read_line(&mut line) {
            Ok(0) => {
                if tokens.len() > 1 {
                    buf.push(finish(tokens)?);
                    count += 1;
                }
                break;
            }
            Ok(_) => {
                let trimmed = line.trim_end_matches(|c: char| c == '\n' || c == '\r');
                if trimmed.trim().is_empty() {
                    if tokens.len() > 1 {
                        buf.push(finish(tokens)?);
                        count += 1;
                    }
                    tokens = vec![Token::root()];
                } else if !trimmed.starts_with('#') {
                    if let Line(Some(token)) = Line::parse(trimmed)? {
                        tokens.push(token);
                    }
                }
            }
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
        line.clear();
    }
    Ok(count)
}

fn finish(tokens: Vec<Token<'static>>) -> io::Result<Sentence<Token<'static>>> {
    let n = tokens.len();
    for (i, token) in tokens.iter().enumerate() {
        if token.id() != i {
            return Err(invalid(format!(
                "token ids must be consecutive: expected {}, found {}",
                i,
                token.id()
            )));
        }
        if let Some(head) = token.head() {
            if head >= n {
                return Err(invalid(format!(
                    "head {} of token {} is out of range",
                    head,
                    token.id()
                )));
            }
        }
    }
    Ok(Sentence::from_tokens(tokens))
}

/// Sentence reader over a CoNLL-U stream.
#[derive(Debug)]
pub struct ConllReader<R> {
    inner: R,
}

impl<R: BufRead> ConllReader<R> {
    pub fn new(inner: R) -> Self {
        ConllReader { inner: inner }
    }

    /// Reads every remaining sentence into `buf`.
    pub fn read(&mut self, buf: &mut Vec<Sentence<Token<'static>>>) -> io::Result<usize> {
        read_upto(&mut self.inner, usize::MAX, buf)
    }

    pub fn read_upto(
        &mut self,
        num: usize,
        buf: &mut Vec<Sentence<Token<'static>>>,
    ) -> io::Result<usize> {
        read_upto(&mut self.inner, num, buf)
    }
}

impl ConllReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(ConllReader::new(BufReader::new(File::open(path)?)))
    }
}

/// Writes a sentence with predicted attachments; the root is not written.
pub fn write_sentence<W: Write, T: Tokenized>(
    writer: &mut W,
    sentence: &Sentence<T>,
    heads: &[Option<usize>],
    deprels: &[Option<String>],
) -> io::Result<()> {
    for token in sentence.tokens().iter().skip(1) {
        let id = token.id();
        let head = heads
            .get(id)
            .and_then(|h| *h)
            .map(|h| h.to_string())
            .unwrap_or_else(|| EMPTY_FIELD.to_string());
        let deprel = deprels
            .get(id)
            .and_then(|d| d.as_ref().map(|s| s.as_str()))
            .unwrap_or(EMPTY_FIELD);
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t_\t_\t{}\t{}\t_\t_",
            id,
            token.form(),
            token.lemma().unwrap_or(EMPTY_FIELD),
            token.upos().unwrap_or(EMPTY_FIELD),
            head,
            deprel
        )?;
    }
    writeln!(writer)
}
