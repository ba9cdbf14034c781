//! Cursor over parsed arguments.

use std::collections::{HashMap, HashSet};

use crate::lexer::Token;
use crate::parser::ParserOutput;

/// Flags and options parsed out of a command's token stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    flags: HashSet<String>,
    values: HashMap<String, Vec<String>>,
}

impl Options {
    /// Whether the flag `name` was given (as a bare flag).
    pub fn flag(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    /// The last value given for option `name`.
    pub fn option(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|values| values.last())
            .map(String::as_str)
    }

    /// Every value given for option `name`, in order.
    pub fn options(&self, name: &str) -> &[String] {
        self.values.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty() && self.values.is_empty()
    }
}

/// Positional tokens consumed front to back, plus the parsed [`Options`].
///
/// Every positional token is handed out at most once, except after an
/// explicit [`rewind`](Self::rewind).
#[derive(Debug, Clone, Default)]
pub struct Args {
    ordered: Vec<Token>,
    position: usize,
    options: Options,
}

impl Args {
    pub fn new(output: ParserOutput) -> Self {
        Self {
            ordered: output.ordered,
            position: 0,
            options: Options {
                flags: output.flags,
                values: output.options,
            },
        }
    }

    /// Take the next positional token.
    pub fn single(&mut self) -> Option<String> {
        let token = self.ordered.get(self.position)?;
        self.position += 1;
        Some(token.value.clone())
    }

    /// Take every remaining positional token as one string.
    ///
    /// Tokens are joined with the whitespace that separated them in the
    /// source. Returns `None` when nothing remains.
    pub fn rest(&mut self) -> Option<String> {
        let remaining = self.ordered.get(self.position..)?;
        let (last, init) = remaining.split_last()?;
        let mut joined = String::new();
        for token in init {
            joined.push_str(&token.value);
            joined.push_str(&token.trailing);
        }
        joined.push_str(&last.value);
        self.position = self.ordered.len();
        Some(joined)
    }

    /// Number of positional tokens not yet consumed.
    pub fn remaining(&self) -> usize {
        self.ordered.len() - self.position
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Move the cursor back to an earlier [`position`](Self::position).
    pub fn rewind(&mut self, position: usize) {
        self.position = position.min(self.position);
    }

    pub fn options(&self) -> &Options {
        &self.options
    }
}
