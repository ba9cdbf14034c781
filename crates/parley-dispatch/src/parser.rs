//! Token-stream parser -- separates positional tokens from flags and options.
//!
//! Flags may appear anywhere in the token stream. A token is inspected
//! against the configured flag prefixes (longest first), so with prefixes
//! `-` and `--` the token `--force` is the flag `force`, not `-force`.
//!
//! | Token form            | Result                                             |
//! |-----------------------|----------------------------------------------------|
//! | `--name=value`        | option `name` = `value`                            |
//! | `--name= value`       | option `name` = `value` (next token consumed)      |
//! | `--name value`        | option, if `name` is declared as taking a value    |
//! | `--name`              | flag `name`                                        |
//! | `--`, quoted tokens   | positional                                         |

use std::collections::{HashMap, HashSet};

use parley_types::ParserConfig;

use crate::lexer::Token;

/// Result of parsing a token stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserOutput {
    /// Positional tokens in their original relative order.
    pub ordered: Vec<Token>,
    /// Names of flags that were present.
    pub flags: HashSet<String>,
    /// Option values by name, in the order they appeared.
    pub options: HashMap<String, Vec<String>>,
}

#[derive(Debug, PartialEq, Eq)]
enum Classified {
    Ordered,
    Flag(String),
    Option(String, String),
    AwaitingValue(String),
}

/// The unordered flag-matching strategy.
#[derive(Debug, Clone)]
pub struct UnorderedStrategy {
    prefixes: Vec<String>,
    separators: Vec<String>,
    options: HashSet<String>,
}

impl UnorderedStrategy {
    /// Build a strategy from explicit prefixes and separators.
    pub fn new<P, S>(prefixes: P, separators: S) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        let mut prefixes: Vec<String> = prefixes
            .into_iter()
            .map(Into::into)
            .filter(|p: &String| !p.is_empty())
            .collect();
        prefixes.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        prefixes.dedup();

        let mut separators: Vec<String> = separators
            .into_iter()
            .map(Into::into)
            .filter(|s: &String| !s.is_empty())
            .collect();
        separators.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        separators.dedup();

        Self {
            prefixes,
            separators,
            options: HashSet::new(),
        }
    }

    /// `--flag` and `--option=value`.
    pub fn long() -> Self {
        Self::new(["--"], ["="])
    }

    pub fn from_config(config: &ParserConfig) -> Self {
        Self::new(config.flag_prefixes.clone(), config.separators.clone())
    }

    /// Declare option names that take the following token as their value.
    pub fn with_options<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.options.extend(names.into_iter().map(Into::into));
        self
    }

    /// Split `tokens` into positional tokens, flags and options.
    ///
    /// Total over any input: every token ends up somewhere.
    pub fn parse(&self, tokens: Vec<Token>) -> ParserOutput {
        let mut out = ParserOutput::default();
        let mut iter = tokens.into_iter().peekable();

        while let Some(token) = iter.next() {
            match self.classify(&token) {
                Classified::Ordered => out.ordered.push(token),
                Classified::Flag(name) => {
                    out.flags.insert(name);
                }
                Classified::Option(name, value) => {
                    out.options.entry(name).or_default().push(value);
                }
                Classified::AwaitingValue(name) => {
                    let takes_next = iter
                        .peek()
                        .is_some_and(|next| self.classify(next) == Classified::Ordered);
                    match iter.next_if(|_| takes_next) {
                        Some(value) => out.options.entry(name).or_default().push(value.value),
                        None => {
                            out.flags.insert(name);
                        }
                    }
                }
            }
        }

        out
    }

    fn classify(&self, token: &Token) -> Classified {
        if token.quoted {
            return Classified::Ordered;
        }

        let Some(body) = self
            .prefixes
            .iter()
            .find_map(|prefix| token.value.strip_prefix(prefix.as_str()))
        else {
            return Classified::Ordered;
        };
        if body.is_empty() {
            return Classified::Ordered;
        }

        let split = self
            .separators
            .iter()
            .filter_map(|sep| body.find(sep.as_str()).map(|at| (at, sep.len())))
            .min_by_key(|&(at, _)| at);

        match split {
            Some((0, _)) => Classified::Ordered,
            Some((at, sep_len)) => {
                let name = body[..at].to_string();
                let value = &body[at + sep_len..];
                if value.is_empty() {
                    Classified::AwaitingValue(name)
                } else {
                    Classified::Option(name, value.to_string())
                }
            }
            None if self.options.contains(body) => Classified::AwaitingValue(body.to_string()),
            None => Classified::Flag(body.to_string()),
        }
    }
}

impl Default for UnorderedStrategy {
    fn default() -> Self {
        Self::long()
    }
}
