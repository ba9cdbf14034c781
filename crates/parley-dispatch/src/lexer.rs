//! Command lexer -- splits message text into a label and argument tokens.
//!
//! The lexer understands paired quote delimiters, so `"hello world"` is one
//! token. Only the label is read eagerly; the argument region is returned as
//! [`PendingTokens`] and tokenized when the dispatcher knows the label names
//! a registered command.

use parley_types::{LexerConfig, QuotePair, UnterminatedQuote};
use thiserror::Error;

/// A single unit of argument text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The token text with quote delimiters removed.
    pub value: String,
    /// The token as written, delimiters included.
    pub raw: String,
    /// Whitespace that followed the token in the source.
    pub trailing: String,
    /// Whether the token was a quoted span.
    pub quoted: bool,
}

impl Token {
    /// A bare (unquoted) token with no trailing whitespace.
    pub fn bare(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            raw: value.clone(),
            value,
            trailing: String::new(),
            quoted: false,
        }
    }
}

/// Errors raised under [`UnterminatedQuote::Reject`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LexError {
    #[error("unterminated quote opened with '{open}' at byte {offset}")]
    UnterminatedQuote { open: String, offset: usize },
}

/// Tokenizer configured with a set of quote pairs and an unterminated-quote policy.
#[derive(Debug, Clone)]
pub struct Lexer {
    quotes: Vec<QuotePair>,
    unterminated: UnterminatedQuote,
}

impl Lexer {
    pub fn new(config: &LexerConfig) -> Self {
        Self {
            quotes: config.quotes.clone(),
            unterminated: config.unterminated_quote,
        }
    }

    /// Split `input` into a label and a lazy token region.
    ///
    /// `prefix_len` is the byte length of the matched prefix. Whitespace
    /// between the prefix and the label is skipped. Returns `Ok(None)` when
    /// nothing follows the prefix.
    pub fn lex_command(
        &self,
        input: &str,
        prefix_len: usize,
    ) -> Result<Option<(Token, PendingTokens)>, LexError> {
        if prefix_len > input.len() || !input.is_char_boundary(prefix_len) {
            return Ok(None);
        }

        let mut pos = skip_whitespace(input, prefix_len);
        let Some((label, next)) = self.next_token(input, pos)? else {
            return Ok(None);
        };
        pos = next;

        Ok(Some((
            label,
            PendingTokens {
                lexer: self.clone(),
                source: input[pos..].to_string(),
            },
        )))
    }

    /// Tokenize a whole string.
    pub fn lex(&self, input: &str) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        let mut pos = skip_whitespace(input, 0);
        while let Some((token, next)) = self.next_token(input, pos)? {
            tokens.push(token);
            pos = next;
        }
        Ok(tokens)
    }

    /// Read one token starting at `pos` (which must not be whitespace),
    /// returning it with the position after its trailing whitespace.
    fn next_token(&self, input: &str, pos: usize) -> Result<Option<(Token, usize)>, LexError> {
        let rest = &input[pos..];
        if rest.is_empty() {
            return Ok(None);
        }

        for pair in &self.quotes {
            let Some(inner_and_after) = rest.strip_prefix(pair.open()) else {
                continue;
            };
            let inner_start = pos + pair.open().len();
            let (value, raw, end) = match inner_and_after.find(pair.close()) {
                Some(close_at) => {
                    let end = inner_start + close_at + pair.close().len();
                    (
                        &inner_and_after[..close_at],
                        &input[pos..end],
                        end,
                    )
                }
                None => match self.unterminated {
                    UnterminatedQuote::Rest => (inner_and_after, rest, input.len()),
                    UnterminatedQuote::Reject => {
                        return Err(LexError::UnterminatedQuote {
                            open: pair.open().to_string(),
                            offset: pos,
                        });
                    }
                },
            };
            let next = skip_whitespace(input, end);
            return Ok(Some((
                Token {
                    value: value.to_string(),
                    raw: raw.to_string(),
                    trailing: input[end..next].to_string(),
                    quoted: true,
                },
                next,
            )));
        }

        let end = rest
            .find(char::is_whitespace)
            .map_or(input.len(), |offset| pos + offset);
        let next = skip_whitespace(input, end);
        let word = &input[pos..end];
        Ok(Some((
            Token {
                value: word.to_string(),
                raw: word.to_string(),
                trailing: input[end..next].to_string(),
                quoted: false,
            },
            next,
        )))
    }
}

/// The unread argument region of a command.
///
/// Tokenizing is deferred until [`materialize`](Self::materialize) so that
/// messages whose label matches no command never pay for it.
#[derive(Debug, Clone)]
pub struct PendingTokens {
    lexer: Lexer,
    source: String,
}

impl PendingTokens {
    /// The untokenized argument text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Tokenize the argument region.
    pub fn materialize(self) -> Result<Vec<Token>, LexError> {
        self.lexer.lex(&self.source)
    }
}

fn skip_whitespace(input: &str, from: usize) -> usize {
    input[from..]
        .find(|c: char| !c.is_whitespace())
        .map_or(input.len(), |offset| from + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexer() -> Lexer {
        Lexer::new(&LexerConfig::default())
    }

    fn values(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.value.as_str()).collect()
    }

    #[test]
    fn splits_label_and_arguments() {
        let (label, pending) = lexer().lex_command("!ping alpha beta", 1).unwrap().unwrap();
        assert_eq!(label.value, "ping");
        assert_eq!(pending.source(), "alpha beta");
        let tokens = pending.materialize().unwrap();
        assert_eq!(values(&tokens), vec!["alpha", "beta"]);
    }

    #[test]
    fn quoted_span_is_one_token() {
        let (_, pending) = lexer().lex_command(r#"!say "hello world""#, 1).unwrap().unwrap();
        let tokens = pending.materialize().unwrap();
        assert_eq!(values(&tokens), vec!["hello world"]);
        assert!(tokens[0].quoted);
        assert_eq!(tokens[0].raw, r#""hello world""#);
    }

    #[test]
    fn smart_quotes_are_paired() {
        let tokens = lexer().lex("“one two” three").unwrap();
        assert_eq!(values(&tokens), vec!["one two", "three"]);
    }

    #[test]
    fn quotes_inside_a_word_are_literal() {
        let tokens = lexer().lex(r#"it"s fine"#).unwrap();
        assert_eq!(values(&tokens), vec![r#"it"s"#, "fine"]);
    }

    #[test]
    fn closing_quote_ends_token_without_whitespace() {
        let tokens = lexer().lex(r#""a b"c"#).unwrap();
        assert_eq!(values(&tokens), vec!["a b", "c"]);
        assert_eq!(tokens[0].trailing, "");
    }

    #[test]
    fn empty_quoted_string_is_a_token() {
        let tokens = lexer().lex(r#""" arg"#).unwrap();
        assert_eq!(values(&tokens), vec!["", "arg"]);
    }

    #[test]
    fn trailing_whitespace_is_recorded() {
        let tokens = lexer().lex("hi   there\t").unwrap();
        assert_eq!(tokens[0].trailing, "   ");
        assert_eq!(tokens[1].trailing, "\t");
    }

    #[test]
    fn whitespace_after_prefix_is_skipped() {
        let (label, _) = lexer().lex_command("!  ping", 1).unwrap().unwrap();
        assert_eq!(label.value, "ping");
    }

    #[test]
    fn bare_prefix_is_no_match() {
        assert!(lexer().lex_command("!", 1).unwrap().is_none());
        assert!(lexer().lex_command("!   ", 1).unwrap().is_none());
    }

    #[test]
    fn prefix_past_end_is_no_match() {
        assert!(lexer().lex_command("!", 5).unwrap().is_none());
    }

    #[test]
    fn multibyte_prefix() {
        let (label, pending) = lexer().lex_command("→echo hi", "→".len()).unwrap().unwrap();
        assert_eq!(label.value, "echo");
        assert_eq!(pending.source(), "hi");
    }

    #[test]
    fn unterminated_quote_takes_rest_by_default() {
        let (_, pending) = lexer()
            .lex_command(r#"!say "never closed here"#, 1)
            .unwrap()
            .unwrap();
        let tokens = pending.materialize().unwrap();
        assert_eq!(values(&tokens), vec!["never closed here"]);
        assert!(tokens[0].quoted);
    }

    #[test]
    fn unterminated_quote_rejected_when_configured() {
        let config = LexerConfig {
            unterminated_quote: UnterminatedQuote::Reject,
            ..LexerConfig::default()
        };
        let lexer = Lexer::new(&config);
        let (_, pending) = lexer.lex_command(r#"!say "oops"#, 1).unwrap().unwrap();
        let err = pending.materialize().unwrap_err();
        assert_eq!(
            err,
            LexError::UnterminatedQuote {
                open: "\"".into(),
                offset: 0
            }
        );
    }

    #[test]
    fn unterminated_quote_in_label_rejected_when_configured() {
        let config = LexerConfig {
            unterminated_quote: UnterminatedQuote::Reject,
            ..LexerConfig::default()
        };
        let err = Lexer::new(&config).lex_command("!\"ping", 1).unwrap_err();
        assert!(matches!(err, LexError::UnterminatedQuote { offset: 1, .. }));
    }

    #[test]
    fn custom_quote_pairs() {
        let config = LexerConfig {
            quotes: vec![QuotePair::new("<<", ">>")],
            ..LexerConfig::default()
        };
        let tokens = Lexer::new(&config).lex(r#"<<a b>> "c d""#).unwrap();
        assert_eq!(values(&tokens), vec!["a b", r#""c"#, r#"d""#]);
    }
}
