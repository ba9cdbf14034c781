//! Configuration types for a parley framework instance.
//!
//! [`ParleyConfig`] is the top-level configuration loaded from `parley.toml`,
//! controlling the command prefixes, quoting rules of the lexer, the flag
//! syntax of the argument parser, and dispatch policies.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ParleyError;

/// Default configuration file name.
pub const CONFIG_FILENAME: &str = "parley.toml";

/// Maximum config file size in bytes. Larger files are rejected.
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// A pair of quote delimiters: `[open, close]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuotePair(pub String, pub String);

impl QuotePair {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self(open.into(), close.into())
    }

    pub fn open(&self) -> &str {
        &self.0
    }

    pub fn close(&self) -> &str {
        &self.1
    }
}

/// What the lexer does when a quoted span is never closed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum UnterminatedQuote {
    /// The remainder of the input after the opening delimiter is one token.
    #[default]
    Rest,
    /// The lex fails and the message is treated as not-a-command.
    Reject,
}

/// How the dispatcher treats an optional parameter that resolves to no value.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OptionalPolicy {
    /// Record the parameter as absent and stop resolving later parameters.
    #[default]
    ShortCircuit,
    /// Record the parameter as absent, put its token back, and keep going.
    Continue,
}

/// Quoting rules for the command lexer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LexerConfig {
    /// Paired quote delimiters, tried in order.
    pub quotes: Vec<QuotePair>,
    /// Behavior for a quote that is never closed.
    pub unterminated_quote: UnterminatedQuote,
}

impl Default for LexerConfig {
    fn default() -> Self {
        Self {
            quotes: vec![QuotePair::new("\"", "\""), QuotePair::new("“", "”")],
            unterminated_quote: UnterminatedQuote::Rest,
        }
    }
}

/// Flag and option syntax for the token-stream parser.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ParserConfig {
    /// Prefixes that mark a token as a flag or option (e.g. `--`).
    pub flag_prefixes: Vec<String>,
    /// Separators between an option name and its inline value (e.g. `=`).
    pub separators: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            flag_prefixes: vec!["--".into()],
            separators: vec!["=".into()],
        }
    }
}

/// Dispatch-time policies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DispatchConfig {
    /// Whether messages from automated authors are dropped before prefix matching.
    pub ignore_automated: bool,
    /// Behavior when an optional parameter resolves to no value.
    pub optional_policy: OptionalPolicy,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            ignore_automated: true,
            optional_policy: OptionalPolicy::ShortCircuit,
        }
    }
}

/// User-facing diagnostic formatting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Marker prepended to every diagnostic sent to a conversation.
    pub marker: String,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            marker: ":warning:".into(),
        }
    }
}

/// Top-level configuration for a parley framework instance.
///
/// Every section is optional in the TOML source; missing sections take
/// their defaults. An empty `prefixes` list disables command matching
/// unless a prefix provider is installed programmatically.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ParleyConfig {
    /// Static command prefixes, tested in order.
    pub prefixes: Vec<String>,
    pub lexer: LexerConfig,
    pub parser: ParserConfig,
    pub dispatch: DispatchConfig,
    pub diagnostics: DiagnosticsConfig,
}

impl ParleyConfig {
    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ParleyError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ParleyError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ParleyError> {
        toml::to_string_pretty(self).map_err(|e| ParleyError::ConfigError(e.to_string()))
    }

    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, ParleyError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            ParleyError::ConfigError(format!("cannot stat {}: {e}", path.display()))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ParleyError::ConfigError(format!(
                "{} is {} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit",
                path.display(),
                metadata.len()
            )));
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            ParleyError::ConfigError(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Check the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ParleyError> {
        for pair in &self.lexer.quotes {
            if pair.open().is_empty() || pair.close().is_empty() {
                return Err(ParleyError::ConfigError(
                    "quote delimiters must not be empty".into(),
                ));
            }
        }
        if self.parser.flag_prefixes.iter().any(String::is_empty) {
            return Err(ParleyError::ConfigError(
                "flag prefixes must not be empty".into(),
            ));
        }
        if self.parser.separators.iter().any(String::is_empty) {
            return Err(ParleyError::ConfigError(
                "option separators must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = ParleyConfig::from_toml("").unwrap();
        assert_eq!(config, ParleyConfig::default());
        assert!(config.prefixes.is_empty());
        assert_eq!(config.lexer.quotes.len(), 2);
        assert_eq!(config.lexer.quotes[1], QuotePair::new("“", "”"));
        assert_eq!(config.parser.flag_prefixes, vec!["--"]);
        assert!(config.dispatch.ignore_automated);
        assert_eq!(config.diagnostics.marker, ":warning:");
    }

    #[test]
    fn parses_full_config() {
        let toml_str = r#"
prefixes = ["!", "?"]

[lexer]
quotes = [["'", "'"]]
unterminated_quote = "reject"

[parser]
flag_prefixes = ["--", "-"]
separators = ["=", ":"]

[dispatch]
ignore_automated = false
optional_policy = "continue"

[diagnostics]
marker = "!!"
"#;
        let config = ParleyConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.prefixes, vec!["!", "?"]);
        assert_eq!(config.lexer.quotes, vec![QuotePair::new("'", "'")]);
        assert_eq!(config.lexer.unterminated_quote, UnterminatedQuote::Reject);
        assert_eq!(config.parser.separators, vec!["=", ":"]);
        assert!(!config.dispatch.ignore_automated);
        assert_eq!(config.dispatch.optional_policy, OptionalPolicy::Continue);
        assert_eq!(config.diagnostics.marker, "!!");
    }

    #[test]
    fn toml_roundtrip_preserves_config() {
        let mut config = ParleyConfig::default();
        config.prefixes = vec!["~".into()];
        config.dispatch.optional_policy = OptionalPolicy::Continue;

        let text = config.to_toml().unwrap();
        let back = ParleyConfig::from_toml(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn rejects_empty_quote_delimiter() {
        let err = ParleyConfig::from_toml("[lexer]\nquotes = [[\"\", \"\\\"\"]]\n").unwrap_err();
        assert!(
            err.to_string().contains("quote delimiters"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn rejects_empty_flag_prefix() {
        let err = ParleyConfig::from_toml("[parser]\nflag_prefixes = [\"\"]\n").unwrap_err();
        assert!(matches!(err, ParleyError::ConfigError(_)));
    }

    #[test]
    fn rejects_unknown_policy() {
        let err = ParleyConfig::from_toml("[dispatch]\noptional_policy = \"sometimes\"\n")
            .unwrap_err();
        assert!(matches!(err, ParleyError::ConfigError(_)));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "prefixes = [\"!\"]").unwrap();
        let config = ParleyConfig::load(file.path()).unwrap();
        assert_eq!(config.prefixes, vec!["!"]);
    }

    #[test]
    fn load_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ParleyConfig::load(&dir.path().join(CONFIG_FILENAME)).unwrap_err();
        assert!(err.to_string().contains("cannot stat"));
    }
}
