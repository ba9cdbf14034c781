//! Core types shared across all parley crates.
//!
//! Defines the configuration loaded from `parley.toml` and the error type
//! used for configuration and registration failures.

pub mod config;
pub mod error;

pub use config::{
    DiagnosticsConfig, DispatchConfig, LexerConfig, OptionalPolicy, ParleyConfig, ParserConfig,
    QuotePair, UnterminatedQuote, CONFIG_FILENAME,
};
pub use error::ParleyError;
