//! Error types shared across all parley crates.

/// Errors raised while configuring a parley framework instance.
///
/// None of these abort the host process. Registration variants are returned
/// to the caller *and* logged; the registry that produced them keeps its
/// prior state.
#[derive(Debug, thiserror::Error)]
pub enum ParleyError {
    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("command with ID '{0}' being registered more than once")]
    DuplicateCommand(String),

    #[error("command '{0}' is missing parameter metadata")]
    MissingMetadata(String),

    #[error("command '{0}' declares no aliases")]
    NoAliases(String),

    #[error("command '{command}' has an invalid signature: {reason}")]
    InvalidSignature { command: String, reason: String },

    #[error("argument type '{0}' already added")]
    DuplicateResolver(String),

    #[error("argument type resolver for type '{0}' could not be found")]
    UnknownType(String),
}
