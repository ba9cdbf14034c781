//! Command metadata registry and prefix provider.
//!
//! [`CommandRegistry`] stores commands in registration order and finds them
//! by case-insensitive alias. It also owns the [`PrefixProvider`] that
//! decides which leading strings mark a message as a command attempt.

use std::fmt;
use std::sync::Arc;

use parley_channel::InboundMessage;
use parley_types::ParleyError;
use tracing::{error, info};

use crate::command::Command;

type PrefixFn = dyn Fn(&InboundMessage) -> Vec<String> + Send + Sync;

/// Where the candidate prefixes for a message come from.
#[derive(Clone, Default)]
pub enum PrefixProvider {
    /// No prefixes; command matching is disabled.
    #[default]
    None,
    /// A fixed list, tested in order.
    Static(Vec<String>),
    /// Computed per message (e.g. per-conversation prefixes).
    Dynamic(Arc<PrefixFn>),
}

impl PrefixProvider {
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&InboundMessage) -> Vec<String> + Send + Sync + 'static,
    {
        Self::Dynamic(Arc::new(f))
    }

    /// The concrete prefixes for `message`.
    pub fn resolve(&self, message: &InboundMessage) -> Vec<String> {
        match self {
            Self::None => Vec::new(),
            Self::Static(prefixes) => prefixes.clone(),
            Self::Dynamic(f) => f(message),
        }
    }
}

impl fmt::Debug for PrefixProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Static(prefixes) => f.debug_tuple("Static").field(prefixes).finish(),
            Self::Dynamic(_) => write!(f, "Dynamic(..)"),
        }
    }
}

impl From<&str> for PrefixProvider {
    fn from(prefix: &str) -> Self {
        Self::Static(vec![prefix.to_string()])
    }
}

impl From<String> for PrefixProvider {
    fn from(prefix: String) -> Self {
        Self::Static(vec![prefix])
    }
}

impl From<Vec<String>> for PrefixProvider {
    fn from(prefixes: Vec<String>) -> Self {
        if prefixes.is_empty() {
            Self::None
        } else {
            Self::Static(prefixes)
        }
    }
}

impl<const N: usize> From<[&str; N]> for PrefixProvider {
    fn from(prefixes: [&str; N]) -> Self {
        prefixes
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .into()
    }
}

/// Registered commands, in registration order.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<Arc<Command>>,
    prefix: PrefixProvider,
}

impl CommandRegistry {
    /// Create an empty registry with no prefixes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command.
    ///
    /// Rejected (and logged) when the command has no signature, no aliases,
    /// an invalid signature, or an ID that is already registered. A
    /// rejected registration leaves the registry unchanged.
    pub fn register(&mut self, command: Command) -> Result<(), ParleyError> {
        let id = command.id().to_string();

        let Some(signature) = command.signature() else {
            error!(command = %id, "command '{id}' is missing parameter metadata");
            return Err(ParleyError::MissingMetadata(id));
        };

        if self.get(&id).is_some() {
            error!(command = %id, "command with ID '{id}' being registered more than once");
            return Err(ParleyError::DuplicateCommand(id));
        }

        if command.aliases().is_empty() {
            error!(command = %id, "command '{id}' declares no aliases");
            return Err(ParleyError::NoAliases(id));
        }

        if let Err(reason) = signature.validate() {
            error!(command = %id, %reason, "command '{id}' has an invalid signature");
            return Err(ParleyError::InvalidSignature {
                command: id,
                reason,
            });
        }

        info!(
            command = %id,
            aliases = %command.aliases().join(", "),
            "registered command"
        );
        self.commands.push(Arc::new(command));
        Ok(())
    }

    /// Find the first registered command with an alias matching `label`,
    /// ignoring case.
    pub fn find_by_label(&self, label: &str) -> Option<&Arc<Command>> {
        self.commands.iter().find(|cmd| cmd.matches_label(label))
    }

    /// Look up a command by ID.
    pub fn get(&self, id: &str) -> Option<&Arc<Command>> {
        self.commands.iter().find(|cmd| cmd.id() == id)
    }

    /// Commands in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Command>> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Replace the prefix provider.
    pub fn set_prefix(&mut self, prefix: impl Into<PrefixProvider>) {
        self.prefix = prefix.into();
    }

    pub fn prefix_provider(&self) -> &PrefixProvider {
        &self.prefix
    }

    /// Candidate prefixes for `message`.
    pub fn prefixes(&self, message: &InboundMessage) -> Vec<String> {
        self.prefix.resolve(message)
    }
}
