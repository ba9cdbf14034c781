//! The dispatch algorithm.
//!
//! One run per inbound message:
//!
//! 1. Drop messages from automated authors.
//! 2. Find the first configured prefix the text starts with.
//! 3. Lex the label; look it up by alias.
//! 4. Tokenize the rest and split out flags and options.
//! 5. Build the [`Context`] and run middleware.
//! 6. Walk the declared parameters, resolving one token (or all remaining
//!    tokens for a rest parameter) per parameter.
//! 7. Invoke the handler.
//!
//! Steps 2-3 fail silently: text that does not look like a known command is
//! ordinary chat. User input errors are answered in the conversation; a
//! parameter type with no resolver is a setup defect and is only logged.

use std::sync::Arc;

use parley_channel::{ChannelError, InboundMessage};
use parley_types::{OptionalPolicy, ParleyConfig};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::args::Args;
use crate::command::Command;
use crate::context::{Arguments, Context};
use crate::lexer::Lexer;
use crate::middleware::Middleware;
use crate::parser::UnorderedStrategy;
use crate::registry::CommandRegistry;
use crate::resolver::ResolverRegistry;
use crate::value::TypeTag;

/// Why an invocation was refused after its command was identified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// A required parameter's token did not resolve.
    InvalidValue { param: String, kind: TypeTag },
    /// A required parameter had no token.
    MissingArgument { param: String, kind: TypeTag },
    /// A middleware refused the invocation.
    Middleware(String),
}

impl Rejection {
    /// The diagnostic sent to the conversation.
    pub fn message(&self, marker: &str) -> String {
        let body = match self {
            Self::InvalidValue { kind, .. } => {
                format!("Invalid {}", kind.name().to_lowercase())
            }
            Self::MissingArgument { param, kind } => {
                format!("Missing required argument `{param}` (`{kind}`)")
            }
            Self::Middleware(reason) => reason.clone(),
        };
        if marker.is_empty() {
            body
        } else {
            format!("{marker} {body}")
        }
    }
}

/// How a dispatch attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No prefix, no label, or no command with that label. Nothing was sent.
    NotACommand,
    /// A diagnostic was sent and the handler was not invoked.
    Rejected(Rejection),
    /// A parameter type has no registered resolver; the handler was not invoked.
    Misconfigured(TypeTag),
    /// The handler ran to completion.
    Invoked,
}

/// Failures that leave the dispatcher's own error handling.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to deliver diagnostic: {0}")]
    Reply(#[from] ChannelError),

    #[error("command '{command}' failed: {error:#}")]
    Handler {
        command: String,
        error: anyhow::Error,
    },
}

/// Matches inbound messages against registered commands and invokes them.
///
/// Built by [`Framework::into_dispatcher`](crate::Framework::into_dispatcher);
/// read-only afterwards, so one dispatcher can serve concurrent dispatches.
pub struct Dispatcher {
    commands: CommandRegistry,
    resolvers: ResolverRegistry,
    middleware: Vec<Arc<dyn Middleware>>,
    config: ParleyConfig,
    lexer: Lexer,
    strategy: UnorderedStrategy,
}

impl Dispatcher {
    pub(crate) fn new(
        commands: CommandRegistry,
        resolvers: ResolverRegistry,
        middleware: Vec<Arc<dyn Middleware>>,
        config: ParleyConfig,
    ) -> Self {
        let lexer = Lexer::new(&config.lexer);
        let strategy = UnorderedStrategy::from_config(&config.parser);
        Self {
            commands,
            resolvers,
            middleware,
            config,
            lexer,
            strategy,
        }
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn resolvers(&self) -> &ResolverRegistry {
        &self.resolvers
    }

    pub fn config(&self) -> &ParleyConfig {
        &self.config
    }

    /// Entry point for every inbound message.
    pub async fn handle_message(
        &self,
        message: InboundMessage,
    ) -> Result<DispatchOutcome, DispatchError> {
        if self.config.dispatch.ignore_automated && message.author_is_automated {
            debug!(message_id = %message.id, "ignoring message from automated author");
            return Ok(DispatchOutcome::NotACommand);
        }

        let prefix = self
            .commands
            .prefixes(&message)
            .into_iter()
            .find(|prefix| message.text.starts_with(prefix.as_str()));
        let Some(prefix) = prefix else {
            return Ok(DispatchOutcome::NotACommand);
        };

        self.handle_command(message, prefix).await
    }

    /// Dispatch a message already known to start with `prefix`.
    pub async fn handle_command(
        &self,
        message: InboundMessage,
        prefix: String,
    ) -> Result<DispatchOutcome, DispatchError> {
        let (label, pending) = match self.lexer.lex_command(&message.text, prefix.len()) {
            Ok(Some(lexed)) => lexed,
            Ok(None) => return Ok(DispatchOutcome::NotACommand),
            Err(e) => {
                debug!(message_id = %message.id, "not a command: {e}");
                return Ok(DispatchOutcome::NotACommand);
            }
        };

        let Some(command) = self.commands.find_by_label(&label.value).cloned() else {
            debug!(message_id = %message.id, label = %label.value, "no command for label");
            return Ok(DispatchOutcome::NotACommand);
        };

        let tokens = match pending.materialize() {
            Ok(tokens) => tokens,
            Err(e) => {
                debug!(message_id = %message.id, command = %command.id(), "not a command: {e}");
                return Ok(DispatchOutcome::NotACommand);
            }
        };

        let Some(signature) = command.signature() else {
            error!(
                command = %command.id(),
                "command '{}' is missing metadata during command handling",
                command.id()
            );
            return Ok(DispatchOutcome::NotACommand);
        };

        let output = self
            .strategy
            .clone()
            .with_options(signature.options().iter().cloned())
            .parse(tokens);
        let mut args = Args::new(output);

        let ctx = Context {
            message,
            label: label.value,
            command: Arc::clone(&command),
            prefix,
            options: args.options().clone(),
        };

        for middleware in &self.middleware {
            if let Err(reason) = middleware.check(&ctx).await {
                debug!(
                    command = %command.id(),
                    middleware = middleware.name(),
                    "invocation rejected by middleware"
                );
                return self.reject(&ctx, Rejection::Middleware(reason)).await;
            }
        }

        let resolved = match self.resolve_arguments(&ctx, &command, &mut args).await {
            Ok(resolved) => resolved,
            Err(outcome) => return outcome,
        };

        info!(
            message_id = %ctx.message.id,
            command = %command.id(),
            label = %ctx.label,
            "invoking command"
        );
        command
            .handler()
            .run(&ctx, resolved)
            .await
            .map_err(|error| DispatchError::Handler {
                command: command.id().to_string(),
                error,
            })?;

        Ok(DispatchOutcome::Invoked)
    }

    /// Walk the declared parameters. `Err` carries the finished dispatch
    /// result when the walk aborts.
    async fn resolve_arguments(
        &self,
        ctx: &Context,
        command: &Command,
        args: &mut Args,
    ) -> Result<Arguments, Result<DispatchOutcome, DispatchError>> {
        let mut resolved = Arguments::new();
        let Some(signature) = command.signature() else {
            return Ok(resolved);
        };

        for param in signature.resolvable() {
            let Some(resolver) = self.resolvers.get(&param.kind) else {
                error!(
                    command = %command.id(),
                    kind = %param.kind,
                    "argument type resolver for type '{}' could not be found",
                    param.kind
                );
                return Err(Ok(DispatchOutcome::Misconfigured(param.kind.clone())));
            };

            let mark = args.position();
            let token = if param.rest { args.rest() } else { args.single() };
            let input = token.as_deref().filter(|t| !t.is_empty());

            match resolver.resolve(ctx, input).await {
                Some(value) => resolved.push(param.name.clone(), Some(value)),
                None if !param.optional => {
                    let rejection = if input.is_some() {
                        Rejection::InvalidValue {
                            param: param.name.clone(),
                            kind: param.kind.clone(),
                        }
                    } else {
                        Rejection::MissingArgument {
                            param: param.name.clone(),
                            kind: param.kind.clone(),
                        }
                    };
                    return Err(self.reject(ctx, rejection).await);
                }
                None => {
                    resolved.push(param.name.clone(), None);
                    match self.config.dispatch.optional_policy {
                        OptionalPolicy::ShortCircuit => break,
                        OptionalPolicy::Continue => args.rewind(mark),
                    }
                }
            }
        }

        Ok(resolved)
    }

    async fn reject(
        &self,
        ctx: &Context,
        rejection: Rejection,
    ) -> Result<DispatchOutcome, DispatchError> {
        debug!(
            message_id = %ctx.message.id,
            command = %ctx.command.id(),
            ?rejection,
            "invocation rejected"
        );
        ctx.reply(&rejection.message(&self.config.diagnostics.marker))
            .await?;
        Ok(DispatchOutcome::Rejected(rejection))
    }
}
