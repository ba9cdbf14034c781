//! Setup-phase builder.
//!
//! Commands, resolvers, middleware and prefixes are registered on a
//! [`Framework`], which is then frozen into a shared [`Dispatcher`]. Nothing
//! can be registered once dispatch has started.

use std::sync::Arc;

use parley_types::{ParleyConfig, ParleyError};
use tracing::info;

use crate::command::Command;
use crate::context::Context;
use crate::dispatcher::Dispatcher;
use crate::middleware::Middleware;
use crate::registry::{CommandRegistry, PrefixProvider};
use crate::resolver::{ResolverRegistry, TypeResolver};
use crate::value::{TypeTag, Value};

pub struct Framework {
    commands: CommandRegistry,
    resolvers: ResolverRegistry,
    middleware: Vec<Arc<dyn Middleware>>,
    config: ParleyConfig,
}

impl Framework {
    /// A framework with the built-in resolvers and the configured prefixes.
    pub fn new(config: ParleyConfig) -> Self {
        let mut commands = CommandRegistry::new();
        commands.set_prefix(config.prefixes.clone());
        Self {
            commands,
            resolvers: ResolverRegistry::with_builtins(),
            middleware: Vec::new(),
            config,
        }
    }

    pub fn register_command(&mut self, command: Command) -> Result<(), ParleyError> {
        self.commands.register(command)
    }

    pub fn register_resolver(
        &mut self,
        tag: TypeTag,
        resolver: impl TypeResolver + 'static,
    ) -> Result<(), ParleyError> {
        self.resolvers.register(tag, resolver)
    }

    pub fn register_resolver_fn<F>(&mut self, tag: TypeTag, f: F) -> Result<(), ParleyError>
    where
        F: Fn(&Context, Option<&str>) -> Option<Value> + Send + Sync + 'static,
    {
        self.resolvers.register_fn(tag, f)
    }

    /// Middleware runs in the order it was added.
    pub fn add_middleware(&mut self, middleware: impl Middleware + 'static) {
        self.middleware.push(Arc::new(middleware));
    }

    /// Replace the prefix configuration loaded from the config file.
    pub fn set_prefix(&mut self, prefix: impl Into<PrefixProvider>) {
        self.commands.set_prefix(prefix);
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

    pub fn into_dispatcher(self) -> Arc<Dispatcher> {
        info!(
            commands = self.commands.len(),
            resolvers = self.resolvers.tags().len(),
            middleware = self.middleware.len(),
            "dispatcher ready"
        );
        Arc::new(Dispatcher::new(
            self.commands,
            self.resolvers,
            self.middleware,
            self.config,
        ))
    }
}

impl Default for Framework {
    fn default() -> Self {
        Self::new(ParleyConfig::default())
    }
}
