//! Pre-invocation checks.
//!
//! Middleware runs after the invocation context exists and before any
//! argument is resolved. Returning `Err(reason)` rejects the invocation;
//! the reason is sent to the conversation as a diagnostic.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::context::Context;

#[async_trait]
pub trait Middleware: Send + Sync {
    /// Allow (`Ok`) or reject (`Err` with a user-facing reason) an invocation.
    async fn check(&self, ctx: &Context) -> Result<(), String>;

    /// Name used in logs.
    fn name(&self) -> &str {
        "middleware"
    }
}

/// Adapter turning a synchronous closure into [`Middleware`].
pub struct FnMiddleware<F> {
    name: String,
    f: F,
}

impl<F> FnMiddleware<F>
where
    F: Fn(&Context) -> Result<(), String> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

#[async_trait]
impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(&Context) -> Result<(), String> + Send + Sync,
{
    async fn check(&self, ctx: &Context) -> Result<(), String> {
        (self.f)(ctx)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Restricts selected commands to a set of authors.
#[derive(Debug, Clone, Default)]
pub struct RestrictedCommands {
    commands: HashSet<String>,
    authors: HashSet<String>,
}

impl RestrictedCommands {
    pub fn new<C, A>(commands: C, authors: A) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        Self {
            commands: commands.into_iter().map(Into::into).collect(),
            authors: authors.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl Middleware for RestrictedCommands {
    async fn check(&self, ctx: &Context) -> Result<(), String> {
        if !self.commands.contains(ctx.command.id()) {
            return Ok(());
        }
        match ctx.message.author.as_deref() {
            Some(author) if self.authors.contains(author) => Ok(()),
            _ => Err(format!(
                "You are not allowed to use `{}`",
                ctx.command.id()
            )),
        }
    }

    fn name(&self) -> &str {
        "restricted-commands"
    }
}
