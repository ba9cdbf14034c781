//! Command descriptors -- identity, aliases, parameter signature, handler.
//!
//! A command author declares the signature explicitly:
//!
//! ```
//! use parley_dispatch::command::{handler_fn, Command, Parameter, Signature};
//! use parley_dispatch::value::TypeTag;
//!
//! let echo = Command::new("echo", handler_fn(|ctx, args| async move {
//!     let text = args.text("message").unwrap_or_default().to_string();
//!     ctx.reply(&text).await?;
//!     Ok(())
//! }))
//! .with_aliases(["echo", "say"])
//! .with_signature(Signature::new().param(Parameter::new("message", TypeTag::TEXT).rest()));
//!
//! assert_eq!(echo.id(), "echo");
//! ```

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::{Arguments, Context};
use crate::value::TypeTag;

/// A declared command parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Name used in diagnostics and for [`Arguments`] lookup.
    pub name: String,
    /// Semantic type; selects the resolver.
    pub kind: TypeTag,
    /// Whether the command can run without this argument.
    pub optional: bool,
    /// Whether this parameter consumes every remaining positional token.
    pub rest: bool,
}

impl Parameter {
    /// A required, single-token parameter.
    pub fn new(name: impl Into<String>, kind: TypeTag) -> Self {
        Self {
            name: name.into(),
            kind,
            optional: false,
            rest: false,
        }
    }

    /// A parameter receiving the invocation context.
    pub fn context() -> Self {
        Self::new("context", TypeTag::CONTEXT)
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn rest(mut self) -> Self {
        self.rest = true;
        self
    }
}

/// The ordered parameter list of a command, plus the option names that
/// take a separate value token (`--reason spam`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    params: Vec<Parameter>,
    options: Vec<String>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    /// Declare an option that takes a value.
    pub fn option(mut self, name: impl Into<String>) -> Self {
        self.options.push(name.into());
        self
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Parameters resolved from tokens, i.e. everything but the context.
    pub fn resolvable(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter().filter(|p| !p.kind.is_context())
    }

    /// Check that parameter names are unique and that at most one rest
    /// parameter exists, in last position.
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for param in self.resolvable() {
            if !seen.insert(param.name.as_str()) {
                return Err(format!("duplicate parameter `{}`", param.name));
            }
        }

        let resolvable: Vec<&Parameter> = self.resolvable().collect();
        let rest_count = resolvable.iter().filter(|p| p.rest).count();
        if rest_count > 1 {
            return Err(format!(
                "at most one rest parameter is allowed, found {rest_count}"
            ));
        }
        if let Some(position) = resolvable.iter().position(|p| p.rest) {
            if position + 1 != resolvable.len() {
                return Err(format!(
                    "rest parameter `{}` must be last",
                    resolvable[position].name
                ));
            }
        }
        Ok(())
    }
}

/// Runs a command once its arguments are resolved.
///
/// Errors are the handler's own; the dispatcher hands them to the caller
/// unchanged.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn run(&self, ctx: &Context, args: Arguments) -> anyhow::Result<()>;
}

/// Adapter turning an async closure into a [`CommandHandler`].
pub struct FnHandler<F>(F);

/// Wrap an async closure as a command handler.
///
/// The closure receives an owned clone of the context.
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Context, Arguments) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    FnHandler(f)
}

#[async_trait]
impl<F, Fut> CommandHandler for FnHandler<F>
where
    F: Fn(Context, Arguments) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    async fn run(&self, ctx: &Context, args: Arguments) -> anyhow::Result<()> {
        (self.0)(ctx.clone(), args).await
    }
}

/// An immutable command descriptor.
///
/// A command without a signature is incomplete and is rejected by the
/// registry; a command that takes no arguments declares `Signature::new()`.
#[derive(Clone)]
pub struct Command {
    id: String,
    aliases: Vec<String>,
    description: Option<String>,
    signature: Option<Signature>,
    handler: Arc<dyn CommandHandler>,
}

impl Command {
    pub fn new(id: impl Into<String>, handler: impl CommandHandler + 'static) -> Self {
        Self {
            id: id.into(),
            aliases: Vec::new(),
            description: None,
            signature: None,
            handler: Arc::new(handler),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_aliases<I>(mut self, aliases: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    pub fn handler(&self) -> &Arc<dyn CommandHandler> {
        &self.handler
    }

    /// Case-insensitive alias match.
    pub fn matches_label(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        self.aliases.iter().any(|alias| alias.to_lowercase() == label)
    }

    /// A usage line such as `echo <message...> [count]`.
    pub fn usage(&self) -> String {
        let name = self.aliases.first().unwrap_or(&self.id);
        let mut usage = name.clone();
        if let Some(signature) = &self.signature {
            for param in signature.resolvable() {
                let dots = if param.rest { "..." } else { "" };
                if param.optional {
                    usage.push_str(&format!(" [{}{dots}]", param.name));
                } else {
                    usage.push_str(&format!(" <{}{dots}>", param.name));
                }
            }
        }
        usage
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("id", &self.id)
            .field("aliases", &self.aliases)
            .field("description", &self.description)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> impl CommandHandler {
        handler_fn(|_ctx, _args| async { Ok(()) })
    }

    #[test]
    fn parameter_builders() {
        let p = Parameter::new("count", TypeTag::NUMBER).optional();
        assert!(p.optional);
        assert!(!p.rest);
        let r = Parameter::new("text", TypeTag::TEXT).rest();
        assert!(r.rest);
        assert!(Parameter::context().kind.is_context());
    }

    #[test]
    fn resolvable_skips_context() {
        let sig = Signature::new()
            .param(Parameter::context())
            .param(Parameter::new("target", TypeTag::TEXT));
        let names: Vec<&str> = sig.resolvable().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["target"]);
        assert_eq!(sig.params().len(), 2);
    }

    #[test]
    fn validate_accepts_trailing_rest() {
        let sig = Signature::new()
            .param(Parameter::new("user", TypeTag::TEXT))
            .param(Parameter::new("reason", TypeTag::TEXT).rest().optional());
        assert!(sig.validate().is_ok());
    }

    #[test]
    fn validate_rejects_rest_not_last() {
        let sig = Signature::new()
            .param(Parameter::new("words", TypeTag::TEXT).rest())
            .param(Parameter::new("count", TypeTag::NUMBER));
        let err = sig.validate().unwrap_err();
        assert_eq!(err, "rest parameter `words` must be last");
    }

    #[test]
    fn validate_rejects_two_rest_parameters() {
        let sig = Signature::new()
            .param(Parameter::new("a", TypeTag::TEXT).rest())
            .param(Parameter::new("b", TypeTag::TEXT).rest());
        assert!(sig.validate().unwrap_err().contains("at most one rest"));
    }

    #[test]
    fn validate_ignores_context_after_rest() {
        let sig = Signature::new()
            .param(Parameter::new("words", TypeTag::TEXT).rest())
            .param(Parameter::context());
        assert!(sig.validate().is_ok());
    }

    #[test]
    fn validate_rejects_duplicate_names() {
        let sig = Signature::new()
            .param(Parameter::new("x", TypeTag::TEXT))
            .param(Parameter::new("x", TypeTag::NUMBER));
        assert_eq!(sig.validate().unwrap_err(), "duplicate parameter `x`");
    }

    #[test]
    fn label_match_is_case_insensitive() {
        let cmd = Command::new("foo", noop()).with_alias("Foo");
        assert!(cmd.matches_label("foo"));
        assert!(cmd.matches_label("FOO"));
        assert!(cmd.matches_label("Foo"));
        assert!(!cmd.matches_label("fo"));
    }

    #[test]
    fn usage_line() {
        let cmd = Command::new("ban", noop())
            .with_aliases(["ban", "b"])
            .with_signature(
                Signature::new()
                    .param(Parameter::context())
                    .param(Parameter::new("user", TypeTag::TEXT))
                    .param(Parameter::new("reason", TypeTag::TEXT).optional().rest()),
            );
        assert_eq!(cmd.usage(), "ban <user> [reason...]");
    }

    #[test]
    fn debug_shows_identity() {
        let cmd = Command::new("ping", noop()).with_description("Check latency");
        let rendered = format!("{cmd:?}");
        assert!(rendered.contains("ping"));
        assert!(rendered.contains("Check latency"));
        assert_eq!(cmd.description(), Some("Check latency"));
        assert!(cmd.signature().is_none());
    }
}
