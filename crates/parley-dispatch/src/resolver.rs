//! Type resolvers -- turn a raw token into a typed [`Value`].
//!
//! A [`TypeResolver`] is registered per [`TypeTag`] in a [`ResolverRegistry`].
//! Resolution may be asynchronous (a resolver might look up a referenced
//! entity); the dispatcher awaits each call before taking the next token.
//!
//! Built-in resolvers:
//! - `String`: any non-empty token, unchanged
//! - `Number`: numeric-literal coercion; zero counts as no value
//! - `Boolean`: `yes`/`true`/`y` and `no`/`false`/`n`, case-insensitive

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parley_types::ParleyError;
use tracing::{debug, error};

use crate::context::Context;
use crate::value::{TypeTag, Value};

const AFFIRMATIVE: [&str; 3] = ["yes", "true", "y"];
const NEGATIVE: [&str; 3] = ["no", "false", "n"];

/// Converts a raw token into a value of one semantic type.
#[async_trait]
pub trait TypeResolver: Send + Sync {
    /// Resolve `input`, or return `None` for "no value".
    ///
    /// `input` is `None` when the parameter had no token.
    async fn resolve(&self, ctx: &Context, input: Option<&str>) -> Option<Value>;
}

/// Adapter turning a synchronous closure into a [`TypeResolver`].
pub struct FnResolver<F>(pub F);

#[async_trait]
impl<F> TypeResolver for FnResolver<F>
where
    F: Fn(&Context, Option<&str>) -> Option<Value> + Send + Sync,
{
    async fn resolve(&self, ctx: &Context, input: Option<&str>) -> Option<Value> {
        (self.0)(ctx, input)
    }
}

/// Resolve plain text: any non-empty input passes through.
pub fn resolve_text(input: Option<&str>) -> Option<Value> {
    input
        .filter(|s| !s.is_empty())
        .map(|s| Value::Text(s.to_string()))
}

/// Resolve a number.
///
/// A token that parses to zero is indistinguishable from no value.
pub fn resolve_number(input: Option<&str>) -> Option<Value> {
    let n = parse_number(input?)?;
    if n == 0.0 {
        return None;
    }
    Some(Value::Number(n))
}

/// Resolve a yes/no answer.
pub fn resolve_boolean(input: Option<&str>) -> Option<Value> {
    let lowered = input?.to_lowercase();
    if AFFIRMATIVE.contains(&lowered.as_str()) {
        Some(Value::Boolean(true))
    } else if NEGATIVE.contains(&lowered.as_str()) {
        Some(Value::Boolean(false))
    } else {
        None
    }
}

/// Numeric-literal coercion.
///
/// Accepts surrounding whitespace, signed decimal and exponent forms,
/// unsigned `0x`/`0o`/`0b` integer literals and the `Infinity` spellings.
/// An empty (or all-whitespace) string is zero. Returns `None` for anything
/// that is not a number.
pub fn parse_number(input: &str) -> Option<f64> {
    let s = input.trim();
    if s.is_empty() {
        return Some(0.0);
    }

    match s {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    for (marker, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        let lower = s.get(..2).map(str::to_ascii_lowercase);
        if lower.as_deref() == Some(marker) {
            let digits = &s[2..];
            if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
                return None;
            }
            return u128::from_str_radix(digits, radix).ok().map(|n| n as f64);
        }
    }

    if !s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| !n.is_nan())
}

struct TextResolver;

#[async_trait]
impl TypeResolver for TextResolver {
    async fn resolve(&self, _ctx: &Context, input: Option<&str>) -> Option<Value> {
        resolve_text(input)
    }
}

struct NumberResolver;

#[async_trait]
impl TypeResolver for NumberResolver {
    async fn resolve(&self, _ctx: &Context, input: Option<&str>) -> Option<Value> {
        resolve_number(input)
    }
}

struct BooleanResolver;

#[async_trait]
impl TypeResolver for BooleanResolver {
    async fn resolve(&self, _ctx: &Context, input: Option<&str>) -> Option<Value> {
        resolve_boolean(input)
    }
}

/// Resolvers keyed by type tag. At most one resolver per tag.
#[derive(Default)]
pub struct ResolverRegistry {
    resolvers: HashMap<TypeTag, Arc<dyn TypeResolver>>,
}

impl ResolverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the `String`, `Number` and `Boolean` resolvers.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .resolvers
            .insert(TypeTag::TEXT, Arc::new(TextResolver));
        registry
            .resolvers
            .insert(TypeTag::NUMBER, Arc::new(NumberResolver));
        registry
            .resolvers
            .insert(TypeTag::BOOLEAN, Arc::new(BooleanResolver));
        registry
    }

    /// Register a resolver. A second resolver for the same tag is rejected
    /// and the first one stays in place.
    pub fn register(
        &mut self,
        tag: TypeTag,
        resolver: impl TypeResolver + 'static,
    ) -> Result<(), ParleyError> {
        if self.resolvers.contains_key(&tag) {
            error!(kind = %tag, "argument type '{tag}' already added");
            return Err(ParleyError::DuplicateResolver(tag.to_string()));
        }
        debug!(kind = %tag, "registered argument type");
        self.resolvers.insert(tag, Arc::new(resolver));
        Ok(())
    }

    /// Register a synchronous closure as a resolver.
    pub fn register_fn<F>(&mut self, tag: TypeTag, f: F) -> Result<(), ParleyError>
    where
        F: Fn(&Context, Option<&str>) -> Option<Value> + Send + Sync + 'static,
    {
        self.register(tag, FnResolver(f))
    }

    pub fn get(&self, tag: &TypeTag) -> Option<Arc<dyn TypeResolver>> {
        self.resolvers.get(tag).cloned()
    }

    pub fn contains(&self, tag: &TypeTag) -> bool {
        self.resolvers.contains_key(tag)
    }

    /// Registered tags, sorted by name.
    pub fn tags(&self) -> Vec<&TypeTag> {
        let mut tags: Vec<&TypeTag> = self.resolvers.keys().collect();
        tags.sort();
        tags
    }

    /// Resolve `input` as `tag`.
    pub async fn resolve(
        &self,
        tag: &TypeTag,
        ctx: &Context,
        input: Option<&str>,
    ) -> Result<Option<Value>, ParleyError> {
        let resolver = self
            .resolvers
            .get(tag)
            .ok_or_else(|| ParleyError::UnknownType(tag.to_string()))?;
        Ok(resolver.resolve(ctx, input).await)
    }
}
