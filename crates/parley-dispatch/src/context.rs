//! Per-dispatch invocation context and the resolved argument list.

use std::fmt;
use std::sync::Arc;

use parley_channel::{ChannelError, InboundMessage};

use crate::args::Options;
use crate::command::Command;
use crate::value::Value;

/// Everything a handler or resolver may need about the current invocation.
///
/// Created by the dispatcher once a label matches a command and dropped
/// when the dispatch finishes. No two dispatches share a context.
#[derive(Clone)]
pub struct Context {
    /// The message that triggered the dispatch.
    pub message: InboundMessage,
    /// The label as the user typed it.
    pub label: String,
    /// The matched command.
    pub command: Arc<Command>,
    /// The prefix that matched.
    pub prefix: String,
    /// Flags and options parsed from the message.
    pub options: Options,
}

impl Context {
    /// Reply into the conversation the message came from.
    pub async fn reply(&self, text: &str) -> Result<(), ChannelError> {
        self.message.reply(text).await
    }

    /// Whether the flag `name` was passed.
    pub fn flag(&self, name: &str) -> bool {
        self.options.flag(name)
    }

    /// The last value passed for option `name`.
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options.option(name)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("message", &self.message)
            .field("label", &self.label)
            .field("command", &self.command.id())
            .field("prefix", &self.prefix)
            .field("options", &self.options)
            .finish()
    }
}

/// Resolved arguments in parameter order.
///
/// Each entry is a parameter name with its value, or `None` when an
/// optional parameter had no value. Parameters after an unresolved optional
/// one may be missing entirely under the short-circuit policy; lookups treat
/// both cases as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    entries: Vec<(String, Option<Value>)>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, name: impl Into<String>, value: Option<Value>) {
        self.entries.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_ref())
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_text)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_number)
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// Whether `name` has no value, either recorded as absent or never attempted.
    pub fn is_absent(&self, name: &str) -> bool {
        self.get(name).is_none()
    }

    /// Number of parameters the dispatcher attempted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_ref()))
    }
}

#[cfg(test)]
pub(crate) fn test_context() -> (Context, Arc<parley_channel::RecordingSink>) {
    use crate::command::{handler_fn, Signature};

    let sink = Arc::new(parley_channel::RecordingSink::new());
    let command = Command::new("test", handler_fn(|_ctx, _args| async { Ok(()) }))
        .with_alias("test")
        .with_signature(Signature::new());
    let ctx = Context {
        message: InboundMessage::new("!test", sink.clone()),
        label: "test".into(),
        command: Arc::new(command),
        prefix: "!".into(),
        options: Options::default(),
    };
    (ctx, sink)
}
