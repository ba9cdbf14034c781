//! Core channel trait and types for inbound chat messages.
//!
//! A [`Channel`] implementation handles one messaging backend. Inbound
//! messages are received via [`Channel::recv`]; every [`InboundMessage`]
//! carries the [`ReplySink`] that answers back into the same conversation.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Errors from channel operations.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("channel shut down")]
    Shutdown,

    #[error("operation not supported: {0}")]
    NotSupported(String),

    #[error("{0}")]
    Other(String),
}

/// Sends text back into the conversation a message came from.
#[async_trait]
pub trait ReplySink: Send + Sync {
    /// Send a plain text reply.
    async fn send_text(&self, text: &str) -> Result<(), ChannelError>;
}

/// A message received from a chat backend.
///
/// Cloning is cheap: the reply sink is shared.
#[derive(Clone)]
pub struct InboundMessage {
    /// Locally assigned identifier, used for log correlation.
    pub id: Uuid,
    /// Raw message text.
    pub text: String,
    /// Display name of the author, if the backend reports one.
    pub author: Option<String>,
    /// Whether the author is a bot or other automated account.
    pub author_is_automated: bool,
    /// When the message was received.
    pub received_at: DateTime<Utc>,
    /// Where replies to this message go.
    pub reply: Arc<dyn ReplySink>,
}

impl InboundMessage {
    /// Create a message from a human author with a fresh ID.
    pub fn new(text: impl Into<String>, reply: Arc<dyn ReplySink>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            author: None,
            author_is_automated: false,
            received_at: Utc::now(),
            reply,
        }
    }

    /// Set the author name.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Mark the author as automated (or not).
    pub fn automated(mut self, automated: bool) -> Self {
        self.author_is_automated = automated;
        self
    }

    /// Reply into the originating conversation.
    pub async fn reply(&self, text: &str) -> Result<(), ChannelError> {
        self.reply.send_text(text).await
    }
}

impl fmt::Debug for InboundMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InboundMessage")
            .field("id", &self.id)
            .field("text", &self.text)
            .field("author", &self.author)
            .field("author_is_automated", &self.author_is_automated)
            .field("received_at", &self.received_at)
            .finish_non_exhaustive()
    }
}

/// Trait for an inbound messaging channel.
///
/// Each backend implements this trait. The dispatch runner drives the
/// receive loop and hands every message to the dispatcher.
#[async_trait]
pub trait Channel: Send + 'static {
    /// Receive the next inbound message, or `None` if nothing is pending.
    ///
    /// Returns [`ChannelError::Shutdown`] once the backend will produce no
    /// more messages.
    async fn recv(&mut self) -> Result<Option<InboundMessage>, ChannelError>;

    /// Human-readable name for this channel backend.
    fn name(&self) -> &str;
}
