//! In-process channel and reply sink.
//!
//! [`MemoryChannel`] is fed through a tokio mpsc sender, which makes it the
//! natural backend for embedding parley behind another event source and for
//! tests. [`RecordingSink`] keeps every reply in memory.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use crate::channel::{Channel, ChannelError, InboundMessage, ReplySink};

/// A reply sink that records every message it is asked to send.
#[derive(Debug, Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All replies sent so far, oldest first.
    pub fn sent(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Forget every recorded reply.
    pub fn clear(&self) {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

#[async_trait]
impl ReplySink for RecordingSink {
    async fn send_text(&self, text: &str) -> Result<(), ChannelError> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(text.to_string());
        Ok(())
    }
}

/// A channel whose messages are pushed in through an mpsc sender.
///
/// Shuts down once every sender has been dropped and the queue is drained.
#[derive(Debug)]
pub struct MemoryChannel {
    name: String,
    rx: mpsc::Receiver<InboundMessage>,
}

impl MemoryChannel {
    /// Create a channel and the sender that feeds it.
    pub fn new(name: impl Into<String>, capacity: usize) -> (Self, mpsc::Sender<InboundMessage>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self {
                name: name.into(),
                rx,
            },
            tx,
        )
    }

    /// Convenience: a shared recording sink for messages built by the caller.
    pub fn recording_sink() -> Arc<RecordingSink> {
        Arc::new(RecordingSink::new())
    }
}

#[async_trait]
impl Channel for MemoryChannel {
    async fn recv(&mut self) -> Result<Option<InboundMessage>, ChannelError> {
        match self.rx.recv().await {
            Some(message) => Ok(Some(message)),
            None => {
                debug!(channel = %self.name, "all senders dropped");
                Err(ChannelError::Shutdown)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
