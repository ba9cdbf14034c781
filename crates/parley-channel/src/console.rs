//! Line-oriented console channel.
//!
//! Every input line is one inbound message; replies are written to the
//! output stream, one per line. Used by the `parley console` command with
//! stdin/stdout, and in tests with in-memory buffers.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::channel::{Channel, ChannelError, InboundMessage, ReplySink};

/// Reply sink that writes each reply as a line to a shared writer.
pub struct ConsoleSink<W> {
    writer: Mutex<W>,
}

impl<W> ConsoleSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consume the sink and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W> ReplySink for ConsoleSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send_text(&self, text: &str) -> Result<(), ChannelError> {
        let mut writer = self.writer.lock().await;
        writer.write_all(text.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        Ok(())
    }
}

/// A channel reading messages line by line.
pub struct ConsoleChannel<R, W> {
    reader: R,
    sink: Arc<ConsoleSink<W>>,
    author: String,
    line: String,
}

impl<R, W> ConsoleChannel<R, W>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(reader: R, writer: W, author: impl Into<String>) -> Self {
        Self {
            reader,
            sink: Arc::new(ConsoleSink::new(writer)),
            author: author.into(),
            line: String::new(),
        }
    }

    /// The sink replies are written to.
    pub fn sink(&self) -> Arc<ConsoleSink<W>> {
        Arc::clone(&self.sink)
    }
}

impl ConsoleChannel<BufReader<tokio::io::Stdin>, tokio::io::Stdout> {
    /// A console channel on the process's stdin and stdout.
    pub fn stdio(author: impl Into<String>) -> Self {
        Self::new(
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
            author,
        )
    }
}

#[async_trait]
impl<R, W> Channel for ConsoleChannel<R, W>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn recv(&mut self) -> Result<Option<InboundMessage>, ChannelError> {
        self.line.clear();
        let read = match self.reader.read_line(&mut self.line).await {
            Ok(read) => read,
            Err(e) => {
                warn!(channel = "console", "failed to read input: {e}");
                return Err(e.into());
            }
        };
        if read == 0 {
            debug!(channel = "console", "input closed");
            return Err(ChannelError::Shutdown);
        }

        let text = self.line.trim_end_matches(['\r', '\n']);
        if text.trim().is_empty() {
            return Ok(None);
        }

        let sink: Arc<dyn ReplySink> = self.sink.clone();
        Ok(Some(
            InboundMessage::new(text, sink).with_author(self.author.clone()),
        ))
    }

    fn name(&self) -> &str {
        "console"
    }
}
