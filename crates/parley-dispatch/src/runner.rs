//! Drives a [`Channel`] into a [`Dispatcher`].
//!
//! Each inbound message is dispatched on its own task, so a slow handler
//! never blocks the receive loop. The loop ends when the channel reports
//! shutdown; in-flight dispatches are awaited before returning.

use std::sync::Arc;
use std::time::Duration;

use parley_channel::{Channel, ChannelError};
use tokio::task::{JoinError, JoinSet};
use tracing::{info, warn};

use crate::dispatcher::{DispatchError, DispatchOutcome, Dispatcher};

type DispatchResult = Result<DispatchOutcome, DispatchError>;

/// Backoff after a transient receive error.
const RECV_ERROR_BACKOFF: Duration = Duration::from_millis(250);

/// Pause after a receive that found nothing pending, so polling channels
/// leave room for in-flight dispatches.
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Counters reported when the runner stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub received: usize,
    pub invoked: usize,
    pub rejected: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, result: Result<DispatchResult, JoinError>) {
        match result {
            Ok(Ok(DispatchOutcome::Invoked)) => self.invoked += 1,
            Ok(Ok(DispatchOutcome::Rejected(_))) => self.rejected += 1,
            Ok(Ok(DispatchOutcome::NotACommand | DispatchOutcome::Misconfigured(_))) => {}
            Ok(Err(e)) => {
                warn!("dispatch failed: {e}");
                self.failed += 1;
            }
            Err(e) => {
                warn!("dispatch task panicked: {e}");
                self.failed += 1;
            }
        }
    }
}

/// Receive from `channel` until it shuts down.
pub async fn run<C: Channel>(mut channel: C, dispatcher: Arc<Dispatcher>) -> RunSummary {
    let name = channel.name().to_string();
    let mut tasks = JoinSet::new();
    let mut summary = RunSummary::default();

    info!(channel = %name, "channel starting");

    loop {
        while let Some(result) = tasks.try_join_next() {
            summary.record(result);
        }

        match channel.recv().await {
            Ok(Some(message)) => {
                summary.received += 1;
                let dispatcher = Arc::clone(&dispatcher);
                tasks.spawn(async move { dispatcher.handle_message(message).await });
            }
            Ok(None) => tokio::time::sleep(IDLE_POLL_INTERVAL).await,
            Err(ChannelError::Shutdown) => {
                info!(channel = %name, "channel shut down");
                break;
            }
            Err(e) => {
                warn!(channel = %name, "channel recv error: {e}");
                tokio::time::sleep(RECV_ERROR_BACKOFF).await;
            }
        }
    }

    while let Some(result) = tasks.join_next().await {
        summary.record(result);
    }

    info!(
        channel = %name,
        received = summary.received,
        invoked = summary.invoked,
        rejected = summary.rejected,
        failed = summary.failed,
        "channel stopped"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{handler_fn, Command, Parameter, Signature};
    use crate::framework::Framework;
    use crate::value::TypeTag;
    use async_trait::async_trait;
    use parley_channel::{InboundMessage, MemoryChannel};
    use parley_types::ParleyConfig;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn dispatcher() -> Arc<Dispatcher> {
        let mut config = ParleyConfig::default();
        config.prefixes = vec!["!".into()];
        let mut fw = Framework::new(config);
        fw.register_command(
            Command::new(
                "echo",
                handler_fn(|ctx, args| async move {
                    let text = args.text("message").unwrap_or_default().to_string();
                    ctx.reply(&text).await?;
                    Ok(())
                }),
            )
            .with_alias("echo")
            .with_signature(
                Signature::new().param(Parameter::new("message", TypeTag::TEXT).rest()),
            ),
        )
        .unwrap();
        fw.register_command(
            Command::new(
                "fail",
                handler_fn(|_ctx, _args| async { Err::<(), _>(anyhow::anyhow!("nope")) }),
            )
            .with_alias("fail")
            .with_signature(Signature::new()),
        )
        .unwrap();
        fw.into_dispatcher()
    }

    #[tokio::test]
    async fn runs_until_shutdown() {
        let (channel, tx) = MemoryChannel::new("memory", 8);
        let sink = MemoryChannel::recording_sink();

        tx.send(InboundMessage::new("!echo hello world", sink.clone()))
            .await
            .unwrap();
        tx.send(InboundMessage::new("just chatting", sink.clone()))
            .await
            .unwrap();
        tx.send(InboundMessage::new("!echo", sink.clone()))
            .await
            .unwrap();
        tx.send(InboundMessage::new("!fail", sink.clone()))
            .await
            .unwrap();
        drop(tx);

        let summary = run(channel, dispatcher()).await;
        assert_eq!(
            summary,
            RunSummary {
                received: 4,
                invoked: 1,
                rejected: 1,
                failed: 1,
            }
        );

        let mut sent = sink.sent();
        sent.sort();
        assert_eq!(
            sent,
            vec![
                ":warning: Missing required argument `message` (`String`)".to_string(),
                "hello world".to_string(),
            ]
        );
    }

    struct FlakyChannel {
        errors_left: usize,
    }

    #[async_trait]
    impl Channel for FlakyChannel {
        async fn recv(&mut self) -> Result<Option<InboundMessage>, ChannelError> {
            if self.errors_left == 0 {
                return Err(ChannelError::Shutdown);
            }
            self.errors_left -= 1;
            Err(ChannelError::Other("transient".into()))
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    /// Yields one message, then reports nothing pending until the message
    /// has been handled (or the poll budget runs out).
    struct PollingChannel {
        pending: Option<InboundMessage>,
        handled: Arc<AtomicBool>,
        polls_left: usize,
    }

    #[async_trait]
    impl Channel for PollingChannel {
        async fn recv(&mut self) -> Result<Option<InboundMessage>, ChannelError> {
            if let Some(message) = self.pending.take() {
                return Ok(Some(message));
            }
            if self.handled.load(Ordering::SeqCst) || self.polls_left == 0 {
                return Err(ChannelError::Shutdown);
            }
            self.polls_left -= 1;
            Ok(None)
        }

        fn name(&self) -> &str {
            "polling"
        }
    }

    #[tokio::test]
    async fn idle_polls_let_dispatches_run() {
        let handled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&handled);

        let mut fw = Framework::new({
            let mut config = ParleyConfig::default();
            config.prefixes = vec!["!".into()];
            config
        });
        fw.register_command(
            Command::new(
                "ping",
                handler_fn(move |_ctx, _args| {
                    let flag = Arc::clone(&flag);
                    async move {
                        flag.store(true, Ordering::SeqCst);
                        Ok(())
                    }
                }),
            )
            .with_alias("ping")
            .with_signature(Signature::new()),
        )
        .unwrap();

        let channel = PollingChannel {
            pending: Some(InboundMessage::new("!ping", MemoryChannel::recording_sink())),
            handled: Arc::clone(&handled),
            polls_left: 1_000,
        };
        let summary = run(channel, fw.into_dispatcher()).await;

        assert!(handled.load(Ordering::SeqCst));
        assert_eq!(summary.invoked, 1);
    }

    #[tokio::test]
    async fn transient_errors_do_not_stop_the_loop() {
        let summary = run(FlakyChannel { errors_left: 2 }, dispatcher()).await;
        assert_eq!(summary, RunSummary::default());
    }
}
