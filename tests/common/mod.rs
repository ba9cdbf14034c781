//! Shared helpers for integration tests.
//!
//! Each integration test file compiles common/ as its own module, so not
//! every helper is used in every file.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use parley::channel::{InboundMessage, RecordingSink};
use parley::dispatch::{handler_fn, Arguments, Command, DispatchOutcome, Dispatcher, Signature};
use parley::types::ParleyConfig;

/// Arguments captured from each handler invocation.
pub type Calls = Arc<Mutex<Vec<Arguments>>>;

/// Default config with `!` as the only prefix.
pub fn bang_config() -> ParleyConfig {
    let mut config = ParleyConfig::default();
    config.prefixes = vec!["!".into()];
    config
}

/// A command whose handler records the arguments it was given.
pub fn recording_command(id: &str, signature: Signature) -> (Command, Calls) {
    let calls: Calls = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&calls);
    let command = Command::new(
        id,
        handler_fn(move |_ctx, args| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().expect("calls lock poisoned").push(args);
                Ok(())
            }
        }),
    )
    .with_alias(id)
    .with_signature(signature);
    (command, calls)
}

/// A message from a human author, with its own recording sink.
pub fn message(text: &str) -> (InboundMessage, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let msg = InboundMessage::new(text, sink.clone()).with_author("tester");
    (msg, sink)
}

/// Dispatch `text` and return the outcome with every reply it produced.
pub async fn send(dispatcher: &Dispatcher, text: &str) -> (DispatchOutcome, Vec<String>) {
    let (msg, sink) = message(text);
    let outcome = dispatcher
        .handle_message(msg)
        .await
        .expect("dispatch should not fail");
    (outcome, sink.sent())
}

/// Number of times a recording command ran.
pub fn call_count(calls: &Calls) -> usize {
    calls.lock().expect("calls lock poisoned").len()
}
