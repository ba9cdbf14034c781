//! `parley console` -- interactive session over stdin/stdout.

use std::path::Path;

use anyhow::Result;
use tracing::info;

use parley_channel::ConsoleChannel;

use crate::commands::{config, demo};

/// Run `parley console`.
pub async fn run(
    config_path: Option<&Path>,
    prefixes: Vec<String>,
    user: &str,
    admins: Vec<String>,
) -> Result<()> {
    let mut config = config::load(config_path)?;
    if !prefixes.is_empty() {
        config.prefixes = prefixes;
    }
    if config.prefixes.is_empty() {
        config.prefixes = vec!["!".to_string()];
    }
    let admins = if admins.is_empty() {
        vec![user.to_string()]
    } else {
        admins
    };

    info!(prefixes = ?config.prefixes, user, "starting console");
    let dispatcher = demo::framework(config, admins)?.into_dispatcher();
    let summary = parley_dispatch::run(ConsoleChannel::stdio(user), dispatcher).await;
    info!(
        received = summary.received,
        invoked = summary.invoked,
        "console closed"
    );
    Ok(())
}
