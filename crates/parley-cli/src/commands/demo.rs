//! Demo command set served by `parley console`.

use std::sync::Arc;

use anyhow::Result;
use rand::Rng;

use parley_dispatch::{
    handler_fn, Command, Framework, Parameter, RestrictedCommands, Signature, TypeTag,
};
use parley_types::ParleyConfig;

const DEFAULT_SIDES: f64 = 6.0;

/// A framework with every demo command registered.
pub fn framework(config: ParleyConfig, admins: Vec<String>) -> Result<Framework> {
    let mut fw = Framework::new(config);

    fw.register_command(ping())?;
    fw.register_command(echo())?;
    fw.register_command(say())?;
    fw.register_command(ban())?;
    fw.register_command(roll())?;

    let mut lines: Vec<String> = fw
        .commands()
        .iter()
        .map(|cmd| match cmd.description() {
            Some(desc) => format!("{} -- {desc}", cmd.usage()),
            None => cmd.usage(),
        })
        .collect();
    lines.push("help -- list commands".to_string());
    fw.register_command(help(lines.join("\n")))?;

    fw.add_middleware(RestrictedCommands::new(["ban"], admins));
    Ok(fw)
}

fn ping() -> Command {
    Command::new(
        "ping",
        handler_fn(|ctx, args| async move {
            let target = args.text("target").unwrap_or_default().to_string();
            ctx.reply(&format!("pong, {target}!")).await?;
            Ok(())
        }),
    )
    .with_alias("ping")
    .with_description("answer a ping")
    .with_signature(Signature::new().param(Parameter::new("target", TypeTag::TEXT)))
}

fn echo() -> Command {
    Command::new(
        "echo",
        handler_fn(|ctx, args| async move {
            let message = args.text("message").unwrap_or_default().to_string();
            ctx.reply(&message).await?;
            Ok(())
        }),
    )
    .with_alias("echo")
    .with_description("repeat the rest of the line")
    .with_signature(Signature::new().param(Parameter::new("message", TypeTag::TEXT).rest()))
}

fn say() -> Command {
    Command::new(
        "say",
        handler_fn(|ctx, args| async move {
            let mut words = args.text("words").unwrap_or_default().to_string();
            if ctx.flag("loud") {
                words = words.to_uppercase();
            }
            let reply = match ctx.option("to") {
                Some(to) => format!("{to}: {words}"),
                None => words,
            };
            ctx.reply(&reply).await?;
            Ok(())
        }),
    )
    .with_aliases(["say", "tell"])
    .with_description("speak, optionally --loud or --to=<name>")
    .with_signature(
        Signature::new()
            .param(Parameter::context())
            .param(Parameter::new("words", TypeTag::TEXT).rest())
            .option("to"),
    )
}

fn ban() -> Command {
    Command::new(
        "ban",
        handler_fn(|ctx, args| async move {
            let user = args.text("user").unwrap_or_default().to_string();
            if args.boolean("confirm") != Some(true) {
                ctx.reply(&format!("Not banning {user}.")).await?;
                return Ok(());
            }
            let reply = match args.text("reason") {
                Some(reason) => format!("Banned {user}: {reason}"),
                None => format!("Banned {user}."),
            };
            ctx.reply(&reply).await?;
            Ok(())
        }),
    )
    .with_alias("ban")
    .with_description("ban a user (restricted)")
    .with_signature(
        Signature::new()
            .param(Parameter::new("user", TypeTag::TEXT))
            .param(Parameter::new("confirm", TypeTag::BOOLEAN))
            .param(Parameter::new("reason", TypeTag::TEXT).optional().rest()),
    )
}

fn roll() -> Command {
    Command::new(
        "roll",
        handler_fn(|ctx, args| async move {
            let sides = args.number("sides").unwrap_or(DEFAULT_SIDES).trunc();
            if !(1.0..=f64::from(u32::MAX)).contains(&sides) {
                ctx.reply("Pick a positive number of sides.").await?;
                return Ok(());
            }
            let result = roll_die(sides as u32);
            ctx.reply(&format!("Rolled {result} (d{sides})")).await?;
            Ok(())
        }),
    )
    .with_aliases(["roll", "dice"])
    .with_description("roll a die, six-sided unless told otherwise")
    .with_signature(Signature::new().param(Parameter::new("sides", TypeTag::NUMBER).optional()))
}

fn help(text: String) -> Command {
    let text = Arc::new(text);
    Command::new(
        "help",
        handler_fn(move |ctx, _args| {
            let text = Arc::clone(&text);
            async move {
                ctx.reply(&text).await?;
                Ok(())
            }
        }),
    )
    .with_aliases(["help", "commands"])
    .with_signature(Signature::new())
}

/// A value in `1..=sides`.
fn roll_die(sides: u32) -> u32 {
    rand::thread_rng().gen_range(1..=sides.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_channel::{InboundMessage, RecordingSink};
    use parley_dispatch::DispatchOutcome;

    async fn send(text: &str, author: &str) -> (DispatchOutcome, Vec<String>) {
        let mut config = ParleyConfig::default();
        config.prefixes = vec!["!".into()];
        let dispatcher = framework(config, vec!["admin".into()])
            .unwrap()
            .into_dispatcher();
        let sink = Arc::new(RecordingSink::new());
        let msg = InboundMessage::new(text, sink.clone()).with_author(author);
        let outcome = dispatcher.handle_message(msg).await.unwrap();
        (outcome, sink.sent())
    }

    #[tokio::test]
    async fn ping_replies() {
        let (_, replies) = send("!ping world", "alice").await;
        assert_eq!(replies, vec!["pong, world!"]);
    }

    #[tokio::test]
    async fn say_with_flag_and_option() {
        let (_, replies) = send("!tell --loud --to=bob hello there", "alice").await;
        assert_eq!(replies, vec!["bob: HELLO THERE"]);
    }

    #[tokio::test]
    async fn ban_is_restricted() {
        let (outcome, replies) = send("!ban mallory yes", "alice").await;
        assert!(matches!(outcome, DispatchOutcome::Rejected(_)));
        assert_eq!(replies, vec![":warning: You are not allowed to use `ban`"]);

        let (_, replies) = send("!ban mallory yes being rude", "admin").await;
        assert_eq!(replies, vec!["Banned mallory: being rude"]);
    }

    #[tokio::test]
    async fn ban_declined() {
        let (_, replies) = send("!ban mallory no", "admin").await;
        assert_eq!(replies, vec!["Not banning mallory."]);
    }

    #[tokio::test]
    async fn roll_defaults_to_six() {
        let (_, replies) = send("!roll", "alice").await;
        assert_eq!(replies.len(), 1);
        assert!(replies[0].ends_with("(d6)"), "{}", replies[0]);
    }

    #[tokio::test]
    async fn help_lists_usage() {
        let (_, replies) = send("!help", "alice").await;
        let text = &replies[0];
        assert!(text.contains("ping <target> -- answer a ping"));
        assert!(text.contains("ban <user> <confirm> [reason...]"));
        assert!(text.contains("help -- list commands"));
    }

    #[test]
    fn die_stays_in_range() {
        for _ in 0..100 {
            let n = roll_die(3);
            assert!((1..=3).contains(&n));
        }
        assert_eq!(roll_die(1), 1);
    }
}
