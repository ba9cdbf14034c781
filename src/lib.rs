//! parley -- typed chat command dispatch.
//!
//! Facade over the workspace crates:
//!
//! - [`types`] -- configuration and registration errors
//! - [`channel`] -- the transport boundary (inbound messages, reply sinks)
//! - [`dispatch`] -- lexing, parsing, resolution and the dispatcher
//!
//! ```no_run
//! use parley::prelude::*;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let mut config = ParleyConfig::default();
//! config.prefixes = vec!["!".into()];
//!
//! let mut fw = Framework::new(config);
//! fw.register_command(
//!     Command::new("ping", handler_fn(|ctx, args| async move {
//!         let target = args.text("target").unwrap_or_default().to_string();
//!         ctx.reply(&format!("pong, {target}!")).await?;
//!         Ok(())
//!     }))
//!     .with_alias("ping")
//!     .with_signature(Signature::new().param(Parameter::new("target", TypeTag::TEXT))),
//! )?;
//!
//! run(ConsoleChannel::stdio("me"), fw.into_dispatcher()).await;
//! # Ok(())
//! # }
//! ```

pub use parley_channel as channel;
pub use parley_dispatch as dispatch;
pub use parley_types as types;

/// The types most command authors need.
pub mod prelude {
    pub use parley_channel::{Channel, ConsoleChannel, InboundMessage, MemoryChannel, ReplySink};
    pub use parley_dispatch::{
        handler_fn, run, Arguments, Command, Context, DispatchOutcome, Framework, Middleware,
        Parameter, PrefixProvider, Signature, TypeResolver, TypeTag, Value,
    };
    pub use parley_types::{OptionalPolicy, ParleyConfig, ParleyError};
}
