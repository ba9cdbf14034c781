//! Command lexing, argument parsing, typed resolution and dispatch.
//!
//! A message such as `!ban "Mr Smith" yes --silent` goes through:
//!
//! - [`Lexer`] -- prefix-relative label plus quote-aware tokens
//! - [`UnorderedStrategy`] -- splits `--flags` and `--name=value` options out
//! - [`Args`] -- sequential cursor over the remaining positional tokens
//! - [`ResolverRegistry`] / [`TypeResolver`] -- token to typed [`Value`]
//! - [`CommandRegistry`] / [`Command`] -- alias lookup and signatures
//! - [`Middleware`] -- pre-invocation checks
//! - [`Dispatcher`] -- the per-message algorithm
//! - [`Framework`] -- setup-phase builder that produces the dispatcher
//! - [`runner::run`] -- pumps a channel into a dispatcher

pub mod args;
pub mod command;
pub mod context;
pub mod dispatcher;
pub mod framework;
pub mod lexer;
pub mod middleware;
pub mod parser;
pub mod registry;
pub mod resolver;
pub mod runner;
pub mod value;

pub use args::{Args, Options};
pub use command::{handler_fn, Command, CommandHandler, FnHandler, Parameter, Signature};
pub use context::{Arguments, Context};
pub use dispatcher::{DispatchError, DispatchOutcome, Dispatcher, Rejection};
pub use framework::Framework;
pub use lexer::{LexError, Lexer, PendingTokens, Token};
pub use middleware::{FnMiddleware, Middleware, RestrictedCommands};
pub use parser::{ParserOutput, UnorderedStrategy};
pub use registry::{CommandRegistry, PrefixProvider};
pub use resolver::{FnResolver, ResolverRegistry, TypeResolver};
pub use runner::{run, RunSummary};
pub use value::{TypeTag, Value};
