//! Transport boundary for the parley command framework.
//!
//! parley does not speak to any chat backend itself. A backend implements
//! [`Channel`] to deliver [`InboundMessage`]s, each of which carries the
//! [`ReplySink`] used to answer into the same conversation.
//!
//! - [`channel`]: core trait and message types
//! - [`console`]: line-oriented channel over any async reader/writer
//! - [`memory`]: mpsc-fed channel and a recording reply sink

pub mod channel;
pub mod console;
pub mod memory;

pub use channel::{Channel, ChannelError, InboundMessage, ReplySink};
pub use console::{ConsoleChannel, ConsoleSink};
pub use memory::{MemoryChannel, RecordingSink};
