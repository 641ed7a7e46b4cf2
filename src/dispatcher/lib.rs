//! Command dispatch for the `/vbot` Slack bot.
//!
//! Maps a normalized [`InboundEvent`] to the canned [`OutboundMessage`] the bot
//! answers with. Nothing in here performs I/O; delivering the reply is the
//! receiver's job.

mod dispatch;
pub mod messages;
mod types;

pub use dispatch::{Dispatcher, VBOT_COMMAND};
pub use messages::Templates;
pub use types::*;
