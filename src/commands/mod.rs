//! Bot command parsing and execution.
//!
//! This module turns chat messages addressed to the bot into [`command::Command`]
//! values and runs them.
//!
//! # Overview
//!
//! 1. **Parsing** - [`Commander::parse`] recognises `!herald <subcommand> [args...]`
//! 2. **Execution** - [`Commander::parse_command`] routes the command to its handler
//! 3. **Response** - handlers answer with a [`Document`], paginated when sent
//!
//! Interactive commands (`shutdown`, `hide`) talk to the user themselves through
//! the [`Conversation`] of the context and wait for answers.
//!
//! # Architecture
//!
//! ```text
//! Chat message
//!      │
//!      ▼
//! ┌─────────────┐  parse()          ┌──────────────────┐
//! │  Commander  │ ────────────────► │ command::Command │
//! └─────────────┘                   └──────────────────┘
//!      │ parse_command()
//!      ▼
//! ┌────────────────────────────────┐
//! │ Action handlers                │
//! │  help, ping, about, roll,      │
//! │  random, percent, pagetest,    │
//! │  hide, shutdown                │
//! └────────────────────────────────┘
//!      │
//!      ▼
//! ┌────────────────────────────┐
//! │ CommandResult              │
//! │  - response (Document)     │
//! │  - shutdown request        │
//! └────────────────────────────┘
//! ```
//!
//! # Error Handling
//!
//! - [`CommandParseError::NotForBot`]: the message is not a command for the
//!   bot. No answer is sent.
//! - [`CommandParseError::InvalidCommand`]: unknown subcommand or invalid
//!   arguments, answered with an error document.

use std::{sync::Arc, time::Duration};

use crate::{exchange::SecretExchange, pagination::Document, response::Conversation};

mod actions;
pub mod command;
mod commander;
pub mod responses;

pub use crate::commands::commander::Commander;

/// Runtime context for command execution.
///
/// # Fields
///
/// * `conversation` - Answers go to the room of the command, and prompts
///   wait for its author
/// * `exchange` - The secret exchange shared by every room
/// * `message_id` - Event id of the message holding the command
/// * `is_direct` - Whether the command was sent in a direct chat
/// * `is_owner` - Whether the author is one of the bot owners
/// * `confirm_timeout` - How long yes/no prompts wait
/// * `exchange_timeout` - How long a secret exchange runs
#[derive(Clone)]
pub struct CommandContext {
    pub conversation: Conversation,
    pub exchange: Arc<SecretExchange>,
    pub message_id: String,
    pub is_direct: bool,
    pub is_owner: bool,
    pub confirm_timeout: Duration,
    pub exchange_timeout: Duration,
}

/// Result of command execution.
///
/// Handlers don't stop the bot themselves, they ask for it with `shutdown`.
#[derive(Debug, Default, PartialEq)]
pub struct CommandResult {
    /// Document to send in the room of the command
    pub response: Option<Document>,
    /// Whether the bot must shut down
    pub shutdown: bool,
}

impl CommandResult {
    /// A result that only answers with `document`.
    pub fn reply(document: Document) -> Self {
        CommandResult {
            response: Some(document),
            shutdown: false,
        }
    }

    /// A result with nothing left to send.
    pub fn silent() -> Self {
        CommandResult::default()
    }
}

/// Errors that can occur during command parsing.
///
/// # Variants
///
/// * `NotForBot` - Message is not a command or is for a different bot.
///   Handled silently.
/// * `InvalidCommand` - Unknown subcommand or invalid arguments, with the
///   document to answer.
#[derive(Debug)]
pub enum CommandParseError {
    NotForBot,
    InvalidCommand(Document),
}

#[cfg(test)]
pub(crate) mod testing {
    use std::{sync::Arc, time::Duration};

    use tokio::sync::watch;

    use crate::{
        commands::CommandContext,
        exchange::SecretExchange,
        pagination::Limits,
        response::{Conversation, EventHub, MockTransport, Scope},
    };

    pub const ROOM: &str = "!room:example.org";
    pub const ALICE: &str = "@alice:example.org";

    /// Context of a command sent by Alice, with the hub and the shutdown
    /// sender kept alive by the caller.
    pub fn create_test_context(
        transport: MockTransport,
        is_direct: bool,
        is_owner: bool,
    ) -> (CommandContext, EventHub, watch::Sender<bool>) {
        let events = EventHub::new(16);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let conversation = Conversation::new(
            Arc::new(transport),
            events.clone(),
            shutdown_rx,
            Limits::default(),
            Scope {
                room_id: ROOM.to_owned(),
                user_id: ALICE.to_owned(),
            },
        );
        let context = CommandContext {
            conversation,
            exchange: Arc::new(SecretExchange::new("@herald:example.org")),
            message_id: "$command".to_owned(),
            is_direct,
            is_owner,
            confirm_timeout: Duration::from_secs(5),
            exchange_timeout: Duration::from_secs(5),
        };
        (context, events, shutdown_tx)
    }
}
