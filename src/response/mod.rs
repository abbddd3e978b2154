//! Waiting for a user's answer to a prompt.
//!
//! A prompt can be answered in two ways: by typing a reply in the room, or by
//! clicking one of the reaction markers the bot placed on the prompt. This module
//! races both event sources against a timeout and reports whichever matched
//! first.
//!
//! # Overview
//!
//! ```text
//! Matrix sync ──► EventHub ──┬──► message waiter  ─┐
//!                            └──► reaction waiter ─┼──► select! ──► RaceOutcome
//!                                  timeout ────────┤
//!                                  shutdown ───────┘
//! ```
//!
//! - [`EventHub`] fans out every incoming message and reaction
//! - [`Conversation`] holds the room and user a prompt is addressed to, and
//!   exposes the race and the composed prompts built on it
//! - [`TransientReactions`] owns the markers placed on a prompt and removes
//!   them once, whatever the outcome
//! - [`Transport`] is the seam to the chat platform, mocked in tests

use std::fmt;

mod conversation;
mod events;
mod transient;
mod transport;

pub use crate::response::{
    conversation::{Confirmation, ContentResponse, Conversation, Listener},
    events::EventHub,
    transient::TransientReactions,
    transport::{Transport, TransportError},
};

#[cfg(test)]
pub use crate::response::transport::MockTransport;

/// The room and the user a race listens to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    /// Room the prompt was sent to
    pub room_id: String,
    /// User whose answer is awaited
    pub user_id: String,
}

/// A text message received from the sync loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub room_id: String,
    pub sender: String,
    pub event_id: String,
    pub body: String,
    /// Whether the room is a direct chat
    pub is_direct: bool,
}

/// A reaction received from the sync loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingReaction {
    pub room_id: String,
    pub sender: String,
    pub event_id: String,
    /// Event the reaction annotates
    pub target_event_id: String,
    /// Reaction key, usually an emoji
    pub key: String,
}

/// Event published on the [`EventHub`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    Message(IncomingMessage),
    Reaction(IncomingReaction),
}

/// How a race ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RaceOutcome {
    /// A matching message arrived first
    Message(IncomingMessage),
    /// A matching reaction arrived first
    Reaction(IncomingReaction),
    /// Nothing matched before the timeout
    Timeout,
    /// The bot is shutting down
    Cancelled,
}

impl fmt::Display for RaceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RaceOutcome::Message(message) => write!(f, "message {}", message.event_id),
            RaceOutcome::Reaction(reaction) => write!(f, "reaction {} ({})", reaction.event_id, reaction.key),
            RaceOutcome::Timeout => write!(f, "timeout"),
            RaceOutcome::Cancelled => write!(f, "cancelled"),
        }
    }
}
