//! The operations a chat platform must offer to send and decorate pages.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::pagination::Page;

/// Failure reported by a [`Transport`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The platform refused or failed the request
    #[error("transport failure: {0}")]
    Failure(String),
    /// The bot is not in the room, or the room does not exist
    #[error("unknown room {0}")]
    UnknownRoom(String),
    /// An identifier could not be parsed
    #[error("invalid identifier {0}")]
    InvalidId(String),
}

/// Sending side of the chat platform.
///
/// Identifiers are the platform's string ids. Errors are returned to the
/// caller as is, nothing is retried.
#[automock]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a page as one message and returns the message id.
    async fn send_page(&self, room_id: &str, page: &Page) -> Result<String, TransportError>;
    /// Replaces the content of a message previously sent by the bot.
    async fn edit_page(&self, room_id: &str, message_id: &str, page: &Page) -> Result<(), TransportError>;
    /// Reacts to a message and returns the reaction id.
    async fn add_reaction(&self, room_id: &str, message_id: &str, key: &str) -> Result<String, TransportError>;
    /// Removes a reaction previously placed by the bot.
    async fn remove_reaction(&self, room_id: &str, reaction_id: &str) -> Result<(), TransportError>;
}
