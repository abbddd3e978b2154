//! Matrix side of the bot.
//!
//! - [`client::MatrixClient`] implements [`Transport`](crate::response::Transport)
//!   on top of the Matrix SDK
//! - `login` logs in or restores the persisted session
//! - [`render`] turns a page into a markdown message
//! - [`session`] stores the session file and sync token
//! - `sync` feeds incoming messages and reactions to the
//!   [`EventHub`](crate::response::EventHub)
//!
//! # Examples
//!
//! ```no_run
//! use herald::{matrix::{MatrixClient, UserCredentials}, response::EventHub};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let credentials = UserCredentials {
//!     user_id: "@herald:example.org".to_string(),
//!     password: "password".to_string(),
//!     passphrase: "passphrase".to_string(),
//! };
//!
//! let client = MatrixClient::new(&credentials, "./data/session").await?;
//! client.sync(EventHub::default()).await;
//! # Ok(())
//! # }
//! ```

mod client;
mod login;
pub mod render;
pub mod session;
mod sync;

pub use crate::matrix::client::MatrixClient;

/// Credentials of the bot account.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    /// User ID of the matrix account
    pub user_id: String,
    /// Password of the matrix account
    pub password: String,
    /// Passphrase of the sqlite store
    pub passphrase: String,
}
