//! Command action handlers.
//!
//! One handler per command. Stateless handlers build a
//! [`CommandResult`](crate::commands::CommandResult) from their arguments.
//! Interactive handlers receive the
//! [`CommandContext`](crate::commands::CommandContext) and talk to the user
//! through its conversation before returning.
//!
//! # Available Handlers
//!
//! - [`handle_help`] - Display the command list or the help of one command
//! - [`handle_ping`] - Answer with a pong
//! - [`handle_about`] - Describe the bot
//! - [`handle_roll`] - Roll dice
//! - [`handle_random`] - Draw random integers
//! - [`handle_percent`] - Draw random percentages
//! - [`handle_pagetest`] - Send a document spanning several pages
//! - [`handle_hide`] - Run the secret exchange
//! - [`handle_shutdown`] - Stop the bot, after confirmation

mod general;
mod help;
mod hide;
mod pagetest;
mod random;
mod roll;
mod shutdown;

pub use crate::commands::actions::{
    general::{handle_about, handle_ping},
    help::{CommandHelp, handle_help},
    hide::handle_hide,
    pagetest::handle_pagetest,
    random::{handle_percent, handle_random},
    roll::handle_roll,
    shutdown::handle_shutdown,
};
