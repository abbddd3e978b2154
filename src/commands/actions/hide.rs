//! Secret exchange command handler.
//!
//! `hide` without argument in a group room starts an exchange. `hide <secret>`
//! in a direct chat records a secret, acknowledged with 👌.

use log::debug;

use crate::{
    commands::{
        CommandContext, CommandResult,
        responses::{format_error, format_invalid_usage},
    },
    constants::emoji,
    error::Error,
    exchange::ExchangeError,
};

/// Starts an exchange or records a secret, depending on the room.
///
/// # Errors
///
/// Returns transport and pagination failures. Exchange misuse is answered
/// with an error document instead.
pub async fn handle_hide(context: &CommandContext, secret: Option<&str>) -> Result<CommandResult, Error> {
    debug!("handling hide command");

    let conversation = &context.conversation;

    match (context.is_direct, secret) {
        (true, Some(secret)) => {
            match context.exchange.record(&conversation.scope().user_id, secret).await {
                Ok(()) => {
                    conversation
                        .transport()
                        .add_reaction(&conversation.scope().room_id, &context.message_id, emoji::SUCCESS)
                        .await?;
                    Ok(CommandResult::silent())
                }
                Err(Error::Exchange(ExchangeError::NotActive)) => Ok(CommandResult::reply(format_error(
                    "No secret exchange is in progress",
                    "Try starting one by entering this command into a group room.",
                ))),
                Err(e) => Err(e),
            }
        }
        (true, None) => Ok(CommandResult::reply(format_invalid_usage("hide <secret…>"))),
        (false, Some(_)) => Ok(CommandResult::reply(format_error(
            "Invalid usage",
            "Do not type your secret message into a group room.",
        ))),
        (false, None) => match context.exchange.run(conversation, context.exchange_timeout).await {
            Ok(outcome) => {
                debug!("secret exchange finished: {:?}", outcome);
                Ok(CommandResult::silent())
            }
            Err(Error::Exchange(ExchangeError::AlreadyActive)) => Ok(CommandResult::reply(format_error(
                "A secret exchange is already in progress",
                "Try ending that or waiting for it to end.",
            ))),
            Err(e) => Err(e),
        },
    }
}
