//! Shutdown command handler.
//!
//! Reserved to the owners listed in the configuration. Asks for confirmation
//! unless `force` is given.

use log::{debug, info};

use crate::{
    commands::{CommandContext, CommandResult, responses::format_not_allowed},
    constants::colors,
    error::Error,
    pagination::Document,
    response::Confirmation,
};

const STOPPING_TITLE: &str = "Shutting down…";

/// Asks the bot to stop, after confirmation unless `force` is set.
///
/// # Returns
///
/// A result with `shutdown` set when the owner confirmed.
pub async fn handle_shutdown(context: &CommandContext, force: bool) -> Result<CommandResult, Error> {
    debug!("handling shutdown command (force: {})", force);

    if !context.is_owner {
        return Ok(CommandResult::reply(format_not_allowed()));
    }

    let conversation = &context.conversation;
    let user_id = &conversation.scope().user_id;

    if force {
        let stopping = Document::new().title(STOPPING_TITLE).color(colors::INFO);
        conversation.send_document(&stopping).await?;
        info!("shutting down at the command of {}", user_id);
        return Ok(CommandResult {
            response: None,
            shutdown: true,
        });
    }

    let prompt = Document::new().title("Shutdown?").body(
        "This action may be difficult to undo without physical or remote access \
         to the host machine. Are you sure?",
    );
    let (prompt_id, answer) = conversation
        .confirm_document(&prompt, context.confirm_timeout)
        .await?;

    if answer != Confirmation::Yes {
        conversation
            .edit_for_response(&prompt_id, answer, "Shutdown {}")
            .await?;
        return Ok(CommandResult::silent());
    }

    let stopping = Document::new().title(STOPPING_TITLE).color(answer.color());
    conversation.edit_document(&prompt_id, &stopping).await?;
    info!("shutting down at the command of {}", user_id);

    Ok(CommandResult {
        response: None,
        shutdown: true,
    })
}
