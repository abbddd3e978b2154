//! Ping and about command handlers.

use log::debug;

use crate::{
    commands::{CommandResult, responses::format_about},
    pagination::Document,
};

/// Answers with a pong.
pub fn handle_ping() -> CommandResult {
    debug!("handling ping command");

    CommandResult::reply(Document::new().body("Pong!"))
}

/// Describes the bot.
pub fn handle_about() -> CommandResult {
    debug!("handling about command");

    CommandResult::reply(format_about())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_ping() {
        let result = handle_ping();
        assert_eq!(result.response.unwrap().body, "Pong!");
    }

    #[test]
    fn test_handle_about() {
        let result = handle_about();
        let document = result.response.unwrap();
        assert_eq!(document.title.as_deref(), Some("About Herald"));
        assert!(!result.shutdown);
    }
}
