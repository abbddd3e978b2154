//! Command orchestration and execution.
//!
//! [`Commander`] is the entry point of command processing. It parses messages
//! and routes the resulting commands to their handlers.
//!
//! # Flow
//!
//! ```text
//! Chat message → parse() → Command → parse_command() → CommandResult
//! ```

use command_parser::Parser;

use crate::{
    commands::{
        CommandContext, CommandParseError, CommandResult,
        actions::{
            handle_about, handle_help, handle_hide, handle_pagetest, handle_percent, handle_ping, handle_random,
            handle_roll, handle_shutdown,
        },
        command::{Command, format_command_error},
    },
    constants::COMMAND_PREFIX,
    error::Error,
};

/// Command orchestrator for parsing and executing bot commands.
///
/// All commands start with `!herald`. Other messages are ignored
/// ([`CommandParseError::NotForBot`]).
pub struct Commander {
    /// Command parser for processing user commands
    parser: Parser,
}

impl Commander {
    /// Creates a commander recognising `!` commands with `-` options.
    ///
    /// # Examples
    ///
    /// ```
    /// # use herald::commands::Commander;
    /// let commander = Commander::new();
    /// ```
    pub fn new() -> Self {
        let parser = Parser::new(COMMAND_PREFIX, '-');
        Commander { parser }
    }

    /// Parses a message body into a structured command.
    ///
    /// # Arguments
    ///
    /// * `body` - The raw message text
    ///
    /// # Returns
    ///
    /// * `Ok(Command)` - Successfully parsed and validated command
    /// * `Err(CommandParseError::NotForBot)` - Message is not a command or for a different bot
    /// * `Err(CommandParseError::InvalidCommand)` - Unknown subcommand or invalid
    ///   arguments, with the document to answer
    ///
    /// # Examples
    ///
    /// ```
    /// # use herald::commands::Commander;
    /// let commander = Commander::new();
    ///
    /// assert!(commander.parse("!herald ping").is_ok());
    /// assert!(commander.parse("Hello, world!").is_err());
    /// ```
    pub fn parse(&self, body: &str) -> Result<Command, CommandParseError> {
        Command::parse(&self.parser, body).map_err(|error| match format_command_error(error) {
            Some(document) => CommandParseError::InvalidCommand(document),
            None => CommandParseError::NotForBot,
        })
    }

    /// Executes a parsed command.
    ///
    /// # Arguments
    ///
    /// * `command` - The parsed command to execute
    /// * `context` - Conversation, secret exchange and permissions of the author
    ///
    /// # Command Handlers
    ///
    /// - [`Command::Help`] → [`handle_help`]
    /// - [`Command::Ping`] → [`handle_ping`]
    /// - [`Command::About`] → [`handle_about`]
    /// - [`Command::Roll`] → [`handle_roll`]
    /// - [`Command::Random`] → [`handle_random`]
    /// - [`Command::Percent`] → [`handle_percent`]
    /// - [`Command::PageTest`] → [`handle_pagetest`]
    /// - [`Command::Hide`] → [`handle_hide`]
    /// - [`Command::Shutdown`] → [`handle_shutdown`]
    ///
    /// # Errors
    ///
    /// Transport and pagination failures of interactive commands.
    pub async fn parse_command(&self, command: &Command, context: &CommandContext) -> Result<CommandResult, Error> {
        let result = match command {
            Command::Help(name) => handle_help(name.as_deref(), context.is_owner),
            Command::Ping => handle_ping(),
            Command::About => handle_about(),
            Command::Roll(expressions) => handle_roll(expressions),
            Command::Random(limit, times) => handle_random(*limit, *times),
            Command::Percent(times) => handle_percent(*times),
            Command::PageTest => handle_pagetest(&context.conversation.scope().user_id),
            Command::Hide(secret) => handle_hide(context, secret.as_deref()).await?,
            Command::Shutdown(force) => handle_shutdown(context, *force).await?,
        };

        Ok(result)
    }
}

impl Default for Commander {
    fn default() -> Self {
        Commander::new()
    }
}
