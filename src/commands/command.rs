//! Command parsing.
//!
//! Converts the text of a chat message into a structured [`Command`] when it
//! is addressed to the bot (`!herald <subcommand> [args...]`).

use command_parser::{Command as ParserCommand, Parser};
use log::debug;

use crate::{
    commands::responses::{format_invalid_usage, format_unknown_command},
    pagination::Document,
};

/// Usage of the `roll` subcommand.
pub const ROLL_USAGE: &str = "roll <dice…>";
/// Usage of the `random` subcommand.
pub const RANDOM_USAGE: &str = "random <limit> [times=1]";
/// Usage of the `percent` subcommand.
pub const PERCENT_USAGE: &str = "percent [times=1]";
/// Usage of the `shutdown` subcommand.
pub const SHUTDOWN_USAGE: &str = "shutdown [force]";

/// Represents a parsed bot command.
#[derive(Debug, Hash, PartialEq, Eq)]
pub enum Command {
    /// Display the command list, or the help of the named command
    Help(Option<String>),
    /// Answer with a pong
    Ping,
    /// Describe the bot
    About,
    /// Roll dice
    ///
    /// # Fields
    ///
    /// * `Vec<String>` - One dice expression per entry, e.g. `2d6+d12-3`
    Roll(Vec<String>),
    /// Draw random integers
    ///
    /// # Fields
    ///
    /// * `u64` - Upper bound, inclusive, at least 1
    /// * `usize` - How many numbers to draw, at least 1
    Random(u64, usize),
    /// Draw random percentages
    ///
    /// # Fields
    ///
    /// * `usize` - How many numbers to draw, at least 1
    Percent(usize),
    /// Send a document spanning several pages
    PageTest,
    /// Start a secret exchange, or send a secret when one is given
    Hide(Option<String>),
    /// Stop the bot
    ///
    /// # Fields
    ///
    /// * `bool` - Skip the confirmation prompt
    Shutdown(bool),
}

/// Errors that can occur during command parsing.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandParsingError {
    /// The message could not be parsed as a command
    UnableToParse,
    /// The command is not for this bot
    NotHerald,
    /// The subcommand is not recognized
    Unknown,
    /// The subcommand has invalid arguments, with its expected usage
    InvalidUsage(&'static str),
}

impl Command {
    /// Parses a message string into a Command.
    ///
    /// # Arguments
    ///
    /// * `parser` - The command parser instance configured for the bot
    /// * `body` - The message text to parse
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The message is not a command - [`CommandParsingError::UnableToParse`]
    /// - The command is for a different bot - [`CommandParsingError::NotHerald`]
    /// - The subcommand is not recognized - [`CommandParsingError::Unknown`]
    /// - The arguments are invalid - [`CommandParsingError::InvalidUsage`]
    ///
    /// # Examples
    ///
    /// ```
    /// # use command_parser::Parser;
    /// # use herald::commands::command::Command;
    /// let parser = Parser::new('!', '-');
    /// let result = Command::parse(&parser, "!herald random 6 2");
    /// assert_eq!(result, Ok(Command::Random(6, 2)));
    /// ```
    pub fn parse(parser: &Parser, body: &str) -> Result<Self, CommandParsingError> {
        // The parser drops the last word, so a dummy one is appended
        let padded = body.to_string() + " dummy";

        let command = match parser.parse(&padded) {
            Ok(cmd) => cmd,
            Err(_) => return Err(CommandParsingError::UnableToParse),
        };

        if command.name != "herald" {
            return Err(CommandParsingError::NotHerald);
        }

        debug!("parsing command: {:?}", command);

        if command.arguments.is_empty() {
            return Ok(Command::Help(None));
        }

        match command.arguments[0].as_str() {
            "help" => Ok(Command::Help(Self::parse_help(&command))),
            "ping" => Ok(Command::Ping),
            "about" | "info" => Ok(Command::About),
            "roll" => Self::parse_roll(&command),
            "random" | "rand" => Self::parse_random(&command),
            "percent" | "%" => Ok(Command::Percent(Self::parse_times(&command, 1, PERCENT_USAGE)?)),
            "pagetest" => Ok(Command::PageTest),
            "hide" => Ok(Command::Hide(Self::parse_secret(body))),
            "shutdown" => Self::parse_shutdown(&command),
            _ => Err(CommandParsingError::Unknown),
        }
    }

    fn parse_roll(command: &ParserCommand) -> Result<Self, CommandParsingError> {
        let expressions: Vec<String> = command.arguments[1..]
            .iter()
            .filter(|expression| !expression.is_empty())
            .cloned()
            .collect();

        if expressions.is_empty() {
            return Err(CommandParsingError::InvalidUsage(ROLL_USAGE));
        }

        Ok(Command::Roll(expressions))
    }

    fn parse_random(command: &ParserCommand) -> Result<Self, CommandParsingError> {
        match command.arguments.get(1).map(String::as_str) {
            // `random percent` is an alias of `percent`
            Some("percent") | Some("%") => {
                Ok(Command::Percent(Self::parse_times(command, 2, PERCENT_USAGE)?))
            }
            Some(limit) => {
                let limit = match limit.parse::<u64>() {
                    Ok(limit) if limit >= 1 => limit,
                    _ => return Err(CommandParsingError::InvalidUsage(RANDOM_USAGE)),
                };
                let times = Self::parse_times(command, 2, RANDOM_USAGE)?;
                debug!("parsed random command - limit: {}, times: {}", limit, times);
                Ok(Command::Random(limit, times))
            }
            None => Err(CommandParsingError::InvalidUsage(RANDOM_USAGE)),
        }
    }

    /// Reads the optional repetition count at `index`, 1 when absent.
    fn parse_times(
        command: &ParserCommand,
        index: usize,
        usage: &'static str,
    ) -> Result<usize, CommandParsingError> {
        match command.arguments.get(index) {
            None => Ok(1),
            Some(times) => match times.parse::<usize>() {
                Ok(times) if times >= 1 => Ok(times),
                _ => Err(CommandParsingError::InvalidUsage(usage)),
            },
        }
    }

    fn parse_help(command: &ParserCommand) -> Option<String> {
        let name = command.arguments[1..].join(" ");
        let name = name.trim();
        (!name.is_empty()).then(|| name.to_owned())
    }

    /// Takes the secret verbatim from the message, everything after `hide`.
    ///
    /// The parser would drop words starting with `-` and collapse spaces.
    fn parse_secret(body: &str) -> Option<String> {
        let (_, after_name) = body.trim_start().split_once(char::is_whitespace)?;
        let secret = after_name.trim_start().strip_prefix("hide")?.trim();
        (!secret.is_empty()).then(|| secret.to_owned())
    }

    fn parse_shutdown(command: &ParserCommand) -> Result<Self, CommandParsingError> {
        match command.arguments.get(1).map(String::as_str) {
            None => Ok(Command::Shutdown(false)),
            Some("force") | Some("now") => Ok(Command::Shutdown(true)),
            Some(_) => Err(CommandParsingError::InvalidUsage(SHUTDOWN_USAGE)),
        }
    }
}

/// Formats a parsing error into a document for the user.
///
/// # Returns
///
/// * `Some(Document)` - For errors the user should hear about
/// * `None` - For messages that are not addressed to the bot
pub fn format_command_error(error: CommandParsingError) -> Option<Document> {
    match error {
        CommandParsingError::Unknown => Some(format_unknown_command()),
        CommandParsingError::InvalidUsage(usage) => Some(format_invalid_usage(usage)),
        CommandParsingError::UnableToParse | CommandParsingError::NotHerald => None,
    }
}
