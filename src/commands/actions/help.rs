//! Help command handler.
//!
//! Without argument it answers with the command list. With a command name or
//! alias it describes that command.

use log::debug;

use crate::{
    commands::{
        CommandResult,
        command::{PERCENT_USAGE, RANDOM_USAGE, ROLL_USAGE, SHUTDOWN_USAGE},
        responses::{format_command_help, format_error, format_help},
    },
    constants::COMMAND_PREFIX,
};

/// Help entry of one command.
#[derive(Debug, PartialEq, Eq)]
pub struct CommandHelp {
    pub name: &'static str,
    pub synopsis: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
    pub owners_only: bool,
}

static COMMANDS: [CommandHelp; 9] = [
    CommandHelp {
        name: "help",
        synopsis: "help [command]",
        aliases: &[],
        description: "Display the list of commands, or describe one of them.",
        owners_only: false,
    },
    CommandHelp {
        name: "ping",
        synopsis: "ping",
        aliases: &[],
        description: "Check that the bot answers.",
        owners_only: false,
    },
    CommandHelp {
        name: "about",
        synopsis: "about",
        aliases: &["info"],
        description: "Display information about the bot.",
        owners_only: false,
    },
    CommandHelp {
        name: "roll",
        synopsis: ROLL_USAGE,
        aliases: &[],
        description: "Roll dice. A term is either dice, `[rolls]d<faces>[*multiplier]`, or a constant. \
Terms are linked with `+` or `-`, e.g. `2d6+d12-3`. Each expression is rolled on its own line.",
        owners_only: false,
    },
    CommandHelp {
        name: "random",
        synopsis: RANDOM_USAGE,
        aliases: &["rand"],
        description: "Draw `times` integers from 1 to `limit`, both inclusive.",
        owners_only: false,
    },
    CommandHelp {
        name: "percent",
        synopsis: PERCENT_USAGE,
        aliases: &["%", "random percent"],
        description: "Draw `times` percentages with two decimals.",
        owners_only: false,
    },
    CommandHelp {
        name: "pagetest",
        synopsis: "pagetest",
        aliases: &[],
        description: "Send a document spanning several pages.",
        owners_only: false,
    },
    CommandHelp {
        name: "hide",
        synopsis: "hide [secret…]",
        aliases: &[],
        description: "Without a secret, start a secret exchange in a group room. \
In a direct chat, send your secret to the running exchange. \
The initiator reveals every secret at once or cancels the exchange.",
        owners_only: false,
    },
    CommandHelp {
        name: "shutdown",
        synopsis: SHUTDOWN_USAGE,
        aliases: &[],
        description: "Stop the bot after a confirmation. `force` skips the confirmation.",
        owners_only: true,
    },
];

/// Finds the help entry of a command by name or alias.
fn find_command(name: &str) -> Option<&'static CommandHelp> {
    COMMANDS
        .iter()
        .find(|help| help.name == name || help.aliases.contains(&name))
}

/// Returns the list of available commands, or the help of one command.
///
/// # Arguments
///
/// * `command_name` - Name or alias of the command to describe
/// * `is_owner` - Whether the author may use owner commands
pub fn handle_help(command_name: Option<&str>, is_owner: bool) -> CommandResult {
    debug!("handling help command: {:?}", command_name);

    let Some(name) = command_name else {
        return CommandResult::reply(format_help());
    };
    let name = name.strip_prefix(COMMAND_PREFIX).unwrap_or(name);

    let document = match find_command(name) {
        Some(help) if help.owners_only && !is_owner => format_error(
            "Command help",
            &format!("You have insufficient permission to access `{}`.", name),
        ),
        Some(help) => format_command_help(help),
        None => format_error("Command help", &format!("Could not find command `{}`.", name)),
    };
    CommandResult::reply(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::colors;

    #[test]
    fn test_handle_help() {
        let result = handle_help(None, false);

        assert!(!result.shutdown);
        let document = result.response.unwrap();
        assert_eq!(document.color, Some(colors::HELP));
        assert!(!document.fields.is_empty());
    }

    #[test]
    fn test_handle_help_for_command() {
        let document = handle_help(Some("random"), false).response.unwrap();

        assert_eq!(document.title.as_deref(), Some("Command help"));
        assert_eq!(document.body, "`random`");
        assert_eq!(document.color, Some(colors::HELP));
        assert_eq!(document.fields[0].name, "Synopsis");
        assert_eq!(document.fields[0].value, "`!herald random <limit> [times=1]`");
        assert_eq!(document.fields[1].name, "Aliases");
        assert_eq!(document.fields[1].value, "`rand`");
        assert_eq!(document.fields[2].name, "Description");
    }

    #[test]
    fn test_handle_help_resolves_aliases() {
        let document = handle_help(Some("info"), false).response.unwrap();
        assert_eq!(document.body, "`about`");

        let document = handle_help(Some("random percent"), false).response.unwrap();
        assert_eq!(document.body, "`percent`");
    }

    #[test]
    fn test_handle_help_without_aliases_has_no_alias_field() {
        let document = handle_help(Some("ping"), false).response.unwrap();

        assert!(document.fields.iter().all(|field| field.name != "Aliases"));
    }

    #[test]
    fn test_handle_help_unknown_command() {
        let document = handle_help(Some("dance"), false).response.unwrap();

        assert_eq!(document.color, Some(colors::ERROR));
        assert_eq!(document.body, "Could not find command `dance`.");
    }

    #[test]
    fn test_handle_help_owner_command() {
        let document = handle_help(Some("shutdown"), false).response.unwrap();
        assert_eq!(document.color, Some(colors::ERROR));
        assert!(document.body.contains("insufficient permission"));

        let document = handle_help(Some("shutdown"), true).response.unwrap();
        assert_eq!(document.body, "`shutdown`");
    }

    #[test]
    fn test_every_parsed_command_has_help() {
        for name in ["help", "ping", "about", "roll", "random", "percent", "pagetest", "hide", "shutdown"] {
            assert!(find_command(name).is_some(), "no help for {}", name);
        }
    }
}
