//! Documents sent in answer to commands.
//!
//! Every reply of the bot is a [`Document`] so it goes through the paginator
//! and gets a colour matching its meaning.

use crate::{
    commands::actions::CommandHelp,
    constants::{ABOUT_TEXT, COMMAND_PREFIX, NAME, colors},
    pagination::Document,
};

/// Builds the list of commands.
///
/// # Examples
///
/// ```
/// # use herald::commands::responses::format_help;
/// let help = format_help();
/// assert_eq!(help.fields.len(), 5);
/// ```
pub fn format_help() -> Document {
    Document::new()
        .title("Command list")
        .body(format!(
            "Invoke a command with `{prefix}herald <command>`. \
             Use `{prefix}herald help <command>` to get help on a specific command.",
            prefix = COMMAND_PREFIX
        ))
        .field(
            "General",
            "• **`help [command]`** shows this message, or the help of a command\n\
             • **`ping`** checks that the bot answers\n\
             • **`about`** displays information about the bot",
            false,
        )
        .field(
            "Random",
            "• **`roll <dice…>`** rolls dice, e.g. `roll d12 2d6+d12-3 d4*3`\n\
             • **`random <limit> [times=1]`** draws integers from 1 to `limit`\n\
             • **`percent [times=1]`** draws percentages with two decimals",
            false,
        )
        .field(
            "Secrets",
            "• **`hide`** starts a secret exchange in a group room\n\
             • **`hide <secret…>`** sends your secret, in a direct chat",
            false,
        )
        .field(
            "Admin",
            "• **`shutdown [force]`** stops the bot, owners only",
            false,
        )
        .field(
            "Tests",
            "• **`pagetest`** sends a document spanning several pages",
            false,
        )
        .color(colors::HELP)
}

/// Builds the help of one command.
///
/// The description is always present. Synopsis and aliases fields are
/// skipped when there is nothing to show.
pub fn format_command_help(help: &CommandHelp) -> Document {
    let mut document = Document::new()
        .title("Command help")
        .body(format!("`{}`", help.name))
        .field(
            "Synopsis",
            format!("`{}herald {}`", COMMAND_PREFIX, help.synopsis),
            true,
        );

    if !help.aliases.is_empty() {
        let aliases = help
            .aliases
            .iter()
            .map(|alias| format!("`{}`", alias))
            .collect::<Vec<_>>()
            .join(", ");
        document = document.field("Aliases", aliases, true);
    }

    document
        .field("Description", help.description, false)
        .color(colors::HELP)
}

/// Builds the answer to an unknown subcommand.
pub fn format_unknown_command() -> Document {
    format_error(
        "Unknown command",
        &format!(
            "Type `{}herald help` for more information.",
            COMMAND_PREFIX
        ),
    )
}

/// Builds the answer to a command used with invalid arguments.
///
/// # Arguments
///
/// * `usage` - The expected synopsis, without the bot prefix
pub fn format_invalid_usage(usage: &str) -> Document {
    format_error(
        "Invalid usage",
        &format!(
            "Usage: `{prefix}herald {usage}`. Type `{prefix}herald help` for more information.",
            prefix = COMMAND_PREFIX,
            usage = usage
        ),
    )
}

/// Builds an error document.
pub fn format_error(title: &str, description: &str) -> Document {
    Document::new()
        .title(title)
        .body(description)
        .color(colors::ERROR)
}

/// Builds the answer sent when a command failed unexpectedly.
pub fn format_unexpected_error() -> Document {
    format_error(
        "Something went wrong",
        "The command could not be completed. The error has been logged.",
    )
}

/// Builds the answer to a command reserved to the bot owners.
pub fn format_not_allowed() -> Document {
    format_error(
        "Permission denied",
        "Only the owners of the bot can use this command.",
    )
}

/// Builds the description of the bot.
pub fn format_about() -> Document {
    Document::new()
        .title(format!("About {}", NAME))
        .body(ABOUT_TEXT)
        .footer(format!("{} v{}", NAME, env!("CARGO_PKG_VERSION")), None)
        .color(colors::INFO)
}
