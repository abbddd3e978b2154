//! Herald - A Matrix command bot.
//!
//! Herald answers `!herald` commands in the Matrix rooms it is invited to.
//! Long answers are split into pages that respect the configured limits, and
//! questions can be answered either by typing a reply or by clicking one of
//! the reactions the bot placed on its prompt.
//!
//! # Configuration
//!
//! ```yaml
//! matrix:
//!   user_id: "@herald:matrix.org"
//!   password: "your-password"
//!   passphrase: "your-store-passphrase"
//!
//! bot:
//!   owners: ["@admin:matrix.org"]
//! ```
//!
//! Any value can be overridden with a `HERALD_` prefixed environment variable,
//! see [`config`].
//!
//! # Usage
//!
//! ```bash
//! herald --config config.yaml --data ./herald-data
//! ```
//!
//! # Bot Commands
//!
//! - `!herald help [command]` - Display the command list, or the help of a command
//! - `!herald roll 2d6+1` - Roll dice
//! - `!herald random 100 3` - Draw random numbers
//! - `!herald hide` - Start a secret exchange
//! - `!herald shutdown` - Stop the bot (owners only)
//!
//! # Architecture
//!
//! - [`bot`] - Lifecycle and dispatch of incoming commands
//! - [`commands`] - Command parsing and handlers
//! - [`config`] - YAML configuration with environment overrides
//! - [`exchange`] - Secret exchange shared by every room
//! - [`matrix`] - Matrix client, session persistence and rendering
//! - [`pagination`] - Splitting documents into pages
//! - [`response`] - Waiting for a reply or a reaction to a prompt
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (default: `info`)

use clap::Parser;
use env_logger::Env;
use log::{error, info};

use crate::{bot::Bot, config::Config};

mod bot;
mod commands;
mod config;
mod constants;
mod error;
mod exchange;
mod matrix;
mod pagination;
mod response;
mod utils;

/// Command-line arguments of the bot.
///
/// # Examples
///
/// ```bash
/// herald --config config.yaml --data ./herald-data
/// ```
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file.
    #[arg(short, long)]
    config: String,

    /// Path to the directory for storing persistent data.
    ///
    /// It holds `session/`, the Matrix session file and the sqlite store.
    /// Anyone able to read it can impersonate the bot.
    #[arg(short, long)]
    data: String,
}

#[tokio::main]
async fn main() {
    // Put logger at info level by default
    let env = Env::default().filter_or("RUST_LOG", "info");
    env_logger::init_from_env(env);

    info!("starting herald {}...", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("failed to load config file: {:#}", e);
            return;
        }
    };

    let bot = match Bot::new(config, args).await {
        Ok(bot) => bot,
        Err(e) => {
            error!("failed to initialize bot: {:#}", e);
            return;
        }
    };
    bot.start().await;
}
