//! Configuration of the Herald bot.
//!
//! The configuration is a YAML file, every value of which can be overridden
//! by a `HERALD_` prefixed environment variable (`__` separates the sections):
//!
//! ```yaml
//! matrix:
//!   user_id: "@herald:matrix.org"
//!   password: "secret-password"
//!   passphrase: "store-passphrase"
//!
//! bot:
//!   owners: ["@admin:matrix.org"]
//!   confirm_timeout: 30
//!   exchange_timeout: 120
//!
//! # Optional, defaults shown
//! limits:
//!   max_title: 256
//!   max_body: 2048
//!   max_field_name: 256
//!   max_field_value: 1024
//!   max_fields: 25
//!   max_total: 6000
//!   footer_slack: 10
//! ```
//!
//! ```bash
//! export HERALD_MATRIX__PASSWORD="secret-from-env"
//! ```

use std::time::Duration;

use anyhow::Context;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::Deserialize;

use crate::{matrix::UserCredentials, pagination::Limits};

/// Prefix of the environment variables overriding the file.
const ENV_PREFIX: &str = "HERALD_";

/// Root configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Matrix account configuration
    pub matrix: Matrix,
    /// Behaviour of the commands
    #[serde(default)]
    pub bot: BotSettings,
    /// Page limits used when splitting replies
    #[serde(default)]
    pub limits: Limits,
}

/// Matrix account configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Matrix {
    /// Fully qualified Matrix user ID, `@username:homeserver.org`.
    pub user_id: String,

    /// Matrix account password.
    ///
    /// Only used for the first login, the session is restored afterward.
    pub password: String,

    /// Passphrase of the sqlite store holding the session state and keys.
    pub passphrase: String,
}

/// Command settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BotSettings {
    /// Users allowed to run owner commands such as `shutdown`
    pub owners: Vec<String>,
    /// Seconds to wait for the answer to a confirmation prompt
    pub confirm_timeout: u64,
    /// Seconds a secret exchange stays open
    pub exchange_timeout: u64,
}

impl Default for BotSettings {
    fn default() -> Self {
        BotSettings {
            owners: Vec::new(),
            confirm_timeout: 30,
            exchange_timeout: 120,
        }
    }
}

impl BotSettings {
    pub fn is_owner(&self, user_id: &str) -> bool {
        self.owners.iter().any(|owner| owner == user_id)
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.confirm_timeout)
    }

    pub fn exchange_timeout(&self) -> Duration {
        Duration::from_secs(self.exchange_timeout)
    }
}

impl Config {
    /// Loads the file at `path`, then applies the environment overrides.
    ///
    /// # Errors
    ///
    /// Fails when a required value is missing from both sources, when a value
    /// has the wrong type or when the limits are inconsistent.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use herald::config::Config;
    ///
    /// let config = Config::load("config.yaml")?;
    /// println!("logging in as {}", config.matrix.user_id);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(path: &str) -> anyhow::Result<Config> {
        let config: Config = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("invalid configuration in {}", path))?;

        config.limits.validate().context("invalid limits")?;

        Ok(config)
    }

    pub fn credentials(&self) -> UserCredentials {
        UserCredentials {
            user_id: self.matrix.user_id.clone(),
            password: self.matrix.password.clone(),
            passphrase: self.matrix.passphrase.clone(),
        }
    }
}
