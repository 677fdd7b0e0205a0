//! Command-line interface and layered configuration.
//!
//! Configuration merges, lowest precedence first: built-in defaults, the
//! TOML configuration file, `MASTHEAD_`-prefixed environment variables,
//! and finally explicit command-line flags.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

/// Default TOML configuration file looked up next to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "masthead.toml";

/// Runtime configuration shared by the daemon and admin commands.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Server bind address.
    pub bind: String,
    /// Database connection string or path.
    pub database: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5600".to_owned(),
            database: "masthead.db".to_owned(),
        }
    }
}

/// Command-line overrides applied on top of file and environment layers.
#[derive(Args, Debug, Clone)]
pub struct ConfigOverrides {
    /// Server bind address.
    #[arg(long)]
    pub bind: Option<String>,
    /// Database connection string or path.
    #[arg(long)]
    pub database: Option<String>,
    /// Path to the TOML configuration file.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
}

impl Default for ConfigOverrides {
    fn default() -> Self {
        Self {
            bind: None,
            database: None,
            config: PathBuf::from(DEFAULT_CONFIG_FILE),
        }
    }
}

impl ConfigOverrides {
    /// Merge all configuration layers into a resolved [`AppConfig`].
    ///
    /// A missing configuration file is not an error; only a malformed one
    /// is.
    ///
    /// # Errors
    /// Returns any error reported while reading or deserialising a layer.
    pub fn load(&self) -> Result<AppConfig, figment::Error> {
        let mut config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(&self.config))
            .merge(Env::prefixed("MASTHEAD_"))
            .extract()?;
        if let Some(bind) = &self.bind {
            config.bind.clone_from(bind);
        }
        if let Some(database) = &self.database {
            config.database.clone_from(database);
        }
        Ok(config)
    }
}

/// Arguments for the `create-user` administrative subcommand.
#[derive(Args, Debug, Clone)]
pub struct CreateUserArgs {
    /// Username for the new account.
    pub username: String,
    /// Password for the new account.
    pub password: String,
    /// Grant the staff capability (unpublished issues become visible).
    #[arg(long)]
    pub staff: bool,
}

/// CLI subcommands exposed by `masthead`.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create a new user account.
    #[command(name = "create-user")]
    CreateUser(CreateUserArgs),
}

/// Top-level CLI entry point consumed by the binary.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Configuration overrides.
    #[command(flatten)]
    pub overrides: ConfigOverrides,
    /// Optional administrative subcommand; the daemon runs when absent.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_file_or_env() {
        figment::Jail::expect_with(|_jail| {
            let config = ConfigOverrides::default().load()?;
            assert_eq!(config, AppConfig::default());
            Ok(())
        });
    }

    #[test]
    fn env_layer_overrides_file_layer() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                r#"
                    bind = "127.0.0.1:7000"
                    database = "file.db"
                "#,
            )?;
            jail.set_env("MASTHEAD_DATABASE", "env.db");
            let config = ConfigOverrides::default().load()?;
            assert_eq!(config.bind, "127.0.0.1:7000");
            assert_eq!(config.database, "env.db");
            Ok(())
        });
    }

    #[test]
    fn cli_flags_override_everything() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("MASTHEAD_BIND", "127.0.0.1:7000");
            let overrides = ConfigOverrides {
                bind: Some("127.0.0.1:9000".to_owned()),
                database: None,
                config: PathBuf::from(DEFAULT_CONFIG_FILE),
            };
            let config = overrides.load()?;
            assert_eq!(config.bind, "127.0.0.1:9000");
            assert_eq!(config.database, AppConfig::default().database);
            Ok(())
        });
    }
}
