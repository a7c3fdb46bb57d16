//! Startup configuration.
//!
//! Values resolve in order: command-line flags, then the TOML file named by
//! `--config`, then built-in defaults. API keys are read from the
//! environment only.
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:8080"
//! tax_year = 2024
//!
//! [database]
//! backend = "sqlite"
//! url = "sqlite:bizplan.db?mode=rwc"
//!
//! [ai]
//! provider = "anthropic"
//! model = "claude-3-5-haiku-latest"
//! timeout_secs = 30
//!
//! [logging]
//! level = "info,bizplan_server=debug"
//! file = "bizplan.log"
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use serde::Deserialize;

use bizplan_ai::{AiConfig, AiProvider};
use bizplan_core::db::DbConfig;

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_TAX_YEAR: i32 = 2024;
pub const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_AI_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Default, Parser)]
#[command(
    name = "bizplan-server",
    version,
    about = "Small-business tax and investment planner with AI narratives"
)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:8080.
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Database connection string, e.g. sqlite:bizplan.db?mode=rwc.
    #[arg(long, value_name = "URL")]
    pub db: Option<String>,

    /// Text-generation provider: openai, anthropic or none.
    #[arg(long, value_name = "PROVIDER")]
    pub ai_provider: Option<String>,

    /// Log filter directive (RUST_LOG takes precedence).
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Append logs to this file as well as stdout.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub ai: AiSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub bind: Option<String>,
    pub tax_year: Option<i32>,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSection {
    pub backend: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AiSection {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse configuration")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid config file: {}", path.display()))
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind: SocketAddr,
    pub tax_year: i32,
    pub database: DbConfig,
    pub ai: AiConfig,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Reads the `--config` file, if any, and the process environment.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::from_path(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(cli, file, |name| std::env::var(name).ok())
    }

    pub fn resolve(
        cli: &Cli,
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let bind_text = cli
            .bind
            .clone()
            .or(file.server.bind)
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind_text
            .parse()
            .with_context(|| format!("Invalid bind address: {bind_text}"))?;

        let defaults = DbConfig::default();
        let database = DbConfig {
            backend: file.database.backend.unwrap_or(defaults.backend),
            connection_string: cli
                .db
                .clone()
                .or(file.database.url)
                .unwrap_or(defaults.connection_string),
        };

        let provider_text = cli
            .ai_provider
            .clone()
            .or(file.ai.provider)
            .unwrap_or_else(|| AiProvider::None.name().to_string());
        let provider = AiProvider::parse(&provider_text).ok_or_else(|| {
            anyhow!("Unknown AI provider '{provider_text}'; expected openai, anthropic or none")
        })?;
        let ai = AiConfig {
            provider,
            model: file.ai.model,
            api_key: provider
                .api_key_env()
                .and_then(&env)
                .filter(|key| !key.trim().is_empty()),
            timeout: Duration::from_secs(file.ai.timeout_secs.unwrap_or(DEFAULT_AI_TIMEOUT_SECS)),
        };

        Ok(Self {
            bind,
            tax_year: file.server.tax_year.unwrap_or(DEFAULT_TAX_YEAR),
            database,
            ai,
            log_level: cli
                .log_level
                .clone()
                .or(file.logging.level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_file: cli.log_file.clone().or(file.logging.file),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_apply_without_flags_or_file() {
        let settings = Settings::resolve(&Cli::default(), FileConfig::default(), no_env).unwrap();

        assert_eq!(settings.bind.to_string(), DEFAULT_BIND);
        assert_eq!(settings.tax_year, 2024);
        assert_eq!(settings.database, DbConfig::default());
        assert_eq!(settings.ai.provider, AiProvider::None);
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.log_file, None);
    }

    #[test]
    fn file_values_fill_in_for_missing_flags() {
        let file = FileConfig::parse(
            r#"
            [server]
            bind = "0.0.0.0:8080"

            [database]
            url = "sqlite::memory:"

            [ai]
            provider = "openai"
            model = "gpt-4o"
            timeout_secs = 5

            [logging]
            level = "debug"
            file = "planner.log"
            "#,
        )
        .unwrap();

        let settings = Settings::resolve(&Cli::default(), file, no_env).unwrap();

        assert_eq!(settings.bind.to_string(), "0.0.0.0:8080");
        assert_eq!(settings.database.connection_string, "sqlite::memory:");
        assert_eq!(settings.ai.provider, AiProvider::OpenAi);
        assert_eq!(settings.ai.model(), "gpt-4o");
        assert_eq!(settings.ai.timeout, Duration::from_secs(5));
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.log_file, Some(PathBuf::from("planner.log")));
    }

    #[test]
    fn flags_override_file() {
        let file = FileConfig::parse(
            r#"
            [server]
            bind = "0.0.0.0:8080"
            [ai]
            provider = "openai"
            "#,
        )
        .unwrap();
        let cli = Cli {
            bind: Some("127.0.0.1:9000".to_string()),
            ai_provider: Some("none".to_string()),
            log_level: Some("warn".to_string()),
            ..Cli::default()
        };

        let settings = Settings::resolve(&cli, file, no_env).unwrap();

        assert_eq!(settings.bind.to_string(), "127.0.0.1:9000");
        assert_eq!(settings.ai.provider, AiProvider::None);
        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn api_key_comes_from_provider_env_var() {
        let cli = Cli {
            ai_provider: Some("anthropic".to_string()),
            ..Cli::default()
        };
        let env = |name: &str| (name == "ANTHROPIC_API_KEY").then(|| "sk-ant-test".to_string());

        let settings = Settings::resolve(&cli, FileConfig::default(), env).unwrap();

        assert_eq!(settings.ai.api_key.as_deref(), Some("sk-ant-test"));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let cli = Cli {
            ai_provider: Some("gemini".to_string()),
            ..Cli::default()
        };

        let err = Settings::resolve(&cli, FileConfig::default(), no_env).unwrap_err();

        assert!(err.to_string().contains("gemini"));
    }

    #[test]
    fn invalid_bind_is_rejected() {
        let cli = Cli {
            bind: Some("not-an-address".to_string()),
            ..Cli::default()
        };

        assert!(Settings::resolve(&cli, FileConfig::default(), no_env).is_err());
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        assert!(FileConfig::parse("[server]\nport = 80\n").is_err());
    }

    #[test]
    fn cli_parses_long_flags() {
        let cli = Cli::parse_from([
            "bizplan-server",
            "--bind",
            "0.0.0.0:3000",
            "--db",
            "sqlite::memory:",
            "--ai-provider",
            "openai",
            "--log-file",
            "out.log",
        ]);

        assert_eq!(cli.db.as_deref(), Some("sqlite::memory:"));
        assert_eq!(cli.ai_provider.as_deref(), Some("openai"));
        assert_eq!(cli.log_file, Some(PathBuf::from("out.log")));
    }
}
