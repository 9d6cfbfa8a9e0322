//! Configuration
//!
//! Layered loading: built-in defaults, then an optional TOML file, then
//! `CHATRELAY__*` environment variables. CLI flags are applied on top by `main`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix, e.g. `CHATRELAY__BACKEND__BASE_URL`.
const ENV_PREFIX: &str = "CHATRELAY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid backend url '{url}': {reason}")]
    InvalidBackendUrl { url: String, reason: String },

    #[error("backend timeout must be greater than zero")]
    ZeroTimeout,

    #[error("session client id must not be empty")]
    EmptyClientId,
}

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub bot: BotConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Downstream chat backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL; `/chat` is appended for relay calls.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Which messaging transport drives the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Lines on stdin are inbound messages, replies go to stdout.
    #[default]
    Console,
    /// WhatsApp Web multi-device session (requires the `whatsapp` feature).
    Whatsapp,
}

/// Messaging session persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Directory holding session credentials; created if absent.
    #[serde(default = "default_session_path")]
    pub path: PathBuf,

    /// Keys the credential directory inside `path`.
    #[serde(default = "default_client_id")]
    pub client_id: String,

    #[serde(default)]
    pub transport: TransportKind,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
            client_id: default_client_id(),
            transport: TransportKind::default(),
        }
    }
}

/// Reply behaviour that does not involve the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Reserved command answered locally (compared case-insensitively).
    #[serde(default = "default_test_command")]
    pub test_command: String,

    /// Text sent through the relay once the session is ready.
    #[serde(default = "default_self_test_text")]
    pub self_test_text: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            test_command: default_test_command(),
            self_test_text: default_self_test_text(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,

    /// When set, logs are also written to a daily rolling file here.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_session_path() -> PathBuf {
    PathBuf::from("./whatsapp-session")
}

fn default_client_id() -> String {
    "debug-bot".to_string()
}

fn default_test_command() -> String {
    "/test".to_string()
}

fn default_self_test_text() -> String {
    "test de conexión".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// `~/.chatrelay`, falling back to the working directory when no home exists.
pub fn chatrelay_home() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".chatrelay"))
        .unwrap_or_else(|| PathBuf::from(".chatrelay"))
}

impl Config {
    /// Load from `path` if given, otherwise from `~/.chatrelay/config.toml`
    /// when it exists. Environment variables override file values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let default_path = chatrelay_home().join("config.toml");
        let (file, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (default_path, false),
        };

        tracing::debug!("Loading config from {} (required={})", file.display(), required);

        let settings = config::Config::builder()
            .add_source(config::File::from(file).required(required))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document directly (no file or environment layers).
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()?;
        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match reqwest::Url::parse(&self.backend.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ConfigError::InvalidBackendUrl {
                    url: self.backend.base_url.clone(),
                    reason: format!("unsupported scheme '{}'", url.scheme()),
                });
            }
            Err(e) => {
                return Err(ConfigError::InvalidBackendUrl {
                    url: self.backend.base_url.clone(),
                    reason: e.to_string(),
                });
            }
        }
        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.session.client_id.trim().is_empty() {
            return Err(ConfigError::EmptyClientId);
        }
        Ok(())
    }

    /// Render the effective config as TOML (used by `chatrelay config`).
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
