//! Configuration management for civicbot.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (`CIVICBOT__` prefix, `__` separator)
//! 2. Config file (`civicbot.toml` by default)
//! 3. Defaults

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Top-level civicbot configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CivicConfig {
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub graph: GraphSettings,
    #[serde(default)]
    pub bot: BotSettings,
}

/// Chat-completion API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Bearer token. Falls back to `OPENAI_API_KEY` when empty.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Low temperature keeps generated SQL predictable.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Open-data database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx connection URL, e.g. `sqlite://data/budget.db`.
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Open the database read-only (generated SQL is untrusted).
    #[serde(default = "default_true")]
    pub read_only: bool,
}

/// Content-graph store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSettings {
    /// Publishing is disabled unless this is set.
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_graph_uri")]
    pub uri: String,

    #[serde(default = "default_graph_user")]
    pub user: String,

    #[serde(default)]
    pub password: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
}

/// Bot-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotSettings {
    /// Public host that serves published modules.
    #[serde(default = "default_hostname")]
    pub hostname: String,

    /// Directory for answer transcripts.
    #[serde(default = "default_transcript_dir")]
    pub transcript_dir: String,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_database_url() -> String {
    "sqlite://data/opendata.db".to_string()
}

fn default_graph_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_graph_user() -> String {
    "neo4j".to_string()
}

fn default_max_connections() -> u32 {
    16
}

fn default_fetch_size() -> usize {
    256
}

fn default_hostname() -> String {
    "localhost".to_string()
}

fn default_transcript_dir() -> String {
    "./transcripts".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            read_only: default_true(),
        }
    }
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            uri: default_graph_uri(),
            user: default_graph_user(),
            password: String::new(),
            max_connections: default_max_connections(),
            fetch_size: default_fetch_size(),
        }
    }
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            hostname: default_hostname(),
            transcript_dir: default_transcript_dir(),
        }
    }
}

impl CivicConfig {
    /// Load configuration from `{file_prefix}.toml` (optional) and `CIVICBOT__*` env vars.
    pub fn load(file_prefix: &str) -> Result<Self, CoreError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("CIVICBOT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut loaded: CivicConfig = cfg.try_deserialize()?;
        if loaded.openai.api_key.is_empty() {
            if let Ok(key) = std::env::var("OPENAI_API_KEY") {
                tracing::debug!("Using OPENAI_API_KEY from environment");
                loaded.openai.api_key = key;
            }
        }
        Ok(loaded)
    }
}
