use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::llm::ollama::DEFAULT_OLLAMA_URL;
use crate::pipeline::{ExtractorKind, MatchPolicy};

/// Application-level constants
pub const APP_NAME: &str = "Medibot";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_OLLAMA_MODEL: &str = "medgemma";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 300;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "medibot_lib=info,tower_http=info"
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("No knowledge source: set MEDIBOT_KNOWLEDGE_URL or MEDIBOT_KNOWLEDGE_FIXTURE")]
    MissingKnowledgeSource,

    #[error("Both MEDIBOT_KNOWLEDGE_URL and MEDIBOT_KNOWLEDGE_FIXTURE are set; choose one")]
    ConflictingKnowledgeSource,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LlmProvider {
    #[default]
    Gemini,
    Ollama,
}

impl LlmProvider {
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => DEFAULT_GEMINI_MODEL,
            Self::Ollama => DEFAULT_OLLAMA_MODEL,
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::Ollama => write!(f, "ollama"),
        }
    }
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            other => Err(format!("unknown LLM provider: {other}")),
        }
    }
}

/// Where knowledge queries are answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnowledgeSource {
    /// Remote engine service base URL.
    Remote(String),
    /// JSON fact table served in-process.
    Fixture(PathBuf),
}

/// Runtime configuration, read once at startup.
#[derive(Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub provider: LlmProvider,
    /// Gemini credential. Empty when unset; not validated here.
    pub api_key: String,
    pub model: String,
    pub ollama_url: String,
    pub extractor: ExtractorKind,
    pub match_policy: MatchPolicy,
    pub knowledge: KnowledgeSource,
    pub http_timeout_secs: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_addr", &self.bind_addr)
            .field("provider", &self.provider)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("model", &self.model)
            .field("ollama_url", &self.ollama_url)
            .field("extractor", &self.extractor)
            .field("match_policy", &self.match_policy)
            .field("knowledge", &self.knowledge)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

impl Config {
    /// Load from the process environment, after applying a `.env` file if
    /// one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_addr = parse_var(
            "MEDIBOT_BIND_ADDR",
            get("MEDIBOT_BIND_ADDR").as_deref().unwrap_or(DEFAULT_BIND_ADDR),
        )?;

        let provider: LlmProvider = match get("MEDIBOT_LLM_PROVIDER") {
            Some(raw) => parse_var("MEDIBOT_LLM_PROVIDER", &raw)?,
            None => LlmProvider::default(),
        };

        let extractor: ExtractorKind = match get("MEDIBOT_EXTRACTOR") {
            Some(raw) => parse_var("MEDIBOT_EXTRACTOR", &raw)?,
            None => ExtractorKind::default(),
        };

        let match_policy: MatchPolicy = match get("MEDIBOT_MATCH_POLICY") {
            Some(raw) => parse_var("MEDIBOT_MATCH_POLICY", &raw)?,
            None => MatchPolicy::default(),
        };

        let http_timeout_secs: u64 = match get("MEDIBOT_HTTP_TIMEOUT_SECS") {
            Some(raw) => parse_var("MEDIBOT_HTTP_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };
        if http_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "MEDIBOT_HTTP_TIMEOUT_SECS",
                reason: "must be at least 1".into(),
            });
        }

        let knowledge = match (get("MEDIBOT_KNOWLEDGE_URL"), get("MEDIBOT_KNOWLEDGE_FIXTURE")) {
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingKnowledgeSource),
            (Some(url), None) => KnowledgeSource::Remote(url),
            (None, Some(path)) => KnowledgeSource::Fixture(PathBuf::from(path)),
            (None, None) => return Err(ConfigError::MissingKnowledgeSource),
        };

        Ok(Self {
            bind_addr,
            provider,
            api_key: get("GOOGLE_API_KEY").unwrap_or_default(),
            model: get("MEDIBOT_MODEL").unwrap_or_else(|| provider.default_model().to_string()),
            ollama_url: get("MEDIBOT_OLLAMA_URL").unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            extractor,
            match_policy,
            knowledge,
            http_timeout_secs,
        })
    }
}

fn parse_var<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}
