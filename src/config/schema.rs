//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind host and port).
    pub listener: ListenerConfig,

    /// Upstream completion API settings.
    pub upstream: UpstreamConfig,

    /// Prompt construction settings.
    pub prompt: PromptConfig,

    /// Answer post-processing limits.
    pub answer: AnswerConfig,

    /// Service surface settings (status banner, limits, CORS).
    pub service: ServiceConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port. Overridden by the `PORT` environment variable.
    pub port: u16,
}

impl ListenerConfig {
    /// Address string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Upstream chat-completion API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Chat-completion endpoint URL.
    pub endpoint: String,

    /// Name of the environment variable holding the API key.
    pub api_key_env: String,

    /// Bearer credential. Never read from or written to the config file.
    #[serde(skip)]
    pub api_key: Option<SecretString>,

    /// Total number of attempts per inbound request.
    pub max_attempts: u32,

    /// Timeout for a single attempt in seconds.
    pub attempt_timeout_secs: u64,

    /// Backoff time unit in milliseconds.
    /// Rate-limited attempts sleep `2^attempt` units, other failures one unit.
    pub backoff_unit_ms: u64,

    /// Upper bound for a single backoff sleep in milliseconds.
    pub max_backoff_ms: u64,

    /// Honor `HTTP(S)_PROXY` environment variables for upstream calls.
    pub use_system_proxy: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.mistral.ai/v1/chat/completions".to_string(),
            api_key_env: "MISTRAL_API_KEY".to_string(),
            api_key: None,
            max_attempts: 3,
            attempt_timeout_secs: 30,
            backoff_unit_ms: 1000,
            max_backoff_ms: 60_000,
            use_system_proxy: true,
        }
    }
}

/// Prompt and completion parameters sent upstream.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Model identifier.
    pub model: String,

    /// Prompt template. `{question}` is replaced with the trimmed question.
    pub template: String,

    pub temperature: f64,

    pub max_tokens: u32,

    pub top_p: f64,

    /// Stop sequences.
    pub stop: Vec<String>,

    /// Reject questions that are empty after trimming.
    pub reject_empty_question: bool,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            model: "mistral-small-latest".to_string(),
            template: "You are an experienced tarot master. \
                       Give a concise interpretation (under 400 words). \
                       Question: {question}"
                .to_string(),
            temperature: 0.7,
            max_tokens: 500,
            top_p: 0.9,
            stop: vec!["\n\n\n".to_string(), "###".to_string(), "---".to_string()],
            reject_empty_question: false,
        }
    }
}

/// Limits applied by the answer cleaner.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnswerConfig {
    /// Answers with at least this many words are truncated.
    pub max_words: usize,

    /// Number of words kept when truncating.
    pub truncate_words: usize,

    /// Number of characters kept by the fallback path.
    pub fallback_chars: usize,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            max_words: 400,
            truncate_words: 380,
            fallback_chars: 400,
        }
    }
}

/// Service surface configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Banner reported by `GET /`.
    pub banner: String,

    /// Version label reported by `GET /`.
    pub version_label: String,

    /// Total time allowed for one inbound request in seconds.
    /// Must cover every upstream attempt plus backoff.
    pub request_timeout_secs: u64,

    /// Maximum inbound body size in bytes.
    pub max_body_bytes: usize,

    /// Allowed CORS origins. `"*"` permits any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            banner: "🔮 Tarot Chat API is running!".to_string(),
            version_label: env!("CARGO_PKG_VERSION").to_string(),
            request_timeout_secs: 120,
            max_body_bytes: 64 * 1024,
            cors_origins: vec!["*".to_string()],
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "tarot_relay=info,tower_http=info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
