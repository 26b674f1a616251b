//! Engine configuration
//!
//! Loaded from environment variables; the server layers CLI flags on top.

use std::path::PathBuf;
use std::time::Duration;

use crate::cache::{DEFAULT_MAX_ENTRIES, DEFAULT_TTL};
use crate::generation::{clamp_temperature, CompletionParams, OpenAiConfig, MAX_TEMPERATURE};

/// Configuration for the analysis pipeline and its generation client
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub openai: OpenAiConfig,
    /// Sampling temperature, clamped to [`MAX_TEMPERATURE`]
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub cache_ttl: Duration,
    /// Upper bound on cached assessments
    pub cache_max_entries: u64,
    /// Directory of additional `<code>.json` schema records
    pub schema_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            openai: OpenAiConfig::default(),
            temperature: MAX_TEMPERATURE,
            max_tokens: Some(4096),
            cache_ttl: DEFAULT_TTL,
            cache_max_entries: DEFAULT_MAX_ENTRIES,
            schema_dir: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// Expected variables:
    /// - OPENAI_API_KEY: API key for the generation service
    /// - LEASE_API_BASE_URL: OpenAI-compatible base URL
    /// - LEASE_MODEL: Model name (default: "gpt-4-turbo")
    /// - LEASE_TEMPERATURE: Sampling temperature (max 0.3)
    /// - LEASE_MAX_TOKENS: Completion token limit
    /// - LEASE_REQUEST_TIMEOUT_SECS: Generation request timeout
    /// - LEASE_CACHE_TTL_SECS: Result cache TTL
    /// - LEASE_CACHE_MAX_ENTRIES: Result cache capacity
    /// - LEASE_SCHEMA_DIR: Directory with extra jurisdiction schemas
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parse_u64 = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        let openai = OpenAiConfig {
            api_key: lookup("OPENAI_API_KEY").unwrap_or_default(),
            base_url: lookup("LEASE_API_BASE_URL").unwrap_or(defaults.openai.base_url),
            model: lookup("LEASE_MODEL").unwrap_or(defaults.openai.model),
            timeout_secs: parse_u64("LEASE_REQUEST_TIMEOUT_SECS")
                .unwrap_or(defaults.openai.timeout_secs),
        };

        let temperature = lookup("LEASE_TEMPERATURE")
            .and_then(|v| v.trim().parse::<f32>().ok())
            .map(clamp_temperature)
            .unwrap_or(defaults.temperature);

        let max_tokens = parse_u64("LEASE_MAX_TOKENS")
            .and_then(|v| u32::try_from(v).ok())
            .or(defaults.max_tokens);

        let cache_ttl = parse_u64("LEASE_CACHE_TTL_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.cache_ttl);

        let cache_max_entries = parse_u64("LEASE_CACHE_MAX_ENTRIES")
            .filter(|n| *n > 0)
            .unwrap_or(defaults.cache_max_entries);

        let schema_dir = lookup("LEASE_SCHEMA_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Self {
            openai,
            temperature,
            max_tokens,
            cache_ttl,
            cache_max_entries,
            schema_dir,
        }
    }

    pub fn completion_params(&self) -> CompletionParams {
        CompletionParams::new(self.temperature, self.max_tokens)
    }
}
