//! Service configuration.
//!
//! Loaded from an optional TOML file, then overridden from the environment.
//! Every field has a default, so an empty file (or none at all) is valid.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ParleyError, ParleyResult};
use crate::hub::HubConfig;

pub const DEFAULT_ENDPOINT: &str =
    "https://dashscope.aliyuncs.com/api/v1/services/aigc/text-generation/generation";
pub const DEFAULT_MODEL: &str = "qwen-plus";
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub redis: RedisConfig,
    pub generation: GenerationConfig,
    pub hub: HubConfig,
    pub discussion: DiscussionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub url: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self { url: DEFAULT_REDIS_URL.to_string() }
    }
}

/// Settings for the hosted text-generation API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub endpoint: String,
    /// Bearer token. Only ever supplied by file or `DASHSCOPE_API_KEY`.
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 30,
            max_tokens: 1500,
            temperature: 0.8,
        }
    }
}

/// Round budget and pacing of a discussion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscussionConfig {
    pub min_rounds: u32,
    pub max_rounds: u32,
    /// Rooms with at most this many agents get extended rounds.
    pub few_agents_threshold: usize,
    /// Round after which small rooms stop.
    pub few_agents_rounds: u32,
    /// Earlier agent messages shown to the speaker from round 2 on.
    pub context_window: usize,
    pub turn_delay_ms: u64,
    pub round_delay_ms: u64,
    /// Upper bound on a single generation call, including the client's own timeout.
    pub generation_timeout_secs: u64,
}

impl Default for DiscussionConfig {
    fn default() -> Self {
        Self {
            min_rounds: 3,
            max_rounds: 5,
            few_agents_threshold: 2,
            few_agents_rounds: 4,
            context_window: 6,
            turn_delay_ms: 3000,
            round_delay_ms: 2000,
            generation_timeout_secs: 45,
        }
    }
}

impl Config {
    /// Read `path` (if given), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> ParleyResult<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                Self::from_toml(&raw)?
            }
            None => Self::default(),
        };
        config.apply_env_with(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> ParleyResult<Self> {
        toml::from_str(raw).map_err(|e| ParleyError::config(format!("Invalid config file: {}", e)))
    }

    /// Apply overrides looked up through `var`. Unset variables leave the
    /// current value alone.
    pub fn apply_env_with(&mut self, var: impl Fn(&str) -> Option<String>) -> ParleyResult<()> {
        if let Some(url) = var("REDIS_URL") {
            self.redis.url = url;
        }
        if let Some(key) = var("DASHSCOPE_API_KEY") {
            self.generation.api_key = key;
        }
        if let Some(model) = var("DASHSCOPE_MODEL") {
            self.generation.model = model;
        }
        if let Some(endpoint) = var("DASHSCOPE_ENDPOINT") {
            self.generation.endpoint = endpoint;
        }
        if let Some(host) = var("PARLEY_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("PARLEY_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ParleyError::config(format!("PARLEY_PORT is not a port number: {}", port)))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> ParleyResult<()> {
        let d = &self.discussion;
        if d.min_rounds < 1 {
            return Err(ParleyError::config("discussion.min_rounds must be at least 1"));
        }
        if d.max_rounds < d.min_rounds {
            return Err(ParleyError::config(format!(
                "discussion.max_rounds ({}) must not be below min_rounds ({})",
                d.max_rounds, d.min_rounds
            )));
        }
        if self.hub.subscriber_buffer == 0 || self.hub.command_buffer == 0 {
            return Err(ParleyError::config("hub buffers must be greater than zero"));
        }
        if d.generation_timeout_secs == 0 {
            return Err(ParleyError::config("discussion.generation_timeout_secs must be greater than zero"));
        }
        if self.generation.endpoint.trim().is_empty() {
            return Err(ParleyError::config("generation.endpoint must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 9000

            [discussion]
            max_rounds = 8
            turn_delay_ms = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.discussion.max_rounds, 8);
        assert_eq!(config.discussion.min_rounds, 3);
        assert_eq!(config.discussion.turn_delay_ms, 0);
        assert_eq!(config.generation.model, "qwen-plus");
        assert_eq!(config.hub.subscriber_buffer, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("REDIS_URL", "redis://cache:6379"),
            ("DASHSCOPE_API_KEY", "sk-test"),
            ("PARLEY_PORT", "3000"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env_with(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.redis.url, "redis://cache:6379");
        assert_eq!(config.generation.api_key, "sk-test");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.generation.model, DEFAULT_MODEL);

        let err = config
            .apply_env_with(|key| (key == "PARLEY_PORT").then(|| "http".to_string()))
            .unwrap_err();
        assert!(matches!(err, ParleyError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_inverted_round_budget() {
        let mut config = Config::default();
        config.discussion.min_rounds = 6;
        assert!(config.validate().is_err());

        config.discussion.min_rounds = 0;
        config.discussion.max_rounds = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.hub.subscriber_buffer = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let err = Config::from_toml("[server]\nport = \"eighty\"").unwrap_err();
        assert!(matches!(err, ParleyError::Config(_)));
    }
}
