//! Model server configuration

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Ollama connection and sampling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model name as known to the server
    pub model: String,

    /// Base URL of the Ollama API
    pub api_base: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens to generate per answer
    pub max_tokens: u32,

    /// Read the answer as a stream of NDJSON chunks
    pub stream: bool,

    /// Attempts per request before giving up
    pub retries: u32,

    /// Delay between attempts in milliseconds
    pub retry_delay_ms: u64,

    /// Timeout of a single request in seconds
    pub request_timeout_secs: u64,
}

impl LlmConfig {
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(anyhow!("llm.model must not be empty"));
        }
        if !(self.api_base.starts_with("http://") || self.api_base.starts_with("https://")) {
            return Err(anyhow!(
                "llm.api_base must be an http(s) URL: {}",
                self.api_base
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(anyhow!(
                "llm.temperature must be between 0 and 2: {}",
                self.temperature
            ));
        }
        if self.max_tokens == 0 {
            return Err(anyhow!("llm.max_tokens must be positive"));
        }
        if self.retries == 0 {
            return Err(anyhow!("llm.retries must be at least 1"));
        }
        Ok(())
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "codellama".to_string(),
            api_base: "http://localhost:11434".to_string(),
            temperature: 0.2,
            max_tokens: 2048,
            stream: false,
            retries: 3,
            retry_delay_ms: 1000,
            request_timeout_secs: 300,
        }
    }
}
