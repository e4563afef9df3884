//! Ollama HTTP client

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{estimate_tokens, Completion, ModelClient, Prompt};
use crate::config::LlmConfig;

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
    prompt_eval_count: Option<u64>,
    eval_count: Option<u64>,
}

/// One NDJSON line of a streamed answer
#[derive(Debug, Deserialize)]
struct OllamaChunk {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
    prompt_eval_count: Option<u64>,
    eval_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max_chars).collect();
        out.push_str("...");
        out
    }
}

/// Client for the Ollama `/api/generate` endpoint
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    config: LlmConfig,
}

impl OllamaClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }

    fn payload(&self, prompt: &Prompt) -> Value {
        json!({
            "model": self.config.model,
            "prompt": prompt.combined(),
            "stream": self.config.stream,
            "options": {
                "temperature": self.config.temperature,
                "num_predict": self.config.max_tokens,
            },
        })
    }

    /// Models pulled on the server
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(self.url("/api/tags"))
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .with_context(|| format!("Cannot reach Ollama at {}", self.config.api_base))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("ollama error {}: {}", status, truncate(&body, 320)));
        }

        let tags: TagsResponse = response.json().await.context("Invalid ollama tags response")?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Check the server is reachable and warn when the model is not pulled
    pub async fn verify_model(&self) -> Result<bool> {
        let models = self.list_models().await?;
        let wanted = &self.config.model;
        let available = models
            .iter()
            .any(|name| name == wanted || name.split(':').next() == Some(wanted.as_str()));
        if available {
            info!("Model {} is available", wanted);
        } else {
            warn!(
                "Model {} is not pulled on {}; available: {}",
                wanted,
                self.config.api_base,
                models.join(", ")
            );
        }
        Ok(available)
    }

    async fn generate_once(&self, prompt: &Prompt) -> Result<Completion> {
        let response = self
            .client
            .post(self.url("/api/generate"))
            .json(&self.payload(prompt))
            .send()
            .await
            .context("ollama request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("ollama error {}: {}", status, truncate(&body, 320)));
        }

        let (text, prompt_tokens, completion_tokens) = if self.config.stream {
            read_stream(response).await?
        } else {
            let body: OllamaResponse = response.json().await.context("Invalid ollama response")?;
            (body.response, body.prompt_eval_count, body.eval_count)
        };

        Ok(Completion {
            prompt_tokens: prompt_tokens.unwrap_or_else(|| estimate_tokens(&prompt.combined())),
            completion_tokens: completion_tokens.unwrap_or_else(|| estimate_tokens(&text)),
            text: text.trim().to_string(),
        })
    }
}

/// Concatenate the `response` fields of a streamed NDJSON body
async fn read_stream(response: reqwest::Response) -> Result<(String, Option<u64>, Option<u64>)> {
    let mut stream = response.bytes_stream();
    let mut pending = Vec::new();
    let mut accumulator = StreamAccumulator::default();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("ollama stream interrupted")?;
        pending.extend_from_slice(&chunk);
        while let Some(newline) = pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = pending.drain(..=newline).collect();
            accumulator.push_line(&line)?;
        }
    }
    accumulator.push_line(&pending)?;
    Ok(accumulator.finish())
}

#[derive(Debug, Default)]
struct StreamAccumulator {
    text: String,
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
}

impl StreamAccumulator {
    fn push_line(&mut self, line: &[u8]) -> Result<()> {
        let line = String::from_utf8_lossy(line);
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }
        let chunk: OllamaChunk =
            serde_json::from_str(line).with_context(|| format!("Invalid stream chunk: {line}"))?;
        self.text.push_str(&chunk.response);
        if chunk.done {
            self.prompt_tokens = chunk.prompt_eval_count;
            self.completion_tokens = chunk.eval_count;
        }
        Ok(())
    }

    fn finish(self) -> (String, Option<u64>, Option<u64>) {
        (self.text, self.prompt_tokens, self.completion_tokens)
    }
}

#[async_trait]
impl ModelClient for OllamaClient {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, prompt: &Prompt) -> Result<Completion> {
        let attempts = self.config.retries.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            debug!(
                "Calling {} on {} (attempt {}/{})",
                self.config.model, self.config.api_base, attempt, attempts
            );
            match self.generate_once(prompt).await {
                Ok(completion) => return Ok(completion),
                Err(e) => {
                    warn!("Model call failed (attempt {}/{}): {:#}", attempt, attempts, e);
                    last_error = Some(e);
                    if attempt < attempts {
                        tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| anyhow!("no attempts made"))
            .context(format!("Model call failed after {attempts} attempts")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload() {
        let client = OllamaClient::new(LlmConfig {
            api_base: "http://localhost:11434/".to_string(),
            ..LlmConfig::default()
        })
        .unwrap();
        let prompt = Prompt {
            system: "You write tests.".to_string(),
            user: "Test add().".to_string(),
        };

        let payload = client.payload(&prompt);
        assert_eq!(payload["model"], "codellama");
        assert_eq!(payload["prompt"], "You write tests.\n\nTest add().");
        assert_eq!(payload["stream"], false);
        assert_eq!(payload["options"]["num_predict"], 2048);
        assert_eq!(client.url("/api/generate"), "http://localhost:11434/api/generate");
    }

    #[test]
    fn test_stream_accumulator() {
        let mut accumulator = StreamAccumulator::default();
        accumulator
            .push_line(br#"{"response": "lang", "done": false}"#)
            .unwrap();
        accumulator.push_line(b"\n").unwrap();
        accumulator
            .push_line(br#"{"response": "uage: python", "done": true, "prompt_eval_count": 12, "eval_count": 3}"#)
            .unwrap();

        let (text, prompt_tokens, completion_tokens) = accumulator.finish();
        assert_eq!(text, "language: python");
        assert_eq!(prompt_tokens, Some(12));
        assert_eq!(completion_tokens, Some(3));
    }

    #[test]
    fn test_stream_rejects_garbage() {
        let mut accumulator = StreamAccumulator::default();
        assert!(accumulator.push_line(b"not json").is_err());
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_after_retries() {
        let client = OllamaClient::new(LlmConfig {
            api_base: "http://127.0.0.1:9".to_string(),
            retries: 2,
            retry_delay_ms: 10,
            request_timeout_secs: 2,
            ..LlmConfig::default()
        })
        .unwrap();
        let error = client.complete(&Prompt::default()).await.unwrap_err();
        assert!(format!("{error:#}").contains("after 2 attempts"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
