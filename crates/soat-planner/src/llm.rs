//! Blocking client for the Ollama chat endpoint.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use soat_core::config::LlmConfig;
use soat_core::traits::{ChatRequest, LanguageModel};

pub struct OllamaClient {
    client: Client,
    endpoint: String,
    model: String,
}

impl OllamaClient {
    /// `timeout = None` leaves the round-trip unbounded.
    pub fn new(base_url: &str, model: String, timeout: Option<Duration>) -> Result<Self> {
        anyhow::ensure!(!model.trim().is_empty(), "missing Ollama model name");
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build Ollama HTTP client")?;
        let endpoint = format!("{}/api/chat", base_url.trim_end_matches('/'));
        Ok(Self { client, endpoint, model })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        Self::new(&config.base_url, config.model.clone(), config.timeout_secs.map(Duration::from_secs))
    }

    pub fn model(&self) -> &str { &self.model }
}

impl LanguageModel for OllamaClient {
    fn chat(&self, request: &ChatRequest<'_>) -> Result<String> {
        let body = OllamaChatRequest {
            model: &self.model,
            messages: vec![
                OllamaMessage { role: "system", content: request.system_prompt },
                OllamaMessage { role: "user", content: request.user_message },
            ],
            stream: false,
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .with_context(|| format!("failed to call Ollama at {}", self.endpoint))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_else(|_| "<body unavailable>".to_string());
            bail!("Ollama returned {}: {}", status, text);
        }
        let parsed: OllamaChatResponse = resp.json().context("failed to parse Ollama response")?;
        Ok(parsed.message.content)
    }
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct OllamaMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaResponseMessage {
    content: String,
}
