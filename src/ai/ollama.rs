//! Ollama HTTP client for text generation.
//!
//! Every request carries the timeout given at construction, so a stalled
//! server cannot block the caller indefinitely.

use crate::errors::{AIError, AppResult};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Request body for text generation.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Response from text generation.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Client for interacting with Ollama API.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    client: Client,
}

impl OllamaClient {
    /// Creates a new Ollama client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the Ollama API (e.g., "http://127.0.0.1:11434")
    /// * `timeout` - Upper bound for a whole request, connect to last byte
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AIError::OllamaOffline)?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends a non-streaming generate request and returns the model's text.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Ollama API is not reachable or the request times out
    /// - Model is not found
    /// - API returns an error response or an unexpected body
    pub fn generate(&self, model: &str, prompt: &str) -> AppResult<String> {
        debug!("Sending generate request with model: {}", model);

        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .map_err(AIError::OllamaOffline)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();

            if status.as_u16() == 404 {
                return Err(AIError::ModelNotFound(model.to_string()).into());
            }

            return Err(
                AIError::InvalidResponse(format!("HTTP {}: {}", status, error_text)).into(),
            );
        }

        let generated: GenerateResponse = response.json().map_err(|e| {
            AIError::InvalidResponse(format!("Failed to parse generate response: {}", e))
        })?;

        debug!("Received {} chars from model", generated.response.chars().count());
        Ok(generated.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_client_creation() {
        let client = OllamaClient::new("http://localhost:11434", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:11434");
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = OllamaClient::new("http://localhost:11434/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:11434");
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(GenerateRequest {
            model: "qwen2.5:7b",
            prompt: "hi",
            stream: false,
        })
        .unwrap();
        assert_eq!(body["model"], "qwen2.5:7b");
        assert_eq!(body["stream"], false);
    }
}
