//! Generation backend adapter.
//!
//! The debate engine depends only on [`GenerationClient`]: prompt in, text
//! out, or a [`GenerationError`]. [`OllamaClient`] is the production
//! implementation and talks to an Ollama-style `/api/generate` endpoint.
//! Calls are blocking; each carries its own deadline.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::BackendConfig;
use crate::error::GenerationError;

/// One generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f64,
    pub timeout: Duration,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>, temperature: f64) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            temperature,
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Stateless text generation backend.
pub trait GenerationClient {
    /// Generate text for a prompt. Must not panic on backend failure.
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

impl<T: GenerationClient + ?Sized> GenerationClient for &T {
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        (**self).generate(request)
    }
}

impl<T: GenerationClient + ?Sized> GenerationClient for Box<T> {
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        (**self).generate(request)
    }
}

impl<T: GenerationClient + ?Sized> GenerationClient for Arc<T> {
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        (**self).generate(request)
    }
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
}

/// Blocking client for an Ollama `/api/generate` endpoint.
pub struct OllamaClient {
    endpoint: String,
    http: reqwest::blocking::Client,
}

impl OllamaClient {
    /// Create a client for the given endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, GenerationError> {
        let http = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| GenerationError::transport(e.to_string(), false))?;
        Ok(Self {
            endpoint: endpoint.into(),
            http,
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, GenerationError> {
        Self::new(config.endpoint.clone())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl GenerationClient for OllamaClient {
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let start = Instant::now();
        let body = OllamaRequest {
            model: &request.model,
            prompt: &request.prompt,
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
            },
        };

        let response = self
            .http
            .post(&self.endpoint)
            .timeout(request.timeout)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        let text = response.text()?;
        let parsed: OllamaResponse =
            serde_json::from_str(&text).map_err(|e| GenerationError::Decode(e.to_string()))?;

        debug!(
            model = %request.model,
            prompt_chars = request.prompt.len(),
            response_chars = parsed.response.len(),
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "generation call complete"
        );

        Ok(parsed.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn request() -> GenerationRequest {
        GenerationRequest::new("llama3:8b", "Review this", 0.6).with_timeout(Duration::from_secs(5))
    }

    #[test]
    fn test_generate_sends_ollama_payload() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/generate")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "llama3:8b",
                "prompt": "Review this",
                "stream": false,
                "options": {"temperature": 0.6}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"model":"llama3:8b","response":"looks fine","done":true}"#)
            .create();

        let client = OllamaClient::new(format!("{}/api/generate", server.url())).unwrap();
        let text = client.generate(&request()).unwrap();

        assert_eq!(text, "looks fine");
        mock.assert();
    }

    #[test]
    fn test_non_success_status_is_error() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/api/generate")
            .with_status(500)
            .with_body("model not loaded")
            .create();

        let client = OllamaClient::new(format!("{}/api/generate", server.url())).unwrap();
        match client.generate(&request()) {
            Err(GenerationError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "model not loaded");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[test]
    fn test_undecodable_body_is_error() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_body("<html>proxy error</html>")
            .create();

        let client = OllamaClient::new(format!("{}/api/generate", server.url())).unwrap();
        assert!(matches!(
            client.generate(&request()),
            Err(GenerationError::Decode(_))
        ));
    }

    #[test]
    fn test_missing_response_field_is_empty_text() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_body(r#"{"done":true}"#)
            .create();

        let client = OllamaClient::new(format!("{}/api/generate", server.url())).unwrap();
        assert_eq!(client.generate(&request()).unwrap(), "");
    }

    #[test]
    fn test_unreachable_endpoint_is_transport_error() {
        // Port 9 (discard) is almost never listening locally.
        let client = OllamaClient::new("http://127.0.0.1:9/api/generate").unwrap();
        assert!(matches!(
            client.generate(&request()),
            Err(GenerationError::Transport { .. })
        ));
    }
}
