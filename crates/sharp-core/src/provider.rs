//! AI Provider trait and configuration.
//!
//! Defines the interface that generative text backends must implement.

use crate::{prompt::Instruction, GenerationError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Configuration for an AI provider.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key for authentication.
    pub api_key: String,

    /// Model identifier.
    pub model: String,

    /// Base URL for the API.
    pub base_url: Option<String>,

    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,

    /// Request timeout in seconds. `None` keeps the HTTP client default.
    pub timeout_seconds: Option<u64>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl ProviderConfig {
    /// Create a new provider config with API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            max_tokens: None,
            timeout_seconds: None,
        }
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set max tokens.
    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    /// Set timeout.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }
}

/// Trait that generative text backends must implement.
///
/// One call is one blocking round trip: no retries, no streaming.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Send the instruction and return the text of the first completion
    /// segment, untouched.
    async fn complete(&self, instruction: &Instruction) -> Result<String, GenerationError>;
}

/// A scripted provider for testing.
///
/// Replies are consumed in order; once exhausted, every call returns the
/// fallback document. Every instruction received is recorded.
#[derive(Debug, Default)]
pub struct MockProvider {
    replies: Mutex<VecDeque<Result<String, GenerationError>>>,
    calls: Mutex<Vec<Instruction>>,
}

impl MockProvider {
    /// Create a new mock provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    /// Queue a failing reply.
    pub fn with_error(self, error: GenerationError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, reply: Result<String, GenerationError>) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
    }

    /// Instructions received so far.
    pub fn calls(&self) -> Vec<Instruction> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl AiProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, instruction: &Instruction) -> Result<String, GenerationError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(instruction.clone());

        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| Ok("<!DOCTYPE html><html><body>mock</body></html>".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instruction() -> Instruction {
        Instruction {
            system: "system".into(),
            user: "user".into(),
        }
    }

    #[tokio::test]
    async fn test_mock_provider_replays_in_order() {
        let provider = MockProvider::new()
            .with_response("<p>one</p>")
            .with_error(GenerationError::service("boom"));

        assert_eq!(provider.complete(&instruction()).await.unwrap(), "<p>one</p>");
        assert_eq!(
            provider.complete(&instruction()).await.unwrap_err().message,
            "boom"
        );
        assert!(provider.complete(&instruction()).await.unwrap().contains("mock"));
        assert_eq!(provider.call_count(), 3);
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = ProviderConfig::new("sk-secret", "model").with_max_tokens(10);
        let printed = format!("{:?}", config);
        assert!(!printed.contains("sk-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
