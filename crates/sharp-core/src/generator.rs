//! Generation client.
//!
//! Composes the instruction for a request, makes one round trip to the
//! provider and hands back the document text or a [`GenerationError`].

use crate::{prompt, AiProvider, GenerationError, GenerationRequest};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Generates documents through an [`AiProvider`].
///
/// # Example
///
/// ```rust,ignore
/// use sharp_core::{Credentials, Generator, GenerationRequest, SharpConfig, StyleMode};
///
/// let config = SharpConfig::from_env();
/// let generator = Generator::new(sharp_ai::anthropic(&config, &Credentials::from_env()?)?);
/// let request = GenerationRequest::new("landing page for a bakery", StyleMode::MinimalSaas)?;
/// let html = generator.generate(&request).await?;
/// ```
pub struct Generator<P: AiProvider> {
    provider: Arc<P>,
}

impl<P: AiProvider> Clone for Generator<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<P: AiProvider + 'static> Generator<P> {
    /// Create a new generator with the given provider.
    pub fn new(provider: P) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }

    /// The underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Generate a document for a validated request.
    ///
    /// The text is returned as the provider produced it, except that a
    /// response wrapped entirely in one markdown fence is unwrapped.
    #[instrument(skip(self, request), fields(provider = self.provider.name(), style = %request.style_mode()))]
    pub async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let instruction = prompt::compose(request);
        debug!(chars = request.requirement_text().len(), "Sending generation request");

        match self.provider.complete(&instruction).await {
            Ok(text) => {
                info!(chars = text.len(), "Generation finished");
                Ok(unwrap_fence(text))
            }
            Err(e) => {
                warn!(kind = ?e.kind, "Generation failed: {}", e);
                Err(e)
            }
        }
    }
}

/// Remove a markdown fence that wraps the whole response.
///
/// Anything else, including leading commentary or a fence in the middle of
/// the text, is returned unchanged.
fn unwrap_fence(text: String) -> String {
    let trimmed = text.trim();
    if !(trimmed.starts_with("```") && trimmed.ends_with("```")) {
        return text;
    }

    let lines: Vec<&str> = trimmed.lines().collect();
    if lines.len() < 3 {
        return text;
    }
    // Only the opening and closing lines may be fences.
    let inner = &lines[1..lines.len() - 1];
    if inner.iter().any(|line| line.trim_start().starts_with("```")) {
        return text;
    }
    inner.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GenerationErrorKind, MockProvider, StyleMode};

    fn request() -> GenerationRequest {
        GenerationRequest::new("landing page for a bakery", StyleMode::MinimalSaas).unwrap()
    }

    #[tokio::test]
    async fn test_generate_passes_text_through() {
        let raw = "Sure! Here it is:\n<!DOCTYPE html><html></html>\n";
        let generator = Generator::new(MockProvider::new().with_response(raw));

        let html = generator.generate(&request()).await.unwrap();
        assert_eq!(html, raw);
    }

    #[tokio::test]
    async fn test_generate_sends_composed_instruction_once() {
        let generator = Generator::new(MockProvider::new().with_response("<html></html>"));
        generator.generate(&request()).await.unwrap();

        let calls = generator.provider().calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].user.contains("landing page for a bakery"));
        assert!(calls[0].system.contains("Minimal SaaS"));
    }

    #[tokio::test]
    async fn test_generate_returns_error_value() {
        let generator = Generator::new(
            MockProvider::new().with_error(GenerationError::rate_limited("rate limited")),
        );

        let err = generator.generate(&request()).await.unwrap_err();
        assert_eq!(err.kind, GenerationErrorKind::RateLimited);
        assert_eq!(err.to_string(), "rate limited");
    }

    #[test]
    fn test_unwrap_fence() {
        let fenced = "```html\n<!DOCTYPE html>\n<html></html>\n```".to_string();
        assert_eq!(unwrap_fence(fenced), "<!DOCTYPE html>\n<html></html>");

        let partial = "Here:\n```html\n<html></html>\n```".to_string();
        assert_eq!(unwrap_fence(partial.clone()), partial);

        let two_blocks = "```html\n<a>\n```\n```css\nb\n```".to_string();
        assert_eq!(unwrap_fence(two_blocks.clone()), two_blocks);
    }
}
