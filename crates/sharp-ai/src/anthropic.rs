//! Anthropic Claude provider implementation.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use sharp_core::{
    AiProvider, GenerationError, Instruction, ProviderConfig, Result, SharpError,
};
use tracing::{debug, instrument};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4000;

/// Anthropic Claude provider for document generation.
#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    client: Client,
    config: ProviderConfig,
}

/// Anthropic message request.
#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

/// Anthropic message response.
#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

/// Anthropic error envelope: `{"type":"error","error":{"type":..,"message":..}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider.
    ///
    /// Without `timeout_seconds` the client keeps reqwest's default.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_seconds {
            builder = builder.timeout(std::time::Duration::from_secs(timeout));
        }
        let client = builder
            .build()
            .map_err(|e| SharpError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl AiProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    #[instrument(skip(self, instruction), fields(model = %self.config.model))]
    async fn complete(
        &self,
        instruction: &Instruction,
    ) -> std::result::Result<String, GenerationError> {
        let api_request = MessageRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system: &instruction.system,
            messages: vec![Message {
                role: "user",
                content: &instruction.user,
            }],
        };

        let url = self.config.base_url.as_deref().unwrap_or(ANTHROPIC_API_URL);

        let response = self
            .client
            .post(url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&api_request)
            .send()
            .await
            .map_err(|e| GenerationError::transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }

        let msg_response: MessageResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::malformed(e.to_string()))?;

        if let Some(usage) = &msg_response.usage {
            debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Completion received"
            );
        }

        let first = msg_response
            .content
            .into_iter()
            .next()
            .ok_or_else(|| GenerationError::malformed("Response contained no content"))?;

        first.text.ok_or_else(|| {
            GenerationError::malformed(format!("First content block is '{}', not text", first.kind))
        })
    }
}

/// Map a non-success response to an error, preferring the service's own message.
fn classify_failure(status: StatusCode, body: &str) -> GenerationError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| format!("API error {}: {}", status, body));

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationError::auth(message),
        StatusCode::TOO_MANY_REQUESTS => GenerationError::rate_limited(message),
        _ => GenerationError::service(message),
    }
}
