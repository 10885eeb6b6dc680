/*!
 * Provider implementations for chat-style completion services.
 *
 * This module contains client implementations for the supported LLM providers:
 * - OpenAI: chat completions API (default)
 * - Anthropic: messages API
 * - Mock: scripted replies for tests
 *
 * `pricing` maps token usage to monetary cost per model.
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// One provider-neutral chat exchange: a system prompt and a single user turn.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model identifier
    pub model: String,
    /// Rendered system prompt
    pub system: String,
    /// Rendered user prompt
    pub user: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum number of output tokens
    pub max_tokens: u32,
}

/// Raw reply text and token counts reported by the provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    /// Reply text, unparsed
    pub text: String,
    /// Prompt tokens billed
    pub prompt_tokens: u64,
    /// Completion tokens billed
    pub completion_tokens: u64,
}

impl Completion {
    /// Total tokens billed for the exchange
    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Common trait for all LLM providers
///
/// Implementations perform exactly one request per call and never retry;
/// failures surface to the caller unchanged.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<Completion, ProviderError>` - The reply or a transport/API error
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError>;

    /// Short provider name for logs
    fn name(&self) -> &'static str;
}

pub mod anthropic;
pub mod mock;
pub mod openai;
pub mod pricing;

/// Map a non-success HTTP status to the matching provider error.
pub(crate) fn status_error(status_code: u16, message: String) -> ProviderError {
    match status_code {
        401 | 403 => ProviderError::AuthenticationError(message),
        429 => ProviderError::RateLimitExceeded(message),
        _ => ProviderError::ApiError { status_code, message },
    }
}

/// Map a reqwest transport error to a provider error.
pub(crate) fn transport_error(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::RequestFailed(format!("request timed out: {}", error))
    } else if error.is_connect() {
        ProviderError::ConnectionError(error.to_string())
    } else {
        ProviderError::RequestFailed(error.to_string())
    }
}
