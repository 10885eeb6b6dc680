/*!
 * Mock provider implementations for testing.
 *
 * This module provides a provider that never touches the network:
 * - `MockProvider::scripted(...)` - Replays a queue of canned replies in order
 * - `MockProvider::with_responder(...)` - Computes each reply from the request
 * - `MockProvider::failing()` - Always fails with an error
 *
 * `with_latency` delays each reply by a per-request number of milliseconds,
 * which lets tests make later requests finish first.
 *
 * Every call is recorded so tests can assert how many exchanges happened and
 * which prompts were sent.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::{Completion, CompletionRequest, Provider};

type Responder = Box<dyn Fn(&CompletionRequest) -> Result<String, ProviderError> + Send + Sync>;
type Latency = Box<dyn Fn(&CompletionRequest) -> u64 + Send + Sync>;

/// Mock provider for testing gateway, pipeline and evaluator behavior
pub struct MockProvider {
    /// Replies consumed front to back
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    /// Used once the script is exhausted
    responder: Option<Responder>,
    /// Milliseconds to wait before replying
    latency: Option<Latency>,
    /// Every request received, in call order
    requests: Mutex<Vec<CompletionRequest>>,
    /// Number of calls made
    call_count: AtomicUsize,
}

impl std::fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockProvider")
            .field("remaining", &self.script.lock().len())
            .field("call_count", &self.call_count())
            .finish_non_exhaustive()
    }
}

impl MockProvider {
    fn new(script: VecDeque<Result<String, ProviderError>>, responder: Option<Responder>) -> Self {
        Self {
            script: Mutex::new(script),
            responder,
            latency: None,
            requests: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Create a mock that returns the given replies in order
    pub fn scripted<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(replies.into_iter().map(|r| Ok(r.into())).collect(), None)
    }

    /// Create a mock whose replies may include provider failures
    pub fn scripted_results(replies: Vec<Result<String, ProviderError>>) -> Self {
        Self::new(replies.into(), None)
    }

    /// Create a mock that computes each reply from the request
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<String, ProviderError> + Send + Sync + 'static,
    {
        Self::new(VecDeque::new(), Some(Box::new(responder)))
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::with_responder(|_| Err(ProviderError::ConnectionError("mock provider is offline".to_string())))
    }

    /// Delay each reply by `latency_ms(request)` milliseconds
    pub fn with_latency<F>(mut self, latency_ms: F) -> Self
    where
        F: Fn(&CompletionRequest) -> u64 + Send + Sync + 'static,
    {
        self.latency = Some(Box::new(latency_ms));
        self
    }

    /// Number of completed or failed calls so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Snapshot of every request received
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    fn next_reply(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        if let Some(reply) = self.script.lock().pop_front() {
            return reply;
        }
        match &self.responder {
            Some(responder) => responder(request),
            None => Err(ProviderError::RequestFailed("mock script exhausted".to_string())),
        }
    }

    /// Rough token estimate, four characters per token
    fn estimate_tokens(text: &str) -> u64 {
        (text.chars().count() as u64).div_ceil(4)
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        if let Some(latency) = &self.latency {
            tokio::time::sleep(tokio::time::Duration::from_millis(latency(&request))).await;
        }

        let text = self.next_reply(&request)?;
        Ok(Completion {
            prompt_tokens: Self::estimate_tokens(&request.system) + Self::estimate_tokens(&request.user),
            completion_tokens: Self::estimate_tokens(&text),
            text,
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
