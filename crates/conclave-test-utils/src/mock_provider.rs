// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock LLM provider for deterministic testing.
//!
//! `MockProvider` implements `LlmProvider` with pre-configured responses,
//! enabling fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use conclave_core::{ConclaveError, LlmProvider, LlmRequest, LlmResponse};

/// A mock LLM provider that returns pre-configured responses.
///
/// Responses are popped from a FIFO queue. When the queue is empty, a
/// default "mock response" text is returned. An entry may instead be an
/// error, which is returned as a provider failure. Every request is
/// recorded for assertions.
pub struct MockProvider {
    responses: Arc<Mutex<VecDeque<Result<String, String>>>>,
    requests: Arc<Mutex<Vec<LlmRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with an empty response queue.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock provider pre-loaded with the given responses.
    pub fn with_responses(responses: Vec<impl Into<String>>) -> Self {
        let provider = Self::new();
        {
            let queue = provider.responses.clone();
            let mut guard = queue.try_lock().expect("fresh mutex");
            for response in responses {
                guard.push_back(Ok(response.into()));
            }
        }
        provider
    }

    /// Add a response to the end of the queue.
    pub async fn push_response(&self, text: impl Into<String>) {
        self.responses.lock().await.push_back(Ok(text.into()));
    }

    /// Add a transport failure to the end of the queue.
    pub async fn push_error(&self, message: impl Into<String>) {
        self.responses.lock().await.push_back(Err(message.into()));
    }

    /// All requests seen so far, in order.
    pub async fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().await.clone()
    }

    /// Number of generate calls made.
    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    async fn next_response(&self) -> Result<String, String> {
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok("mock response".to_string()))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    async fn generate(
        &self,
        request: LlmRequest,
        cancel: CancellationToken,
    ) -> Result<LlmResponse, ConclaveError> {
        if cancel.is_cancelled() {
            return Err(ConclaveError::Cancelled);
        }
        let model = request.model.clone();
        self.requests.lock().await.push(request);

        match self.next_response().await {
            Ok(content) => Ok(LlmResponse {
                content,
                model: Some(model),
                total_tokens: Some(30),
                duration_ms: Some(1),
            }),
            Err(message) => Err(ConclaveError::Provider {
                message,
                source: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conclave_core::{ChatMessage, ChatRole};

    fn request() -> LlmRequest {
        LlmRequest {
            model: "test-model".into(),
            system_prompt: "system".into(),
            messages: vec![ChatMessage {
                role: ChatRole::User,
                content: "hi".into(),
            }],
            temperature: 0.5,
            max_tokens: 128,
        }
    }

    #[tokio::test]
    async fn default_response_when_queue_empty() {
        let provider = MockProvider::new();
        let response = provider
            .generate(request(), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(response.content, "mock response");
    }

    #[tokio::test]
    async fn queued_responses_returned_in_order() {
        let provider = MockProvider::with_responses(vec!["first", "second"]);
        let cancel = CancellationToken::new();

        let first = provider.generate(request(), cancel.clone()).await.unwrap();
        let second = provider.generate(request(), cancel.clone()).await.unwrap();
        let fallback = provider.generate(request(), cancel).await.unwrap();

        assert_eq!(first.content, "first");
        assert_eq!(second.content, "second");
        assert_eq!(fallback.content, "mock response");
        assert_eq!(provider.call_count().await, 3);
    }

    #[tokio::test]
    async fn queued_error_is_returned_as_provider_failure() {
        let provider = MockProvider::new();
        provider.push_error("connection refused").await;

        let err = provider
            .generate(request(), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ConclaveError::Provider { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn requests_are_recorded() {
        let provider = MockProvider::with_responses(vec!["ok"]);
        provider
            .generate(request(), CancellationToken::new())
            .await
            .unwrap();

        let requests = provider.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system_prompt, "system");
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits() {
        let provider = MockProvider::with_responses(vec!["never"]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = provider.generate(request(), cancel).await.unwrap_err();
        assert!(matches!(err, ConclaveError::Cancelled));
        assert_eq!(provider.call_count().await, 0);
    }
}
