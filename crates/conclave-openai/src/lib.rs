// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible provider for the Conclave orchestrator.
//!
//! This crate implements [`LlmProvider`] against any endpoint speaking the
//! chat-completions wire format (hosted gateways, local model servers).

pub mod client;
pub mod types;

use std::time::Instant;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use conclave_config::model::LlmConfig;
use conclave_core::{ChatRole, ConclaveError, LlmProvider, LlmRequest, LlmResponse};

use crate::client::ChatClient;
use crate::types::{ChatCompletionRequest, WireMessage};

/// Chat-completions provider implementing [`LlmProvider`].
pub struct OpenAiProvider {
    client: ChatClient,
}

impl OpenAiProvider {
    /// Creates a new provider from the given configuration.
    pub fn new(config: &LlmConfig) -> Result<Self, ConclaveError> {
        let client = ChatClient::new(
            config.base_url.clone(),
            config.api_key.as_deref(),
            std::time::Duration::from_secs(config.timeout_secs),
        )?;
        info!(
            base_url = config.base_url.as_str(),
            model = config.default_model.as_str(),
            "chat-completions provider initialized"
        );
        Ok(Self { client })
    }

    fn to_wire_request(request: &LlmRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if !request.system_prompt.is_empty() {
            messages.push(WireMessage {
                role: "system".to_string(),
                content: request.system_prompt.clone(),
            });
        }
        for msg in &request.messages {
            let role = match msg.role {
                ChatRole::System => "system",
                ChatRole::User => "user",
                ChatRole::Assistant => "assistant",
            };
            messages.push(WireMessage {
                role: role.to_string(),
                content: msg.content.clone(),
            });
        }

        ChatCompletionRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    async fn generate(
        &self,
        request: LlmRequest,
        cancel: CancellationToken,
    ) -> Result<LlmResponse, ConclaveError> {
        let wire = Self::to_wire_request(&request);
        let started = Instant::now();

        let response = tokio::select! {
            result = self.client.complete(&wire) => result?,
            () = cancel.cancelled() => return Err(ConclaveError::Cancelled),
        };

        let duration_ms = started.elapsed().as_millis() as u64;
        let content = response
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .ok_or_else(|| ConclaveError::Provider {
                message: "response contained no choices".into(),
                source: None,
            })?;
        let total_tokens = response.usage.and_then(|u| u.total_tokens);

        debug!(
            model = request.model.as_str(),
            total_tokens, duration_ms, "generation complete"
        );

        Ok(LlmResponse {
            content,
            model: response.model,
            total_tokens,
            duration_ms: Some(duration_ms),
        })
    }
}
