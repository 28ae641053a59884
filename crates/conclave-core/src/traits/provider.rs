// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider trait for LLM endpoint integrations.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ConclaveError;
use crate::types::{LlmRequest, LlmResponse};

/// Adapter for LLM provider integrations.
///
/// One call per persona turn. Implementations must honor the cancellation
/// token promptly and surface network and server failures as `Err` rather
/// than panicking; the persona engine absorbs failures into synthesized
/// Stuck responses.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider identifier (e.g. "openai-compatible", "mock").
    fn name(&self) -> &str;

    /// Sends a completion request and returns the full response.
    async fn generate(
        &self,
        request: LlmRequest,
        cancel: CancellationToken,
    ) -> Result<LlmResponse, ConclaveError>;
}
