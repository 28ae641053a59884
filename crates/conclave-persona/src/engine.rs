// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The persona engine: one model invocation per call.
//!
//! `process` assembles the prompt, invokes the provider, parses the reply,
//! and performs memory and file side effects before returning. Transport
//! failures and empty replies degrade to synthesized Stuck responses; only
//! cancellation and repository failures propagate as errors.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use conclave_core::{
    ConclaveError, LlmProvider, LlmRequest, MemoryRecord, Message, Persona, PersonaResponse,
    Session, StorageAdapter, WorkspaceSink,
};
use conclave_memory::MemoryStore;

use crate::prompt;

/// Drives a single persona turn against the LLM provider.
pub struct PersonaEngine {
    provider: Arc<dyn LlmProvider>,
    storage: Arc<dyn StorageAdapter>,
    memory: Arc<MemoryStore>,
    workspace: Arc<dyn WorkspaceSink>,
    default_model: String,
}

impl PersonaEngine {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        storage: Arc<dyn StorageAdapter>,
        memory: Arc<MemoryStore>,
        workspace: Arc<dyn WorkspaceSink>,
        default_model: String,
    ) -> Self {
        Self {
            provider,
            storage,
            memory,
            workspace,
            default_model,
        }
    }

    /// Runs one persona turn.
    ///
    /// Memory and file side effects are applied before this returns, so a
    /// caller that persists and broadcasts the resulting message can assume
    /// they are durable.
    pub async fn process(
        &self,
        persona: Persona,
        incoming: &Message,
        session: &Session,
        memories: &[MemoryRecord],
        cancel: CancellationToken,
    ) -> Result<PersonaResponse, ConclaveError> {
        let Some(config) = self.storage.get_persona_config(persona).await? else {
            warn!(%persona, "no persona configuration found");
            return Ok(PersonaResponse::stuck(
                format!("Configuration error: no configuration found for {persona}."),
                None,
            ));
        };
        if !config.enabled {
            return Ok(PersonaResponse::decline(format!(
                "{} is currently unavailable.",
                config.display_name
            )));
        }

        let system_prompt = prompt::build_system_prompt(&config, session, memories);
        let history = self
            .storage
            .recent_messages(&session.id, prompt::HISTORY_WINDOW as i64)
            .await?;
        let messages = prompt::build_messages(&history, incoming);

        let model = if config.model_name.is_empty() {
            self.default_model.clone()
        } else {
            config.model_name.clone()
        };
        let request = LlmRequest {
            model,
            system_prompt,
            messages,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        };

        let generated = match self.provider.generate(request, cancel.clone()).await {
            Ok(response) => response,
            Err(ConclaveError::Cancelled) => return Err(ConclaveError::Cancelled),
            Err(e) => {
                warn!(%persona, error = %e, "provider call failed, synthesizing stuck response");
                return Ok(PersonaResponse::stuck(
                    "I hit an error processing this request and cannot continue.",
                    Some(e.to_string()),
                ));
            }
        };

        if generated.content.trim().is_empty() {
            warn!(%persona, "provider returned an empty response");
            return Ok(PersonaResponse::stuck(
                "I received an empty response and cannot continue.",
                None,
            ));
        }

        let parsed = conclave_parser::parse(&generated.content);
        debug!(
            %persona,
            response_type = ?parsed.response.response_type,
            stores = parsed.stores.len(),
            files = parsed.files.len(),
            tokens = generated.total_tokens,
            duration_ms = generated.duration_ms,
            "persona turn parsed"
        );

        self.apply_store_directives(persona, session, &parsed.stores)
            .await?;
        self.register_recalls(persona, session, &parsed.recalls).await;
        self.apply_file_directives(&parsed.files, cancel).await;

        Ok(parsed.response)
    }

    /// Persists `[STORE]` directives; validation failures are logged and
    /// skipped, repository failures propagate.
    async fn apply_store_directives(
        &self,
        persona: Persona,
        session: &Session,
        stores: &[conclave_parser::StoreDirective],
    ) -> Result<(), ConclaveError> {
        for store in stores {
            match self
                .memory
                .store(&session.id, persona, &store.identifier, &store.content)
                .await
            {
                Ok(_) => {}
                Err(ConclaveError::Validation(reason)) => {
                    warn!(
                        %persona,
                        identifier = store.identifier.as_str(),
                        reason = reason.as_str(),
                        "memory store rejected"
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Registers `[REMEMBER]` requests as accesses on the named memories.
    async fn register_recalls(&self, persona: Persona, session: &Session, recalls: &[String]) {
        for identifier in recalls {
            match self.memory.by_identifier(&session.id, persona, identifier).await {
                Ok(Some(_)) => {
                    debug!(%persona, identifier = identifier.as_str(), "memory recall registered");
                }
                Ok(None) => {
                    debug!(%persona, identifier = identifier.as_str(), "recall of unknown memory");
                }
                Err(e) => {
                    warn!(%persona, identifier = identifier.as_str(), error = %e, "memory recall failed");
                }
            }
        }
    }

    /// Forwards `[FILE]` directives to the workspace sink; failures are
    /// logged and skipped.
    async fn apply_file_directives(
        &self,
        files: &[conclave_parser::FileDirective],
        cancel: CancellationToken,
    ) {
        for file in files {
            if let Err(e) = self
                .workspace
                .write(&file.path, &file.content, cancel.clone())
                .await
            {
                warn!(path = file.path.as_str(), error = %e, "workspace write failed");
            }
        }
    }
}
