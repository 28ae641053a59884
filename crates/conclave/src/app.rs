// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Component wiring for the CLI.
//!
//! Builds the full stack (storage, provider, memory, workspace, bus,
//! orchestrator) from a validated configuration. Startup crash recovery and
//! roster seeding run here, before any command accepts work.

use std::sync::Arc;

use async_trait::async_trait;
use colored::Colorize;
use tracing::info;

use conclave_bus::SessionBus;
use conclave_config::ConclaveConfig;
use conclave_core::{
    ConclaveError, EventSink, SessionEvent, StorageAdapter,
};
use conclave_memory::MemoryStore;
use conclave_openai::OpenAiProvider;
use conclave_orchestrator::{mark_interrupted_sessions, Orchestrator};
use conclave_persona::{default_persona_configs, PersonaEngine};
use conclave_storage::SqliteStorage;
use conclave_workspace::FsWorkspace;

/// The assembled application.
pub struct App {
    pub storage: Arc<dyn StorageAdapter>,
    pub orchestrator: Arc<Orchestrator>,
}

/// Builds every component and runs startup recovery.
pub async fn build(config: ConclaveConfig) -> Result<App, ConclaveError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

    // Crash recovery before anything else can touch sessions.
    let recovered = mark_interrupted_sessions(storage.as_ref()).await;
    if recovered > 0 {
        info!(recovered, "stale sessions marked interrupted");
    }

    storage
        .seed_persona_configs(&default_persona_configs(&config.llm.default_model))
        .await?;

    let provider = Arc::new(OpenAiProvider::new(&config.llm)?);
    let memory = Arc::new(MemoryStore::new(storage.clone(), config.memory.clone()));
    let workspace = Arc::new(FsWorkspace::new(config.workspace.root.clone()));
    let bus = Arc::new(SessionBus::new());

    let engine = Arc::new(PersonaEngine::new(
        provider,
        storage.clone(),
        memory.clone(),
        workspace,
        config.llm.default_model.clone(),
    ));

    let sink: Arc<dyn EventSink> = Arc::new(TeeSink { bus });
    let orchestrator = Arc::new(Orchestrator::new(storage.clone(), engine, memory, sink));

    Ok(App {
        storage,
        orchestrator,
    })
}

/// Event sink that renders session events on the terminal and forwards them
/// to the broadcast bus (the hook for real-time transports).
struct TeeSink {
    bus: Arc<SessionBus>,
}

#[async_trait]
impl EventSink for TeeSink {
    async fn publish(&self, session_id: &str, event: SessionEvent) -> Result<(), ConclaveError> {
        render_event(&event);
        self.bus.publish(session_id, event).await
    }
}

/// Prints one event as a conversation line.
pub fn render_event(event: &SessionEvent) {
    match event {
        SessionEvent::MessageReceived { message } => {
            let label = format!("{}:", message.from_persona);
            let label = if message.is_stuck {
                label.red().bold()
            } else {
                label.cyan().bold()
            };
            println!("{label} {}", message.content);
            if let Some(context) = &message.delegation_context {
                if *context != message.content {
                    println!("  {} {context}", "context:".dimmed());
                }
            }
        }
        SessionEvent::ClarificationRequested { message } => {
            println!(
                "{} {}",
                "needs input:".yellow().bold(),
                message.content
            );
        }
        SessionEvent::SessionStatusChanged { session } => {
            println!("{} {}", "status:".dimmed(), session.status);
        }
        SessionEvent::SolutionReady { session } => {
            if let Some(solution) = &session.final_solution {
                println!("\n{}\n{solution}", "solution:".green().bold());
            }
        }
        SessionEvent::SessionStuck {
            partial_solution, ..
        } => {
            println!("\n{}\n{partial_solution}", "stuck:".red().bold());
        }
    }
}
