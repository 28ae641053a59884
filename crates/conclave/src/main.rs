// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conclave - a multi-agent problem-solving orchestrator.
//!
//! This is the binary entry point. A problem statement is deliberated by ten
//! model-backed personas until a compiled solution, a stuck verdict, or a
//! cancellation.

mod app;
mod sessions;
mod solve;

use clap::{Parser, Subcommand};

/// Conclave - a multi-agent problem-solving orchestrator.
#[derive(Parser, Debug)]
#[command(name = "conclave", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Submit a problem statement and drive it to a solution.
    Solve {
        /// The problem to solve.
        problem: String,
    },
    /// Resume an interrupted or stuck session.
    Resume {
        /// The session to resume.
        session_id: String,
    },
    /// Answer a pending clarification question.
    Clarify {
        /// The session waiting for clarification.
        session_id: String,
        /// Your answer to the panel's question.
        answer: String,
    },
    /// Cancel a session.
    Cancel {
        /// The session to cancel.
        session_id: String,
    },
    /// List sessions.
    Sessions {
        /// Filter by status (Active, WaitingForClarification, Completed,
        /// Stuck, Cancelled, Interrupted).
        #[arg(long)]
        status: Option<String>,
    },
    /// Show one session's timeline and outcome.
    Show {
        /// The session to display.
        session_id: String,
    },
    /// Manage Conclave configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Config management subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Validate the configuration and report any errors.
    Validate,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match conclave_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            conclave_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    if let Commands::Config {
        action: ConfigCommands::Validate,
    } = &cli.command
    {
        // Loading already validated; reaching this point means success.
        println!("configuration ok");
        return;
    }

    init_tracing(&config.orchestrator.log_level);

    let app = match app::build(config).await {
        Ok(app) => app,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Solve { problem } => solve::run_solve(&app, &problem).await,
        Commands::Resume { session_id } => solve::run_resume(&app, &session_id).await,
        Commands::Clarify { session_id, answer } => {
            solve::run_clarify(&app, &session_id, &answer).await
        }
        Commands::Cancel { session_id } => solve::run_cancel(&app, &session_id).await,
        Commands::Sessions { status } => sessions::run_sessions(&app, status.as_deref()).await,
        Commands::Show { session_id } => sessions::run_show(&app, &session_id).await,
        Commands::Config { .. } => unreachable!("handled above"),
    };

    if let Err(e) = app.storage.close().await {
        eprintln!("warning: storage close failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("conclave={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
