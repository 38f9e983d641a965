//! milkdoc application binary - composition root.
//!
//! 1. Parse CLI arguments and resolve the configuration file
//! 2. Initialize tracing
//! 3. Build the Cortex adapters and the answering orchestrator
//! 4. Run the requested command (chat REPL, one-shot ask, listings)

mod cli;
mod repl;

use std::io::{self, Write};
use std::path::Path;

use clap::Parser;
use milkdoc_chat::{category_choices, AnsweringOrchestrator, ChatError, ChatSession, SessionConfig};
use milkdoc_core::{MilkdocConfig, MilkdocError};
use milkdoc_cortex::CortexBackends;

use cli::{CliArgs, Command};
use repl::{render_outcome, Repl};

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();
}

/// Initial session selections from configuration, overridden by CLI flags.
fn build_session(config: &MilkdocConfig, args: &CliArgs) -> Result<ChatSession, ChatError> {
    let mut session_config = SessionConfig::from_config(&config.chat);
    if let Some(model) = &args.model {
        session_config.select_model(model)?;
    }
    if let Some(category) = &args.category {
        session_config.select_category(category);
    }
    session_config.debug |= args.debug;
    Ok(ChatSession::new(session_config))
}

fn init_config(path: &Path, force: bool) -> Result<(), MilkdocError> {
    if path.exists() && !force {
        return Err(MilkdocError::Config(format!(
            "{} already exists; pass --force to overwrite",
            path.display()
        )));
    }
    MilkdocConfig::default().save(path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();
    let config_file = args.resolve_config_path();

    // Config is read before tracing so its log level applies; a load failure
    // is reported once the subscriber is up.
    let loaded = MilkdocConfig::load(&config_file);
    let config_level = loaded
        .as_ref()
        .map(|c| c.general.log_level.as_str())
        .unwrap_or("info");
    init_tracing(&args.resolve_log_level(config_level));

    if let Command::InitConfig { force } = args.command {
        init_config(&config_file, force)?;
        return Ok(());
    }

    let config = match loaded {
        Ok(config) => {
            tracing::info!(path = %config_file.display(), "Configuration loaded");
            config
        }
        Err(e) => {
            tracing::warn!(
                path = %config_file.display(),
                error = %e,
                "Failed to load config, using defaults"
            );
            MilkdocConfig::default()
        }
    };
    config.validate()?;

    if let Command::Models = args.command {
        let session = build_session(&config, &args)?;
        for model in session.config.available_models() {
            let marker = if *model == session.config.model { "*" } else { " " };
            println!("{} {}", marker, model);
        }
        return Ok(());
    }

    let backends = CortexBackends::from_config(&config.cortex)?;
    tracing::info!(account = %config.cortex.account_url, "Cortex backends ready");

    match &args.command {
        Command::Categories => {
            for choice in category_choices(&*backends.categories).await? {
                println!("{}", choice);
            }
        }
        Command::Ask { question } => {
            let orchestrator = AnsweringOrchestrator::new(
                backends.search.clone(),
                backends.complete.clone(),
                &config,
            );
            let mut session = build_session(&config, &args)?;
            let outcome = orchestrator.answer(&mut session, question).await?;
            let mut stdout = io::stdout().lock();
            render_outcome(&mut stdout, &outcome, session.config.debug)?;
            stdout.flush()?;
        }
        Command::Chat => {
            let orchestrator = AnsweringOrchestrator::new(
                backends.search.clone(),
                backends.complete.clone(),
                &config,
            );
            let session = build_session(&config, &args)?;
            tracing::info!(session_id = %session.id, model = %session.config.model, "Chat session started");

            let mut repl = Repl::new(&orchestrator, &*backends.categories, session);
            let stdin = io::stdin().lock();
            let mut stdout = io::stdout().lock();
            repl.run(stdin, &mut stdout).await?;
        }
        Command::Models | Command::InitConfig { .. } => {}
    }

    Ok(())
}
