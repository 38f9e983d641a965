//! CLI argument definitions for the milkdoc binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Drug-in-breastmilk document assistant over a managed search and LLM service.
#[derive(Parser, Debug)]
#[command(name = "milkdoc", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    /// Completion model for the session.
    #[arg(short = 'm', long = "model", global = true)]
    pub model: Option<String>,

    /// Restrict retrieval to one document category.
    #[arg(long = "category", global = true)]
    pub category: Option<String>,

    /// Print the reformulated query, raw search response and stage trail after each answer.
    #[arg(long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive chat session.
    Chat,
    /// Answer a single question and exit.
    Ask {
        /// The question to answer.
        question: String,
    },
    /// List the document categories available for filtering.
    Categories,
    /// List the configured completion models.
    Models,
    /// Write the default configuration file.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > MILKDOC_CONFIG env var > ~/.milkdoc/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        resolve_config_path(self.config.as_ref(), std::env::var("MILKDOC_CONFIG").ok())
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

fn resolve_config_path(flag: Option<&PathBuf>, env: Option<String>) -> PathBuf {
    if let Some(p) = flag {
        return p.clone();
    }
    if let Some(p) = env.filter(|p| !p.is_empty()) {
        return PathBuf::from(p);
    }
    default_config_path()
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".milkdoc").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".milkdoc").join("config.toml");
    }
    PathBuf::from("config.toml")
}
