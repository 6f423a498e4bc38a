//! Command-line interface definition and dispatch for dossier.
//!
//! Uses [`clap`] for argument parsing with derive macros. Every subcommand
//! that talks to the model builds the same [`App`] controller; only the
//! front end differs.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use crate::agent::{Agent, AgentOptions};
use crate::app::App;
use crate::config::Config;
use crate::provider::GeminiBackend;
use crate::tools::ToolRegistry;
use crate::{chat, format};

/// Top-level CLI structure for dossier.
#[derive(Parser)]
#[command(
    name = "dossier",
    about = "A research assistant that builds account plans from live web sources"
)]
pub struct Cli {
    /// Log at debug level (log file lives in the data directory)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for the dossier CLI.
///
/// The `///` doc comments on variants double as `--help` text rendered by clap.
#[derive(Subcommand)]
pub enum Commands {
    /// Ask a one-shot question
    Ask {
        /// The question to ask
        prompt: Vec<String>,
        /// Model to use (overrides config)
        #[arg(short, long)]
        model: Option<String>,
        /// Write the resulting account plan as JSON to the export directory
        #[arg(short, long)]
        export: bool,
    },
    /// Start an interactive research session
    Chat {
        /// Model to use (overrides config)
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Subcommands for the `config` command.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current config
    Show,
}

/// Parses command-line arguments into a [`Cli`] struct.
///
/// Delegates to [`clap::Parser::parse`], which exits the process on invalid input.
pub fn parse() -> Cli {
    Cli::parse()
}

/// Loads config and applies the `--model` override.
fn load_config(model: Option<String>) -> Result<Config> {
    let mut config = Config::load()?;
    if let Some(model) = model {
        config.model = model;
    }
    Ok(config)
}

/// Wires the Gemini backend, the tool registry and the controller together.
fn build_app(config: &Config) -> Result<App> {
    let backend = GeminiBackend::from_config(config)?;
    info!(model = backend.model(), "Using Gemini backend");
    let agent = Agent::new(
        Arc::new(backend),
        ToolRegistry::with_builtins(),
        AgentOptions::from_config(config),
    );
    Ok(App::new(agent))
}

/// Dispatches the parsed CLI command to its handler.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Ask {
            prompt,
            model,
            export,
        } => {
            let prompt = prompt.join(" ");
            if prompt.trim().is_empty() {
                anyhow::bail!("No prompt provided. Usage: dossier ask \"your question here\"");
            }

            let config = load_config(model)?;
            let mut app = build_app(&config)?;

            println!(
                "{} [model: {}]",
                "dossier".bold().cyan(),
                config.model.yellow(),
            );
            println!();
            println!("{} {}", ">".green().bold(), prompt);
            println!();

            let answer = app
                .send_message_with(&prompt, |status| {
                    if let Some(label) = status.label() {
                        eprintln!("{}", label.dimmed());
                    }
                })
                .await?;
            println!();
            println!("{}", format::render_markdown_lite(&answer.content));
            if !answer.sources().is_empty() {
                println!();
                println!("{}", format::format_sources(answer.sources()));
            }

            if let Some(plan) = app.plan() {
                println!();
                println!("{}", format::format_plan(plan));
            }
            if export {
                let dir = chat::default_export_dir(&config)?;
                let path = app.export_plan(&dir)?;
                println!();
                println!("{} {}", "Exported to".dimmed(), path.display());
            }
            Ok(())
        }
        Commands::Chat { model } => {
            let config = load_config(model)?;
            let app = build_app(&config)?;
            chat::run_chat(&config, app).await
        }
        Commands::Config { action } => {
            let mut config = Config::load()?;
            match action {
                ConfigAction::Show => {
                    let path = Config::config_path()?;
                    println!("{} {}", "Config path:".bold(), path.display());
                    println!();
                    if config.api_key.as_deref().is_some_and(|k| !k.is_empty()) {
                        config.api_key = Some("********".to_string());
                    }
                    let toml_str = toml::to_string_pretty(&config)?;
                    println!("{}", toml_str);
                }
            }
            Ok(())
        }
    }
}
