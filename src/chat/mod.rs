//! Interactive chat REPL for dossier.
//!
//! Provides a multi-turn conversation loop using [`rustyline`] for readline
//! support (history, line editing). Every line that is not a slash command
//! is handed to the [`App`] controller; the REPL only renders what the
//! controller returns.

mod commands;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::app::App;
use crate::config::Config;
use crate::format;

/// Runs the interactive chat REPL.
///
/// # Readline behavior
///
/// - **Ctrl+C**: cancels current input, stays in REPL
/// - **Ctrl+D**: exits cleanly with "goodbye."
/// - Readline history is persisted to `~/.cache/dossier/chat_history.txt`
pub async fn run_chat(config: &Config, mut app: App) -> Result<()> {
    println!(
        "{} [model: {}] (/help for commands, Ctrl+D to exit)",
        "dossier chat".bold().cyan(),
        config.model.yellow(),
    );
    println!();
    for msg in app.messages() {
        println!("{}", format::format_message(msg));
        println!();
    }

    let mut rl = DefaultEditor::new()?;
    let history_path = Config::cache_dir()?.join(crate::constants::HISTORY_FILENAME);
    if history_path.exists() {
        let _ = rl.load_history(&history_path);
    }
    let export_dir = default_export_dir(config)?;

    loop {
        let readline = rl.readline(&format!("{} ", ">".green().bold()));

        match readline {
            Ok(line) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                if line.starts_with('/') {
                    if let commands::CommandAction::Unknown(cmd) =
                        commands::handle_slash_command(&line, &mut app, &export_dir)
                    {
                        println!("{} Unknown command: {} (try /help)", "?".yellow(), cmd);
                    }
                    println!();
                    continue;
                }

                println!();
                let plan_before = app.plan().map(|p| p.last_updated);
                let result = app
                    .send_message_with(&line, |status| {
                        if let Some(label) = status.label() {
                            println!("{}", label.dimmed());
                            io::stdout().flush().ok();
                        }
                    })
                    .await;

                match result {
                    Ok(answer) => {
                        println!();
                        println!("{}", format::format_message(&answer));
                        if app.plan().map(|p| p.last_updated) != plan_before {
                            println!();
                            println!("{}", "Account plan updated. Type /plan to view it.".dimmed());
                        }
                    }
                    Err(e) => eprintln!("{} {}", "error:".red().bold(), e),
                }
                println!();
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".dimmed());
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "goodbye.".dimmed());
                break;
            }
            Err(e) => {
                eprintln!("{} {}", "error:".red().bold(), e);
                break;
            }
        }
    }

    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let _ = rl.save_history(&history_path);

    Ok(())
}

/// Directory plans are exported to when none is given.
pub(crate) fn default_export_dir(config: &Config) -> Result<PathBuf> {
    match &config.export_dir {
        Some(dir) => Ok(dir.clone()),
        None => Ok(std::env::current_dir()?),
    }
}
