//! Slash command handlers for the chat REPL.
//!
//! Dispatches `/plan`, `/edit`, `/export`, `/history` and `/help`. Returns a
//! [`CommandAction`] so the REPL loop can decide how to proceed.

use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::app::{App, AppError};
use crate::format;

/// Action returned by slash command handling.
pub(crate) enum CommandAction {
    /// Command was handled; continue the REPL loop.
    Continue,
    /// Unknown or malformed command was entered.
    Unknown(String),
}

#[derive(Debug, PartialEq, Eq)]
enum SlashCommand<'a> {
    Plan,
    Edit { section_id: &'a str, content: &'a str },
    Export { dir: Option<&'a str> },
    History,
    Help,
}

fn parse(input: &str) -> Option<SlashCommand<'_>> {
    let (name, rest) = match input.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (input, ""),
    };
    match name {
        "/plan" if rest.is_empty() => Some(SlashCommand::Plan),
        "/history" if rest.is_empty() => Some(SlashCommand::History),
        "/help" if rest.is_empty() => Some(SlashCommand::Help),
        "/export" => Some(SlashCommand::Export {
            dir: (!rest.is_empty()).then_some(rest),
        }),
        "/edit" => {
            let (section_id, content) = rest.split_once(char::is_whitespace)?;
            Some(SlashCommand::Edit {
                section_id,
                content: content.trim(),
            })
        }
        _ => None,
    }
}

/// Dispatch and handle a slash command.
///
/// `default_export_dir` is used by `/export` when no directory is given.
pub(crate) fn handle_slash_command(
    command: &str,
    app: &mut App,
    default_export_dir: &Path,
) -> CommandAction {
    let Some(parsed) = parse(command) else {
        return CommandAction::Unknown(command.to_string());
    };

    match parsed {
        SlashCommand::Plan => match app.plan() {
            Some(plan) => println!("{}", format::format_plan(plan)),
            None => println!("{}", AppError::NoPlan.to_string().dimmed()),
        },
        SlashCommand::Edit {
            section_id,
            content,
        } => match app.edit_section(section_id, content) {
            Ok(true) => println!("{} {}", "Updated section".dimmed(), section_id.cyan()),
            Ok(false) => println!(
                "{} No section with id {}",
                "?".yellow(),
                section_id.cyan()
            ),
            Err(e) => println!("{}", e.to_string().dimmed()),
        },
        SlashCommand::Export { dir } => {
            let dir = dir.map(PathBuf::from);
            let dir = dir.as_deref().unwrap_or(default_export_dir);
            match app.export_plan(dir) {
                Ok(path) => println!("{} {}", "Exported to".dimmed(), path.display()),
                Err(e) => eprintln!("{} {:#}", "error:".red().bold(), e),
            }
        }
        SlashCommand::History => {
            for msg in app.messages() {
                println!("{}", format::format_message(msg));
                println!();
            }
        }
        SlashCommand::Help => {
            println!("{}", "Commands:".bold());
            println!("  {} - show the account plan", "/plan".cyan());
            println!(
                "  {} - replace a section's content",
                "/edit <id> <content>".cyan()
            );
            println!(
                "  {} - write the plan as JSON (default: current dir)",
                "/export [dir]".cyan()
            );
            println!("  {} - show conversation history", "/history".cyan());
            println!("  {} - show this help", "/help".cyan());
            println!("  {} - exit", "Ctrl+D".cyan());
        }
    }
    CommandAction::Continue
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(parse("/plan"), Some(SlashCommand::Plan));
        assert_eq!(parse("/help"), Some(SlashCommand::Help));
        assert_eq!(parse("/export"), Some(SlashCommand::Export { dir: None }));
        assert_eq!(
            parse("/export  out/plans "),
            Some(SlashCommand::Export {
                dir: Some("out/plans")
            })
        );
        assert_eq!(
            parse("/edit exec_summary New **content** here"),
            Some(SlashCommand::Edit {
                section_id: "exec_summary",
                content: "New **content** here"
            })
        );
    }

    #[test]
    fn rejects_unknown_and_malformed() {
        assert_eq!(parse("/compact"), None);
        assert_eq!(parse("/edit"), None);
        assert_eq!(parse("/edit exec"), None);
        assert_eq!(parse("/plan extra"), None);
    }
}
