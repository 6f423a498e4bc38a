//! Terminal rendering for transcript entries, citations and the account plan.

use colored::Colorize;

use crate::message::{GroundingSource, Message, Role};
use crate::plan::AccountPlan;

/// Format a message for terminal display with role label and colors.
pub fn format_message(msg: &Message) -> String {
    let label = match msg.role {
        Role::User => format!("{}:", msg.role).green().bold(),
        Role::Model => format!("{}:", msg.role).cyan().bold(),
        Role::System => format!("{}:", msg.role).dimmed(),
    };
    let body = match msg.role {
        Role::User => msg.content.clone(),
        Role::Model => render_markdown_lite(&msg.content),
        Role::System => msg.content.dimmed().to_string(),
    };
    let mut out = format!("{}\n{}", label, body);
    if !msg.sources().is_empty() {
        out.push_str("\n\n");
        out.push_str(&format_sources(msg.sources()));
    }
    out
}

/// Numbered citation list, one `[n] title <uri>` line per source.
pub fn format_sources(sources: &[GroundingSource]) -> String {
    let mut out = format!("{}", "Sources:".dimmed().bold());
    for (i, source) in sources.iter().enumerate() {
        out.push_str(&format!(
            "\n  {} {} {}",
            format!("[{}]", i + 1).dimmed(),
            source.title,
            format!("<{}>", source.uri).dimmed()
        ));
    }
    out
}

/// Render the plan as a titled document, sections in plan order.
pub fn format_plan(plan: &AccountPlan) -> String {
    let mut out = format!(
        "{}\n{}",
        plan.company_name.bold().underline(),
        format!(
            "Last updated {}",
            plan.last_updated.format("%Y-%m-%d %H:%M UTC")
        )
        .dimmed()
    );
    if plan.sections.is_empty() {
        out.push_str(&format!("\n\n{}", "(no sections yet)".dimmed()));
    }
    for section in &plan.sections {
        out.push_str(&format!(
            "\n\n{} {}\n{}",
            section.title.cyan().bold(),
            format!("({})", section.id).dimmed(),
            render_markdown_lite(&section.content)
        ));
    }
    out
}

/// Minimal markdown renderer for terminal output.
///
/// Handles headings, bullet items, fenced code blocks, `**bold**` and
/// `` `inline code` ``. Everything else passes through unchanged.
pub fn render_markdown_lite(text: &str) -> String {
    let mut lines = Vec::new();
    let mut in_code_block = false;

    for line in text.lines() {
        if let Some(lang) = line.trim_start().strip_prefix("```") {
            in_code_block = !in_code_block;
            if in_code_block && !lang.is_empty() {
                lines.push(format!("  {}", lang.dimmed()));
            }
            continue;
        }
        if in_code_block {
            lines.push(format!("  {}", line.dimmed()));
            continue;
        }

        let trimmed = line.trim_start();
        if trimmed.starts_with('#') {
            let heading = trimmed.trim_start_matches('#').trim();
            lines.push(render_inline(heading).bold().to_string());
        } else if let Some(item) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        {
            let indent = &line[..line.len() - trimmed.len()];
            lines.push(format!("{}  • {}", indent, render_inline(item)));
        } else {
            lines.push(render_inline(line));
        }
    }

    lines.join("\n")
}

/// Handle **bold** and `inline code` within a single line.
fn render_inline(line: &str) -> String {
    let mut out = String::new();
    let mut rest = line;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("**") {
            if let Some(end) = after.find("**") {
                out.push_str(&after[..end].bold().to_string());
                rest = &after[end + 2..];
                continue;
            }
        }
        if let Some(after) = rest.strip_prefix('`') {
            if let Some(end) = after.find('`') {
                out.push_str(&after[..end].dimmed().to_string());
                rest = &after[end + 1..];
                continue;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }

    out
}
