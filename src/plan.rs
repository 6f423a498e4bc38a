//! The account plan document and its merge rules.
//!
//! An [`AccountPlan`] is only ever changed in two ways: a [`PlanUpdate`]
//! produced by the `updateAccountPlan` tool is upserted section by section
//! via [`merge_plan_update`], or the user rewrites one section's content
//! through [`AccountPlan::edit_section`]. Sections are never reordered or
//! removed.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_COMPANY_NAME, EXPORT_FILE_SUFFIX};

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex is valid"));

/// Path separators, characters reserved on common file systems, control
/// characters, and a leading dot.
static UNSAFE_FILE_CHAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\.|[/\\:*?"<>|\p{Cc}]"#).expect("static regex is valid")
});

/// One titled block of markdown in the plan. `id` is the merge key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSection {
    pub id: String,
    pub title: String,
    pub content: String,
}

/// The structured account plan document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPlan {
    pub company_name: String,
    pub sections: Vec<PlanSection>,
    pub last_updated: DateTime<Utc>,
}

/// A section as carried by an update. Missing fields keep the prior value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SectionPatch {
    pub id: String,
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Partial plan declared by a single tool call.
///
/// Carries only the sections named in that call, never the accumulated plan.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlanUpdate {
    pub company_name: Option<String>,
    pub sections: Vec<SectionPatch>,
}

impl From<PlanSection> for SectionPatch {
    fn from(section: PlanSection) -> Self {
        Self {
            id: section.id,
            title: Some(section.title),
            content: Some(section.content),
        }
    }
}

impl SectionPatch {
    /// Shallow-merges this patch over an existing section.
    fn apply_to(&self, section: &mut PlanSection) {
        if let Some(title) = &self.title {
            section.title = title.clone();
        }
        if let Some(content) = &self.content {
            section.content = content.clone();
        }
    }

    /// Materializes a new section. A missing title falls back to the id.
    fn into_section(self) -> PlanSection {
        PlanSection {
            title: self.title.unwrap_or_else(|| self.id.clone()),
            content: self.content.unwrap_or_default(),
            id: self.id,
        }
    }
}

/// Merges `update` into `current`, stamping the result with the current time.
pub fn merge_plan_update(current: Option<AccountPlan>, update: &PlanUpdate) -> AccountPlan {
    merge_plan_update_at(current, update, Utc::now())
}

/// [`merge_plan_update`] with an explicit timestamp.
///
/// - `company_name`: the update's non-empty value, else the prior name,
///   else [`DEFAULT_COMPANY_NAME`].
/// - `sections`: upsert by id. Existing sections keep their position and
///   are shallow-merged; unseen ids are appended in update order.
pub fn merge_plan_update_at(
    current: Option<AccountPlan>,
    update: &PlanUpdate,
    now: DateTime<Utc>,
) -> AccountPlan {
    let (prior_name, mut sections) = match current {
        Some(plan) => (Some(plan.company_name), plan.sections),
        None => (None, Vec::new()),
    };

    for patch in &update.sections {
        match sections.iter_mut().find(|s| s.id == patch.id) {
            Some(existing) => patch.apply_to(existing),
            None => sections.push(patch.clone().into_section()),
        }
    }

    let company_name = update
        .company_name
        .clone()
        .filter(|name| !name.is_empty())
        .or(prior_name)
        .unwrap_or_else(|| DEFAULT_COMPANY_NAME.to_string());

    AccountPlan {
        company_name,
        sections,
        last_updated: now,
    }
}

impl AccountPlan {
    /// Replaces the content of the section with `section_id`.
    ///
    /// Returns `false` and leaves the plan untouched when no such section
    /// exists; direct edits never create sections.
    pub fn edit_section(&mut self, section_id: &str, content: impl Into<String>) -> bool {
        match self.sections.iter_mut().find(|s| s.id == section_id) {
            Some(section) => {
                section.content = content.into();
                true
            }
            None => false,
        }
    }

    /// Pretty-printed JSON for export.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize account plan")
    }
}

/// Export file name for a company.
///
/// Whitespace runs become `_`, then every character that could leave the
/// export directory or is invalid in a file name becomes `_` as well.
pub fn export_file_name(company_name: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(company_name, "_");
    format!(
        "{}{}",
        UNSAFE_FILE_CHAR.replace_all(&collapsed, "_"),
        EXPORT_FILE_SUFFIX
    )
}

/// Writes the plan as JSON into `dir` and returns the file path.
///
/// The file is always a direct child of `dir`.
pub fn export_plan(plan: &AccountPlan, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    let path = dir.join(export_file_name(&plan.company_name));
    if path.parent() != Some(dir) {
        anyhow::bail!("Refusing to export outside {:?}: {:?}", dir, path);
    }
    fs::write(&path, plan.to_json()?)
        .with_context(|| format!("Failed to write plan export to {:?}", path))?;
    Ok(path)
}
