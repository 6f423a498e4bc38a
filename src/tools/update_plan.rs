//! The `updateAccountPlan` tool: validates section declarations into a [`PlanUpdate`].

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{Tool, ToolResult};
use crate::constants::PLAN_UPDATED_RESULT;
use crate::plan::{PlanSection, PlanUpdate, SectionPatch};

/// Name the model uses to call [`UpdateAccountPlanTool`].
pub const UPDATE_ACCOUNT_PLAN: &str = "updateAccountPlan";

/// Tool through which the model creates or rewrites plan sections.
///
/// The arguments arrive as loosely-typed JSON; every section must carry
/// string `id`, `title` and `content` before the payload is accepted.
pub struct UpdateAccountPlanTool;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateAccountPlanInput {
    #[serde(default)]
    company_name: Option<String>,
    sections: Vec<PlanSection>,
}

impl UpdateAccountPlanTool {
    fn parse(input: Value) -> Result<PlanUpdate> {
        let input: UpdateAccountPlanInput = serde_json::from_value(input)?;
        if let Some(pos) = input.sections.iter().position(|s| s.id.trim().is_empty()) {
            anyhow::bail!("section {} has an empty id", pos);
        }
        Ok(PlanUpdate {
            company_name: input.company_name,
            sections: input.sections.into_iter().map(SectionPatch::from).collect(),
        })
    }
}

#[async_trait::async_trait]
impl Tool for UpdateAccountPlanTool {
    fn name(&self) -> &str {
        UPDATE_ACCOUNT_PLAN
    }

    fn description(&self) -> &str {
        "Create or update sections of the account plan. Use this when you have gathered enough \
information to structure a plan or when the user asks to modify specific parts."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "companyName": {
                    "type": "string",
                    "description": "Name of the company being researched. If unknown, use \"Target Company\"."
                },
                "sections": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": {
                                "type": "string",
                                "description": "Unique ID for section (e.g., \"exec_summary\", \"financials\")"
                            },
                            "title": {
                                "type": "string",
                                "description": "Human readable title"
                            },
                            "content": {
                                "type": "string",
                                "description": "The Markdown content of the section."
                            }
                        },
                        "required": ["id", "title", "content"]
                    },
                    "description": "List of sections to add or update. If a section with the same ID exists, it will be overwritten."
                }
            },
            "required": ["sections"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let update = Self::parse(input).context("Failed to update plan")?;
        Ok(ToolResult::success(PLAN_UPDATED_RESULT).with_plan_update(update))
    }
}
