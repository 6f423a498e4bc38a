pub mod update_plan;

use anyhow::Result;
use rig::completion::ToolDefinition;
use serde_json::Value;

use crate::plan::PlanUpdate;
use update_plan::UpdateAccountPlanTool;

/// The result of a successful tool execution. Failures are `Err`.
#[derive(Debug, Clone)]
pub struct ToolResult {
    pub content: String,
    /// Plan change to hand to the controller.
    pub plan_update: Option<PlanUpdate>,
}

impl ToolResult {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            plan_update: None,
        }
    }

    pub fn with_plan_update(mut self, update: PlanUpdate) -> Self {
        self.plan_update = Some(update);
        self
    }
}

/// Every tool implements this trait.
///
/// Tools never mutate application state themselves; side effects travel
/// back in the [`ToolResult`] and are emitted by the agent loop.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the model uses to call this tool.
    fn name(&self) -> &str;

    /// Human-readable description sent with the function declaration.
    fn description(&self) -> &str;

    /// JSON Schema describing the tool's input parameters.
    fn schema(&self) -> Value;

    /// Execute the tool with the given JSON input.
    async fn execute(&self, input: Value) -> Result<ToolResult>;
}

/// Holds all registered tools and dispatches calls by name.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. Called during startup.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.iter().find(|t| t.name() == name).map(|t| t.as_ref())
    }

    /// Produce function declarations for the model.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.schema(),
            })
            .collect()
    }

    /// Look up a tool by name and execute it.
    #[cfg(test)]
    pub async fn execute(&self, name: &str, input: Value) -> Result<ToolResult> {
        let tool = self
            .get(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown tool: {}", name))?;
        tool.execute(input).await
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.tools.len()
    }
}

impl ToolRegistry {
    /// Create a registry with all built-in tools.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(UpdateAccountPlanTool));
        registry
    }
}
