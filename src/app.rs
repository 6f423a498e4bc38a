//! Application state controller.
//!
//! [`App`] owns the transcript, the account plan and the chat status. It
//! hands user messages to the [`Agent`], merges the plan updates the agent
//! emits while the turn is still running, and appends the final answer to
//! the transcript. Front ends only read from it.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::agent::{Agent, AgentEvent};
use crate::constants::WELCOME_MESSAGE;
use crate::message::Message;
use crate::plan::{self, merge_plan_update, AccountPlan};

/// What the assistant is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatStatus {
    Idle,
    Searching,
    UpdatingPlan,
}

impl ChatStatus {
    /// Progress label shown while a turn is in flight.
    pub fn label(self) -> Option<&'static str> {
        match self {
            ChatStatus::Searching => Some("Researching sources..."),
            ChatStatus::UpdatingPlan => Some("Updating account plan..."),
            ChatStatus::Idle => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AppError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("a response is still in progress ({0:?})")]
    Busy(ChatStatus),

    #[error("no account plan yet; ask for one first")]
    NoPlan,
}

pub struct App {
    agent: Agent,
    messages: Vec<Message>,
    plan: Option<AccountPlan>,
    status: ChatStatus,
}

impl App {
    pub fn new(agent: Agent) -> Self {
        Self {
            agent,
            messages: vec![Message::model(WELCOME_MESSAGE, None)],
            plan: None,
            status: ChatStatus::Idle,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn plan(&self) -> Option<&AccountPlan> {
        self.plan.as_ref()
    }

    #[cfg(test)]
    pub fn status(&self) -> ChatStatus {
        self.status
    }

    pub async fn send_message(&mut self, text: &str) -> Result<Message, AppError> {
        self.send_message_with(text, |_| {}).await
    }

    /// Runs one turn, reporting status changes to `on_status` as they happen.
    ///
    /// Plan updates are merged in emission order while the turn is running.
    /// Returns the model message appended to the transcript; the status is
    /// back to [`ChatStatus::Idle`] when this returns.
    pub async fn send_message_with(
        &mut self,
        text: &str,
        mut on_status: impl FnMut(ChatStatus),
    ) -> Result<Message, AppError> {
        if text.trim().is_empty() {
            return Err(AppError::EmptyMessage);
        }
        if self.status != ChatStatus::Idle {
            return Err(AppError::Busy(self.status));
        }

        self.messages.push(Message::user(text));
        self.status = ChatStatus::Searching;
        on_status(self.status);

        let App {
            agent,
            plan,
            status,
            ..
        } = self;
        let (tx, mut rx) = mpsc::unbounded_channel();

        let turn = async move {
            let outcome = agent.submit_user_message(text, &tx).await;
            drop(tx);
            outcome
        };
        let drain = async {
            while let Some(event) = rx.recv().await {
                match event {
                    AgentEvent::ToolCalled { name } => debug!(tool = %name, "Tool called"),
                    AgentEvent::PlanUpdated(update) => {
                        *status = ChatStatus::UpdatingPlan;
                        on_status(*status);
                        let merged = merge_plan_update(plan.take(), &update);
                        info!(
                            company = %merged.company_name,
                            sections = merged.sections.len(),
                            "Account plan updated"
                        );
                        *plan = Some(merged);
                    }
                }
            }
        };
        let (outcome, ()) = tokio::join!(turn, drain);

        let answer = Message::model(outcome.text, outcome.sources);
        self.messages.push(answer.clone());
        self.status = ChatStatus::Idle;
        on_status(self.status);

        Ok(answer)
    }

    /// Replaces one section's content. Returns `false` if no section has that id.
    pub fn edit_section(&mut self, section_id: &str, content: &str) -> Result<bool, AppError> {
        let plan = self.plan.as_mut().ok_or(AppError::NoPlan)?;
        let edited = plan.edit_section(section_id, content);
        debug!(section = section_id, edited, "Manual section edit");
        Ok(edited)
    }

    pub fn export_plan(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        let plan = self.plan.as_ref().ok_or(AppError::NoPlan)?;
        let path = plan::export_plan(plan, dir)?;
        info!(path = %path.display(), "Account plan exported");
        Ok(path)
    }
}
