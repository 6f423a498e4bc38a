//! Remote model abstraction for dossier.
//!
//! The agent loop talks to the model through two seams: a [`ModelBackend`]
//! that opens conversations, and the [`ChatSession`] it returns, which owns
//! the history of one conversation and performs a single round trip per
//! [`ChatSession::send`]. [`GeminiBackend`] is the production implementation;
//! tests substitute a scripted one.

mod client;
mod error;
#[cfg(test)]
pub(crate) mod testing;
mod types;

pub use client::GeminiBackend;
pub use error::ProviderError;
pub use types::{FunctionCall, FunctionOutcome, FunctionResponse, TurnRequest, TurnResponse};

use async_trait::async_trait;
use rig::completion::ToolDefinition;

/// Fixed configuration a conversation is opened with.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// System instruction text.
    pub system_instruction: String,
    /// Enables the hosted web-search grounding capability.
    pub google_search: bool,
    /// Function declarations the model may call.
    pub functions: Vec<ToolDefinition>,
}

/// One ongoing conversation with the remote model.
#[async_trait]
pub trait ChatSession: Send {
    /// Sends one request and waits for the complete response.
    ///
    /// The session records both sides of the exchange so the next call
    /// continues the same conversation.
    async fn send(&mut self, request: TurnRequest) -> Result<TurnResponse, ProviderError>;

    /// Forgets tool calls in the last response that will never get results.
    ///
    /// Called when a turn stops at the round-trip ceiling, so the next user
    /// message does not replay calls without matching function responses.
    fn discard_unanswered_calls(&mut self);
}

/// Opens conversations with a remote model.
pub trait ModelBackend: Send + Sync {
    fn start_chat(&self, config: SessionConfig) -> Box<dyn ChatSession>;
}
