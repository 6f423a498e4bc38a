//! The conversation loop engine.
//!
//! [`Agent::submit_user_message`] drives one user message through the
//! model's tool-calling protocol: send, collect text and citations, run every
//! requested tool, return the tool results, and repeat until the model
//! answers without calling a tool or the round-trip ceiling is reached.
//! Plan changes are emitted as [`AgentEvent`]s while the loop runs; the
//! aggregated answer is the return value.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::constants::{FALLBACK_TEXT, MAX_TOOL_LOOPS_DEFAULT, SYSTEM_INSTRUCTION};
use crate::message::GroundingSource;
use crate::plan::PlanUpdate;
use crate::provider::{
    ChatSession, FunctionCall, FunctionResponse, ModelBackend, ProviderError, SessionConfig,
    TurnRequest,
};
use crate::tools::ToolRegistry;

/// Side-channel events emitted while a turn is running.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    /// The model invoked a tool (recognized or not).
    ToolCalled { name: String },
    /// A plan tool call was accepted; carries only the newly declared sections.
    PlanUpdated(PlanUpdate),
}

/// Why a turn stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The model answered without calling a tool.
    Completed,
    /// The response had no candidates or no content parts.
    NoContent,
    /// The tool round-trip ceiling was reached.
    LoopLimit,
    /// A remote call failed; the text is the fixed fallback.
    Failed,
}

/// Aggregated result of one user message.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// Text of every text part across every round trip, in encounter order.
    pub text: String,
    /// Citations across every round trip, in encounter order, not deduplicated.
    /// `None` when the turn failed.
    pub sources: Option<Vec<GroundingSource>>,
    pub stop: StopReason,
    /// Tool-result round trips performed after the initial send.
    pub round_trips: usize,
}

impl TurnOutcome {
    fn fallback() -> Self {
        Self {
            text: FALLBACK_TEXT.to_string(),
            sources: None,
            stop: StopReason::Failed,
            round_trips: 0,
        }
    }
}

/// Fixed settings for the conversation.
#[derive(Debug, Clone)]
pub struct AgentOptions {
    pub system_instruction: String,
    pub google_search: bool,
    pub max_tool_loops: usize,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            google_search: true,
            max_tool_loops: MAX_TOOL_LOOPS_DEFAULT,
        }
    }
}

impl AgentOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            system_instruction: config.system_instruction().to_string(),
            google_search: config.google_search,
            max_tool_loops: config.max_tool_loops,
        }
    }
}

/// Owns the single conversation with the remote model.
///
/// The session is opened on the first message and kept for the lifetime of
/// the agent. Taking `&mut self` per turn means a second turn cannot start
/// while one is in flight.
pub struct Agent {
    backend: Arc<dyn ModelBackend>,
    session: Option<Box<dyn ChatSession>>,
    tools: ToolRegistry,
    options: AgentOptions,
}

impl Agent {
    pub fn new(backend: Arc<dyn ModelBackend>, tools: ToolRegistry, options: AgentOptions) -> Self {
        Self {
            backend,
            session: None,
            tools,
            options,
        }
    }

    /// Runs one user message to completion.
    ///
    /// Never fails: a remote error ends the turn with the fallback text and
    /// no sources. Plan updates already emitted on `events` stay emitted.
    pub async fn submit_user_message(
        &mut self,
        text: &str,
        events: &UnboundedSender<AgentEvent>,
    ) -> TurnOutcome {
        match self.run_turn(text, events).await {
            Ok(outcome) => {
                info!(
                    stop = ?outcome.stop,
                    round_trips = outcome.round_trips,
                    text_len = outcome.text.len(),
                    sources = outcome.sources.as_ref().map_or(0, Vec::len),
                    "Turn finished"
                );
                outcome
            }
            Err(err) => {
                error!(error = %err, "Model request failed, returning fallback text");
                TurnOutcome::fallback()
            }
        }
    }

    async fn run_turn(
        &mut self,
        text: &str,
        events: &UnboundedSender<AgentEvent>,
    ) -> Result<TurnOutcome, ProviderError> {
        let Agent {
            backend,
            session,
            tools,
            options,
        } = self;
        let session = session.get_or_insert_with(|| {
            info!(google_search = options.google_search, "Starting conversation session");
            backend.start_chat(SessionConfig {
                system_instruction: options.system_instruction.clone(),
                google_search: options.google_search,
                functions: tools.definitions(),
            })
        });

        let mut response = session.send(TurnRequest::Text(text.to_string())).await?;
        let mut final_text = String::new();
        let mut sources = Vec::new();
        let mut round_trips = 0;

        let stop = loop {
            if round_trips >= options.max_tool_loops {
                warn!(
                    max_tool_loops = options.max_tool_loops,
                    "Tool loop ceiling reached, returning partial answer"
                );
                session.discard_unanswered_calls();
                break StopReason::LoopLimit;
            }
            let Some(candidate) = response.candidates.first() else {
                debug!("Response has no candidates");
                break StopReason::NoContent;
            };
            let Some(parts) = candidate.parts() else {
                debug!(finish_reason = ?candidate.finish_reason, "Candidate has no content parts");
                break StopReason::NoContent;
            };

            sources.extend(candidate.grounding_sources());

            let mut results = Vec::new();
            for part in parts {
                if let Some(t) = &part.text {
                    final_text.push_str(t);
                }
                if let Some(call) = &part.function_call {
                    results.push(execute_tool_call(tools, call, events).await);
                }
            }

            if results.is_empty() {
                break StopReason::Completed;
            }

            debug!(
                results = results.len(),
                errors = results.iter().filter(|r| r.is_error()).count(),
                round_trip = round_trips + 1,
                "Returning tool results"
            );
            response = session.send(TurnRequest::ToolResults(results)).await?;
            round_trips += 1;
        };

        Ok(TurnOutcome {
            text: final_text,
            sources: Some(sources),
            stop,
            round_trips,
        })
    }
}

/// Runs one tool call and builds the result the model will see.
///
/// Unknown tools and failing tools both produce an error result; neither
/// aborts the turn. The result id mirrors the call id when one was given,
/// and results are returned in call order.
async fn execute_tool_call(
    tools: &ToolRegistry,
    call: &FunctionCall,
    events: &UnboundedSender<AgentEvent>,
) -> FunctionResponse {
    info!(tool = %call.name, call_id = ?call.id, "Calling tool");
    emit(
        events,
        AgentEvent::ToolCalled {
            name: call.name.clone(),
        },
    );

    let Some(tool) = tools.get(&call.name) else {
        warn!(tool = %call.name, "Unknown function called");
        return FunctionResponse::failure(call, format!("Function {} not found.", call.name));
    };

    match tool.execute(call.args.clone()).await {
        Ok(result) => {
            if let Some(update) = result.plan_update {
                emit(events, AgentEvent::PlanUpdated(update));
            }
            FunctionResponse::success(call, result.content)
        }
        Err(err) => {
            let message = format!("{err:#}");
            error!(tool = %call.name, error = %message, "Error executing tool");
            FunctionResponse::failure(call, message)
        }
    }
}

fn emit(events: &UnboundedSender<AgentEvent>, event: AgentEvent) {
    if events.send(event).is_err() {
        warn!("Agent event dropped, receiver closed");
    }
}
