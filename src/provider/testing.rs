//! Scripted model backend for tests.
//!
//! [`ScriptedBackend`] replays a queue of canned responses and records every
//! request and session config it sees. A `None` entry, or an exhausted
//! queue, fails that round trip with [`ProviderError::InvalidResponse`].

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::types::{
    Candidate, Content, FunctionCall, GroundingChunk, GroundingMetadata, Part, TurnRequest,
    TurnResponse, WebChunk,
};
use super::{ChatSession, ModelBackend, ProviderError, SessionConfig};

#[derive(Default)]
struct Script {
    responses: VecDeque<Option<TurnResponse>>,
    requests: Vec<TurnRequest>,
    sessions_started: usize,
    configs: Vec<SessionConfig>,
    discarded: usize,
}

#[derive(Clone, Default)]
pub struct ScriptedBackend {
    script: Arc<Mutex<Script>>,
}

impl ScriptedBackend {
    pub fn new(responses: Vec<TurnResponse>) -> Self {
        let backend = Self::default();
        for response in responses {
            backend.push(response);
        }
        backend
    }

    pub fn push(&self, response: TurnResponse) {
        self.script.lock().unwrap().responses.push_back(Some(response));
    }

    pub fn push_failure(&self) {
        self.script.lock().unwrap().responses.push_back(None);
    }

    pub fn requests(&self) -> Vec<TurnRequest> {
        self.script.lock().unwrap().requests.clone()
    }

    pub fn sessions_started(&self) -> usize {
        self.script.lock().unwrap().sessions_started
    }

    pub fn last_config(&self) -> Option<SessionConfig> {
        self.script.lock().unwrap().configs.last().cloned()
    }

    /// How many times a session was asked to drop unanswered calls.
    pub fn discarded(&self) -> usize {
        self.script.lock().unwrap().discarded
    }
}

impl ModelBackend for ScriptedBackend {
    fn start_chat(&self, config: SessionConfig) -> Box<dyn ChatSession> {
        let mut script = self.script.lock().unwrap();
        script.sessions_started += 1;
        script.configs.push(config);
        Box::new(ScriptedChat {
            script: Arc::clone(&self.script),
        })
    }
}

struct ScriptedChat {
    script: Arc<Mutex<Script>>,
}

#[async_trait]
impl ChatSession for ScriptedChat {
    async fn send(&mut self, request: TurnRequest) -> Result<TurnResponse, ProviderError> {
        let mut script = self.script.lock().unwrap();
        script.requests.push(request);
        script
            .responses
            .pop_front()
            .flatten()
            .ok_or_else(|| ProviderError::InvalidResponse("scripted failure".into()))
    }

    fn discard_unanswered_calls(&mut self) {
        self.script.lock().unwrap().discarded += 1;
    }
}

// --- response builders ---

pub fn text_part(text: &str) -> Part {
    Part::text(text)
}

pub fn call_part(name: &str, args: Value, id: Option<&str>) -> Part {
    Part {
        function_call: Some(FunctionCall {
            name: name.into(),
            args,
            id: id.map(String::from),
        }),
        ..Part::default()
    }
}

pub fn plan_call(id: Option<&str>, sections: &[(&str, &str, &str)]) -> Part {
    let sections: Vec<Value> = sections
        .iter()
        .map(|(id, title, content)| json!({"id": id, "title": title, "content": content}))
        .collect();
    call_part(
        "updateAccountPlan",
        json!({"companyName": "Acme", "sections": sections}),
        id,
    )
}

pub fn response(parts: Vec<Part>) -> TurnResponse {
    TurnResponse {
        candidates: vec![Candidate {
            content: Some(Content {
                role: Some("model".into()),
                parts: Some(parts),
            }),
            ..Candidate::default()
        }],
    }
}

pub fn cited(mut response: TurnResponse, uris: &[&str]) -> TurnResponse {
    let chunks = uris
        .iter()
        .map(|uri| GroundingChunk {
            web: Some(WebChunk {
                uri: Some(uri.to_string()),
                title: Some(format!("title of {uri}")),
            }),
        })
        .collect();
    response.candidates[0].grounding_metadata = Some(GroundingMetadata {
        grounding_chunks: Some(chunks),
    });
    response
}
