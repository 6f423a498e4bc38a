//! Gemini REST client.
//!
//! [`GeminiBackend`] holds the HTTP client and credentials; each
//! [`GeminiChat`] keeps its own `contents` history client side and replays
//! it on every `generateContent` call.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use super::error::ProviderError;
use super::types::{Content, TurnRequest, TurnResponse};
use super::{ChatSession, ModelBackend, SessionConfig};
use crate::config::Config;

/// Production [`ModelBackend`] backed by the Gemini `generateContent` API.
pub struct GeminiBackend {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiBackend {
    /// Builds the backend from the loaded config.
    ///
    /// A missing API key is not an error here: the backend is built with an
    /// empty key and every request will be rejected by the API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.resolve_api_key().unwrap_or_else(|| {
            warn!("No API key found. Set GEMINI_API_KEY or api_key in config.toml");
            String::new()
        });
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl ModelBackend for GeminiBackend {
    fn start_chat(&self, config: SessionConfig) -> Box<dyn ChatSession> {
        debug!(model = %self.model, functions = config.functions.len(), "start_chat");
        Box::new(GeminiChat {
            http: self.http.clone(),
            url: format!("{}/models/{}:generateContent", self.base_url, self.model),
            api_key: self.api_key.clone(),
            system_instruction: config.system_instruction.clone(),
            tools: build_tools(&config),
            history: Vec::new(),
        })
    }
}

/// Translates the session capabilities into the `tools` request field.
fn build_tools(config: &SessionConfig) -> Vec<Value> {
    let mut tools = Vec::new();
    if config.google_search {
        tools.push(json!({ "googleSearch": {} }));
    }
    if !config.functions.is_empty() {
        let declarations: Vec<Value> = config
            .functions
            .iter()
            .map(|def| {
                json!({
                    "name": def.name,
                    "description": def.description,
                    "parameters": def.parameters,
                })
            })
            .collect();
        tools.push(json!({ "functionDeclarations": declarations }));
    }
    tools
}

/// A single Gemini conversation.
pub struct GeminiChat {
    http: Client,
    url: String,
    api_key: String,
    system_instruction: String,
    tools: Vec<Value>,
    history: Vec<Content>,
}

impl GeminiChat {
    fn request_body(&self) -> Value {
        let mut body = json!({
            "systemInstruction": { "parts": [{ "text": self.system_instruction }] },
            "contents": self.history,
        });
        if !self.tools.is_empty() {
            body["tools"] = json!(self.tools);
        }
        body
    }

    async fn generate(&self) -> Result<TurnResponse, ProviderError> {
        let response = self
            .http
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::from_status(status.as_u16(), &body));
        }
        serde_json::from_str(&body).map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl ChatSession for GeminiChat {
    async fn send(&mut self, request: TurnRequest) -> Result<TurnResponse, ProviderError> {
        self.history.push(request.into_content());
        debug!(turns = self.history.len(), "generateContent");

        match self.generate().await {
            Ok(response) => {
                if let Some(content) = response
                    .candidates
                    .first()
                    .and_then(|c| c.content.clone())
                {
                    self.history.push(Content {
                        role: Some("model".to_string()),
                        ..content
                    });
                }
                Ok(response)
            }
            Err(err) => {
                error!(error = %err, retryable = err.is_retryable(), "Gemini request failed");
                // Drop the unanswered request so the history stays paired.
                self.history.pop();
                Err(err)
            }
        }
    }

    fn discard_unanswered_calls(&mut self) {
        let Some(last) = self.history.last_mut() else {
            return;
        };
        if last.role.as_deref() != Some("model") {
            return;
        }
        let Some(parts) = last.parts.as_mut() else {
            return;
        };
        let before = parts.len();
        parts.retain(|p| p.function_call.is_none());
        if parts.len() != before {
            debug!(dropped = before - parts.len(), "Discarded unanswered function calls");
        }
        if parts.is_empty() {
            self.history.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::types::{FunctionCall, Part};
    use crate::tools::ToolRegistry;

    fn session_config(google_search: bool) -> SessionConfig {
        SessionConfig {
            system_instruction: "be useful".into(),
            google_search,
            functions: ToolRegistry::with_builtins().definitions(),
        }
    }

    fn chat(base_url: &str) -> GeminiChat {
        let config = Config {
            base_url: base_url.into(),
            api_key: Some("test-key".into()),
            request_timeout_secs: 5,
            ..Config::default()
        };
        let backend = GeminiBackend::from_config(&config).unwrap();
        GeminiChat {
            http: backend.http.clone(),
            url: format!("{}/models/{}:generateContent", backend.base_url, backend.model),
            api_key: backend.api_key.clone(),
            system_instruction: "be useful".into(),
            tools: build_tools(&session_config(true)),
            history: Vec::new(),
        }
    }

    #[test]
    fn tools_include_search_and_plan_function() {
        let tools = build_tools(&session_config(true));
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0], json!({ "googleSearch": {} }));
        let decl = &tools[1]["functionDeclarations"][0];
        assert_eq!(decl["name"], "updateAccountPlan");
        assert_eq!(decl["parameters"]["required"], json!(["sections"]));
    }

    #[test]
    fn search_can_be_disabled() {
        let tools = build_tools(&session_config(false));
        assert_eq!(tools.len(), 1);
        assert!(tools[0].get("functionDeclarations").is_some());
    }

    #[test]
    fn request_body_carries_history_and_instruction() {
        let mut chat = chat("https://example.invalid/v1beta/");
        chat.history
            .push(TurnRequest::Text("Research Acme".into()).into_content());

        let body = chat.request_body();
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be useful");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Research Acme");
        assert_eq!(body["tools"].as_array().unwrap().len(), 2);
        assert_eq!(
            chat.url,
            "https://example.invalid/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    fn model_turn(parts: Vec<Part>) -> Content {
        Content {
            role: Some("model".into()),
            parts: Some(parts),
        }
    }

    fn call(name: &str) -> Part {
        Part {
            function_call: Some(FunctionCall {
                name: name.into(),
                ..FunctionCall::default()
            }),
            ..Part::default()
        }
    }

    #[test]
    fn discard_keeps_text_and_drops_calls() {
        let mut chat = chat("https://example.invalid/v1beta");
        chat.history
            .push(TurnRequest::Text("Research Acme".into()).into_content());
        chat.history.push(model_turn(vec![
            Part::text("Still working. "),
            call("updateAccountPlan"),
        ]));

        chat.discard_unanswered_calls();
        assert_eq!(chat.history.len(), 2);
        let parts = chat.history[1].parts.as_ref().unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].text.as_deref(), Some("Still working. "));
    }

    #[test]
    fn discard_pops_call_only_turn() {
        let mut chat = chat("https://example.invalid/v1beta");
        chat.history
            .push(TurnRequest::Text("Research Acme".into()).into_content());
        chat.history.push(model_turn(vec![call("updateAccountPlan")]));

        chat.discard_unanswered_calls();
        assert_eq!(chat.history.len(), 1);
        assert_eq!(chat.history[0].role.as_deref(), Some("user"));

        // A trailing user turn is never touched.
        chat.discard_unanswered_calls();
        assert_eq!(chat.history.len(), 1);
    }

    #[tokio::test]
    async fn failed_send_leaves_history_unchanged() {
        // Nothing listens on the discard port, so the connection is refused.
        let mut chat = chat("http://127.0.0.1:9");
        let result = chat.send(TurnRequest::Text("hello".into())).await;
        assert!(result.is_err());
        assert!(chat.history.is_empty());
    }
}
