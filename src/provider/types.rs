//! Wire types for the Gemini `generateContent` API.
//!
//! Only the fields the agent loop reads are modelled; anything else on a
//! part (e.g. `thoughtSignature`) is kept in [`Part::extra`] so the chat
//! history can be replayed to the API unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::message::GroundingSource;

/// One message sent to the model in a round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnRequest {
    /// A user-authored message.
    Text(String),
    /// Results for every tool call of the previous response, in call order.
    ToolResults(Vec<FunctionResponse>),
}

impl TurnRequest {
    /// Converts the request into a `user` content entry for the history.
    pub fn into_content(self) -> Content {
        let parts = match self {
            TurnRequest::Text(text) => vec![Part::text(text)],
            TurnRequest::ToolResults(results) => results
                .into_iter()
                .map(|r| Part {
                    function_response: Some(r),
                    ..Part::default()
                })
                .collect(),
        };
        Content {
            role: Some("user".to_string()),
            parts: Some(parts),
        }
    }
}

/// Top-level `generateContent` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding_metadata: Option<GroundingMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl Candidate {
    /// Web citations attached to this candidate, in chunk order.
    ///
    /// Chunks without a web URI are dropped; a missing title falls back to the URI.
    pub fn grounding_sources(&self) -> Vec<GroundingSource> {
        let Some(chunks) = self
            .grounding_metadata
            .as_ref()
            .and_then(|m| m.grounding_chunks.as_ref())
        else {
            return Vec::new();
        };
        chunks
            .iter()
            .filter_map(|chunk| {
                let web = chunk.web.as_ref()?;
                let uri = web.uri.as_deref().filter(|u| !u.is_empty())?;
                let title = web.title.as_deref().filter(|t| !t.is_empty()).unwrap_or(uri);
                Some(GroundingSource {
                    uri: uri.to_string(),
                    title: title.to_string(),
                })
            })
            .collect()
    }

    /// The candidate's parts, if it carries any content at all.
    pub fn parts(&self) -> Option<&[Part]> {
        self.content.as_ref()?.parts.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<Part>>,
}

/// A content part. At most one of the known payloads is normally set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_response: Option<FunctionResponse>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

/// A structured tool invocation requested by the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub args: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Outcome payload of a tool call; serializes as `{"result": ..}` or `{"error": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionOutcome {
    Result(String),
    Error(String),
}

/// A tool result returned to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: FunctionOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl FunctionResponse {
    /// Successful result correlated to `call`. The id is copied only if present.
    pub fn success(call: &FunctionCall, result: impl Into<String>) -> Self {
        Self {
            name: call.name.clone(),
            response: FunctionOutcome::Result(result.into()),
            id: call.id.clone(),
        }
    }

    pub fn failure(call: &FunctionCall, error: impl Into<String>) -> Self {
        Self {
            name: call.name.clone(),
            response: FunctionOutcome::Error(error.into()),
            id: call.id.clone(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.response, FunctionOutcome::Error(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding_chunks: Option<Vec<GroundingChunk>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundingChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<WebChunk>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_text_call_and_grounding() {
        let raw = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "Found data. "},
                        {"functionCall": {"name": "updateAccountPlan", "args": {"sections": []}, "id": "c1"},
                         "thoughtSignature": "sig"}
                    ]
                },
                "groundingMetadata": {
                    "groundingChunks": [
                        {"web": {"uri": "https://a.example", "title": "A"}},
                        {"web": {"uri": "https://b.example"}},
                        {"web": {"title": "no uri"}},
                        {}
                    ]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": {"totalTokenCount": 12}
        });

        let response: TurnResponse = serde_json::from_value(raw).unwrap();
        let candidate = &response.candidates[0];
        let parts = candidate.parts().unwrap();
        assert_eq!(parts[0].text.as_deref(), Some("Found data. "));

        let call = parts[1].function_call.as_ref().unwrap();
        assert_eq!(call.name, "updateAccountPlan");
        assert_eq!(call.id.as_deref(), Some("c1"));
        assert_eq!(parts[1].extra["thoughtSignature"], "sig");

        assert_eq!(
            candidate.grounding_sources(),
            vec![
                GroundingSource {
                    uri: "https://a.example".into(),
                    title: "A".into()
                },
                GroundingSource {
                    uri: "https://b.example".into(),
                    title: "https://b.example".into()
                },
            ]
        );
    }

    #[test]
    fn candidate_without_content_has_no_parts() {
        let response: TurnResponse =
            serde_json::from_value(json!({"candidates": [{"finishReason": "SAFETY"}]})).unwrap();
        assert!(response.candidates[0].parts().is_none());

        let empty: TurnResponse = serde_json::from_value(json!({})).unwrap();
        assert!(empty.candidates.is_empty());
    }

    #[test]
    fn function_response_omits_missing_id() {
        let call = FunctionCall {
            name: "lookup".into(),
            args: Value::Null,
            id: None,
        };
        let value = serde_json::to_value(FunctionResponse::failure(&call, "Function lookup not found."))
            .unwrap();
        assert_eq!(
            value,
            json!({"name": "lookup", "response": {"error": "Function lookup not found."}})
        );
    }

    #[test]
    fn tool_results_become_user_content() {
        let call = FunctionCall {
            name: "updateAccountPlan".into(),
            args: json!({}),
            id: Some("c9".into()),
        };
        let content =
            TurnRequest::ToolResults(vec![FunctionResponse::success(&call, "ok")]).into_content();
        let value = serde_json::to_value(content).unwrap();
        assert_eq!(
            value,
            json!({
                "role": "user",
                "parts": [{"functionResponse": {
                    "name": "updateAccountPlan",
                    "response": {"result": "ok"},
                    "id": "c9"
                }}]
            })
        );
    }
}
