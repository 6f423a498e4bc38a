//! Transcript types for dossier's chat history.
//!
//! A [`Message`] is what the presentation layer renders: who said it, the
//! text, and for model answers the web sources that grounded it. These are
//! not the wire types sent to the model; see [`crate::provider`] for those.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A web citation attached to a model answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub uri: String,
    pub title: String,
}

/// A single entry in the chat transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding_sources: Option<Vec<GroundingSource>>,
}

/// The author of a transcript entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
    System,
}

impl Message {
    fn new(role: Role, content: String, grounding_sources: Option<Vec<GroundingSource>>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            timestamp: Utc::now().timestamp_millis(),
            grounding_sources,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text.into(), None)
    }

    pub fn model(text: impl Into<String>, sources: Option<Vec<GroundingSource>>) -> Self {
        Self::new(Role::Model, text.into(), sources)
    }

    // Part of public API, used by front ends that surface local notices
    #[allow(dead_code)]
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text.into(), None)
    }

    /// Sources for display; empty when the answer had none.
    pub fn sources(&self) -> &[GroundingSource] {
        self.grounding_sources.as_deref().unwrap_or_default()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "you"),
            Role::Model => write!(f, "dossier"),
            Role::System => write!(f, "system"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_get_unique_ids() {
        let a = Message::user("hi");
        let b = Message::user("hi");
        assert_ne!(a.id, b.id);
        assert_eq!(a.role, Role::User);
    }

    #[test]
    fn sources_default_to_empty() {
        let plain = Message::model("answer", None);
        assert!(plain.sources().is_empty());

        let cited = Message::model(
            "answer",
            Some(vec![GroundingSource {
                uri: "https://a.example".into(),
                title: "A".into(),
            }]),
        );
        assert_eq!(cited.sources().len(), 1);
    }

    #[test]
    fn serializes_like_transcript_json() {
        let value = serde_json::to_value(Message::system("note")).unwrap();
        assert_eq!(value["role"], "system");
        assert!(value.get("groundingSources").is_none());
        assert!(value["timestamp"].as_i64().unwrap() > 0);
    }
}
