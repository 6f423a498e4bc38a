//! Struct definitions and serde defaults for dossier configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_MODEL, GEMINI_DEFAULT_BASE_URL, MAX_TOOL_LOOPS_DEFAULT, REQUEST_TIMEOUT_SECS_DEFAULT,
};

/// Root configuration for dossier, deserialized from `config.toml`.
///
/// Fields use serde defaults so dossier can run with sensible defaults
/// when no config file exists.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Gemini model identifier (e.g. `"gemini-2.5-flash"`).
    #[serde(default = "default_model")]
    pub model: String,
    /// API key. Environment variables take precedence, see [`Config::resolve_api_key`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL of the Gemini REST API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Replaces the built-in system instruction when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Maximum tool-result round trips per user message.
    #[serde(default = "default_max_tool_loops")]
    pub max_tool_loops: usize,
    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Whether the Google Search grounding capability is enabled.
    #[serde(default = "default_google_search")]
    pub google_search: bool,
    /// Directory plan exports are written to. Defaults to the working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}

pub(super) fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

pub(super) fn default_base_url() -> String {
    GEMINI_DEFAULT_BASE_URL.to_string()
}

pub(super) fn default_max_tool_loops() -> usize {
    MAX_TOOL_LOOPS_DEFAULT
}

pub(super) fn default_request_timeout_secs() -> u64 {
    REQUEST_TIMEOUT_SECS_DEFAULT
}

fn default_google_search() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
            base_url: default_base_url(),
            system_prompt: None,
            max_tool_loops: default_max_tool_loops(),
            request_timeout_secs: default_request_timeout_secs(),
            google_search: default_google_search(),
            export_dir: None,
        }
    }
}
