//! Environment variable substitution and API key resolution.

use std::time::Duration;

use super::types::Config;
use crate::constants::{API_KEY_ENV_VARS, SYSTEM_INSTRUCTION};

impl Config {
    /// Resolve {env:VAR_NAME} patterns in string fields.
    pub(super) fn resolve_substitutions(&mut self) {
        self.model = Self::resolve_str(&self.model);
        self.base_url = Self::resolve_str(&self.base_url);
        if let Some(ref mut key) = self.api_key {
            *key = Self::resolve_str(key);
        }
        if let Some(ref mut sp) = self.system_prompt {
            *sp = Self::resolve_str(sp);
        }
    }

    /// Replace {env:VAR} with the environment variable value.
    fn resolve_str(s: &str) -> String {
        let mut result = s.to_string();
        while let Some(start) = result.find("{env:") {
            let Some(end) = result[start..].find('}') else {
                break;
            };
            let var_name = &result[start + 5..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
        }
        result
    }

    /// Resolve the API key: environment first, then config value.
    ///
    /// Empty values count as missing.
    pub fn resolve_api_key(&self) -> Option<String> {
        for var in API_KEY_ENV_VARS {
            if let Ok(val) = std::env::var(var) {
                if !val.is_empty() {
                    return Some(val);
                }
            }
        }
        self.api_key.clone().filter(|k| !k.is_empty())
    }

    /// System instruction sent when a conversation session starts.
    pub fn system_instruction(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or(SYSTEM_INSTRUCTION)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
