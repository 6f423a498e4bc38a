//! File loading and merging for dossier configuration.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::types::{
    default_base_url, default_max_tool_loops, default_model, default_request_timeout_secs, Config,
};

/// Written to `~/.config/dossier/config.toml` on first run.
const DEFAULT_CONFIG_TOML: &str = r#"model = "gemini-2.5-flash"
api_key = "{env:GEMINI_API_KEY}"
max_tool_loops = 5
google_search = true
"#;

impl Config {
    /// Loads the global config from `~/.config/dossier/config.toml`.
    ///
    /// If no config file exists, writes one with defaults (including an
    /// `{env:VAR}` placeholder for the API key) and returns it.
    pub(super) fn load_global() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, DEFAULT_CONFIG_TOML)
                .with_context(|| format!("Failed to write default config to {:?}", path))?;
            return toml::from_str(DEFAULT_CONFIG_TOML).context("Failed to parse default config");
        }
        Self::load_file(&path)
    }

    /// Look for dossier.toml in current dir, then walk up to git root.
    pub(super) fn load_project() -> Result<Option<Config>> {
        let mut dir = std::env::current_dir()?;
        loop {
            let candidate = dir.join(crate::constants::PROJECT_CONFIG_FILENAME);
            if candidate.exists() {
                return Self::load_file(&candidate).map(Some);
            }
            if dir.join(".git").exists() || !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    fn load_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse config at {:?}", path))
    }

    /// Merge project config over global config.
    ///
    /// Scalar fields that still hold their serde default in the project file
    /// are treated as unset, so the global value wins.
    pub(super) fn merge(global: Config, project: Config) -> Config {
        Config {
            model: if project.model != default_model() {
                project.model
            } else {
                global.model
            },
            api_key: project.api_key.or(global.api_key),
            base_url: if project.base_url != default_base_url() {
                project.base_url
            } else {
                global.base_url
            },
            system_prompt: project.system_prompt.or(global.system_prompt),
            max_tool_loops: if project.max_tool_loops != default_max_tool_loops() {
                project.max_tool_loops
            } else {
                global.max_tool_loops
            },
            request_timeout_secs: if project.request_timeout_secs != default_request_timeout_secs()
            {
                project.request_timeout_secs
            } else {
                global.request_timeout_secs
            },
            google_search: project.google_search && global.google_search,
            export_dir: project.export_dir.or(global.export_dir),
        }
    }

    /// Rejects settings that would make every turn fail or come back empty.
    pub(super) fn validate(&self) -> Result<()> {
        if self.max_tool_loops == 0 {
            anyhow::bail!("max_tool_loops must be at least 1");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_toml_parses_to_defaults() {
        let config: Config = toml::from_str(DEFAULT_CONFIG_TOML).unwrap();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.max_tool_loops, 5);
        assert!(config.google_search);
        assert_eq!(config.api_key.as_deref(), Some("{env:GEMINI_API_KEY}"));
    }

    #[test]
    fn project_values_win_over_global() {
        let global: Config = toml::from_str("model = \"gemini-2.5-pro\"\napi_key = \"g\"").unwrap();
        let project: Config = toml::from_str("max_tool_loops = 3\napi_key = \"p\"").unwrap();

        let merged = Config::merge(global, project);
        assert_eq!(merged.model, "gemini-2.5-pro");
        assert_eq!(merged.max_tool_loops, 3);
        assert_eq!(merged.api_key.as_deref(), Some("p"));
    }

    #[test]
    fn zero_limits_are_rejected() {
        assert!(Config::default().validate().is_ok());

        let config: Config = toml::from_str("max_tool_loops = 0").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_tool_loops"));

        let config: Config = toml::from_str("request_timeout_secs = 0").unwrap();
        assert!(config.validate().is_err());

        let config: Config = toml::from_str("max_tool_loops = 1").unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn project_can_disable_search() {
        let global = Config::default();
        let project: Config = toml::from_str("google_search = false").unwrap();
        assert!(!Config::merge(global, project).google_search);
    }
}
