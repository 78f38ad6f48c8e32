use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Workspace settings file, relative to the working directory.
pub const CONFIG_PATH: &str = ".decomm/config.json";

/// Workspace settings. Command-line flags override these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Author recorded on review comments and history events.
    #[serde(default = "default_reviewer")]
    pub reviewer: String,

    /// Number of synthetic circuits `init` generates.
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_data_dir() -> String {
    ".decomm/data".to_string()
}

fn default_reviewer() -> String {
    "Network Engineer".to_string()
}

fn default_sample_size() -> usize {
    100
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            reviewer: default_reviewer(),
            sample_size: default_sample_size(),
            seed: None,
        }
    }
}

impl Settings {
    /// Load `path` if it exists, otherwise built-in defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read settings {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("{}: invalid settings JSON", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded workspace settings");
        Ok(settings)
    }

    /// Load the workspace settings from [`CONFIG_PATH`].
    pub fn load_workspace() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_PATH))
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, data_dir: Option<String>, reviewer: Option<String>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        if let Some(name) = reviewer {
            self.reviewer = name;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = std::env::temp_dir().join("decomm-settings-missing");
        let settings = Settings::load_from(&dir.join("nope.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.reviewer, "Network Engineer");
        assert_eq!(settings.sample_size, 100);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"reviewer": "NOC Lead"}"#).unwrap();
        assert_eq!(settings.reviewer, "NOC Lead");
        assert_eq!(settings.data_dir, ".decomm/data");
        assert_eq!(settings.seed, None);
    }

    #[test]
    fn flags_override_file() {
        let settings = Settings::default().with_overrides(Some("/tmp/d".into()), None);
        assert_eq!(settings.data_dir, "/tmp/d");
        assert_eq!(settings.reviewer, "Network Engineer");
    }
}
