use postcraft_editor::EditorConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "postcraft.config.json";

/// Postcraft configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding persisted posts
    #[serde(default = "default_src_dir")]
    pub src_dir: String,

    /// File extension of persisted posts
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Clear text color under links when normalizing
    #[serde(default = "default_true")]
    pub enforce_link_color: bool,

    /// Undo depth for editing sessions
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,
}

fn default_src_dir() -> String {
    "posts".to_string()
}

fn default_extension() -> String {
    "html".to_string()
}

fn default_true() -> bool {
    true
}

fn default_history_depth() -> usize {
    100
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Get absolute path to source directory
    pub fn get_src_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.src_dir)
    }

    pub fn editor_config(&self) -> EditorConfig {
        EditorConfig {
            history_depth: self.history_depth,
            enforce_link_color: self.enforce_link_color,
            ..EditorConfig::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            src_dir: default_src_dir(),
            extension: default_extension(),
            enforce_link_color: true,
            history_depth: default_history_depth(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "srcDir": "content/blog",
            "extension": "xml",
            "enforceLinkColor": false
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.src_dir, "content/blog");
        assert_eq!(config.extension, "xml");
        assert!(!config.enforce_link_color);
        assert_eq!(config.history_depth, 100);
        assert!(!config.editor_config().enforce_link_color);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.src_dir, "posts");
        assert_eq!(config.extension, "html");
        assert!(config.enforce_link_color);
    }
}
