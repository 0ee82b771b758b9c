//! Session configuration

use serde::{Deserialize, Serialize};

/// Knobs for an editing session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum undo levels (0 = unlimited)
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,

    /// Clear text color under links after every edit
    #[serde(default = "default_true")]
    pub enforce_link_color: bool,

    /// Turn typed patterns into nodes
    #[serde(default = "default_true")]
    pub input_rules: bool,
}

fn default_history_depth() -> usize {
    100
}

fn default_true() -> bool {
    true
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_depth: default_history_depth(),
            enforce_link_color: true,
            input_rules: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EditorConfig = serde_json::from_str(r#"{"enforceLinkColor": false}"#).unwrap();
        assert!(!config.enforce_link_color);
        assert!(config.input_rules);
        assert_eq!(config.history_depth, 100);
    }
}
