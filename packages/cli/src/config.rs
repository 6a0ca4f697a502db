use formtree_editor::EditorOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "formtree.config.json";

/// Formtree configuration file format
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Options handed to every opened document
    #[serde(default)]
    pub editor: EditorOptions,

    /// Write edits here instead of overwriting the input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<String>,
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!("Loaded {}", config_path.display());
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Where an edited copy of `input` should be written
    pub fn output_path(&self, cwd: &str, input: &std::path::Path) -> PathBuf {
        match (&self.out_dir, input.file_name()) {
            (Some(dir), Some(name)) => PathBuf::from(cwd).join(dir).join(name),
            _ => input.to_path_buf(),
        }
    }
}
