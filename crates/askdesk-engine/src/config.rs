//! Configuration for the askdesk engine.
//!
//! Defines the commands used to reach the external retrieval and
//! translation pipelines, plus session defaults.

use crate::language::Language;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration for askdesk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Command and arguments for the retrieval/answering pipeline.
    /// The English question is written to stdin; the reply is read from
    /// stdout as JSON `{"answer": ...}` or plain text.
    #[serde(default = "default_answer_argv")]
    pub answer_argv: Vec<String>,

    /// Command and arguments for the translation pipeline. Invoked with
    /// `to-en <code>` or `from-en <code>` appended and the text on stdin.
    #[serde(default = "default_translate_argv")]
    pub translate_argv: Vec<String>,

    /// Timeout in seconds for each pipeline command.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Language new sessions start in.
    #[serde(default)]
    pub default_language: Language,

    /// Reply shown when the pipeline fails to produce an answer.
    #[serde(default = "default_error_reply")]
    pub error_reply: String,
}

fn default_answer_argv() -> Vec<String> {
    vec!["askdesk-retrieval".into()]
}

fn default_translate_argv() -> Vec<String> {
    vec!["askdesk-translate".into()]
}

fn default_timeout() -> u64 {
    60
}

fn default_error_reply() -> String {
    "Sorry, I couldn't find an answer right now. Please try asking again.".into()
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            answer_argv: default_answer_argv(),
            translate_argv: default_translate_argv(),
            timeout_seconds: default_timeout(),
            default_language: Language::default(),
            error_reply: default_error_reply(),
        }
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.timeout_seconds, 60);
        assert_eq!(config.default_language, Language::English);
        assert!(!config.error_reply.is_empty());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"timeout_seconds": 5}"#).unwrap();
        assert_eq!(config.timeout_seconds, 5);
        assert_eq!(config.answer_argv, vec!["askdesk-retrieval".to_string()]);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".askdesk").join("config.json");

        let config = Config {
            default_language: Language::French,
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.default_language, Language::French);
        assert_eq!(loaded.answer_argv, config.answer_argv);
    }
}
