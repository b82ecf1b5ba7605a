//! Pipeline contracts and the command-backed implementation.
//!
//! The engine does not answer questions itself. It talks to two external
//! collaborators, a translation pipeline and a retrieval pipeline, through
//! the [`QueryPipeline`] trait. [`CommandPipeline`] is the production
//! implementation: each call shells out to a configured command with the
//! text on stdin.

use crate::config::Config;
use crate::language::Language;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

/// Result of a retrieval query.
#[derive(Debug, Clone, Deserialize)]
pub struct Answer {
    /// The answer text, in English.
    pub answer: String,
    /// Optional source references.
    #[serde(default)]
    pub sources: Vec<String>,
}

/// The interface the turn controller requires of the external pipelines.
///
/// Both translation directions are identity when the language is English.
pub trait QueryPipeline {
    /// Translate user text into English for retrieval.
    fn translate_to_english(&self, text: &str, language: Language)
        -> Result<String, PipelineError>;

    /// Run the retrieval/answering pipeline on an English question.
    fn answer(&self, english_text: &str) -> Result<Answer, PipelineError>;

    /// Translate an English answer back into the session language.
    fn translate_from_english(
        &self,
        text: &str,
        language: Language,
    ) -> Result<String, PipelineError>;
}

/// Command-backed pipeline implementation.
///
/// Owns a current-thread tokio runtime so its methods stay synchronous for
/// the cooperative host loop; hosts that must not block call them from a
/// blocking task.
#[derive(Debug)]
pub struct CommandPipeline {
    answer_argv: Vec<String>,
    translate_argv: Vec<String>,
    command_timeout: Duration,
    runtime: tokio::runtime::Runtime,
}

impl CommandPipeline {
    /// Build a pipeline from configuration without probing the commands.
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        if config.answer_argv.is_empty() {
            return Err(PipelineError::NotConfigured("answer_argv"));
        }
        if config.translate_argv.is_empty() {
            return Err(PipelineError::NotConfigured("translate_argv"));
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(PipelineError::Io)?;

        Ok(Self {
            answer_argv: config.answer_argv.clone(),
            translate_argv: config.translate_argv.clone(),
            command_timeout: Duration::from_secs(config.timeout_seconds),
            runtime,
        })
    }

    fn translate(&self, direction: &str, text: &str, language: Language)
        -> Result<String, PipelineError> {
        if language == Language::English {
            return Ok(text.to_string());
        }

        let mut argv = self.translate_argv.clone();
        argv.push(direction.to_string());
        argv.push(language.code().to_string());

        tracing::debug!(command = %argv[0], direction, code = language.code(), "invoking translator");
        self.runtime
            .block_on(invoke_command(&argv, text, self.command_timeout))
    }
}

impl QueryPipeline for CommandPipeline {
    fn translate_to_english(
        &self,
        text: &str,
        language: Language,
    ) -> Result<String, PipelineError> {
        self.translate("to-en", text, language)
    }

    fn answer(&self, english_text: &str) -> Result<Answer, PipelineError> {
        tracing::debug!(command = %self.answer_argv[0], "invoking retrieval pipeline");
        let raw = self.runtime.block_on(invoke_command(
            &self.answer_argv,
            english_text,
            self.command_timeout,
        ))?;
        Ok(parse_answer(&raw))
    }

    fn translate_from_english(
        &self,
        text: &str,
        language: Language,
    ) -> Result<String, PipelineError> {
        self.translate("from-en", text, language)
    }
}

/// Parse a retrieval reply: JSON `{"answer": ...}` or plain text.
fn parse_answer(raw: &str) -> Answer {
    serde_json::from_str(raw).unwrap_or_else(|_| Answer {
        answer: raw.to_string(),
        sources: Vec::new(),
    })
}

/// Run a command with `input` on stdin and return its trimmed output.
async fn invoke_command(
    argv: &[String],
    input: &str,
    timeout_duration: Duration,
) -> Result<String, PipelineError> {
    let mut cmd = Command::new(&argv[0]);
    for arg in &argv[1..] {
        cmd.arg(arg);
    }
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(PipelineError::Spawn)?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(input.as_bytes())
            .await
            .map_err(PipelineError::Io)?;
        drop(stdin);
    }

    let result = timeout(timeout_duration, child.wait_with_output()).await;

    match result {
        Ok(Ok(output)) => {
            let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

            if !output.status.success() && stdout.is_empty() {
                return Err(PipelineError::CommandFailed {
                    command: argv[0].clone(),
                    detail: stderr,
                });
            }

            // Some tools write to stderr only
            let reply = if stdout.is_empty() { stderr } else { stdout };
            if reply.is_empty() {
                return Err(PipelineError::EmptyOutput(argv[0].clone()));
            }
            Ok(reply)
        }
        Ok(Err(e)) => Err(PipelineError::Io(e)),
        Err(_) => Err(PipelineError::Timeout(argv[0].clone())),
    }
}

/// One-time process-wide initialization.
///
/// Validates that the configured commands resolve on PATH and builds the
/// pipeline. Failure here is fatal to startup; no turn processing may
/// happen before it succeeds.
pub fn load_resources(config: &Config) -> Result<CommandPipeline, PipelineError> {
    for argv in [&config.answer_argv, &config.translate_argv] {
        let Some(command) = argv.first() else {
            return Err(PipelineError::NotConfigured("pipeline command"));
        };
        which::which(command)
            .map_err(|_| PipelineError::CommandNotFound(command.clone()))?;
    }
    CommandPipeline::from_config(config)
}

/// Result of probing one pipeline command for `doctor`.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    /// The command that was probed (argv[0]).
    pub command: String,
    /// Whether the command resolves on PATH.
    pub found: bool,
    /// Resolved path, if found.
    pub path: Option<String>,
    /// Whether the command replied to a test input within the timeout.
    pub responded: bool,
    /// Response time in milliseconds, if it responded.
    pub response_time_ms: Option<u64>,
    /// Problems observed while probing.
    pub issues: Vec<String>,
}

/// Probe a pipeline command: resolve it on PATH, then feed it a test input
/// and wait up to `timeout_duration` for a reply.
pub fn probe_command(argv: &[String], timeout_duration: Duration) -> ProbeReport {
    let Some(command) = argv.first() else {
        return ProbeReport {
            command: String::new(),
            found: false,
            path: None,
            responded: false,
            response_time_ms: None,
            issues: vec!["no command configured".into()],
        };
    };

    let mut report = ProbeReport {
        command: command.clone(),
        found: false,
        path: None,
        responded: false,
        response_time_ms: None,
        issues: Vec::new(),
    };

    match which::which(command) {
        Ok(path) => {
            report.found = true;
            report.path = Some(path.to_string_lossy().to_string());
        }
        Err(_) => {
            report.issues.push(format!("{command} not found on PATH"));
            return report;
        }
    }

    let Ok(runtime) = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    else {
        report.issues.push("failed to build probe runtime".into());
        return report;
    };

    let start = Instant::now();
    match runtime.block_on(invoke_command(argv, "ping", timeout_duration)) {
        Ok(_) => {
            report.responded = true;
            #[allow(clippy::cast_possible_truncation)]
            {
                report.response_time_ms = Some(start.elapsed().as_millis() as u64);
            }
        }
        Err(e) => {
            report.issues.push(e.to_string());
        }
    }

    report
}

/// Errors that can occur when invoking the external pipelines.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A required command list is empty in the configuration.
    #[error("pipeline not configured: {0} is empty")]
    NotConfigured(&'static str),

    /// A configured command does not resolve on PATH.
    #[error("command not found on PATH: {0}")]
    CommandNotFound(String),

    /// The command could not be spawned.
    #[error("failed to spawn command: {0}")]
    Spawn(#[source] std::io::Error),

    /// I/O error while talking to the command.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The command did not reply within the timeout.
    #[error("command timed out: {0}")]
    Timeout(String),

    /// The command exited with failure and produced no usable output.
    #[error("command {command} failed: {detail}")]
    CommandFailed { command: String, detail: String },

    /// The command exited without producing any output.
    #[error("command produced no output: {0}")]
    EmptyOutput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat_config() -> Config {
        Config {
            answer_argv: vec!["cat".into()],
            // `sh -c 'cat -'` ignores the appended direction/code arguments
            // and echoes stdin, which is enough to exercise the plumbing.
            translate_argv: vec!["sh".into(), "-c".into(), "cat -".into()],
            timeout_seconds: 10,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_answer_json_and_plain() {
        let json = parse_answer(r#"{"answer": "See the fees page.", "sources": ["fees.md"]}"#);
        assert_eq!(json.answer, "See the fees page.");
        assert_eq!(json.sources, vec!["fees.md"]);

        let plain = parse_answer("Just a plain reply.");
        assert_eq!(plain.answer, "Just a plain reply.");
        assert!(plain.sources.is_empty());
    }

    #[test]
    fn test_english_translation_is_identity_without_spawning() {
        // answer_argv is a command that does not exist; English translation
        // must short-circuit before any spawn happens.
        let config = Config {
            answer_argv: vec!["askdesk-test-no-such-command".into()],
            translate_argv: vec!["askdesk-test-no-such-command".into()],
            ..Default::default()
        };
        let pipeline = CommandPipeline::from_config(&config).unwrap();

        let text = "Where is the career center?";
        assert_eq!(
            pipeline
                .translate_to_english(text, Language::English)
                .unwrap(),
            text
        );
        assert_eq!(
            pipeline
                .translate_from_english(text, Language::English)
                .unwrap(),
            text
        );
    }

    #[test]
    fn test_command_answer_plain_text() {
        let pipeline = CommandPipeline::from_config(&cat_config()).unwrap();
        let answer = pipeline.answer("What are the fees?").unwrap();
        assert_eq!(answer.answer, "What are the fees?");
    }

    #[test]
    fn test_command_answer_json() {
        let pipeline = CommandPipeline::from_config(&cat_config()).unwrap();
        let answer = pipeline
            .answer(r#"{"answer": "Winter hours updated.", "sources": ["news"]}"#)
            .unwrap();
        assert_eq!(answer.answer, "Winter hours updated.");
        assert_eq!(answer.sources, vec!["news"]);
    }

    #[test]
    fn test_command_translate_non_english() {
        let pipeline = CommandPipeline::from_config(&cat_config()).unwrap();
        let out = pipeline
            .translate_to_english("Quels sont les frais ?", Language::French)
            .unwrap();
        assert_eq!(out, "Quels sont les frais ?");
    }

    #[test]
    fn test_command_timeout() {
        let config = Config {
            answer_argv: vec!["sleep".into(), "5".into()],
            timeout_seconds: 0,
            ..cat_config()
        };
        let pipeline = CommandPipeline::from_config(&config).unwrap();
        let err = pipeline.answer("anything").unwrap_err();
        assert!(matches!(err, PipelineError::Timeout(_)));
    }

    #[test]
    fn test_load_resources_rejects_missing_command() {
        let config = Config {
            answer_argv: vec!["askdesk-test-no-such-command".into()],
            ..Default::default()
        };
        let err = load_resources(&config).unwrap_err();
        assert!(matches!(err, PipelineError::CommandNotFound(_)));
    }

    #[test]
    fn test_load_resources_accepts_available_commands() {
        let pipeline = load_resources(&cat_config());
        assert!(pipeline.is_ok());
    }

    #[test]
    fn test_probe_missing_command() {
        let report = probe_command(
            &["askdesk-test-no-such-command".to_string()],
            Duration::from_secs(1),
        );
        assert!(!report.found);
        assert!(!report.responded);
        assert!(!report.issues.is_empty());
    }

    #[test]
    fn test_probe_available_command() {
        let report = probe_command(&["cat".to_string()], Duration::from_secs(10));
        assert!(report.found);
        assert!(report.responded);
        assert!(report.response_time_ms.is_some());
    }
}
