//! Session state store.
//!
//! A session owns the chat history, the input buffer, and the language
//! selection for one user. Sessions are independent of each other; the
//! history is append-only and only ever cleared as a whole.

use crate::language::Language;
use crate::turn::{Sender, Turn};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Per-user chat state for one session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Unique session ID.
    pub id: String,
    /// Ordered chat history.
    turns: Vec<Turn>,
    /// The current input buffer, cleared on submission.
    input: String,
    /// Language answers are translated into.
    language: Language,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new empty session.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            turns: Vec::new(),
            input: String::new(),
            language: Language::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The chat history, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The current input buffer.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Overwrite the input buffer.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Clear the input buffer.
    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    /// The selected language.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Change the language. Takes effect on the next pipeline invocation;
    /// already-committed turns are not retranslated.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Append a turn to the history. Never fails.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
        self.updated_at = Utc::now();
    }

    /// Atomically replace the last turn in the history.
    ///
    /// Replacing the last turn of an empty history is a caller bug and
    /// returns `InvariantViolation`; the history is left untouched.
    pub fn replace_last(&mut self, turn: Turn) -> Result<(), SessionError> {
        let Some(last) = self.turns.last_mut() else {
            return Err(SessionError::InvariantViolation(
                "replace_last on empty history",
            ));
        };
        *last = turn;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Clear the history and the input buffer in one step.
    pub fn reset(&mut self) {
        self.turns.clear();
        self.input.clear();
        self.updated_at = Utc::now();
    }

    /// Whether the last turn is an unresolved placeholder.
    pub fn has_pending(&self) -> bool {
        self.turns.last().is_some_and(Turn::is_pending)
    }

    /// The user question directly preceding the trailing placeholder.
    ///
    /// Returns `None` when no placeholder is pending. A pending turn with
    /// no user turn before it would violate the history invariant, so that
    /// case also returns `None`.
    pub fn pending_question(&self) -> Option<&str> {
        if !self.has_pending() {
            return None;
        }
        let before_last = self.turns.len().checked_sub(2)?;
        let turn = &self.turns[before_last];
        if turn.sender == Sender::User {
            turn.body.text()
        } else {
            None
        }
    }

    /// The most recent finalized bot answer, if any.
    pub fn last_answer(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.sender == Sender::Bot && !t.is_pending())
            .and_then(|t| t.body.text())
    }

    /// Save the session to a JSONL file under `dir`.
    ///
    /// First line is metadata, followed by one turn per line.
    pub fn save(&self, dir: &Path) -> Result<(), SessionError> {
        use std::io::Write;

        std::fs::create_dir_all(dir).map_err(SessionError::Io)?;
        let path = dir.join(format!("{}.jsonl", self.id));
        let mut file = std::fs::File::create(&path).map_err(SessionError::Io)?;

        let metadata = SessionMetadata {
            id: self.id.clone(),
            language: self.language,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        let meta_json = serde_json::to_string(&metadata).map_err(SessionError::Serialize)?;
        writeln!(file, "{meta_json}").map_err(SessionError::Io)?;

        for turn in &self.turns {
            let json = serde_json::to_string(turn).map_err(SessionError::Serialize)?;
            writeln!(file, "{json}").map_err(SessionError::Io)?;
        }

        Ok(())
    }

    /// Load a session from a JSONL file under `dir`.
    pub fn load(dir: &Path, session_id: &str) -> Result<Self, SessionError> {
        let path = dir.join(format!("{session_id}.jsonl"));
        let content = std::fs::read_to_string(&path).map_err(SessionError::Io)?;

        let mut lines = content.lines();
        let meta_line = lines.next().ok_or(SessionError::EmptySession)?;
        let metadata: SessionMetadata =
            serde_json::from_str(meta_line).map_err(SessionError::Parse)?;

        let mut turns = Vec::new();
        for line in lines {
            if !line.trim().is_empty() {
                let turn: Turn = serde_json::from_str(line).map_err(SessionError::Parse)?;
                turns.push(turn);
            }
        }

        Ok(Self {
            id: metadata.id,
            turns,
            input: String::new(),
            language: metadata.language,
            created_at: metadata.created_at,
            updated_at: metadata.updated_at,
        })
    }

    /// List all session IDs in `dir`.
    pub fn list(dir: &Path) -> Result<Vec<String>, SessionError> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(SessionError::Io)? {
            let entry = entry.map_err(SessionError::Io)?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "jsonl") {
                if let Some(stem) = path.file_stem() {
                    ids.push(stem.to_string_lossy().to_string());
                }
            }
        }

        Ok(ids)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Session metadata (stored as first line of JSONL).
#[derive(Debug, Serialize, Deserialize)]
struct SessionMetadata {
    id: String,
    language: Language,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Errors that can occur in session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Internal bug signal: an operation was attempted in a state the
    /// history invariant rules out. Never surfaced to the user.
    #[error("history invariant violated: {0}")]
    InvariantViolation(&'static str),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialize(#[source] serde_json::Error),

    /// JSON parse error.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Empty session file.
    #[error("Session file is empty")]
    EmptySession,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new();
        assert!(session.turns().is_empty());
        assert!(session.input().is_empty());
        assert_eq!(session.language(), Language::English);
        assert!(!session.has_pending());
    }

    #[test]
    fn test_push_and_replace_last() {
        let mut session = Session::new();
        session.push(Turn::user("hi"));
        session.push(Turn::bot_pending());
        assert!(session.has_pending());

        session.replace_last(Turn::bot("hello")).unwrap();
        assert!(!session.has_pending());
        assert_eq!(session.last_answer(), Some("hello"));
        assert_eq!(session.turns().len(), 2);
    }

    #[test]
    fn test_replace_last_on_empty_history_fails() {
        let mut session = Session::new();
        let err = session.replace_last(Turn::bot("orphan")).unwrap_err();
        assert!(matches!(err, SessionError::InvariantViolation(_)));
        assert!(session.turns().is_empty());
    }

    #[test]
    fn test_pending_question() {
        let mut session = Session::new();
        assert!(session.pending_question().is_none());

        session.push(Turn::user("What are the fees?"));
        assert!(session.pending_question().is_none());

        session.push(Turn::bot_pending());
        assert_eq!(session.pending_question(), Some("What are the fees?"));

        session.replace_last(Turn::bot("See the portal.")).unwrap();
        assert!(session.pending_question().is_none());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = Session::new();
        session.set_input("half-typed");
        for i in 0..3 {
            session.push(Turn::user(format!("q{i}")));
            session.push(Turn::bot(format!("a{i}")));
        }
        assert_eq!(session.turns().len(), 6);

        session.reset();
        assert!(session.turns().is_empty());
        assert!(session.input().is_empty());
    }

    #[test]
    fn test_set_language_does_not_touch_history() {
        let mut session = Session::new();
        session.push(Turn::user("bonjour"));
        session.push(Turn::bot("hello"));

        session.set_language(Language::French);
        assert_eq!(session.language(), Language::French);
        assert_eq!(session.last_answer(), Some("hello"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();

        let mut session = Session::new();
        session.set_language(Language::Spanish);
        session.push(Turn::user("hola"));
        session.push(Turn::bot("buenas"));
        session.save(dir.path()).unwrap();

        let loaded = Session::load(dir.path(), &session.id).unwrap();
        assert_eq!(loaded.id, session.id);
        assert_eq!(loaded.language(), Language::Spanish);
        assert_eq!(loaded.turns().len(), 2);
        assert_eq!(loaded.last_answer(), Some("buenas"));

        let ids = Session::list(dir.path()).unwrap();
        assert_eq!(ids, vec![session.id.clone()]);
    }

    #[test]
    fn test_list_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ids = Session::list(&dir.path().join("nope")).unwrap();
        assert!(ids.is_empty());
    }
}
