//! askdesk-engine: Headless chat engine for the askdesk support assistant
//!
//! This crate provides the core turn-taking logic for askdesk, including:
//! - Session state (chat history, input buffer, language selection)
//! - The two-phase turn controller (placeholder insertion -> resolution)
//! - Pipeline contracts and the command-backed implementation
//! - Configuration and session persistence

pub mod config;
pub mod controller;
pub mod language;
pub mod pipeline;
pub mod session;
pub mod turn;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use controller::{
    commit_reply, pending_query, resolve_pending, run_pipeline, submit, PendingQuery, Resolution,
    SubmitOutcome,
};
pub use language::{Language, UnknownLanguage};
pub use pipeline::{
    load_resources, probe_command, Answer, CommandPipeline, PipelineError, ProbeReport,
    QueryPipeline,
};
pub use session::{Session, SessionError};
pub use turn::{Sender, Turn, TurnBody};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
