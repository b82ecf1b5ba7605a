//! Conversational turn controller.
//!
//! Implements the two-phase commit of a user question into a displayed
//! answer: the submission phase appends the user turn plus a pending bot
//! turn and clears the input buffer; the resolution phase runs the
//! translate -> retrieve -> translate pipeline and replaces the pending
//! turn in place. A pending turn always resolves: pipeline failures are
//! caught at this boundary and committed as a finalized fallback reply.

use crate::language::Language;
use crate::pipeline::{PipelineError, QueryPipeline};
use crate::session::Session;
use crate::turn::Turn;

/// Outcome of the submission phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The question and a pending bot turn were appended.
    Submitted,
    /// The input was empty after trimming; nothing changed.
    Empty,
    /// A previous question is still pending; nothing changed.
    Busy,
}

/// A detected unresolved placeholder, ready for the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    /// The user question preceding the placeholder.
    pub question: String,
    /// The language selected when resolution started.
    pub language: Language,
}

/// Outcome of the resolution phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The placeholder was replaced with a pipeline answer.
    Answered,
    /// The pipeline failed; the placeholder was replaced with the fallback.
    Recovered,
    /// No placeholder was pending.
    Idle,
}

/// Submission phase: commit the input buffer as a question.
///
/// Trims the buffer; whitespace-only input is ignored. While a placeholder
/// is pending, new submissions are rejected so the history can never hold
/// more than one unresolved turn. On success the user turn and a pending
/// bot turn are appended and the buffer is cleared; the caller must render
/// before starting resolution.
pub fn submit(session: &mut Session) -> SubmitOutcome {
    let trimmed = session.input().trim().to_string();
    if trimmed.is_empty() {
        return SubmitOutcome::Empty;
    }
    if session.has_pending() {
        return SubmitOutcome::Busy;
    }

    session.push(Turn::user(trimmed));
    session.push(Turn::bot_pending());
    session.clear_input();
    SubmitOutcome::Submitted
}

/// Detect an unresolved placeholder.
///
/// Returns `Some` only while the last turn is pending. Detection is
/// content-based, so a resolved placeholder can never match again and the
/// pipeline runs at most once per placeholder.
pub fn pending_query(session: &Session) -> Option<PendingQuery> {
    let question = session.pending_question()?;
    Some(PendingQuery {
        question: question.to_string(),
        language: session.language(),
    })
}

/// Run the full pipeline for a pending query.
///
/// Translates the question to English, retrieves an answer, and translates
/// the answer back into the session language.
pub fn run_pipeline<P: QueryPipeline>(
    pipeline: &P,
    query: &PendingQuery,
) -> Result<String, PipelineError> {
    let english_query = pipeline.translate_to_english(&query.question, query.language)?;
    let result = pipeline.answer(&english_query)?;
    pipeline.translate_from_english(&result.answer, query.language)
}

/// Commit a pipeline result, replacing the pending turn in place.
///
/// A failed pipeline run is converted into a finalized turn carrying
/// `fallback_reply`, so the placeholder never stays pending. Returns
/// whether the answer or the fallback was committed.
pub fn commit_reply(
    session: &mut Session,
    result: Result<String, PipelineError>,
    fallback_reply: &str,
) -> Resolution {
    let (reply, resolution) = match result {
        Ok(answer) => (answer, Resolution::Answered),
        Err(e) => {
            tracing::warn!(error = %e, "pipeline failed, committing fallback reply");
            (fallback_reply.to_string(), Resolution::Recovered)
        }
    };

    if let Err(e) = session.replace_last(Turn::bot(reply)) {
        // Caller bug: resolution without a pending turn. Abort the commit;
        // this never reaches the user.
        tracing::warn!(error = %e, "dropping reply");
        return Resolution::Idle;
    }
    resolution
}

/// Resolution phase for synchronous hosts: detect, run, and commit in one
/// call. Hosts with an event loop use the individual steps instead so the
/// pipeline call can run off-thread.
pub fn resolve_pending<P: QueryPipeline>(
    session: &mut Session,
    pipeline: &P,
    fallback_reply: &str,
) -> Resolution {
    let Some(query) = pending_query(session) else {
        return Resolution::Idle;
    };
    let result = run_pipeline(pipeline, &query);
    commit_reply(session, result, fallback_reply)
}
