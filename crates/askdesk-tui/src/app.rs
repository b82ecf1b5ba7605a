//! Application state and update logic for the askdesk TUI.

use crate::event::Action;
use crate::ui::input::InputState;
use askdesk_engine::{
    commit_reply, pending_query, submit, Config, PendingQuery, PipelineError, Resolution, Session,
    SubmitOutcome,
};
use std::path::PathBuf;

/// Modal overlay currently displayed, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overlay {
    #[default]
    None,
    Help,
    QuitConfirm,
}

/// Application state.
#[derive(Debug)]
pub struct App {
    /// Whether the app should quit.
    pub should_quit: bool,

    /// Current modal overlay.
    pub overlay: Overlay,

    /// The chat session.
    pub session: Session,

    /// Editing state for the chat input.
    pub input_state: InputState,

    /// Whether a pipeline call is in flight for the pending turn.
    pub resolving: bool,

    /// Scroll offset for the transcript pane.
    pub transcript_scroll: usize,

    /// Tick counter for animations.
    pub tick: usize,

    /// Notification message (displayed temporarily in the status bar).
    pub notification: Option<String>,

    /// Ticks remaining until the notification is cleared.
    notification_ttl: usize,

    /// Reply committed when the pipeline fails.
    error_reply: String,

    /// Data directory (sessions, exports).
    data_dir: PathBuf,
}

impl App {
    /// Create a new app instance.
    pub fn new(data_dir: PathBuf, config: &Config) -> Self {
        let mut session = Session::new();
        session.set_language(config.default_language);

        Self {
            should_quit: false,
            overlay: Overlay::None,
            session,
            input_state: InputState::new(),
            resolving: false,
            transcript_scroll: 0,
            tick: 0,
            notification: None,
            notification_ttl: 0,
            error_reply: config.error_reply.clone(),
            data_dir,
        }
    }

    /// Handle an action.
    pub fn handle_action(&mut self, action: Action) {
        match self.overlay {
            Overlay::Help => {
                // Any action closes help.
                self.overlay = Overlay::None;
            }
            Overlay::QuitConfirm => match action {
                Action::Select | Action::Quit => {
                    self.save_session();
                    self.should_quit = true;
                }
                _ => self.overlay = Overlay::None,
            },
            Overlay::None => self.handle_chat_action(action),
        }
    }

    fn handle_chat_action(&mut self, action: Action) {
        match action {
            Action::Quit | Action::Back => {
                self.overlay = Overlay::QuitConfirm;
            }
            Action::Help => {
                self.overlay = Overlay::Help;
            }
            Action::Select => {
                self.send_message();
            }
            Action::Up => {
                if self.transcript_scroll > 0 {
                    self.transcript_scroll -= 1;
                }
            }
            Action::Down => {
                self.transcript_scroll += 1;
            }
            Action::CycleLanguage => {
                let next = self.session.language().next();
                self.session.set_language(next);
                self.set_notification(format!("Language: {}", next.name()));
            }
            Action::ClearChat => {
                self.clear_chat();
            }
            Action::Export => {
                self.export_transcript();
            }
            Action::CopyAnswer => {
                self.copy_last_answer();
            }
            Action::None => {}
        }
    }

    /// Submission phase: commit the typed text as a question.
    ///
    /// While an answer is pending, input is rejected and the typed text is
    /// kept so the user does not lose it.
    pub fn send_message(&mut self) -> SubmitOutcome {
        if self.session.has_pending() {
            self.set_notification("Still thinking about your last question...".to_string());
            return SubmitOutcome::Busy;
        }

        self.session.set_input(self.input_state.submit());
        let outcome = submit(&mut self.session);
        if outcome == SubmitOutcome::Submitted {
            self.scroll_to_bottom();
        }
        outcome
    }

    /// Start the resolution phase for an unresolved placeholder.
    ///
    /// Returns the query to run at most once per placeholder: `None` while
    /// a call is already in flight or nothing is pending.
    pub fn begin_resolution(&mut self) -> Option<PendingQuery> {
        if self.resolving {
            return None;
        }
        let query = pending_query(&self.session)?;
        self.resolving = true;
        Some(query)
    }

    /// Commit a finished pipeline call, replacing the placeholder in place.
    pub fn finish_resolution(&mut self, result: Result<String, PipelineError>) {
        let resolution = commit_reply(&mut self.session, result, &self.error_reply);
        if resolution == Resolution::Recovered {
            self.set_notification("The answer pipeline had a problem".to_string());
        }
        self.resolving = false;
        self.save_session();
        self.scroll_to_bottom();
    }

    /// Clear the whole chat: history, input, scroll. All-or-nothing.
    pub fn clear_chat(&mut self) {
        self.session.reset();
        self.input_state.clear();
        self.transcript_scroll = 0;
        self.set_notification("Chat cleared".to_string());
    }

    /// Scroll the transcript so the latest turn is visible.
    ///
    /// Sets a high offset; the widget clamps it to the content.
    fn scroll_to_bottom(&mut self) {
        self.transcript_scroll = self.session.turns().len() * 4;
    }

    /// Set a temporary notification message.
    pub fn set_notification(&mut self, msg: String) {
        self.notification = Some(msg);
        // ~3 seconds at the 250ms tick rate
        self.notification_ttl = 12;
    }

    /// Increment the tick counter and age the notification.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);

        if self.notification_ttl > 0 {
            self.notification_ttl -= 1;
            if self.notification_ttl == 0 {
                self.notification = None;
            }
        }
    }

    /// Save the session under the data directory. Best-effort.
    pub fn save_session(&self) {
        if self.session.turns().is_empty() {
            return;
        }
        let _ = self.session.save(&self.data_dir.join("sessions"));
    }

    /// Export the transcript to a markdown file.
    fn export_transcript(&mut self) {
        use askdesk_engine::Sender;

        let mut content = String::new();
        content.push_str("# askdesk transcript\n\n");
        content.push_str(&format!("Session: {}\n", self.session.id));
        content.push_str(&format!(
            "Exported: {}\n\n---\n\n",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        ));

        for turn in self.session.turns() {
            let who = match turn.sender {
                Sender::User => "**You**",
                Sender::Bot => "**askdesk**",
            };
            let text = turn.body.text().unwrap_or("_(thinking)_");
            content.push_str(&format!("### {who}\n\n{text}\n\n"));
        }

        let export_path = self.data_dir.join("transcript-export.md");
        let write_result = std::fs::create_dir_all(&self.data_dir)
            .and_then(|()| std::fs::write(&export_path, &content));
        match write_result {
            Ok(()) => {
                self.set_notification(format!("Exported to {}", export_path.display()));
            }
            Err(e) => {
                self.set_notification(format!("Export failed: {e}"));
            }
        }
    }

    /// Copy the most recent answer to the system clipboard.
    fn copy_last_answer(&mut self) {
        let Some(answer) = self.session.last_answer().map(ToString::to_string) else {
            self.set_notification("No answer to copy yet".to_string());
            return;
        };

        match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(answer)) {
            Ok(()) => self.set_notification("Answer copied".to_string()),
            Err(e) => self.set_notification(format!("Copy failed: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askdesk_engine::Language;

    fn test_app() -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let app = App::new(dir.path().to_path_buf(), &Config::default());
        (app, dir)
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.input_state.insert(ch);
        }
    }

    #[test]
    fn test_send_message_two_phase_commit() {
        let (mut app, _dir) = test_app();
        type_text(&mut app, "What are the fees?");

        assert_eq!(app.send_message(), SubmitOutcome::Submitted);
        let turns = app.session.turns();
        assert_eq!(turns.len(), 2);
        assert!(turns[1].is_pending());
        assert!(app.input_state.is_empty());
    }

    #[test]
    fn test_send_rejected_while_pending_keeps_typed_text() {
        let (mut app, _dir) = test_app();
        type_text(&mut app, "first");
        app.send_message();

        type_text(&mut app, "second");
        assert_eq!(app.send_message(), SubmitOutcome::Busy);
        assert_eq!(app.input_state.content(), "second");
        assert_eq!(app.session.turns().len(), 2);
    }

    #[test]
    fn test_begin_resolution_yields_query_once() {
        let (mut app, _dir) = test_app();
        type_text(&mut app, "Question?");
        app.send_message();

        let query = app.begin_resolution().unwrap();
        assert_eq!(query.question, "Question?");
        // In flight: a second render pass must not start another call.
        assert!(app.begin_resolution().is_none());

        app.finish_resolution(Ok("The answer.".to_string()));
        assert!(!app.resolving);
        assert_eq!(app.session.last_answer(), Some("The answer."));
        // Resolved: nothing pending on later passes.
        assert!(app.begin_resolution().is_none());
    }

    #[test]
    fn test_finish_resolution_with_error_commits_fallback() {
        let (mut app, _dir) = test_app();
        type_text(&mut app, "Question?");
        app.send_message();
        app.begin_resolution().unwrap();

        app.finish_resolution(Err(PipelineError::Timeout("retrieval".into())));
        assert!(!app.session.has_pending());
        assert_eq!(
            app.session.last_answer(),
            Some(Config::default().error_reply.as_str())
        );
    }

    #[test]
    fn test_clear_chat_resets_everything() {
        let (mut app, _dir) = test_app();
        type_text(&mut app, "Question?");
        app.send_message();
        app.finish_resolution(Ok("Answer".to_string()));
        type_text(&mut app, "next");

        app.handle_action(Action::ClearChat);
        assert!(app.session.turns().is_empty());
        assert!(app.input_state.is_empty());
        assert_eq!(app.transcript_scroll, 0);
    }

    #[test]
    fn test_cycle_language() {
        let (mut app, _dir) = test_app();
        assert_eq!(app.session.language(), Language::English);
        app.handle_action(Action::CycleLanguage);
        assert_eq!(app.session.language(), Language::French);
        app.handle_action(Action::CycleLanguage);
        assert_eq!(app.session.language(), Language::Spanish);
    }

    #[test]
    fn test_quit_flow_needs_confirmation() {
        let (mut app, _dir) = test_app();
        app.handle_action(Action::Back);
        assert_eq!(app.overlay, Overlay::QuitConfirm);
        assert!(!app.should_quit);

        app.handle_action(Action::Back);
        assert_eq!(app.overlay, Overlay::None);
        assert!(!app.should_quit);

        app.handle_action(Action::Quit);
        app.handle_action(Action::Select);
        assert!(app.should_quit);
    }

    #[test]
    fn test_help_overlay_closes_on_any_action() {
        let (mut app, _dir) = test_app();
        app.handle_action(Action::Help);
        assert_eq!(app.overlay, Overlay::Help);

        app.handle_action(Action::Down);
        assert_eq!(app.overlay, Overlay::None);
    }

    #[test]
    fn test_notification_expires_after_ttl() {
        let (mut app, _dir) = test_app();
        app.set_notification("hello".to_string());
        assert!(app.notification.is_some());

        for _ in 0..12 {
            app.tick();
        }
        assert!(app.notification.is_none());
    }

    #[test]
    fn test_session_saved_after_resolution() {
        let (mut app, dir) = test_app();
        type_text(&mut app, "Question?");
        app.send_message();
        app.begin_resolution().unwrap();
        app.finish_resolution(Ok("Answer".to_string()));

        let ids = Session::list(&dir.path().join("sessions")).unwrap();
        assert_eq!(ids, vec![app.session.id.clone()]);
    }
}
