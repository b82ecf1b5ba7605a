//! askdesk-tui: Terminal UI for the askdesk support assistant
//!
//! This crate provides the TUI layer for askdesk, including:
//! - The chat view (transcript, typing indicator, input line)
//! - Sidebar with language selection and campus news
//! - Help and quit-confirm overlays
//!
//! The event loop drives the two-phase turn protocol: a submission is
//! drawn (question + typing indicator) before the pipeline call starts on
//! a blocking task, and the result is committed on a later pass.

mod app;
mod event;
pub mod ui;

pub use app::{App, Overlay};
pub use event::{Action, Event, EventHandler};
pub use askdesk_engine;

use askdesk_engine::{CommandPipeline, Config, PipelineError};
use crossterm::{
    cursor::Show as ShowCursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use std::path::Path;
use std::sync::Arc;

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen, ShowCursor);
    }
}

/// Run the TUI application.
///
/// This is the main entry point for the TUI. It sets up the terminal,
/// runs the event loop, and restores the terminal on exit.
pub async fn run_tui(
    data_dir: &Path,
    config: &Config,
    pipeline: CommandPipeline,
) -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal with RAII guard for cleanup
    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(data_dir.to_path_buf(), config);

    // Create event handler (4 Hz tick rate = 250ms)
    let mut events = EventHandler::new(250);

    let result = run_loop(&mut terminal, &mut app, &mut events, Arc::new(pipeline)).await;

    // Restore cursor before guard drops
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
    pipeline: Arc<CommandPipeline>,
) -> Result<(), Box<dyn std::error::Error>> {
    // In-flight pipeline call for the current placeholder, if any.
    let mut reply_handle: Option<tokio::task::JoinHandle<Result<String, PipelineError>>> = None;

    loop {
        // Draw
        terminal.draw(|frame| ui::draw(app, frame))?;

        // The placeholder has now been drawn; only after that may the
        // blocking pipeline call for it start.
        if reply_handle.is_none() {
            if let Some(query) = app.begin_resolution() {
                let pipeline = Arc::clone(&pipeline);
                reply_handle = Some(tokio::task::spawn_blocking(move || {
                    askdesk_engine::run_pipeline(pipeline.as_ref(), &query)
                }));
            }
        }

        // Commit a finished pipeline call (non-blocking check)
        if reply_handle.as_ref().is_some_and(tokio::task::JoinHandle::is_finished) {
            if let Some(handle) = reply_handle.take() {
                match handle.await {
                    Ok(result) => app.finish_resolution(result),
                    Err(e) => app.finish_resolution(Err(PipelineError::Io(
                        io::Error::other(e.to_string()),
                    ))),
                }
            }
        }

        // Handle events
        if let Some(event) = events.next().await {
            match event {
                Event::Key(key) => {
                    if app.overlay == Overlay::None && handle_chat_key(app, key) {
                        continue; // Key was consumed by the chat input
                    }
                    let action = event::key_to_action(key);
                    app.handle_action(action);
                }
                Event::Mouse(mouse) => {
                    use crossterm::event::MouseEventKind;
                    match mouse.kind {
                        MouseEventKind::ScrollUp => {
                            app.handle_action(Action::Up);
                        }
                        MouseEventKind::ScrollDown => {
                            app.handle_action(Action::Down);
                        }
                        _ => {}
                    }
                }
                Event::Tick => {
                    app.tick();
                }
                Event::Resize(_, _) => {
                    // Terminal will handle resize automatically
                }
            }
        }

        if app.should_quit {
            if let Some(handle) = reply_handle {
                handle.abort();
            }
            break;
        }
    }

    Ok(())
}

/// Handle key input for the chat input line.
/// Returns true if the key was consumed (should not be treated as an action).
fn handle_chat_key(app: &mut App, key: crossterm::event::KeyEvent) -> bool {
    use crossterm::event::{KeyCode, KeyModifiers};

    // Ctrl combinations are actions
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return false;
    }

    // While an answer is pending the input is disabled: swallow typing so
    // a second question cannot be queued behind the placeholder.
    if app.session.has_pending() {
        return matches!(
            key.code,
            KeyCode::Char(_) | KeyCode::Enter | KeyCode::Backspace | KeyCode::Delete
        );
    }

    match key.code {
        // Keys that route to actions
        KeyCode::Esc | KeyCode::Tab | KeyCode::F(_) | KeyCode::Up | KeyCode::Down => false,

        KeyCode::Enter => {
            app.send_message();
            true
        }

        // Text editing
        KeyCode::Char(c) => {
            app.input_state.insert(c);
            true
        }
        KeyCode::Backspace => {
            app.input_state.backspace();
            true
        }
        KeyCode::Delete => {
            app.input_state.delete();
            true
        }
        KeyCode::Left => {
            app.input_state.move_left();
            true
        }
        KeyCode::Right => {
            app.input_state.move_right();
            true
        }
        KeyCode::Home => {
            app.input_state.move_home();
            true
        }
        KeyCode::End => {
            app.input_state.move_end();
            true
        }

        _ => false,
    }
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn test_app() -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let app = App::new(
            dir.path().to_path_buf(),
            &askdesk_engine::Config::default(),
        );
        (app, dir)
    }

    #[test]
    fn test_tui_version() {
        let version = tui_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }

    #[test]
    fn test_typing_reaches_the_input() {
        let (mut app, _dir) = test_app();
        for ch in "hi".chars() {
            assert!(handle_chat_key(&mut app, key(KeyCode::Char(ch))));
        }
        assert_eq!(app.input_state.content(), "hi");
    }

    #[test]
    fn test_enter_submits_and_input_locks_while_pending() {
        let (mut app, _dir) = test_app();
        for ch in "fees?".chars() {
            handle_chat_key(&mut app, key(KeyCode::Char(ch)));
        }
        assert!(handle_chat_key(&mut app, key(KeyCode::Enter)));
        assert_eq!(app.session.turns().len(), 2);
        assert!(app.session.has_pending());

        // Typing while pending is swallowed, not buffered.
        assert!(handle_chat_key(&mut app, key(KeyCode::Char('x'))));
        assert!(app.input_state.is_empty());

        // Enter while pending cannot queue a second placeholder.
        assert!(handle_chat_key(&mut app, key(KeyCode::Enter)));
        assert_eq!(app.session.turns().len(), 2);
    }

    #[test]
    fn test_action_keys_are_not_consumed_by_input() {
        let (mut app, _dir) = test_app();
        assert!(!handle_chat_key(&mut app, key(KeyCode::Esc)));
        assert!(!handle_chat_key(&mut app, key(KeyCode::Tab)));
        assert!(!handle_chat_key(&mut app, key(KeyCode::Up)));
    }
}
