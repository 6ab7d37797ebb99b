//! Root application component
//!
//! The App struct implements the Component trait, acting as the root component
//! that delegates event handling and rendering to child components.
//! Compile and example loading live in the services; App wires their results
//! into the surfaces, the history and the status line.

use crate::action::Action;
use crate::component::Component;
use crate::components::{
    calculate_main_layout, render_help_bar, render_status_bar, EditorComponent,
    ExampleListComponent, HelpDialog, HistoryDialog, QuitDialog, ResultPanel, StatusContext,
};
use crate::config::Config;
use crate::model::modal::{Modal, ModalStack};
use crate::model::ui::Focus;
use crate::model::{
    CompileHistory, CompileHistoryEntry, CompileOutcome, CompileResponse, RenderMode, Surfaces,
};
use crate::services::{
    on_example_selected, CompileOrchestrator, CompileTransport, ExampleLoader, HttpTransport,
    Resolution, ResolutionPolicy,
};
use anyhow::Result;
use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{layout::Rect, Frame};
use std::sync::Arc;

/// Main application state - coordinates between components
pub struct App {
    pub config: Config,

    /// Source text, result surfaces and example options
    pub surfaces: Surfaces,

    pub orchestrator: CompileOrchestrator,
    pub loader: ExampleLoader,
    pub history: CompileHistory,

    /// Modal overlay stack
    pub modals: ModalStack,

    /// Panel receiving keyboard input
    pub focus: Focus,

    pub render_mode: RenderMode,

    /// Flag to indicate the app should quit
    pub should_quit: bool,

    /// Error message to display
    pub error: Option<String>,

    /// Status message to display
    pub status_message: Option<String>,

    /// When the display state last changed
    pub last_resolved_at: Option<DateTime<Local>>,

    // ─────────────────────────────────────────────────────────────────────────
    // Child Components
    // ─────────────────────────────────────────────────────────────────────────
    pub editor: EditorComponent,
    pub example_list: ExampleListComponent,
    pub result_panel: ResultPanel,
    pub quit_dialog: QuitDialog,
    pub help_dialog: HelpDialog,
    pub history_dialog: HistoryDialog,
}

impl App {
    /// Create the app against the configured compile service
    pub fn new(config: Config) -> Result<App> {
        let transport = HttpTransport::new(&config.endpoint_base, config.timeout())?;
        tracing::info!(url = transport.compile_url(), "compile endpoint");
        let loader = ExampleLoader::start(config.examples_source());
        Ok(Self::with_parts(config, Arc::new(transport), loader))
    }

    pub fn with_parts(
        config: Config,
        transport: Arc<dyn CompileTransport>,
        loader: ExampleLoader,
    ) -> App {
        tracing::info!(
            endpoint = %config.endpoint_base,
            policy = config.policy.name(),
            render_mode = config.render_mode.name(),
            "starting playground"
        );
        App {
            orchestrator: CompileOrchestrator::new(transport, config.policy),
            render_mode: config.render_mode,
            config,
            surfaces: Surfaces::new(),
            loader,
            history: CompileHistory::new(),
            modals: ModalStack::new(),
            focus: Focus::default(),
            should_quit: false,
            error: None,
            status_message: None,
            last_resolved_at: None,
            editor: EditorComponent::new(),
            example_list: ExampleListComponent::new(),
            result_panel: ResultPanel::new(),
            quit_dialog: QuitDialog::default(),
            help_dialog: HelpDialog::default(),
            history_dialog: HistoryDialog::default(),
        }
    }

    /// Drain finished background work into the surfaces
    fn poll_services(&mut self) {
        if self.loader.poll(&mut self.surfaces) && self.example_list.selected().is_none() {
            self.example_list.next(self.surfaces.examples.len());
        }

        for resolution in self.orchestrator.poll(&mut self.surfaces) {
            self.record_resolution(resolution);
        }
    }

    fn record_resolution(&mut self, resolution: Resolution) {
        let Resolution {
            id,
            outcome,
            elapsed,
            applied,
        } = resolution;

        let (outcome, summary) = match &outcome {
            Ok(_) if !applied => (
                CompileOutcome::Superseded,
                "Superseded by a newer request".to_string(),
            ),
            Ok(CompileResponse::Success { output }) => (CompileOutcome::Output, first_line(output)),
            Ok(CompileResponse::Failure { detail }) => (CompileOutcome::Error, first_line(detail)),
            Err(err) => (CompileOutcome::Failed, err.to_string()),
        };

        match outcome {
            CompileOutcome::Output | CompileOutcome::Error => {
                self.error = None;
                self.status_message = Some(format!(
                    "Compile {} finished in {}ms",
                    id,
                    elapsed.as_millis()
                ));
                self.last_resolved_at = Some(Local::now());
                self.result_panel.reset_scroll();
            }
            CompileOutcome::Failed => {
                self.error = Some(format!("Compile {} failed: {}", id, summary));
            }
            CompileOutcome::Superseded => {}
        }

        self.history.record(CompileHistoryEntry {
            timestamp: Local::now(),
            request: id,
            outcome,
            summary,
            duration_secs: elapsed.as_secs_f64(),
        });
    }

    fn handle_global_key_event(&self, key: KeyEvent) -> Option<Action> {
        let ctrl = is_ctrl(key);
        let action = match key.code {
            KeyCode::Char('c') if ctrl => Action::ForceQuit,
            KeyCode::Char('q') if ctrl => Action::OpenQuitDialog,
            KeyCode::Char('r') if ctrl => Action::Compile,
            KeyCode::Char('x') if ctrl => Action::CancelCompiles,
            KeyCode::Char('s') if ctrl => Action::SaveConfig,
            KeyCode::Up if ctrl => Action::ScrollUp,
            KeyCode::Down if ctrl => Action::ScrollDown,
            KeyCode::F(5) => Action::Compile,
            KeyCode::F(1) => Action::OpenHelp,
            KeyCode::F(2) => Action::ToggleRenderMode,
            KeyCode::F(3) => Action::OpenHistory,
            KeyCode::F(4) => Action::TogglePolicy,
            KeyCode::Tab => Action::FocusNext,
            KeyCode::PageUp => Action::PageUp,
            KeyCode::PageDown => Action::PageDown,
            _ => return None,
        };
        Some(action)
    }

    fn handle_modal_key_event(&mut self, modal: Modal, key: KeyEvent) -> Result<Option<Action>> {
        match modal {
            Modal::QuitConfirm => self.quit_dialog.handle_key_event(key),
            Modal::Help => self.help_dialog.handle_key_event(key),
            Modal::History => self.history_dialog.handle_key_event(key),
        }
    }

    fn draw_modal(&mut self, frame: &mut Frame, area: Rect, modal: Modal) -> Result<()> {
        match modal {
            Modal::QuitConfirm => self.quit_dialog.draw(frame, area),
            Modal::Help => self.help_dialog.draw(frame, area),
            Modal::History => {
                self.history_dialog
                    .draw_with_history(frame, area, self.history.entries())
            }
        }
    }

    /// Insert pasted text at the editor cursor
    pub fn paste(&mut self, text: &str) {
        if !self.modals.is_empty() || self.focus != Focus::Editor {
            return;
        }
        for c in text.chars().filter(|c| *c != '\r') {
            let action = match c {
                '\n' => Action::InsertNewline,
                c => Action::InsertChar(c),
            };
            self.editor.apply(&action, &mut self.surfaces.source);
        }
    }

    fn save_config(&mut self) {
        self.config.policy = self.orchestrator.policy();
        self.config.render_mode = self.render_mode;
        match self.config.save() {
            Ok(()) => {
                tracing::info!("config saved");
                self.error = None;
                self.status_message = Some("Settings saved".to_string());
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to save config");
                self.error = Some(format!("Failed to save settings: {}", e));
            }
        }
    }
}

/// Ctrl without Alt; Ctrl+Alt is how AltGr arrives on some platforms
fn is_ctrl(key: KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && !key.modifiers.contains(KeyModifiers::ALT)
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or_default().to_string()
}

impl Component for App {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if is_ctrl(key) && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::ForceQuit));
        }

        if let Some(modal) = self.modals.top() {
            return self.handle_modal_key_event(modal, key);
        }

        if let Some(action) = self.handle_global_key_event(key) {
            return Ok(Some(action));
        }

        match self.focus {
            Focus::Editor => self.editor.handle_key_event(key),
            Focus::Examples => self.example_list.handle_key_event(key),
        }
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        if action != Action::Tick {
            tracing::trace!(%action, "update");
        }

        match action {
            // ─────────────────────────────────────────────────────────────────
            // App Lifecycle
            // ─────────────────────────────────────────────────────────────────
            Action::Tick => self.poll_services(),
            Action::ForceQuit => {
                self.should_quit = true;
            }
            Action::Resize(_, _) => {}

            // ─────────────────────────────────────────────────────────────────
            // Compile
            // ─────────────────────────────────────────────────────────────────
            Action::Compile => {
                let ticket = self.orchestrator.submit(&self.surfaces.source);
                self.error = None;
                self.status_message = Some(format!("Compile {} sent", ticket.id));
            }
            Action::CancelCompiles => {
                let cancelled = self.orchestrator.cancel_all();
                self.status_message = Some(match cancelled {
                    0 => "Nothing to cancel".to_string(),
                    n => format!("Cancelled {} compile(s)", n),
                });
            }
            Action::ToggleRenderMode => {
                self.render_mode = self.render_mode.toggle();
                self.status_message = Some(format!("Rendering: {}", self.render_mode.name()));
            }
            Action::TogglePolicy => {
                let policy = match self.orchestrator.policy() {
                    ResolutionPolicy::LastResponseWins => ResolutionPolicy::LatestRequestWins,
                    ResolutionPolicy::LatestRequestWins => ResolutionPolicy::LastResponseWins,
                };
                self.orchestrator.set_policy(policy);
                self.status_message = Some(format!("Policy: {}", policy.name()));
            }
            Action::SaveConfig => self.save_config(),

            // ─────────────────────────────────────────────────────────────────
            // Focus & Scrolling
            // ─────────────────────────────────────────────────────────────────
            Action::FocusNext => {
                self.focus = self.focus.next();
            }
            Action::ScrollUp | Action::ScrollDown | Action::PageUp | Action::PageDown => {
                self.result_panel.update(action)?;
            }

            // ─────────────────────────────────────────────────────────────────
            // Examples
            // ─────────────────────────────────────────────────────────────────
            Action::NextExample => self.example_list.next(self.surfaces.examples.len()),
            Action::PrevExample => self.example_list.previous(self.surfaces.examples.len()),
            Action::SelectExample => {
                let index = self.example_list.selected().unwrap_or(0);
                if let Some(entry) = self.surfaces.examples.get(index).cloned() {
                    on_example_selected(&mut self.surfaces, &entry);
                    self.editor.move_to_end(&self.surfaces.source);
                    self.focus = Focus::Editor;
                    self.status_message = Some(format!("Loaded example '{}'", entry.label));
                }
            }

            // ─────────────────────────────────────────────────────────────────
            // Editor
            // ─────────────────────────────────────────────────────────────────
            Action::InsertChar(_)
            | Action::InsertNewline
            | Action::Backspace
            | Action::Delete
            | Action::CursorLeft
            | Action::CursorRight
            | Action::CursorUp
            | Action::CursorDown
            | Action::CursorHome
            | Action::CursorEnd => {
                self.editor.apply(&action, &mut self.surfaces.source);
            }

            // ─────────────────────────────────────────────────────────────────
            // Modals
            // ─────────────────────────────────────────────────────────────────
            Action::OpenQuitDialog => {
                self.quit_dialog.pending_compiles = self.orchestrator.in_flight();
                self.modals.push(Modal::QuitConfirm);
            }
            Action::OpenHelp => {
                self.help_dialog.scroll_offset = 0;
                self.modals.toggle(Modal::Help);
            }
            Action::OpenHistory => {
                self.history_dialog.selected_index = 0;
                self.modals.toggle(Modal::History);
            }
            Action::CloseModal => {
                self.modals.pop();
            }
            Action::ConfirmModal => {
                if self.modals.pop() == Some(Modal::QuitConfirm) {
                    return Ok(Some(Action::ForceQuit));
                }
            }
        }

        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let layout = calculate_main_layout(area);
        let modal_open = !self.modals.is_empty();

        self.example_list.draw_with_entries(
            frame,
            layout.examples,
            &self.surfaces.examples,
            self.loader.state(),
            self.focus == Focus::Examples && !modal_open,
        )?;
        self.editor.draw_with_source(
            frame,
            layout.editor,
            &self.surfaces.source,
            self.focus == Focus::Editor && !modal_open,
        )?;
        self.result_panel.draw_with_state(
            frame,
            layout.result,
            &self.surfaces.display,
            self.render_mode,
        )?;

        let ctx = StatusContext {
            endpoint: &self.config.endpoint_base,
            in_flight: self.orchestrator.in_flight(),
            policy: self.orchestrator.policy(),
            render_mode: self.render_mode,
            examples: self.loader.state(),
            last_resolved_at: self.last_resolved_at,
            error: self.error.as_deref(),
            status_message: self.status_message.as_deref(),
        };
        render_status_bar(frame, layout.status, &ctx);
        render_help_bar(frame, layout.help, self.focus);

        // Draw modal overlay if active
        if let Some(modal) = self.modals.top() {
            self.draw_modal(frame, area, modal)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoaderError;
    use crate::model::{DisplayState, ExampleEntry};
    use crate::services::orchestrator::tests::{err_body, ok_body, FixedTransport, GatedTransport};
    use std::time::{Duration, Instant};

    fn app_with(transport: impl CompileTransport, examples: Vec<ExampleEntry>) -> App {
        let loader = ExampleLoader::start_with(move || Ok(examples));
        App::with_parts(Config::default(), Arc::new(transport), loader)
    }

    fn dataset() -> Vec<ExampleEntry> {
        vec![
            ExampleEntry::new("None", ""),
            ExampleEntry::new("Hello", "print(\"hi\")"),
        ]
    }

    /// Tick until nothing is in flight and the examples are in
    fn settle(app: &mut App) {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            app.update(Action::Tick).unwrap();
            let loading = app.loader.state() == crate::services::LoadState::Loading;
            if (app.orchestrator.in_flight() == 0 && !loading) || Instant::now() > deadline {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn press(app: &mut App, event: KeyEvent) {
        let mut action = app.handle_key_event(event).unwrap();
        while let Some(a) = action {
            action = app.update(a).unwrap();
        }
    }

    #[test]
    fn test_compile_shows_output_and_records_history() {
        let mut app = app_with(FixedTransport(Ok(ok_body("mov r0, #1"))), Vec::new());
        press(&mut app, key(KeyCode::Char('x')));
        press(&mut app, ctrl('r'));
        settle(&mut app);

        assert_eq!(app.surfaces.display, DisplayState::Output("mov r0, #1".to_string()));
        assert_eq!(app.history.entries().len(), 1);
        assert_eq!(app.history.entries()[0].outcome, CompileOutcome::Output);
        assert!(app.last_resolved_at.is_some());
        assert!(app.error.is_none());
    }

    #[test]
    fn test_compile_error_enters_error_visible() {
        let mut app = app_with(FixedTransport(Ok(err_body("Unexpected token"))), Vec::new());
        press(&mut app, key(KeyCode::F(5)));
        settle(&mut app);

        assert_eq!(app.surfaces.display, DisplayState::Error("Unexpected token".to_string()));
        assert_eq!(app.history.entries()[0].outcome, CompileOutcome::Error);
        assert_eq!(app.history.entries()[0].summary, "Unexpected token");
    }

    #[test]
    fn test_http_failure_reports_without_touching_display() {
        let mut app = app_with(FixedTransport(Err(503)), Vec::new());
        press(&mut app, ctrl('r'));
        settle(&mut app);

        assert_eq!(app.surfaces.display, DisplayState::Idle);
        assert_eq!(app.history.entries()[0].outcome, CompileOutcome::Failed);
        assert!(app.error.as_deref().is_some_and(|e| e.contains("#1")));
    }

    #[test]
    fn test_last_response_wins_through_the_app() {
        let transport = GatedTransport::default();
        let first = transport.gate("first");
        let second = transport.gate("second");
        let mut app = app_with(transport, Vec::new());

        app.surfaces.source.overwrite("first");
        app.update(Action::Compile).unwrap();
        app.surfaces.source.overwrite("second");
        app.update(Action::Compile).unwrap();
        assert_eq!(app.orchestrator.in_flight(), 2);

        second.send(ok_body("from second")).unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.orchestrator.in_flight() == 2 && Instant::now() < deadline {
            app.update(Action::Tick).unwrap();
            std::thread::sleep(Duration::from_millis(5));
        }
        first.send(ok_body("from first")).unwrap();
        settle(&mut app);

        assert_eq!(app.surfaces.display, DisplayState::Output("from first".to_string()));
        assert_eq!(app.history.entries().len(), 2);
    }

    #[test]
    fn test_selecting_example_overwrites_editor() {
        let mut app = app_with(FixedTransport(Ok(ok_body(""))), dataset());
        settle(&mut app);
        assert_eq!(app.surfaces.examples.len(), 2);
        assert_eq!(app.example_list.selected(), Some(0));

        app.surfaces.source.overwrite("old code");
        press(&mut app, key(KeyCode::Tab));
        assert_eq!(app.focus, Focus::Examples);
        press(&mut app, key(KeyCode::Down));
        press(&mut app, key(KeyCode::Enter));

        assert_eq!(app.surfaces.source.as_str(), "print(\"hi\")");
        assert_eq!(app.editor.cursor, app.surfaces.source.len());
        assert_eq!(app.focus, Focus::Editor);
    }

    #[test]
    fn test_failed_example_load_is_silent() {
        let loader = ExampleLoader::start_with(|| Err(LoaderError::Status(404)));
        let mut app = App::with_parts(
            Config::default(),
            Arc::new(FixedTransport(Ok(ok_body("")))),
            loader,
        );
        settle(&mut app);

        assert!(app.surfaces.examples.is_empty());
        assert!(app.error.is_none());
        app.update(Action::SelectExample).unwrap();
        assert_eq!(app.surfaces.source.as_str(), "");
    }

    #[test]
    fn test_toggles() {
        let mut app = app_with(FixedTransport(Ok(ok_body(""))), Vec::new());
        press(&mut app, key(KeyCode::F(2)));
        assert_eq!(app.render_mode, RenderMode::Raw);
        press(&mut app, key(KeyCode::F(4)));
        assert_eq!(app.orchestrator.policy(), ResolutionPolicy::LatestRequestWins);
    }

    #[test]
    fn test_cancel_drops_pending_response() {
        let transport = GatedTransport::default();
        let gate = transport.gate("slow");
        let mut app = app_with(transport, Vec::new());
        app.surfaces.source.overwrite("slow");

        press(&mut app, ctrl('r'));
        press(&mut app, ctrl('x'));
        assert_eq!(app.orchestrator.in_flight(), 0);

        gate.send(ok_body("late")).unwrap();
        std::thread::sleep(Duration::from_millis(50));
        app.update(Action::Tick).unwrap();
        assert_eq!(app.surfaces.display, DisplayState::Idle);
        assert!(app.history.entries().is_empty());
    }

    #[test]
    fn test_quit_dialog_flow() {
        let mut app = app_with(FixedTransport(Ok(ok_body(""))), Vec::new());
        press(&mut app, ctrl('q'));
        assert_eq!(app.modals.top(), Some(Modal::QuitConfirm));

        // Typing goes to the dialog, not the editor
        press(&mut app, key(KeyCode::Char('n')));
        assert!(app.modals.is_empty());
        assert!(!app.should_quit);
        assert_eq!(app.surfaces.source.as_str(), "");

        press(&mut app, ctrl('q'));
        press(&mut app, key(KeyCode::Char('y')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_altgr_characters_reach_the_editor() {
        let mut app = app_with(FixedTransport(Ok(ok_body(""))), Vec::new());
        let altgr = KeyModifiers::CONTROL | KeyModifiers::ALT;
        for c in ['{', '[', ']', '}'] {
            press(&mut app, KeyEvent::new(KeyCode::Char(c), altgr));
        }
        assert_eq!(app.surfaces.source.as_str(), "{[]}");
        assert!(!app.should_quit);
        assert_eq!(app.orchestrator.in_flight(), 0);
    }

    #[test]
    fn test_paste_goes_to_editor_only() {
        let mut app = app_with(FixedTransport(Ok(ok_body(""))), Vec::new());
        app.paste("a\r\nb");
        assert_eq!(app.surfaces.source.as_str(), "a\nb");

        app.update(Action::FocusNext).unwrap();
        app.paste("ignored");
        assert_eq!(app.surfaces.source.as_str(), "a\nb");
    }

    #[test]
    fn test_help_and_history_toggle() {
        let mut app = app_with(FixedTransport(Ok(ok_body(""))), Vec::new());
        press(&mut app, key(KeyCode::F(1)));
        assert_eq!(app.modals.top(), Some(Modal::Help));
        press(&mut app, key(KeyCode::F(1)));
        assert!(app.modals.is_empty());

        press(&mut app, key(KeyCode::F(3)));
        assert_eq!(app.modals.top(), Some(Modal::History));
        press(&mut app, key(KeyCode::Esc));
        assert!(app.modals.is_empty());
    }
}
