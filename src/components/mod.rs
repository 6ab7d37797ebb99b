//! UI Components
//!
//! Each component encapsulates its own presentation state, event handling, and rendering logic.
//! Components communicate through Actions rather than direct state mutation.

pub mod editor;
pub mod example_list;
pub mod help_dialog;
pub mod history_dialog;
pub mod layout;
pub mod quit_dialog;
pub mod result_panel;
pub mod status_bar;

pub use editor::EditorComponent;
pub use example_list::ExampleListComponent;
pub use help_dialog::HelpDialog;
pub use history_dialog::HistoryDialog;
pub use layout::{calculate_main_layout, centered_popup};
pub use quit_dialog::QuitDialog;
pub use result_panel::ResultPanel;
pub use status_bar::{render_help_bar, render_status_bar, StatusContext};
