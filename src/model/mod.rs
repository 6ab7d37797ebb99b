//! Model layer - UI surfaces and the data that flows into them
//!
//! - `SourceText` - the editable compilation input
//! - `CompileRequest` / `CompileResponse` - one compile round trip
//! - `ExampleEntry` - labeled sample programs
//! - `DisplayState` / `DisplayBinding` - result surfaces and how they are written
//! - `CompileHistory` - resolved compiles, newest first
//! - `ModalStack` - modal overlay management

pub mod compile;
pub mod display;
pub mod example;
pub mod history;
pub mod modal;
pub mod source;
pub mod surface;
pub mod ui;

pub use compile::{CompileRequest, CompileResponse, RawResponse, RequestId};
pub use display::{DisplayBinding, DisplayState, RenderMode};
pub use example::ExampleEntry;
pub use history::{CompileHistory, CompileHistoryEntry, CompileOutcome};
pub use source::SourceText;
pub use surface::Surfaces;
