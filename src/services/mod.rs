//! External service interactions
//!
//! - Compile endpoint transport
//! - Compile orchestration (request lifecycle and display resolution)
//! - Example dataset loading
//! - Background job execution

pub mod example_loader;
pub mod job_runner;
pub mod orchestrator;
pub mod transport;

pub use example_loader::{on_example_selected, ExampleLoader, ExampleSource, LoadState};
pub use orchestrator::{CompileOrchestrator, Resolution, ResolutionPolicy};
pub use transport::{CompileTransport, HttpTransport};
