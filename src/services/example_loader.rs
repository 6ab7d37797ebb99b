//! Example dataset loading
//!
//! The dataset is fetched once on a worker thread. When it arrives its entries
//! are appended to the selector in dataset order. Any failure leaves the
//! selector empty; it is logged but never shown to the user.

use super::job_runner::JobRunner;
use crate::error::LoaderError;
use crate::model::example::parse_dataset;
use crate::model::{DisplayBinding, ExampleEntry};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Label of the blank entry that heads a directory-built dataset
pub const BLANK_EXAMPLE_LABEL: &str = "None";

/// Where the example dataset comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExampleSource {
    /// Static `examples.json` served over HTTP
    Http(String),
    /// Local `examples.json`
    File(PathBuf),
    /// Directory of sample programs, one entry per file
    Directory(PathBuf),
}

impl ExampleSource {
    /// Interpret a configured location: URLs are fetched, directories are
    /// scanned, anything else is read as a dataset file.
    pub fn parse(location: &str) -> ExampleSource {
        if location.starts_with("http://") || location.starts_with("https://") {
            return ExampleSource::Http(location.to_string());
        }
        let path = PathBuf::from(location);
        if path.is_dir() {
            ExampleSource::Directory(path)
        } else {
            ExampleSource::File(path)
        }
    }
}

/// Fetch and parse the dataset from `source`
pub fn fetch_dataset(source: &ExampleSource) -> Result<Vec<ExampleEntry>, LoaderError> {
    match source {
        ExampleSource::Http(url) => {
            let response = reqwest::blocking::get(url)?;
            if !response.status().is_success() {
                return Err(LoaderError::Status(response.status().as_u16()));
            }
            let body = response.text()?;
            Ok(parse_dataset(&body)?)
        }
        ExampleSource::File(path) => {
            let body = fs::read_to_string(path)?;
            Ok(parse_dataset(&body)?)
        }
        ExampleSource::Directory(dir) => dataset_from_dir(dir),
    }
}

/// Build a dataset from a directory of sample programs.
///
/// The first entry is a blank `("None", "")` so the selector can clear the
/// editor; the rest are one entry per regular file, sorted by file name.
pub fn dataset_from_dir(dir: &Path) -> Result<Vec<ExampleEntry>, LoaderError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    let mut entries = vec![ExampleEntry::new(BLANK_EXAMPLE_LABEL, "")];
    for path in files {
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        entries.push(ExampleEntry::new(label, fs::read_to_string(&path)?));
    }
    Ok(entries)
}

/// Copy the chosen entry's code into the source input, replacing what is there
pub fn on_example_selected(binding: &mut dyn DisplayBinding, selected: &ExampleEntry) {
    tracing::debug!(label = %selected.label, "example selected");
    binding.set_source(&selected.code);
}

/// Loading progress of the example dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Loaded(usize),
    Failed,
}

/// Runs the one-shot dataset fetch and feeds its entries to the selector
pub struct ExampleLoader {
    runner: JobRunner<(), Result<Vec<ExampleEntry>, LoaderError>>,
    state: LoadState,
}

impl ExampleLoader {
    /// Start fetching from `source` in the background
    pub fn start(source: ExampleSource) -> Self {
        tracing::info!(source = ?source, "loading examples");
        Self::start_with(move || fetch_dataset(&source))
    }

    /// Start with a custom fetch function
    pub fn start_with<F>(fetch: F) -> Self
    where
        F: FnOnce() -> Result<Vec<ExampleEntry>, LoaderError> + Send + 'static,
    {
        let mut runner = JobRunner::new();
        runner.spawn((), fetch);
        Self {
            runner,
            state: LoadState::Loading,
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Populate the selector if the fetch has finished. Returns `true` once,
    /// on the poll that completes loading.
    pub fn poll(&mut self, binding: &mut dyn DisplayBinding) -> bool {
        match self.runner.poll().pop() {
            Some(finished) => {
                self.apply(finished.value, binding);
                true
            }
            None => false,
        }
    }

    /// Block until the fetch finishes or `timeout` elapses
    pub fn wait(&mut self, binding: &mut dyn DisplayBinding, timeout: Option<Duration>) -> bool {
        match self.runner.wait(timeout) {
            Some(finished) => {
                self.apply(finished.value, binding);
                true
            }
            None => false,
        }
    }

    fn apply(
        &mut self,
        result: Option<Result<Vec<ExampleEntry>, LoaderError>>,
        binding: &mut dyn DisplayBinding,
    ) {
        match result.unwrap_or(Err(LoaderError::Disconnected)) {
            Ok(entries) => {
                let count = entries.len();
                for entry in entries {
                    binding.append_example(entry);
                }
                tracing::info!(count, "examples loaded");
                self.state = LoadState::Loaded(count);
            }
            Err(LoaderError::Status(status)) => {
                tracing::debug!(status, "example dataset unavailable");
                self.state = LoadState::Failed;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load examples");
                self.state = LoadState::Failed;
            }
        }
    }
}
