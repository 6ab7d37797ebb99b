//! Typed errors for the compile and example-loading services
//!
//! The UI layer works with `anyhow::Result`; services return these so the
//! app can tell a compiler failure apart from a broken transport.

use thiserror::Error;

/// Failures of a single compile request that never reach a display state
#[derive(Debug, Error)]
pub enum CompileError {
    /// Network-level failure (unreachable host, reset connection, timeout)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response whose body could not be decoded
    #[error("compile service returned HTTP {status}")]
    HttpStatus { status: u16, body: String },

    /// 2xx response whose body is not a compile response object
    #[error("malformed compile response: {reason}")]
    MalformedResponse { reason: String, body: String },

    /// Worker went away without reporting a result
    #[error("compile worker disconnected")]
    Disconnected,
}

impl CompileError {
    pub fn malformed(reason: impl Into<String>, body: &str) -> Self {
        CompileError::MalformedResponse {
            reason: reason.into(),
            body: body.to_string(),
        }
    }

    /// Short label for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            CompileError::Transport(_) => "transport",
            CompileError::HttpStatus { .. } => "http",
            CompileError::MalformedResponse { .. } => "malformed",
            CompileError::Disconnected => "disconnected",
        }
    }
}

/// Failures while fetching the example dataset
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The resource answered with a non-success status
    #[error("example dataset request returned HTTP {0}")]
    Status(u16),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid example dataset: {0}")]
    Parse(#[from] serde_json::Error),

    /// The fetch worker went away without reporting a result
    #[error("example worker disconnected")]
    Disconnected,
}
