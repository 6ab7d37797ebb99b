//! Compile endpoint transport
//!
//! `POST <endpoint_base>/compile` with the raw source text as the body.

use crate::error::CompileError;
use crate::model::{CompileRequest, RawResponse};
use reqwest::blocking::Client;
use std::time::Duration;

/// Sends a compile request and hands back the undecoded response.
///
/// Called from worker threads, so implementations must be `Send + Sync`.
pub trait CompileTransport: Send + Sync + 'static {
    fn send(&self, request: &CompileRequest) -> Result<RawResponse, CompileError>;
}

/// HTTP transport backed by a blocking reqwest client
pub struct HttpTransport {
    client: Client,
    compile_url: String,
}

impl HttpTransport {
    /// Build a transport for `endpoint_base`. `timeout` of `None` waits forever.
    pub fn new(endpoint_base: &str, timeout: Option<Duration>) -> Result<Self, CompileError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            compile_url: compile_url(endpoint_base),
        })
    }

    pub fn compile_url(&self) -> &str {
        &self.compile_url
    }
}

impl CompileTransport for HttpTransport {
    fn send(&self, request: &CompileRequest) -> Result<RawResponse, CompileError> {
        tracing::debug!(
            request = %request.id(),
            bytes = request.source().len(),
            url = %self.compile_url,
            "sending compile request"
        );

        let response = self
            .client
            .post(&self.compile_url)
            .body(request.source().as_str().to_owned())
            .send()?;

        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(RawResponse { status, body })
    }
}

/// Join the endpoint base and the compile route
pub fn compile_url(endpoint_base: &str) -> String {
    format!("{}/compile", endpoint_base.trim_end_matches('/'))
}
