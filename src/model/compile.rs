//! Compile request/response data model
//!
//! The compile service answers with `{"asm": ..., "message": ...}`. The
//! `message` field is the status tag: the exact string `"Ok"` marks success,
//! anything else is a failure whose detail is that same field.

use super::source::SourceText;
use crate::error::CompileError;
use serde_json::Value;
use std::fmt;

/// Literal the status tag must equal for a response to count as success
pub const SUCCESS_MARKER: &str = "Ok";

/// Sequence number assigned to each request in issue order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single compile submission. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    id: RequestId,
    source: SourceText,
}

impl CompileRequest {
    pub fn new(id: RequestId, source: &SourceText) -> Self {
        Self {
            id,
            source: source.clone(),
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn source(&self) -> &SourceText {
        &self.source
    }
}

/// Undecoded HTTP response as handed back by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
impl RawResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }
}

/// Decoded compile response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileResponse {
    /// Status tag matched the success marker; `output` is the artifact
    Success { output: String },
    /// Any other status tag; `detail` is the server-supplied message
    Failure { detail: String },
}

impl CompileResponse {
    /// Decode a response body.
    ///
    /// Non-JSON bodies and JSON values that are not objects are rejected as
    /// malformed. A success tag without a string `asm` field is also malformed.
    pub fn decode(body: &str) -> Result<Self, CompileError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| CompileError::malformed(e.to_string(), body))?;

        let Value::Object(fields) = value else {
            return Err(CompileError::malformed("expected a JSON object", body));
        };

        match fields.get("message") {
            Some(Value::String(tag)) if tag == SUCCESS_MARKER => match fields.get("asm") {
                Some(Value::String(asm)) => Ok(CompileResponse::Success {
                    output: asm.clone(),
                }),
                _ => Err(CompileError::malformed(
                    "success response without an `asm` string",
                    body,
                )),
            },
            Some(Value::String(detail)) => Ok(CompileResponse::Failure {
                detail: detail.clone(),
            }),
            None | Some(Value::Null) => Ok(CompileResponse::Failure {
                detail: String::new(),
            }),
            Some(other) => Ok(CompileResponse::Failure {
                detail: other.to_string(),
            }),
        }
    }

    /// Decode a raw transport response.
    ///
    /// Bodies are decoded whatever the HTTP status; an undecodable body on a
    /// non-2xx status is reported as an HTTP failure instead of as malformed.
    pub fn from_raw(raw: RawResponse) -> Result<Self, CompileError> {
        match Self::decode(&raw.body) {
            Err(CompileError::MalformedResponse { .. }) if !raw.is_success() => {
                Err(CompileError::HttpStatus {
                    status: raw.status,
                    body: raw.body,
                })
            }
            other => other,
        }
    }
}
