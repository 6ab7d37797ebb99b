//! Labeled code samples shown in the example selector

use serde::Deserialize;

/// A `(label, code)` pair. Serialized in the dataset as a two-element array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "(String, String)")]
pub struct ExampleEntry {
    pub label: String,
    pub code: String,
}

impl ExampleEntry {
    pub fn new(label: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            code: code.into(),
        }
    }
}

impl From<(String, String)> for ExampleEntry {
    fn from((label, code): (String, String)) -> Self {
        Self { label, code }
    }
}

/// Parse an example dataset: a JSON array of `[label, code]` pairs, order kept
pub fn parse_dataset(body: &str) -> Result<Vec<ExampleEntry>, serde_json::Error> {
    serde_json::from_str(body)
}
