//! Built-in preprocessing stages

use serde_json::Value;

use super::{PreprocessError, Preprocessor};

/// Identity stage
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Preprocessor for Passthrough {
    fn name(&self) -> &'static str {
        "none"
    }

    fn transform(&self, payload: &str) -> Result<String, PreprocessError> {
        Ok(payload.to_string())
    }
}

/// Re-serializes JSON without insignificant whitespace
///
/// Input that is not JSON is rejected, so best-effort application leaves
/// plain-text prompts untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactJson;

impl Preprocessor for CompactJson {
    fn name(&self) -> &'static str {
        "compact-json"
    }

    fn transform(&self, payload: &str) -> Result<String, PreprocessError> {
        let value: Value = serde_json::from_str(payload).map_err(|e| PreprocessError::Unsupported {
            stage: self.name(),
            reason: e.to_string(),
        })?;
        serde_json::to_string(&value).map_err(|e| PreprocessError::Unsupported {
            stage: self.name(),
            reason: e.to_string(),
        })
    }
}

/// Trims and collapses whitespace runs to a single space
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeWhitespace;

impl Preprocessor for NormalizeWhitespace {
    fn name(&self) -> &'static str {
        "normalize-whitespace"
    }

    fn transform(&self, payload: &str) -> Result<String, PreprocessError> {
        Ok(payload.split_whitespace().collect::<Vec<_>>().join(" "))
    }
}
