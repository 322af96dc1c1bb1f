//! Best-effort payload preprocessing
//!
//! A stage may fail or even panic; either way the payload it was given is
//! passed on unchanged and the failure is only logged.

pub mod stages;

pub use stages::{CompactJson, NormalizeWhitespace, Passthrough};

use std::{
    fmt,
    panic::{catch_unwind, AssertUnwindSafe},
    str::FromStr,
    sync::Arc,
};

use thiserror::Error;
use tracing::warn;

/// Preprocessing error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreprocessError {
    /// The stage does not apply to this payload
    #[error("{stage}: unsupported input: {reason}")]
    Unsupported { stage: &'static str, reason: String },

    /// The stage panicked
    #[error("{stage}: panicked: {message}")]
    Panicked { stage: &'static str, message: String },
}

/// A payload transform
pub trait Preprocessor: Send + Sync {
    /// Short name used in logs and configuration
    fn name(&self) -> &'static str;

    fn transform(&self, payload: &str) -> Result<String, PreprocessError>;
}

/// Run a stage, converting a panic into an error
fn run_guarded(stage: &dyn Preprocessor, payload: &str) -> Result<String, PreprocessError> {
    catch_unwind(AssertUnwindSafe(|| stage.transform(payload))).unwrap_or_else(|panic| {
        let message = panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(PreprocessError::Panicked {
            stage: stage.name(),
            message,
        })
    })
}

/// Apply a stage best-effort: any failure yields the original payload
pub fn best_effort(stage: &dyn Preprocessor, payload: &str) -> String {
    match run_guarded(stage, payload) {
        Ok(transformed) => transformed,
        Err(error) => {
            warn!(stage = stage.name(), %error, "Preprocessing failed, using original payload");
            payload.to_string()
        }
    }
}

/// Ordered stages, each applied best-effort
#[derive(Clone, Default)]
pub struct PreprocessChain {
    stages: Vec<Arc<dyn Preprocessor>>,
}

impl PreprocessChain {
    /// Chain with no stages
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage
    pub fn stage(mut self, stage: impl Preprocessor + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Run every stage in order
    ///
    /// A failing stage hands its input to the next stage unchanged.
    pub fn apply(&self, payload: &str) -> String {
        self.stages
            .iter()
            .fold(payload.to_string(), |current, stage| best_effort(stage.as_ref(), &current))
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl fmt::Debug for PreprocessChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.stage_names()).finish()
    }
}

impl FromStr for PreprocessChain {
    type Err = String;

    /// Parse a comma-separated stage list such as `compact-json,normalize-whitespace`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .try_fold(PreprocessChain::new(), |chain, name| {
                match name.to_ascii_lowercase().as_str() {
                    "none" => Ok(chain.stage(Passthrough)),
                    "compact-json" => Ok(chain.stage(CompactJson)),
                    "normalize-whitespace" => Ok(chain.stage(NormalizeWhitespace)),
                    other => Err(format!(
                        "unknown preprocessing stage '{other}', expected none, compact-json or normalize-whitespace"
                    )),
                }
            })
    }
}
