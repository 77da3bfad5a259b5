use serde::{Deserialize, Serialize};
use std::fmt;

pub const CORPUS_BUILD_FAILED: &str = "CORPUS_BUILD_FAILED";
pub const CONFIG_INVALID: &str = "CONFIG_INVALID";
pub const AI_INDEX_STALE: &str = "AI_INDEX_STALE";
pub const AI_INDEX_BUILD_FAILED: &str = "AI_INDEX_BUILD_FAILED";
pub const AI_EMBEDDING_UNAVAILABLE: &str = "AI_EMBEDDING_UNAVAILABLE";
pub const AI_GENERATION_UNAVAILABLE: &str = "AI_GENERATION_UNAVAILABLE";
pub const AI_GENERATION_TIMEOUT: &str = "AI_GENERATION_TIMEOUT";
pub const AI_GENERATION_MALFORMED: &str = "AI_GENERATION_MALFORMED";

/// Single structured error shape used across the core and AI layers.
///
/// Only `CORPUS_BUILD_FAILED` on a first-ever reload reaches callers of the engine;
/// every backend code is absorbed and surfaces as a downgraded answer method.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub retryable: bool,
}

impl AppError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(d) = self.details.as_ref() {
            write!(f, " ({d})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}
