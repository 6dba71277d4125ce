//! Structured error types shared across the PuBe shield crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`PubeError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (surface names, file paths, offsets, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the experiment pipeline.
///
/// Every family is fatal: the pipeline never recovers from an error and
/// never emits a partial report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum PubeError {
    /// Invalid experiment parameters (zero volume, bad bin edges, ...).
    #[error("configuration error: {0}")]
    Config(ErrorInfo),
    /// Placement or partition defects in the constructed geometry.
    #[error("geometry error: {0}")]
    Geometry(ErrorInfo),
    /// Invalid source distribution parameters.
    #[error("source error: {0}")]
    Source(ErrorInfo),
    /// Missing or unreadable transport engine result artefact.
    #[error("artifact error: {0}")]
    Artifact(ErrorInfo),
    /// Missing or malformed tally within a readable artefact.
    #[error("tally error: {0}")]
    Tally(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl PubeError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            PubeError::Config(info)
            | PubeError::Geometry(info)
            | PubeError::Source(info)
            | PubeError::Artifact(info)
            | PubeError::Tally(info)
            | PubeError::Serde(info) => info,
        }
    }

    /// Shorthand for the stable error code of the payload.
    pub fn code(&self) -> &str {
        &self.info().code
    }
}

/// Builds a [`PubeError::Config`] with the given code and message.
pub fn config_error(code: &str, message: impl Into<String>) -> PubeError {
    PubeError::Config(ErrorInfo::new(code, message))
}
