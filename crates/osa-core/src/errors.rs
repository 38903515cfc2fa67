//! Structured error types shared across the OSA calibration crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`OsaError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (measure names, paths, etc.).
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
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Adds the offending path as a `path` context entry.
    pub fn with_path(self, path: &Path) -> Self {
        self.with_context("path", path.display().to_string())
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the calibration tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum OsaError {
    /// OSW document structure errors.
    #[error("workflow error: {0}")]
    Workflow(ErrorInfo),
    /// Analysis definition errors (unknown measures, duplicate variables, ...).
    #[error("analysis error: {0}")]
    Analysis(ErrorInfo),
    /// Configuration loading errors.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Filesystem errors.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// Zip bundle errors.
    #[error("bundle error: {0}")]
    Bundle(ErrorInfo),
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

impl OsaError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            OsaError::Workflow(info)
            | OsaError::Analysis(info)
            | OsaError::Config(info)
            | OsaError::Io(info)
            | OsaError::Serde(info)
            | OsaError::Bundle(info) => info,
        }
    }

    /// Wraps a filesystem error raised while touching `path`.
    pub fn io(code: &str, path: &Path, err: impl ToString) -> Self {
        OsaError::Io(ErrorInfo::new(code, err.to_string()).with_path(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context_and_hint() {
        let err = OsaError::Analysis(
            ErrorInfo::new("measure-not-found", "unknown measure")
                .with_context("measure", "set_run_period")
                .with_hint("check the OSW steps"),
        );
        let rendered = err.to_string();
        assert!(rendered.starts_with("analysis error: unknown measure (code: measure-not-found)"));
        assert!(rendered.contains("measure=set_run_period"));
        assert!(rendered.ends_with("hint: check the OSW steps"));
        assert_eq!(err.info().code, "measure-not-found");
    }

    #[test]
    fn errors_serialize_with_family_tag() {
        let err = OsaError::io("osw-read", Path::new("in.osw"), "missing");
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["family"], "Io");
        assert_eq!(value["detail"]["context"]["path"], "in.osw");
    }
}
