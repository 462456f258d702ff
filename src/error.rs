//! Host-level error types.
//!
//! Tool invocation failures never surface here: they become failed
//! `ToolResult`s (see [`crate::tools::ToolError`]). This module covers the
//! errors a caller of the host itself can see.
//!
//! No external error crates (anyhow, thiserror, eyre) are used.

use crate::coordinator::CoordinatorError;
use std::fmt;

/// Errors returned by the tool host and its configuration loaders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolHostError {
    /// The specific error that occurred
    pub kind: ToolHostErrorKind,
}

/// Specific host error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolHostErrorKind {
    /// Configuration could not be read or was invalid
    Configuration {
        /// Description of what was invalid
        field: String,
        /// Why it was invalid
        reason: String,
    },
    /// A raw request did not match the request wire shape
    InvalidRequest {
        /// Why parsing failed
        reason: String,
    },
    /// The coordinator refused the request
    Rejected(CoordinatorError),
}

impl ToolHostError {
    /// Creates a new ToolHostError with the given kind.
    #[must_use]
    pub fn new(kind: ToolHostErrorKind) -> Self {
        Self { kind }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ToolHostErrorKind::Configuration {
            field: field.into(),
            reason: reason.into(),
        })
    }

    /// Creates an invalid request error.
    #[must_use]
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::new(ToolHostErrorKind::InvalidRequest {
            reason: reason.into(),
        })
    }

    /// Returns true if this error indicates a configuration problem.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self.kind, ToolHostErrorKind::Configuration { .. })
    }

    /// Returns true if a raw request could not be parsed.
    #[must_use]
    pub fn is_invalid_request(&self) -> bool {
        matches!(self.kind, ToolHostErrorKind::InvalidRequest { .. })
    }

    /// Returns the coordinator rejection, if that is what this error is.
    #[must_use]
    pub fn as_rejection(&self) -> Option<&CoordinatorError> {
        match self.kind {
            ToolHostErrorKind::Rejected(ref error) => Some(error),
            _ => None,
        }
    }
}

impl From<CoordinatorError> for ToolHostError {
    fn from(error: CoordinatorError) -> Self {
        Self::new(ToolHostErrorKind::Rejected(error))
    }
}

impl fmt::Display for ToolHostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ToolHostErrorKind::Configuration { field, reason } => {
                write!(f, "configuration error for '{}': {}", field, reason)
            }
            ToolHostErrorKind::InvalidRequest { reason } => {
                write!(f, "invalid tool request: {}", reason)
            }
            ToolHostErrorKind::Rejected(error) => {
                write!(f, "tool request rejected: {}", error)
            }
        }
    }
}

impl std::error::Error for ToolHostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ToolHostErrorKind::Rejected(error) => Some(error),
            _ => None,
        }
    }
}
