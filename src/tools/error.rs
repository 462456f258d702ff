//! Tool error types.
//!
//! Every failure reachable from a single tool invocation is described by a
//! [`ToolError`]. None of them are fatal to the host: the coordinator turns
//! each one into a failed `ToolResult` for the agent to read.

use crate::types::CorrelationId;
use std::fmt;

/// Errors that can occur while registering or dispatching tools.
///
/// This type uses `Box<ToolErrorKind>` to keep the error size small,
/// enabling efficient use in Result types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolError {
    /// Optional correlation ID for tracking
    pub correlation_id: Option<CorrelationId>,
    /// The specific error that occurred (boxed for size efficiency)
    kind: Box<ToolErrorKind>,
}

/// Specific tool error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolErrorKind {
    /// No handler is registered under the requested capability name
    NoHandlerRegistered {
        /// The capability that was requested
        capability: String,
    },
    /// The handler refused the request
    HandlerDenied {
        /// Message passed back to the agent
        message: String,
        /// Whether the agent session as a whole should be aborted
        interrupt: bool,
    },
    /// The handler failed or panicked
    HandlerFault {
        /// The capability whose handler failed
        capability: String,
        /// Stringified failure
        reason: String,
    },
    /// A result was requested for an id that was never accepted or was
    /// already consumed
    UnknownCorrelationId,
    /// A handler spec could not be resolved during discovery
    DiscoveryAccessFault {
        /// The capability name, when one could be read
        capability: Option<String>,
        /// Why the spec was skipped
        reason: String,
    },
}

impl ToolError {
    /// Creates a new ToolError with the given kind.
    #[must_use]
    pub fn new(kind: ToolErrorKind) -> Self {
        Self {
            correlation_id: None,
            kind: Box::new(kind),
        }
    }

    /// Creates a new ToolError with a correlation ID.
    #[must_use]
    pub fn with_correlation(correlation_id: CorrelationId, kind: ToolErrorKind) -> Self {
        Self {
            correlation_id: Some(correlation_id),
            kind: Box::new(kind),
        }
    }

    /// Returns a reference to the error kind.
    #[must_use]
    pub fn kind(&self) -> &ToolErrorKind {
        &self.kind
    }

    /// Creates a missing-handler error.
    #[must_use]
    pub fn no_handler(capability: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::NoHandlerRegistered {
            capability: capability.into(),
        })
    }

    /// Creates a denial without session interrupt.
    #[must_use]
    pub fn denied(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::HandlerDenied {
            message: message.into(),
            interrupt: false,
        })
    }

    /// Creates a denial that asks the agent session to abort.
    #[must_use]
    pub fn denied_with_interrupt(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::HandlerDenied {
            message: message.into(),
            interrupt: true,
        })
    }

    /// Creates a handler fault.
    #[must_use]
    pub fn handler_fault(capability: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::HandlerFault {
            capability: capability.into(),
            reason: reason.into(),
        })
    }

    /// Creates an unknown correlation id error.
    #[must_use]
    pub fn unknown_correlation_id(correlation_id: CorrelationId) -> Self {
        Self::with_correlation(correlation_id, ToolErrorKind::UnknownCorrelationId)
    }

    /// Creates a discovery fault.
    #[must_use]
    pub fn discovery_fault(capability: Option<String>, reason: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::DiscoveryAccessFault {
            capability,
            reason: reason.into(),
        })
    }

    /// Returns the message delivered to the agent, without the correlation
    /// prefix used by `Display`.
    #[must_use]
    pub fn agent_message(&self) -> String {
        self.kind.to_string()
    }

    /// Returns true if the error asks the agent session to abort.
    #[must_use]
    pub fn is_interrupt(&self) -> bool {
        matches!(
            *self.kind,
            ToolErrorKind::HandlerDenied {
                interrupt: true,
                ..
            }
        )
    }

    /// Returns true if the handler refused the request.
    #[must_use]
    pub fn is_denied(&self) -> bool {
        matches!(*self.kind, ToolErrorKind::HandlerDenied { .. })
    }

    /// Returns true if no handler was registered.
    #[must_use]
    pub fn is_no_handler(&self) -> bool {
        matches!(*self.kind, ToolErrorKind::NoHandlerRegistered { .. })
    }

    /// Returns true if the correlation id was unknown.
    #[must_use]
    pub fn is_unknown_correlation_id(&self) -> bool {
        matches!(*self.kind, ToolErrorKind::UnknownCorrelationId)
    }
}

impl fmt::Display for ToolErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoHandlerRegistered { capability } => {
                write!(f, "no handler registered for capability: {}", capability)
            }
            Self::HandlerDenied { message, .. } => f.write_str(message),
            Self::HandlerFault { reason, .. } => f.write_str(reason),
            Self::UnknownCorrelationId => write!(f, "tool result not found"),
            Self::DiscoveryAccessFault {
                capability: Some(capability),
                reason,
            } => {
                write!(
                    f,
                    "capability '{}' could not be registered: {}",
                    capability, reason
                )
            }
            Self::DiscoveryAccessFault {
                capability: None,
                reason,
            } => {
                write!(f, "handler spec could not be read: {}", reason)
            }
        }
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref corr_id) = self.correlation_id {
            write!(f, "[{}] ", corr_id)?;
        }
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for ToolError {}
