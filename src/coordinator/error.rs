//! Coordinator protocol errors.
//!
//! These are raised when a request cannot be accepted at all. They never
//! disturb requests that are already in flight.

use crate::coordinator::RequestState;
use crate::types::CorrelationId;
use std::fmt;

/// A request was refused at acceptance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorError {
    /// The correlation id of the refused request
    pub correlation_id: CorrelationId,
    /// The specific error that occurred
    kind: Box<CoordinatorErrorKind>,
}

/// Specific coordinator error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorErrorKind {
    /// The id is already in use by a request that has not been consumed
    DuplicateCorrelationId {
        /// State of the request already holding the id
        state: RequestState,
    },
    /// The in-flight limit was reached
    TooManyInFlight {
        /// The configured limit
        limit: usize,
    },
}

impl CoordinatorError {
    /// Creates a new CoordinatorError.
    #[must_use]
    pub fn new(correlation_id: CorrelationId, kind: CoordinatorErrorKind) -> Self {
        Self {
            correlation_id,
            kind: Box::new(kind),
        }
    }

    /// Creates a duplicate id error.
    #[must_use]
    pub fn duplicate(correlation_id: CorrelationId, state: RequestState) -> Self {
        Self::new(
            correlation_id,
            CoordinatorErrorKind::DuplicateCorrelationId { state },
        )
    }

    /// Creates an in-flight limit error.
    #[must_use]
    pub fn too_many_in_flight(correlation_id: CorrelationId, limit: usize) -> Self {
        Self::new(correlation_id, CoordinatorErrorKind::TooManyInFlight { limit })
    }

    /// Returns a reference to the error kind.
    #[must_use]
    pub fn kind(&self) -> &CoordinatorErrorKind {
        &self.kind
    }

    /// Returns true if the id was already in use.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(*self.kind, CoordinatorErrorKind::DuplicateCorrelationId { .. })
    }

    /// Returns true if the in-flight limit was reached.
    #[must_use]
    pub fn is_too_many_in_flight(&self) -> bool {
        matches!(*self.kind, CoordinatorErrorKind::TooManyInFlight { .. })
    }
}

impl fmt::Display for CoordinatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind.as_ref() {
            CoordinatorErrorKind::DuplicateCorrelationId { state } => write!(
                f,
                "[{}] correlation id already in use by a {} request",
                self.correlation_id, state
            ),
            CoordinatorErrorKind::TooManyInFlight { limit } => write!(
                f,
                "[{}] too many requests in flight (limit {})",
                self.correlation_id, limit
            ),
        }
    }
}

impl std::error::Error for CoordinatorError {}
