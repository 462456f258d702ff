//! Request lifecycle state.

use std::fmt;

/// Lifecycle of one correlation id.
///
/// ```text
/// Accepted --> Dispatching --> Resolved --> Consumed
/// ```
///
/// A result may also be resolved straight from `Accepted` when it is stored
/// without going through a registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestState {
    /// The request was accepted and its rendezvous exists
    Accepted,
    /// The handler is running
    Dispatching,
    /// A result is stored and waiting to be fetched
    Resolved,
    /// The result was handed to the agent
    Consumed,
}

impl RequestState {
    /// Returns true if the lifecycle may move from `self` to `next`.
    #[must_use]
    pub fn can_transition_to(&self, next: RequestState) -> bool {
        matches!(
            (self, next),
            (Self::Accepted, Self::Dispatching)
                | (Self::Accepted, Self::Resolved)
                | (Self::Dispatching, Self::Resolved)
                | (Self::Resolved, Self::Consumed)
        )
    }

    /// Returns true for the terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Consumed)
    }

    /// Returns true while the request still occupies an in-flight slot.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => write!(f, "accepted"),
            Self::Dispatching => write!(f, "dispatching"),
            Self::Resolved => write!(f, "resolved"),
            Self::Consumed => write!(f, "consumed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_transitions() {
        assert!(RequestState::Accepted.can_transition_to(RequestState::Dispatching));
        assert!(RequestState::Dispatching.can_transition_to(RequestState::Resolved));
        assert!(RequestState::Resolved.can_transition_to(RequestState::Consumed));
    }

    #[test]
    fn no_backward_or_skipping_transitions() {
        assert!(!RequestState::Resolved.can_transition_to(RequestState::Dispatching));
        assert!(!RequestState::Accepted.can_transition_to(RequestState::Consumed));
        assert!(!RequestState::Consumed.can_transition_to(RequestState::Accepted));
    }

    #[test]
    fn consumed_is_terminal() {
        assert!(RequestState::Consumed.is_terminal());
        assert!(!RequestState::Resolved.is_terminal());
        assert!(RequestState::Dispatching.is_in_flight());
    }

    #[test]
    fn display() {
        assert_eq!(RequestState::Dispatching.to_string(), "dispatching");
    }
}
