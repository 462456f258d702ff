//! Tool request coordination.
//!
//! The coordinator accepts requests, runs their handlers, stores the results,
//! and hands each result to exactly one fetch. Requests with different
//! correlation ids are tracked independently.

mod dispatch;
mod error;
mod rendezvous;
mod state;

pub use dispatch::{CoordinatorMetrics, ToolCoordinator};
pub(crate) use dispatch::panic_message;
pub use error::{CoordinatorError, CoordinatorErrorKind};
pub use rendezvous::{Rendezvous, RendezvousWaiter};
pub use state::RequestState;
