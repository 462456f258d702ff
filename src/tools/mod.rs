//! Capability handlers and the data that flows through them.
//!
//! - **Handler**: the [`ToolHandler`] trait and the [`HandlerOutcome`] it returns
//! - **Registry**: per-host map from capability name to handler
//! - **Discovery**: the explicit registration step run while a host is built
//! - **Request**: wire types for tool requests and results
//!
//! ## Flow
//!
//! ```text
//! ToolProvider / builder.handler(..)
//!            |
//!            | discover_into
//!            v
//! +-------------------------------------------------------------+
//! |                     HandlerRegistry                          |
//! |                                                              |
//! |  "Bash"  --> HandlerEntry { mode, handler }                  |
//! |  "Echo"  --> HandlerEntry { mode, handler }                  |
//! |                                                              |
//! +-------------------------------------------------------------+
//!            |
//!            | ToolRequest --> handler.call(..) --> HandlerOutcome
//!            v
//!        ToolResult
//! ```

pub mod discovery;
pub mod error;
pub mod handler;
pub mod registry;
pub mod request;

pub use discovery::{discover_into, DiscoveryReport, HandlerSpec, ToolProvider};
pub use error::{ToolError, ToolErrorKind};
pub use handler::{handler_fn, ExecutionMode, FnHandler, HandlerOutcome, SharedHandler, ToolHandler};
pub use registry::{HandlerEntry, HandlerRegistry};
pub use request::{ToolInput, ToolOutcome, ToolRequest, ToolResult};
