//! # Acton Tool Rendezvous
//!
//! Deterministic tool-execution coordination between a long-lived actor and
//! an external agent process.
//!
//! The agent sends tool requests asynchronously; the host runs a locally
//! registered handler for each and stores the result; the agent then fetches
//! the result through a call that waits until it is ready. Every state change
//! is driven by a delivered message or call, never by wall-clock time, so a
//! host's behavior can be replayed.
//!
//! ## Architecture
//!
//! - **Handler Registry**: capability name to handler, filled once at build time
//! - **Capability Discovery**: explicit registration of handler specs
//! - **Message Buffer**: inbound and outbound queues with a readiness signal
//! - **Tool Coordinator**: Accept / Dispatch / Resolve with per-request rendezvous
//! - **Tool Host**: owns all of the above and exposes the agent-facing primitives
//! - **Host Actor**: mounts a host inside an acton-reactive actor
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use acton_tool_rendezvous::prelude::*;
//!
//! #[tokio::main]
//! async fn main() {
//!     let host = ToolHost::builder()
//!         .handler("Echo", ExecutionMode::ViaLocalLogic, |_id, input| async move {
//!             HandlerOutcome::success(serde_json::Value::Object(input).to_string())
//!         })
//!         .build();
//!
//!     let mut runtime = ActonApp::launch_async().await;
//!     let actor = ToolHostActor::spawn(&mut runtime, host).await;
//!
//!     actor
//!         .send(RequestToolExecution {
//!             request: ToolRequest::new("t1", "Echo", Default::default()),
//!         })
//!         .await;
//!
//!     runtime.shutdown_all().await.unwrap();
//! }
//! ```

pub mod buffer;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod host;
pub mod logging;
pub mod tools;
pub mod types;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::buffer::MessageBuffer;
    pub use crate::coordinator::{
        CoordinatorError, CoordinatorMetrics, RequestState, ToolCoordinator,
    };
    pub use crate::error::{ToolHostError, ToolHostErrorKind};
    pub use crate::host::{
        CapabilityList, DeliverAgentMessage, FetchOutgoingMessages, FetchToolResult,
        InitToolHost, ListCapabilities, OutgoingMessages, RequestToolExecution, SendToAgent,
        ToolHost, ToolHostActor, ToolHostBuilder, ToolHostConfig, ToolRequestRejected,
        ToolResultReady,
    };
    pub use crate::logging::{LogLevel, LogRotation, LoggingConfig};
    pub use crate::tools::{
        ExecutionMode, HandlerOutcome, HandlerSpec, ToolError, ToolHandler, ToolInput,
        ToolOutcome, ToolProvider, ToolRequest, ToolResult,
    };
    pub use crate::types::{CapabilityName, CorrelationId};

    // Re-export acton-reactive prelude
    pub use acton_reactive::prelude::*;
}
