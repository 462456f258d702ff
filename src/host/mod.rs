//! The tool host: the aggregate an actor owns to serve an agent process.
//!
//! A [`ToolHost`] owns the handler registry, the message buffers, and the
//! coordinator for one agent session. It exposes the five primitives the
//! agent process drives, plus the calls the host's own business logic uses
//! to talk to the agent.
//!
//! ## Architecture
//!
//! ```text
//! +-------------------------------------------------------------+
//! |                         ToolHost                             |
//! |                                                              |
//! |  deliver_agent_message --> inbound  --> wait_for_agent_msgs  |
//! |  fetch_outgoing_msgs   <-- outbound <-- send_to_agent        |
//! |                                                              |
//! |  request_tool_execution --> ToolCoordinator --> handler      |
//! |  fetch_tool_result      <-- ToolCoordinator <-- ToolResult   |
//! |                                                              |
//! |  list_registered_capabilities --> HandlerRegistry            |
//! +-------------------------------------------------------------+
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use acton_tool_rendezvous::prelude::*;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let host = ToolHost::builder()
//!     .handler("Echo", ExecutionMode::ViaLocalLogic, |_id, input| async move {
//!         HandlerOutcome::success(serde_json::Value::Object(input).to_string())
//!     })
//!     .build();
//!
//! host.request_tool_execution_json(json!({
//!     "tool_id": "t1",
//!     "tool_name": "Echo",
//!     "input": {"x": "42"}
//! }))
//! .await
//! .unwrap();
//!
//! let result = host.fetch_tool_result(&"t1".into()).await;
//! assert_eq!(result.result_text(), Some(r#"{"x":"42"}"#));
//! # });
//! ```

mod actor;
mod builder;
mod config;

pub use actor::{
    CapabilityList, DeliverAgentMessage, FetchOutgoingMessages, FetchToolResult, InitToolHost,
    ListCapabilities, OutgoingMessages, RequestToolExecution, SendToAgent, ToolHostActor,
    ToolRequestRejected, ToolResultReady,
};
pub use builder::ToolHostBuilder;
pub use config::ToolHostConfig;

use crate::buffer::MessageBuffer;
use crate::coordinator::{CoordinatorMetrics, RequestState, ToolCoordinator};
use crate::error::ToolHostError;
use crate::tools::{DiscoveryReport, HandlerRegistry, ToolError, ToolRequest, ToolResult};
use crate::types::{CapabilityName, CorrelationId};
use futures::Stream;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Buffers between the host and its agent: structured inbound, raw outbound.
pub type AgentBuffer = MessageBuffer<Value, String>;

struct HostInner {
    config: ToolHostConfig,
    registry: HandlerRegistry,
    coordinator: ToolCoordinator,
    buffer: AgentBuffer,
    discovery: DiscoveryReport,
}

/// Serves tool requests from one agent process.
///
/// Cloning is cheap; clones share the same state.
#[derive(Clone)]
pub struct ToolHost {
    inner: Arc<HostInner>,
}

impl ToolHost {
    /// Creates a builder for registering handlers and configuring the host.
    #[must_use]
    pub fn builder() -> ToolHostBuilder {
        ToolHostBuilder::default()
    }

    pub(crate) fn from_parts(
        config: ToolHostConfig,
        registry: HandlerRegistry,
        discovery: DiscoveryReport,
    ) -> Self {
        let coordinator = ToolCoordinator::new(config.max_in_flight);
        Self {
            inner: Arc::new(HostInner {
                config,
                registry,
                coordinator,
                buffer: AgentBuffer::new(),
                discovery,
            }),
        }
    }

    // -- Primitives driven by the agent process --

    /// Queues a message from the agent for the host's business logic.
    pub fn deliver_agent_message(&self, message: Value) {
        tracing::trace!(host = %self.inner.config.name, "Agent message delivered");
        self.inner.buffer.push_inbound(message);
    }

    /// Accepts a tool request, runs its handler, and stores the result.
    ///
    /// Completes once the result is stored. Use
    /// [`fetch_tool_result`](Self::fetch_tool_result) to collect it.
    ///
    /// # Errors
    ///
    /// Returns a rejection if the correlation id is already in use or the
    /// in-flight limit is reached. The request is not run in that case.
    pub async fn request_tool_execution(&self, request: ToolRequest) -> Result<(), ToolHostError> {
        self.inner
            .coordinator
            .handle_request(request, &self.inner.registry)
            .await
            .map_err(ToolHostError::from)
    }

    /// Parses a raw `{tool_id, tool_name, input}` request and executes it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` when the value does not match the request
    /// shape, or a rejection as for
    /// [`request_tool_execution`](Self::request_tool_execution).
    pub async fn request_tool_execution_json(&self, raw: Value) -> Result<(), ToolHostError> {
        let request = parse_request(raw)?;
        self.request_tool_execution(request).await
    }

    /// Accepts a tool request now and runs its handler on a separate task.
    ///
    /// Acceptance happens before this returns, so requests keep their
    /// arrival order even though handlers run concurrently. Must be called
    /// from within a Tokio runtime.
    ///
    /// If the task is aborted before the handler finishes, the request is
    /// resolved as a handler fault so a waiting fetch still returns.
    ///
    /// # Errors
    ///
    /// Returns a rejection if the request cannot be accepted.
    pub fn spawn_tool_execution(&self, request: ToolRequest) -> Result<JoinHandle<()>, ToolHostError> {
        self.inner.coordinator.accept(&request)?;

        let guard = DispatchGuard {
            host: self.clone(),
            request: Some(request),
        };
        Ok(tokio::spawn(guard.run()))
    }

    /// Takes every message queued for the agent. Never waits.
    #[must_use]
    pub fn fetch_outgoing_messages(&self) -> Vec<String> {
        self.inner.buffer.drain_outbound()
    }

    /// Waits for a tool result and consumes it.
    ///
    /// Unknown or already fetched ids yield a failed "tool result not found"
    /// result immediately.
    pub async fn fetch_tool_result(&self, correlation_id: &CorrelationId) -> ToolResult {
        self.inner.coordinator.await_result(correlation_id).await
    }

    /// Like [`fetch_tool_result`](Self::fetch_tool_result), giving up after
    /// `limit`. On expiry the result stays available for a later fetch.
    pub async fn fetch_tool_result_within(
        &self,
        correlation_id: &CorrelationId,
        limit: Duration,
    ) -> Option<ToolResult> {
        self.inner
            .coordinator
            .await_result_within(correlation_id, limit)
            .await
    }

    /// Returns the sorted names of every registered capability.
    #[must_use]
    pub fn list_registered_capabilities(&self) -> Vec<CapabilityName> {
        self.inner.registry.names()
    }

    /// Returns the sorted names of capabilities the agent should route here
    /// rather than run itself.
    #[must_use]
    pub fn intercepted_capabilities(&self) -> Vec<CapabilityName> {
        self.inner.registry.intercepted_names()
    }

    // -- Business logic side --

    /// Queues a raw line for the agent.
    pub fn send_to_agent(&self, message: impl Into<String>) {
        self.inner.buffer.enqueue_outbound(message.into());
    }

    /// Waits for agent messages and takes all of them.
    ///
    /// `None` waits indefinitely; `Some(limit)` returns an empty batch once
    /// `limit` passes with nothing delivered.
    pub async fn wait_for_agent_messages(&self, timeout: Option<Duration>) -> Vec<Value> {
        self.inner.buffer.drain_ready(timeout).await
    }

    /// Takes every delivered agent message without waiting.
    #[must_use]
    pub fn agent_messages(&self) -> Vec<Value> {
        self.inner.buffer.peek_and_clear()
    }

    /// Streams non-empty batches of agent messages as they arrive.
    pub fn agent_message_batches(&self) -> impl Stream<Item = Vec<Value>> + '_ {
        self.inner.buffer.inbound_batches()
    }

    // -- Introspection --

    /// Returns the handler registry.
    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.inner.registry
    }

    /// Returns the host configuration.
    #[must_use]
    pub fn config(&self) -> &ToolHostConfig {
        &self.inner.config
    }

    /// Returns the host name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    /// Returns what discovery registered and skipped while the host was built.
    #[must_use]
    pub fn discovery_report(&self) -> &DiscoveryReport {
        &self.inner.discovery
    }

    /// Returns a snapshot of the coordinator counters.
    #[must_use]
    pub fn metrics(&self) -> CoordinatorMetrics {
        self.inner.coordinator.metrics()
    }

    /// Returns the state of a request, if it is still tracked.
    #[must_use]
    pub fn request_state(&self, correlation_id: &CorrelationId) -> Option<RequestState> {
        self.inner.coordinator.state_of(correlation_id)
    }

    /// Number of requests accepted and not yet fetched.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.inner.coordinator.in_flight()
    }
}

impl fmt::Debug for ToolHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolHost")
            .field("name", &self.inner.config.name)
            .field("capabilities", &self.inner.registry.len())
            .field("coordinator", &self.inner.coordinator)
            .field("buffer", &self.inner.buffer)
            .finish_non_exhaustive()
    }
}

/// An accepted request whose dispatch runs on a detached task.
///
/// Dropped with the request still held means the task never finished.
struct DispatchGuard {
    host: ToolHost,
    request: Option<ToolRequest>,
}

impl DispatchGuard {
    async fn run(mut self) {
        let Some(ref request) = self.request else {
            return;
        };
        let inner = &self.host.inner;
        let result = inner.coordinator.dispatch(request, &inner.registry).await;
        inner.coordinator.resolve(result);
        self.request = None;
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        let Some(request) = self.request.take() else {
            return;
        };
        tracing::warn!(
            correlation_id = %request.correlation_id,
            capability = %request.capability_name,
            "Tool dispatch cancelled before completion"
        );
        let error = ToolError::handler_fault(&request.capability_name, "dispatch cancelled");
        self.host
            .inner
            .coordinator
            .resolve(ToolResult::from_error(request.correlation_id, &error));
    }
}

fn parse_request(raw: Value) -> Result<ToolRequest, ToolHostError> {
    serde_json::from_value(raw).map_err(|e| ToolHostError::invalid_request(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ExecutionMode, HandlerOutcome, ToolInput};
    use serde_json::json;

    fn echo_host() -> ToolHost {
        ToolHost::builder()
            .handler("Echo", ExecutionMode::ViaLocalLogic, |_id, input: ToolInput| async move {
                HandlerOutcome::success(Value::Object(input).to_string())
            })
            .build()
    }

    #[test]
    fn parse_request_rejects_missing_fields() {
        let error = parse_request(json!({"tool_name": "Echo"})).unwrap_err();
        assert!(error.is_invalid_request());
        assert!(error.to_string().contains("tool_id"));
    }

    #[tokio::test]
    async fn invalid_json_request_changes_nothing() {
        let host = echo_host();
        let error = host
            .request_tool_execution_json(json!({"tool_id": 5}))
            .await
            .unwrap_err();

        assert!(error.is_invalid_request());
        assert_eq!(host.in_flight(), 0);
        assert_eq!(host.metrics().accepted, 0);
    }

    #[tokio::test]
    async fn spawned_execution_resolves() {
        let host = echo_host();
        let handle = host
            .spawn_tool_execution(ToolRequest::new("s1", "Echo", ToolInput::new()))
            .unwrap();

        let result = host.fetch_tool_result(&"s1".into()).await;
        handle.await.unwrap();
        assert_eq!(result.result_text(), Some("{}"));
    }

    #[tokio::test]
    async fn spawned_duplicate_is_rejected_synchronously() {
        let host = echo_host();
        let _first = host
            .spawn_tool_execution(ToolRequest::new("d1", "Echo", ToolInput::new()))
            .unwrap();

        let error = host
            .spawn_tool_execution(ToolRequest::new("d1", "Echo", ToolInput::new()))
            .unwrap_err();
        assert!(error.as_rejection().is_some_and(|e| e.is_duplicate()));
    }

    fn stuck_host() -> ToolHost {
        ToolHost::builder()
            .handler("Stuck", ExecutionMode::ViaDurableSubtask, |_id, _input| async {
                std::future::pending::<()>().await;
                HandlerOutcome::success("never")
            })
            .build()
    }

    #[tokio::test]
    async fn aborted_dispatch_resolves_as_fault() {
        let host = stuck_host();
        let handle = host
            .spawn_tool_execution(ToolRequest::new("a1", "Stuck", ToolInput::new()))
            .unwrap();

        for _ in 0..10 {
            if host.request_state(&"a1".into()) == Some(RequestState::Dispatching) {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(host.request_state(&"a1".into()), Some(RequestState::Dispatching));

        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());

        let result = host.fetch_tool_result(&"a1".into()).await;
        assert!(!result.is_success());
        assert!(!result.interrupt_requested());
        assert!(result.error_message().unwrap().contains("dispatch cancelled"));
        assert_eq!(host.in_flight(), 0);
    }

    #[tokio::test]
    async fn dispatch_aborted_before_start_still_resolves() {
        let host = stuck_host();
        let handle = host
            .spawn_tool_execution(ToolRequest::new("a2", "Stuck", ToolInput::new()))
            .unwrap();
        handle.abort();
        let _ = handle.await;

        let result = host
            .fetch_tool_result_within(&"a2".into(), Duration::from_secs(5))
            .await
            .unwrap();
        assert!(result.error_message().unwrap().contains("dispatch cancelled"));
    }

    #[tokio::test]
    async fn completed_dispatch_is_not_resolved_twice() {
        let host = echo_host();
        host.spawn_tool_execution(ToolRequest::new("c1", "Echo", ToolInput::new()))
            .unwrap()
            .await
            .unwrap();

        assert!(host.fetch_tool_result(&"c1".into()).await.is_success());
        assert_eq!(host.metrics().succeeded, 1);
        assert_eq!(host.metrics().failed, 0);
    }

    #[test]
    fn outbound_round_trip() {
        let host = echo_host();
        host.send_to_agent("line one");
        host.send_to_agent(String::from("line two"));

        assert_eq!(host.fetch_outgoing_messages(), vec!["line one", "line two"]);
        assert!(host.fetch_outgoing_messages().is_empty());
    }

    #[test]
    fn agent_messages_without_waiting() {
        let host = echo_host();
        host.deliver_agent_message(json!({"type": "user"}));
        assert_eq!(host.agent_messages(), vec![json!({"type": "user"})]);
        assert!(host.agent_messages().is_empty());
    }

    #[test]
    fn clones_share_state() {
        let host = echo_host();
        let clone = host.clone();
        clone.send_to_agent("shared");
        assert_eq!(host.fetch_outgoing_messages(), vec!["shared"]);
    }

    #[test]
    fn introspection() {
        let host = echo_host();
        assert_eq!(host.name(), "tool-host");
        assert_eq!(host.list_registered_capabilities().len(), 1);
        assert_eq!(host.intercepted_capabilities().len(), 1);
        assert_eq!(host.discovery_report().registered.len(), 1);
        assert!(format!("{host:?}").contains("ToolHost"));
    }
}
