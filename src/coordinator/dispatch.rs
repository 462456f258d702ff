//! The Accept / Dispatch / Resolve state machine.
//!
//! Every request is tracked by its correlation id from acceptance until its
//! result is fetched. Handlers run with no lock held, so one slow handler
//! never blocks acceptance, resolution, or fetching of other requests.

use crate::coordinator::{CoordinatorError, Rendezvous, RequestState};
use crate::tools::{HandlerRegistry, ToolError, ToolRequest, ToolResult};
use crate::types::CorrelationId;
use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Counters collected by the coordinator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorMetrics {
    /// Requests accepted
    pub accepted: u64,
    /// Requests refused at acceptance
    pub rejected: u64,
    /// Results stored as successes
    pub succeeded: u64,
    /// Results stored as failures
    pub failed: u64,
    /// Results handed to the agent
    pub consumed: u64,
}

#[derive(Debug)]
struct Slot {
    state: RequestState,
    result: Option<ToolResult>,
    rendezvous: Rendezvous,
}

impl Slot {
    fn accepted() -> Self {
        Self {
            state: RequestState::Accepted,
            result: None,
            rendezvous: Rendezvous::new(),
        }
    }

    fn advance(&mut self, correlation_id: &CorrelationId, next: RequestState) {
        if self.state.can_transition_to(next) {
            self.state = next;
        } else {
            tracing::debug!(
                correlation_id = %correlation_id,
                from = %self.state,
                to = %next,
                "Ignoring out-of-order state transition"
            );
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    slots: HashMap<CorrelationId, Slot>,
    metrics: CoordinatorMetrics,
}

impl Inner {
    fn take_result(&mut self, correlation_id: &CorrelationId) -> Option<ToolResult> {
        let has_result = self
            .slots
            .get(correlation_id)
            .is_some_and(|slot| slot.result.is_some());
        if !has_result {
            return None;
        }

        let mut slot = self.slots.remove(correlation_id)?;
        slot.advance(correlation_id, RequestState::Consumed);
        self.metrics.consumed += 1;

        tracing::debug!(
            correlation_id = %correlation_id,
            state = %slot.state,
            "Tool result consumed"
        );

        slot.result.take()
    }
}

/// Tracks in-flight tool requests and hands their results to the agent.
///
/// # Example
///
/// ```rust
/// use acton_tool_rendezvous::coordinator::ToolCoordinator;
/// use acton_tool_rendezvous::tools::{handler_fn, ExecutionMode, HandlerOutcome, HandlerRegistry, ToolRequest};
/// use acton_tool_rendezvous::types::{CapabilityName, CorrelationId};
///
/// # tokio_test::block_on(async {
/// let mut registry = HandlerRegistry::new();
/// registry.register(
///     CapabilityName::parse("Echo").unwrap(),
///     handler_fn(|_id: CorrelationId, input| async move {
///         HandlerOutcome::success(serde_json::Value::Object(input).to_string())
///     }),
///     ExecutionMode::ViaLocalLogic,
/// );
///
/// let coordinator = ToolCoordinator::new(0);
/// let request = ToolRequest::new("t1", "Echo", Default::default());
/// coordinator.handle_request(request, &registry).await.unwrap();
///
/// let result = coordinator.await_result(&"t1".into()).await;
/// assert_eq!(result.result_text(), Some("{}"));
/// # });
/// ```
pub struct ToolCoordinator {
    inner: Mutex<Inner>,
    max_in_flight: usize,
}

impl ToolCoordinator {
    /// Creates a coordinator. A `max_in_flight` of zero means unbounded.
    #[must_use]
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            max_in_flight,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Accepts a request and creates its rendezvous.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateCorrelationId` if the id is held by a request whose
    /// result has not been consumed, and `TooManyInFlight` when the configured
    /// limit is reached. The request already holding the id is left untouched.
    pub fn accept(&self, request: &ToolRequest) -> Result<(), CoordinatorError> {
        let mut inner = self.lock();
        let correlation_id = &request.correlation_id;

        if let Some(existing) = inner.slots.get(correlation_id) {
            let error = CoordinatorError::duplicate(correlation_id.clone(), existing.state);
            inner.metrics.rejected += 1;
            tracing::warn!(
                correlation_id = %correlation_id,
                capability = %request.capability_name,
                error = %error,
                "Rejecting tool request"
            );
            return Err(error);
        }

        if self.max_in_flight > 0 && inner.slots.len() >= self.max_in_flight {
            let error = CoordinatorError::too_many_in_flight(correlation_id.clone(), self.max_in_flight);
            inner.metrics.rejected += 1;
            tracing::warn!(
                correlation_id = %correlation_id,
                capability = %request.capability_name,
                in_flight = inner.slots.len(),
                "Rejecting tool request"
            );
            return Err(error);
        }

        inner.slots.insert(correlation_id.clone(), Slot::accepted());
        inner.metrics.accepted += 1;

        tracing::debug!(
            correlation_id = %correlation_id,
            capability = %request.capability_name,
            "Tool request accepted"
        );

        Ok(())
    }

    /// Runs the handler for a request and converts its outcome to a result.
    ///
    /// The result is returned, not stored; see [`resolve`](Self::resolve).
    /// A missing handler, a denial, a fault, and a handler panic all become
    /// failed results.
    pub async fn dispatch(&self, request: &ToolRequest, registry: &HandlerRegistry) -> ToolResult {
        let correlation_id = request.correlation_id.clone();
        let capability = request.capability_name.as_str();

        if let Some(slot) = self.lock().slots.get_mut(&correlation_id) {
            slot.advance(&correlation_id, RequestState::Dispatching);
        }

        let Some(entry) = registry.get(capability) else {
            tracing::warn!(
                correlation_id = %correlation_id,
                capability = %capability,
                "No handler registered"
            );
            return ToolResult::from_error(correlation_id, &ToolError::no_handler(capability));
        };

        let handler = Arc::clone(entry.handler());
        tracing::debug!(
            correlation_id = %correlation_id,
            capability = %capability,
            execution_mode = %entry.execution_mode(),
            "Dispatching tool request"
        );

        let call = handler.call(correlation_id.clone(), request.input.clone());
        match AssertUnwindSafe(call).catch_unwind().await {
            Ok(outcome) => ToolResult::from_outcome(correlation_id, capability, outcome),
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                tracing::error!(
                    correlation_id = %correlation_id,
                    capability = %capability,
                    reason = %reason,
                    "Tool handler panicked"
                );
                ToolResult::from_error(
                    correlation_id,
                    &ToolError::handler_fault(capability, format!("handler panicked: {reason}")),
                )
            }
        }
    }

    /// Stores a result and fires its rendezvous.
    ///
    /// A result for an id that was never accepted is stored as well, so a
    /// later fetch can still read it.
    pub fn resolve(&self, result: ToolResult) {
        let mut inner = self.lock();
        let correlation_id = result.correlation_id().clone();

        if result.is_success() {
            inner.metrics.succeeded += 1;
        } else {
            inner.metrics.failed += 1;
        }

        tracing::debug!(
            correlation_id = %correlation_id,
            outcome = %result.outcome(),
            interrupt = result.interrupt_requested(),
            "Tool request resolved"
        );

        let slot = inner
            .slots
            .entry(correlation_id.clone())
            .or_insert_with(Slot::accepted);
        slot.advance(&correlation_id, RequestState::Resolved);
        slot.result = Some(result);
        slot.rendezvous.fire();
    }

    /// Accepts, dispatches, and resolves one request.
    ///
    /// # Errors
    ///
    /// Returns the acceptance error when the request is refused; nothing is
    /// dispatched in that case.
    pub async fn handle_request(
        &self,
        request: ToolRequest,
        registry: &HandlerRegistry,
    ) -> Result<(), CoordinatorError> {
        self.accept(&request)?;
        let result = self.dispatch(&request, registry).await;
        self.resolve(result);
        Ok(())
    }

    /// Waits for the result of a request and consumes it.
    ///
    /// An id that was never accepted, or whose result was already consumed,
    /// yields a failed "tool result not found" result without waiting.
    pub async fn await_result(&self, correlation_id: &CorrelationId) -> ToolResult {
        let waiter = {
            let mut inner = self.lock();
            let pending = inner
                .slots
                .get(correlation_id)
                .map(|slot| (slot.result.is_some(), slot.rendezvous.waiter()));

            match pending {
                None => {
                    tracing::debug!(correlation_id = %correlation_id, "Tool result not found");
                    return ToolResult::not_found(correlation_id.clone());
                }
                Some((true, _)) => {
                    return inner
                        .take_result(correlation_id)
                        .unwrap_or_else(|| ToolResult::not_found(correlation_id.clone()));
                }
                Some((false, waiter)) => waiter,
            }
        };

        tracing::trace!(correlation_id = %correlation_id, "Waiting for tool result");
        waiter.wait().await;

        self.lock()
            .take_result(correlation_id)
            .unwrap_or_else(|| ToolResult::not_found(correlation_id.clone()))
    }

    /// Like [`await_result`](Self::await_result) with a bounded wait.
    ///
    /// Returns `None` if the limit expires first; the request stays pending
    /// and its result can still be fetched later.
    pub async fn await_result_within(
        &self,
        correlation_id: &CorrelationId,
        limit: Duration,
    ) -> Option<ToolResult> {
        tokio::time::timeout(limit, self.await_result(correlation_id))
            .await
            .ok()
    }

    /// Returns the current state of a request, or `None` if the id is unknown
    /// or its result was consumed.
    #[must_use]
    pub fn state_of(&self, correlation_id: &CorrelationId) -> Option<RequestState> {
        self.lock().slots.get(correlation_id).map(|slot| slot.state)
    }

    /// Number of requests accepted and not yet consumed.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.lock().slots.len()
    }

    /// Returns a snapshot of the counters.
    #[must_use]
    pub fn metrics(&self) -> CoordinatorMetrics {
        self.lock().metrics
    }

    /// Returns the configured in-flight limit (zero means unbounded).
    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }
}

impl Default for ToolCoordinator {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Debug for ToolCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolCoordinator")
            .field("in_flight", &self.in_flight())
            .field("max_in_flight", &self.max_in_flight)
            .finish()
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{handler_fn, ExecutionMode, HandlerOutcome, ToolInput};
    use crate::types::CapabilityName;
    use serde_json::json;
    use tokio_test::{assert_pending, assert_ready, task};

    fn registry_with_echo() -> HandlerRegistry {
        let mut registry = HandlerRegistry::new();
        registry.register(
            CapabilityName::parse("Echo").unwrap(),
            handler_fn(|_id: CorrelationId, input: ToolInput| async move {
                HandlerOutcome::success(serde_json::Value::Object(input).to_string())
            }),
            ExecutionMode::ViaLocalLogic,
        );
        registry
    }

    fn echo_request(id: &str) -> ToolRequest {
        let mut input = ToolInput::new();
        input.insert("x".into(), json!("42"));
        ToolRequest::new(id, "Echo", input)
    }

    #[tokio::test]
    async fn accept_dispatch_resolve_consume() {
        let coordinator = ToolCoordinator::default();
        let registry = registry_with_echo();
        let request = echo_request("t1");

        coordinator.accept(&request).unwrap();
        assert_eq!(coordinator.state_of(&"t1".into()), Some(RequestState::Accepted));

        let result = coordinator.dispatch(&request, &registry).await;
        assert_eq!(
            coordinator.state_of(&"t1".into()),
            Some(RequestState::Dispatching)
        );

        coordinator.resolve(result);
        assert_eq!(coordinator.state_of(&"t1".into()), Some(RequestState::Resolved));

        let fetched = coordinator.await_result(&"t1".into()).await;
        assert!(fetched.is_success());
        assert_eq!(fetched.result_text(), Some(r#"{"x":"42"}"#));
        assert_eq!(coordinator.state_of(&"t1".into()), None);
        assert_eq!(coordinator.in_flight(), 0);
    }

    #[tokio::test]
    async fn second_fetch_is_not_found() {
        let coordinator = ToolCoordinator::default();
        coordinator
            .handle_request(echo_request("t1"), &registry_with_echo())
            .await
            .unwrap();

        assert!(coordinator.await_result(&"t1".into()).await.is_success());

        let again = coordinator.await_result(&"t1".into()).await;
        assert!(!again.is_success());
        assert_eq!(again.error_message(), Some("tool result not found"));
    }

    #[tokio::test]
    async fn unknown_id_does_not_wait() {
        let coordinator = ToolCoordinator::default();
        let result = coordinator.await_result(&"never".into()).await;
        assert_eq!(result.error_message(), Some("tool result not found"));
    }

    #[tokio::test]
    async fn missing_handler_names_capability() {
        let coordinator = ToolCoordinator::default();
        let request = ToolRequest::new("t1", "Nope", ToolInput::new());
        coordinator
            .handle_request(request, &HandlerRegistry::new())
            .await
            .unwrap();

        let result = coordinator.await_result(&"t1".into()).await;
        assert!(!result.is_success());
        assert!(result.error_message().unwrap().contains("Nope"));
        assert!(!result.interrupt_requested());
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected_without_disturbing_original() {
        let coordinator = ToolCoordinator::default();
        let registry = registry_with_echo();

        coordinator.accept(&echo_request("t1")).unwrap();
        let error = coordinator
            .handle_request(echo_request("t1"), &registry)
            .await
            .unwrap_err();

        assert!(error.is_duplicate());
        assert_eq!(coordinator.state_of(&"t1".into()), Some(RequestState::Accepted));
        assert_eq!(coordinator.metrics().rejected, 1);
    }

    #[tokio::test]
    async fn id_can_be_reused_after_consumption() {
        let coordinator = ToolCoordinator::default();
        let registry = registry_with_echo();

        coordinator.handle_request(echo_request("t1"), &registry).await.unwrap();
        coordinator.await_result(&"t1".into()).await;

        assert!(coordinator.handle_request(echo_request("t1"), &registry).await.is_ok());
    }

    #[tokio::test]
    async fn in_flight_limit() {
        let coordinator = ToolCoordinator::new(1);
        coordinator.accept(&echo_request("a")).unwrap();

        let error = coordinator.accept(&echo_request("b")).unwrap_err();
        assert!(error.is_too_many_in_flight());
        assert_eq!(coordinator.max_in_flight(), 1);
    }

    async fn explode(_id: CorrelationId, _input: ToolInput) -> HandlerOutcome {
        panic!("kaboom")
    }

    #[tokio::test]
    async fn panicking_handler_becomes_fault() {
        let mut registry = HandlerRegistry::new();
        registry.register(
            CapabilityName::parse("Boom").unwrap(),
            handler_fn(explode),
            ExecutionMode::ViaLocalLogic,
        );

        let coordinator = ToolCoordinator::default();
        coordinator
            .handle_request(ToolRequest::new("t1", "Boom", ToolInput::new()), &registry)
            .await
            .unwrap();

        let result = coordinator.await_result(&"t1".into()).await;
        assert!(!result.is_success());
        assert!(result.error_message().unwrap().contains("kaboom"));
        assert!(!result.interrupt_requested());
    }

    #[test]
    fn waiter_is_released_by_resolve() {
        let coordinator = ToolCoordinator::default();
        let request = echo_request("t1");
        coordinator.accept(&request).unwrap();

        let id: CorrelationId = "t1".into();
        let mut fetch = task::spawn(coordinator.await_result(&id));
        assert_pending!(fetch.poll());

        coordinator.resolve(ToolResult::success("t1".into(), "done"));
        assert!(fetch.is_woken());

        let result = assert_ready!(fetch.poll());
        assert_eq!(result.result_text(), Some("done"));
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_wait_leaves_request_pending() {
        let coordinator = ToolCoordinator::default();
        coordinator.accept(&echo_request("t1")).unwrap();

        let expired = coordinator
            .await_result_within(&"t1".into(), Duration::from_secs(1))
            .await;
        assert!(expired.is_none());
        assert_eq!(coordinator.state_of(&"t1".into()), Some(RequestState::Accepted));

        coordinator.resolve(ToolResult::success("t1".into(), "late"));
        let fetched = coordinator
            .await_result_within(&"t1".into(), Duration::from_secs(1))
            .await;
        assert_eq!(fetched.and_then(|r| r.result_text().map(String::from)), Some("late".into()));
    }

    #[tokio::test]
    async fn metrics_count_outcomes() {
        let coordinator = ToolCoordinator::default();
        let registry = registry_with_echo();

        coordinator.handle_request(echo_request("ok"), &registry).await.unwrap();
        coordinator
            .handle_request(ToolRequest::new("bad", "Missing", ToolInput::new()), &registry)
            .await
            .unwrap();
        coordinator.await_result(&"ok".into()).await;

        let metrics = coordinator.metrics();
        assert_eq!(metrics.accepted, 2);
        assert_eq!(metrics.succeeded, 1);
        assert_eq!(metrics.failed, 1);
        assert_eq!(metrics.consumed, 1);
    }

    #[test]
    fn panic_message_variants() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "unknown panic");
    }
}
