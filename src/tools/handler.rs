//! Tool handler trait and outcome type.
//!
//! A handler receives the correlation id and input of one request and
//! returns a [`HandlerOutcome`]. Refusal is an ordinary outcome rather than
//! an error, so handlers can deny a request without unwinding.

use crate::tools::request::ToolInput;
use crate::types::CorrelationId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// What a handler produced for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// The handler completed and produced result text
    Success(String),
    /// The handler refused the request
    Denied {
        /// Message passed back to the agent
        message: String,
        /// Whether the agent session as a whole should be aborted
        interrupt: bool,
    },
    /// The handler failed
    Faulted(String),
}

impl HandlerOutcome {
    /// Creates a success outcome.
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self::Success(text.into())
    }

    /// Creates a denial that only fails this tool call.
    #[must_use]
    pub fn denied(message: impl Into<String>) -> Self {
        Self::Denied {
            message: message.into(),
            interrupt: false,
        }
    }

    /// Creates a denial that also asks the agent session to abort.
    #[must_use]
    pub fn denied_with_interrupt(message: impl Into<String>) -> Self {
        Self::Denied {
            message: message.into(),
            interrupt: true,
        }
    }

    /// Creates a fault outcome.
    #[must_use]
    pub fn faulted(reason: impl Into<String>) -> Self {
        Self::Faulted(reason.into())
    }
}

impl<E: fmt::Display> From<Result<String, E>> for HandlerOutcome {
    fn from(result: Result<String, E>) -> Self {
        match result {
            Ok(text) => Self::Success(text),
            Err(e) => Self::Faulted(e.to_string()),
        }
    }
}

/// Where a tool actually runs.
///
/// The serialized names match the labels the agent process uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// The agent runs the tool itself; the handler is informational
    #[serde(rename = "claude")]
    InlineOnAgent,
    /// The handler delegates the work to durable subtasks
    #[serde(rename = "activity")]
    ViaDurableSubtask,
    /// The handler runs in the actor's own context
    #[default]
    #[serde(rename = "workflow")]
    ViaLocalLogic,
}

impl ExecutionMode {
    /// Returns the wire label for this mode.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InlineOnAgent => "claude",
            Self::ViaDurableSubtask => "activity",
            Self::ViaLocalLogic => "workflow",
        }
    }

    /// Returns true if requests for this capability should be routed to the
    /// actor instead of running on the agent.
    #[must_use]
    pub fn intercepts(&self) -> bool {
        !matches!(self, Self::InlineOnAgent)
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A capability handler.
///
/// Handlers may suspend, for example while waiting on a durable subtask.
/// They must not hold on to host state beyond a single invocation.
///
/// # Example
///
/// ```rust
/// use acton_tool_rendezvous::tools::{HandlerOutcome, ToolHandler, ToolInput};
/// use acton_tool_rendezvous::types::CorrelationId;
/// use async_trait::async_trait;
///
/// struct Bash;
///
/// #[async_trait]
/// impl ToolHandler for Bash {
///     async fn call(&self, _id: CorrelationId, input: ToolInput) -> HandlerOutcome {
///         let command = input.get("command").and_then(|v| v.as_str()).unwrap_or_default();
///         if command.contains("rm -rf") {
///             return HandlerOutcome::denied("Dangerous command blocked");
///         }
///         HandlerOutcome::success(format!("ran: {command}"))
///     }
/// }
/// ```
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Handles one invocation.
    async fn call(&self, correlation_id: CorrelationId, input: ToolInput) -> HandlerOutcome;
}

/// A shared, type-erased handler.
pub type SharedHandler = Arc<dyn ToolHandler>;

/// Adapts an async closure into a [`ToolHandler`].
pub struct FnHandler<F> {
    f: F,
}

impl<F> FnHandler<F> {
    /// Wraps the closure.
    #[must_use]
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut> ToolHandler for FnHandler<F>
where
    F: Fn(CorrelationId, ToolInput) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerOutcome> + Send + 'static,
{
    async fn call(&self, correlation_id: CorrelationId, input: ToolInput) -> HandlerOutcome {
        (self.f)(correlation_id, input).await
    }
}

/// Builds a shared handler from an async closure.
pub fn handler_fn<F, Fut>(f: F) -> SharedHandler
where
    F: Fn(CorrelationId, ToolInput) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerOutcome> + Send + 'static,
{
    Arc::new(FnHandler::new(f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outcome_from_result() {
        let ok: HandlerOutcome = Ok::<_, std::io::Error>("done".to_string()).into();
        assert_eq!(ok, HandlerOutcome::success("done"));

        let err: HandlerOutcome =
            Err::<String, _>(std::io::Error::other("disk full")).into();
        assert_eq!(err, HandlerOutcome::faulted("disk full"));
    }

    #[test]
    fn denial_constructors() {
        assert_eq!(
            HandlerOutcome::denied("no"),
            HandlerOutcome::Denied {
                message: "no".into(),
                interrupt: false
            }
        );
        assert!(matches!(
            HandlerOutcome::denied_with_interrupt("stop"),
            HandlerOutcome::Denied {
                interrupt: true,
                ..
            }
        ));
    }

    #[test]
    fn execution_mode_default_is_local() {
        assert_eq!(ExecutionMode::default(), ExecutionMode::ViaLocalLogic);
    }

    #[test]
    fn execution_mode_wire_labels() {
        assert_eq!(
            serde_json::to_value(ExecutionMode::InlineOnAgent).unwrap(),
            json!("claude")
        );
        assert_eq!(
            serde_json::from_value::<ExecutionMode>(json!("activity")).unwrap(),
            ExecutionMode::ViaDurableSubtask
        );
        assert_eq!(ExecutionMode::ViaLocalLogic.to_string(), "workflow");
    }

    #[test]
    fn only_inline_mode_skips_interception() {
        assert!(!ExecutionMode::InlineOnAgent.intercepts());
        assert!(ExecutionMode::ViaDurableSubtask.intercepts());
        assert!(ExecutionMode::ViaLocalLogic.intercepts());
    }

    #[tokio::test]
    async fn closure_handler_receives_id_and_input() {
        let handler = handler_fn(|id: CorrelationId, input: ToolInput| async move {
            HandlerOutcome::success(format!("{}:{}", id, input.len()))
        });

        let mut input = ToolInput::new();
        input.insert("x".into(), json!(1));

        let outcome = handler.call(CorrelationId::from("t1"), input).await;
        assert_eq!(outcome, HandlerOutcome::success("t1:1"));
    }
}
