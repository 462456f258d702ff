//! Tool request and result types.
//!
//! Both types travel between the agent process and the host, so their JSON
//! shape is fixed: requests carry `tool_id`, `tool_name`, and `input`;
//! results carry `tool_id`, `success`, `result`, `error`, and `interrupt`.

use crate::tools::error::ToolError;
use crate::tools::handler::HandlerOutcome;
use crate::types::CorrelationId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Structured input passed to a tool handler.
pub type ToolInput = Map<String, Value>;

/// A request from the agent to run a capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    /// Caller-supplied id, unique among in-flight requests
    #[serde(rename = "tool_id")]
    pub correlation_id: CorrelationId,
    /// The capability to invoke
    #[serde(rename = "tool_name")]
    pub capability_name: String,
    /// Handler input
    #[serde(default)]
    pub input: ToolInput,
}

impl ToolRequest {
    /// Creates a new tool request.
    #[must_use]
    pub fn new(
        correlation_id: impl Into<CorrelationId>,
        capability_name: impl Into<String>,
        input: ToolInput,
    ) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            capability_name: capability_name.into(),
            input,
        }
    }
}

/// Whether a tool invocation succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolOutcome {
    /// The handler produced result text
    Success,
    /// The invocation failed; see the error message
    Failure,
}

impl fmt::Display for ToolOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

/// The outcome of one tool invocation, stored until the agent fetches it.
///
/// Constructors keep the fields consistent: `result_text` is present only on
/// success, `error_message` only on failure, and `interrupt_requested` is
/// never set on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "WireToolResult", try_from = "WireToolResult")]
pub struct ToolResult {
    correlation_id: CorrelationId,
    outcome: ToolOutcome,
    result_text: Option<String>,
    error_message: Option<String>,
    interrupt_requested: bool,
}

impl ToolResult {
    /// Creates a successful result.
    #[must_use]
    pub fn success(correlation_id: CorrelationId, result_text: impl Into<String>) -> Self {
        Self {
            correlation_id,
            outcome: ToolOutcome::Success,
            result_text: Some(result_text.into()),
            error_message: None,
            interrupt_requested: false,
        }
    }

    /// Creates a failed result.
    #[must_use]
    pub fn failure(correlation_id: CorrelationId, error_message: impl Into<String>) -> Self {
        Self {
            correlation_id,
            outcome: ToolOutcome::Failure,
            result_text: None,
            error_message: Some(error_message.into()),
            interrupt_requested: false,
        }
    }

    /// Creates a failed result that asks the agent session to abort.
    #[must_use]
    pub fn interrupted(correlation_id: CorrelationId, error_message: impl Into<String>) -> Self {
        Self {
            interrupt_requested: true,
            ..Self::failure(correlation_id, error_message)
        }
    }

    /// Creates the result returned for an unknown or already consumed id.
    #[must_use]
    pub fn not_found(correlation_id: CorrelationId) -> Self {
        let error = ToolError::unknown_correlation_id(correlation_id.clone());
        Self::from_error(correlation_id, &error)
    }

    /// Converts a tool error into a failed result.
    #[must_use]
    pub fn from_error(correlation_id: CorrelationId, error: &ToolError) -> Self {
        if error.is_interrupt() {
            Self::interrupted(correlation_id, error.agent_message())
        } else {
            Self::failure(correlation_id, error.agent_message())
        }
    }

    /// Converts a handler outcome into a result.
    #[must_use]
    pub fn from_outcome(
        correlation_id: CorrelationId,
        capability: &str,
        outcome: HandlerOutcome,
    ) -> Self {
        match outcome {
            HandlerOutcome::Success(text) => Self::success(correlation_id, text),
            HandlerOutcome::Denied { message, interrupt } => {
                let error = if interrupt {
                    ToolError::denied_with_interrupt(message)
                } else {
                    ToolError::denied(message)
                };
                Self::from_error(correlation_id, &error)
            }
            HandlerOutcome::Faulted(reason) => {
                Self::from_error(correlation_id, &ToolError::handler_fault(capability, reason))
            }
        }
    }

    /// Returns the correlation id.
    #[must_use]
    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    /// Returns the outcome.
    #[must_use]
    pub fn outcome(&self) -> ToolOutcome {
        self.outcome
    }

    /// Returns true on success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome == ToolOutcome::Success
    }

    /// Returns the result text, present only on success.
    #[must_use]
    pub fn result_text(&self) -> Option<&str> {
        self.result_text.as_deref()
    }

    /// Returns the error message, present only on failure.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Returns true if the agent session should be aborted.
    #[must_use]
    pub fn interrupt_requested(&self) -> bool {
        self.interrupt_requested
    }
}

#[derive(Serialize, Deserialize)]
struct WireToolResult {
    tool_id: CorrelationId,
    success: bool,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    interrupt: bool,
}

impl From<ToolResult> for WireToolResult {
    fn from(value: ToolResult) -> Self {
        Self {
            tool_id: value.correlation_id,
            success: value.outcome == ToolOutcome::Success,
            result: value.result_text,
            error: value.error_message,
            interrupt: value.interrupt_requested,
        }
    }
}

impl TryFrom<WireToolResult> for ToolResult {
    type Error = String;

    fn try_from(wire: WireToolResult) -> Result<Self, Self::Error> {
        match (wire.success, wire.result, wire.error) {
            (true, Some(text), None) if !wire.interrupt => Ok(Self::success(wire.tool_id, text)),
            (true, _, _) => Err(format!(
                "tool result '{}' is marked successful but lacks result text or carries an error",
                wire.tool_id
            )),
            (false, None, Some(message)) => Ok(Self {
                interrupt_requested: wire.interrupt,
                ..Self::failure(wire.tool_id, message)
            }),
            (false, _, _) => Err(format!(
                "tool result '{}' is marked failed but lacks an error message or carries result text",
                wire.tool_id
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_parses_wire_shape() {
        let request: ToolRequest = serde_json::from_value(json!({
            "tool_id": "t1",
            "tool_name": "Echo",
            "input": {"x": "42"}
        }))
        .unwrap();

        assert_eq!(request.correlation_id.as_str(), "t1");
        assert_eq!(request.capability_name, "Echo");
        assert_eq!(request.input.get("x"), Some(&json!("42")));
    }

    #[test]
    fn request_input_defaults_to_empty() {
        let request: ToolRequest =
            serde_json::from_value(json!({"tool_id": "t1", "tool_name": "Echo"})).unwrap();
        assert!(request.input.is_empty());
    }

    #[test]
    fn success_has_text_and_no_error() {
        let result = ToolResult::success("t1".into(), "ok");
        assert!(result.is_success());
        assert_eq!(result.result_text(), Some("ok"));
        assert_eq!(result.error_message(), None);
        assert!(!result.interrupt_requested());
    }

    #[test]
    fn failure_has_error_and_no_text() {
        let result = ToolResult::failure("t1".into(), "boom");
        assert_eq!(result.outcome(), ToolOutcome::Failure);
        assert_eq!(result.result_text(), None);
        assert_eq!(result.error_message(), Some("boom"));
    }

    #[test]
    fn not_found_is_distinct_failure() {
        let result = ToolResult::not_found("t1".into());
        assert!(!result.is_success());
        assert_eq!(result.error_message(), Some("tool result not found"));
        assert!(!result.interrupt_requested());
    }

    #[test]
    fn denial_outcome_keeps_interrupt_flag() {
        let result = ToolResult::from_outcome(
            "t1".into(),
            "Bash",
            HandlerOutcome::Denied {
                message: "blocked".into(),
                interrupt: true,
            },
        );
        assert!(!result.is_success());
        assert_eq!(result.error_message(), Some("blocked"));
        assert!(result.interrupt_requested());
    }

    #[test]
    fn faulted_outcome_never_interrupts() {
        let result =
            ToolResult::from_outcome("t1".into(), "Read", HandlerOutcome::Faulted("eof".into()));
        assert_eq!(result.error_message(), Some("eof"));
        assert!(!result.interrupt_requested());
    }

    #[test]
    fn result_serializes_to_wire_shape() {
        let value = serde_json::to_value(ToolResult::interrupted("t2".into(), "stop")).unwrap();
        assert_eq!(
            value,
            json!({
                "tool_id": "t2",
                "success": false,
                "result": null,
                "error": "stop",
                "interrupt": true
            })
        );
    }

    #[test]
    fn inconsistent_wire_result_is_rejected() {
        let parsed: Result<ToolResult, _> = serde_json::from_value(json!({
            "tool_id": "t3",
            "success": true,
            "error": "both"
        }));
        assert!(parsed.is_err());
    }
}
