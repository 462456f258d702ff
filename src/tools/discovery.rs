//! Capability discovery.
//!
//! Discovery is the single explicit registration step a host runs while it
//! is built. Applications hand over handler specs, either inline through the
//! host builder or from a [`ToolProvider`], and each spec that resolves is
//! put into the registry. Specs that cannot be resolved are logged and
//! skipped; discovery itself never fails.

use crate::tools::error::{ToolError, ToolErrorKind};
use crate::tools::handler::{ExecutionMode, SharedHandler};
use crate::tools::registry::HandlerRegistry;
use crate::types::CapabilityName;
use std::fmt;
use std::sync::Arc;

/// A handler ready to be registered.
#[derive(Clone)]
pub struct HandlerSpec {
    /// Name the handler is registered under
    pub capability_name: CapabilityName,
    /// Where the tool runs
    pub execution_mode: ExecutionMode,
    /// The handler itself
    pub handler: SharedHandler,
}

impl HandlerSpec {
    /// Creates a spec from an already validated name.
    #[must_use]
    pub fn new(
        capability_name: CapabilityName,
        execution_mode: ExecutionMode,
        handler: SharedHandler,
    ) -> Self {
        Self {
            capability_name,
            execution_mode,
            handler,
        }
    }

    /// Creates a spec from a raw name, validating it.
    ///
    /// # Errors
    ///
    /// Returns a discovery fault when the name is not a valid capability name.
    pub fn named(
        capability_name: impl Into<String>,
        execution_mode: ExecutionMode,
        handler: SharedHandler,
    ) -> Result<Self, ToolError> {
        let raw = capability_name.into();
        let capability_name = CapabilityName::parse(raw.clone())
            .map_err(|e| ToolError::discovery_fault(Some(raw), e.to_string()))?;
        Ok(Self::new(capability_name, execution_mode, handler))
    }
}

impl fmt::Debug for HandlerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerSpec")
            .field("capability_name", &self.capability_name)
            .field("execution_mode", &self.execution_mode)
            .finish_non_exhaustive()
    }
}

/// An application object that exposes capability handlers.
///
/// The provider receives itself as an `Arc` so the handlers it returns can
/// capture the owning object.
///
/// # Example
///
/// ```rust
/// use acton_tool_rendezvous::tools::{
///     handler_fn, ExecutionMode, HandlerOutcome, HandlerSpec, ToolError, ToolInput, ToolProvider,
/// };
/// use acton_tool_rendezvous::types::CorrelationId;
/// use std::sync::Arc;
///
/// struct Greeter {
///     greeting: String,
/// }
///
/// impl ToolProvider for Greeter {
///     fn handler_specs(self: Arc<Self>) -> Vec<Result<HandlerSpec, ToolError>> {
///         let this = Arc::clone(&self);
///         let greet = handler_fn(move |_id: CorrelationId, _input: ToolInput| {
///             let text = this.greeting.clone();
///             async move { HandlerOutcome::success(text) }
///         });
///         vec![HandlerSpec::named("Greet", ExecutionMode::ViaLocalLogic, greet)]
///     }
/// }
/// ```
pub trait ToolProvider: Send + Sync + 'static {
    /// Returns the handler specs this provider exposes.
    fn handler_specs(self: Arc<Self>) -> Vec<Result<HandlerSpec, ToolError>>;
}

/// Summary of one discovery pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Names registered, in discovery order
    pub registered: Vec<CapabilityName>,
    /// Specs that were skipped
    pub skipped: Vec<ToolError>,
}

impl DiscoveryReport {
    /// Folds another report into this one.
    pub fn merge(&mut self, other: DiscoveryReport) {
        self.registered.extend(other.registered);
        self.skipped.extend(other.skipped);
    }
}

/// Registers every resolvable spec and skips the rest.
pub fn discover_into<I>(registry: &mut HandlerRegistry, specs: I) -> DiscoveryReport
where
    I: IntoIterator<Item = Result<HandlerSpec, ToolError>>,
{
    let mut report = DiscoveryReport::default();

    for spec in specs {
        match spec {
            Ok(spec) => {
                tracing::debug!(
                    capability = %spec.capability_name,
                    execution_mode = %spec.execution_mode,
                    "Registering tool handler"
                );
                registry.register(spec.capability_name.clone(), spec.handler, spec.execution_mode);
                report.registered.push(spec.capability_name);
            }
            Err(error) => {
                let error = match error.kind() {
                    ToolErrorKind::DiscoveryAccessFault { .. } => error,
                    _ => ToolError::discovery_fault(None, error.agent_message()),
                };
                tracing::warn!(error = %error, "Skipping handler spec");
                report.skipped.push(error);
            }
        }
    }

    report
}
