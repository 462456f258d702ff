//! Builder for [`ToolHost`].
//!
//! Handlers are collected in call order and registered in one discovery
//! pass when [`ToolHostBuilder::build`] runs, so a later registration under
//! the same name replaces an earlier one.

use crate::coordinator::panic_message;
use crate::host::{ToolHost, ToolHostConfig};
use crate::logging::init_and_store_logging;
use crate::tools::{
    discover_into, ExecutionMode, FnHandler, HandlerOutcome, HandlerRegistry, HandlerSpec,
    ToolError, ToolHandler, ToolInput, ToolProvider,
};
use crate::types::CorrelationId;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Configures and builds a [`ToolHost`].
///
/// # Example
///
/// ```rust
/// use acton_tool_rendezvous::prelude::*;
///
/// let host = ToolHost::builder()
///     .config(ToolHostConfig::new().with_name("coding-agent"))
///     .handler("Bash", ExecutionMode::ViaLocalLogic, |_id, input| async move {
///         let command = input.get("command").and_then(|v| v.as_str()).unwrap_or_default();
///         if command.contains("rm -rf") {
///             HandlerOutcome::denied("Dangerous command blocked")
///         } else {
///             HandlerOutcome::success(format!("ran: {command}"))
///         }
///     })
///     .build();
///
/// assert_eq!(host.list_registered_capabilities().len(), 1);
/// ```
#[derive(Default)]
pub struct ToolHostBuilder {
    config: ToolHostConfig,
    specs: Vec<Result<HandlerSpec, ToolError>>,
}

impl ToolHostBuilder {
    /// Replaces the host configuration.
    #[must_use]
    pub fn config(mut self, config: ToolHostConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the host name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Sets the in-flight limit. Zero means unbounded.
    #[must_use]
    pub fn max_in_flight(mut self, max: usize) -> Self {
        self.config.max_in_flight = max;
        self
    }

    /// Registers an async closure as the handler for `name`.
    ///
    /// An invalid name is reported by discovery and skipped; it does not
    /// fail the build.
    #[must_use]
    pub fn handler<F, Fut>(self, name: impl Into<String>, mode: ExecutionMode, f: F) -> Self
    where
        F: Fn(CorrelationId, ToolInput) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerOutcome> + Send + 'static,
    {
        self.handler_with(name, mode, FnHandler::new(f))
    }

    /// Registers a [`ToolHandler`] implementation for `name`.
    #[must_use]
    pub fn handler_with(
        mut self,
        name: impl Into<String>,
        mode: ExecutionMode,
        handler: impl ToolHandler + 'static,
    ) -> Self {
        self.specs
            .push(HandlerSpec::named(name, mode, Arc::new(handler)));
        self
    }

    /// Adds a pre-built handler spec, or a failure to build one.
    #[must_use]
    pub fn spec(mut self, spec: Result<HandlerSpec, ToolError>) -> Self {
        self.specs.push(spec);
        self
    }

    /// Adds every handler a provider exposes.
    ///
    /// A provider that panics while listing its handlers contributes none;
    /// the panic is recorded as a skipped spec and the build goes on.
    #[must_use]
    pub fn provider<P: ToolProvider>(mut self, provider: Arc<P>) -> Self {
        match panic::catch_unwind(AssertUnwindSafe(|| provider.handler_specs())) {
            Ok(specs) => self.specs.extend(specs),
            Err(payload) => {
                let reason = format!(
                    "provider {} panicked: {}",
                    std::any::type_name::<P>(),
                    panic_message(payload.as_ref())
                );
                self.specs.push(Err(ToolError::discovery_fault(None, reason)));
            }
        }
        self
    }

    /// Runs discovery and builds the host.
    ///
    /// If the configuration enables file logging, it is initialized here. A
    /// logging failure is reported as a warning and does not stop the build.
    #[must_use]
    pub fn build(self) -> ToolHost {
        if let Some(ref logging) = self.config.logging {
            if let Err(e) = init_and_store_logging(logging) {
                tracing::warn!(error = %e, "File logging not initialized");
            }
        }

        let mut registry = HandlerRegistry::new();
        let report = discover_into(&mut registry, self.specs);

        tracing::info!(
            host = %self.config.name,
            registered = registry.len(),
            skipped = report.skipped.len(),
            max_in_flight = self.config.max_in_flight,
            "Tool host ready"
        );

        ToolHost::from_parts(self.config, registry, report)
    }
}

impl fmt::Debug for ToolHostBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolHostBuilder")
            .field("config", &self.config)
            .field("specs", &self.specs.len())
            .finish()
    }
}
