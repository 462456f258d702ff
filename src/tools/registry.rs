//! Handler registry.
//!
//! Maps capability names to handlers for one host instance. The registry is
//! plain data: it is filled once while the host is built and only read
//! afterwards, so it needs no locking.

use crate::tools::handler::{ExecutionMode, SharedHandler};
use crate::types::CapabilityName;
use std::collections::HashMap;
use std::fmt;

/// A registered handler and its metadata.
#[derive(Clone)]
pub struct HandlerEntry {
    capability_name: CapabilityName,
    execution_mode: ExecutionMode,
    handler: SharedHandler,
}

impl HandlerEntry {
    /// Returns the capability this entry is registered under.
    #[must_use]
    pub fn capability_name(&self) -> &CapabilityName {
        &self.capability_name
    }

    /// Returns where the tool runs.
    #[must_use]
    pub fn execution_mode(&self) -> ExecutionMode {
        self.execution_mode
    }

    /// Returns the handler.
    #[must_use]
    pub fn handler(&self) -> &SharedHandler {
        &self.handler
    }
}

impl fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("capability_name", &self.capability_name)
            .field("execution_mode", &self.execution_mode)
            .finish_non_exhaustive()
    }
}

/// Registry of capability handlers, one entry per name.
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<CapabilityName, HandlerEntry>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler, replacing any earlier entry with the same name.
    ///
    /// Returns the replaced entry, if there was one.
    pub fn register(
        &mut self,
        name: CapabilityName,
        handler: SharedHandler,
        execution_mode: ExecutionMode,
    ) -> Option<HandlerEntry> {
        let entry = HandlerEntry {
            capability_name: name.clone(),
            execution_mode,
            handler,
        };
        let replaced = self.handlers.insert(name, entry);

        if let Some(ref previous) = replaced {
            tracing::debug!(
                capability = %previous.capability_name,
                previous_mode = %previous.execution_mode,
                execution_mode = %execution_mode,
                "Handler replaced"
            );
        }

        replaced
    }

    /// Looks up a handler by capability name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&HandlerEntry> {
        self.handlers.get(name)
    }

    /// Returns true if a handler is registered under `name`.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Returns every registered capability name, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<CapabilityName> {
        let mut names: Vec<CapabilityName> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the sorted names whose requests should be routed to the actor.
    #[must_use]
    pub fn intercepted_names(&self) -> Vec<CapabilityName> {
        let mut names: Vec<CapabilityName> = self
            .handlers
            .values()
            .filter(|entry| entry.execution_mode.intercepts())
            .map(|entry| entry.capability_name.clone())
            .collect();
        names.sort();
        names
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::handler::{handler_fn, HandlerOutcome};
    use crate::tools::request::ToolInput;
    use crate::types::CorrelationId;

    fn name(s: &str) -> CapabilityName {
        CapabilityName::parse(s).unwrap()
    }

    fn constant(text: &'static str) -> SharedHandler {
        handler_fn(move |_id: CorrelationId, _input: ToolInput| async move {
            HandlerOutcome::success(text)
        })
    }

    #[test]
    fn register_then_has() {
        let mut registry = HandlerRegistry::new();
        registry.register(name("TestTool"), constant("r"), ExecutionMode::ViaLocalLogic);

        assert!(registry.has("TestTool"));
        assert!(!registry.has("OtherTool"));

        let entry = registry.get("TestTool").unwrap();
        assert_eq!(entry.capability_name(), &name("TestTool"));
        assert_eq!(entry.execution_mode(), ExecutionMode::ViaLocalLogic);
    }

    #[tokio::test]
    async fn last_registration_wins() {
        let mut registry = HandlerRegistry::new();
        assert!(registry
            .register(name("Echo"), constant("first"), ExecutionMode::ViaLocalLogic)
            .is_none());
        let replaced =
            registry.register(name("Echo"), constant("second"), ExecutionMode::ViaDurableSubtask);

        assert_eq!(
            replaced.map(|e| e.execution_mode()),
            Some(ExecutionMode::ViaLocalLogic)
        );
        assert_eq!(registry.len(), 1);

        let entry = registry.get("Echo").unwrap();
        assert_eq!(entry.execution_mode(), ExecutionMode::ViaDurableSubtask);
        let outcome = entry
            .handler()
            .call(CorrelationId::from("t1"), ToolInput::new())
            .await;
        assert_eq!(outcome, HandlerOutcome::success("second"));
    }

    #[test]
    fn names_are_sorted() {
        let mut registry = HandlerRegistry::new();
        for n in ["Write", "Bash", "Read"] {
            registry.register(name(n), constant("x"), ExecutionMode::default());
        }
        let names: Vec<String> = registry.names().into_iter().map(String::from).collect();
        assert_eq!(names, vec!["Bash", "Read", "Write"]);
    }

    #[test]
    fn intercepted_names_skip_inline_tools() {
        let mut registry = HandlerRegistry::new();
        registry.register(name("Read"), constant("x"), ExecutionMode::InlineOnAgent);
        registry.register(name("Write"), constant("x"), ExecutionMode::ViaDurableSubtask);

        assert_eq!(registry.intercepted_names(), vec![name("Write")]);
        assert_eq!(registry.names().len(), 2);
    }

    #[test]
    fn empty_registry() {
        let registry = HandlerRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get("anything").is_none());
    }
}
