//! Correlation identifier linking a tool request to its result.
//!
//! Correlation ids are supplied by the caller and treated as opaque tokens.
//! Callers without their own id scheme can mint a TypeID such as
//! `corr_01h455vb4pex5vsknk084sn02q` with [`CorrelationId::generate`].

use mti::prelude::*;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Caller-supplied token identifying one in-flight tool request.
///
/// Serializes as a bare string so it matches the `tool_id` field the agent
/// process sends.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// The TypeID prefix used by [`CorrelationId::generate`].
    pub const PREFIX: &'static str = "corr";

    /// Wraps a caller-supplied id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mints a fresh, time-sortable id with a UUIDv7 payload.
    #[must_use]
    pub fn generate() -> Self {
        Self(Self::PREFIX.create_type_id::<V7>().to_string())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id, returning the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CorrelationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CorrelationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for CorrelationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CorrelationId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn generated_ids_carry_prefix() {
        let id = CorrelationId::generate();
        assert!(id.as_str().starts_with("corr_"));
    }

    #[test]
    fn generated_ids_are_unique() {
        let id1 = CorrelationId::generate();
        let id2 = CorrelationId::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn caller_supplied_ids_are_kept_verbatim() {
        let id = CorrelationId::new("toolu_01ABC");
        assert_eq!(id.as_str(), "toolu_01ABC");
        assert_eq!(id.to_string(), "toolu_01ABC");
    }

    #[test]
    fn map_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(CorrelationId::from("t1"), 1);
        assert_eq!(map.get("t1"), Some(&1));
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = CorrelationId::from("t1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"t1\"");

        let parsed: CorrelationId = serde_json::from_str("\"t2\"").unwrap();
        assert_eq!(parsed.as_str(), "t2");
    }
}
