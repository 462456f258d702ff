//! Capability name type.
//!
//! A capability name is the key a tool handler is registered under, such as
//! `Read`, `Write`, or `Bash`. Names are case-sensitive and must be non-empty.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Maximum accepted length of a capability name, in bytes.
pub const CAPABILITY_NAME_LEN_MAX: usize = 128;

/// A validated capability name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CapabilityName(String);

/// Error returned when a string is not a usable capability name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidCapabilityName {
    /// The name was empty or whitespace only
    Empty,
    /// The name exceeded [`CAPABILITY_NAME_LEN_MAX`]
    TooLong {
        /// Length of the rejected name
        len: usize,
    },
}

impl fmt::Display for InvalidCapabilityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "capability name cannot be empty"),
            Self::TooLong { len } => write!(
                f,
                "capability name is {len} bytes; the limit is {CAPABILITY_NAME_LEN_MAX}"
            ),
        }
    }
}

impl std::error::Error for InvalidCapabilityName {}

impl CapabilityName {
    /// Parses and validates a capability name.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCapabilityName::Empty` for empty or blank names and
    /// `InvalidCapabilityName::TooLong` when the name exceeds the length limit.
    pub fn parse(name: impl Into<String>) -> Result<Self, InvalidCapabilityName> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(InvalidCapabilityName::Empty);
        }
        if name.len() > CAPABILITY_NAME_LEN_MAX {
            return Err(InvalidCapabilityName::TooLong { len: name.len() });
        }
        Ok(Self(name))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapabilityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CapabilityName {
    type Err = InvalidCapabilityName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CapabilityName {
    type Error = InvalidCapabilityName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<CapabilityName> for String {
    fn from(value: CapabilityName) -> Self {
        value.0
    }
}

impl AsRef<str> for CapabilityName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CapabilityName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for CapabilityName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CapabilityName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_tool_names() {
        for name in ["Read", "Write", "Bash", "mcp__github__create_issue"] {
            let parsed = CapabilityName::parse(name).unwrap();
            assert_eq!(parsed.as_str(), name);
        }
    }

    #[test]
    fn parse_rejects_blank() {
        assert_eq!(CapabilityName::parse(""), Err(InvalidCapabilityName::Empty));
        assert_eq!(CapabilityName::parse("   "), Err(InvalidCapabilityName::Empty));
    }

    #[test]
    fn parse_rejects_oversized() {
        let long = "x".repeat(CAPABILITY_NAME_LEN_MAX + 1);
        assert!(matches!(
            CapabilityName::parse(long),
            Err(InvalidCapabilityName::TooLong { .. })
        ));
    }

    #[test]
    fn deserialize_validates() {
        let ok: Result<CapabilityName, _> = serde_json::from_str("\"Echo\"");
        assert!(ok.is_ok());

        let bad: Result<CapabilityName, _> = serde_json::from_str("\"\"");
        assert!(bad.is_err());
    }

    #[test]
    fn names_are_case_sensitive() {
        let lower = CapabilityName::parse("read").unwrap();
        let upper = CapabilityName::parse("Read").unwrap();
        assert_ne!(lower, upper);
        assert!(upper == "Read");
    }
}
