//! Core identifier types.
//!
//! - `CorrelationId`: links a tool request to its result
//! - `CapabilityName`: the key a tool handler is registered under

mod capability_name;
mod correlation_id;

pub use capability_name::{CapabilityName, InvalidCapabilityName, CAPABILITY_NAME_LEN_MAX};
pub use correlation_id::CorrelationId;
