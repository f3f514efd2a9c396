use docket_core::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Binary evidence forwarded to the capability alongside the prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    pub data_base64: String,
    pub media_type: String,
}

#[derive(Debug, Clone)]
pub struct CapabilityRequest {
    /// Short task label ("investigator", "clerk", ...) used in error
    /// details and logs; the provider does not see it.
    pub task: &'static str,
    pub model: String,
    pub prompt: String,
    pub attachment: Option<Attachment>,
}

/// One round-trip to the external language-model capability.
///
/// Three-way contract:
/// - `Ok(Some(value))`: populated structured result; individual fields
///   inside the value may still be absent.
/// - `Ok(None)`: the provider answered with a blank response.
/// - `Err(_)`: transport, provider, or decode failure.
///
/// Nothing is swallowed here; converting failures into renderable results
/// is the stage functions' job.
pub trait Capability {
    fn invoke(&self, req: &CapabilityRequest) -> Result<Option<Value>, AppError>;
}

pub mod gateway_capability;
