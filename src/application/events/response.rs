//! The uniform response envelope returned for request-style events.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::foundation::{DomainError, ErrorCode};

/// Result of one handler for one inbound event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventResponse {
    pub event: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl EventResponse {
    /// A successful response with a payload.
    pub fn success(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            success: true,
            data: Some(data),
        }
    }

    /// A successful response built from any serializable payload.
    pub fn success_from<T: Serialize>(
        event: impl Into<String>,
        data: &T,
    ) -> Result<Self, DomainError> {
        let data = serde_json::to_value(data).map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Failed to serialize response: {}", e),
            )
        })?;
        Ok(Self::success(event, data))
    }

    /// A failed response describing the error that caused it.
    pub fn failure(event: impl Into<String>, error: &DomainError) -> Self {
        Self {
            event: event.into(),
            success: false,
            data: Some(json!({
                "code": error.code.to_string(),
                "message": error.message,
            })),
        }
    }
}
