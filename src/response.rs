use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// JSON error body. Caller mistakes carry only `error`; upstream failures
/// carry a human-readable `message` plus the upstream detail in `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl ErrorResponse {
    pub fn error(error: impl Into<String>) -> Self {
        Self {
            message: None,
            error: Some(Value::String(error.into())),
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn upstream(message: impl Into<String>, error: Value) -> Self {
        Self {
            message: Some(message.into()),
            error: Some(error),
        }
    }
}
