use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Error category carried across a channel between the two facades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadRequest,
    NotFound,
    Canceled,
    Internal,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::BadRequest => "bad_request",
            ErrorCode::NotFound => "not_found",
            ErrorCode::Canceled => "canceled",
            ErrorCode::Internal => "internal",
        };
        write!(f, "{}", s)
    }
}

/// Failure returned by a handler or an invocation.
///
/// The metadata and facade builders never produce one of these themselves;
/// they only pass through whatever a handler or transport returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        RpcError {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(code: ErrorCode, message: impl Into<String>, data: Value) -> Self {
        RpcError {
            code,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn canceled(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Canceled, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for RpcError {}

/// Error parsing a configuration document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = RpcError::new(ErrorCode::BadRequest, "Invalid input");
        assert_eq!(err.code, ErrorCode::BadRequest);
        assert_eq!(err.message, "Invalid input");
        assert_eq!(err.data, None);
    }

    #[test]
    fn test_error_with_data() {
        let data = serde_json::json!({"channel": "ns:m1"});
        let err = RpcError::with_data(ErrorCode::Internal, "handler failed", data.clone());
        assert_eq!(err.code, ErrorCode::Internal);
        assert_eq!(err.data, Some(data));
    }

    #[test]
    fn test_convenience_constructors() {
        assert_eq!(RpcError::bad_request("x").code, ErrorCode::BadRequest);
        assert_eq!(RpcError::not_found("x").code, ErrorCode::NotFound);
        assert_eq!(RpcError::canceled("x").code, ErrorCode::Canceled);
        assert_eq!(RpcError::internal("x").code, ErrorCode::Internal);
    }

    #[test]
    fn test_error_serialization_skips_empty_data() {
        let err = RpcError::not_found("no handler for 'ns:m3'");
        let json = serde_json::to_string(&err).unwrap();
        assert!(!json.contains("\"data\""));
        assert!(json.contains("\"not_found\""));
        let deserialized: RpcError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, deserialized);
    }

    #[test]
    fn test_error_display() {
        let err = RpcError::internal("Something went wrong");
        assert_eq!(err.to_string(), "internal: Something went wrong");
    }
}
