//! Response types for the workforce engine API.
//!
//! This module defines the error body returned by every endpoint and the
//! mapping from [`EngineError`] to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    fn new(status: StatusCode, code: &str, error: &EngineError) -> Self {
        Self {
            status,
            error: ApiError::new(code, error.to_string()),
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match &error {
            EngineError::ConfigNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            },
            EngineError::ConfigParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            },
            EngineError::PolicyNotFound { table } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "POLICY_NOT_FOUND",
                    error.to_string(),
                    format!("The policy has no entry at '{}'", table),
                ),
            },
            EngineError::InvalidPolicy { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_POLICY", &error)
            }
            EngineError::NoActiveSession { .. } => {
                Self::new(StatusCode::CONFLICT, "NO_ACTIVE_SESSION", &error)
            }
            EngineError::SessionAlreadyOpen { .. } => {
                Self::new(StatusCode::CONFLICT, "SESSION_ALREADY_OPEN", &error)
            }
            EngineError::InsufficientBalance { .. } => {
                Self::new(StatusCode::CONFLICT, "INSUFFICIENT_BALANCE", &error)
            }
            EngineError::UnknownLeaveType { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "UNKNOWN_LEAVE_TYPE", &error)
            }
            EngineError::TaskNotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, "TASK_NOT_FOUND", &error)
            }
            EngineError::TaskAlreadyCompleted { .. } => {
                Self::new(StatusCode::CONFLICT, "TASK_ALREADY_COMPLETED", &error)
            }
            EngineError::ProjectNotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, "PROJECT_NOT_FOUND", &error)
            }
            EngineError::LeaveApplicationNotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, "LEAVE_APPLICATION_NOT_FOUND", &error)
            }
            EngineError::LeaveApplicationNotPending { .. } => {
                Self::new(StatusCode::CONFLICT, "LEAVE_APPLICATION_NOT_PENDING", &error)
            }
            EngineError::InvalidRecord { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_RECORD", &error)
            }
            EngineError::StorageError { message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("STORAGE_ERROR", "Storage failure", message.clone()),
            },
            EngineError::CalculationError { message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CALCULATION_ERROR",
                    "Calculation failed",
                    message.clone(),
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details")); // Should be skipped when None
    }

    #[test]
    fn test_api_error_with_details_serialization() {
        let error = ApiError::with_details("TEST_ERROR", "Test message", "Some details");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"details\":\"Some details\""));
    }

    #[test]
    fn test_session_errors_are_conflicts() {
        let api_error: ApiErrorResponse = EngineError::NoActiveSession {
            employee_id: "emp_001".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::CONFLICT);
        assert_eq!(api_error.error.code, "NO_ACTIVE_SESSION");
        assert!(api_error.error.message.contains("emp_001"));
    }

    #[test]
    fn test_missing_entities_are_not_found() {
        let api_error: ApiErrorResponse = EngineError::ProjectNotFound {
            project_id: "alpha".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::NOT_FOUND);
        assert_eq!(api_error.error.code, "PROJECT_NOT_FOUND");
    }

    #[test]
    fn test_policy_misconfiguration_is_server_error() {
        let api_error: ApiErrorResponse = EngineError::PolicyNotFound {
            table: "payroll.salary_structure.engineer.principal".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            api_error.error.details.as_deref(),
            Some("The policy has no entry at 'payroll.salary_structure.engineer.principal'")
        );
    }
}
