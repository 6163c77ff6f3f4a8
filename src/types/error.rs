//! Error types for Amber

use hyper::StatusCode;

/// Main error type for Amber operations
#[derive(Debug, thiserror::Error)]
pub enum AmberError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AmberError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidState(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable code for JSON error bodies
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::PermissionDenied(_) => "PERMISSION_DENIED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }

}

// Implement From conversions for common error types

impl From<std::io::Error> for AmberError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for AmberError {
    fn from(err: serde_json::Error) -> Self {
        Self::BadRequest(format!("JSON error: {}", err))
    }
}

impl From<hyper::Error> for AmberError {
    fn from(err: hyper::Error) -> Self {
        Self::Internal(format!("HTTP error: {}", err))
    }
}

/// Result type alias for Amber operations
pub type Result<T> = std::result::Result<T, AmberError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(
            AmberError::NotFound("draft".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AmberError::PermissionDenied("no write access".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AmberError::Validation("Incorrect token.".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AmberError::InvalidState("draft already registered".into()).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AmberError::NotFound("x".into()).code(), "NOT_FOUND");
        assert_eq!(
            AmberError::InvalidState("x".into()).code(),
            "INVALID_STATE"
        );
    }

    #[test]
    fn test_json_error_maps_to_bad_request() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let amber: AmberError = err.into();
        assert_eq!(amber.status_code(), StatusCode::BAD_REQUEST);
    }
}
