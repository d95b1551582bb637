// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::AuthError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 404 Not Found
    NotFound(String),

    // 405 Method Not Allowed
    MethodNotAllowed(String),

    // 422 Unprocessable Entity
    Unprocessable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::MethodNotAllowed(_) => 405,
            ApiError::Unprocessable(_) => 422,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::MethodNotAllowed(msg) => msg,
            ApiError::Unprocessable(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "error": self.status_code(),
            "message": self.message(),
        })
    }
}

// Static constructor methods with the canonical wire messages
impl ApiError {
    pub fn bad_request() -> Self {
        ApiError::BadRequest("Bad request".to_string())
    }

    pub fn not_found() -> Self {
        ApiError::NotFound("Resource not found".to_string())
    }

    pub fn method_not_allowed() -> Self {
        ApiError::MethodNotAllowed("Method not allowed".to_string())
    }

    pub fn unprocessable() -> Self {
        ApiError::Unprocessable("unprocessable".to_string())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

/// Union of the two error families a handler can produce.
///
/// Store/serialization failures surface as [`ApiError`] with a plain message
/// body; authorization failures keep their structured code/description body.
#[derive(Debug)]
pub enum RequestError {
    Api(ApiError),
    Auth(AuthError),
}

impl From<ApiError> for RequestError {
    fn from(err: ApiError) -> Self {
        RequestError::Api(err)
    }
}

impl From<AuthError> for RequestError {
    fn from(err: AuthError) -> Self {
        RequestError::Auth(err)
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> axum::response::Response {
        match self {
            RequestError::Api(err) => err.into_response(),
            RequestError::Auth(err) => err.into_response(),
        }
    }
}
