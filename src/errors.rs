use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-specific error types.
#[derive(Debug)]
pub enum AppError {
    /// Database-related errors.
    DatabaseError(sqlx::Error),
    /// Resource not found error.
    NotFound(String),
    /// Bad request error (invalid input).
    BadRequest(String),
    /// Unauthorized access error.
    Unauthorized(String),
    /// Wallet balance is below the cost of the requested lookup.
    InsufficientCredits {
        /// Credits required by the requested service.
        required: i32,
        /// Credits currently available in the wallet.
        available: i32,
    },
    /// The external gateway could not be reached (transport failure/timeout).
    UpstreamUnavailable(String),
    /// The external gateway answered but with a failure or unparseable body.
    UpstreamError(String),
    /// A payment callback carried a signature that does not verify.
    InvalidSignature,
    /// A local write failed after the paired external call already succeeded.
    PersistenceError(String),
    /// A required secret or endpoint is not configured.
    ConfigurationError(String),
    /// Internal server error.
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::DatabaseError(e) => write!(f, "Database error: {}", e),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::InsufficientCredits {
                required,
                available,
            } => write!(
                f,
                "Insufficient credits. Required: {}, Available: {}",
                required, available
            ),
            AppError::UpstreamUnavailable(msg) => write!(f, "Upstream unreachable: {}", msg),
            AppError::UpstreamError(msg) => write!(f, "Upstream error: {}", msg),
            AppError::InvalidSignature => write!(f, "Invalid signature"),
            AppError::PersistenceError(msg) => write!(f, "Persistence error: {}", msg),
            AppError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Maps each error variant to an appropriate HTTP status code and JSON body.
    /// Logs errors appropriately based on their severity.
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::DatabaseError(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized access: {}", msg);
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }
            AppError::InsufficientCredits { .. } => {
                (StatusCode::PAYMENT_REQUIRED, self.to_string())
            }
            AppError::UpstreamUnavailable(msg) => {
                tracing::error!("Upstream unreachable: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "External API unreachable".to_string(),
                )
            }
            AppError::UpstreamError(msg) => {
                tracing::error!("Upstream error: {}", msg);
                (StatusCode::BAD_GATEWAY, "External API failed".to_string())
            }
            AppError::InvalidSignature => {
                tracing::warn!("Payment callback with invalid signature");
                (StatusCode::BAD_REQUEST, "Invalid signature".to_string())
            }
            AppError::PersistenceError(msg) => {
                // Money or quota is at risk here: the external side already
                // succeeded but the local write did not. Log loudly.
                tracing::error!(
                    "PERSISTENCE FAILURE after successful upstream call: {}",
                    msg
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::ConfigurationError(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Configuration error".to_string(),
                )
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err)
    }
}

impl From<reqwest::Error> for AppError {
    /// Converts a `reqwest::Error` into an `AppError`.
    ///
    /// Transport-level failures (connect, timeout) map to `UpstreamUnavailable`;
    /// everything else (decode errors and the like) maps to `UpstreamError`.
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            AppError::UpstreamUnavailable(err.to_string())
        } else {
            AppError::UpstreamError(err.to_string())
        }
    }
}
