//! Typed error handling for the order service
//!
//! Every fallible operation in the crate returns [`OrderApiError`], so callers
//! can match on the failure category instead of inspecting strings.
//!
//! # Error Categories
//!
//! - [`EntityError`]: the referenced order does not exist
//! - [`ValidationError`]: a required field is missing or empty
//! - [`StorageError`]: connection, query or transaction failures
//! - [`ConfigError`]: configuration parsing and validation
//! - [`RequestError`]: malformed path segments, query strings or bodies
//!
//! # Example
//!
//! ```rust,ignore
//! match store.get_by_id(7).await {
//!     Ok(order) => println!("{} ordered {} items", order.customer_name, order.items.len()),
//!     Err(OrderApiError::Entity(EntityError::NotFound { id, .. })) => {
//!         println!("order {} does not exist", id);
//!     }
//!     Err(e) => eprintln!("other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Message returned to clients for every 5xx response.
const INTERNAL_MESSAGE: &str = "internal server error";

/// The main error type for the order service
#[derive(Debug, Error)]
pub enum OrderApiError {
    /// Entity lookups that matched nothing
    #[error(transparent)]
    Entity(#[from] EntityError),

    /// Input validation failures
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Storage backend errors
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// HTTP/Request errors
    #[error(transparent)]
    Request(#[from] RequestError),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl OrderApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            OrderApiError::Entity(_) => StatusCode::NOT_FOUND,
            OrderApiError::Validation(_) => StatusCode::BAD_REQUEST,
            OrderApiError::Request(_) => StatusCode::BAD_REQUEST,
            OrderApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            OrderApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            OrderApiError::Entity(e) => e.error_code(),
            OrderApiError::Validation(_) => "VALIDATION_ERROR",
            OrderApiError::Request(e) => e.error_code(),
            OrderApiError::Storage(_) => "STORAGE_ERROR",
            OrderApiError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Whether the failure is the server's fault rather than the caller's
    pub fn is_internal(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Convert to an error response
    ///
    /// Server-side failures are reported with a generic message so that
    /// driver or SQL details never reach the client.
    pub fn to_response(&self) -> ErrorResponse {
        if self.is_internal() {
            return ErrorResponse {
                code: self.error_code().to_string(),
                message: INTERNAL_MESSAGE.to_string(),
                details: None,
            };
        }
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            OrderApiError::Entity(EntityError::NotFound { entity_type, id }) => {
                Some(serde_json::json!({
                    "entity_type": entity_type,
                    "id": id,
                }))
            }
            OrderApiError::Entity(EntityError::NoneFound { entity_type, ids }) => {
                Some(serde_json::json!({
                    "entity_type": entity_type,
                    "ids": ids,
                }))
            }
            OrderApiError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for OrderApiError {
    fn into_response(self) -> Response {
        if self.is_internal() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        }
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors raised when a referenced entity does not exist
#[derive(Debug, Error)]
pub enum EntityError {
    /// A single entity was not found
    #[error("{entity_type} with id {id} not found")]
    NotFound { entity_type: &'static str, id: i64 },

    /// None of the requested entities exist
    #[error("no {entity_type} matches ids {ids:?}")]
    NoneFound {
        entity_type: &'static str,
        ids: Vec<i64>,
    },
}

impl EntityError {
    /// Shorthand for a missing order
    pub fn order_not_found(id: i64) -> Self {
        EntityError::NotFound {
            entity_type: "order",
            id,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "ENTITY_NOT_FOUND",
            EntityError::NoneFound { .. } => "ENTITY_NOT_FOUND",
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug, Error)]
pub enum ValidationError {
    /// One entry per field that failed, in field order
    #[error("Validation errors: {}", join_field_errors(.0))]
    FieldErrors(Vec<FieldValidationError>),
}

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    /// Names of every field that failed validation
    pub fn fields(&self) -> Vec<&str> {
        match self {
            ValidationError::FieldErrors(errors) => {
                errors.iter().map(|e| e.field.as_str()).collect()
            }
        }
    }
}

fn join_field_errors(errors: &[FieldValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    /// Connection error
    #[error("Failed to connect to {backend}: {message}")]
    ConnectionError { backend: String, message: String },

    /// Query execution error
    #[error("Query error: {message}")]
    QueryError { message: String },

    /// Transaction error
    #[error("Transaction error: {message}")]
    TransactionError { message: String },

    /// Data integrity error
    #[error("Data integrity error: {message}")]
    IntegrityError { message: String },

    /// Backend not available (closed or never initialized)
    #[error("Storage backend '{backend}' is unavailable")]
    Unavailable { backend: String },
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => StorageError::Unavailable {
                backend: "database pool".to_string(),
            },
            sqlx::Error::Io(e) => StorageError::ConnectionError {
                backend: "database".to_string(),
                message: e.to_string(),
            },
            sqlx::Error::Tls(e) => StorageError::ConnectionError {
                backend: "database".to_string(),
                message: e.to_string(),
            },
            sqlx::Error::Database(e) if e.is_foreign_key_violation() || e.is_check_violation() => {
                StorageError::IntegrityError {
                    message: e.to_string(),
                }
            }
            other => StorageError::QueryError {
                message: other.to_string(),
            },
        }
    }
}

impl From<sqlx::Error> for OrderApiError {
    fn from(err: sqlx::Error) -> Self {
        OrderApiError::Storage(err.into())
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration
    #[error("Failed to parse config{}: {message}", .file.as_ref().map(|f| format!(" file '{}'", f)).unwrap_or_default())]
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// IO error while reading configuration
    #[error("IO error: {message}")]
    IoError { message: String },
}

impl From<serde_yaml::Error> for OrderApiError {
    fn from(err: serde_yaml::Error) -> Self {
        OrderApiError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug, Error)]
pub enum RequestError {
    /// Path segment is not a valid identifier
    #[error("Invalid entity ID format: '{id}'")]
    InvalidEntityId { id: String },

    /// Invalid request body
    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },

    /// Invalid query string
    #[error("Invalid query parameter '{parameter}': {message}")]
    InvalidQuery { parameter: String, message: String },
}

impl RequestError {
    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidEntityId { .. } => "INVALID_ENTITY_ID",
            RequestError::InvalidBody { .. } => "INVALID_BODY",
            RequestError::InvalidQuery { .. } => "INVALID_QUERY",
        }
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for order service operations
pub type OrderApiResult<T> = Result<T, OrderApiError>;
