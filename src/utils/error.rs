// src/utils/error.rs

use crate::services::media_storage::ObjectStoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub type PortalResult<T> = Result<T, PortalError>;

/// Custom error details for additional context
pub type ErrorDetails = HashMap<String, serde_json::Value>;

/// Main error type for the portal backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalError {
    pub message: String,
    pub details: Option<Box<ErrorDetails>>,
    pub status: Option<u16>,
    pub error_code: Option<String>,
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    #[default]
    UnknownError,
    DatabaseError,
    ValidationError,
    AuthenticationError,
    AuthorizationError,
    ConfigurationError,
    DeserializationError,
    NotFoundError,
    StorageError,
    ExternalServiceError,
    InternalServerError,
}

impl fmt::Display for PortalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for PortalError {}

impl PortalError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: None,
            status: None,
            error_code: None,
            kind,
        }
    }

    pub fn with_details(mut self, details: ErrorDetails) -> Self {
        self.details = Some(Box::new(details));
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_code(mut self, error_code: impl Into<String>) -> Self {
        self.error_code = Some(error_code.into());
        self
    }

    /// HTTP status to answer with; kinds that never set one explicitly
    /// fall back to 500.
    pub fn status_code(&self) -> u16 {
        self.status.unwrap_or(500)
    }

    // Convenience constructors for common error types

    pub fn database_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DatabaseError, message)
            .with_status(500)
            .with_code("DATABASE_ERROR")
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationError, message)
            .with_status(400)
            .with_code("VALIDATION_ERROR")
    }

    pub fn not_found<T: Into<String>>(message: T) -> Self {
        Self::new(ErrorKind::NotFoundError, message)
            .with_status(404)
            .with_code("NOT_FOUND")
    }

    pub fn authentication_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthenticationError, message)
            .with_status(401)
            .with_code("AUTH_ERROR")
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthorizationError, message)
            .with_status(401)
            .with_code("UNAUTHORIZED")
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthorizationError, message)
            .with_status(403)
            .with_code("ACCESS_DENIED")
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DeserializationError, message)
            .with_status(400)
            .with_code("PARSE_ERROR")
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigurationError, message)
            .with_status(500)
            .with_code("CONFIG_ERROR")
    }

    pub fn storage_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StorageError, message)
            .with_status(500)
            .with_code("STORAGE_ERROR")
    }

    pub fn telegram_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExternalServiceError, message)
            .with_status(502)
            .with_code("TELEGRAM_ERROR")
    }

    pub fn internal_error<T: Into<String>>(message: T) -> Self {
        Self::new(ErrorKind::InternalServerError, message)
            .with_status(500)
            .with_code("INTERNAL_ERROR")
    }
}

// Implement From conversions for common error types
impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        PortalError::parse_error(format!("JSON parsing error: {}", err))
    }
}

impl From<worker::Error> for PortalError {
    fn from(err: worker::Error) -> Self {
        PortalError::internal_error(format!("Worker error: {:?}", err))
    }
}

impl From<url::ParseError> for PortalError {
    fn from(err: url::ParseError) -> Self {
        PortalError::validation_error(format!("URL parse error: {}", err))
    }
}

impl From<String> for PortalError {
    fn from(err: String) -> Self {
        Self::validation_error(err)
    }
}

impl From<&str> for PortalError {
    fn from(err: &str) -> Self {
        Self::validation_error(err.to_string())
    }
}

impl From<ObjectStoreError> for PortalError {
    fn from(err: ObjectStoreError) -> Self {
        match err {
            ObjectStoreError::NotFound(key) => {
                PortalError::not_found(format!("Object not found: {}", key))
            }
            ObjectStoreError::InvalidKey(msg) => PortalError::validation_error(msg),
            ObjectStoreError::Storage(msg) => {
                PortalError::storage_error(format!("Object store error: {}", msg))
            }
        }
    }
}

// Implementation to convert PortalError into worker::Error
impl From<PortalError> for worker::Error {
    fn from(err: PortalError) -> Self {
        let message = if let Some(status_code) = err.status {
            format!(
                "[Status: {}] PortalError (Kind: {:?}): {}",
                status_code, err.kind, err.message
            )
        } else {
            format!("PortalError (Kind: {:?}): {}", err.kind, err.message)
        };

        worker::Error::RustError(message)
    }
}
