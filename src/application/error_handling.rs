// src/application/error_handling.rs
//
// Error responses for callers of the catalog
//
// ARCHITECTURE:
// - Maps internal errors to caller-facing responses
// - Client errors carry their message, server faults are logged and hidden
// - `ApiResponse` is the envelope every operation result is wrapped in

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Standard error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error_type: ErrorType,
    pub status_code: u16,
    pub message: String,
    pub details: Option<String>,
}

/// Error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Invalid input (400)
    Validation,

    /// Entry not found (404)
    NotFound,

    /// Key already cataloged (409)
    Conflict,

    /// Stored data cannot be trusted (500)
    Storage,

    /// Other/unknown error (500)
    Internal,
}

impl ErrorType {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorType::Validation => 400,
            ErrorType::NotFound => 404,
            ErrorType::Conflict => 409,
            ErrorType::Storage | ErrorType::Internal => 500,
        }
    }
}

impl ErrorResponse {
    fn new(error_type: ErrorType, message: String, details: Option<String>) -> Self {
        Self {
            success: false,
            error_type,
            status_code: error_type.status_code(),
            message,
            details,
        }
    }

    /// Create error response from AppError
    pub fn from_app_error(error: AppError) -> Self {
        match error {
            AppError::Validation(domain_error) => Self::new(
                ErrorType::Validation,
                "Validation failed".to_string(),
                Some(domain_error.to_string()),
            ),

            AppError::NotFound(message) => Self::new(ErrorType::NotFound, message, None),

            AppError::Conflict(message) => Self::new(ErrorType::Conflict, message, None),

            AppError::StorageConsistency(message) => {
                log::error!("Storage consistency error: {}", message);
                Self::new(
                    ErrorType::Storage,
                    "Stored catalog data is inconsistent".to_string(),
                    Some(message),
                )
            }

            AppError::Database(db_error) => {
                log::error!("Database error: {:?}", db_error);
                Self::new(
                    ErrorType::Storage,
                    "Database operation failed".to_string(),
                    Some("Check logs for details".to_string()),
                )
            }

            AppError::Pool(pool_error) => {
                log::error!("Connection pool error: {}", pool_error);
                Self::new(
                    ErrorType::Storage,
                    "Database connection failed".to_string(),
                    None,
                )
            }

            AppError::Io(io_error) => {
                log::error!("IO error: {:?}", io_error);
                Self::new(
                    ErrorType::Storage,
                    "File system operation failed".to_string(),
                    Some(io_error.to_string()),
                )
            }

            AppError::Serialization(serde_error) => {
                log::error!("Serialization error: {:?}", serde_error);
                Self::new(
                    ErrorType::Internal,
                    "Data serialization failed".to_string(),
                    None,
                )
            }

            AppError::Config(message) => {
                log::error!("Configuration error: {}", message);
                Self::new(ErrorType::Internal, message, None)
            }
        }
    }

    pub fn validation(message: String) -> Self {
        Self::new(ErrorType::Validation, message, None)
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(ErrorType::NotFound, format!("{} not found", resource), None)
    }
}

/// Response envelope: `{status, message, data}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn error(error: &ErrorResponse) -> Self {
        let message = match &error.details {
            Some(details) if error.error_type == ErrorType::Validation => {
                format!("{}: {}", error.message, details)
            }
            _ => error.message.clone(),
        };

        Self {
            status: "error".to_string(),
            message,
            data: None,
        }
    }

    /// Wrap an operation result, returning the envelope with its status code
    pub fn from_result(result: AppResult<T>, success_message: &str) -> (u16, Self) {
        match result {
            Ok(data) => (200, Self::success(success_message, data)),
            Err(e) => {
                let error = ErrorResponse::from_app_error(e);
                (error.status_code, Self::error(&error))
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Helper trait to convert Results to a serialized ErrorResponse
pub trait ToErrorResponse<T> {
    fn to_error_response(self) -> Result<T, String>;
}

impl<T> ToErrorResponse<T> for Result<T, AppError> {
    fn to_error_response(self) -> Result<T, String> {
        self.map_err(|e| {
            let error_response = ErrorResponse::from_app_error(e);
            serde_json::to_string(&error_response).unwrap_or_else(|_| "Internal error".to_string())
        })
    }
}
