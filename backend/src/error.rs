//! Error handling for the canteen engine
//!
//! Every service returns `AppResult`. Store failures are classified here so
//! callers can tell a retryable lock timeout from a real fault.

use rust_decimal::Decimal;
use shared::{FieldError, Overflow};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Quantity sold must be greater than zero")]
    InvalidQuantity,

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("No materials mapped to category {0}")]
    NoRecipe(String),

    #[error("Insufficient stock of {material}: available {available}, required {required}")]
    InsufficientStock {
        material: String,
        available: Decimal,
        required: Decimal,
    },

    // Store errors
    #[error("Store temporarily unavailable: {0}")]
    TransientStore(String),

    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether retrying the same call may succeed. No partial writes are
    /// left behind when this is true.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::TransientStore(_))
    }

    /// Stable code for the presentation layer
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::InvalidQuantity => "INVALID_QUANTITY",
            AppError::DuplicateEntry(_) => "DUPLICATE_ENTRY",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::NoRecipe(_) => "NO_RECIPE",
            AppError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            AppError::TransientStore(_) => "TRANSIENT_STORE_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// PostgreSQL error codes treated as transient
const LOCK_NOT_AVAILABLE: &str = "55P03";
const DEADLOCK_DETECTED: &str = "40P01";
const SERIALIZATION_FAILURE: &str = "40001";
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Postgres' name for the restricting key from a category to the material
/// it sells directly
const DIRECT_MATERIAL_FKEY: &str = "categories_direct_material_id_fkey";

/// Classify a foreign-key violation by the constraint it broke
fn foreign_key_error(constraint: Option<&str>) -> AppError {
    match constraint {
        Some(DIRECT_MATERIAL_FKEY) => {
            AppError::validation("material_id", "Material is sold directly by a category")
        }
        other => AppError::NotFound(other.unwrap_or("referenced row").to_string()),
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                return AppError::TransientStore(err.to_string());
            }
            sqlx::Error::RowNotFound => return AppError::NotFound("Row".to_string()),
            _ => {}
        }

        if let sqlx::Error::Database(db_err) = &err {
            let code = db_err.code().map(|c| c.into_owned());
            match code.as_deref() {
                Some(LOCK_NOT_AVAILABLE | DEADLOCK_DETECTED | SERIALIZATION_FAILURE) => {
                    return AppError::TransientStore(db_err.message().to_string());
                }
                Some(UNIQUE_VIOLATION) => {
                    return AppError::DuplicateEntry(
                        db_err.constraint().unwrap_or("unique constraint").to_string(),
                    );
                }
                Some(FOREIGN_KEY_VIOLATION) => return foreign_key_error(db_err.constraint()),
                _ => {}
            }
        }

        AppError::DatabaseError(err)
    }
}

impl From<FieldError> for AppError {
    fn from(err: FieldError) -> Self {
        AppError::Validation {
            field: err.field.to_string(),
            message: err.message,
        }
    }
}

impl From<Overflow> for AppError {
    fn from(err: Overflow) -> Self {
        AppError::validation("amount", err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by_key(|(field, _)| *field);

        match fields.first() {
            Some((field, errs)) => {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Invalid value".to_string());
                AppError::validation(*field, message)
            }
            None => AppError::validation("input", "Invalid input"),
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Result type alias for services
pub type AppResult<T> = Result<T, AppError>;
