//! Error types for trekdesk.
//!
//! This module defines all error types used throughout the trekdesk crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for trekdesk operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to read a data file.
    #[error("failed to read {path}: {source}")]
    StorageRead {
        /// Path to the data file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a data file.
    #[error("failed to write {path}: {source}")]
    StorageWrite {
        /// Path to the data file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to acquire the data directory lock.
    #[error("failed to lock data directory at {path}: {source}")]
    StorageLock {
        /// Path to the lock file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A stored line could not be decoded.
    #[error("corrupt record in {file}: {message}")]
    CorruptRecord {
        /// Name of the data file.
        file: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    /// A value cannot be stored because it would break the line format.
    #[error("field '{field}' cannot contain '|' or line breaks")]
    InvalidField {
        /// Name of the offending field.
        field: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Input Errors ===
    /// User input failed validation.
    #[error("{field}: {message}")]
    Validation {
        /// Name of the invalid field.
        field: &'static str,
        /// Description of the validation failure.
        message: String,
    },

    // === Auth Errors ===
    /// Username or password did not match.
    #[error("invalid username or password")]
    AuthenticationFailed,

    /// The signed-in role lacks a permission.
    #[error("permission denied: {role} cannot {permission}")]
    PermissionDenied {
        /// Role of the caller.
        role: String,
        /// The missing permission.
        permission: String,
    },

    /// A username is already registered.
    #[error("username '{0}' is already taken")]
    DuplicateUsername(String),

    /// The built-in admin account must keep its name and role.
    #[error("account '{0}' is protected")]
    ProtectedAccount(String),

    /// Password hashing or verification failed.
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    // === Domain Errors ===
    /// A referenced record does not exist.
    #[error("{kind} '{id}' not found")]
    NotFound {
        /// Kind of record (trek, guide, booking, user).
        kind: &'static str,
        /// The id that was looked up.
        id: String,
    },

    /// A high-risk trek was booked without the risk acknowledgement.
    #[error("trek '{trek}' is rated {difficulty}; booking requires risk acknowledgement")]
    HighRiskNotAcknowledged {
        /// Trek name.
        trek: String,
        /// Trek difficulty.
        difficulty: String,
    },

    /// A booking cannot move from its current state.
    #[error("booking is {status}: {message}")]
    InvalidBookingState {
        /// Current status of the booking.
        status: String,
        /// Why the operation was refused.
        message: String,
    },

    /// The guide cannot take new trips.
    #[error("guide '{0}' is not available")]
    GuideUnavailable(String),

    // === I/O Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for trekdesk operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a validation error for a field.
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Create a not-found error.
    #[must_use]
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Create an invalid booking state error.
    #[must_use]
    pub fn invalid_booking_state(status: impl ToString, message: impl Into<String>) -> Self {
        Self::InvalidBookingState {
            status: status.to_string(),
            message: message.into(),
        }
    }

    /// Create a corrupt record error.
    #[must_use]
    pub fn corrupt(file: &'static str, message: impl Into<String>) -> Self {
        Self::CorruptRecord {
            file,
            message: message.into(),
        }
    }

    /// Check if this error means a record was missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error is a permission issue.
    #[must_use]
    pub fn is_permission_error(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }

    /// Check if the caller, not the environment, caused this error.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::InvalidField { .. }
                | Self::AuthenticationFailed
                | Self::PermissionDenied { .. }
                | Self::DuplicateUsername(_)
                | Self::ProtectedAccount(_)
                | Self::HighRiskNotAcknowledged { .. }
                | Self::InvalidBookingState { .. }
                | Self::GuideUnavailable(_)
                | Self::NotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::AuthenticationFailed;
        assert_eq!(err.to_string(), "invalid username or password");
        assert!(err.is_user_error());

        let err = Error::ProtectedAccount("admin".to_string());
        assert_eq!(err.to_string(), "account 'admin' is protected");
        assert!(err.is_user_error());
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found("trek", "abc-123");
        assert_eq!(err.to_string(), "trek 'abc-123' not found");
        assert!(err.is_not_found());
        assert!(!Error::AuthenticationFailed.is_not_found());
    }

    #[test]
    fn test_permission_error() {
        let err = Error::PermissionDenied {
            role: "TOURIST".to_string(),
            permission: "manage treks".to_string(),
        };
        assert!(err.is_permission_error());
        assert!(err.to_string().contains("TOURIST"));
        assert!(err.is_user_error());
    }

    #[test]
    fn test_validation_error_display() {
        let err = Error::validation("email", "invalid email format");
        assert_eq!(err.to_string(), "email: invalid email format");
        assert!(err.is_user_error());
    }

    #[test]
    fn test_invalid_booking_state_display() {
        let err = Error::invalid_booking_state("Completed", "completed bookings cannot be cancelled");
        let msg = err.to_string();
        assert!(msg.contains("Completed"));
        assert!(msg.contains("cannot be cancelled"));
    }

    #[test]
    fn test_high_risk_display() {
        let err = Error::HighRiskNotAcknowledged {
            trek: "Manaslu Circuit".to_string(),
            difficulty: "Very Difficult".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Manaslu Circuit"));
        assert!(msg.contains("Very Difficult"));
    }

    #[test]
    fn test_invalid_field_display() {
        let err = Error::InvalidField {
            field: "description".to_string(),
        };
        assert!(err.to_string().contains("description"));
    }

    #[test]
    fn test_storage_errors_are_not_user_errors() {
        let err = Error::StorageRead {
            path: PathBuf::from("/data/users.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        };
        assert!(err.to_string().contains("file not found"));
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_storage_write_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::StorageWrite {
            path: PathBuf::from("/data/treks.txt"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("/data/treks.txt"));
        assert!(msg.contains("access denied"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "bcrypt_cost out of range".to_string(),
        };
        assert!(err.to_string().contains("bcrypt_cost"));
    }
}
