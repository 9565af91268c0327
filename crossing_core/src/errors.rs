//! # Error Types
//!
//! Structured error types for crossing_core. These errors are designed to be
//! informative for both humans and machine consumers, providing enough
//! context to understand and fix issues programmatically.
//!
//! Validation errors always name the offending field and are raised before
//! any numerical work begins; a failed call never returns a partial result.
//!
//! ## Example
//!
//! ```rust
//! use crossing_core::errors::{CalcError, CalcResult};
//!
//! fn validate_cover(cover_ft: f64) -> CalcResult<()> {
//!     if cover_ft <= 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "depth_of_cover",
//!             cover_ft.to_string(),
//!             "Depth of cover must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for crossing_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for analysis operations.
///
/// Each variant provides specific context about what went wrong,
/// enabling programmatic error handling by callers.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, illegal table key, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing for the chosen mode
    /// (e.g. automatic tire sizing without a tire pressure)
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// A value that the formulas divide by is zero or would otherwise
    /// propagate Infinity/NaN into the result
    #[error("Numeric degeneracy in '{quantity}': {reason}")]
    NumericDegeneracy { quantity: String, reason: String },

    /// Preset not found in catalog (steel grade, pipe size)
    #[error("Preset not found: {preset_name}")]
    PresetNotFound { preset_name: String },

    /// Analysis failed mid-computation (should be rare; validation
    /// catches almost everything up front)
    #[error("Analysis failed: {stage} - {reason}")]
    AnalysisFailed { stage: String, reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch in a stored run history
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create a NumericDegeneracy error
    pub fn degenerate(quantity: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::NumericDegeneracy {
            quantity: quantity.into(),
            reason: reason.into(),
        }
    }

    /// Create a PresetNotFound error
    pub fn preset_not_found(preset_name: impl Into<String>) -> Self {
        CalcError::PresetNotFound {
            preset_name: preset_name.into(),
        }
    }

    /// Create an AnalysisFailed error
    pub fn analysis_failed(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::AnalysisFailed {
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(
        path: impl Into<String>,
        locked_by: impl Into<String>,
        locked_at: impl Into<String>,
    ) -> Self {
        CalcError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry).
    ///
    /// Engine errors are never recoverable - the caller must correct the
    /// input. Only contention on the run-history file can be retried.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CalcError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::NumericDegeneracy { .. } => "NUMERIC_DEGENERACY",
            CalcError::PresetNotFound { .. } => "PRESET_NOT_FOUND",
            CalcError::AnalysisFailed { .. } => "ANALYSIS_FAILED",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::FileLocked { .. } => "FILE_LOCKED",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}
