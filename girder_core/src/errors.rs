//! # Error Types
//!
//! Structured error types for girder_core. Every failure in the analysis core
//! is deterministic: it is a function of the current model and specification
//! state, so nothing here is retried. Errors propagate with `?` up to the
//! command that started the query (a report, a design iteration step, a
//! rating run).
//!
//! ## Taxonomy
//!
//! | Variant                   | Meaning                                                        |
//! |---------------------------|----------------------------------------------------------------|
//! | `ValidationFailure`       | A prerequisite or range-of-applicability check failed          |
//! | `NumericDegeneracy`       | An intersection search or interpolation could not be evaluated |
//! | `ConfigurationMismatch`   | An unsupported beam family / deck / method combination         |
//! | `CacheCoherencyViolation` | A cache insert collided with a live entry (logic error)        |
//!
//! ## Example
//!
//! ```rust
//! use girder_core::errors::{CalcError, CalcResult};
//!
//! fn check_stiffness_ratio(ratio: f64, limit: f64) -> CalcResult<()> {
//!     if ratio < limit {
//!         return Err(CalcError::validation_failure(
//!             "girder stiffness ratio",
//!             ratio,
//!             limit,
//!             "A refined method of analysis is required",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_stiffness_ratio(0.85, 0.90).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for girder_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for analysis operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// A prerequisite range/geometry check failed (curvature, stiffness
    /// ratio, parallelism, or an enforced range of applicability)
    #[error("Validation failed: {check} (computed {computed:.4}, limit {limit:.4}) - {message}")]
    ValidationFailure {
        check: String,
        computed: f64,
        limit: f64,
        message: String,
    },

    /// An intersection search or interpolation could not be evaluated
    #[error("Numeric degeneracy in {operation}: {reason}")]
    NumericDegeneracy { operation: String, reason: String },

    /// Unsupported combination of beam family, deck, connectivity or method
    #[error("Configuration mismatch: {reason}")]
    ConfigurationMismatch { reason: String },

    /// Cache insert collided with a live entry
    #[error("Cache coherency violation in '{partition}' for key {key}")]
    CacheCoherencyViolation { partition: String, key: String },

    /// An input value is invalid (out of range, missing index, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    /// Create a ValidationFailure error
    pub fn validation_failure(
        check: impl Into<String>,
        computed: f64,
        limit: f64,
        message: impl Into<String>,
    ) -> Self {
        CalcError::ValidationFailure {
            check: check.into(),
            computed,
            limit,
            message: message.into(),
        }
    }

    /// Create a NumericDegeneracy error
    pub fn numeric_degeneracy(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::NumericDegeneracy {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create a ConfigurationMismatch error
    pub fn configuration_mismatch(reason: impl Into<String>) -> Self {
        CalcError::ConfigurationMismatch {
            reason: reason.into(),
        }
    }

    /// Create a CacheCoherencyViolation error
    pub fn cache_coherency(partition: impl Into<String>, key: impl std::fmt::Debug) -> Self {
        CalcError::CacheCoherencyViolation {
            partition: partition.into(),
            key: format!("{:?}", key),
        }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a serde_json error
    pub fn serialization(err: &serde_json::Error) -> Self {
        CalcError::SerializationError {
            reason: err.to_string(),
        }
    }

    /// True for failures that reflect a logic error rather than a model state
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            CalcError::ConfigurationMismatch { .. }
                | CalcError::CacheCoherencyViolation { .. }
                | CalcError::Internal { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::ValidationFailure { .. } => "VALIDATION_FAILURE",
            CalcError::NumericDegeneracy { .. } => "NUMERIC_DEGENERACY",
            CalcError::ConfigurationMismatch { .. } => "CONFIGURATION_MISMATCH",
            CalcError::CacheCoherencyViolation { .. } => "CACHE_COHERENCY_VIOLATION",
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::validation_failure(
            "girder stiffness ratio",
            0.82,
            0.90,
            "A refined method of analysis is required",
        );
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("ValidationFailure"));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            CalcError::numeric_degeneracy("dv intersection", "2 intersections").error_code(),
            "NUMERIC_DEGENERACY"
        );
        assert_eq!(
            CalcError::cache_coherency("shear capacity", 42_u64).error_code(),
            "CACHE_COHERENCY_VIOLATION"
        );
    }

    #[test]
    fn test_contract_violations() {
        assert!(CalcError::configuration_mismatch("U-beam with adjacent spacing").is_contract_violation());
        assert!(!CalcError::validation_failure("curvature", 5.0, 4.0, "refined").is_contract_violation());
    }

    #[test]
    fn test_display_carries_values() {
        let error = CalcError::validation_failure("curvature", 5.0, 4.0, "A refined method of analysis is required");
        let text = error.to_string();
        assert!(text.contains("5.0000"));
        assert!(text.contains("4.0000"));
    }
}
