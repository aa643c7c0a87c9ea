// hearth-gate-core/src/error.rs
// ============================================================================
// Module: Gateway Errors
// Description: Uniform error taxonomy for gateway operations.
// Purpose: Give protocol adapters one stable, typed error shape.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! The dispatcher is the single point translating internal failures into this
//! taxonomy. Validators and the permission model never panic past the
//! dispatcher boundary; store failures are translated without leaking
//! backend-specific detail beyond a human-readable message. Validation errors
//! enumerate every violated field in one response so a client can fix all
//! issues in one round trip.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Field Issues
// ============================================================================

/// One field-level validation violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    /// Offending payload field.
    pub field: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl FieldIssue {
    /// Builds a field issue.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// SECTION: Gateway Error
// ============================================================================

/// Gateway error taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The requested (kind, operation) pair does not exist.
    #[error("unknown operation: {kind}.{operation}")]
    UnknownOperation {
        /// Requested kind label.
        kind: String,
        /// Requested operation label.
        operation: String,
    },
    /// Capability not granted. Fail-closed; the message never distinguishes a
    /// disabled kind from an unconfigured one.
    #[error("operation not permitted: {kind}.{operation}")]
    PermissionDenied {
        /// Requested kind label.
        kind: String,
        /// Requested operation label.
        operation: String,
    },
    /// Payload violates the kind-specific schema.
    #[error("validation failed: {}", summarize(issues))]
    Validation {
        /// Every violated field, not just the first.
        issues: Vec<FieldIssue>,
    },
    /// Target identifier is absent in the store.
    #[error("not found: {message}")]
    NotFound {
        /// Human-readable detail.
        message: String,
    },
    /// Store-detected concurrent modification or uniqueness violation.
    #[error("conflict: {message}")]
    Conflict {
        /// Human-readable detail.
        message: String,
    },
    /// Caller withdrew the request.
    #[error("cancelled")]
    Cancelled,
    /// Store or transport failure with an opaque cause.
    #[error("backend error: {message}")]
    Backend {
        /// Human-readable detail.
        message: String,
    },
}

impl GatewayError {
    /// Returns the stable error code for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnknownOperation {
                ..
            } => "unknown_operation",
            Self::PermissionDenied {
                ..
            } => "permission_denied",
            Self::Validation {
                ..
            } => "validation_error",
            Self::NotFound {
                ..
            } => "not_found",
            Self::Conflict {
                ..
            } => "conflict",
            Self::Cancelled => "cancelled",
            Self::Backend {
                ..
            } => "backend_error",
        }
    }
}

/// Joins field issues into one display string.
fn summarize(issues: &[FieldIssue]) -> String {
    let parts: Vec<String> =
        issues.iter().map(|issue| format!("{}: {}", issue.field, issue.message)).collect();
    parts.join("; ")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only panic-based assertions."
    )]

    use super::FieldIssue;
    use super::GatewayError;

    #[test]
    fn validation_error_lists_every_field() {
        let error = GatewayError::Validation {
            issues: vec![
                FieldIssue::new("min", "must not exceed max"),
                FieldIssue::new("step", "must be greater than zero"),
            ],
        };
        let message = error.to_string();
        assert!(message.contains("min"));
        assert!(message.contains("step"));
        assert_eq!(error.code(), "validation_error");
    }

    #[test]
    fn permission_denial_message_is_uniform() {
        let disabled = GatewayError::PermissionDenied {
            kind: "automation".to_string(),
            operation: "create".to_string(),
        };
        let unconfigured = GatewayError::PermissionDenied {
            kind: "automation".to_string(),
            operation: "create".to_string(),
        };
        assert_eq!(disabled.to_string(), unconfigured.to_string());
    }
}
