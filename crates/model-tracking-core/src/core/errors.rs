// crates/model-tracking-core/src/core/errors.rs
// ============================================================================
// Module: Model Tracking Errors
// Description: Outcome taxonomy for store, validator, and ingestion operations.
// Purpose: Give every failure a stable kind and an HTTP-equivalent status.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! [`TrackingError`] is the single error surface offered to request layers.
//! Each variant maps to one [`ErrorKind`] and one HTTP-equivalent status so
//! that a transport can translate outcomes without inspecting messages.
//! Storage backends convert their own error enums into this type.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::EntityKind;

// ============================================================================
// SECTION: Validation Checks
// ============================================================================

/// The three payload checks run against a result submission.
///
/// # Invariants
/// - Checks run in declaration order and stop at the first failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationCheck {
    /// Input payload against the input document.
    Input,
    /// Output payload against the output document.
    Output,
    /// True-output payload against the output document.
    TrueOutput,
}

impl ValidationCheck {
    /// Returns the caller-facing failure message for this check.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Input => "input does not match input schema",
            Self::Output => "output does not match output schema",
            Self::TrueOutput => "true output does not match output schema",
        }
    }

    /// Returns the payload field name checked.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
            Self::TrueOutput => "true_output",
        }
    }
}

impl fmt::Display for ValidationCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

// ============================================================================
// SECTION: Error Kinds
// ============================================================================

/// Stable classification of [`TrackingError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A referenced entity does not exist.
    NotFound,
    /// The request was malformed or carried an invalid schema.
    InvalidInput,
    /// A payload did not satisfy its schema.
    ValidationFailed,
    /// A uniqueness constraint was violated.
    Conflict,
    /// Storage or other internal fault.
    Internal,
    /// The request context was canceled or its deadline passed.
    Canceled,
}

impl ErrorKind {
    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::InvalidInput => "invalid_input",
            Self::ValidationFailed => "validation_failed",
            Self::Conflict => "conflict",
            Self::Internal => "internal",
            Self::Canceled => "canceled",
        }
    }

    /// Returns the HTTP-equivalent status code for the kind.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::InvalidInput | Self::ValidationFailed => 422,
            Self::Conflict | Self::Internal | Self::Canceled => 500,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Tracking Error
// ============================================================================

/// Errors returned by model tracking operations.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Messages never embed raw result payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackingError {
    /// A named or identified entity could not be resolved.
    #[error("{kind} not found: {name}")]
    NotFound {
        /// Kind of the missing entity.
        kind: EntityKind,
        /// Name or identifier that failed to resolve.
        name: String,
    },
    /// The request was malformed.
    #[error("{0}")]
    InvalidInput(String),
    /// A payload failed one of the schema checks.
    #[error("{check}")]
    ValidationFailed {
        /// Check that failed.
        check: ValidationCheck,
        /// Violation descriptions reported by the validator.
        violations: Vec<String>,
    },
    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Storage or other internal fault.
    #[error("internal error: {0}")]
    Internal(String),
    /// The request context was canceled or expired.
    #[error("request canceled: {0}")]
    Canceled(String),
}

impl TrackingError {
    /// Builds a not-found error for an entity kind and name.
    #[must_use]
    pub fn not_found(kind: EntityKind, name: impl fmt::Display) -> Self {
        Self::NotFound {
            kind,
            name: name.to_string(),
        }
    }

    /// Returns the stable kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound {
                ..
            } => ErrorKind::NotFound,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::ValidationFailed {
                ..
            } => ErrorKind::ValidationFailed,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Internal(_) => ErrorKind::Internal,
            Self::Canceled(_) => ErrorKind::Canceled,
        }
    }

    /// Returns the HTTP-equivalent status code for this error.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.kind().http_status()
    }

    /// Returns true when this error is a not-found outcome.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
