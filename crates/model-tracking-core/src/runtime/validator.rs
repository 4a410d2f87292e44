// crates/model-tracking-core/src/runtime/validator.rs
// ============================================================================
// Module: Schema Validator
// Description: JSON Schema compilation and payload validation.
// Purpose: Separate schema compile failures from document violations.
// Dependencies: jsonschema, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Schema documents are compiled on demand; nothing is cached. Compilation
//! runs meta-schema validation and resolves `$ref`s, defaulting to draft
//! 2020-12 unless the document declares its own `$schema`. Validation of a
//! payload yields [`ValidationOutcome::Valid`] or a non-empty list of
//! violations; payload bytes that are not JSON at all are a
//! [`DocumentError`], never an `Invalid` outcome.
//!
//! Security posture: schema documents and payloads are untrusted input.

// ============================================================================
// SECTION: Imports
// ============================================================================

use jsonschema::Draft;
use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;

use crate::core::TrackingError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Schema compilation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaCompileError {
    /// The schema text is not JSON.
    #[error("schema is not valid json: {0}")]
    Malformed(String),
    /// The schema is JSON but not a valid JSON Schema.
    #[error("schema is not a valid json schema: {0}")]
    Invalid(String),
}

/// Payload decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// The payload bytes are not JSON.
    #[error("document is not valid json: {0}")]
    Malformed(String),
}

// ============================================================================
// SECTION: Compiled Schemas
// ============================================================================

/// Result of validating a document against a compiled schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// The document satisfies the schema.
    Valid,
    /// The document violates the schema.
    Invalid(Vec<String>),
}

impl ValidationOutcome {
    /// Returns true for [`ValidationOutcome::Valid`].
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// A JSON Schema ready to validate documents.
pub struct CompiledSchema {
    /// Compiled validator.
    validator: Validator,
}

impl std::fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledSchema").finish_non_exhaustive()
    }
}

/// Parses and compiles a JSON Schema document.
///
/// # Errors
///
/// Returns [`SchemaCompileError`] when the text is not JSON or does not
/// compile as a JSON Schema.
pub fn compile_schema(document: &str) -> Result<CompiledSchema, SchemaCompileError> {
    let value: Value = serde_json::from_str(document)
        .map_err(|err| SchemaCompileError::Malformed(err.to_string()))?;
    let declares_draft = value.get("$schema").is_some();
    let built = if declares_draft {
        jsonschema::options().build(&value)
    } else {
        jsonschema::options().with_draft(Draft::Draft202012).build(&value)
    };
    let validator = built.map_err(|err| SchemaCompileError::Invalid(err.to_string()))?;
    Ok(CompiledSchema {
        validator,
    })
}

impl CompiledSchema {
    /// Validates raw JSON bytes against the schema.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Malformed`] when the bytes are not JSON.
    pub fn validate(&self, document: &[u8]) -> Result<ValidationOutcome, DocumentError> {
        let value: Value = serde_json::from_slice(document)
            .map_err(|err| DocumentError::Malformed(err.to_string()))?;
        Ok(self.validate_value(&value))
    }

    /// Validates an already-parsed JSON value against the schema.
    #[must_use]
    pub fn validate_value(&self, value: &Value) -> ValidationOutcome {
        if self.validator.is_valid(value) {
            return ValidationOutcome::Valid;
        }
        let violations: Vec<String> =
            self.validator.iter_errors(value).map(|err| err.to_string()).collect();
        if violations.is_empty() {
            ValidationOutcome::Invalid(vec!["document does not satisfy schema".to_string()])
        } else {
            ValidationOutcome::Invalid(violations)
        }
    }
}

// ============================================================================
// SECTION: Schema Pair Checks
// ============================================================================

/// Compiles an input/output schema pair, failing on the first bad document.
///
/// # Errors
///
/// Returns [`TrackingError::InvalidInput`] with "invalid input schema" or
/// "invalid output schema".
pub fn validate_schema_documents(input: &str, output: &str) -> Result<(), TrackingError> {
    compile_schema(input)
        .map_err(|_| TrackingError::InvalidInput("invalid input schema".to_string()))?;
    compile_schema(output)
        .map_err(|_| TrackingError::InvalidInput("invalid output schema".to_string()))?;
    Ok(())
}
