// crates/model-tracking-core/src/runtime/ingest.rs
// ============================================================================
// Module: Result Ingestion
// Description: Resolve, validate, and persist inference results.
// Purpose: Guarantee that only schema-conforming results reach the store.
// Dependencies: crate::core, crate::interfaces, crate::runtime::validator
// ============================================================================

//! ## Overview
//! Ingestion resolves the version, fetches its bound schema, and checks the
//! input, output, and true-output payloads in that order, stopping at the
//! first failure. Everything before persistence is a read or in-memory work,
//! so a rejected submission leaves the store unchanged. The store re-derives
//! ancestor ids from its own transaction when the result is inserted.
//!
//! Security posture: payloads are untrusted and are never logged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::EntityKind;
use crate::core::JsonPayload;
use crate::core::NewResult;
use crate::core::ResultRecord;
use crate::core::ResultSubmission;
use crate::core::Timestamp;
use crate::core::TrackingError;
use crate::core::ValidationCheck;
use crate::core::VersionScope;
use crate::interfaces::ResultStore;
use crate::interfaces::SchemaStore;
use crate::interfaces::VersionStore;
use crate::runtime::context::RequestContext;
use crate::runtime::validator::CompiledSchema;
use crate::runtime::validator::ValidationOutcome;
use crate::runtime::validator::compile_schema;

// ============================================================================
// SECTION: Ingestor
// ============================================================================

/// Result ingestion pipeline over a store.
#[derive(Debug)]
pub struct ResultIngestor<'a, S> {
    /// Backing store.
    store: &'a S,
    /// Optional per-payload size limit in bytes.
    max_payload_bytes: Option<usize>,
}

impl<'a, S> ResultIngestor<'a, S>
where
    S: VersionStore + SchemaStore + ResultStore,
{
    /// Creates an ingestor over `store`.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self {
            store,
            max_payload_bytes: None,
        }
    }

    /// Rejects payloads larger than `limit` bytes before any lookup.
    #[must_use]
    pub const fn with_max_payload_bytes(mut self, limit: usize) -> Self {
        self.max_payload_bytes = Some(limit);
        self
    }

    /// Validates and persists a result submission.
    ///
    /// # Errors
    ///
    /// - [`TrackingError::NotFound`] when the lineage is unknown or the bound
    ///   schema is missing or owned by another organization.
    /// - [`TrackingError::InvalidInput`] when a payload is not JSON or too large.
    /// - [`TrackingError::ValidationFailed`] when a payload violates its schema.
    /// - [`TrackingError::Internal`] when the stored schema no longer compiles.
    pub fn ingest(
        &self,
        ctx: &RequestContext,
        scope: &VersionScope,
        submission: ResultSubmission,
    ) -> Result<ResultRecord, TrackingError> {
        ctx.check()?;
        self.check_sizes(&submission)?;

        let version = self.store.get_version(ctx, &scope.model_scope(), &scope.version)?;
        let schema = self.store.get_schema_by_id(ctx, version.schema_id).map_err(|err| {
            if err.is_not_found() {
                TrackingError::not_found(EntityKind::Schema, version.schema_id)
            } else {
                err
            }
        })?;
        if schema.organization_id != version.organization_id {
            return Err(TrackingError::not_found(EntityKind::Schema, version.schema_id));
        }
        let time = submission.time.unwrap_or_else(Timestamp::now);

        let input_schema = compile_stored(&schema.input, "input")?;
        check_payload(&input_schema, &submission.input, ValidationCheck::Input)?;

        let output_schema = compile_stored(&schema.output, "output")?;
        check_payload(&output_schema, &submission.output, ValidationCheck::Output)?;
        check_payload(&output_schema, &submission.true_output, ValidationCheck::TrueOutput)?;

        ctx.check()?;
        self.store.create_result(
            ctx,
            scope,
            NewResult {
                input: submission.input,
                output: submission.output,
                true_output: submission.true_output,
                time,
            },
        )
    }

    /// Enforces the optional payload size limit.
    fn check_sizes(&self, submission: &ResultSubmission) -> Result<(), TrackingError> {
        let Some(limit) = self.max_payload_bytes else {
            return Ok(());
        };
        let payloads = [
            (ValidationCheck::Input, &submission.input),
            (ValidationCheck::Output, &submission.output),
            (ValidationCheck::TrueOutput, &submission.true_output),
        ];
        for (check, payload) in payloads {
            if payload.len() > limit {
                return Err(TrackingError::InvalidInput(format!(
                    "{} exceeds size limit of {limit} bytes",
                    check.field()
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Compiles a schema document that was accepted at creation time.
fn compile_stored(document: &str, label: &str) -> Result<CompiledSchema, TrackingError> {
    compile_schema(document).map_err(|err| {
        TrackingError::Internal(format!("stored {label} schema failed to compile: {err}"))
    })
}

/// Runs one payload check.
fn check_payload(
    schema: &CompiledSchema,
    payload: &JsonPayload,
    check: ValidationCheck,
) -> Result<(), TrackingError> {
    match schema.validate(payload.as_bytes()) {
        Ok(ValidationOutcome::Valid) => Ok(()),
        Ok(ValidationOutcome::Invalid(violations)) => Err(TrackingError::ValidationFailed {
            check,
            violations,
        }),
        Err(err) => Err(TrackingError::InvalidInput(format!("{}: {err}", check.field()))),
    }
}
