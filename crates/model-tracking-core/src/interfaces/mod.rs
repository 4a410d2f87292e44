// crates/model-tracking-core/src/interfaces/mod.rs
// ============================================================================
// Module: Model Tracking Interfaces
// Description: Backend-agnostic store contracts per entity kind.
// Purpose: Define the capability surfaces used by the ingestion pipeline.
// Dependencies: crate::core, crate::runtime::context
// ============================================================================

//! ## Overview
//! Each entity kind has its own capability trait, scoped by an explicit
//! parent value object. Implementations resolve parent names to ids inside
//! the same transaction as the dependent write and must never accept
//! caller-supplied ancestor ids. All operations are blocking and honour the
//! supplied [`RequestContext`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::ModelName;
use crate::core::ModelRecord;
use crate::core::ModelScope;
use crate::core::ModelUpdate;
use crate::core::NewModel;
use crate::core::NewOrganization;
use crate::core::NewResult;
use crate::core::NewSchema;
use crate::core::NewVersion;
use crate::core::OrganizationName;
use crate::core::OrganizationRecord;
use crate::core::OrganizationScope;
use crate::core::ResultId;
use crate::core::ResultRecord;
use crate::core::SchemaId;
use crate::core::SchemaName;
use crate::core::SchemaRecord;
use crate::core::TrackingError;
use crate::core::VersionName;
use crate::core::VersionRecord;
use crate::core::VersionScope;
use crate::runtime::context::RequestContext;

// ============================================================================
// SECTION: Organizations
// ============================================================================

/// Organization persistence.
pub trait OrganizationStore {
    /// Creates an organization.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::Conflict`] when the name is taken and
    /// [`TrackingError::InvalidInput`] when the name is blank.
    fn create_organization(
        &self,
        ctx: &RequestContext,
        new: NewOrganization,
    ) -> Result<OrganizationRecord, TrackingError>;

    /// Loads an organization by name.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::NotFound`] when no such organization exists.
    fn get_organization(
        &self,
        ctx: &RequestContext,
        name: &OrganizationName,
    ) -> Result<OrganizationRecord, TrackingError>;

    /// Lists all organizations.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError`] when the backend fails.
    fn list_organizations(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<OrganizationRecord>, TrackingError>;
}

// ============================================================================
// SECTION: Models
// ============================================================================

/// Model persistence, scoped to an organization.
pub trait ModelStore {
    /// Creates a model, checking the optional default schema belongs to the
    /// same organization.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::NotFound`] for an unknown organization or
    /// default schema and [`TrackingError::Conflict`] for a duplicate name.
    fn create_model(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
        new: NewModel,
    ) -> Result<ModelRecord, TrackingError>;

    /// Swaps (or clears) a model's default schema.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::NotFound`] for an unknown organization, model,
    /// or schema.
    fn update_model(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
        update: ModelUpdate,
    ) -> Result<ModelRecord, TrackingError>;

    /// Loads a model by name.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::NotFound`] when the organization or model is unknown.
    fn get_model(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
        name: &ModelName,
    ) -> Result<ModelRecord, TrackingError>;

    /// Lists the models of an organization.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::NotFound`] when the organization is unknown.
    fn list_models(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
    ) -> Result<Vec<ModelRecord>, TrackingError>;
}

// ============================================================================
// SECTION: Schemas
// ============================================================================

/// Schema persistence, scoped to an organization.
pub trait SchemaStore {
    /// Creates a schema pair after compiling both documents.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::InvalidInput`] when either document fails to
    /// compile, [`TrackingError::NotFound`] for an unknown organization, and
    /// [`TrackingError::Conflict`] for a duplicate name.
    fn create_schema(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
        new: NewSchema,
    ) -> Result<SchemaRecord, TrackingError>;

    /// Loads a schema by name.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::NotFound`] when the organization or schema is unknown.
    fn get_schema(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
        name: &SchemaName,
    ) -> Result<SchemaRecord, TrackingError>;

    /// Loads a schema by surrogate id.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::NotFound`] when no schema has the id.
    fn get_schema_by_id(
        &self,
        ctx: &RequestContext,
        id: SchemaId,
    ) -> Result<SchemaRecord, TrackingError>;

    /// Lists the schemas of an organization.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::NotFound`] when the organization is unknown.
    fn list_schemas(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
    ) -> Result<Vec<SchemaRecord>, TrackingError>;
}

// ============================================================================
// SECTION: Versions
// ============================================================================

/// Version persistence, scoped to a model.
pub trait VersionStore {
    /// Creates a version bound to a schema of the same organization.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::NotFound`] for an unknown organization, model,
    /// or schema and [`TrackingError::Conflict`] for a duplicate name.
    fn create_version(
        &self,
        ctx: &RequestContext,
        scope: &ModelScope,
        new: NewVersion,
    ) -> Result<VersionRecord, TrackingError>;

    /// Loads a version by name.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::NotFound`] when any part of the lineage is unknown.
    fn get_version(
        &self,
        ctx: &RequestContext,
        scope: &ModelScope,
        name: &VersionName,
    ) -> Result<VersionRecord, TrackingError>;

    /// Returns the named version, creating it with the model's default schema
    /// when it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::NotFound`] when the version is absent and the
    /// model has no default schema. Non-not-found lookup failures are
    /// returned unchanged.
    fn get_or_create_version(
        &self,
        ctx: &RequestContext,
        scope: &ModelScope,
        name: &VersionName,
    ) -> Result<VersionRecord, TrackingError>;

    /// Lists the versions of a model.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::NotFound`] when the organization or model is unknown.
    fn list_versions(
        &self,
        ctx: &RequestContext,
        scope: &ModelScope,
    ) -> Result<Vec<VersionRecord>, TrackingError>;
}

// ============================================================================
// SECTION: Results
// ============================================================================

/// Result persistence, scoped to a version.
pub trait ResultStore {
    /// Persists a validated result, deriving ancestor ids from the version row.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::NotFound`] when any part of the lineage is unknown.
    fn create_result(
        &self,
        ctx: &RequestContext,
        scope: &VersionScope,
        new: NewResult,
    ) -> Result<ResultRecord, TrackingError>;

    /// Loads a result that belongs to the scoped version.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::NotFound`] when the lineage is unknown or the
    /// result belongs to another version.
    fn get_result(
        &self,
        ctx: &RequestContext,
        scope: &VersionScope,
        id: ResultId,
    ) -> Result<ResultRecord, TrackingError>;

    /// Lists the results of a version.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::NotFound`] when any part of the lineage is unknown.
    fn list_results(
        &self,
        ctx: &RequestContext,
        scope: &VersionScope,
    ) -> Result<Vec<ResultRecord>, TrackingError>;
}

// ============================================================================
// SECTION: Composite Store
// ============================================================================

/// Full model tracking backend.
pub trait ModelTrackingStore:
    OrganizationStore + ModelStore + SchemaStore + VersionStore + ResultStore
{
    /// Reports backend readiness.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError`] when the backend is unavailable.
    fn readiness(&self) -> Result<(), TrackingError> {
        Ok(())
    }
}
