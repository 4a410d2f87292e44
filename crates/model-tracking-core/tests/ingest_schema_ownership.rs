// crates/model-tracking-core/tests/ingest_schema_ownership.rs
// ============================================================================
// Module: Ingestion Schema Ownership Tests
// Description: Ingestion over a backend that binds a version to a foreign schema.
// Purpose: Ensure a schema outside the version's organization is never used.
// Dependencies: model-tracking-core
// ============================================================================

//! ## Overview
//! Wraps the in-memory store so `get_version` reports a schema owned by a
//! different organization, then checks that ingestion refuses it and
//! writes nothing.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    missing_docs,
    reason = "Test-only panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use model_tracking_core::EntityKind;
use model_tracking_core::InMemoryModelTrackingStore;
use model_tracking_core::JsonPayload;
use model_tracking_core::ModelScope;
use model_tracking_core::ModelStore;
use model_tracking_core::NewModel;
use model_tracking_core::NewOrganization;
use model_tracking_core::NewResult;
use model_tracking_core::NewSchema;
use model_tracking_core::NewVersion;
use model_tracking_core::OrganizationScope;
use model_tracking_core::OrganizationStore;
use model_tracking_core::RequestContext;
use model_tracking_core::ResultId;
use model_tracking_core::ResultIngestor;
use model_tracking_core::ResultRecord;
use model_tracking_core::ResultStore;
use model_tracking_core::ResultSubmission;
use model_tracking_core::SchemaId;
use model_tracking_core::SchemaName;
use model_tracking_core::SchemaRecord;
use model_tracking_core::SchemaStore;
use model_tracking_core::TrackingError;
use model_tracking_core::VersionName;
use model_tracking_core::VersionRecord;
use model_tracking_core::VersionScope;
use model_tracking_core::VersionStore;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

const OPEN_SCHEMA: &str = r#"{"type":"object"}"#;

/// In-memory store whose versions all point at `foreign_schema`.
struct ForeignSchemaStore {
    inner: InMemoryModelTrackingStore,
    foreign_schema: SchemaId,
}

impl SchemaStore for ForeignSchemaStore {
    fn create_schema(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
        new: NewSchema,
    ) -> Result<SchemaRecord, TrackingError> {
        self.inner.create_schema(ctx, scope, new)
    }

    fn get_schema(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
        name: &SchemaName,
    ) -> Result<SchemaRecord, TrackingError> {
        self.inner.get_schema(ctx, scope, name)
    }

    fn get_schema_by_id(
        &self,
        ctx: &RequestContext,
        id: SchemaId,
    ) -> Result<SchemaRecord, TrackingError> {
        self.inner.get_schema_by_id(ctx, id)
    }

    fn list_schemas(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
    ) -> Result<Vec<SchemaRecord>, TrackingError> {
        self.inner.list_schemas(ctx, scope)
    }
}

impl VersionStore for ForeignSchemaStore {
    fn create_version(
        &self,
        ctx: &RequestContext,
        scope: &ModelScope,
        new: NewVersion,
    ) -> Result<VersionRecord, TrackingError> {
        self.inner.create_version(ctx, scope, new)
    }

    fn get_version(
        &self,
        ctx: &RequestContext,
        scope: &ModelScope,
        name: &VersionName,
    ) -> Result<VersionRecord, TrackingError> {
        let mut version = self.inner.get_version(ctx, scope, name)?;
        version.schema_id = self.foreign_schema;
        Ok(version)
    }

    fn get_or_create_version(
        &self,
        ctx: &RequestContext,
        scope: &ModelScope,
        name: &VersionName,
    ) -> Result<VersionRecord, TrackingError> {
        self.inner.get_or_create_version(ctx, scope, name)
    }

    fn list_versions(
        &self,
        ctx: &RequestContext,
        scope: &ModelScope,
    ) -> Result<Vec<VersionRecord>, TrackingError> {
        self.inner.list_versions(ctx, scope)
    }
}

impl ResultStore for ForeignSchemaStore {
    fn create_result(
        &self,
        ctx: &RequestContext,
        scope: &VersionScope,
        new: NewResult,
    ) -> Result<ResultRecord, TrackingError> {
        self.inner.create_result(ctx, scope, new)
    }

    fn get_result(
        &self,
        ctx: &RequestContext,
        scope: &VersionScope,
        id: ResultId,
    ) -> Result<ResultRecord, TrackingError> {
        self.inner.get_result(ctx, scope, id)
    }

    fn list_results(
        &self,
        ctx: &RequestContext,
        scope: &VersionScope,
    ) -> Result<Vec<ResultRecord>, TrackingError> {
        self.inner.list_results(ctx, scope)
    }
}

fn open_schema(name: &str) -> NewSchema {
    NewSchema {
        name: name.into(),
        input: OPEN_SCHEMA.to_string(),
        output: OPEN_SCHEMA.to_string(),
    }
}

/// Seeds `acme/tagger/v1` and a schema owned by `globex`.
fn foreign_store() -> ForeignSchemaStore {
    let inner = InMemoryModelTrackingStore::new();
    let ctx = RequestContext::background();
    for name in ["acme", "globex"] {
        inner
            .create_organization(&ctx, NewOrganization {
                name: name.into(),
            })
            .unwrap();
    }
    let acme = OrganizationScope::new("acme");
    let own = inner.create_schema(&ctx, &acme, open_schema("open")).unwrap();
    let foreign =
        inner.create_schema(&ctx, &OrganizationScope::new("globex"), open_schema("open")).unwrap();
    inner
        .create_model(&ctx, &acme, NewModel {
            name: "tagger".into(),
            default_schema_id: None,
        })
        .unwrap();
    inner
        .create_version(&ctx, &acme.model("tagger"), NewVersion {
            name: "v1".into(),
            schema_id: own.id,
        })
        .unwrap();
    ForeignSchemaStore {
        inner,
        foreign_schema: foreign.id,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn schema_from_another_organization_is_not_found() {
    let store = foreign_store();
    let ctx = RequestContext::background();
    let scope = VersionScope::new("acme", "tagger", "v1");
    let submission = ResultSubmission {
        input: JsonPayload::from("{}"),
        output: JsonPayload::from("{}"),
        true_output: JsonPayload::from("{}"),
        time: None,
    };

    let err = ResultIngestor::new(&store).ingest(&ctx, &scope, submission).unwrap_err();
    let TrackingError::NotFound {
        kind, ..
    } = &err
    else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(*kind, EntityKind::Schema);
    assert_eq!(err.http_status(), 404);
    assert!(store.list_results(&ctx, &scope).unwrap().is_empty());
}
