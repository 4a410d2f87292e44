// crates/model-tracking-core/src/runtime/tracker.rs
// ============================================================================
// Module: Model Tracker
// Description: Logged facade over a model tracking store.
// Purpose: Offer one entry point per operation to request layers.
// Dependencies: crate::core, crate::interfaces, crate::logging, crate::runtime
// ============================================================================

//! ## Overview
//! [`ModelTracker`] forwards every operation to its store (or to the
//! ingestion pipeline for result submission) and emits one
//! [`TrackingEvent`] per call. The log sink is optional; without one the
//! tracker uses [`NoopLogSink`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Instant;

use crate::core::ModelName;
use crate::core::ModelRecord;
use crate::core::ModelScope;
use crate::core::ModelUpdate;
use crate::core::NewModel;
use crate::core::NewOrganization;
use crate::core::NewSchema;
use crate::core::NewVersion;
use crate::core::OrganizationName;
use crate::core::OrganizationRecord;
use crate::core::OrganizationScope;
use crate::core::ResultId;
use crate::core::ResultRecord;
use crate::core::ResultSubmission;
use crate::core::SchemaId;
use crate::core::SchemaName;
use crate::core::SchemaRecord;
use crate::core::TrackingError;
use crate::core::VersionName;
use crate::core::VersionRecord;
use crate::core::VersionScope;
use crate::interfaces::ModelTrackingStore;
use crate::logging::NoopLogSink;
use crate::logging::TrackingEvent;
use crate::logging::TrackingEventParams;
use crate::logging::TrackingLogSink;
use crate::runtime::context::RequestContext;
use crate::runtime::ingest::ResultIngestor;

// ============================================================================
// SECTION: Operation Labels
// ============================================================================

/// Operation class, used to pick event status and level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperationClass {
    /// Read-only lookup.
    Read,
    /// Entity creation.
    Create,
    /// In-place update.
    Update,
}

/// Scope names attached to an event.
#[derive(Debug, Clone, Default)]
struct ScopeLabels {
    /// Organization name.
    organization: Option<String>,
    /// Model name.
    model: Option<String>,
    /// Version name.
    version: Option<String>,
}

impl From<&OrganizationScope> for ScopeLabels {
    fn from(scope: &OrganizationScope) -> Self {
        Self {
            organization: Some(scope.organization.to_string()),
            ..Self::default()
        }
    }
}

impl From<&ModelScope> for ScopeLabels {
    fn from(scope: &ModelScope) -> Self {
        Self {
            organization: Some(scope.organization.to_string()),
            model: Some(scope.model.to_string()),
            version: None,
        }
    }
}

impl From<&VersionScope> for ScopeLabels {
    fn from(scope: &VersionScope) -> Self {
        Self {
            organization: Some(scope.organization.to_string()),
            model: Some(scope.model.to_string()),
            version: Some(scope.version.to_string()),
        }
    }
}

// ============================================================================
// SECTION: Tracker
// ============================================================================

/// Logged facade over a [`ModelTrackingStore`].
pub struct ModelTracker<S> {
    /// Backing store.
    store: S,
    /// Event sink.
    sink: Arc<dyn TrackingLogSink>,
    /// Optional payload size limit applied during ingestion.
    max_payload_bytes: Option<usize>,
}

impl<S: ModelTrackingStore> ModelTracker<S> {
    /// Creates a tracker that discards log events.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            sink: Arc::new(NoopLogSink),
            max_payload_bytes: None,
        }
    }

    /// Replaces the log sink; `None` restores the no-op sink.
    #[must_use]
    pub fn with_log_sink(mut self, sink: Option<Arc<dyn TrackingLogSink>>) -> Self {
        self.sink = sink.unwrap_or_else(|| Arc::new(NoopLogSink));
        self
    }

    /// Sets the ingestion payload size limit.
    #[must_use]
    pub const fn with_max_payload_bytes(mut self, limit: usize) -> Self {
        self.max_payload_bytes = Some(limit);
        self
    }

    /// Returns the backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    // ------------------------------------------------------------------
    // Organizations
    // ------------------------------------------------------------------

    /// Creates an organization.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError`] from the store.
    pub fn create_organization(
        &self,
        ctx: &RequestContext,
        new: NewOrganization,
    ) -> Result<OrganizationRecord, TrackingError> {
        let labels = ScopeLabels {
            organization: Some(new.name.to_string()),
            ..ScopeLabels::default()
        };
        self.observe(
            "organization.create",
            OperationClass::Create,
            labels,
            |record: &OrganizationRecord| record.id.get(),
            || self.store.create_organization(ctx, new),
        )
    }

    /// Loads an organization by name.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError`] from the store.
    pub fn get_organization(
        &self,
        ctx: &RequestContext,
        name: &OrganizationName,
    ) -> Result<OrganizationRecord, TrackingError> {
        let labels = ScopeLabels {
            organization: Some(name.to_string()),
            ..ScopeLabels::default()
        };
        self.observe(
            "organization.get",
            OperationClass::Read,
            labels,
            |record: &OrganizationRecord| record.id.get(),
            || self.store.get_organization(ctx, name),
        )
    }

    /// Lists all organizations.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError`] from the store.
    pub fn list_organizations(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<OrganizationRecord>, TrackingError> {
        self.observe_list("organization.list", ScopeLabels::default(), || {
            self.store.list_organizations(ctx)
        })
    }

    // ------------------------------------------------------------------
    // Models
    // ------------------------------------------------------------------

    /// Creates a model.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError`] from the store.
    pub fn create_model(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
        new: NewModel,
    ) -> Result<ModelRecord, TrackingError> {
        let mut labels = ScopeLabels::from(scope);
        labels.model = Some(new.name.to_string());
        self.observe(
            "model.create",
            OperationClass::Create,
            labels,
            |record: &ModelRecord| record.id.get(),
            || self.store.create_model(ctx, scope, new),
        )
    }

    /// Swaps a model's default schema.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError`] from the store.
    pub fn update_model(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
        update: ModelUpdate,
    ) -> Result<ModelRecord, TrackingError> {
        let mut labels = ScopeLabels::from(scope);
        labels.model = Some(update.name.to_string());
        self.observe(
            "model.update",
            OperationClass::Update,
            labels,
            |record: &ModelRecord| record.id.get(),
            || self.store.update_model(ctx, scope, update),
        )
    }

    /// Loads a model by name.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError`] from the store.
    pub fn get_model(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
        name: &ModelName,
    ) -> Result<ModelRecord, TrackingError> {
        let mut labels = ScopeLabels::from(scope);
        labels.model = Some(name.to_string());
        self.observe(
            "model.get",
            OperationClass::Read,
            labels,
            |record: &ModelRecord| record.id.get(),
            || self.store.get_model(ctx, scope, name),
        )
    }

    /// Lists the models of an organization.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError`] from the store.
    pub fn list_models(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
    ) -> Result<Vec<ModelRecord>, TrackingError> {
        self.observe_list("model.list", ScopeLabels::from(scope), || {
            self.store.list_models(ctx, scope)
        })
    }

    // ------------------------------------------------------------------
    // Schemas
    // ------------------------------------------------------------------

    /// Creates a schema pair.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError`] from the store.
    pub fn create_schema(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
        new: NewSchema,
    ) -> Result<SchemaRecord, TrackingError> {
        self.observe(
            "schema.create",
            OperationClass::Create,
            ScopeLabels::from(scope),
            |record: &SchemaRecord| record.id.get(),
            || self.store.create_schema(ctx, scope, new),
        )
    }

    /// Loads a schema by name.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError`] from the store.
    pub fn get_schema(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
        name: &SchemaName,
    ) -> Result<SchemaRecord, TrackingError> {
        self.observe(
            "schema.get",
            OperationClass::Read,
            ScopeLabels::from(scope),
            |record: &SchemaRecord| record.id.get(),
            || self.store.get_schema(ctx, scope, name),
        )
    }

    /// Loads a schema by id.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError`] from the store.
    pub fn get_schema_by_id(
        &self,
        ctx: &RequestContext,
        id: SchemaId,
    ) -> Result<SchemaRecord, TrackingError> {
        self.observe(
            "schema.get_by_id",
            OperationClass::Read,
            ScopeLabels::default(),
            |record: &SchemaRecord| record.id.get(),
            || self.store.get_schema_by_id(ctx, id),
        )
    }

    /// Lists the schemas of an organization.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError`] from the store.
    pub fn list_schemas(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
    ) -> Result<Vec<SchemaRecord>, TrackingError> {
        self.observe_list("schema.list", ScopeLabels::from(scope), || {
            self.store.list_schemas(ctx, scope)
        })
    }

    // ------------------------------------------------------------------
    // Versions
    // ------------------------------------------------------------------

    /// Creates a version.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError`] from the store.
    pub fn create_version(
        &self,
        ctx: &RequestContext,
        scope: &ModelScope,
        new: NewVersion,
    ) -> Result<VersionRecord, TrackingError> {
        let mut labels = ScopeLabels::from(scope);
        labels.version = Some(new.name.to_string());
        self.observe(
            "version.create",
            OperationClass::Create,
            labels,
            |record: &VersionRecord| record.id.get(),
            || self.store.create_version(ctx, scope, new),
        )
    }

    /// Loads a version by name.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError`] from the store.
    pub fn get_version(
        &self,
        ctx: &RequestContext,
        scope: &ModelScope,
        name: &VersionName,
    ) -> Result<VersionRecord, TrackingError> {
        let mut labels = ScopeLabels::from(scope);
        labels.version = Some(name.to_string());
        self.observe(
            "version.get",
            OperationClass::Read,
            labels,
            |record: &VersionRecord| record.id.get(),
            || self.store.get_version(ctx, scope, name),
        )
    }

    /// Returns the named version, creating it from the model default schema.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError`] from the store.
    pub fn get_or_create_version(
        &self,
        ctx: &RequestContext,
        scope: &ModelScope,
        name: &VersionName,
    ) -> Result<VersionRecord, TrackingError> {
        let mut labels = ScopeLabels::from(scope);
        labels.version = Some(name.to_string());
        self.observe(
            "version.get_or_create",
            OperationClass::Update,
            labels,
            |record: &VersionRecord| record.id.get(),
            || self.store.get_or_create_version(ctx, scope, name),
        )
    }

    /// Lists the versions of a model.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError`] from the store.
    pub fn list_versions(
        &self,
        ctx: &RequestContext,
        scope: &ModelScope,
    ) -> Result<Vec<VersionRecord>, TrackingError> {
        self.observe_list("version.list", ScopeLabels::from(scope), || {
            self.store.list_versions(ctx, scope)
        })
    }

    // ------------------------------------------------------------------
    // Results
    // ------------------------------------------------------------------

    /// Validates and persists a result submission.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError`] from the ingestion pipeline.
    pub fn submit_result(
        &self,
        ctx: &RequestContext,
        scope: &VersionScope,
        submission: ResultSubmission,
    ) -> Result<ResultRecord, TrackingError> {
        let mut ingestor = ResultIngestor::new(&self.store);
        if let Some(limit) = self.max_payload_bytes {
            ingestor = ingestor.with_max_payload_bytes(limit);
        }
        self.observe(
            "result.ingest",
            OperationClass::Create,
            ScopeLabels::from(scope),
            |record: &ResultRecord| record.id.get(),
            || ingestor.ingest(ctx, scope, submission),
        )
    }

    /// Loads a result of the scoped version.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError`] from the store.
    pub fn get_result(
        &self,
        ctx: &RequestContext,
        scope: &VersionScope,
        id: ResultId,
    ) -> Result<ResultRecord, TrackingError> {
        self.observe(
            "result.get",
            OperationClass::Read,
            ScopeLabels::from(scope),
            |record: &ResultRecord| record.id.get(),
            || self.store.get_result(ctx, scope, id),
        )
    }

    /// Lists the results of a version.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError`] from the store.
    pub fn list_results(
        &self,
        ctx: &RequestContext,
        scope: &VersionScope,
    ) -> Result<Vec<ResultRecord>, TrackingError> {
        self.observe_list("result.list", ScopeLabels::from(scope), || {
            self.store.list_results(ctx, scope)
        })
    }

    /// Reports backend readiness.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError`] when the backend is unavailable.
    pub fn readiness(&self) -> Result<(), TrackingError> {
        self.observe(
            "store.readiness",
            OperationClass::Read,
            ScopeLabels::default(),
            |_| 0,
            || self.store.readiness(),
        )
    }

    // ------------------------------------------------------------------
    // Event plumbing
    // ------------------------------------------------------------------

    /// Runs a list operation and records its event.
    fn observe_list<T>(
        &self,
        operation: &'static str,
        labels: ScopeLabels,
        run: impl FnOnce() -> Result<Vec<T>, TrackingError>,
    ) -> Result<Vec<T>, TrackingError> {
        self.observe(operation, OperationClass::Read, labels, |_| 0, run)
    }

    /// Runs an operation and records its event.
    fn observe<T>(
        &self,
        operation: &'static str,
        class: OperationClass,
        labels: ScopeLabels,
        entity_id: impl FnOnce(&T) -> u64,
        run: impl FnOnce() -> Result<T, TrackingError>,
    ) -> Result<T, TrackingError> {
        let started = Instant::now();
        let result = run();
        let (error_kind, id) = match &result {
            Ok(value) => (None, Some(entity_id(value)).filter(|id| *id != 0)),
            Err(err) => (Some(err.kind()), None),
        };
        let event = TrackingEvent::new(TrackingEventParams {
            operation,
            read_only: class == OperationClass::Read,
            creates: class == OperationClass::Create,
            error_kind,
            organization: labels.organization,
            model: labels.model,
            version: labels.version,
            entity_id: id,
            elapsed_ms: started.elapsed().as_millis(),
        });
        self.sink.record(&event);
        result
    }
}
