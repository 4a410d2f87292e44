// crates/model-tracking-core/src/runtime/store.rs
// ============================================================================
// Module: In-Memory Model Tracking Store
// Description: Mutex-guarded in-memory implementation of every store trait.
// Purpose: Provide a dependency-free backend for tests and embedding.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The in-memory store keeps every table in one mutex-protected state value,
//! so each operation observes and mutates a consistent snapshot exactly like
//! a serialized database transaction. Ids are assigned sequentially from 1.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::EntityKind;
use crate::core::ModelId;
use crate::core::ModelName;
use crate::core::ModelRecord;
use crate::core::ModelScope;
use crate::core::ModelUpdate;
use crate::core::NewModel;
use crate::core::NewOrganization;
use crate::core::NewResult;
use crate::core::NewSchema;
use crate::core::NewVersion;
use crate::core::OrganizationId;
use crate::core::OrganizationName;
use crate::core::OrganizationRecord;
use crate::core::OrganizationScope;
use crate::core::ResultId;
use crate::core::ResultRecord;
use crate::core::SchemaId;
use crate::core::SchemaName;
use crate::core::SchemaRecord;
use crate::core::Timestamp;
use crate::core::TrackingError;
use crate::core::VersionId;
use crate::core::VersionName;
use crate::core::VersionRecord;
use crate::core::VersionScope;
use crate::interfaces::ModelStore;
use crate::interfaces::ModelTrackingStore;
use crate::interfaces::OrganizationStore;
use crate::interfaces::ResultStore;
use crate::interfaces::SchemaStore;
use crate::interfaces::VersionStore;
use crate::runtime::context::RequestContext;
use crate::runtime::validator::validate_schema_documents;

// ============================================================================
// SECTION: State
// ============================================================================

/// All tables held by the in-memory store.
#[derive(Debug, Default)]
struct MemoryState {
    /// Organization rows.
    organizations: Vec<OrganizationRecord>,
    /// Model rows.
    models: Vec<ModelRecord>,
    /// Schema rows.
    schemas: Vec<SchemaRecord>,
    /// Version rows.
    versions: Vec<VersionRecord>,
    /// Result rows.
    results: Vec<ResultRecord>,
}

/// Returns the next 1-based id for a table of `len` rows.
fn next_id(len: usize) -> u64 {
    u64::try_from(len).map_or(u64::MAX, |len| len.saturating_add(1))
}

/// Converts a raw id into a typed identifier.
fn typed_id<T>(raw: u64, build: fn(u64) -> Option<T>) -> Result<T, TrackingError> {
    build(raw).ok_or_else(|| TrackingError::Internal("identifier overflow".to_string()))
}

impl MemoryState {
    /// Resolves an organization by name.
    fn organization(&self, name: &OrganizationName) -> Result<&OrganizationRecord, TrackingError> {
        self.organizations
            .iter()
            .find(|org| &org.name == name)
            .ok_or_else(|| TrackingError::not_found(EntityKind::Organization, name))
    }

    /// Resolves a model by organization and model name.
    fn model(
        &self,
        organization_id: OrganizationId,
        name: &ModelName,
    ) -> Result<&ModelRecord, TrackingError> {
        self.models
            .iter()
            .find(|model| model.organization_id == organization_id && &model.name == name)
            .ok_or_else(|| TrackingError::not_found(EntityKind::Model, name))
    }

    /// Resolves a model scope to its model row.
    fn model_in_scope(&self, scope: &ModelScope) -> Result<&ModelRecord, TrackingError> {
        let organization = self.organization(&scope.organization)?;
        self.model(organization.id, &scope.model)
    }

    /// Resolves a version by model and version name.
    fn version(
        &self,
        model_id: ModelId,
        name: &VersionName,
    ) -> Result<&VersionRecord, TrackingError> {
        self.versions
            .iter()
            .find(|version| version.model_id == model_id && &version.name == name)
            .ok_or_else(|| TrackingError::not_found(EntityKind::Version, name))
    }

    /// Resolves a version scope to its version row.
    fn version_in_scope(&self, scope: &VersionScope) -> Result<&VersionRecord, TrackingError> {
        let model = self.model_in_scope(&scope.model_scope())?;
        self.version(model.id, &scope.version)
    }

    /// Resolves a schema id owned by `organization_id`.
    fn owned_schema(
        &self,
        organization_id: OrganizationId,
        id: SchemaId,
    ) -> Result<&SchemaRecord, TrackingError> {
        self.schemas
            .iter()
            .find(|schema| schema.id == id && schema.organization_id == organization_id)
            .ok_or_else(|| TrackingError::not_found(EntityKind::Schema, id))
    }

    /// Inserts a version row after its lineage has been resolved.
    fn insert_version(
        &mut self,
        model: &ModelRecord,
        name: VersionName,
        schema_id: SchemaId,
    ) -> Result<VersionRecord, TrackingError> {
        if self.version(model.id, &name).is_ok() {
            return Err(TrackingError::Conflict(format!("version already exists: {name}")));
        }
        let now = Timestamp::now();
        let record = VersionRecord {
            id: typed_id(next_id(self.versions.len()), VersionId::from_raw)?,
            name,
            organization_id: model.organization_id,
            model_id: model.id,
            schema_id,
            created: now,
            updated: now,
        };
        self.versions.push(record.clone());
        Ok(record)
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// In-memory model tracking store for tests and examples.
#[derive(Debug, Clone, Default)]
pub struct InMemoryModelTrackingStore {
    /// Shared state protected by a mutex.
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryModelTrackingStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the shared state after checking the request context.
    fn lock(&self, ctx: &RequestContext) -> Result<MutexGuard<'_, MemoryState>, TrackingError> {
        ctx.check()?;
        self.state
            .lock()
            .map_err(|_| TrackingError::Internal("in-memory store mutex poisoned".to_string()))
    }
}

/// Rejects blank names.
fn require_name(kind: EntityKind, blank: bool) -> Result<(), TrackingError> {
    if blank {
        return Err(TrackingError::InvalidInput(format!("{kind} name must not be empty")));
    }
    Ok(())
}

impl OrganizationStore for InMemoryModelTrackingStore {
    fn create_organization(
        &self,
        ctx: &RequestContext,
        new: NewOrganization,
    ) -> Result<OrganizationRecord, TrackingError> {
        require_name(EntityKind::Organization, new.name.is_blank())?;
        let mut state = self.lock(ctx)?;
        if state.organization(&new.name).is_ok() {
            return Err(TrackingError::Conflict(format!(
                "organization already exists: {}",
                new.name
            )));
        }
        let now = Timestamp::now();
        let record = OrganizationRecord {
            id: typed_id(next_id(state.organizations.len()), OrganizationId::from_raw)?,
            name: new.name,
            created: now,
            updated: now,
        };
        state.organizations.push(record.clone());
        Ok(record)
    }

    fn get_organization(
        &self,
        ctx: &RequestContext,
        name: &OrganizationName,
    ) -> Result<OrganizationRecord, TrackingError> {
        let state = self.lock(ctx)?;
        state.organization(name).cloned()
    }

    fn list_organizations(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<OrganizationRecord>, TrackingError> {
        let state = self.lock(ctx)?;
        Ok(state.organizations.clone())
    }
}

impl ModelStore for InMemoryModelTrackingStore {
    fn create_model(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
        new: NewModel,
    ) -> Result<ModelRecord, TrackingError> {
        require_name(EntityKind::Model, new.name.is_blank())?;
        let mut state = self.lock(ctx)?;
        let organization_id = state.organization(&scope.organization)?.id;
        if let Some(schema_id) = new.default_schema_id {
            state.owned_schema(organization_id, schema_id)?;
        }
        if state.model(organization_id, &new.name).is_ok() {
            return Err(TrackingError::Conflict(format!("model already exists: {}", new.name)));
        }
        let now = Timestamp::now();
        let record = ModelRecord {
            id: typed_id(next_id(state.models.len()), ModelId::from_raw)?,
            name: new.name,
            organization_id,
            default_schema_id: new.default_schema_id,
            created: now,
            updated: now,
        };
        state.models.push(record.clone());
        Ok(record)
    }

    fn update_model(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
        update: ModelUpdate,
    ) -> Result<ModelRecord, TrackingError> {
        let mut state = self.lock(ctx)?;
        let organization_id = state.organization(&scope.organization)?.id;
        let model_id = state.model(organization_id, &update.name)?.id;
        if let Some(schema_id) = update.default_schema_id {
            state.owned_schema(organization_id, schema_id)?;
        }
        let model = state
            .models
            .iter_mut()
            .find(|model| model.id == model_id)
            .ok_or_else(|| TrackingError::not_found(EntityKind::Model, &update.name))?;
        model.default_schema_id = update.default_schema_id;
        model.updated = Timestamp::now().max(model.updated);
        Ok(model.clone())
    }

    fn get_model(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
        name: &ModelName,
    ) -> Result<ModelRecord, TrackingError> {
        let state = self.lock(ctx)?;
        let organization_id = state.organization(&scope.organization)?.id;
        state.model(organization_id, name).cloned()
    }

    fn list_models(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
    ) -> Result<Vec<ModelRecord>, TrackingError> {
        let state = self.lock(ctx)?;
        let organization_id = state.organization(&scope.organization)?.id;
        Ok(state
            .models
            .iter()
            .filter(|model| model.organization_id == organization_id)
            .cloned()
            .collect())
    }
}

impl SchemaStore for InMemoryModelTrackingStore {
    fn create_schema(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
        new: NewSchema,
    ) -> Result<SchemaRecord, TrackingError> {
        require_name(EntityKind::Schema, new.name.is_blank())?;
        validate_schema_documents(&new.input, &new.output)?;
        let mut state = self.lock(ctx)?;
        let organization_id = state.organization(&scope.organization)?.id;
        let duplicate = state
            .schemas
            .iter()
            .any(|schema| schema.organization_id == organization_id && schema.name == new.name);
        if duplicate {
            return Err(TrackingError::Conflict(format!("schema already exists: {}", new.name)));
        }
        let now = Timestamp::now();
        let record = SchemaRecord {
            id: typed_id(next_id(state.schemas.len()), SchemaId::from_raw)?,
            name: new.name,
            organization_id,
            input: new.input,
            output: new.output,
            created: now,
            updated: now,
        };
        state.schemas.push(record.clone());
        Ok(record)
    }

    fn get_schema(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
        name: &SchemaName,
    ) -> Result<SchemaRecord, TrackingError> {
        let state = self.lock(ctx)?;
        let organization_id = state.organization(&scope.organization)?.id;
        state
            .schemas
            .iter()
            .find(|schema| schema.organization_id == organization_id && &schema.name == name)
            .cloned()
            .ok_or_else(|| TrackingError::not_found(EntityKind::Schema, name))
    }

    fn get_schema_by_id(
        &self,
        ctx: &RequestContext,
        id: SchemaId,
    ) -> Result<SchemaRecord, TrackingError> {
        let state = self.lock(ctx)?;
        state
            .schemas
            .iter()
            .find(|schema| schema.id == id)
            .cloned()
            .ok_or_else(|| TrackingError::not_found(EntityKind::Schema, id))
    }

    fn list_schemas(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
    ) -> Result<Vec<SchemaRecord>, TrackingError> {
        let state = self.lock(ctx)?;
        let organization_id = state.organization(&scope.organization)?.id;
        Ok(state
            .schemas
            .iter()
            .filter(|schema| schema.organization_id == organization_id)
            .cloned()
            .collect())
    }
}

impl VersionStore for InMemoryModelTrackingStore {
    fn create_version(
        &self,
        ctx: &RequestContext,
        scope: &ModelScope,
        new: NewVersion,
    ) -> Result<VersionRecord, TrackingError> {
        require_name(EntityKind::Version, new.name.is_blank())?;
        let mut state = self.lock(ctx)?;
        let model = state.model_in_scope(scope)?.clone();
        state.owned_schema(model.organization_id, new.schema_id)?;
        state.insert_version(&model, new.name, new.schema_id)
    }

    fn get_version(
        &self,
        ctx: &RequestContext,
        scope: &ModelScope,
        name: &VersionName,
    ) -> Result<VersionRecord, TrackingError> {
        let state = self.lock(ctx)?;
        let model_id = state.model_in_scope(scope)?.id;
        state.version(model_id, name).cloned()
    }

    fn get_or_create_version(
        &self,
        ctx: &RequestContext,
        scope: &ModelScope,
        name: &VersionName,
    ) -> Result<VersionRecord, TrackingError> {
        let mut state = self.lock(ctx)?;
        let model = state.model_in_scope(scope)?.clone();
        match state.version(model.id, name) {
            Ok(version) => return Ok(version.clone()),
            Err(err) if !err.is_not_found() => return Err(err),
            Err(_) => {}
        }
        let Some(schema_id) = model.default_schema_id else {
            return Err(TrackingError::not_found(EntityKind::Version, name));
        };
        require_name(EntityKind::Version, name.is_blank())?;
        state.insert_version(&model, name.clone(), schema_id)
    }

    fn list_versions(
        &self,
        ctx: &RequestContext,
        scope: &ModelScope,
    ) -> Result<Vec<VersionRecord>, TrackingError> {
        let state = self.lock(ctx)?;
        let model_id = state.model_in_scope(scope)?.id;
        Ok(state.versions.iter().filter(|version| version.model_id == model_id).cloned().collect())
    }
}

impl ResultStore for InMemoryModelTrackingStore {
    fn create_result(
        &self,
        ctx: &RequestContext,
        scope: &VersionScope,
        new: NewResult,
    ) -> Result<ResultRecord, TrackingError> {
        let mut state = self.lock(ctx)?;
        let version = state.version_in_scope(scope)?.clone();
        let now = Timestamp::now();
        let record = ResultRecord {
            id: typed_id(next_id(state.results.len()), ResultId::from_raw)?,
            organization_id: version.organization_id,
            model_id: version.model_id,
            version_id: version.id,
            input: new.input,
            output: new.output,
            true_output: new.true_output,
            time: new.time,
            created: now,
            updated: now,
        };
        state.results.push(record.clone());
        Ok(record)
    }

    fn get_result(
        &self,
        ctx: &RequestContext,
        scope: &VersionScope,
        id: ResultId,
    ) -> Result<ResultRecord, TrackingError> {
        let state = self.lock(ctx)?;
        let version_id = state.version_in_scope(scope)?.id;
        state
            .results
            .iter()
            .find(|result| result.id == id && result.version_id == version_id)
            .cloned()
            .ok_or_else(|| TrackingError::not_found(EntityKind::Result, id))
    }

    fn list_results(
        &self,
        ctx: &RequestContext,
        scope: &VersionScope,
    ) -> Result<Vec<ResultRecord>, TrackingError> {
        let state = self.lock(ctx)?;
        let version_id = state.version_in_scope(scope)?.id;
        Ok(state.results.iter().filter(|result| result.version_id == version_id).cloned().collect())
    }
}

impl ModelTrackingStore for InMemoryModelTrackingStore {}
