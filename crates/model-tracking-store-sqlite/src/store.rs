// crates/model-tracking-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Model Tracking Store
// Description: Durable model tracking store backed by SQLite.
// Purpose: Persist lineage and results with atomic multi-step creations.
// Dependencies: model-tracking-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements every model tracking store interface on `SQLite`.
//! Writes go through a single mutex-guarded connection and run as immediate
//! transactions: parents are resolved by name, foreign references are
//! checked, and the child is inserted before one commit. Reads use a small
//! round-robin pool of separate connections. The request context is checked
//! before each transaction, between steps, and before commit.
//! Security posture: database contents and request payloads are untrusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use model_tracking_core::EntityKind;
use model_tracking_core::ModelName;
use model_tracking_core::ModelRecord;
use model_tracking_core::ModelScope;
use model_tracking_core::ModelStore;
use model_tracking_core::ModelTrackingStore;
use model_tracking_core::ModelUpdate;
use model_tracking_core::NewModel;
use model_tracking_core::NewOrganization;
use model_tracking_core::NewResult;
use model_tracking_core::NewSchema;
use model_tracking_core::NewVersion;
use model_tracking_core::OrganizationName;
use model_tracking_core::OrganizationRecord;
use model_tracking_core::OrganizationScope;
use model_tracking_core::OrganizationStore;
use model_tracking_core::RequestContext;
use model_tracking_core::ResultId;
use model_tracking_core::ResultRecord;
use model_tracking_core::ResultStore;
use model_tracking_core::SchemaId;
use model_tracking_core::SchemaName;
use model_tracking_core::SchemaRecord;
use model_tracking_core::SchemaStore;
use model_tracking_core::Timestamp;
use model_tracking_core::TrackingError;
use model_tracking_core::VersionName;
use model_tracking_core::VersionRecord;
use model_tracking_core::VersionScope;
use model_tracking_core::VersionStore;
use model_tracking_core::validate_schema_documents;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::queries;
use crate::schema::initialize_schema;
use crate::tx::Txable;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Hard upper bound for the configurable result payload limit.
pub const MAX_PAYLOAD_BYTES: usize = 16 * 1024 * 1024;
/// Hard upper bound for the configurable schema document limit.
pub const MAX_SCHEMA_BYTES: usize = 1024 * 1024;
/// Default per-payload size limit.
const DEFAULT_MAX_PAYLOAD_BYTES: usize = 1024 * 1024;
/// Default per-document schema size limit.
const DEFAULT_MAX_SCHEMA_BYTES: usize = 256 * 1024;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` model tracking store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
/// - `read_pool_size` must be greater than zero.
/// - `max_payload_bytes` is in `1..=MAX_PAYLOAD_BYTES`.
/// - `max_schema_bytes` is in `1..=MAX_SCHEMA_BYTES`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Number of read connections.
    #[serde(default = "default_read_pool_size")]
    pub read_pool_size: usize,
    /// Maximum size of each result payload in bytes.
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
    /// Maximum size of each schema document in bytes.
    #[serde(default = "default_max_schema_bytes")]
    pub max_schema_bytes: usize,
}

impl SqliteStoreConfig {
    /// Returns a configuration with defaults for everything but the path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
            read_pool_size: default_read_pool_size(),
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            max_schema_bytes: DEFAULT_MAX_SCHEMA_BYTES,
        }
    }

    /// Validates path safety and limits.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Invalid`] when a value is out of range.
    pub fn validate(&self) -> Result<(), SqliteStoreError> {
        validate_store_path(&self.path)?;
        if self.read_pool_size == 0 {
            return Err(SqliteStoreError::Invalid(
                "read_pool_size must be greater than zero".to_string(),
            ));
        }
        if self.max_payload_bytes == 0 || self.max_payload_bytes > MAX_PAYLOAD_BYTES {
            return Err(SqliteStoreError::Invalid(format!(
                "max_payload_bytes out of range: {} (max {MAX_PAYLOAD_BYTES})",
                self.max_payload_bytes
            )));
        }
        if self.max_schema_bytes == 0 || self.max_schema_bytes > MAX_SCHEMA_BYTES {
            return Err(SqliteStoreError::Invalid(format!(
                "max_schema_bytes out of range: {} (max {MAX_SCHEMA_BYTES})",
                self.max_schema_bytes
            )));
        }
        Ok(())
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default read connection pool size.
const fn default_read_pool_size() -> usize {
    4
}

/// Returns the default result payload limit.
const fn default_max_payload_bytes() -> usize {
    DEFAULT_MAX_PAYLOAD_BYTES
}

/// Returns the default schema document limit.
const fn default_max_schema_bytes() -> usize {
    DEFAULT_MAX_SCHEMA_BYTES
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages avoid embedding raw result payloads.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Stored data failed to decode.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid request or configuration.
    #[error("{0}")]
    Invalid(String),
    /// Payload exceeded configured size limits.
    #[error("{field} exceeds size limit: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Field that was too large.
        field: &'static str,
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
    /// A uniqueness constraint rejected the write.
    #[error("{0}")]
    Conflict(String),
    /// A named or identified entity does not exist.
    #[error("{kind} not found: {name}")]
    NotFound {
        /// Kind of the missing entity.
        kind: EntityKind,
        /// Name or identifier that failed to resolve.
        name: String,
    },
    /// A transaction handle was begun twice.
    #[error("the underlying transaction has already been used")]
    TransactionSpent,
    /// The request context was canceled or expired.
    #[error("{0}")]
    Canceled(String),
}

impl SqliteStoreError {
    /// Builds a not-found error.
    pub(crate) fn not_found(kind: EntityKind, name: impl std::fmt::Display) -> Self {
        Self::NotFound {
            kind,
            name: name.to_string(),
        }
    }
}

impl From<SqliteStoreError> for TrackingError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::NotFound {
                kind,
                name,
            } => Self::NotFound {
                kind,
                name,
            },
            SqliteStoreError::Conflict(message) => Self::Conflict(message),
            SqliteStoreError::Invalid(message) => Self::InvalidInput(message),
            err @ SqliteStoreError::TooLarge {
                ..
            } => Self::InvalidInput(err.to_string()),
            SqliteStoreError::Canceled(message) => Self::Canceled(message),
            err @ (SqliteStoreError::Io(_)
            | SqliteStoreError::Db(_)
            | SqliteStoreError::Corrupt(_)
            | SqliteStoreError::VersionMismatch(_)
            | SqliteStoreError::TransactionSpent) => Self::Internal(err.to_string()),
        }
    }
}

/// Converts a failed context check into a store error.
fn check_context(ctx: &RequestContext) -> Result<(), SqliteStoreError> {
    ctx.check().map_err(|err| match err {
        TrackingError::Canceled(message) => SqliteStoreError::Canceled(message),
        other => SqliteStoreError::Invalid(other.to_string()),
    })
}

/// Rejects blank entity names.
fn require_name(kind: EntityKind, blank: bool) -> Result<(), SqliteStoreError> {
    if blank {
        return Err(SqliteStoreError::Invalid(format!("{kind} name must not be empty")));
    }
    Ok(())
}

/// Rejects a field larger than `max_bytes`.
const fn require_size(
    field: &'static str,
    actual_bytes: usize,
    max_bytes: usize,
) -> Result<(), SqliteStoreError> {
    if actual_bytes > max_bytes {
        return Err(SqliteStoreError::TooLarge {
            field,
            max_bytes,
            actual_bytes,
        });
    }
    Ok(())
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed model tracking store.
///
/// # Invariants
/// - All writes are serialized through one connection mutex.
/// - Every multi-step creation commits once or not at all.
#[derive(Clone)]
pub struct SqliteModelTrackingStore {
    /// Store configuration.
    config: SqliteStoreConfig,
    /// Shared writer connection guarded by a mutex.
    write_connection: Arc<Mutex<Connection>>,
    /// Read connection pool.
    read_connections: Arc<Vec<Mutex<Connection>>>,
    /// Round-robin cursor for read connection selection.
    read_cursor: Arc<AtomicUsize>,
}

impl std::fmt::Debug for SqliteModelTrackingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteModelTrackingStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SqliteModelTrackingStore {
    /// Opens an `SQLite`-backed model tracking store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the configuration is invalid or the
    /// database cannot be opened or initialized.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        config.validate()?;
        ensure_parent_dir(&config.path)?;
        let mut write_connection = open_connection(&config)?;
        initialize_schema(&mut write_connection)?;
        let mut read_connections = Vec::with_capacity(config.read_pool_size);
        for _ in 0 .. config.read_pool_size {
            read_connections.push(Mutex::new(open_connection(&config)?));
        }
        Ok(Self {
            config,
            write_connection: Arc::new(Mutex::new(write_connection)),
            read_connections: Arc::new(read_connections),
            read_cursor: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Returns the store configuration.
    #[must_use]
    pub const fn config(&self) -> &SqliteStoreConfig {
        &self.config
    }

    /// Returns the next read connection using round-robin selection.
    fn read_connection(&self) -> Result<&Mutex<Connection>, SqliteStoreError> {
        let len = self.read_connections.len();
        if len == 0 {
            return Err(SqliteStoreError::Invalid("read pool is empty".to_string()));
        }
        let index = self.read_cursor.fetch_add(1, Ordering::Relaxed) % len;
        self.read_connections
            .get(index)
            .ok_or_else(|| SqliteStoreError::Io("read connection missing".to_string()))
    }

    /// Runs a read-only operation on a pooled connection.
    fn with_reader<T>(
        &self,
        ctx: &RequestContext,
        run: impl FnOnce(&Connection) -> Result<T, SqliteStoreError>,
    ) -> Result<T, TrackingError> {
        check_context(ctx)?;
        let guard = self
            .read_connection()?
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite read mutex poisoned".to_string()))?;
        Ok(run(&*guard)?)
    }

    /// Runs a write operation with a fresh transaction handle.
    fn with_writer<T>(
        &self,
        ctx: &RequestContext,
        run: impl FnOnce(&mut Txable<'_>) -> Result<T, SqliteStoreError>,
    ) -> Result<T, TrackingError> {
        check_context(ctx)?;
        let mut guard = self
            .write_connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite write mutex poisoned".to_string()))?;
        let mut txable = Txable::fresh(&mut *guard);
        Ok(run(&mut txable)?)
    }

    /// Verifies the store can execute a simple SQL statement.
    fn check_connection(&self) -> Result<(), SqliteStoreError> {
        let guard = self
            .read_connection()?
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite read mutex poisoned".to_string()))?;
        guard.execute_batch("SELECT 1").map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        let writer = self
            .write_connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite write mutex poisoned".to_string()))?;
        writer.execute_batch("SELECT 1").map_err(|err| SqliteStoreError::Db(err.to_string()))
    }
}

// ============================================================================
// SECTION: Transactional Operations
// ============================================================================

/// Inserts an organization in its own transaction.
fn create_organization_in(
    ctx: &RequestContext,
    txable: &mut Txable<'_>,
    name: &OrganizationName,
) -> Result<OrganizationRecord, SqliteStoreError> {
    let tx = txable.begin()?;
    let record = queries::insert_organization(&tx, name, Timestamp::now())?;
    check_context(ctx)?;
    tx.commit()?;
    Ok(record)
}

/// Resolves the organization, checks the default schema, inserts the model.
fn create_model_in(
    ctx: &RequestContext,
    txable: &mut Txable<'_>,
    scope: &OrganizationScope,
    new: &NewModel,
) -> Result<ModelRecord, SqliteStoreError> {
    let tx = txable.begin()?;
    let organization = queries::find_organization(&tx, &scope.organization)?;
    if let Some(schema_id) = new.default_schema_id {
        queries::require_owned_schema(&tx, organization.id, schema_id)?;
    }
    check_context(ctx)?;
    let record = queries::insert_model(
        &tx,
        organization.id,
        &new.name,
        new.default_schema_id,
        Timestamp::now(),
    )?;
    check_context(ctx)?;
    tx.commit()?;
    Ok(record)
}

/// Resolves organization and model, checks the schema, swaps the default.
fn update_model_in(
    ctx: &RequestContext,
    txable: &mut Txable<'_>,
    scope: &OrganizationScope,
    update: &ModelUpdate,
) -> Result<ModelRecord, SqliteStoreError> {
    let tx = txable.begin()?;
    let organization = queries::find_organization(&tx, &scope.organization)?;
    let model = queries::find_model(&tx, organization.id, &update.name)?;
    if let Some(schema_id) = update.default_schema_id {
        queries::require_owned_schema(&tx, organization.id, schema_id)?;
    }
    check_context(ctx)?;
    let record = queries::update_model_default_schema(
        &tx,
        model,
        update.default_schema_id,
        Timestamp::now(),
    )?;
    check_context(ctx)?;
    tx.commit()?;
    Ok(record)
}

/// Resolves the organization and inserts a schema pair.
fn create_schema_in(
    ctx: &RequestContext,
    txable: &mut Txable<'_>,
    scope: &OrganizationScope,
    new: &NewSchema,
) -> Result<SchemaRecord, SqliteStoreError> {
    let tx = txable.begin()?;
    let organization = queries::find_organization(&tx, &scope.organization)?;
    check_context(ctx)?;
    let record = queries::insert_schema(&tx, organization.id, new, Timestamp::now())?;
    check_context(ctx)?;
    tx.commit()?;
    Ok(record)
}

/// Resolves the model, checks schema ownership, inserts the version.
fn create_version_in(
    ctx: &RequestContext,
    txable: &mut Txable<'_>,
    scope: &ModelScope,
    name: &VersionName,
    schema_id: SchemaId,
) -> Result<VersionRecord, SqliteStoreError> {
    let tx = txable.begin()?;
    let model = queries::resolve_model(&tx, scope)?;
    queries::require_owned_schema(&tx, model.organization_id, schema_id)?;
    check_context(ctx)?;
    let record = queries::insert_version(&tx, &model, name, schema_id, Timestamp::now())?;
    check_context(ctx)?;
    tx.commit()?;
    Ok(record)
}

/// Returns the named version or creates it with the model default schema.
fn get_or_create_version_in(
    ctx: &RequestContext,
    txable: &mut Txable<'_>,
    scope: &ModelScope,
    name: &VersionName,
) -> Result<VersionRecord, SqliteStoreError> {
    let tx = txable.begin()?;
    let model = queries::resolve_model(&tx, scope)?;
    match queries::find_version(&tx, model.id, name) {
        Ok(existing) => {
            tx.commit()?;
            return Ok(existing);
        }
        Err(SqliteStoreError::NotFound {
            ..
        }) => {}
        Err(err) => return Err(err),
    }
    let Some(schema_id) = model.default_schema_id else {
        return Err(SqliteStoreError::not_found(EntityKind::Version, name));
    };
    require_name(EntityKind::Version, name.is_blank())?;
    check_context(ctx)?;
    let mut nested = Txable::borrowed(&tx);
    let record = create_version_in(ctx, &mut nested, scope, name, schema_id)?;
    check_context(ctx)?;
    tx.commit()?;
    Ok(record)
}

/// Resolves the version and inserts a result under its lineage.
fn create_result_in(
    ctx: &RequestContext,
    txable: &mut Txable<'_>,
    scope: &VersionScope,
    new: NewResult,
) -> Result<ResultRecord, SqliteStoreError> {
    let tx = txable.begin()?;
    let version = queries::resolve_version(&tx, scope)?;
    check_context(ctx)?;
    let record = queries::insert_result(&tx, &version, new, Timestamp::now())?;
    check_context(ctx)?;
    tx.commit()?;
    Ok(record)
}

// ============================================================================
// SECTION: Store Interfaces
// ============================================================================

impl OrganizationStore for SqliteModelTrackingStore {
    fn create_organization(
        &self,
        ctx: &RequestContext,
        new: NewOrganization,
    ) -> Result<OrganizationRecord, TrackingError> {
        require_name(EntityKind::Organization, new.name.is_blank())?;
        self.with_writer(ctx, |txable| create_organization_in(ctx, txable, &new.name))
    }

    fn get_organization(
        &self,
        ctx: &RequestContext,
        name: &OrganizationName,
    ) -> Result<OrganizationRecord, TrackingError> {
        self.with_reader(ctx, |connection| queries::find_organization(connection, name))
    }

    fn list_organizations(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<OrganizationRecord>, TrackingError> {
        self.with_reader(ctx, queries::list_organizations)
    }
}

impl ModelStore for SqliteModelTrackingStore {
    fn create_model(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
        new: NewModel,
    ) -> Result<ModelRecord, TrackingError> {
        require_name(EntityKind::Model, new.name.is_blank())?;
        self.with_writer(ctx, |txable| create_model_in(ctx, txable, scope, &new))
    }

    fn update_model(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
        update: ModelUpdate,
    ) -> Result<ModelRecord, TrackingError> {
        self.with_writer(ctx, |txable| update_model_in(ctx, txable, scope, &update))
    }

    fn get_model(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
        name: &ModelName,
    ) -> Result<ModelRecord, TrackingError> {
        self.with_reader(ctx, |connection| {
            let organization = queries::find_organization(connection, &scope.organization)?;
            queries::find_model(connection, organization.id, name)
        })
    }

    fn list_models(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
    ) -> Result<Vec<ModelRecord>, TrackingError> {
        self.with_reader(ctx, |connection| {
            let organization = queries::find_organization(connection, &scope.organization)?;
            queries::list_models(connection, organization.id)
        })
    }
}

impl SchemaStore for SqliteModelTrackingStore {
    fn create_schema(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
        new: NewSchema,
    ) -> Result<SchemaRecord, TrackingError> {
        require_name(EntityKind::Schema, new.name.is_blank())?;
        require_size("input schema", new.input.len(), self.config.max_schema_bytes)?;
        require_size("output schema", new.output.len(), self.config.max_schema_bytes)?;
        validate_schema_documents(&new.input, &new.output)?;
        self.with_writer(ctx, |txable| create_schema_in(ctx, txable, scope, &new))
    }

    fn get_schema(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
        name: &SchemaName,
    ) -> Result<SchemaRecord, TrackingError> {
        self.with_reader(ctx, |connection| {
            let organization = queries::find_organization(connection, &scope.organization)?;
            queries::find_schema(connection, organization.id, name)
        })
    }

    fn get_schema_by_id(
        &self,
        ctx: &RequestContext,
        id: SchemaId,
    ) -> Result<SchemaRecord, TrackingError> {
        self.with_reader(ctx, |connection| queries::find_schema_by_id(connection, id))
    }

    fn list_schemas(
        &self,
        ctx: &RequestContext,
        scope: &OrganizationScope,
    ) -> Result<Vec<SchemaRecord>, TrackingError> {
        self.with_reader(ctx, |connection| {
            let organization = queries::find_organization(connection, &scope.organization)?;
            queries::list_schemas(connection, organization.id)
        })
    }
}

impl VersionStore for SqliteModelTrackingStore {
    fn create_version(
        &self,
        ctx: &RequestContext,
        scope: &ModelScope,
        new: NewVersion,
    ) -> Result<VersionRecord, TrackingError> {
        require_name(EntityKind::Version, new.name.is_blank())?;
        self.with_writer(ctx, |txable| {
            create_version_in(ctx, txable, scope, &new.name, new.schema_id)
        })
    }

    fn get_version(
        &self,
        ctx: &RequestContext,
        scope: &ModelScope,
        name: &VersionName,
    ) -> Result<VersionRecord, TrackingError> {
        self.with_reader(ctx, |connection| {
            let model = queries::resolve_model(connection, scope)?;
            queries::find_version(connection, model.id, name)
        })
    }

    fn get_or_create_version(
        &self,
        ctx: &RequestContext,
        scope: &ModelScope,
        name: &VersionName,
    ) -> Result<VersionRecord, TrackingError> {
        self.with_writer(ctx, |txable| get_or_create_version_in(ctx, txable, scope, name))
    }

    fn list_versions(
        &self,
        ctx: &RequestContext,
        scope: &ModelScope,
    ) -> Result<Vec<VersionRecord>, TrackingError> {
        self.with_reader(ctx, |connection| {
            let model = queries::resolve_model(connection, scope)?;
            queries::list_versions(connection, model.id)
        })
    }
}

impl ResultStore for SqliteModelTrackingStore {
    fn create_result(
        &self,
        ctx: &RequestContext,
        scope: &VersionScope,
        new: NewResult,
    ) -> Result<ResultRecord, TrackingError> {
        let limit = self.config.max_payload_bytes;
        require_size("input", new.input.len(), limit)?;
        require_size("output", new.output.len(), limit)?;
        require_size("true_output", new.true_output.len(), limit)?;
        self.with_writer(ctx, |txable| create_result_in(ctx, txable, scope, new))
    }

    fn get_result(
        &self,
        ctx: &RequestContext,
        scope: &VersionScope,
        id: ResultId,
    ) -> Result<ResultRecord, TrackingError> {
        self.with_reader(ctx, |connection| {
            let version = queries::resolve_version(connection, scope)?;
            queries::find_result(connection, version.id, id)
        })
    }

    fn list_results(
        &self,
        ctx: &RequestContext,
        scope: &VersionScope,
    ) -> Result<Vec<ResultRecord>, TrackingError> {
        self.with_reader(ctx, |connection| {
            let version = queries::resolve_version(connection, scope)?;
            queries::list_results(connection, version.id)
        })
    }
}

impl ModelTrackingStore for SqliteModelTrackingStore {
    fn readiness(&self) -> Result<(), TrackingError> {
        self.check_connection().map_err(TrackingError::from)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for integrity and durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
