// crates/model-tracking-store-sqlite/src/queries.rs
// ============================================================================
// Module: SQLite Store Queries
// Description: Name resolution, row mapping, and insert statements.
// Purpose: Keep SQL text and row decoding out of the store orchestration.
// Dependencies: model-tracking-core, rusqlite
// ============================================================================

//! ## Overview
//! Every function takes a plain [`Connection`] so it runs equally inside an
//! owned or a borrowed transaction. Resolution failures become
//! [`SqliteStoreError::NotFound`] naming the entity kind; uniqueness
//! violations become [`SqliteStoreError::Conflict`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use model_tracking_core::EntityKind;
use model_tracking_core::JsonPayload;
use model_tracking_core::ModelId;
use model_tracking_core::ModelName;
use model_tracking_core::ModelRecord;
use model_tracking_core::ModelScope;
use model_tracking_core::NewResult;
use model_tracking_core::NewSchema;
use model_tracking_core::OrganizationId;
use model_tracking_core::OrganizationName;
use model_tracking_core::OrganizationRecord;
use model_tracking_core::ResultId;
use model_tracking_core::ResultRecord;
use model_tracking_core::SchemaId;
use model_tracking_core::SchemaName;
use model_tracking_core::SchemaRecord;
use model_tracking_core::Timestamp;
use model_tracking_core::VersionId;
use model_tracking_core::VersionName;
use model_tracking_core::VersionRecord;
use model_tracking_core::VersionScope;
use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OptionalExtension;
use rusqlite::Params;
use rusqlite::Row;
use rusqlite::ffi;
use rusqlite::params;

use crate::store::SqliteStoreError;

// ============================================================================
// SECTION: Error Mapping
// ============================================================================

/// Wraps a generic `SQLite` failure.
fn db_error(err: rusqlite::Error) -> SqliteStoreError {
    SqliteStoreError::Db(err.to_string())
}

/// Maps insert failures, turning uniqueness violations into conflicts.
fn write_error(err: rusqlite::Error, conflict: impl FnOnce() -> String) -> SqliteStoreError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err
        && failure.code == ErrorCode::ConstraintViolation
        && matches!(
            failure.extended_code,
            ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        )
    {
        return SqliteStoreError::Conflict(conflict());
    }
    db_error(err)
}

/// Converts a typed id into a row id; ids beyond `SQLite` range cannot exist.
fn row_param(
    raw: Option<i64>,
    kind: EntityKind,
    id: impl std::fmt::Display,
) -> Result<i64, SqliteStoreError> {
    raw.ok_or_else(|| SqliteStoreError::NotFound {
        kind,
        name: id.to_string(),
    })
}

/// Converts an organization id into a row parameter.
fn organization_param(id: OrganizationId) -> Result<i64, SqliteStoreError> {
    row_param(id.to_row_id(), EntityKind::Organization, id)
}

/// Converts a model id into a row parameter.
fn model_param(id: ModelId) -> Result<i64, SqliteStoreError> {
    row_param(id.to_row_id(), EntityKind::Model, id)
}

/// Converts a schema id into a row parameter.
fn schema_param(id: SchemaId) -> Result<i64, SqliteStoreError> {
    row_param(id.to_row_id(), EntityKind::Schema, id)
}

/// Converts a version id into a row parameter.
fn version_param(id: VersionId) -> Result<i64, SqliteStoreError> {
    row_param(id.to_row_id(), EntityKind::Version, id)
}

/// Converts the last inserted row id into a typed id.
fn inserted_id<T>(
    connection: &Connection,
    kind: EntityKind,
    build: fn(i64) -> Option<T>,
) -> Result<T, SqliteStoreError> {
    let raw = connection.last_insert_rowid();
    build(raw).ok_or_else(|| SqliteStoreError::Corrupt(format!("invalid {kind} row id: {raw}")))
}

// ============================================================================
// SECTION: Query Helpers
// ============================================================================

/// Runs a single-row query.
fn query_one<T, P: Params>(
    connection: &Connection,
    sql: &str,
    params: P,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Option<T>, SqliteStoreError> {
    let mut stmt = connection.prepare_cached(sql).map_err(db_error)?;
    stmt.query_row(params, map).optional().map_err(db_error)
}

/// Runs a multi-row query.
fn query_all<T, P: Params>(
    connection: &Connection,
    sql: &str,
    params: P,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>, SqliteStoreError> {
    let mut stmt = connection.prepare_cached(sql).map_err(db_error)?;
    let rows = stmt.query_map(params, map).map_err(db_error)?;
    rows.collect::<rusqlite::Result<Vec<T>>>().map_err(db_error)
}

// ============================================================================
// SECTION: Row Mapping
// ============================================================================

/// Reads a required identifier column.
fn id_column<T>(row: &Row<'_>, idx: usize, build: fn(i64) -> Option<T>) -> rusqlite::Result<T> {
    let raw: i64 = row.get(idx)?;
    build(raw).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, raw))
}

/// Reads a timestamp column.
fn time_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Timestamp> {
    Ok(Timestamp::from_unix_millis(row.get(idx)?))
}

/// Decodes an organization row.
fn organization_row(row: &Row<'_>) -> rusqlite::Result<OrganizationRecord> {
    Ok(OrganizationRecord {
        id: id_column(row, 0, OrganizationId::from_row_id)?,
        name: OrganizationName::new(row.get::<_, String>(1)?),
        created: time_column(row, 2)?,
        updated: time_column(row, 3)?,
    })
}

/// Decodes a model row.
fn model_row(row: &Row<'_>) -> rusqlite::Result<ModelRecord> {
    let default_schema_id = match row.get::<_, Option<i64>>(3)? {
        Some(raw) => Some(
            SchemaId::from_row_id(raw).ok_or(rusqlite::Error::IntegralValueOutOfRange(3, raw))?,
        ),
        None => None,
    };
    Ok(ModelRecord {
        id: id_column(row, 0, ModelId::from_row_id)?,
        name: ModelName::new(row.get::<_, String>(1)?),
        organization_id: id_column(row, 2, OrganizationId::from_row_id)?,
        default_schema_id,
        created: time_column(row, 4)?,
        updated: time_column(row, 5)?,
    })
}

/// Decodes a schema row.
fn schema_row(row: &Row<'_>) -> rusqlite::Result<SchemaRecord> {
    Ok(SchemaRecord {
        id: id_column(row, 0, SchemaId::from_row_id)?,
        name: SchemaName::new(row.get::<_, String>(1)?),
        organization_id: id_column(row, 2, OrganizationId::from_row_id)?,
        input: row.get(3)?,
        output: row.get(4)?,
        created: time_column(row, 5)?,
        updated: time_column(row, 6)?,
    })
}

/// Decodes a version row.
fn version_row(row: &Row<'_>) -> rusqlite::Result<VersionRecord> {
    Ok(VersionRecord {
        id: id_column(row, 0, VersionId::from_row_id)?,
        name: VersionName::new(row.get::<_, String>(1)?),
        organization_id: id_column(row, 2, OrganizationId::from_row_id)?,
        model_id: id_column(row, 3, ModelId::from_row_id)?,
        schema_id: id_column(row, 4, SchemaId::from_row_id)?,
        created: time_column(row, 5)?,
        updated: time_column(row, 6)?,
    })
}

/// Decodes a result row.
fn result_row(row: &Row<'_>) -> rusqlite::Result<ResultRecord> {
    Ok(ResultRecord {
        id: id_column(row, 0, ResultId::from_row_id)?,
        organization_id: id_column(row, 1, OrganizationId::from_row_id)?,
        model_id: id_column(row, 2, ModelId::from_row_id)?,
        version_id: id_column(row, 3, VersionId::from_row_id)?,
        input: JsonPayload::new(row.get::<_, Vec<u8>>(4)?),
        output: JsonPayload::new(row.get::<_, Vec<u8>>(5)?),
        true_output: JsonPayload::new(row.get::<_, Vec<u8>>(6)?),
        time: time_column(row, 7)?,
        created: time_column(row, 8)?,
        updated: time_column(row, 9)?,
    })
}

// ============================================================================
// SECTION: Organizations
// ============================================================================

/// Resolves an organization by name.
pub(crate) fn find_organization(
    connection: &Connection,
    name: &OrganizationName,
) -> Result<OrganizationRecord, SqliteStoreError> {
    query_one(
        connection,
        "SELECT id, name, created, updated FROM organizations WHERE name = ?1",
        params![name.as_str()],
        organization_row,
    )?
    .ok_or_else(|| SqliteStoreError::not_found(EntityKind::Organization, name))
}

/// Lists every organization in id order.
pub(crate) fn list_organizations(
    connection: &Connection,
) -> Result<Vec<OrganizationRecord>, SqliteStoreError> {
    query_all(
        connection,
        "SELECT id, name, created, updated FROM organizations ORDER BY id",
        [],
        organization_row,
    )
}

/// Inserts an organization.
pub(crate) fn insert_organization(
    connection: &Connection,
    name: &OrganizationName,
    now: Timestamp,
) -> Result<OrganizationRecord, SqliteStoreError> {
    connection
        .prepare_cached("INSERT INTO organizations (name, created, updated) VALUES (?1, ?2, ?2)")
        .and_then(|mut stmt| stmt.execute(params![name.as_str(), now.as_unix_millis()]))
        .map_err(|err| write_error(err, || format!("organization already exists: {name}")))?;
    Ok(OrganizationRecord {
        id: inserted_id(connection, EntityKind::Organization, OrganizationId::from_row_id)?,
        name: name.clone(),
        created: now,
        updated: now,
    })
}

// ============================================================================
// SECTION: Models
// ============================================================================

/// Resolves a model by organization id and name.
pub(crate) fn find_model(
    connection: &Connection,
    organization_id: OrganizationId,
    name: &ModelName,
) -> Result<ModelRecord, SqliteStoreError> {
    let organization = organization_param(organization_id)?;
    query_one(
        connection,
        "SELECT id, name, organization_id, default_schema_id, created, updated FROM models WHERE \
         organization_id = ?1 AND name = ?2",
        params![organization, name.as_str()],
        model_row,
    )?
    .ok_or_else(|| SqliteStoreError::not_found(EntityKind::Model, name))
}

/// Resolves organization then model by name.
pub(crate) fn resolve_model(
    connection: &Connection,
    scope: &ModelScope,
) -> Result<ModelRecord, SqliteStoreError> {
    let organization = find_organization(connection, &scope.organization)?;
    find_model(connection, organization.id, &scope.model)
}

/// Lists the models of an organization in id order.
pub(crate) fn list_models(
    connection: &Connection,
    organization_id: OrganizationId,
) -> Result<Vec<ModelRecord>, SqliteStoreError> {
    let organization = organization_param(organization_id)?;
    query_all(
        connection,
        "SELECT id, name, organization_id, default_schema_id, created, updated FROM models WHERE \
         organization_id = ?1 ORDER BY id",
        params![organization],
        model_row,
    )
}

/// Inserts a model.
pub(crate) fn insert_model(
    connection: &Connection,
    organization_id: OrganizationId,
    name: &ModelName,
    default_schema_id: Option<SchemaId>,
    now: Timestamp,
) -> Result<ModelRecord, SqliteStoreError> {
    let organization = organization_param(organization_id)?;
    let schema = default_schema_id.map(schema_param).transpose()?;
    connection
        .prepare_cached(
            "INSERT INTO models (name, organization_id, default_schema_id, created, updated) \
             VALUES (?1, ?2, ?3, ?4, ?4)",
        )
        .and_then(|mut stmt| {
            stmt.execute(params![name.as_str(), organization, schema, now.as_unix_millis()])
        })
        .map_err(|err| write_error(err, || format!("model already exists: {name}")))?;
    Ok(ModelRecord {
        id: inserted_id(connection, EntityKind::Model, ModelId::from_row_id)?,
        name: name.clone(),
        organization_id,
        default_schema_id,
        created: now,
        updated: now,
    })
}

/// Replaces a model's default schema and advances its update time.
pub(crate) fn update_model_default_schema(
    connection: &Connection,
    model: ModelRecord,
    default_schema_id: Option<SchemaId>,
    now: Timestamp,
) -> Result<ModelRecord, SqliteStoreError> {
    let model_id = model_param(model.id)?;
    let schema = default_schema_id.map(schema_param).transpose()?;
    let updated = now.max(model.updated);
    let changed = connection
        .prepare_cached("UPDATE models SET default_schema_id = ?1, updated = ?2 WHERE id = ?3")
        .and_then(|mut stmt| stmt.execute(params![schema, updated.as_unix_millis(), model_id]))
        .map_err(db_error)?;
    if changed != 1 {
        return Err(SqliteStoreError::not_found(EntityKind::Model, &model.name));
    }
    Ok(ModelRecord {
        default_schema_id,
        updated,
        ..model
    })
}

// ============================================================================
// SECTION: Schemas
// ============================================================================

/// Ensures a schema id exists and belongs to the organization.
pub(crate) fn require_owned_schema(
    connection: &Connection,
    organization_id: OrganizationId,
    schema_id: SchemaId,
) -> Result<(), SqliteStoreError> {
    let organization = organization_param(organization_id)?;
    let schema = schema_param(schema_id)?;
    let found: Option<i64> = query_one(
        connection,
        "SELECT id FROM schemas WHERE id = ?1 AND organization_id = ?2",
        params![schema, organization],
        |row| row.get(0),
    )?;
    found.map(|_| ()).ok_or_else(|| SqliteStoreError::not_found(EntityKind::Schema, schema_id))
}

/// Resolves a schema by organization id and name.
pub(crate) fn find_schema(
    connection: &Connection,
    organization_id: OrganizationId,
    name: &SchemaName,
) -> Result<SchemaRecord, SqliteStoreError> {
    let organization = organization_param(organization_id)?;
    query_one(
        connection,
        "SELECT id, name, organization_id, input, output, created, updated FROM schemas WHERE \
         organization_id = ?1 AND name = ?2",
        params![organization, name.as_str()],
        schema_row,
    )?
    .ok_or_else(|| SqliteStoreError::not_found(EntityKind::Schema, name))
}

/// Loads a schema by surrogate id.
pub(crate) fn find_schema_by_id(
    connection: &Connection,
    id: SchemaId,
) -> Result<SchemaRecord, SqliteStoreError> {
    let schema = schema_param(id)?;
    query_one(
        connection,
        "SELECT id, name, organization_id, input, output, created, updated FROM schemas WHERE id \
         = ?1",
        params![schema],
        schema_row,
    )?
    .ok_or_else(|| SqliteStoreError::not_found(EntityKind::Schema, id))
}

/// Lists the schemas of an organization in id order.
pub(crate) fn list_schemas(
    connection: &Connection,
    organization_id: OrganizationId,
) -> Result<Vec<SchemaRecord>, SqliteStoreError> {
    let organization = organization_param(organization_id)?;
    query_all(
        connection,
        "SELECT id, name, organization_id, input, output, created, updated FROM schemas WHERE \
         organization_id = ?1 ORDER BY id",
        params![organization],
        schema_row,
    )
}

/// Inserts a schema pair.
pub(crate) fn insert_schema(
    connection: &Connection,
    organization_id: OrganizationId,
    new: &NewSchema,
    now: Timestamp,
) -> Result<SchemaRecord, SqliteStoreError> {
    let organization = organization_param(organization_id)?;
    connection
        .prepare_cached(
            "INSERT INTO schemas (name, organization_id, input, output, created, updated) VALUES \
             (?1, ?2, ?3, ?4, ?5, ?5)",
        )
        .and_then(|mut stmt| {
            stmt.execute(params![
                new.name.as_str(),
                organization,
                new.input,
                new.output,
                now.as_unix_millis()
            ])
        })
        .map_err(|err| write_error(err, || format!("schema already exists: {}", new.name)))?;
    Ok(SchemaRecord {
        id: inserted_id(connection, EntityKind::Schema, SchemaId::from_row_id)?,
        name: new.name.clone(),
        organization_id,
        input: new.input.clone(),
        output: new.output.clone(),
        created: now,
        updated: now,
    })
}

// ============================================================================
// SECTION: Versions
// ============================================================================

/// Resolves a version by model id and name.
pub(crate) fn find_version(
    connection: &Connection,
    model_id: ModelId,
    name: &VersionName,
) -> Result<VersionRecord, SqliteStoreError> {
    let model = model_param(model_id)?;
    query_one(
        connection,
        "SELECT id, name, organization_id, model_id, schema_id, created, updated FROM versions \
         WHERE model_id = ?1 AND name = ?2",
        params![model, name.as_str()],
        version_row,
    )?
    .ok_or_else(|| SqliteStoreError::not_found(EntityKind::Version, name))
}

/// Resolves organization, model, then version by name.
pub(crate) fn resolve_version(
    connection: &Connection,
    scope: &VersionScope,
) -> Result<VersionRecord, SqliteStoreError> {
    let model = resolve_model(connection, &scope.model_scope())?;
    find_version(connection, model.id, &scope.version)
}

/// Lists the versions of a model in id order.
pub(crate) fn list_versions(
    connection: &Connection,
    model_id: ModelId,
) -> Result<Vec<VersionRecord>, SqliteStoreError> {
    let model = model_param(model_id)?;
    query_all(
        connection,
        "SELECT id, name, organization_id, model_id, schema_id, created, updated FROM versions \
         WHERE model_id = ?1 ORDER BY id",
        params![model],
        version_row,
    )
}

/// Inserts a version under a resolved model.
pub(crate) fn insert_version(
    connection: &Connection,
    model: &ModelRecord,
    name: &VersionName,
    schema_id: SchemaId,
    now: Timestamp,
) -> Result<VersionRecord, SqliteStoreError> {
    let organization = organization_param(model.organization_id)?;
    let model_row_id = model_param(model.id)?;
    let schema = schema_param(schema_id)?;
    connection
        .prepare_cached(
            "INSERT INTO versions (name, organization_id, model_id, schema_id, created, updated) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        )
        .and_then(|mut stmt| {
            stmt.execute(params![
                name.as_str(),
                organization,
                model_row_id,
                schema,
                now.as_unix_millis()
            ])
        })
        .map_err(|err| write_error(err, || format!("version already exists: {name}")))?;
    Ok(VersionRecord {
        id: inserted_id(connection, EntityKind::Version, VersionId::from_row_id)?,
        name: name.clone(),
        organization_id: model.organization_id,
        model_id: model.id,
        schema_id,
        created: now,
        updated: now,
    })
}

// ============================================================================
// SECTION: Results
// ============================================================================

/// Inserts a result, deriving ancestor ids from the resolved version.
pub(crate) fn insert_result(
    connection: &Connection,
    version: &VersionRecord,
    new: NewResult,
    now: Timestamp,
) -> Result<ResultRecord, SqliteStoreError> {
    let organization = organization_param(version.organization_id)?;
    let model = model_param(version.model_id)?;
    let version_row_id = version_param(version.id)?;
    connection
        .prepare_cached(
            "INSERT INTO results (organization_id, model_id, version_id, input, output, \
             true_output, time, created, updated) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        )
        .and_then(|mut stmt| {
            stmt.execute(params![
                organization,
                model,
                version_row_id,
                new.input.as_bytes(),
                new.output.as_bytes(),
                new.true_output.as_bytes(),
                new.time.as_unix_millis(),
                now.as_unix_millis()
            ])
        })
        .map_err(|err| write_error(err, || "result already exists".to_string()))?;
    Ok(ResultRecord {
        id: inserted_id(connection, EntityKind::Result, ResultId::from_row_id)?,
        organization_id: version.organization_id,
        model_id: version.model_id,
        version_id: version.id,
        input: new.input,
        output: new.output,
        true_output: new.true_output,
        time: new.time,
        created: now,
        updated: now,
    })
}

/// Loads a result that belongs to the given version.
pub(crate) fn find_result(
    connection: &Connection,
    version_id: VersionId,
    id: ResultId,
) -> Result<ResultRecord, SqliteStoreError> {
    let version = version_param(version_id)?;
    let result = row_param(id.to_row_id(), EntityKind::Result, id)?;
    query_one(
        connection,
        "SELECT id, organization_id, model_id, version_id, input, output, true_output, time, \
         created, updated FROM results WHERE id = ?1 AND version_id = ?2",
        params![result, version],
        result_row,
    )?
    .ok_or_else(|| SqliteStoreError::not_found(EntityKind::Result, id))
}

/// Lists the results of a version in id order.
pub(crate) fn list_results(
    connection: &Connection,
    version_id: VersionId,
) -> Result<Vec<ResultRecord>, SqliteStoreError> {
    let version = version_param(version_id)?;
    query_all(
        connection,
        "SELECT id, organization_id, model_id, version_id, input, output, true_output, time, \
         created, updated FROM results WHERE version_id = ?1 ORDER BY id",
        params![version],
        result_row,
    )
}
