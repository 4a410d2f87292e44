// crates/model-tracking-store-sqlite/src/schema.rs
// ============================================================================
// Module: SQLite Store Schema
// Description: Table definitions and schema version checks.
// Purpose: Create the five lineage tables and refuse unknown layouts.
// Dependencies: rusqlite
// ============================================================================

//! ## Overview
//! Five tables hold the lineage. Uniqueness of names within their scope and
//! every foreign key are enforced by `SQLite` itself; the store relies on
//! those constraints to settle racing creations. A `store_meta` row records
//! the layout version.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;

use crate::store::SqliteStoreError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` layout version for the store.
pub const SCHEMA_VERSION: i64 = 1;

/// Table definitions for the current layout.
const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS organizations (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    created INTEGER NOT NULL,
    updated INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS schemas (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    organization_id INTEGER NOT NULL REFERENCES organizations(id),
    input TEXT NOT NULL,
    output TEXT NOT NULL,
    created INTEGER NOT NULL,
    updated INTEGER NOT NULL,
    UNIQUE (organization_id, name)
);
CREATE TABLE IF NOT EXISTS models (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    organization_id INTEGER NOT NULL REFERENCES organizations(id),
    default_schema_id INTEGER REFERENCES schemas(id),
    created INTEGER NOT NULL,
    updated INTEGER NOT NULL,
    UNIQUE (organization_id, name)
);
CREATE TABLE IF NOT EXISTS versions (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    organization_id INTEGER NOT NULL REFERENCES organizations(id),
    model_id INTEGER NOT NULL REFERENCES models(id),
    schema_id INTEGER NOT NULL REFERENCES schemas(id),
    created INTEGER NOT NULL,
    updated INTEGER NOT NULL,
    UNIQUE (model_id, name)
);
CREATE TABLE IF NOT EXISTS results (
    id INTEGER PRIMARY KEY,
    organization_id INTEGER NOT NULL REFERENCES organizations(id),
    model_id INTEGER NOT NULL REFERENCES models(id),
    version_id INTEGER NOT NULL REFERENCES versions(id),
    input BLOB NOT NULL,
    output BLOB NOT NULL,
    true_output BLOB NOT NULL,
    time INTEGER NOT NULL,
    created INTEGER NOT NULL,
    updated INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_results_version ON results (version_id, id);
";

// ============================================================================
// SECTION: Initialization
// ============================================================================

/// Initializes the `SQLite` schema or validates the existing version.
pub(crate) fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(CREATE_TABLES).map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}
