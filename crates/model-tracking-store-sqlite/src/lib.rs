// crates/model-tracking-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Model Tracking Store
// Description: Durable model tracking backend using SQLite.
// Purpose: Persist organizations, models, schemas, versions, and results.
// Dependencies: model-tracking-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate implements every model tracking store interface on `SQLite`.
//! Multi-step creations resolve parents by name and insert the child inside
//! one immediate transaction, so partial rows are never visible. Uniqueness
//! races are settled by table constraints and surface as conflicts.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod queries;
mod schema;
pub mod store;
pub mod tx;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use schema::SCHEMA_VERSION;
pub use store::MAX_PAYLOAD_BYTES;
pub use store::MAX_SCHEMA_BYTES;
pub use store::SqliteModelTrackingStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
pub use tx::Tx;
pub use tx::Txable;
