// crates/model-tracking-core/src/runtime/mod.rs
// ============================================================================
// Module: Model Tracking Runtime
// Description: Request context, schema validation, ingestion, and tracker.
// Purpose: Wire core types and store interfaces into runnable operations.
// Dependencies: crate::core, crate::interfaces, jsonschema
// ============================================================================

//! ## Overview
//! Runtime modules hold no persistent state. Every operation is blocking and
//! takes a [`RequestContext`] so callers can bound or cancel it.

pub mod context;
pub mod ingest;
pub mod store;
pub mod tracker;
pub mod validator;

pub use context::CancellationToken;
pub use context::RequestContext;
pub use ingest::ResultIngestor;
pub use store::InMemoryModelTrackingStore;
pub use tracker::ModelTracker;
pub use validator::CompiledSchema;
pub use validator::DocumentError;
pub use validator::SchemaCompileError;
pub use validator::ValidationOutcome;
pub use validator::compile_schema;
pub use validator::validate_schema_documents;
