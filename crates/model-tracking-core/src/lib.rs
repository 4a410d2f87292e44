// crates/model-tracking-core/src/lib.rs
// ============================================================================
// Module: Model Tracking Core Library
// Description: Public API surface for the model tracking core.
// Purpose: Expose core types, store interfaces, runtime, and logging.
// Dependencies: crate::{core, interfaces, logging, runtime}
// ============================================================================

//! ## Overview
//! Model tracking records ML model lineage: organizations own models and
//! schemas, models own versions bound to a schema, and versions accumulate
//! inference results validated against that schema. The core is
//! backend-agnostic; storage plugs in through the traits in [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod logging;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::ModelStore;
pub use interfaces::ModelTrackingStore;
pub use interfaces::OrganizationStore;
pub use interfaces::ResultStore;
pub use interfaces::SchemaStore;
pub use interfaces::VersionStore;
pub use logging::FileLogSink;
pub use logging::LogLevel;
pub use logging::NoopLogSink;
pub use logging::StderrLogSink;
pub use logging::TrackingEvent;
pub use logging::TrackingEventParams;
pub use logging::TrackingLogSink;
pub use runtime::CancellationToken;
pub use runtime::CompiledSchema;
pub use runtime::DocumentError;
pub use runtime::InMemoryModelTrackingStore;
pub use runtime::ModelTracker;
pub use runtime::RequestContext;
pub use runtime::ResultIngestor;
pub use runtime::SchemaCompileError;
pub use runtime::ValidationOutcome;
pub use runtime::compile_schema;
pub use runtime::validate_schema_documents;
