// crates/model-tracking-core/src/core/mod.rs
// ============================================================================
// Module: Model Tracking Core Types
// Description: Identifiers, records, scopes, timestamps, and error taxonomy.
// Purpose: Re-export the data model used by every other module.
// Dependencies: serde, thiserror, time
// ============================================================================

//! ## Overview
//! Core types are plain data. They carry no storage logic and are shared by
//! the store interfaces, the ingestion pipeline, and all backends.

pub mod errors;
pub mod identifiers;
pub mod records;
pub mod scope;
pub mod time;

pub use errors::ErrorKind;
pub use errors::TrackingError;
pub use errors::ValidationCheck;
pub use identifiers::EntityKind;
pub use identifiers::ModelId;
pub use identifiers::ModelName;
pub use identifiers::OrganizationId;
pub use identifiers::OrganizationName;
pub use identifiers::ResultId;
pub use identifiers::SchemaId;
pub use identifiers::SchemaName;
pub use identifiers::VersionId;
pub use identifiers::VersionName;
pub use records::JsonPayload;
pub use records::ModelRecord;
pub use records::ModelUpdate;
pub use records::NewModel;
pub use records::NewOrganization;
pub use records::NewResult;
pub use records::NewSchema;
pub use records::NewVersion;
pub use records::OrganizationRecord;
pub use records::ResultRecord;
pub use records::ResultSubmission;
pub use records::SchemaRecord;
pub use records::VersionRecord;
pub use scope::ModelScope;
pub use scope::OrganizationScope;
pub use scope::VersionScope;
pub use time::Timestamp;
pub use time::TimestampError;
