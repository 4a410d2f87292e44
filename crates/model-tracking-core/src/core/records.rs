// crates/model-tracking-core/src/core/records.rs
// ============================================================================
// Module: Model Tracking Records
// Description: Persisted entity records and creation requests.
// Purpose: Define the typed data model shared by stores, pipeline, and callers.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Records mirror the five persisted tables. Descendant records carry
//! denormalized ancestor ids (a result knows its organization, model, and
//! version) and those ids are always derived by the store from one resolved
//! lineage. `New*` request types deliberately omit ids and timestamps so a
//! caller can never assert them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde_json::value::RawValue;

use crate::core::identifiers::ModelId;
use crate::core::identifiers::ModelName;
use crate::core::identifiers::OrganizationId;
use crate::core::identifiers::OrganizationName;
use crate::core::identifiers::ResultId;
use crate::core::identifiers::SchemaId;
use crate::core::identifiers::SchemaName;
use crate::core::identifiers::VersionId;
use crate::core::identifiers::VersionName;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: JSON Payloads
// ============================================================================

/// Opaque JSON payload bytes submitted with a result.
///
/// # Invariants
/// - Bytes are preserved exactly as submitted; validity is checked by the
///   schema validator, not by this type.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct JsonPayload(Vec<u8>);

impl JsonPayload {
    /// Wraps raw payload bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Returns the payload bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the payload and returns its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Debug for JsonPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonPayload").field("len", &self.0.len()).finish()
    }
}

impl From<&str> for JsonPayload {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl From<Vec<u8>> for JsonPayload {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl Serialize for JsonPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Embed valid JSON verbatim; anything else is emitted as a lossy string.
        match serde_json::from_slice::<&RawValue>(&self.0) {
            Ok(raw) => raw.serialize(serializer),
            Err(_) => serializer.serialize_str(&String::from_utf8_lossy(&self.0)),
        }
    }
}

impl<'de> Deserialize<'de> for JsonPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        Ok(Self(raw.get().as_bytes().to_vec()))
    }
}

// ============================================================================
// SECTION: Persisted Records
// ============================================================================

/// Persisted organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationRecord {
    /// Organization identifier.
    pub id: OrganizationId,
    /// Globally unique organization name.
    pub name: OrganizationName,
    /// Creation timestamp.
    pub created: Timestamp,
    /// Last update timestamp.
    pub updated: Timestamp,
}

/// Persisted model.
///
/// # Invariants
/// - `default_schema_id`, when set, references a schema owned by `organization_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRecord {
    /// Model identifier.
    pub id: ModelId,
    /// Model name, unique within the organization.
    pub name: ModelName,
    /// Owning organization identifier.
    pub organization_id: OrganizationId,
    /// Schema used when versions are created implicitly.
    pub default_schema_id: Option<SchemaId>,
    /// Creation timestamp.
    pub created: Timestamp,
    /// Last update timestamp.
    pub updated: Timestamp,
}

/// Persisted schema pair.
///
/// # Invariants
/// - `input` and `output` both compiled as JSON Schema when the row was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRecord {
    /// Schema identifier.
    pub id: SchemaId,
    /// Schema name, unique within the organization.
    pub name: SchemaName,
    /// Owning organization identifier.
    pub organization_id: OrganizationId,
    /// JSON Schema document for result inputs.
    pub input: String,
    /// JSON Schema document for result outputs and true outputs.
    pub output: String,
    /// Creation timestamp.
    pub created: Timestamp,
    /// Last update timestamp.
    pub updated: Timestamp,
}

/// Persisted model version.
///
/// # Invariants
/// - `schema_id` references a schema owned by `organization_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Version identifier.
    pub id: VersionId,
    /// Version name, unique within the model.
    pub name: VersionName,
    /// Owning organization identifier.
    pub organization_id: OrganizationId,
    /// Owning model identifier.
    pub model_id: ModelId,
    /// Schema results of this version must satisfy.
    pub schema_id: SchemaId,
    /// Creation timestamp.
    pub created: Timestamp,
    /// Last update timestamp.
    pub updated: Timestamp,
}

/// Persisted inference result.
///
/// # Invariants
/// - Ancestor ids come from the version row resolved at insert time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Result identifier.
    pub id: ResultId,
    /// Owning organization identifier.
    pub organization_id: OrganizationId,
    /// Owning model identifier.
    pub model_id: ModelId,
    /// Owning version identifier.
    pub version_id: VersionId,
    /// Model input payload.
    pub input: JsonPayload,
    /// Predicted output payload.
    pub output: JsonPayload,
    /// Expected output payload.
    pub true_output: JsonPayload,
    /// Observation time of the inference.
    pub time: Timestamp,
    /// Creation timestamp.
    pub created: Timestamp,
    /// Last update timestamp.
    pub updated: Timestamp,
}

// ============================================================================
// SECTION: Creation Requests
// ============================================================================

/// Request to create an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewOrganization {
    /// Organization name.
    pub name: OrganizationName,
}

/// Request to create a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewModel {
    /// Model name.
    pub name: ModelName,
    /// Optional default schema (must belong to the same organization).
    #[serde(default)]
    pub default_schema_id: Option<SchemaId>,
}

/// Request to swap a model's default schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelUpdate {
    /// Name of the model to update.
    pub name: ModelName,
    /// New default schema, or `None` to clear it.
    #[serde(default)]
    pub default_schema_id: Option<SchemaId>,
}

/// Request to create a schema pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewSchema {
    /// Schema name.
    pub name: SchemaName,
    /// JSON Schema document for inputs.
    pub input: String,
    /// JSON Schema document for outputs.
    pub output: String,
}

/// Request to create a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewVersion {
    /// Version name.
    pub name: VersionName,
    /// Schema to bind (must belong to the same organization).
    pub schema_id: SchemaId,
}

/// Validated result ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewResult {
    /// Model input payload.
    pub input: JsonPayload,
    /// Predicted output payload.
    pub output: JsonPayload,
    /// Expected output payload.
    pub true_output: JsonPayload,
    /// Observation time.
    pub time: Timestamp,
}

/// Result as submitted by a caller, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResultSubmission {
    /// Model input payload.
    pub input: JsonPayload,
    /// Predicted output payload.
    pub output: JsonPayload,
    /// Expected output payload.
    pub true_output: JsonPayload,
    /// Optional observation time; defaults to the ingestion instant.
    #[serde(default)]
    pub time: Option<Timestamp>,
}
