// crates/model-tracking-core/src/core/identifiers.rs
// ============================================================================
// Module: Model Tracking Identifiers
// Description: Surrogate identifiers and natural names for tracked entities.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every tracked entity has two handles: a surrogate numeric id assigned by
//! the store and, for everything but results, a natural name unique within
//! its parent scope. Numeric identifiers enforce the non-zero, 1-based
//! invariant of database row ids at construction boundaries. Names are opaque
//! UTF-8 strings; emptiness is rejected by the store, not by these types.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroU64;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Surrogate Identifiers
// ============================================================================

/// Declares a non-zero surrogate identifier newtype.
macro_rules! surrogate_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        ///
        /// # Invariants
        /// - Always >= 1 (non-zero, 1-based).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(NonZeroU64);

        impl $name {
            /// Creates a new identifier from a non-zero value.
            #[must_use]
            pub const fn new(id: NonZeroU64) -> Self {
                Self(id)
            }

            /// Creates an identifier from a raw value (returns `None` if zero).
            #[must_use]
            pub const fn from_raw(raw: u64) -> Option<Self> {
                match NonZeroU64::new(raw) {
                    Some(value) => Some(Self(value)),
                    None => None,
                }
            }

            /// Creates an identifier from a signed database row id.
            ///
            /// Returns `None` for zero or negative values.
            #[must_use]
            pub fn from_row_id(raw: i64) -> Option<Self> {
                u64::try_from(raw).ok().and_then(Self::from_raw)
            }

            /// Returns the raw identifier value (always >= 1).
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0.get()
            }

            /// Returns the identifier as a signed database row id.
            ///
            /// Returns `None` when the value exceeds `i64::MAX`.
            #[must_use]
            pub fn to_row_id(self) -> Option<i64> {
                i64::try_from(self.0.get()).ok()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.get().fmt(f)
            }
        }
    };
}

surrogate_id!(
    /// Organization identifier assigned by the store.
    OrganizationId
);
surrogate_id!(
    /// Model identifier assigned by the store.
    ModelId
);
surrogate_id!(
    /// Schema identifier assigned by the store.
    SchemaId
);
surrogate_id!(
    /// Version identifier assigned by the store.
    VersionId
);
surrogate_id!(
    /// Result identifier assigned by the store.
    ResultId
);

// ============================================================================
// SECTION: Natural Names
// ============================================================================

/// Declares an opaque string name newtype.
macro_rules! natural_name {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        ///
        /// # Invariants
        /// - Opaque UTF-8 string; no normalization is applied by this type.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new name.
            #[must_use]
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            /// Returns the name as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true when the name is empty or whitespace only.
            #[must_use]
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

natural_name!(
    /// Organization name, globally unique.
    OrganizationName
);
natural_name!(
    /// Model name, unique within an organization.
    ModelName
);
natural_name!(
    /// Schema name, unique within an organization.
    SchemaName
);
natural_name!(
    /// Version name, unique within a model.
    VersionName
);

// ============================================================================
// SECTION: Entity Kinds
// ============================================================================

/// Tracked entity kinds, used to label lookups and errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling and log labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Organization entity.
    Organization,
    /// Model entity.
    Model,
    /// Schema entity.
    Schema,
    /// Version entity.
    Version,
    /// Result entity.
    Result,
}

impl EntityKind {
    /// Returns a stable label for the entity kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::Model => "model",
            Self::Schema => "schema",
            Self::Version => "version",
            Self::Result => "result",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
