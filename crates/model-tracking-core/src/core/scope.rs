// crates/model-tracking-core/src/core/scope.rs
// ============================================================================
// Module: Model Tracking Scopes
// Description: Parent-identifying value objects for scoped store operations.
// Purpose: Make the natural-name lineage of every child operation explicit.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A scope names the parents under which an entity operation runs. Stores
//! resolve each name to its surrogate id inside the operation's transaction;
//! scopes never carry ids so callers cannot assert lineage.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ModelName;
use crate::core::identifiers::OrganizationName;
use crate::core::identifiers::VersionName;

// ============================================================================
// SECTION: Scopes
// ============================================================================

/// Scope for models and schemas: a single organization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrganizationScope {
    /// Organization name.
    pub organization: OrganizationName,
}

impl OrganizationScope {
    /// Creates an organization scope.
    #[must_use]
    pub fn new(organization: impl Into<OrganizationName>) -> Self {
        Self {
            organization: organization.into(),
        }
    }

    /// Narrows the scope to a model within this organization.
    #[must_use]
    pub fn model(&self, model: impl Into<ModelName>) -> ModelScope {
        ModelScope {
            organization: self.organization.clone(),
            model: model.into(),
        }
    }
}

impl fmt::Display for OrganizationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.organization.fmt(f)
    }
}

/// Scope for versions: a model within an organization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelScope {
    /// Organization name.
    pub organization: OrganizationName,
    /// Model name.
    pub model: ModelName,
}

impl ModelScope {
    /// Creates a model scope.
    #[must_use]
    pub fn new(organization: impl Into<OrganizationName>, model: impl Into<ModelName>) -> Self {
        Self {
            organization: organization.into(),
            model: model.into(),
        }
    }

    /// Returns the enclosing organization scope.
    #[must_use]
    pub fn organization_scope(&self) -> OrganizationScope {
        OrganizationScope {
            organization: self.organization.clone(),
        }
    }

    /// Narrows the scope to a version of this model.
    #[must_use]
    pub fn version(&self, version: impl Into<VersionName>) -> VersionScope {
        VersionScope {
            organization: self.organization.clone(),
            model: self.model.clone(),
            version: version.into(),
        }
    }
}

impl fmt::Display for ModelScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.organization, self.model)
    }
}

/// Scope for results: a version of a model within an organization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionScope {
    /// Organization name.
    pub organization: OrganizationName,
    /// Model name.
    pub model: ModelName,
    /// Version name.
    pub version: VersionName,
}

impl VersionScope {
    /// Creates a version scope.
    #[must_use]
    pub fn new(
        organization: impl Into<OrganizationName>,
        model: impl Into<ModelName>,
        version: impl Into<VersionName>,
    ) -> Self {
        Self {
            organization: organization.into(),
            model: model.into(),
            version: version.into(),
        }
    }

    /// Returns the enclosing model scope.
    #[must_use]
    pub fn model_scope(&self) -> ModelScope {
        ModelScope {
            organization: self.organization.clone(),
            model: self.model.clone(),
        }
    }

    /// Returns the enclosing organization scope.
    #[must_use]
    pub fn organization_scope(&self) -> OrganizationScope {
        OrganizationScope {
            organization: self.organization.clone(),
        }
    }
}

impl fmt::Display for VersionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.organization, self.model, self.version)
    }
}
