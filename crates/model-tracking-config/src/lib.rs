// crates/model-tracking-config/src/lib.rs
// ============================================================================
// Module: Model Tracking Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for model-tracking.toml semantics.
// Dependencies: model-tracking-core, model-tracking-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `model-tracking-config` defines the configuration model for the model
//! tracking service: the `SQLite` store, the event log sink, and request
//! deadlines. Validation is strict and fails closed.
//!
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
