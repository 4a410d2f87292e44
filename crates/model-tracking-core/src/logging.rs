// crates/model-tracking-core/src/logging.rs
// ============================================================================
// Module: Model Tracking Logging
// Description: Structured operation events and pluggable log sinks.
// Purpose: Emit JSON-line operation logs without a hard logging dependency.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every tracker operation produces one [`TrackingEvent`]. Sinks receive the
//! event and decide where it goes; [`NoopLogSink`] is the default so callers
//! that do not care about logs pay nothing. Events carry names, ids, and
//! outcome metadata only; result payloads are never logged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;

use crate::core::ErrorKind;

// ============================================================================
// SECTION: Levels
// ============================================================================

/// Event severity, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Read operations and other high-volume detail.
    Debug,
    /// Successful writes and client-side failures.
    #[default]
    Info,
    /// Server-side failures.
    Error,
}

impl LogLevel {
    /// Returns a stable label for the level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

/// Operation outcome label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationOutcome {
    /// The operation succeeded.
    Ok,
    /// The operation failed.
    Error,
}

// ============================================================================
// SECTION: Events
// ============================================================================

/// Operation event payload.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Event severity.
    pub level: LogLevel,
    /// Operation name, for example `result.ingest`.
    pub operation: &'static str,
    /// Operation outcome.
    pub outcome: OperationOutcome,
    /// Error kind when the operation failed.
    pub error_kind: Option<ErrorKind>,
    /// HTTP-equivalent status of the outcome.
    pub status: u16,
    /// Organization name in scope, if any.
    pub organization: Option<String>,
    /// Model name in scope, if any.
    pub model: Option<String>,
    /// Version name in scope, if any.
    pub version: Option<String>,
    /// Identifier of the affected entity on success.
    pub entity_id: Option<u64>,
    /// Wall time spent in the operation.
    pub elapsed_ms: u128,
}

/// Inputs for building a [`TrackingEvent`].
#[derive(Debug, Clone, Default)]
pub struct TrackingEventParams {
    /// Operation name.
    pub operation: &'static str,
    /// True for read-only operations.
    pub read_only: bool,
    /// True when the operation creates an entity.
    pub creates: bool,
    /// Error kind when the operation failed.
    pub error_kind: Option<ErrorKind>,
    /// Organization name in scope.
    pub organization: Option<String>,
    /// Model name in scope.
    pub model: Option<String>,
    /// Version name in scope.
    pub version: Option<String>,
    /// Affected entity id.
    pub entity_id: Option<u64>,
    /// Wall time spent in the operation.
    pub elapsed_ms: u128,
}

impl TrackingEvent {
    /// Builds an event, deriving level, outcome, and status.
    #[must_use]
    pub fn new(params: TrackingEventParams) -> Self {
        let (outcome, status, level) = match params.error_kind {
            None => {
                let status = if params.creates { 201 } else { 200 };
                let level = if params.read_only { LogLevel::Debug } else { LogLevel::Info };
                (OperationOutcome::Ok, status, level)
            }
            Some(kind) => {
                let status = kind.http_status();
                let level = if status >= 500 { LogLevel::Error } else { LogLevel::Info };
                (OperationOutcome::Error, status, level)
            }
        };
        Self {
            event: "tracking_operation",
            timestamp_ms: now_millis(),
            level,
            operation: params.operation,
            outcome,
            error_kind: params.error_kind,
            status,
            organization: params.organization,
            model: params.model,
            version: params.version,
            entity_id: params.entity_id,
            elapsed_ms: params.elapsed_ms,
        }
    }
}

/// Returns the current unix time in milliseconds.
fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |duration| duration.as_millis())
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Log sink for tracker events.
pub trait TrackingLogSink: Send + Sync {
    /// Record an event.
    fn record(&self, event: &TrackingEvent);
}

/// Sink that logs JSON lines to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrLogSink {
    /// Minimum level recorded.
    min_level: LogLevel,
}

impl StderrLogSink {
    /// Creates a stderr sink that drops events below `min_level`.
    #[must_use]
    pub const fn new(min_level: LogLevel) -> Self {
        Self {
            min_level,
        }
    }
}

impl TrackingLogSink for StderrLogSink {
    fn record(&self, event: &TrackingEvent) {
        if event.level < self.min_level {
            return;
        }
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Sink that appends JSON lines to a file.
pub struct FileLogSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
    /// Minimum level recorded.
    min_level: LogLevel,
}

impl FileLogSink {
    /// Opens the log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path, min_level: LogLevel) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
            min_level,
        })
    }
}

impl TrackingLogSink for FileLogSink {
    fn record(&self, event: &TrackingEvent) {
        if event.level < self.min_level {
            return;
        }
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogSink;

impl TrackingLogSink for NoopLogSink {
    fn record(&self, _event: &TrackingEvent) {}
}
