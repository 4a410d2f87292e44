// crates/model-tracking-core/src/runtime/context.rs
// ============================================================================
// Module: Request Context
// Description: Deadline and cancellation carried through every operation.
// Purpose: Let callers abort blocking store and validation work cleanly.
// Dependencies: std
// ============================================================================

//! ## Overview
//! A [`RequestContext`] carries an optional deadline and an optional
//! [`CancellationToken`]. Stores call [`RequestContext::check`] before
//! beginning work, between steps, and before commit; a failed check aborts
//! the operation and its transaction rolls back.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

use crate::core::TrackingError;

// ============================================================================
// SECTION: Cancellation
// ============================================================================

/// Shared cancellation flag.
///
/// # Invariants
/// - Once canceled, a token stays canceled.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    /// Shared canceled flag.
    canceled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates an uncanceled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the token and all of its clones canceled.
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }

    /// Returns true once [`CancellationToken::cancel`] has been called.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }
}

// ============================================================================
// SECTION: Request Context
// ============================================================================

/// Per-request deadline and cancellation state.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Instant after which work must stop.
    deadline: Option<Instant>,
    /// Optional caller-controlled cancellation.
    cancel: Option<CancellationToken>,
}

impl RequestContext {
    /// Returns a context with no deadline and no cancellation.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// Returns a copy of this context that expires after `timeout`.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let deadline = Instant::now().checked_add(timeout);
        match deadline {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    /// Returns a copy of this context that expires at `deadline`.
    ///
    /// An earlier existing deadline is kept.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(self.deadline.map_or(deadline, |current| current.min(deadline)));
        self
    }

    /// Returns a copy of this context bound to a cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the time left before the deadline, if one is set.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline.map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Fails when the context has been canceled or its deadline has passed.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::Canceled`] when work must stop.
    pub fn check(&self) -> Result<(), TrackingError> {
        if let Some(token) = &self.cancel
            && token.is_canceled()
        {
            return Err(TrackingError::Canceled("context canceled".to_string()));
        }
        if let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            return Err(TrackingError::Canceled("context deadline exceeded".to_string()));
        }
        Ok(())
    }
}
