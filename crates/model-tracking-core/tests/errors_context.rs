// crates/model-tracking-core/tests/errors_context.rs
// ============================================================================
// Module: Error Taxonomy and Request Context Tests
// Description: Status mapping, messages, deadlines, and cancellation.
// Purpose: Keep the outcome contract stable for request layers.
// Dependencies: model-tracking-core
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    missing_docs,
    reason = "Test-only panic-based assertions are permitted."
)]

use std::time::Duration;
use std::time::Instant;

use model_tracking_core::CancellationToken;
use model_tracking_core::EntityKind;
use model_tracking_core::ErrorKind;
use model_tracking_core::RequestContext;
use model_tracking_core::Timestamp;
use model_tracking_core::TrackingError;
use model_tracking_core::ValidationCheck;

// ============================================================================
// SECTION: Error Taxonomy
// ============================================================================

#[test]
fn statuses_follow_error_kinds() {
    let cases = [
        (TrackingError::not_found(EntityKind::Organization, "acme"), 404),
        (TrackingError::InvalidInput("bad".to_string()), 422),
        (
            TrackingError::ValidationFailed {
                check: ValidationCheck::Input,
                violations: vec!["x".to_string()],
            },
            422,
        ),
        (TrackingError::Conflict("dup".to_string()), 500),
        (TrackingError::Internal("io".to_string()), 500),
        (TrackingError::Canceled("late".to_string()), 500),
    ];
    for (err, status) in cases {
        assert_eq!(err.http_status(), status, "{err}");
    }
}

#[test]
fn not_found_names_kind_and_name() {
    let err = TrackingError::not_found(EntityKind::Organization, "acme");
    assert_eq!(err.to_string(), "organization not found: acme");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.is_not_found());
}

#[test]
fn validation_messages_name_the_failed_check() {
    let expected = [
        (ValidationCheck::Input, "input does not match input schema"),
        (ValidationCheck::Output, "output does not match output schema"),
        (ValidationCheck::TrueOutput, "true output does not match output schema"),
    ];
    for (check, message) in expected {
        let err = TrackingError::ValidationFailed {
            check,
            violations: Vec::new(),
        };
        assert_eq!(err.to_string(), message);
    }
}

// ============================================================================
// SECTION: Request Context
// ============================================================================

#[test]
fn background_context_never_expires() {
    let ctx = RequestContext::background();
    assert!(ctx.check().is_ok());
    assert!(ctx.deadline().is_none());
}

#[test]
fn canceled_token_fails_every_clone() {
    let token = CancellationToken::new();
    let ctx = RequestContext::background().with_cancellation(token.clone());
    assert!(ctx.check().is_ok());
    token.cancel();
    let err = ctx.check().expect_err("canceled");
    assert_eq!(err.kind(), ErrorKind::Canceled);
}

#[test]
fn past_deadline_fails_check() {
    let ctx = RequestContext::background().with_timeout(Duration::ZERO);
    let err = ctx.check().expect_err("expired");
    assert_eq!(err.kind(), ErrorKind::Canceled);
}

#[test]
fn earlier_deadline_wins() {
    let soon = Instant::now() + Duration::from_secs(5);
    let later = soon + Duration::from_secs(60);
    let ctx = RequestContext::background().with_deadline(soon).with_deadline(later);
    assert_eq!(ctx.deadline(), Some(soon));
}

// ============================================================================
// SECTION: Timestamps
// ============================================================================

#[test]
fn rfc3339_parses_to_unix_millis() {
    let ts = Timestamp::parse_rfc3339("2024-01-02T03:04:05.678Z").expect("parse");
    assert_eq!(ts.as_unix_millis(), 1_704_164_645_678);
    assert_eq!(ts.to_rfc3339(), "2024-01-02T03:04:05.678Z");
}

#[test]
fn malformed_rfc3339_is_rejected() {
    assert!(Timestamp::parse_rfc3339("yesterday").is_err());
}
