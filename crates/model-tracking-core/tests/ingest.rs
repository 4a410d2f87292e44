// crates/model-tracking-core/tests/ingest.rs
// ============================================================================
// Module: Result Ingestion Tests
// Description: End-to-end ingestion over the in-memory store.
// Purpose: Verify lineage resolution, check ordering, and no-write-on-failure.
// Dependencies: model-tracking-core
// ============================================================================

//! ## Overview
//! Builds an organization/model/schema/version lineage and submits results
//! through [`ModelTracker`], asserting both outcomes and emitted log events.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    missing_docs,
    reason = "Test-only panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use model_tracking_core::EntityKind;
use model_tracking_core::ErrorKind;
use model_tracking_core::InMemoryModelTrackingStore;
use model_tracking_core::JsonPayload;
use model_tracking_core::LogLevel;
use model_tracking_core::ModelScope;
use model_tracking_core::ModelTracker;
use model_tracking_core::NewModel;
use model_tracking_core::NewOrganization;
use model_tracking_core::NewSchema;
use model_tracking_core::NewVersion;
use model_tracking_core::OrganizationScope;
use model_tracking_core::RequestContext;
use model_tracking_core::ResultSubmission;
use model_tracking_core::SchemaId;
use model_tracking_core::Timestamp;
use model_tracking_core::TrackingError;
use model_tracking_core::TrackingEvent;
use model_tracking_core::TrackingLogSink;
use model_tracking_core::ValidationCheck;
use model_tracking_core::VersionName;
use model_tracking_core::VersionScope;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

const INPUT_SCHEMA: &str = r#"{"type":"object","properties":{"text":{"type":"array","items":{"type":"string"}}},"required":["text"],"unevaluatedProperties":false}"#;
const OUTPUT_SCHEMA: &str = r#"{"type":"object","properties":{"predictions":{"type":"array","items":{"type":"object","properties":{"label":{"type":"string"},"score":{"type":"number","minimum":0,"maximum":1}},"required":["label","score"],"unevaluatedProperties":false}}},"required":["predictions"],"unevaluatedProperties":false}"#;
const INPUT: &str = r#"{"text":["a","b","c"]}"#;
const OUTPUT: &str =
    r#"{"predictions":[{"label":"cat","score":0.5},{"label":"kitten","score":0.25}]}"#;

#[derive(Default)]
struct CapturingSink {
    events: Mutex<Vec<TrackingEvent>>,
}

impl CapturingSink {
    fn operations(&self) -> Vec<(&'static str, u16, LogLevel)> {
        self.events
            .lock()
            .expect("events lock")
            .iter()
            .map(|event| (event.operation, event.status, event.level))
            .collect()
    }
}

impl TrackingLogSink for CapturingSink {
    fn record(&self, event: &TrackingEvent) {
        self.events.lock().expect("events lock").push(event.clone());
    }
}

struct Fixture {
    tracker: ModelTracker<InMemoryModelTrackingStore>,
    sink: Arc<CapturingSink>,
    scope: VersionScope,
    schema_id: SchemaId,
}

fn fixture() -> Fixture {
    let sink = Arc::new(CapturingSink::default());
    let tracker = ModelTracker::new(InMemoryModelTrackingStore::new())
        .with_log_sink(Some(sink.clone() as Arc<dyn TrackingLogSink>));
    let ctx = RequestContext::background();
    let org = OrganizationScope::new("acme");
    tracker
        .create_organization(&ctx, NewOrganization {
            name: "acme".into(),
        })
        .expect("organization");
    let schema = tracker
        .create_schema(&ctx, &org, NewSchema {
            name: "classifier".into(),
            input: INPUT_SCHEMA.to_string(),
            output: OUTPUT_SCHEMA.to_string(),
        })
        .expect("schema");
    tracker
        .create_model(&ctx, &org, NewModel {
            name: "tagger".into(),
            default_schema_id: None,
        })
        .expect("model");
    let model = org.model("tagger");
    tracker
        .create_version(&ctx, &model, NewVersion {
            name: "v1".into(),
            schema_id: schema.id,
        })
        .expect("version");
    Fixture {
        tracker,
        sink,
        scope: model.version("v1"),
        schema_id: schema.id,
    }
}

fn submission(input: &str, output: &str, true_output: &str) -> ResultSubmission {
    ResultSubmission {
        input: JsonPayload::from(input),
        output: JsonPayload::from(output),
        true_output: JsonPayload::from(true_output),
        time: None,
    }
}

fn result_count(fixture: &Fixture) -> usize {
    fixture
        .tracker
        .list_results(&RequestContext::background(), &fixture.scope)
        .expect("list results")
        .len()
}

// ============================================================================
// SECTION: Successful Ingestion
// ============================================================================

#[test]
fn valid_submission_round_trips_payloads() {
    let fixture = fixture();
    let ctx = RequestContext::background();
    let before = Timestamp::now();
    let record = fixture
        .tracker
        .submit_result(&ctx, &fixture.scope, submission(INPUT, OUTPUT, OUTPUT))
        .expect("ingest");
    assert_eq!(record.input.as_bytes(), INPUT.as_bytes());
    assert_eq!(record.output.as_bytes(), OUTPUT.as_bytes());
    assert_eq!(record.true_output.as_bytes(), OUTPUT.as_bytes());
    assert!(record.time >= before);

    let version = fixture
        .tracker
        .get_version(&ctx, &fixture.scope.model_scope(), &fixture.scope.version)
        .expect("version");
    assert_eq!(record.version_id, version.id);
    assert_eq!(record.model_id, version.model_id);
    assert_eq!(record.organization_id, version.organization_id);

    let fetched = fixture.tracker.get_result(&ctx, &fixture.scope, record.id).expect("get");
    assert_eq!(fetched, record);

    let last = fixture.sink.operations().last().copied().expect("event");
    assert_eq!(last, ("result.get", 200, LogLevel::Debug));
    assert!(fixture.sink.operations().contains(&("result.ingest", 201, LogLevel::Info)));
}

#[test]
fn supplied_time_is_kept() {
    let fixture = fixture();
    let mut request = submission(INPUT, OUTPUT, OUTPUT);
    let time = Timestamp::from_unix_millis(1_000);
    request.time = Some(time);
    let record = fixture
        .tracker
        .submit_result(&RequestContext::background(), &fixture.scope, request)
        .expect("ingest");
    assert_eq!(record.time, time);
}

// ============================================================================
// SECTION: Rejections
// ============================================================================

#[test]
fn scalar_payloads_fail_their_own_check_and_write_nothing() {
    let fixture = fixture();
    let ctx = RequestContext::background();
    let cases = [
        (submission(r#""cat""#, OUTPUT, OUTPUT), ValidationCheck::Input),
        (submission(INPUT, r#""cat""#, OUTPUT), ValidationCheck::Output),
        (submission(INPUT, OUTPUT, r#""cat""#), ValidationCheck::TrueOutput),
    ];
    for (request, expected) in cases {
        let err = fixture.tracker.submit_result(&ctx, &fixture.scope, request).expect_err("reject");
        match &err {
            TrackingError::ValidationFailed {
                check,
                violations,
            } => {
                assert_eq!(*check, expected);
                assert!(!violations.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.http_status(), 422);
    }
    assert_eq!(result_count(&fixture), 0);
}

#[test]
fn input_is_checked_before_output() {
    let fixture = fixture();
    let err = fixture
        .tracker
        .submit_result(
            &RequestContext::background(),
            &fixture.scope,
            submission(r#""cat""#, r#""cat""#, r#""cat""#),
        )
        .expect_err("reject");
    assert_eq!(err.to_string(), "input does not match input schema");
}

#[test]
fn malformed_payload_is_invalid_input() {
    let fixture = fixture();
    let err = fixture
        .tracker
        .submit_result(
            &RequestContext::background(),
            &fixture.scope,
            submission("{", OUTPUT, OUTPUT),
        )
        .expect_err("reject");
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(result_count(&fixture), 0);
}

#[test]
fn unknown_lineage_is_not_found() {
    let fixture = fixture();
    let ctx = RequestContext::background();
    let scopes = [
        (VersionScope::new("nope", "tagger", "v1"), EntityKind::Organization),
        (VersionScope::new("acme", "nope", "v1"), EntityKind::Model),
        (VersionScope::new("acme", "tagger", "nope"), EntityKind::Version),
    ];
    for (scope, kind) in scopes {
        let err = fixture
            .tracker
            .submit_result(&ctx, &scope, submission(INPUT, OUTPUT, OUTPUT))
            .expect_err("unknown lineage");
        assert_eq!(err, TrackingError::not_found(kind, "nope"));
        assert_eq!(err.http_status(), 404);
    }
}

#[test]
fn oversized_payload_is_rejected_before_lookup() {
    let fixture = fixture();
    let tracker = ModelTracker::new(fixture.tracker.store().clone()).with_max_payload_bytes(8);
    let err = tracker
        .submit_result(
            &RequestContext::background(),
            &VersionScope::new("nope", "nope", "nope"),
            submission(INPUT, OUTPUT, OUTPUT),
        )
        .expect_err("too large");
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn canceled_context_stops_ingestion() {
    let fixture = fixture();
    let token = model_tracking_core::CancellationToken::new();
    token.cancel();
    let ctx = RequestContext::background().with_cancellation(token);
    let err = fixture
        .tracker
        .submit_result(&ctx, &fixture.scope, submission(INPUT, OUTPUT, OUTPUT))
        .expect_err("canceled");
    assert_eq!(err.kind(), ErrorKind::Canceled);
    assert_eq!(result_count(&fixture), 0);
    let last = fixture.sink.operations().last().copied().expect("event");
    assert_eq!(last.0, "result.list");
    assert!(fixture.sink.operations().contains(&("result.ingest", 500, LogLevel::Error)));
}

// ============================================================================
// SECTION: Versions
// ============================================================================

#[test]
fn get_or_create_uses_default_schema_once() {
    let fixture = fixture();
    let ctx = RequestContext::background();
    let org = OrganizationScope::new("acme");
    let model: ModelScope = org.model("tagger");
    let name = VersionName::new("v2");

    let err = fixture.tracker.get_or_create_version(&ctx, &model, &name).expect_err("no default");
    assert_eq!(err.kind(), ErrorKind::NotFound);

    fixture
        .tracker
        .update_model(&ctx, &org, model_tracking_core::ModelUpdate {
            name: "tagger".into(),
            default_schema_id: Some(fixture.schema_id),
        })
        .expect("update");
    let first = fixture.tracker.get_or_create_version(&ctx, &model, &name).expect("create");
    let second = fixture.tracker.get_or_create_version(&ctx, &model, &name).expect("get");
    assert_eq!(first, second);
    assert_eq!(first.schema_id, fixture.schema_id);
    assert_eq!(fixture.tracker.list_versions(&ctx, &model).expect("list").len(), 2);
}

#[test]
fn duplicate_names_conflict() {
    let fixture = fixture();
    let ctx = RequestContext::background();
    let err = fixture
        .tracker
        .create_organization(&ctx, NewOrganization {
            name: "acme".into(),
        })
        .expect_err("duplicate");
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(fixture.tracker.list_organizations(&ctx).expect("list").len(), 1);
}
