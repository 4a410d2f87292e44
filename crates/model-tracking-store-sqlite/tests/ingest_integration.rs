// crates/model-tracking-store-sqlite/tests/ingest_integration.rs
// ============================================================================
// Module: SQLite Ingestion Integration Tests
// Description: Result ingestion through the tracker on a SQLite store.
// Purpose: Validate schema checks against persisted schemas end to end.
// ============================================================================

//! ## Overview
//! Drives [`ModelTracker`] over [`SqliteModelTrackingStore`] with the
//! classifier schema pair and checks both accepted and rejected submissions
//! against the rows actually on disk.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    missing_docs,
    reason = "Test-only panic-based assertions are permitted."
)]

use std::path::Path;
use std::sync::Arc;
use std::thread;

use model_tracking_core::ErrorKind;
use model_tracking_core::JsonPayload;
use model_tracking_core::ModelTracker;
use model_tracking_core::NewModel;
use model_tracking_core::NewOrganization;
use model_tracking_core::NewSchema;
use model_tracking_core::NewVersion;
use model_tracking_core::OrganizationScope;
use model_tracking_core::RequestContext;
use model_tracking_core::ResultSubmission;
use model_tracking_core::TrackingError;
use model_tracking_core::ValidationCheck;
use model_tracking_core::VersionScope;
use model_tracking_store_sqlite::SqliteModelTrackingStore;
use model_tracking_store_sqlite::SqliteStoreConfig;
use rusqlite::Connection;
use rusqlite::params;
use tempfile::TempDir;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

const INPUT_SCHEMA: &str = r#"{"type":"object","properties":{"text":{"type":"array","items":{"type":"string"}}},"required":["text"],"unevaluatedProperties":false}"#;
const OUTPUT_SCHEMA: &str = r#"{"type":"object","properties":{"predictions":{"type":"array","items":{"type":"object","properties":{"label":{"type":"string"},"score":{"type":"number","minimum":0,"maximum":1}},"required":["label","score"],"unevaluatedProperties":false}}},"required":["predictions"],"unevaluatedProperties":false}"#;
const INPUT: &str = r#"{"text":["a","b","c"]}"#;
const OUTPUT: &str =
    r#"{"predictions":[{"label":"cat","score":0.5},{"label":"kitten","score":0.25}]}"#;

struct Fixture {
    _temp: TempDir,
    path: std::path::PathBuf,
    tracker: ModelTracker<SqliteModelTrackingStore>,
    scope: VersionScope,
}

fn fixture() -> Fixture {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("tracking.sqlite");
    let store = SqliteModelTrackingStore::new(SqliteStoreConfig::new(&path)).unwrap();
    let tracker = ModelTracker::new(store);
    let ctx = RequestContext::background();
    let org = OrganizationScope::new("acme");
    tracker
        .create_organization(&ctx, NewOrganization {
            name: "acme".into(),
        })
        .unwrap();
    let schema = tracker
        .create_schema(&ctx, &org, NewSchema {
            name: "classifier".into(),
            input: INPUT_SCHEMA.to_string(),
            output: OUTPUT_SCHEMA.to_string(),
        })
        .unwrap();
    tracker
        .create_model(&ctx, &org, NewModel {
            name: "tagger".into(),
            default_schema_id: Some(schema.id),
        })
        .unwrap();
    let model = org.model("tagger");
    tracker
        .create_version(&ctx, &model, NewVersion {
            name: "v1".into(),
            schema_id: schema.id,
        })
        .unwrap();
    Fixture {
        _temp: temp,
        path,
        tracker,
        scope: model.version("v1"),
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

fn stored_results(path: &Path) -> i64 {
    let conn = Connection::open(path).unwrap();
    conn.query_row("SELECT COUNT(*) FROM results", params![], |row| row.get(0)).unwrap()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn valid_result_is_persisted_verbatim() {
    let fixture = fixture();
    let ctx = RequestContext::background();
    let record = fixture
        .tracker
        .submit_result(&ctx, &fixture.scope, submission(INPUT, OUTPUT, OUTPUT))
        .unwrap();
    assert_eq!(stored_results(&fixture.path), 1);

    let fetched = fixture.tracker.get_result(&ctx, &fixture.scope, record.id).unwrap();
    assert_eq!(fetched.input.as_bytes(), INPUT.as_bytes());
    assert_eq!(fetched.output.as_bytes(), OUTPUT.as_bytes());
    assert_eq!(fetched.true_output.as_bytes(), OUTPUT.as_bytes());
    assert_eq!(fetched.time, record.time);
}

#[test]
fn each_failing_check_leaves_no_row() {
    let fixture = fixture();
    let ctx = RequestContext::background();
    let bad_output = r#"{"predictions":[{"label":"cat","score":2}]}"#;
    let cases = [
        (submission(r#"{"text":["a"],"extra":1}"#, OUTPUT, OUTPUT), ValidationCheck::Input),
        (submission(INPUT, bad_output, OUTPUT), ValidationCheck::Output),
        (submission(INPUT, OUTPUT, r#""cat""#), ValidationCheck::TrueOutput),
    ];
    for (request, expected) in cases {
        let err = fixture.tracker.submit_result(&ctx, &fixture.scope, request).unwrap_err();
        let TrackingError::ValidationFailed {
            check, ..
        } = &err
        else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(*check, expected);
        assert_eq!(err.to_string(), expected.message());
    }
    assert_eq!(stored_results(&fixture.path), 0);
}

#[test]
fn auto_created_version_accepts_results() {
    let fixture = fixture();
    let ctx = RequestContext::background();
    let model = fixture.scope.model_scope();
    let version = fixture.tracker.get_or_create_version(&ctx, &model, &"nightly".into()).unwrap();
    let scope = model.version(version.name.as_str());
    fixture.tracker.submit_result(&ctx, &scope, submission(INPUT, OUTPUT, OUTPUT)).unwrap();
    assert_eq!(fixture.tracker.list_results(&ctx, &scope).unwrap().len(), 1);
    assert_eq!(fixture.tracker.list_results(&ctx, &fixture.scope).unwrap().len(), 0);
}

#[test]
fn unknown_version_is_not_found() {
    let fixture = fixture();
    let scope = VersionScope::new("acme", "tagger", "v9");
    let err = fixture
        .tracker
        .submit_result(&RequestContext::background(), &scope, submission(INPUT, OUTPUT, OUTPUT))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.http_status(), 404);
}

#[test]
fn concurrent_submissions_all_land() {
    let fixture = fixture();
    let tracker = Arc::new(fixture.tracker);
    let handles: Vec<_> = (0 .. 6)
        .map(|_| {
            let tracker = Arc::clone(&tracker);
            let scope = fixture.scope.clone();
            thread::spawn(move || {
                tracker.submit_result(
                    &RequestContext::background(),
                    &scope,
                    submission(INPUT, OUTPUT, OUTPUT),
                )
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }
    assert_eq!(stored_results(&fixture.path), 6);
}
