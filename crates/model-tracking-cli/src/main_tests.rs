// crates/model-tracking-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing, bounded reads, and dispatch.
// Purpose: Exercise every command family against a temporary SQLite store.
// Dependencies: model-tracking-cli main helpers, tempfile
// ============================================================================

//! ## Overview
//! Parses real argument vectors, dispatches them against a store in a temp
//! directory, and asserts on the JSON each command renders.

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

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use serde_json::Value;
use tempfile::TempDir;

use super::Cli;
use super::ReadLimitError;
use super::dispatch;
use super::load_config;
use super::open_tracker;
use super::read_bytes_with_limit;
use super::run;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const INPUT_SCHEMA: &str = r#"{"type":"object","properties":{"text":{"type":"array","items":{"type":"string"}}},"required":["text"]}"#;
const OUTPUT_SCHEMA: &str = r#"{"type":"object","required":["label"]}"#;

struct Workspace {
    temp: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("model-tracking.toml");
        let db = temp.path().join("tracking.sqlite");
        fs::write(&config, format!("[store]\npath = {:?}\n", db.display().to_string())).unwrap();
        Self {
            temp,
            config,
        }
    }

    fn file(&self, name: &str, content: &str) -> String {
        let path = self.temp.path().join(name);
        fs::write(&path, content).unwrap();
        path.display().to_string()
    }

    fn exec(&self, args: &[&str]) -> Result<Value, String> {
        let mut argv = vec!["model-tracking", "--config"];
        let config = self.config.display().to_string();
        argv.push(config.as_str());
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).map_err(|err| err.to_string())?;
        let config = load_config(cli.config.as_deref()).map_err(|err| err.to_string())?;
        let tracker = open_tracker(&config).map_err(|err| err.to_string())?;
        let ctx = config.requests.request_context();
        dispatch(&tracker, &ctx, &config, cli.command).map_err(|err| err.to_string())
    }

    fn seed(&self) {
        self.exec(&["organization", "create", "acme"]).unwrap();
        let input = self.file("input.schema.json", INPUT_SCHEMA);
        let output = self.file("output.schema.json", OUTPUT_SCHEMA);
        self.exec(&[
            "schema", "create", "--org", "acme", "classifier", "--input", &input, "--output",
            &output,
        ])
        .unwrap();
        self.exec(&["model", "create", "--org", "acme", "tagger", "--default-schema", "classifier"])
            .unwrap();
    }
}

// ============================================================================
// SECTION: Bounded Reads
// ============================================================================

#[test]
fn read_bytes_with_limit_allows_small_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("small.bin");
    fs::write(&path, b"ok").unwrap();
    assert_eq!(read_bytes_with_limit(&path, 16).unwrap(), b"ok");
}

#[test]
fn read_bytes_with_limit_rejects_large_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("large.bin");
    fs::write(&path, vec![0_u8; 9]).unwrap();
    match read_bytes_with_limit(&path, 8) {
        Err(ReadLimitError::TooLarge {
            size,
            limit,
        }) => {
            assert_eq!(size, 9);
            assert_eq!(limit, 8);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

#[test]
fn lineage_and_results_round_trip() {
    let ws = Workspace::new();
    ws.seed();

    let version =
        ws.exec(&["version", "get-or-create", "--org", "acme", "--model", "tagger", "v1"]).unwrap();
    assert_eq!(version["name"], "v1");

    let input = ws.file("input.json", r#"{"text":["a"]}"#);
    let output = ws.file("output.json", r#"{"label":"cat"}"#);
    let record = ws
        .exec(&[
            "result", "submit", "--org", "acme", "--model", "tagger", "--version", "v1",
            "--input", &input, "--output", &output, "--true-output", &output, "--time",
            "2024-01-02T03:04:05.678Z",
        ])
        .unwrap();
    assert_eq!(record["input"], serde_json::json!({"text": ["a"]}));
    assert_eq!(record["time"], 1_704_164_645_678_u64);

    let id = record["id"].as_u64().unwrap().to_string();
    let fetched = ws
        .exec(&["result", "get", "--org", "acme", "--model", "tagger", "--version", "v1", &id])
        .unwrap();
    assert_eq!(fetched, record);

    let listed =
        ws.exec(&["result", "list", "--org", "acme", "--model", "tagger", "--version", "v1"]);
    assert_eq!(listed.unwrap().as_array().map(Vec::len), Some(1));
}

#[test]
fn failed_validation_reports_status_class() {
    let ws = Workspace::new();
    ws.seed();
    ws.exec(&[
        "version", "create", "--org", "acme", "--model", "tagger", "v1", "--schema", "classifier",
    ])
    .unwrap();

    let scalar = ws.file("scalar.json", r#""cat""#);
    let output = ws.file("output.json", r#"{"label":"cat"}"#);
    let err = ws
        .exec(&[
            "result", "submit", "--org", "acme", "--model", "tagger", "--version", "v1",
            "--input", &scalar, "--output", &output, "--true-output", &output,
        ])
        .unwrap_err();
    assert_eq!(err, "input does not match input schema (422 validation_failed)");
}

#[test]
fn unknown_parent_reports_not_found() {
    let ws = Workspace::new();
    let err = ws.exec(&["model", "list", "--org", "ghost"]).unwrap_err();
    assert_eq!(err, "organization not found: ghost (404 not_found)");
}

#[test]
fn invalid_time_is_rejected() {
    let ws = Workspace::new();
    ws.seed();
    let payload = ws.file("payload.json", "{}");
    let err = ws
        .exec(&[
            "result", "submit", "--org", "acme", "--model", "tagger", "--version", "v1",
            "--input", &payload, "--output", &payload, "--true-output", &payload, "--time",
            "yesterday",
        ])
        .unwrap_err();
    assert!(err.ends_with("(422 invalid_input)"), "{err}");
}

#[test]
fn model_update_clears_default_schema() {
    let ws = Workspace::new();
    ws.seed();
    let model = ws.exec(&["model", "update", "--org", "acme", "tagger"]).unwrap();
    assert_eq!(model["default_schema_id"], Value::Null);
}

#[test]
fn missing_scope_flag_fails_to_parse() {
    assert!(Cli::try_parse_from(["model-tracking", "model", "list"]).is_err());
}

#[test]
fn config_validate_reports_limits() {
    let ws = Workspace::new();
    let cli = Cli::try_parse_from([
        "model-tracking",
        "config",
        "validate",
        "--config",
        &ws.config.display().to_string(),
    ])
    .unwrap();
    let summary = run(cli).unwrap();
    assert_eq!(summary["valid"], true);
    assert!(summary["timeout_ms"].is_null());
}
