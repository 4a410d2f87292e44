// crates/model-tracking-core/tests/validator.rs
// ============================================================================
// Module: Schema Validator Tests
// Description: Compilation and validation behavior for JSON Schema documents.
// Purpose: Pin the split between bad schemas, bad documents, and violations.
// Dependencies: model-tracking-core, proptest, serde_json
// ============================================================================

//! ## Overview
//! Exercises schema compilation, document validation, and the schema-pair
//! check used at schema creation.

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

use model_tracking_core::DocumentError;
use model_tracking_core::ErrorKind;
use model_tracking_core::SchemaCompileError;
use model_tracking_core::ValidationOutcome;
use model_tracking_core::compile_schema;
use model_tracking_core::validate_schema_documents;
use proptest::prelude::*;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

const INPUT_SCHEMA: &str = r#"{
    "type": "object",
    "properties": {
        "text": {"type": "array", "items": {"type": "string"}}
    },
    "required": ["text"],
    "unevaluatedProperties": false
}"#;

const OUTPUT_SCHEMA: &str = r#"{
    "type": "object",
    "properties": {
        "predictions": {
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "label": {"type": "string"},
                    "score": {"type": "number", "minimum": 0, "maximum": 1}
                },
                "required": ["label", "score"],
                "unevaluatedProperties": false
            }
        }
    },
    "required": ["predictions"],
    "unevaluatedProperties": false
}"#;

const INPUT: &str = r#"{"text":["a","b","c"]}"#;
const OUTPUT: &str =
    r#"{"predictions":[{"label":"cat","score":0.5},{"label":"kitten","score":0.25}]}"#;

// ============================================================================
// SECTION: Compilation
// ============================================================================

#[test]
fn reference_schemas_compile() {
    compile_schema(INPUT_SCHEMA).expect("input schema");
    compile_schema(OUTPUT_SCHEMA).expect("output schema");
}

#[test]
fn non_json_schema_is_malformed() {
    let err = compile_schema("{not json").expect_err("malformed");
    assert!(matches!(err, SchemaCompileError::Malformed(_)));
}

#[test]
fn scalar_schema_document_is_rejected() {
    let err = compile_schema("1").expect_err("scalar schema");
    assert!(matches!(err, SchemaCompileError::Invalid(_)));
}

#[test]
fn unknown_type_keyword_value_is_rejected() {
    let err = compile_schema(r#"{"type":"not-a-type"}"#).expect_err("bad type");
    assert!(matches!(err, SchemaCompileError::Invalid(_)));
}

#[test]
fn declared_draft_is_accepted() {
    let schema = r#"{"$schema":"http://json-schema.org/draft-07/schema#","type":"string"}"#;
    let compiled = compile_schema(schema).expect("draft 7 schema");
    assert!(compiled.validate(br#""cat""#).expect("json").is_valid());
}

// ============================================================================
// SECTION: Validation
// ============================================================================

#[test]
fn reference_payloads_are_valid() {
    let input = compile_schema(INPUT_SCHEMA).expect("input schema");
    let output = compile_schema(OUTPUT_SCHEMA).expect("output schema");
    assert_eq!(input.validate(INPUT.as_bytes()).expect("json"), ValidationOutcome::Valid);
    assert_eq!(output.validate(OUTPUT.as_bytes()).expect("json"), ValidationOutcome::Valid);
}

#[test]
fn scalar_payload_reports_violations() {
    let input = compile_schema(INPUT_SCHEMA).expect("input schema");
    match input.validate(br#""cat""#).expect("json") {
        ValidationOutcome::Invalid(violations) => assert!(!violations.is_empty()),
        ValidationOutcome::Valid => panic!("scalar input accepted"),
    }
}

#[test]
fn unevaluated_properties_are_rejected() {
    let input = compile_schema(INPUT_SCHEMA).expect("input schema");
    let outcome = input.validate(br#"{"text":["a"],"extra":true}"#).expect("json");
    assert!(!outcome.is_valid());
}

#[test]
fn out_of_range_score_is_rejected() {
    let output = compile_schema(OUTPUT_SCHEMA).expect("output schema");
    let outcome =
        output.validate(br#"{"predictions":[{"label":"cat","score":1.5}]}"#).expect("json");
    assert!(!outcome.is_valid());
}

#[test]
fn malformed_document_is_a_document_error() {
    let input = compile_schema(INPUT_SCHEMA).expect("input schema");
    let err = input.validate(b"{\"text\": [").expect_err("malformed document");
    assert!(matches!(err, DocumentError::Malformed(_)));
}

// ============================================================================
// SECTION: Schema Pairs
// ============================================================================

#[test]
fn schema_pair_reports_which_document_failed() {
    validate_schema_documents(INPUT_SCHEMA, OUTPUT_SCHEMA).expect("valid pair");

    let err = validate_schema_documents("1", OUTPUT_SCHEMA).expect_err("bad input");
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(err.to_string(), "invalid input schema");

    let err = validate_schema_documents(INPUT_SCHEMA, "1").expect_err("bad output");
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(err.to_string(), "invalid output schema");
}

// ============================================================================
// SECTION: Properties
// ============================================================================

proptest! {
    #[test]
    fn string_payloads_never_satisfy_object_schema(text in ".*") {
        let input = compile_schema(INPUT_SCHEMA).expect("input schema");
        let payload = serde_json::to_vec(&text).expect("encode");
        let outcome = input.validate(&payload).expect("json");
        prop_assert!(!outcome.is_valid());
    }

    #[test]
    fn string_arrays_satisfy_input_schema(items in proptest::collection::vec(".*", 0..8)) {
        let input = compile_schema(INPUT_SCHEMA).expect("input schema");
        let payload = serde_json::to_vec(&serde_json::json!({ "text": items })).expect("encode");
        prop_assert!(input.validate(&payload).expect("json").is_valid());
    }
}
