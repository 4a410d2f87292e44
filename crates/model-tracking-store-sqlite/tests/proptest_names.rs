// crates/model-tracking-store-sqlite/tests/proptest_names.rs
// ============================================================================
// Module: SQLite Store Name Property Tests
// Description: Property tests for name round-trips and uniqueness.
// Purpose: Check that arbitrary valid names persist verbatim and stay unique.
// Dependencies: model-tracking-store-sqlite, proptest, tempfile
// ============================================================================

//! Property-based tests for name handling in the `SQLite` store.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    missing_docs,
    reason = "Test-only panic-based assertions are permitted."
)]

use std::collections::BTreeSet;
use std::path::Path;

use model_tracking_core::ErrorKind;
use model_tracking_core::ModelStore;
use model_tracking_core::NewModel;
use model_tracking_core::NewOrganization;
use model_tracking_core::OrganizationScope;
use model_tracking_core::OrganizationStore;
use model_tracking_core::RequestContext;
use model_tracking_store_sqlite::SqliteModelTrackingStore;
use model_tracking_store_sqlite::SqliteStoreConfig;
use proptest::prelude::*;
use rusqlite::Connection;
use rusqlite::params;
use tempfile::TempDir;

fn row_count(path: &Path, table: &str) -> i64 {
    let conn = Connection::open(path).unwrap();
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), params![], |row| row.get(0)).unwrap()
}

fn name_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9\u{e9}\u{4e2d}][A-Za-z0-9 ._\u{e9}\u{4e2d}-]{0,31}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn organization_names_round_trip_and_stay_unique(name in name_strategy()) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("store.sqlite");
        let store = SqliteModelTrackingStore::new(SqliteStoreConfig::new(&path)).unwrap();
        let ctx = RequestContext::background();

        let created = store
            .create_organization(&ctx, NewOrganization { name: name.as_str().into() })
            .unwrap();
        let fetched = store.get_organization(&ctx, &name.as_str().into()).unwrap();
        prop_assert_eq!(fetched.name.as_str(), name.as_str());
        prop_assert_eq!(fetched.id, created.id);

        let err = store
            .create_organization(&ctx, NewOrganization { name: name.as_str().into() })
            .unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::Conflict);
        prop_assert_eq!(row_count(&path, "organizations"), 1);
    }

    #[test]
    fn distinct_model_names_are_all_listed(
        names in prop::collection::btree_set(name_strategy(), 1 .. 6)
    ) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("store.sqlite");
        let store = SqliteModelTrackingStore::new(SqliteStoreConfig::new(&path)).unwrap();
        let ctx = RequestContext::background();
        let org = OrganizationScope::new("acme");
        store.create_organization(&ctx, NewOrganization { name: "acme".into() }).unwrap();

        for name in &names {
            store
                .create_model(&ctx, &org, NewModel {
                    name: name.as_str().into(),
                    default_schema_id: None,
                })
                .unwrap();
        }
        let listed: BTreeSet<String> = store
            .list_models(&ctx, &org)
            .unwrap()
            .into_iter()
            .map(|model| model.name.as_str().to_string())
            .collect();
        prop_assert_eq!(listed, names);
    }
}
