//! Session scenarios against the in-memory store.
//!
//! These tests run the initializer end to end without a Bigtable instance
//! and check what it prints, what it logs and what ends up in the table.

use bytes::Bytes;
use futures_util::StreamExt;

use dfdl_client::sample::{
    COLUMN_FAMILY, QUALIFIER_DEFINITION, QUALIFIER_NAME, SAMPLE_DEFINITION, SAMPLE_NAME,
};
use dfdl_client::{ClientError, DataClient, MemoryStore, Query, RowMutation, TableAdmin};
use dfdl_test::utils::{capture_logs, memory_session, memory_session_for, TABLE_ID};

/// Creating twice issues exactly one create call.
#[tokio::test]
async fn test_table_creation_is_idempotent() {
    let store = MemoryStore::shared();
    let (mut session, output) = memory_session(&store).unwrap();

    session.ensure_table_exists().await.unwrap();
    session.ensure_table_exists().await.unwrap();

    let stats = store.stats();
    assert_eq!(stats.exists_calls, 2);
    assert_eq!(stats.create_calls, 1);
    assert_eq!(
        output.lines(),
        vec![
            "Creating table: dfdl-schemas",
            "Table dfdl-schemas created successfully"
        ]
    );
}

/// A table created by someone else is left alone.
#[tokio::test]
async fn test_existing_table_is_not_recreated() {
    let store = MemoryStore::shared();
    store
        .admin()
        .create_table(dfdl_client::sample::table_spec(TABLE_ID))
        .await
        .unwrap();

    let (mut session, output) = memory_session(&store).unwrap();
    session.ensure_table_exists().await.unwrap();

    assert_eq!(store.stats().create_calls, 1);
    assert!(output.text().is_empty());
}

/// Both cells written to rowKey2 read back byte for byte.
#[tokio::test]
async fn test_written_row_is_retrievable() {
    let store = MemoryStore::shared();
    let (mut session, output) = memory_session(&store).unwrap();
    session.ensure_table_exists().await.unwrap();
    session.write_row().await.unwrap();

    let row = store
        .data()
        .read_row(TABLE_ID, Bytes::from_static(b"rowKey2"))
        .await
        .unwrap()
        .expect("row written");
    let name = row.cells_for(COLUMN_FAMILY, QUALIFIER_NAME.as_bytes());
    let definition = row.cells_for(COLUMN_FAMILY, QUALIFIER_DEFINITION.as_bytes());
    assert_eq!(name.len(), 1);
    assert_eq!(definition.len(), 1);
    assert_eq!(&name[0].value[..], SAMPLE_NAME.as_bytes());
    assert_eq!(&definition[0].value[..], SAMPLE_DEFINITION.as_bytes());

    // The definition is echoed after the header.
    let text = output.text();
    let header = text.find("Writing a definition to the table").unwrap();
    let echoed = text.find(SAMPLE_DEFINITION).unwrap();
    assert!(header < echoed);
}

/// Reading from a missing table logs the failure and returns nothing.
#[tokio::test]
async fn test_missing_table_read_is_logged() {
    let (_guard, logs) = capture_logs();
    let store = MemoryStore::shared();
    let (mut session, _output) = memory_session(&store).unwrap();

    let row = session.read_row_by_key("rowKey3").await.unwrap();
    assert!(row.is_none());

    let logs = logs.text();
    assert!(logs.contains("ERROR"));
    assert!(logs.contains("Failed to read from a non-existent table"));
    assert!(logs.contains("dfdl-schemas"));
}

/// Writing to a missing table logs the failure and does not propagate it.
#[tokio::test]
async fn test_missing_table_write_is_logged() {
    let (_guard, logs) = capture_logs();
    let store = MemoryStore::shared();
    let (mut session, output) = memory_session(&store).unwrap();

    session.write_row().await.unwrap();

    assert!(logs.text().contains("Failed to write to non-existent table"));
    assert!(!output.text().contains(SAMPLE_DEFINITION));
    assert_eq!(store.stats().mutate_calls, 1);
}

/// Scanning a missing table logs the failure and returns nothing.
#[tokio::test]
async fn test_missing_table_scan_is_logged() {
    let (_guard, logs) = capture_logs();
    let store = MemoryStore::shared();
    let (mut session, _output) = memory_session(&store).unwrap();

    assert!(session.scan_table().await.unwrap().is_none());
    assert!(logs.text().contains("Failed to read a non-existent table"));
}

/// Column reads keep only the requested family and qualifier, in row order.
#[tokio::test]
async fn test_read_cells_filters_by_family_and_qualifier() {
    let store = MemoryStore::shared();
    let (mut session, output) = memory_session(&store).unwrap();
    session.ensure_table_exists().await.unwrap();

    let data = store.data();
    let mutation = RowMutation::create(TABLE_ID, "rowKey7")
        .set_cell_at("dfdl", "name", 1_000, "v1")
        .set_cell_at("dfdl", "name", 3_000, "v3")
        .set_cell_at("dfdl", "name", 2_000, "v2")
        .set_cell_at("dfdl", "names", 4_000, "other qualifier")
        .set_cell_at("dfdl", "definition", 5_000, "other column");
    data.mutate_row(mutation).await.unwrap();

    let cells = session
        .read_cells_by_family_and_qualifier("rowKey7", "dfdl", "name")
        .await
        .unwrap()
        .unwrap();
    let values: Vec<String> = cells.iter().map(|c| c.value_utf8()).collect();
    assert_eq!(values, vec!["v3", "v2", "v1"]);
    assert!(cells.iter().all(|c| c.is_column("dfdl", b"name")));

    let text = output.text();
    assert!(text.contains("Row: rowKey7\nFamily: dfdl    Qualifier: name    Value: v3\n"));
    assert!(!text.contains("other qualifier"));
}

/// A scan returns every row, each with all of its cells.
#[tokio::test]
async fn test_scan_returns_every_row() {
    let store = MemoryStore::shared();
    let (mut session, output) = memory_session(&store).unwrap();
    session.ensure_table_exists().await.unwrap();
    session.write_row().await.unwrap();

    let data = store.data();
    for i in [5, 1, 3, 5] {
        let key = format!("rowKey{i}");
        data.mutate_row(
            RowMutation::create(TABLE_ID, key.clone()).set_cell_at("dfdl", "name", i * 1000, key),
        )
        .await
        .unwrap();
    }

    let rows = session.scan_table().await.unwrap().unwrap();
    let keys: Vec<String> = rows.iter().map(|r| r.key_utf8()).collect();
    // rowKey5 was written twice; distinct keys only.
    assert_eq!(keys, vec!["rowKey1", "rowKey2", "rowKey3", "rowKey5"]);
    assert_eq!(rows[1].cells.len(), 2);
    assert_eq!(store.row_count(TABLE_ID), Some(rows.len()));

    let printed: Vec<String> = output
        .lines()
        .into_iter()
        .filter(|l| l.starts_with("Row Key: "))
        .collect();
    assert_eq!(printed.len(), 4);
}

/// The write-then-read scenario the initializer performs.
#[tokio::test]
async fn test_write_then_read_name_column() {
    let store = MemoryStore::shared();
    let (mut session, _output) = memory_session(&store).unwrap();
    session.ensure_table_exists().await.unwrap();
    session.write_row().await.unwrap();

    let cells = session
        .read_cells_by_family_and_qualifier("rowKey2", "dfdl", "name")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cells.len(), 1);
    assert_eq!(cells[0].value, Bytes::from_static(b"binary-example"));
}

/// A full run prints every step in order and releases both handles.
#[tokio::test]
async fn test_full_run() {
    let store = MemoryStore::shared();
    let (session, output) = memory_session(&store).unwrap();
    session.run().await.unwrap();

    let lines = output.lines();
    let expected_prefix = [
        "Creating table: dfdl-schemas",
        "Table dfdl-schemas created successfully",
        "",
        "Writing a definition to the table",
    ];
    assert_eq!(&lines[..4], &expected_prefix);
    assert!(lines.contains(&"Row rowKey3 not found".to_string()));
    assert!(lines.contains(&"Family: dfdl    Qualifier: name    Value: binary-example".to_string()));
    assert_eq!(lines.iter().filter(|l| l.starts_with("Row Key: ")).count(), 1);

    assert_eq!(store.stats().closed_handles, 2);
    assert_eq!(store.row_count(TABLE_ID), Some(1));
}

/// Running twice against the same store reuses the table.
#[tokio::test]
async fn test_second_run_reuses_table() {
    let store = MemoryStore::shared();
    let (first, _) = memory_session(&store).unwrap();
    first.run().await.unwrap();

    let (second, output) = memory_session(&store).unwrap();
    second.run().await.unwrap();

    assert_eq!(store.stats().create_calls, 1);
    assert!(!output.text().contains("Creating table"));
    assert_eq!(store.row_count(TABLE_ID), Some(1));
}

/// Sessions on different tables do not see each other's rows.
#[tokio::test]
async fn test_tables_are_isolated() {
    let store = MemoryStore::shared();
    let (a, _) = memory_session_for(&store, "schemas-a").unwrap();
    a.run().await.unwrap();

    let (mut b, _) = memory_session_for(&store, "schemas-b").unwrap();
    b.ensure_table_exists().await.unwrap();
    assert_eq!(b.scan_table().await.unwrap().unwrap().len(), 0);
    assert_eq!(store.table_ids(), vec!["schemas-a", "schemas-b"]);
}

/// Handles fail after close.
#[tokio::test]
async fn test_closed_handles_reject_calls() {
    let store = MemoryStore::shared();
    let admin = store.admin();
    let data = store.data();
    admin.close().await;
    data.close().await;

    assert!(matches!(admin.exists(TABLE_ID).await, Err(ClientError::Closed)));
    let mut rows = data.read_rows(Query::create(TABLE_ID));
    assert!(matches!(rows.next().await, Some(Err(ClientError::Closed))));
    assert!(rows.next().await.is_none());
}
