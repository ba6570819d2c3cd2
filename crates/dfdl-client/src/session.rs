//! The table session: create a table, write the sample row, read it back.
//!
//! A `TableSession` owns one admin handle, one data handle and an output
//! sink. Results are written to the sink (stdout unless replaced with
//! [`TableSession::with_output`]); not-found failures are reported through
//! `tracing` and turned into absent results.

use std::io::{self, Write};
use std::sync::Arc;

use bytes::Bytes;
use futures_util::StreamExt;
use tracing::{debug, error, info, warn};

use crate::backend::{self, DataClient, MemoryStore, TableAdmin};
use crate::config::{validate_table_id, ClientConfig};
use crate::error::{ClientError, ClientResult};
use crate::model::{Cell, Query, Row};
use crate::sample::{self, COLUMN_FAMILY, QUALIFIER_NAME, READ_ROW_INDEX, WRITE_ROW_INDEX};

/// A session on one table.
pub struct TableSession {
    table_id: String,
    admin: Box<dyn TableAdmin>,
    data: Box<dyn DataClient>,
    out: Box<dyn Write + Send>,
}

impl std::fmt::Debug for TableSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableSession")
            .field("table_id", &self.table_id)
            .field("admin", &self.admin.state())
            .field("data", &self.data.state())
            .finish()
    }
}

impl TableSession {
    /// Creates a session from existing handles.
    pub fn new(
        table_id: impl Into<String>,
        admin: Box<dyn TableAdmin>,
        data: Box<dyn DataClient>,
    ) -> ClientResult<Self> {
        let table_id = table_id.into();
        validate_table_id(&table_id)?;
        Ok(Self {
            table_id,
            admin,
            data,
            out: Box::new(io::stdout()),
        })
    }

    /// Connects both handles to Bigtable (or the emulator).
    pub async fn connect(config: &ClientConfig, table_id: impl Into<String>) -> ClientResult<Self> {
        let table_id = table_id.into();
        validate_table_id(&table_id)?;
        let (admin, data) = backend::connect(config).await?;
        info!(table = %config.table_name(&table_id), "session opened");
        Self::new(table_id, Box::new(admin), Box::new(data))
    }

    /// Creates a session on an in-memory store.
    pub fn in_memory(store: &Arc<MemoryStore>, table_id: impl Into<String>) -> ClientResult<Self> {
        Self::new(table_id, Box::new(store.admin()), Box::new(store.data()))
    }

    /// Replaces the output sink.
    pub fn with_output(mut self, out: impl Write + Send + 'static) -> Self {
        self.out = Box::new(out);
        self
    }

    /// Returns the table id.
    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    /// Creates the table with the `dfdl` family unless it already exists.
    pub async fn ensure_table_exists(&mut self) -> ClientResult<()> {
        if self.admin.exists(&self.table_id).await? {
            debug!(table = %self.table_id, "table already exists");
            return Ok(());
        }

        writeln!(self.out, "Creating table: {}", self.table_id)?;
        self.admin
            .create_table(sample::table_spec(&self.table_id))
            .await?;
        writeln!(self.out, "Table {} created successfully", self.table_id)?;
        Ok(())
    }

    /// Writes the sample name and definition to `rowKey2`.
    ///
    /// A missing table is logged and ignored.
    pub async fn write_row(&mut self) -> ClientResult<()> {
        writeln!(self.out, "\nWriting a definition to the table")?;

        let mutation = sample::sample_mutation(&self.table_id);
        match self.data.mutate_row(mutation).await {
            Ok(()) => {
                writeln!(self.out, "{}", sample::SAMPLE_DEFINITION)?;
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                error!("Failed to write to non-existent table: {}", e.message());
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Reads one row by key and prints all of its cells.
    ///
    /// Returns `None` if the row or the table does not exist.
    pub async fn read_row_by_key(&mut self, key: impl AsRef<[u8]>) -> ClientResult<Option<Row>> {
        writeln!(self.out, "\nReading a single row by row key")?;

        let Some(row) = self.fetch_row(key.as_ref()).await? else {
            return Ok(None);
        };
        writeln!(self.out, "Row: {}", row.key_utf8())?;
        print_cells(&mut self.out, &row.cells)?;
        Ok(Some(row))
    }

    /// Reads one row and prints the cells at `family:qualifier`, in row order.
    ///
    /// Returns `None` if the row or the table does not exist. The returned
    /// list may be empty when the row has no such column.
    pub async fn read_cells_by_family_and_qualifier(
        &mut self,
        key: impl AsRef<[u8]>,
        family: &str,
        qualifier: impl AsRef<[u8]>,
    ) -> ClientResult<Option<Vec<Cell>>> {
        writeln!(self.out, "\nReading specific cells by family and qualifier")?;

        let Some(row) = self.fetch_row(key.as_ref()).await? else {
            return Ok(None);
        };
        writeln!(self.out, "Row: {}", row.key_utf8())?;
        let cells = row.cells_for(family, qualifier.as_ref());
        print_cells(&mut self.out, &cells)?;
        Ok(Some(cells))
    }

    /// Scans the whole table in key order, printing every row.
    ///
    /// Returns `None` if the table does not exist.
    pub async fn scan_table(&mut self) -> ClientResult<Option<Vec<Row>>> {
        writeln!(self.out, "\nReading the entire table")?;

        let mut rows = Vec::new();
        let mut stream = self.data.read_rows(Query::create(self.table_id.as_str()));
        while let Some(item) = stream.next().await {
            let row = match item {
                Ok(row) => row,
                Err(e) if e.is_not_found() => {
                    error!("Failed to read a non-existent table: {}", e.message());
                    return Ok(None);
                }
                Err(e) => return Err(e),
            };
            writeln!(self.out, "Row Key: {}", row.key_utf8())?;
            print_cells(&mut self.out, &row.cells)?;
            rows.push(row);
        }
        debug!(table = %self.table_id, rows = rows.len(), "scan finished");
        Ok(Some(rows))
    }

    /// Releases both handles.
    pub async fn close(mut self) {
        self.data.close().await;
        self.admin.close().await;
        if let Err(e) = self.out.flush() {
            warn!("failed to flush output: {e}");
        }
        debug!(table = %self.table_id, "session closed");
    }

    /// Runs the full sequence, then closes the session.
    ///
    /// The handles are released even when a step fails; the first error is
    /// returned afterwards.
    pub async fn run(mut self) -> ClientResult<()> {
        let result = self.run_steps().await;
        if let Err(e) = &result {
            debug!("session step failed: {e}");
        }
        self.close().await;
        result
    }

    async fn run_steps(&mut self) -> ClientResult<()> {
        self.ensure_table_exists().await?;
        self.write_row().await?;
        self.read_row_by_key(sample::row_key(READ_ROW_INDEX)).await?;
        self.read_cells_by_family_and_qualifier(
            sample::row_key(WRITE_ROW_INDEX),
            COLUMN_FAMILY,
            QUALIFIER_NAME,
        )
        .await?;
        self.scan_table().await?;
        Ok(())
    }

    /// Reads a row, mapping a missing table to `None`.
    async fn fetch_row(&mut self, key: &[u8]) -> ClientResult<Option<Row>> {
        let key = Bytes::copy_from_slice(key);
        match self.data.read_row(&self.table_id, key.clone()).await {
            Ok(Some(row)) => Ok(Some(row)),
            Ok(None) => {
                writeln!(self.out, "Row {} not found", String::from_utf8_lossy(&key))?;
                Ok(None)
            }
            Err(e) if e.is_not_found() => {
                error!("Failed to read from a non-existent table: {}", e.message());
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

fn print_cells(out: &mut dyn Write, cells: &[Cell]) -> Result<(), ClientError> {
    for cell in cells {
        writeln!(out, "{cell}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::model::RowMutation;
    use crate::sample::{QUALIFIER_DEFINITION, SAMPLE_DEFINITION, SAMPLE_NAME};

    /// Output sink readable after the session is gone.
    #[derive(Clone, Default)]
    struct Output(Arc<Mutex<Vec<u8>>>);

    impl Output {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl Write for Output {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn session(store: &Arc<MemoryStore>) -> (TableSession, Output) {
        let output = Output::default();
        let session = TableSession::in_memory(store, "dfdl-schemas")
            .unwrap()
            .with_output(output.clone());
        (session, output)
    }

    #[test]
    fn test_rejects_invalid_table_id() {
        let store = MemoryStore::shared();
        assert!(matches!(
            TableSession::in_memory(&store, ""),
            Err(ClientError::InvalidConfig(_))
        ));
        assert!(TableSession::in_memory(&store, "bad id").is_err());
    }

    #[tokio::test]
    async fn test_ensure_table_exists_creates_once() {
        let store = MemoryStore::shared();
        let (mut session, output) = session(&store);

        session.ensure_table_exists().await.unwrap();
        session.ensure_table_exists().await.unwrap();

        let stats = store.stats();
        assert_eq!(stats.exists_calls, 2);
        assert_eq!(stats.create_calls, 1);
        assert_eq!(store.table_ids(), vec!["dfdl-schemas".to_string()]);
        assert_eq!(
            output.text(),
            "Creating table: dfdl-schemas\nTable dfdl-schemas created successfully\n"
        );
    }

    #[tokio::test]
    async fn test_write_row_then_read_back() {
        let store = MemoryStore::shared();
        let (mut session, output) = session(&store);
        session.ensure_table_exists().await.unwrap();
        session.write_row().await.unwrap();

        assert!(output.text().contains(SAMPLE_DEFINITION));

        let row = session.read_row_by_key("rowKey2").await.unwrap().unwrap();
        assert_eq!(&row.key[..], b"rowKey2");
        assert_eq!(row.cells.len(), 2);
        assert_eq!(
            row.latest(COLUMN_FAMILY, QUALIFIER_NAME.as_bytes()).unwrap().value,
            Bytes::from_static(SAMPLE_NAME.as_bytes())
        );
        assert_eq!(
            row.latest(COLUMN_FAMILY, QUALIFIER_DEFINITION.as_bytes())
                .unwrap()
                .value,
            Bytes::from_static(SAMPLE_DEFINITION.as_bytes())
        );
        assert!(output
            .text()
            .contains("Row: rowKey2\nFamily: dfdl    Qualifier: definition    Value: <?xml"));
    }

    #[tokio::test]
    async fn test_missing_row_is_none() {
        let store = MemoryStore::shared();
        let (mut session, output) = session(&store);
        session.ensure_table_exists().await.unwrap();

        assert!(session.read_row_by_key("rowKey3").await.unwrap().is_none());
        assert!(session
            .read_cells_by_family_and_qualifier("rowKey3", "dfdl", "name")
            .await
            .unwrap()
            .is_none());
        assert!(output.text().contains("Row rowKey3 not found"));
    }

    #[tokio::test]
    async fn test_missing_table_is_swallowed() {
        let store = MemoryStore::shared();
        let (mut session, output) = session(&store);

        session.write_row().await.unwrap();
        assert!(session.read_row_by_key("rowKey2").await.unwrap().is_none());
        assert!(session
            .read_cells_by_family_and_qualifier("rowKey2", "dfdl", "name")
            .await
            .unwrap()
            .is_none());
        assert!(session.scan_table().await.unwrap().is_none());

        // Nothing was written and no definition was echoed.
        assert!(store.table_ids().is_empty());
        assert!(!output.text().contains("<xs:schema"));
    }

    #[tokio::test]
    async fn test_read_cells_filters_column() {
        let store = MemoryStore::shared();
        let (mut session, _output) = session(&store);
        session.ensure_table_exists().await.unwrap();
        session.write_row().await.unwrap();

        let cells = session
            .read_cells_by_family_and_qualifier("rowKey2", "dfdl", "name")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].value_utf8(), SAMPLE_NAME);

        let cells = session
            .read_cells_by_family_and_qualifier("rowKey2", "dfdl", "missing")
            .await
            .unwrap()
            .unwrap();
        assert!(cells.is_empty());
    }

    #[tokio::test]
    async fn test_scan_returns_rows_in_key_order() {
        let store = MemoryStore::shared();
        let (mut session, output) = session(&store);
        session.ensure_table_exists().await.unwrap();

        let data = store.data();
        for key in ["rowKey9", "rowKey1", "rowKey5"] {
            data.mutate_row(RowMutation::create("dfdl-schemas", key).set_cell("dfdl", "name", key))
                .await
                .unwrap();
        }

        let rows = session.scan_table().await.unwrap().unwrap();
        let keys: Vec<String> = rows.iter().map(Row::key_utf8).collect();
        assert_eq!(keys, vec!["rowKey1", "rowKey5", "rowKey9"]);
        assert!(output
            .text()
            .contains("Row Key: rowKey1\nFamily: dfdl    Qualifier: name    Value: rowKey1\n"));
    }

    #[tokio::test]
    async fn test_close_releases_both_handles() {
        let store = MemoryStore::shared();
        let (session, _output) = session(&store);
        session.close().await;
        assert_eq!(store.stats().closed_handles, 2);
    }

    #[tokio::test]
    async fn test_run_closes_after_failure() {
        let store = MemoryStore::shared();
        let admin = store.admin();
        admin.close().await;
        let data = store.data();

        let session = TableSession::new("dfdl-schemas", Box::new(admin), Box::new(data))
            .unwrap()
            .with_output(Output::default());
        assert!(format!("{session:?}").contains("Closed"));

        let err = session.run().await.unwrap_err();
        assert!(matches!(err, ClientError::Closed));
        // The admin handle was closed up front; run released the data handle.
        assert_eq!(store.stats().closed_handles, 2);
        assert_eq!(store.stats().mutate_calls, 0);
    }

    #[tokio::test]
    async fn test_run_full_sequence() {
        let store = MemoryStore::shared();
        let (session, output) = session(&store);
        session.run().await.unwrap();

        let text = output.text();
        let creating = text.find("Creating table: dfdl-schemas").unwrap();
        let writing = text.find("Writing a definition").unwrap();
        let single = text.find("Reading a single row by row key").unwrap();
        let cells = text.find("Reading specific cells").unwrap();
        let scan = text.find("Reading the entire table").unwrap();
        assert!(creating < writing && writing < single && single < cells && cells < scan);

        assert!(text.contains("Row rowKey3 not found"));
        assert!(text.contains("Row Key: rowKey2"));
        assert_eq!(store.row_count("dfdl-schemas"), Some(1));
        assert_eq!(store.stats().closed_handles, 2);
    }
}
