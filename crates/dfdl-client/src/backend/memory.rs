//! In-memory store for testing.
//!
//! Tables live in a shared `MemoryStore`; the admin and data handles it
//! hands out implement the same traits as the gRPC backend, so a session
//! can run without a Bigtable instance. Failure behaviour follows the
//! service: unknown tables and families are `NotFound`, duplicate tables
//! are `AlreadyExists`.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::config::validate_table_id;
use crate::error::{ClientError, ClientResult, HandleState};
use crate::model::{client_timestamp_micros, Cell, Query, Row, RowMutation, TableSpec};

use super::{BoxFuture, DataClient, RowStream, TableAdmin};

/// Call counters, for asserting on how a session used the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// `exists` calls.
    pub exists_calls: u64,
    /// `create_table` calls, including failed ones.
    pub create_calls: u64,
    /// `mutate_row` calls, including failed ones.
    pub mutate_calls: u64,
    /// `read_rows` calls (single-row reads included).
    pub read_calls: u64,
    /// Handles released with `close`.
    pub closed_handles: u64,
}

/// One table: declared families and rows in key order.
#[derive(Debug, Default)]
struct MemTable {
    /// Family name to max versions kept.
    families: BTreeMap<String, Option<u32>>,
    rows: BTreeMap<Bytes, Vec<Cell>>,
}

impl MemTable {
    fn apply(&mut self, mutation: RowMutation) -> ClientResult<()> {
        // Validate every family first so a failed mutation changes nothing.
        for cell in &mutation.cells {
            if !self.families.contains_key(&cell.family) {
                return Err(ClientError::NotFound(format!(
                    "column family \"{}\" not found",
                    cell.family
                )));
            }
        }

        let now = client_timestamp_micros();
        let cells = self.rows.entry(mutation.row_key).or_default();
        for set in mutation.cells {
            let cell = Cell {
                family: set.family,
                qualifier: set.qualifier,
                timestamp_micros: set.timestamp_micros.unwrap_or(now),
                labels: Vec::new(),
                value: set.value,
            };
            let position = cells.binary_search_by_key(&cell_order(&cell), cell_order);
            match position {
                Ok(idx) => cells[idx] = cell,
                Err(idx) => cells.insert(idx, cell),
            }
        }

        for (family, max_versions) in &self.families {
            if let Some(max) = max_versions {
                retain_versions(cells, family, *max as usize);
            }
        }
        Ok(())
    }
}

/// Family, then qualifier, then newest version first.
fn cell_order(cell: &Cell) -> (String, Bytes, Reverse<i64>) {
    (
        cell.family.clone(),
        cell.qualifier.clone(),
        Reverse(cell.timestamp_micros),
    )
}

/// Drops versions beyond `max` in each column of `family`.
fn retain_versions(cells: &mut Vec<Cell>, family: &str, max: usize) {
    let mut kept: Vec<Cell> = Vec::with_capacity(cells.len());
    let mut run = 0;
    for cell in cells.drain(..) {
        let same_column = kept
            .last()
            .is_some_and(|prev| prev.family == cell.family && prev.qualifier == cell.qualifier);
        run = if same_column { run + 1 } else { 1 };
        if cell.family != family || run <= max {
            kept.push(cell);
        }
    }
    *cells = kept;
}

/// A shared in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<BTreeMap<String, MemTable>>,
    stats: Mutex<StoreStats>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store wrapped in Arc.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Creates an admin handle backed by this store.
    pub fn admin(self: &Arc<Self>) -> MemoryAdmin {
        MemoryAdmin {
            store: Arc::clone(self),
            closed: AtomicBool::new(false),
        }
    }

    /// Creates a data handle backed by this store.
    pub fn data(self: &Arc<Self>) -> MemoryData {
        MemoryData {
            store: Arc::clone(self),
            closed: AtomicBool::new(false),
        }
    }

    /// Returns a snapshot of the call counters.
    pub fn stats(&self) -> StoreStats {
        self.stats.lock().clone()
    }

    /// Returns the ids of all tables.
    pub fn table_ids(&self) -> Vec<String> {
        self.tables.read().keys().cloned().collect()
    }

    /// Returns the number of rows in a table, or `None` if it is missing.
    pub fn row_count(&self, table_id: &str) -> Option<usize> {
        self.tables.read().get(table_id).map(|t| t.rows.len())
    }

    fn exists(&self, table_id: &str) -> bool {
        self.stats.lock().exists_calls += 1;
        self.tables.read().contains_key(table_id)
    }

    fn create_table(&self, spec: TableSpec) -> ClientResult<()> {
        self.stats.lock().create_calls += 1;
        validate_table_id(&spec.table_id)
            .map_err(|e| ClientError::InvalidArgument(e.message()))?;

        let mut tables = self.tables.write();
        if tables.contains_key(&spec.table_id) {
            return Err(ClientError::AlreadyExists(format!(
                "table \"{}\" already exists",
                spec.table_id
            )));
        }
        let table = MemTable {
            families: spec
                .families
                .into_iter()
                .map(|f| (f.name, f.max_versions))
                .collect(),
            rows: BTreeMap::new(),
        };
        debug!(table = %spec.table_id, families = table.families.len(), "created table");
        tables.insert(spec.table_id, table);
        Ok(())
    }

    fn mutate_row(&self, mutation: RowMutation) -> ClientResult<()> {
        self.stats.lock().mutate_calls += 1;
        if mutation.is_empty() {
            return Err(ClientError::InvalidArgument(
                "no mutations provided".to_string(),
            ));
        }
        let mut tables = self.tables.write();
        let table = tables
            .get_mut(&mutation.table_id)
            .ok_or_else(|| table_not_found(&mutation.table_id))?;
        table.apply(mutation)
    }

    fn read_rows(&self, query: &Query) -> ClientResult<Vec<Row>> {
        self.stats.lock().read_calls += 1;
        let tables = self.tables.read();
        let table = tables
            .get(&query.table_id)
            .ok_or_else(|| table_not_found(&query.table_id))?;

        // Zero means no limit, as in ReadRowsRequest.rows_limit.
        let limit = query
            .limit
            .filter(|&l| l > 0)
            .map_or(usize::MAX, |l| l as usize);
        Ok(table
            .rows
            .iter()
            .filter(|(key, cells)| !cells.is_empty() && query.matches(key))
            .take(limit)
            .map(|(key, cells)| Row::new(key.clone(), cells.clone()))
            .collect())
    }

    fn record_close(&self) {
        self.stats.lock().closed_handles += 1;
    }
}

fn table_not_found(table_id: &str) -> ClientError {
    ClientError::NotFound(format!("table \"{table_id}\" not found"))
}

fn check_open(closed: &AtomicBool) -> ClientResult<()> {
    if closed.load(Ordering::Acquire) {
        Err(ClientError::Closed)
    } else {
        Ok(())
    }
}

fn state_of(closed: &AtomicBool) -> HandleState {
    if closed.load(Ordering::Acquire) {
        HandleState::Closed
    } else {
        HandleState::Open
    }
}

/// Admin handle on a [`MemoryStore`].
#[derive(Debug)]
pub struct MemoryAdmin {
    store: Arc<MemoryStore>,
    closed: AtomicBool,
}

impl TableAdmin for MemoryAdmin {
    fn exists<'a>(&'a self, table_id: &'a str) -> BoxFuture<'a, ClientResult<bool>> {
        Box::pin(async move {
            check_open(&self.closed)?;
            Ok(self.store.exists(table_id))
        })
    }

    fn create_table(&self, spec: TableSpec) -> BoxFuture<'_, ClientResult<()>> {
        Box::pin(async move {
            check_open(&self.closed)?;
            self.store.create_table(spec)
        })
    }

    fn close(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if !self.closed.swap(true, Ordering::AcqRel) {
                self.store.record_close();
            }
        })
    }

    fn state(&self) -> HandleState {
        state_of(&self.closed)
    }
}

/// Data handle on a [`MemoryStore`].
#[derive(Debug)]
pub struct MemoryData {
    store: Arc<MemoryStore>,
    closed: AtomicBool,
}

impl DataClient for MemoryData {
    fn mutate_row(&self, mutation: RowMutation) -> BoxFuture<'_, ClientResult<()>> {
        Box::pin(async move {
            check_open(&self.closed)?;
            self.store.mutate_row(mutation)
        })
    }

    fn read_rows(&self, query: Query) -> RowStream<'_> {
        // Rows are snapshotted at call time and then yielded one by one.
        let result = check_open(&self.closed).and_then(|()| self.store.read_rows(&query));
        match result {
            Ok(rows) => Box::pin(futures_util::stream::iter(
                rows.into_iter().map(Ok::<Row, ClientError>),
            )),
            Err(err) => Box::pin(futures_util::stream::once(async move {
                Err::<Row, ClientError>(err)
            })),
        }
    }

    fn close(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if !self.closed.swap(true, Ordering::AcqRel) {
                self.store.record_close();
            }
        })
    }

    fn state(&self) -> HandleState {
        state_of(&self.closed)
    }
}
