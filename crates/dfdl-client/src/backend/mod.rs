//! Store backends.
//!
//! The session never talks to a concrete client. It holds two handles
//! behind these traits:
//!
//! - `TableAdmin`: table lifecycle (existence check, creation)
//! - `DataClient`: row mutation, single-row reads and row scans
//!
//! Two implementations are provided:
//!
//! - `GrpcAdmin` / `GrpcData`: Cloud Bigtable (or its emulator) over gRPC
//! - `MemoryAdmin` / `MemoryData`: an in-process store for tests and dry runs
//!
//! # Usage
//!
//! ```ignore
//! use dfdl_client::backend::{DataClient, MemoryStore, TableAdmin};
//! use dfdl_client::{Query, RowMutation, TableSpec};
//!
//! let store = MemoryStore::shared();
//! let (admin, data) = (store.admin(), store.data());
//!
//! admin.create_table(TableSpec::of("t").add_family("cf")).await?;
//! data.mutate_row(RowMutation::create("t", "k").set_cell("cf", "q", "v")).await?;
//!
//! let mut rows = data.read_rows(Query::create("t"));
//! while let Some(row) = rows.next().await {
//!     println!("{}", row?.key_utf8());
//! }
//! ```

mod grpc;
mod memory;

pub use grpc::{
    connect, AuthInterceptor, GrpcAdmin, GrpcData, RowMerger, TokenSource, BIGTABLE_SCOPES,
};
pub use memory::{MemoryAdmin, MemoryData, MemoryStore, StoreStats};

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_core::Stream;
use futures_util::StreamExt;

use crate::error::{ClientResult, HandleState};
use crate::model::{Query, Row, RowMutation, TableSpec};

/// A boxed future borrowing from a handle.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A lazy, finite sequence of rows in key order.
///
/// Not-found and transport failures are yielded as items. The stream ends
/// after the first error.
pub type RowStream<'a> = Pin<Box<dyn Stream<Item = ClientResult<Row>> + Send + 'a>>;

/// Administrative handle: table lifecycle.
pub trait TableAdmin: Send + Sync {
    /// Returns true if the table exists.
    fn exists<'a>(&'a self, table_id: &'a str) -> BoxFuture<'a, ClientResult<bool>>;

    /// Creates a table with the given column families.
    ///
    /// Fails with `AlreadyExists` if the table is already there.
    fn create_table(&self, spec: TableSpec) -> BoxFuture<'_, ClientResult<()>>;

    /// Releases the handle.
    fn close(&self) -> BoxFuture<'_, ()>;

    /// Returns whether the handle is still usable.
    fn state(&self) -> HandleState;
}

/// Data handle: row mutation and reads.
pub trait DataClient: Send + Sync {
    /// Applies a single-row mutation atomically.
    ///
    /// Fails with `NotFound` if the table or a column family is missing.
    fn mutate_row(&self, mutation: RowMutation) -> BoxFuture<'_, ClientResult<()>>;

    /// Streams the rows selected by `query`.
    fn read_rows(&self, query: Query) -> RowStream<'_>;

    /// Reads one row by exact key. `Ok(None)` if the row has no cells.
    fn read_row<'a>(
        &'a self,
        table_id: &'a str,
        key: Bytes,
    ) -> BoxFuture<'a, ClientResult<Option<Row>>> {
        Box::pin(async move {
            let mut rows = self.read_rows(Query::create(table_id).row_key(key).limit(1));
            rows.next().await.transpose()
        })
    }

    /// Releases the handle.
    fn close(&self) -> BoxFuture<'_, ()>;

    /// Returns whether the handle is still usable.
    fn state(&self) -> HandleState;
}
