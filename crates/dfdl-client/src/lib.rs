//! # dfdl-client
//!
//! Client library for storing DFDL schema definitions in Cloud Bigtable.
//!
//! This crate provides:
//!
//! - **Configuration**: project, instance, endpoints, emulator and credentials
//! - **Backends**: a gRPC backend for Bigtable and an in-memory store, both
//!   behind the `TableAdmin` / `DataClient` traits
//! - **Table Session**: creates the table, writes the sample definition and
//!   reads it back
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dfdl_client::{ClientConfig, TableSession};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("my-project", "my-instance")
//!         .emulator_host("localhost:8086");
//!
//!     let session = TableSession::connect(&config, "dfdl-schemas").await?;
//!     session.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Without a Bigtable instance
//!
//! ```rust,ignore
//! use dfdl_client::{MemoryStore, TableSession};
//!
//! let store = MemoryStore::shared();
//! let mut session = TableSession::in_memory(&store, "dfdl-schemas")?;
//! session.ensure_table_exists().await?;
//! session.write_row().await?;
//! let cells = session
//!     .read_cells_by_family_and_qualifier("rowKey2", "dfdl", "name")
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Error types.
pub mod error;

/// Client configuration.
pub mod config;

/// Rows, cells, mutations and queries.
pub mod model;

/// Store backends.
pub mod backend;

/// The sample record.
pub mod sample;

/// Table session.
pub mod session;

// Re-exports
pub use backend::{DataClient, MemoryStore, RowStream, StoreStats, TableAdmin};
pub use config::{validate_table_id, ClientConfig};
pub use error::{ClientError, ClientResult, HandleState};
pub use model::{Cell, FamilySpec, Query, Row, RowMutation, RowRange, SetCell, TableSpec};
pub use session::TableSession;
