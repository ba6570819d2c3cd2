//! Bigtable gRPC Protocol Definitions
//!
//! This crate provides the protobuf messages and gRPC clients for the parts
//! of the Cloud Bigtable API that dfdl-store talks to.
//!
//! # Overview
//!
//! Two services are covered:
//! - `google.bigtable.v2.Bigtable`: `MutateRow` and the server-streaming
//!   `ReadRows`
//! - `google.bigtable.admin.v2.BigtableTableAdmin`: `GetTable` and
//!   `CreateTable`
//!
//! Messages are declared with `prost` derives and carry the upstream field
//! tags, so they interoperate with the managed service and the emulator.
//! Fields the client never sends or reads are left out; protobuf decoding
//! skips unknown fields.
//!
//! # Example
//!
//! ```ignore
//! use dfdl_proto::v2::bigtable_client::BigtableClient;
//! use dfdl_proto::v2::ReadRowsRequest;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = BigtableClient::connect("http://localhost:8086").await?;
//!
//!     let request = ReadRowsRequest {
//!         table_name: "projects/p/instances/i/tables/t".to_string(),
//!         ..Default::default()
//!     };
//!
//!     let mut stream = client.read_rows(request).await?.into_inner();
//!     while let Some(response) = stream.message().await? {
//!         println!("{} chunks", response.chunks.len());
//!     }
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

/// `google.bigtable.v2` data API messages and client.
#[allow(missing_docs)]
#[allow(clippy::derive_partial_eq_without_eq)]
pub mod v2;

/// `google.bigtable.admin.v2` table admin messages and client.
#[allow(missing_docs)]
#[allow(clippy::derive_partial_eq_without_eq)]
pub mod admin;

// Re-export the client types
pub use admin::bigtable_table_admin_client::BigtableTableAdminClient;
pub use v2::bigtable_client::BigtableClient;
