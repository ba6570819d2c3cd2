//! Messages and client for `google.bigtable.v2.Bigtable`.
//!
//! Only the row read and single-row mutation surface is declared.

/// Request message for `Bigtable.ReadRows`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadRowsRequest {
    /// `projects/{project}/instances/{instance}/tables/{table}`.
    #[prost(string, tag = "1")]
    pub table_name: ::prost::alloc::string::String,
    /// Rows to read. Absent means the whole table.
    #[prost(message, optional, tag = "2")]
    pub rows: ::core::option::Option<RowSet>,
    /// Maximum number of rows to return, zero for no limit.
    #[prost(int64, tag = "4")]
    pub rows_limit: i64,
    #[prost(string, tag = "5")]
    pub app_profile_id: ::prost::alloc::string::String,
}

/// Response message for `Bigtable.ReadRows`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadRowsResponse {
    #[prost(message, repeated, tag = "1")]
    pub chunks: ::prost::alloc::vec::Vec<read_rows_response::CellChunk>,
    /// Progress marker sent when the server skipped rows without returning
    /// them.
    #[prost(bytes = "bytes", tag = "2")]
    pub last_scanned_row_key: ::prost::bytes::Bytes,
}

/// Nested message and enum types in `ReadRowsResponse`.
pub mod read_rows_response {
    /// A piece of a row's contents.
    ///
    /// A row is streamed as a sequence of chunks terminated by a chunk with
    /// `commit_row` set. The row key is only present on the first chunk of a
    /// row; family and qualifier only when they change.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CellChunk {
        #[prost(bytes = "bytes", tag = "1")]
        pub row_key: ::prost::bytes::Bytes,
        #[prost(message, optional, tag = "2")]
        pub family_name: ::core::option::Option<::prost::alloc::string::String>,
        #[prost(message, optional, tag = "3")]
        pub qualifier: ::core::option::Option<::prost::alloc::vec::Vec<u8>>,
        #[prost(int64, tag = "4")]
        pub timestamp_micros: i64,
        #[prost(string, repeated, tag = "5")]
        pub labels: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
        #[prost(bytes = "bytes", tag = "6")]
        pub value: ::prost::bytes::Bytes,
        /// Non-zero when the value is split across chunks; holds the total
        /// size of the value.
        #[prost(int32, tag = "7")]
        pub value_size: i32,
        #[prost(oneof = "cell_chunk::RowStatus", tags = "8, 9")]
        pub row_status: ::core::option::Option<cell_chunk::RowStatus>,
    }

    /// Nested message and enum types in `CellChunk`.
    pub mod cell_chunk {
        #[derive(Clone, Copy, PartialEq, ::prost::Oneof)]
        pub enum RowStatus {
            /// Drop everything received for the current row.
            #[prost(bool, tag = "8")]
            ResetRow(bool),
            /// The current row is complete after this chunk.
            #[prost(bool, tag = "9")]
            CommitRow(bool),
        }
    }
}

/// A set of row keys and row ranges.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RowSet {
    #[prost(bytes = "bytes", repeated, tag = "1")]
    pub row_keys: ::prost::alloc::vec::Vec<::prost::bytes::Bytes>,
    #[prost(message, repeated, tag = "2")]
    pub row_ranges: ::prost::alloc::vec::Vec<RowRange>,
}

/// A contiguous range of rows. Missing bounds are unbounded.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RowRange {
    #[prost(oneof = "row_range::StartKey", tags = "1, 2")]
    pub start_key: ::core::option::Option<row_range::StartKey>,
    #[prost(oneof = "row_range::EndKey", tags = "3, 4")]
    pub end_key: ::core::option::Option<row_range::EndKey>,
}

/// Nested message and enum types in `RowRange`.
pub mod row_range {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum StartKey {
        #[prost(bytes = "bytes", tag = "1")]
        StartKeyClosed(::prost::bytes::Bytes),
        #[prost(bytes = "bytes", tag = "2")]
        StartKeyOpen(::prost::bytes::Bytes),
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum EndKey {
        #[prost(bytes = "bytes", tag = "3")]
        EndKeyOpen(::prost::bytes::Bytes),
        #[prost(bytes = "bytes", tag = "4")]
        EndKeyClosed(::prost::bytes::Bytes),
    }
}

/// Request message for `Bigtable.MutateRow`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MutateRowRequest {
    #[prost(string, tag = "1")]
    pub table_name: ::prost::alloc::string::String,
    #[prost(bytes = "bytes", tag = "2")]
    pub row_key: ::prost::bytes::Bytes,
    /// Applied atomically, in order.
    #[prost(message, repeated, tag = "3")]
    pub mutations: ::prost::alloc::vec::Vec<Mutation>,
    #[prost(string, tag = "4")]
    pub app_profile_id: ::prost::alloc::string::String,
}

/// Response message for `Bigtable.MutateRow`.
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct MutateRowResponse {}

/// A change to a single row.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Mutation {
    #[prost(oneof = "mutation::Mutation", tags = "1")]
    pub mutation: ::core::option::Option<mutation::Mutation>,
}

/// Nested message and enum types in `Mutation`.
pub mod mutation {
    /// Writes a value into a cell.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct SetCell {
        #[prost(string, tag = "1")]
        pub family_name: ::prost::alloc::string::String,
        #[prost(bytes = "bytes", tag = "2")]
        pub column_qualifier: ::prost::bytes::Bytes,
        /// Microseconds since the epoch; `-1` asks the server to assign it.
        #[prost(int64, tag = "3")]
        pub timestamp_micros: i64,
        #[prost(bytes = "bytes", tag = "4")]
        pub value: ::prost::bytes::Bytes,
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Mutation {
        #[prost(message, tag = "1")]
        SetCell(SetCell),
    }
}

/// Generated-style client implementation.
pub mod bigtable_client {
    #![allow(
        unused_variables,
        dead_code,
        missing_docs,
        clippy::wildcard_imports,
        clippy::let_unit_value
    )]
    use tonic::codegen::http::Uri;
    use tonic::codegen::*;

    /// Service for reading from and writing to existing Bigtable tables.
    #[derive(Debug, Clone)]
    pub struct BigtableClient<T> {
        inner: tonic::client::Grpc<T>,
    }

    impl BigtableClient<tonic::transport::Channel> {
        /// Attempt to create a new client by connecting to a given endpoint.
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }

    impl<T> BigtableClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + std::marker::Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + std::marker::Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }

        pub fn with_origin(inner: T, origin: Uri) -> Self {
            let inner = tonic::client::Grpc::with_origin(inner, origin);
            Self { inner }
        }

        pub fn with_interceptor<F>(
            inner: T,
            interceptor: F,
        ) -> BigtableClient<InterceptedService<T, F>>
        where
            F: tonic::service::Interceptor,
            T::ResponseBody: Default,
            T: tonic::codegen::Service<
                http::Request<tonic::body::BoxBody>,
                Response = http::Response<
                    <T as tonic::client::GrpcService<tonic::body::BoxBody>>::ResponseBody,
                >,
            >,
            <T as tonic::codegen::Service<http::Request<tonic::body::BoxBody>>>::Error:
                Into<StdError> + std::marker::Send + std::marker::Sync,
        {
            BigtableClient::new(InterceptedService::new(inner, interceptor))
        }

        /// Limits the maximum size of a decoded message.
        ///
        /// Default: `4MB`
        #[must_use]
        pub fn max_decoding_message_size(mut self, limit: usize) -> Self {
            self.inner = self.inner.max_decoding_message_size(limit);
            self
        }

        /// Streams back the contents of all requested rows in key order.
        pub async fn read_rows(
            &mut self,
            request: impl tonic::IntoRequest<super::ReadRowsRequest>,
        ) -> std::result::Result<
            tonic::Response<tonic::codec::Streaming<super::ReadRowsResponse>>,
            tonic::Status,
        > {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/google.bigtable.v2.Bigtable/ReadRows");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("google.bigtable.v2.Bigtable", "ReadRows"));
            self.inner.server_streaming(req, path, codec).await
        }

        /// Mutates a row atomically.
        pub async fn mutate_row(
            &mut self,
            request: impl tonic::IntoRequest<super::MutateRowRequest>,
        ) -> std::result::Result<tonic::Response<super::MutateRowResponse>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path =
                http::uri::PathAndQuery::from_static("/google.bigtable.v2.Bigtable/MutateRow");
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("google.bigtable.v2.Bigtable", "MutateRow"));
            self.inner.unary(req, path, codec).await
        }
    }
}
