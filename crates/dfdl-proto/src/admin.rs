//! Messages and client for `google.bigtable.admin.v2.BigtableTableAdmin`.

/// Request message for `BigtableTableAdmin.GetTable`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetTableRequest {
    /// `projects/{project}/instances/{instance}/tables/{table}`.
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(enumeration = "table::View", tag = "2")]
    pub view: i32,
}

/// Request message for `BigtableTableAdmin.CreateTable`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateTableRequest {
    /// `projects/{project}/instances/{instance}`.
    #[prost(string, tag = "1")]
    pub parent: ::prost::alloc::string::String,
    /// Table name relative to `parent`.
    #[prost(string, tag = "2")]
    pub table_id: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "3")]
    pub table: ::core::option::Option<Table>,
}

/// A collection of rows and the column families they are grouped into.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Table {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(map = "string, message", tag = "3")]
    pub column_families:
        ::std::collections::HashMap<::prost::alloc::string::String, ColumnFamily>,
    #[prost(enumeration = "table::TimestampGranularity", tag = "4")]
    pub granularity: i32,
}

/// Nested message and enum types in `Table`.
pub mod table {
    /// How much of a table's metadata `GetTable` returns.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum View {
        Unspecified = 0,
        NameOnly = 1,
        SchemaView = 2,
        ReplicationView = 3,
        EncryptionView = 5,
        Full = 4,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum TimestampGranularity {
        Unspecified = 0,
        Millis = 1,
    }
}

/// A set of columns sharing a garbage collection policy.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ColumnFamily {
    /// Absent means cells are never collected.
    #[prost(message, optional, tag = "1")]
    pub gc_rule: ::core::option::Option<GcRule>,
}

/// Rule for deciding which cells of a column family to delete.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GcRule {
    #[prost(oneof = "gc_rule::Rule", tags = "1")]
    pub rule: ::core::option::Option<gc_rule::Rule>,
}

/// Nested message and enum types in `GcRule`.
pub mod gc_rule {
    #[derive(Clone, Copy, PartialEq, ::prost::Oneof)]
    pub enum Rule {
        /// Keep only the most recent N versions of every cell.
        #[prost(int32, tag = "1")]
        MaxNumVersions(i32),
    }
}

/// Generated-style client implementation.
pub mod bigtable_table_admin_client {
    #![allow(
        unused_variables,
        dead_code,
        missing_docs,
        clippy::wildcard_imports,
        clippy::let_unit_value
    )]
    use tonic::codegen::http::Uri;
    use tonic::codegen::*;

    /// Service for creating and inspecting Bigtable tables.
    #[derive(Debug, Clone)]
    pub struct BigtableTableAdminClient<T> {
        inner: tonic::client::Grpc<T>,
    }

    impl BigtableTableAdminClient<tonic::transport::Channel> {
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

    impl<T> BigtableTableAdminClient<T>
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
        ) -> BigtableTableAdminClient<InterceptedService<T, F>>
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
            BigtableTableAdminClient::new(InterceptedService::new(inner, interceptor))
        }

        /// Creates a new table with the column families in `request.table`.
        pub async fn create_table(
            &mut self,
            request: impl tonic::IntoRequest<super::CreateTableRequest>,
        ) -> std::result::Result<tonic::Response<super::Table>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/google.bigtable.admin.v2.BigtableTableAdmin/CreateTable",
            );
            let mut req = request.into_request();
            req.extensions_mut().insert(GrpcMethod::new(
                "google.bigtable.admin.v2.BigtableTableAdmin",
                "CreateTable",
            ));
            self.inner.unary(req, path, codec).await
        }

        /// Gets metadata about a table. Fails with `NOT_FOUND` for unknown
        /// tables.
        pub async fn get_table(
            &mut self,
            request: impl tonic::IntoRequest<super::GetTableRequest>,
        ) -> std::result::Result<tonic::Response<super::Table>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/google.bigtable.admin.v2.BigtableTableAdmin/GetTable",
            );
            let mut req = request.into_request();
            req.extensions_mut().insert(GrpcMethod::new(
                "google.bigtable.admin.v2.BigtableTableAdmin",
                "GetTable",
            ));
            self.inner.unary(req, path, codec).await
        }
    }
}
