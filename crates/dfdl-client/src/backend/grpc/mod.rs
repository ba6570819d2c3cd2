//! Cloud Bigtable backend.
//!
//! Talks to the managed service (TLS, bearer token) or to a local emulator
//! (plaintext, no credentials) depending on [`ClientConfig`]. Without an
//! explicit token, credentials come from Application Default Credentials.

mod auth;
mod convert;
mod merger;

pub use auth::{AuthInterceptor, TokenSource, BIGTABLE_SCOPES};
pub use merger::RowMerger;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use tonic::codec::Streaming;
use tonic::service::interceptor::InterceptedService;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tracing::{debug, info};

use dfdl_proto::admin::table::View;
use dfdl_proto::admin::GetTableRequest;
use dfdl_proto::v2::{ReadRowsRequest, ReadRowsResponse};
use dfdl_proto::{BigtableClient, BigtableTableAdminClient};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult, HandleState};
use crate::model::{Query, Row, RowMutation, TableSpec};

use super::{BoxFuture, DataClient, RowStream, TableAdmin};
use auth::CredentialMode;

type AuthChannel = InterceptedService<Channel, AuthInterceptor>;

/// Opens the admin and data handles described by `config`.
pub async fn connect(config: &ClientConfig) -> ClientResult<(GrpcAdmin, GrpcData)> {
    config.validate()?;

    let interceptor = match auth::credential_mode(config) {
        CredentialMode::None => AuthInterceptor::none(),
        CredentialMode::Static(token) => AuthInterceptor::bearer(token)?,
        CredentialMode::ApplicationDefault => AuthInterceptor::application_default().await?,
    };

    let admin_channel = open_channel(&config.admin_uri(), config).await?;
    let data_channel = open_channel(&config.data_uri(), config).await?;
    info!(
        instance = %config.instance_name(),
        emulator = config.is_emulator(),
        authenticated = interceptor.has_credentials(),
        "connected to bigtable"
    );

    let admin = GrpcAdmin {
        client: BigtableTableAdminClient::with_interceptor(admin_channel, interceptor.clone()),
        auth: interceptor.clone(),
        config: config.clone(),
        closed: AtomicBool::new(false),
    };
    let data = GrpcData {
        client: BigtableClient::with_interceptor(data_channel, interceptor.clone())
            .max_decoding_message_size(config.max_decoding_message_size),
        auth: interceptor,
        config: config.clone(),
        closed: AtomicBool::new(false),
    };
    Ok((admin, data))
}

async fn open_channel(uri: &str, config: &ClientConfig) -> ClientResult<Channel> {
    let mut endpoint = Endpoint::from_shared(uri.to_string())
        .map_err(|e| ClientError::InvalidConfig(format!("invalid endpoint {uri}: {e}")))?
        .connect_timeout(config.connect_timeout)
        .user_agent(config.user_agent.clone())?;

    if uri.starts_with("https://") {
        let domain = endpoint.uri().host().unwrap_or_default().to_string();
        endpoint = endpoint.tls_config(
            ClientTlsConfig::new()
                .with_native_roots()
                .domain_name(domain),
        )?;
    }

    debug!(uri, "opening channel");
    Ok(endpoint.connect().await?)
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

/// Table admin handle.
pub struct GrpcAdmin {
    client: BigtableTableAdminClient<AuthChannel>,
    auth: AuthInterceptor,
    config: ClientConfig,
    closed: AtomicBool,
}

impl std::fmt::Debug for GrpcAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrpcAdmin")
            .field("endpoint", &self.config.admin_uri())
            .field("state", &self.state())
            .finish()
    }
}

impl TableAdmin for GrpcAdmin {
    fn exists<'a>(&'a self, table_id: &'a str) -> BoxFuture<'a, ClientResult<bool>> {
        Box::pin(async move {
            check_open(&self.closed)?;
            let request = GetTableRequest {
                name: self.config.table_name(table_id),
                view: View::NameOnly as i32,
            };
            debug!(table = table_id, "GetTable");
            self.auth.refresh().await?;
            let mut client = self.client.clone();
            match client.get_table(request).await {
                Ok(_) => Ok(true),
                Err(status) if status.code() == tonic::Code::NotFound => Ok(false),
                Err(status) => Err(status.into()),
            }
        })
    }

    fn create_table(&self, spec: TableSpec) -> BoxFuture<'_, ClientResult<()>> {
        Box::pin(async move {
            check_open(&self.closed)?;
            debug!(table = %spec.table_id, families = spec.families.len(), "CreateTable");
            let request = convert::create_table_request(&self.config, spec);
            self.auth.refresh().await?;
            let mut client = self.client.clone();
            client.create_table(request).await?;
            Ok(())
        })
    }

    fn close(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if !self.closed.swap(true, Ordering::AcqRel) {
                debug!("admin handle closed");
            }
        })
    }

    fn state(&self) -> HandleState {
        state_of(&self.closed)
    }
}

/// Data handle.
pub struct GrpcData {
    client: BigtableClient<AuthChannel>,
    auth: AuthInterceptor,
    config: ClientConfig,
    closed: AtomicBool,
}

impl std::fmt::Debug for GrpcData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrpcData")
            .field("endpoint", &self.config.data_uri())
            .field("app_profile_id", &self.config.app_profile_id)
            .field("state", &self.state())
            .finish()
    }
}

impl DataClient for GrpcData {
    fn mutate_row(&self, mutation: RowMutation) -> BoxFuture<'_, ClientResult<()>> {
        Box::pin(async move {
            check_open(&self.closed)?;
            debug!(
                table = %mutation.table_id,
                row = %String::from_utf8_lossy(&mutation.row_key),
                cells = mutation.cells.len(),
                "MutateRow"
            );
            let request = convert::mutate_row_request(&self.config, mutation);
            self.auth.refresh().await?;
            let mut client = self.client.clone();
            client.mutate_row(request).await?;
            Ok(())
        })
    }

    fn read_rows(&self, query: Query) -> RowStream<'_> {
        if let Err(err) = check_open(&self.closed) {
            return Box::pin(futures_util::stream::once(async move {
                Err::<Row, ClientError>(err)
            }));
        }
        debug!(
            table = %query.table_id,
            full_table = query.is_full_table(),
            limit = ?query.limit,
            "ReadRows"
        );
        let state = ReadState::Pending {
            client: self.client.clone(),
            auth: self.auth.clone(),
            request: convert::read_rows_request(&self.config, query),
        };
        Box::pin(futures_util::stream::unfold(state, next_row))
    }

    fn close(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if !self.closed.swap(true, Ordering::AcqRel) {
                debug!("data handle closed");
            }
        })
    }

    fn state(&self) -> HandleState {
        state_of(&self.closed)
    }
}

/// Progress of one `ReadRows` call.
enum ReadState {
    /// The call has not been issued yet.
    Pending {
        client: BigtableClient<AuthChannel>,
        auth: AuthInterceptor,
        request: ReadRowsRequest,
    },
    /// Responses are being merged into rows.
    Streaming {
        responses: Streaming<ReadRowsResponse>,
        merger: RowMerger,
        ready: VecDeque<Row>,
    },
    /// The stream ended or failed.
    Done,
}

async fn next_row(state: ReadState) -> Option<(ClientResult<Row>, ReadState)> {
    let (mut responses, mut merger, mut ready) = match state {
        ReadState::Done => return None,
        ReadState::Pending {
            mut client,
            auth,
            request,
        } => {
            if let Err(err) = auth.refresh().await {
                return Some((Err(err), ReadState::Done));
            }
            match client.read_rows(request).await {
                Ok(response) => (response.into_inner(), RowMerger::new(), VecDeque::new()),
                Err(status) => return Some((Err(status.into()), ReadState::Done)),
            }
        }
        ReadState::Streaming {
            responses,
            merger,
            ready,
        } => (responses, merger, ready),
    };

    loop {
        if let Some(row) = ready.pop_front() {
            let state = ReadState::Streaming {
                responses,
                merger,
                ready,
            };
            return Some((Ok(row), state));
        }

        match responses.message().await {
            Ok(Some(response)) => match merger.push(response) {
                Ok(rows) => ready.extend(rows),
                Err(err) => return Some((Err(err), ReadState::Done)),
            },
            Ok(None) => {
                debug!(rows = merger.rows_committed(), "ReadRows finished");
                return merger.finish().err().map(|err| (Err(err), ReadState::Done));
            }
            Err(status) => return Some((Err(status.into()), ReadState::Done)),
        }
    }
}
