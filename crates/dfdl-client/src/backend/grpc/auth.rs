//! Request credentials.
//!
//! Three modes, picked by [`credential_mode`]:
//!
//! - emulator: no credentials
//! - explicit access token: sent as-is on every request
//! - otherwise: Application Default Credentials through `gcp_auth`,
//!   refreshed before each call

use std::sync::Arc;

use parking_lot::RwLock;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::service::Interceptor;
use tonic::{Request, Status};
use tracing::debug;

use crate::backend::BoxFuture;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// OAuth2 scopes covering table data and table administration.
pub const BIGTABLE_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/bigtable.data",
    "https://www.googleapis.com/auth/bigtable.admin.table",
];

/// How requests are authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CredentialMode<'a> {
    /// Emulator: nothing is attached.
    None,
    /// A token supplied by the user.
    Static(&'a str),
    /// Tokens from Application Default Credentials.
    ApplicationDefault,
}

/// Chooses the credential mode for `config`.
pub(crate) fn credential_mode(config: &ClientConfig) -> CredentialMode<'_> {
    if config.is_emulator() {
        return CredentialMode::None;
    }
    match config.access_token.as_deref().map(str::trim) {
        Some(token) if !token.is_empty() => CredentialMode::Static(token),
        _ => CredentialMode::ApplicationDefault,
    }
}

/// Produces fresh access tokens.
pub trait TokenSource: Send + Sync {
    /// Returns a currently valid access token.
    fn token(&self) -> BoxFuture<'_, ClientResult<String>>;
}

/// Application Default Credentials.
struct GcpTokenSource {
    provider: Arc<dyn gcp_auth::TokenProvider>,
}

impl TokenSource for GcpTokenSource {
    fn token(&self) -> BoxFuture<'_, ClientResult<String>> {
        Box::pin(async move {
            // The provider caches tokens and only fetches when close to expiry.
            let token = self
                .provider
                .token(BIGTABLE_SCOPES)
                .await
                .map_err(|e| ClientError::Unauthenticated(format!("failed to get access token: {e}")))?;
            Ok(token.as_str().to_string())
        })
    }
}

/// Attaches an OAuth2 bearer token to every request.
///
/// The emulator accepts unauthenticated calls, so an interceptor without a
/// token passes requests through untouched. An interceptor backed by a
/// [`TokenSource`] must be refreshed before use; it rejects requests while
/// it holds no token.
#[derive(Clone, Default)]
pub struct AuthInterceptor {
    authorization: Arc<RwLock<Option<MetadataValue<Ascii>>>>,
    source: Option<Arc<dyn TokenSource>>,
}

impl AuthInterceptor {
    /// Creates an interceptor that adds no credentials.
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates an interceptor sending `authorization: Bearer <token>`.
    pub fn bearer(token: &str) -> ClientResult<Self> {
        let value = bearer_value(token)?;
        Ok(Self {
            authorization: Arc::new(RwLock::new(Some(value))),
            source: None,
        })
    }

    /// Creates an interceptor fed by `source`. Call [`refresh`](Self::refresh)
    /// before the first request.
    pub fn from_source(source: Arc<dyn TokenSource>) -> Self {
        Self {
            authorization: Arc::default(),
            source: Some(source),
        }
    }

    /// Locates Application Default Credentials and fetches a first token.
    pub async fn application_default() -> ClientResult<Self> {
        let provider = gcp_auth::provider().await.map_err(|e| {
            ClientError::Unauthenticated(format!(
                "no application default credentials found ({e}); \
                 set BIGTABLE_ACCESS_TOKEN or run `gcloud auth application-default login`"
            ))
        })?;
        let interceptor = Self::from_source(Arc::new(GcpTokenSource { provider }));
        interceptor.refresh().await?;
        Ok(interceptor)
    }

    /// Fetches a current token from the source, if there is one.
    pub async fn refresh(&self) -> ClientResult<()> {
        let Some(source) = &self.source else {
            return Ok(());
        };
        let value = bearer_value(&source.token().await?)?;
        *self.authorization.write() = Some(value);
        debug!("access token refreshed");
        Ok(())
    }

    /// Returns true if requests will carry a token.
    pub fn has_credentials(&self) -> bool {
        self.source.is_some() || self.authorization.read().is_some()
    }
}

fn bearer_value(token: &str) -> ClientResult<MetadataValue<Ascii>> {
    format!("Bearer {}", token.trim())
        .parse::<MetadataValue<Ascii>>()
        .map_err(|_| ClientError::InvalidConfig("access token contains invalid characters".to_string()))
}

impl std::fmt::Debug for AuthInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthInterceptor")
            .field("has_credentials", &self.has_credentials())
            .field("refreshing", &self.source.is_some())
            .finish()
    }
}

impl Interceptor for AuthInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        match self.authorization.read().as_ref() {
            Some(value) => {
                request
                    .metadata_mut()
                    .insert("authorization", value.clone());
            }
            None if self.source.is_some() => {
                return Err(Status::unauthenticated("access token not yet fetched"));
            }
            None => {}
        }
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    /// Hands out `token-1`, `token-2`, ...
    #[derive(Default)]
    struct CountingSource {
        issued: AtomicU32,
    }

    impl TokenSource for CountingSource {
        fn token(&self) -> BoxFuture<'_, ClientResult<String>> {
            Box::pin(async move {
                let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(format!("token-{n}"))
            })
        }
    }

    struct FailingSource;

    impl TokenSource for FailingSource {
        fn token(&self) -> BoxFuture<'_, ClientResult<String>> {
            Box::pin(async { Err(ClientError::Unauthenticated("metadata server unreachable".to_string())) })
        }
    }

    fn authorization(interceptor: &mut AuthInterceptor) -> Option<String> {
        let request = interceptor.call(Request::new(())).unwrap();
        request
            .metadata()
            .get("authorization")
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[test]
    fn test_bearer_header() {
        let mut interceptor = AuthInterceptor::bearer("ya29.token\n").unwrap();
        assert!(interceptor.has_credentials());
        assert_eq!(authorization(&mut interceptor).as_deref(), Some("Bearer ya29.token"));
    }

    #[test]
    fn test_none_passes_through() {
        let mut interceptor = AuthInterceptor::none();
        assert!(!interceptor.has_credentials());
        assert!(authorization(&mut interceptor).is_none());
    }

    #[test]
    fn test_rejects_invalid_token() {
        assert!(matches!(
            AuthInterceptor::bearer("bad\u{7f}token"),
            Err(ClientError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_credential_mode() {
        let config = ClientConfig::new("p", "i");
        assert_eq!(credential_mode(&config), CredentialMode::ApplicationDefault);

        let config = config.access_token(" ya29.token ");
        assert_eq!(credential_mode(&config), CredentialMode::Static("ya29.token"));

        // Tokens are never sent to an emulator.
        let config = config.emulator_host("localhost:8086");
        assert_eq!(credential_mode(&config), CredentialMode::None);

        let config = ClientConfig::new("p", "i").access_token("   ");
        assert_eq!(credential_mode(&config), CredentialMode::ApplicationDefault);
    }

    #[tokio::test]
    async fn test_source_tokens_are_refreshed() {
        let mut interceptor = AuthInterceptor::from_source(Arc::new(CountingSource::default()));
        assert!(interceptor.has_credentials());

        let status = interceptor.call(Request::new(())).unwrap_err();
        assert_eq!(status.code(), tonic::Code::Unauthenticated);

        interceptor.refresh().await.unwrap();
        assert_eq!(authorization(&mut interceptor).as_deref(), Some("Bearer token-1"));

        // Clones share the refreshed token.
        let mut clone = interceptor.clone();
        interceptor.refresh().await.unwrap();
        assert_eq!(authorization(&mut clone).as_deref(), Some("Bearer token-2"));
    }

    #[tokio::test]
    async fn test_source_failure_is_unauthenticated() {
        let interceptor = AuthInterceptor::from_source(Arc::new(FailingSource));
        let err = interceptor.refresh().await.unwrap_err();
        assert!(matches!(err, ClientError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn test_refresh_without_source_is_noop() {
        let mut interceptor = AuthInterceptor::bearer("static").unwrap();
        interceptor.refresh().await.unwrap();
        assert_eq!(authorization(&mut interceptor).as_deref(), Some("Bearer static"));
    }
}
