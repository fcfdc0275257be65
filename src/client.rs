//! HTTP client implementation for the JSON store

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use hyper::{Request, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client as HttpClient;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use tracing::debug;

use crate::envelope::{check_status, Envelope, Operation};
use crate::error::{Error, Result, TransportError};
use crate::path;
use crate::store::JsonStore;

/// Public jsonstore.io endpoint
pub const DEFAULT_ENDPOINT: &str = "https://www.jsonstore.io";

/// Default bound on a whole request/response exchange
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

const JSON: &str = "application/json";

/// Configuration options for the store client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Store endpoint URL (default: https://www.jsonstore.io)
    pub endpoint: String,
    /// Opaque store identifier, appended to the endpoint path. Acts as the access credential.
    pub store_id: String,
    /// Request timeout in milliseconds, covering connect, send and body read (default: 5000)
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds (default: same as `timeout_ms`)
    pub connect_timeout_ms: Option<u64>,
    /// How long idle pooled connections are kept, in milliseconds (default: 90000)
    pub pool_idle_timeout_ms: u64,
    /// Maximum idle pooled connections per host (default: 8)
    pub pool_max_idle_per_host: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            store_id: String::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            connect_timeout_ms: None,
            pool_idle_timeout_ms: 90_000,
            pool_max_idle_per_host: 8,
        }
    }
}

impl ClientConfig {
    /// Default configuration for the given store identifier
    pub fn for_store(store_id: &str) -> Self {
        Self {
            store_id: store_id.to_string(),
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(Error::Config("timeout_ms must be greater than zero".to_string()));
        }
        if self.connect_timeout_ms == Some(0) {
            return Err(Error::Config(
                "connect_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Build a rustls ClientConfig that verifies against the webpki roots.
fn build_tls_config() -> Result<rustls::ClientConfig> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());

    let mut roots = rustls::RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    Ok(rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| Error::Config(format!("TLS configuration error: {}", e)))?
        .with_root_certificates(roots)
        .with_no_client_auth())
}

type HttpsConnector = hyper_rustls::HttpsConnector<HttpConnector>;

/// Client for a path-addressed JSON document store
///
/// Speaks HTTP/1.1 or HTTP/2 (negotiated via ALPN) over plain TCP or TLS,
/// depending on the endpoint scheme. Clones share one connection pool, so a
/// single client can be handed to any number of tasks.
///
/// Every operation is one independent exchange bounded by the configured
/// timeout. Nothing is retried or cached. The operations come from the
/// [`JsonStore`] trait, which has to be in scope.
///
/// # Example
/// ```rust,no_run
/// use jsonstore::{JsonStore, StoreClient};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Todo {
///     id: u64,
///     title: String,
///     done: bool,
/// }
///
/// #[tokio::main]
/// async fn main() -> Result<(), jsonstore::Error> {
///     let client = StoreClient::new("your-store-id")?;
///
///     let todo = Todo { id: 1, title: "buy milk".to_string(), done: false };
///     client.post("todos/1", &todo).await?;
///     client.put("todos/1/done", &true).await?;
///
///     let todo: Todo = client.get("todos/1").await?;
///     assert!(todo.done);
///
///     client.delete("todos/1").await?;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct StoreClient {
    config: Arc<ClientConfig>,
    base_url: Arc<str>,
    http_client: HttpClient<HttpsConnector, Full<Bytes>>,
}

impl fmt::Debug for StoreClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // base_url embeds the store id, keep it out of logs
        f.debug_struct("StoreClient")
            .field("endpoint", &self.config.endpoint)
            .field("timeout_ms", &self.config.timeout_ms)
            .finish_non_exhaustive()
    }
}

impl StoreClient {
    /// Create a client for the given store on the public endpoint
    ///
    /// # Errors
    /// Returns an error if the store identifier is empty
    pub fn new(store_id: &str) -> Result<Self> {
        Self::with_config(ClientConfig::for_store(store_id))
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let base_url = path::base_url(&config.endpoint, &config.store_id)?;

        let tls_config = build_tls_config()?;

        let mut http_connector = HttpConnector::new();
        http_connector.enforce_http(false);
        http_connector.set_connect_timeout(Some(Duration::from_millis(
            config.connect_timeout_ms.unwrap_or(config.timeout_ms),
        )));

        let https_connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .enable_http2()
            .wrap_connector(http_connector);

        let http_client = HttpClient::builder(TokioExecutor::new())
            .pool_timer(TokioTimer::new())
            .pool_idle_timeout(Duration::from_millis(config.pool_idle_timeout_ms))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build(https_connector);

        debug!("Created store client for endpoint {}", config.endpoint);

        Ok(Self {
            config: Arc::new(config),
            base_url: base_url.into(),
            http_client,
        })
    }

    /// Get the endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Get the store base URL (endpoint plus store identifier)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeout_ms)
    }

    /// Absolute URL for a key path. An empty key addresses the whole store.
    pub fn url(&self, key: &str) -> String {
        path::join_key_path(&self.base_url, key)
    }

    /// Send one request and return the body of an acceptable response.
    ///
    /// Status classification happens before the body is read.
    async fn execute(&self, op: Operation, key: &str, body: Option<Bytes>) -> Result<Bytes> {
        let url = self.url(key);
        let uri: Uri = url
            .parse()
            .map_err(|e| Error::InvalidUrl(format!("Invalid request URL for '{}': {}", key, e)))?;

        let req = Request::builder()
            .method(op.method())
            .uri(uri)
            .header(ACCEPT, JSON)
            .header(CONTENT_TYPE, JSON)
            .header(USER_AGENT, concat!("jsonstore-client/", env!("CARGO_PKG_VERSION")))
            .body(Full::new(body.unwrap_or_default()))
            .map_err(|e| Error::InvalidRequest(format!("Failed to build request: {}", e)))?;

        debug!("Sending request: {} {}", op.method(), key);

        let timeout = self.timeout();
        tokio::time::timeout(timeout, self.exchange(op, key, req))
            .await
            .map_err(|_| TransportError::Timeout(timeout))?
    }

    async fn exchange(&self, op: Operation, key: &str, req: Request<Full<Bytes>>) -> Result<Bytes> {
        let response = self
            .http_client
            .request(req)
            .await
            .map_err(TransportError::Connect)?;

        let status = response.status();
        debug!("Store answered {} {} with {}", op.method(), key, status);
        check_status(op, key, status)?;

        let collected = response
            .into_body()
            .collect()
            .await
            .map_err(TransportError::Body)?;
        Ok(collected.to_bytes())
    }

    async fn write(&self, op: Operation, key: &str, body: Option<Bytes>) -> Result<()> {
        if path::key_segments(key).is_empty() {
            return Err(Error::InvalidRequest(format!(
                "{} requires a non-empty key path",
                op.method()
            )));
        }
        let response = self.execute(op, key, body).await?;
        Envelope::decode(key, &response)?.into_ack(key)
    }
}

impl JsonStore for StoreClient {
    fn get_raw(&self, key: &str) -> impl Future<Output = Result<Bytes>> + Send {
        self.execute(Operation::Get, key, None)
    }

    fn post_raw(
        &self,
        key: &str,
        data: impl Into<Bytes>,
    ) -> impl Future<Output = Result<()>> + Send {
        self.write(Operation::Create, key, Some(data.into()))
    }

    fn put_raw(
        &self,
        key: &str,
        data: impl Into<Bytes>,
    ) -> impl Future<Output = Result<()>> + Send {
        self.write(Operation::Replace, key, Some(data.into()))
    }

    fn delete(&self, key: &str) -> impl Future<Output = Result<()>> + Send {
        self.write(Operation::Delete, key, None)
    }
}
