//! HTTP transport implementation using hyper-util.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use http::HeaderValue;
use http::header::HOST;
use http::uri::{Authority, PathAndQuery, Uri};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::client::conn::{http1, http2};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{
        Client,
        connect::{Connection, HttpConnector},
    },
    rt::TokioExecutor,
};
use tower::util::BoxCloneService;
use tower::{Layer, ServiceExt};
use tower_service::Service;
use tracing::debug;

use crate::{
    Error, RawResponse, Request, Result,
    config::{ClientConfig, ClientConfigBuilder, Protocol},
    connector::https_connector,
    middleware::LoggingLayer,
};

// ============================================================================
// Type-Erased Service for Middleware Composition
// ============================================================================

/// Type-erased service for middleware composition.
pub type BoxedService = BoxCloneService<Request, RawResponse, Error>;

/// Future type for Tower Service implementation.
pub type ServiceFuture = Pin<Box<dyn Future<Output = Result<RawResponse>> + Send + 'static>>;

/// Thread-safe wrapper for `BoxedService`.
///
/// `BoxCloneService` is not `Sync`; the mutex only guards the clone taken
/// for each call.
#[derive(Clone)]
struct SyncService {
    inner: Arc<Mutex<BoxedService>>,
}

impl SyncService {
    fn new(service: BoxedService) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    fn call(&self, request: Request) -> ServiceFuture {
        let mut service = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();

        Box::pin(async move { service.call(request).await })
    }
}

// ============================================================================
// Raw Transport (internal, direct hyper access)
// ============================================================================

type Connector = HttpsConnector<HttpConnector>;

#[derive(Clone)]
struct RawHyperTransport {
    inner: Client<Connector, Full<Bytes>>,
    connector: Connector,
    protocol: Protocol,
    timeout: Duration,
}

impl RawHyperTransport {
    fn new(config: &ClientConfig) -> Self {
        let connector = https_connector(config.protocol);

        let mut builder = Client::builder(TokioExecutor::new());
        builder.http2_only(config.protocol == Protocol::Http2PriorKnowledge);
        let inner = builder.build(connector.clone());

        Self {
            inner,
            connector,
            protocol: config.protocol,
            timeout: config.timeout,
        }
    }

    /// Build a hyper request from a cora request.
    fn build_hyper_request(request: Request) -> Result<http::Request<Full<Bytes>>> {
        let (method, url, host, headers, body) = request.into_parts();

        let body = body.map_or_else(Full::default, Full::new);
        let mut http_request = http::Request::builder()
            .method(http::Method::from(method))
            .uri(url.as_str())
            .body(body)
            .map_err(|e| Error::invalid_request(e.to_string()))?;

        *http_request.headers_mut() = headers;
        if let Some(host) = host {
            let value = HeaderValue::from_str(&host)
                .map_err(|e| Error::invalid_header(format!("host {host:?}: {e}")))?;
            http_request.headers_mut().insert(HOST, value);
        }

        Ok(http_request)
    }

    async fn execute(&self, request: Request) -> Result<RawResponse> {
        let overridden = request.host().is_some();
        let hyper_request = Self::build_hyper_request(request)?;

        let exchange = async {
            let response = if overridden {
                self.send_overridden(hyper_request).await?
            } else {
                self.inner
                    .request(hyper_request)
                    .await
                    .map_err(Self::map_hyper_error)?
            };

            let (parts, body) = response.into_parts();
            let body = body
                .collect()
                .await
                .map_err(|e| Error::connection(e.to_string()))?
                .to_bytes();

            Ok::<_, Error>(
                RawResponse::new(parts.status.as_u16(), parts.headers, Some(body))
                    .with_version(parts.version),
            )
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| Error::Timeout)?
    }

    /// Sends a request with a host override on a connection of its own.
    ///
    /// The pooled client dials the authority of the URI, which must stay the
    /// URL's. Here the connection is dialed from the URL first. On HTTP/2 the
    /// override then becomes the `:authority` and no `Host` header is sent;
    /// on HTTP/1.1 it stays the `Host` header.
    async fn send_overridden(
        &self,
        mut request: http::Request<Full<Bytes>>,
    ) -> Result<http::Response<Incoming>> {
        let io = self
            .connector
            .clone()
            .oneshot(request.uri().clone())
            .await
            .map_err(|e| Self::classify(e.to_string()))?;

        if self.protocol == Protocol::Http2PriorKnowledge || io.connected().is_negotiated_h2() {
            into_authority_form(&mut request)?;
            let (mut sender, connection) = http2::handshake(TokioExecutor::new(), io)
                .await
                .map_err(|e| Self::classify(e.to_string()))?;
            tokio::spawn(drive(connection));
            sender
                .send_request(request)
                .await
                .map_err(|e| Self::classify(e.to_string()))
        } else {
            into_origin_form(&mut request);
            let (mut sender, connection) = http1::handshake(io)
                .await
                .map_err(|e| Self::classify(e.to_string()))?;
            tokio::spawn(drive(connection));
            sender
                .send_request(request)
                .await
                .map_err(|e| Self::classify(e.to_string()))
        }
    }

    #[allow(clippy::needless_pass_by_value)]
    fn map_hyper_error(err: hyper_util::client::legacy::Error) -> Error {
        if err.is_connect() {
            return Error::connection(err.to_string());
        }
        Self::classify(err.to_string())
    }

    fn classify(msg: String) -> Error {
        if msg.contains("ssl") || msg.contains("tls") || msg.contains("certificate") {
            return Error::tls(msg);
        }
        Error::connection(msg)
    }
}

/// Moves the `Host` header into the URI authority.
fn into_authority_form(request: &mut http::Request<Full<Bytes>>) -> Result<()> {
    let Some(host) = request.headers_mut().remove(HOST) else {
        return Ok(());
    };
    let authority = Authority::try_from(host.as_bytes())
        .map_err(|e| Error::invalid_header(format!("host {host:?}: {e}")))?;

    let mut parts = request.uri().clone().into_parts();
    parts.authority = Some(authority);
    *request.uri_mut() =
        Uri::from_parts(parts).map_err(|e| Error::invalid_request(e.to_string()))?;
    Ok(())
}

/// Keeps only the path and query, so the `Host` header names the target.
fn into_origin_form(request: &mut http::Request<Full<Bytes>>) {
    let origin = request
        .uri()
        .path_and_query()
        .cloned()
        .unwrap_or_else(|| PathAndQuery::from_static("/"));
    *request.uri_mut() = Uri::from(origin);
}

async fn drive<C>(connection: C)
where
    C: Future<Output = std::result::Result<(), hyper::Error>>,
{
    if let Err(err) = connection.await {
        debug!(error = %err, "connection closed");
    }
}

impl Service<Request> for RawHyperTransport {
    type Response = RawResponse;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let transport = self.clone();
        Box::pin(async move { transport.execute(request).await })
    }
}

// ============================================================================
// Public Transport
// ============================================================================

/// HTTP transport using hyper-util, with TLS and optional middleware.
///
/// Two variants share this type: [`HyperTransport::new`] negotiates
/// HTTP/1.1 or HTTP/2, [`HyperTransport::http2_prior_knowledge`] speaks
/// HTTP/2 without negotiation.
///
/// # Example
///
/// ```ignore
/// use cora::HyperTransport;
/// use std::time::Duration;
///
/// let transport = HyperTransport::builder()
///     .timeout(Duration::from_secs(10))
///     .with_logging()
///     .build();
/// ```
#[derive(Clone)]
pub struct HyperTransport {
    service: SyncService,
    config: ClientConfig,
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HyperTransport {
    /// Create a transport with default configuration (60s timeout).
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Create a transport that uses HTTP/2 with prior knowledge.
    #[must_use]
    pub fn http2_prior_knowledge() -> Self {
        Self::builder().http2_prior_knowledge().build()
    }

    /// Create a transport with custom configuration (no middleware).
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        let raw = RawHyperTransport::new(&config);
        Self::with_service(BoxCloneService::new(raw), config)
    }

    fn with_service(service: BoxedService, config: ClientConfig) -> Self {
        Self {
            service: SyncService::new(service),
            config,
        }
    }

    /// Create a new transport builder.
    #[must_use]
    pub fn builder() -> HyperTransportBuilder {
        HyperTransportBuilder::default()
    }

    /// Get the transport configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl cora_core::Transport for HyperTransport {
    async fn execute(&self, request: Request) -> Result<RawResponse> {
        self.service.call(request).await
    }
}

impl Service<Request> for HyperTransport {
    type Response = RawResponse;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        self.service.call(request)
    }
}

/// Builder for [`HyperTransport`].
///
/// # Example
///
/// ```ignore
/// use cora::HyperTransport;
/// use cora::middleware::LoggingLayer;
///
/// let transport = HyperTransport::builder()
///     .layer(LoggingLayer::debug())
///     .build();
/// ```
#[derive(Default)]
pub struct HyperTransportBuilder {
    config: ClientConfigBuilder,
    layers: Vec<Arc<dyn Fn(BoxedService) -> BoxedService + Send + Sync>>,
}

impl std::fmt::Debug for HyperTransportBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransportBuilder")
            .field("config", &self.config)
            .field("layers_count", &self.layers.len())
            .finish()
    }
}

impl HyperTransportBuilder {
    /// Set the request timeout, covering connect, send and body drain.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Set the protocol.
    #[must_use]
    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.config = self.config.protocol(protocol);
        self
    }

    /// Speak HTTP/2 without negotiation.
    #[must_use]
    pub fn http2_prior_knowledge(self) -> Self {
        self.protocol(Protocol::Http2PriorKnowledge)
    }

    /// Add a Tower layer to the transport.
    ///
    /// Layers are applied in order: first added = innermost.
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + Sync + 'static,
        L::Service:
            Service<Request, Response = RawResponse, Error = Error> + Clone + Send + 'static,
        <L::Service as Service<Request>>::Future: Send,
    {
        self.layers.push(Arc::new(move |service| {
            BoxCloneService::new(layer.layer(service))
        }));
        self
    }

    /// Add request/response logging.
    #[must_use]
    pub fn with_logging(self) -> Self {
        self.layer(LoggingLayer::new())
    }

    /// Add debug-level logging (includes headers).
    #[must_use]
    pub fn with_debug_logging(self) -> Self {
        self.layer(LoggingLayer::debug())
    }

    /// Build the transport with all configured middleware.
    #[must_use]
    pub fn build(self) -> HyperTransport {
        let config = self.config.build();
        let mut service: BoxedService = BoxCloneService::new(RawHyperTransport::new(&config));

        for layer_fn in self.layers {
            service = layer_fn(service);
        }

        HyperTransport::with_service(service, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Header, Method};

    fn request(host: Option<&str>) -> Request {
        let url = url::Url::parse("http://localhost:8080/items?page=2").expect("url");
        let mut builder = Request::builder(Method::Put, url)
            .header(&Header::new("X-Tag", ["a", "b"]))
            .expect("header")
            .body("payload");
        if let Some(host) = host {
            builder = builder.host(host);
        }
        builder.build()
    }

    #[test]
    fn hyper_request_carries_everything() {
        let hyper_request =
            RawHyperTransport::build_hyper_request(request(Some("api.internal"))).expect("request");

        assert_eq!(hyper_request.method(), http::Method::PUT);
        assert_eq!(hyper_request.uri(), "http://localhost:8080/items?page=2");
        assert_eq!(hyper_request.headers().get_all("x-tag").iter().count(), 2);
        assert_eq!(
            hyper_request.headers().get(HOST),
            Some(&HeaderValue::from_static("api.internal"))
        );
    }

    #[test]
    fn hyper_request_without_host_override() {
        let hyper_request = RawHyperTransport::build_hyper_request(request(None)).expect("request");
        assert!(hyper_request.headers().get(HOST).is_none());
    }

    #[test]
    fn hyper_request_rejects_bad_host() {
        let result = RawHyperTransport::build_hyper_request(request(Some("bad\nhost")));
        assert!(matches!(result, Err(Error::InvalidHeader(_))));
    }

    #[test]
    fn authority_form_moves_host_into_uri() {
        let mut hyper_request =
            RawHyperTransport::build_hyper_request(request(Some("api.internal"))).expect("request");

        into_authority_form(&mut hyper_request).expect("authority");

        assert_eq!(hyper_request.uri(), "http://api.internal/items?page=2");
        assert!(hyper_request.headers().get(HOST).is_none());
        assert_eq!(hyper_request.headers().get_all("x-tag").iter().count(), 2);
    }

    #[test]
    fn authority_form_keeps_uri_without_override() {
        let mut hyper_request = RawHyperTransport::build_hyper_request(request(None)).expect("request");

        into_authority_form(&mut hyper_request).expect("authority");

        assert_eq!(hyper_request.uri(), "http://localhost:8080/items?page=2");
    }

    #[test]
    fn authority_form_rejects_host_with_path() {
        let mut hyper_request =
            RawHyperTransport::build_hyper_request(request(Some("api.internal/v2"))).expect("request");

        let result = into_authority_form(&mut hyper_request);
        assert!(matches!(result, Err(Error::InvalidHeader(_))));
    }

    #[test]
    fn origin_form_keeps_path_and_host_header() {
        let mut hyper_request =
            RawHyperTransport::build_hyper_request(request(Some("api.internal"))).expect("request");

        into_origin_form(&mut hyper_request);

        assert_eq!(hyper_request.uri(), "/items?page=2");
        assert_eq!(
            hyper_request.headers().get(HOST),
            Some(&HeaderValue::from_static("api.internal"))
        );
    }

    #[test]
    fn transport_default() {
        let transport = HyperTransport::new();
        assert_eq!(transport.config().timeout, Duration::from_secs(60));
        assert_eq!(transport.config().protocol, Protocol::Negotiated);
    }

    #[test]
    fn transport_builder() {
        let transport = HyperTransport::builder()
            .timeout(Duration::from_secs(3))
            .http2_prior_knowledge()
            .with_logging()
            .build();

        assert_eq!(transport.config().timeout, Duration::from_secs(3));
        assert_eq!(transport.config().protocol, Protocol::Http2PriorKnowledge);
    }

    #[test]
    fn transport_is_debug() {
        let debug = format!("{:?}", HyperTransport::http2_prior_knowledge());
        assert!(debug.contains("HyperTransport"));
        assert!(debug.contains("Http2PriorKnowledge"));
    }
}
