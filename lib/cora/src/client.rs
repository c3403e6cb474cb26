//! The fluent client and its request pipeline.
//!
//! [`Cora`] holds a transport, an optional host override and a set of default
//! headers. Each verb method runs the same pipeline:
//!
//! 1. encode the body, and infer its content type when the call carries no
//!    headers of its own
//! 2. build the request: URL, host override, default headers, then the
//!    call headers
//! 3. execute it through the transport
//! 4. normalize the outcome into a [`Response`]
//!
//! Nothing is retried and nothing panics: every failure, from a malformed URL
//! to a `503`, comes back inside the [`Response`].

use http::HeaderValue;
use http::header::CONTENT_TYPE;
use tracing::{Instrument, Level, debug, span, warn};
use url::Url;

use crate::{
    ClientConfig, Error, Header, HyperTransport, Method, Payload, Request, Response, Result,
    Transport, infer_content_type,
};

/// Fluent HTTP client.
///
/// Setters consume the client and hand it back, so configuration is done
/// before the client is shared. A configured client is cheap to clone.
///
/// # Example
///
/// ```ignore
/// use cora::{Cora, Header, Payload};
///
/// let client = Cora::new()
///     .set_host("api.internal")
///     .set_headers([Header::single("Accept", "application/json")]);
///
/// let response = client
///     .post("https://10.0.0.7/users", Payload::value(&new_user), &[])
///     .await;
/// ```
#[derive(Debug, Clone)]
pub struct Cora<T = HyperTransport> {
    transport: T,
    host: Option<String>,
    headers: Vec<Header>,
}

impl Cora<HyperTransport> {
    /// Client over the default transport (60s timeout).
    #[must_use]
    pub fn new() -> Self {
        Self::with_transport(HyperTransport::new())
    }

    /// Client over a transport speaking HTTP/2 with prior knowledge.
    #[must_use]
    pub fn http2() -> Self {
        Self::with_transport(HyperTransport::http2_prior_knowledge())
    }

    /// Client over a hyper transport built from `config`.
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        Self::with_transport(HyperTransport::with_config(config))
    }
}

impl Default for Cora<HyperTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Cora<T> {
    /// Client over any transport.
    #[must_use]
    pub const fn with_transport(transport: T) -> Self {
        Self {
            transport,
            host: None,
            headers: Vec::new(),
        }
    }

    /// Sends `host` as the request host for every following call.
    ///
    /// The URL still decides where to connect.
    #[must_use]
    pub fn set_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Replaces the default headers sent with every call.
    #[must_use]
    pub fn set_headers(mut self, headers: impl IntoIterator<Item = Header>) -> Self {
        self.headers = headers.into_iter().collect();
        self
    }

    /// Host override, if any.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Default headers.
    #[must_use]
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    /// The underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> Cora<T> {
    /// GET request.
    pub async fn get(&self, url: &str, headers: &[Header]) -> Response {
        self.execute(Method::Get, url, None, headers).await
    }

    /// HEAD request.
    pub async fn head(&self, url: &str, headers: &[Header]) -> Response {
        self.execute(Method::Head, url, None, headers).await
    }

    /// POST request with an optional body.
    pub async fn post(
        &self,
        url: &str,
        body: impl Into<Option<Payload>>,
        headers: &[Header],
    ) -> Response {
        self.execute(Method::Post, url, body.into(), headers).await
    }

    /// PUT request with an optional body.
    pub async fn put(
        &self,
        url: &str,
        body: impl Into<Option<Payload>>,
        headers: &[Header],
    ) -> Response {
        self.execute(Method::Put, url, body.into(), headers).await
    }

    /// DELETE request.
    pub async fn delete(&self, url: &str, headers: &[Header]) -> Response {
        self.execute(Method::Delete, url, None, headers).await
    }

    /// OPTIONS request.
    pub async fn options(&self, url: &str, headers: &[Header]) -> Response {
        self.execute(Method::Options, url, None, headers).await
    }

    /// PATCH request with an optional body.
    pub async fn patch(
        &self,
        url: &str,
        body: impl Into<Option<Payload>>,
        headers: &[Header],
    ) -> Response {
        self.execute(Method::Patch, url, body.into(), headers).await
    }

    /// TRACE request.
    pub async fn trace(&self, url: &str, headers: &[Header]) -> Response {
        self.execute(Method::Trace, url, None, headers).await
    }

    /// Runs the request pipeline for any method.
    ///
    /// Headers given here are merged after the default ones. When they are
    /// empty and a non-empty body is sent without a `Content-Type` among the
    /// defaults, the content type is inferred from the body. A body on a
    /// method that takes none is a construction error.
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<Payload>,
        headers: &[Header],
    ) -> Response {
        let span = span!(Level::DEBUG, "http_request", %method, %url);

        async move {
            let request = match self.build_request(method, url, body, headers) {
                Ok(request) => request,
                Err(err) => {
                    warn!(error = %err, "cannot build request");
                    return Response::from_error(err);
                }
            };

            let raw = match self.transport.execute(request).await {
                Ok(raw) => raw,
                Err(err) => {
                    warn!(error = %err, "transport failed");
                    return Response::from_error(err);
                }
            };

            let response = Response::from_raw(raw);
            match response.error() {
                Some(err) => debug!(status = response.status(), error = %err, "non-success status"),
                None => debug!(status = response.status(), "request completed"),
            }
            response
        }
        .instrument(span)
        .await
    }

    fn build_request(
        &self,
        method: Method,
        url: &str,
        body: Option<Payload>,
        headers: &[Header],
    ) -> Result<Request> {
        if body.is_some() && !method.accepts_body() {
            return Err(Error::invalid_request(format!("{method} does not take a body")));
        }
        let body = body.map(Payload::into_bytes).transpose()?;
        let url = Url::parse(url)?;

        let mut builder = Request::builder(method, url).headers(&self.headers)?;
        if let Some(host) = &self.host {
            HeaderValue::from_str(host)
                .map_err(|e| Error::invalid_header(format!("host {host:?}: {e}")))?;
            builder = builder.host(host.clone());
        }
        builder = builder.headers(headers)?;

        if let Some(body) = body {
            if headers.is_empty()
                && !body.is_empty()
                && !self.headers.iter().any(|h| is_content_type(h.name()))
            {
                let content_type = infer_content_type(&body);
                debug!(content_type, "inferred content type");
                builder = builder.header(&Header::single(CONTENT_TYPE.as_str(), content_type))?;
            }
            builder = builder.body(body);
        }

        Ok(builder.build())
    }
}

fn is_content_type(name: &str) -> bool {
    name.eq_ignore_ascii_case(CONTENT_TYPE.as_str())
}
