//! Outgoing HTTP requests.
//!
//! Use [`Request::builder`] to construct requests with headers, a host
//! override and a body.
//!
//! # Example
//!
//! ```
//! use cora_core::{Header, Method, Request};
//!
//! let request = Request::builder(Method::Get, "https://api.example.com".parse().unwrap())
//!     .host("internal.example.com")
//!     .header(&Header::single("Accept", "application/json"))
//!     .unwrap()
//!     .build();
//!
//! assert_eq!(request.host(), Some("internal.example.com"));
//! ```

use bytes::Bytes;
use http::HeaderMap;

use crate::{Header, Method, Result};

/// An HTTP request with method, URL, headers, optional host override and body.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: url::Url,
    host: Option<String>,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl Request {
    /// Creates a new [`RequestBuilder`].
    #[must_use]
    pub fn builder(method: Method, url: url::Url) -> RequestBuilder {
        RequestBuilder::new(method, url)
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Request URL.
    #[must_use]
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// Host sent instead of the URL authority, if any.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access to headers.
    #[must_use]
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// First value of a header, if present and visible ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Consume into (method, url, host, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (Method, url::Url, Option<String>, HeaderMap, Option<Bytes>) {
        (self.method, self.url, self.host, self.headers, self.body)
    }
}

/// Builder for constructing [`Request`] instances.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    url: url::Url,
    host: Option<String>,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl RequestBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new(method: Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            host: None,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Overrides the host sent to the server.
    ///
    /// The URL is still used to connect; only the `Host` header changes.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Merges a header, see [`Header::apply_to`].
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or a value is invalid.
    pub fn header(mut self, header: &Header) -> Result<Self> {
        header.apply_to(&mut self.headers)?;
        Ok(self)
    }

    /// Merges headers in order.
    ///
    /// # Errors
    ///
    /// Returns an error on the first invalid header.
    pub fn headers<'a>(mut self, headers: impl IntoIterator<Item = &'a Header>) -> Result<Self> {
        crate::apply_headers(headers, &mut self.headers)?;
        Ok(self)
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Builds the [`Request`].
    #[must_use]
    pub fn build(self) -> Request {
        Request {
            method: self.method,
            url: self.url,
            host: self.host,
            headers: self.headers,
            body: self.body,
        }
    }
}
