//! HTTP response handling.
//!
//! A transport hands back a [`RawResponse`]. The request pipeline turns it
//! into a [`Response`]: status, fully buffered body, and at most one
//! [`Error`]. Every outcome of a request is a `Response`, including the ones
//! that never reached the server, so the error must be checked before the
//! status or body are trusted.
//!
//! # Example
//!
//! ```ignore
//! let mut user = User::default();
//! let response = client.get(url, &[]).await.decode_json(&mut user);
//! if let Some(err) = response.error() {
//!     eprintln!("request failed: {err}");
//! }
//! ```

use bytes::Bytes;
use http::{HeaderMap, Version};
use serde::de::DeserializeOwned;

use crate::{Error, Result};

// ============================================================================
// Raw Response
// ============================================================================

/// Response as returned by a [`Transport`](crate::Transport).
///
/// A `None` body means the transport had no body to report, which is not the
/// same as an empty one.
#[derive(Debug, Clone)]
pub struct RawResponse {
    status: u16,
    version: Version,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl RawResponse {
    /// Creates a new raw response.
    #[must_use]
    pub fn new(status: u16, headers: HeaderMap, body: Option<Bytes>) -> Self {
        Self {
            status,
            version: Version::default(),
            headers,
            body,
        }
    }

    /// Sets the protocol version the response arrived with.
    #[must_use]
    pub const fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Protocol version.
    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header, if present and visible ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Response body, if the transport reported one.
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }
}

// ============================================================================
// Response
// ============================================================================

/// Uniform outcome of a request.
#[derive(Debug)]
pub struct Response {
    status: u16,
    body: Bytes,
    error: Option<Error>,
    raw: Option<RawResponse>,
}

impl Response {
    /// A request that produced no server response.
    ///
    /// Status is `0` and the body is empty.
    #[must_use]
    pub fn from_error(error: Error) -> Self {
        Self {
            status: 0,
            body: Bytes::new(),
            error: Some(error),
            raw: None,
        }
    }

    /// Normalizes a transport response.
    ///
    /// A status outside `200..300` sets an [`Error::Status`] carrying the
    /// canonical reason; the body, status and raw response are kept either
    /// way.
    #[must_use]
    pub fn from_raw(raw: RawResponse) -> Self {
        let status = raw.status();
        let body = raw.body().cloned().unwrap_or_default();
        let error =
            (!(200..300).contains(&status)).then(|| Error::from_status(status, body.clone()));
        Self {
            status,
            body,
            error,
            raw: Some(raw),
        }
    }

    /// Replaces the error.
    #[must_use]
    pub fn with_error(mut self, error: Error) -> Self {
        self.error = Some(error);
        self
    }

    /// HTTP status code, `0` if no response was received.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response body, empty if none was received.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// The error attached to this response, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// The transport response, if the server answered.
    #[must_use]
    pub const fn raw(&self) -> Option<&RawResponse> {
        self.raw.as_ref()
    }

    /// Single header value by name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.raw.as_ref().and_then(|raw| raw.header(name))
    }

    /// No error is attached.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Status is 3xx.
    #[must_use]
    pub const fn is_redirection(&self) -> bool {
        self.status >= 300 && self.status < 400
    }

    /// Status is 4xx.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Status is 5xx.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }

    /// Decodes the JSON body into `target`.
    ///
    /// On success `target` is overwritten and the response is returned as
    /// is, prior error included. On failure `target` is untouched and the
    /// response comes back with the decode error attached.
    #[must_use]
    pub fn decode_json<T: DeserializeOwned>(self, target: &mut T) -> Self {
        match self.json() {
            Ok(value) => {
                *target = value;
                self
            }
            Err(err) => self.with_error(err),
        }
    }

    /// Decodes the XML body into `target`, see [`Response::decode_json`].
    #[must_use]
    pub fn decode_xml<T: DeserializeOwned>(self, target: &mut T) -> Self {
        match self.xml() {
            Ok(value) => {
                *target = value;
                self
            }
            Err(err) => self.with_error(err),
        }
    }

    /// Deserialize the response body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        crate::from_json(&self.body)
    }

    /// Deserialize the response body as XML.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn xml<T: DeserializeOwned>(&self) -> Result<T> {
        crate::from_xml(&self.body)
    }

    /// Get the response body as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid UTF-8.
    pub fn text(&self) -> std::result::Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.to_vec())
    }

    /// `Err` with the attached error, `Ok(self)` otherwise.
    ///
    /// # Errors
    ///
    /// Returns the attached error, if any.
    pub fn into_result(mut self) -> Result<Self> {
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }

    /// Consume into (status, body, error, raw).
    #[must_use]
    pub fn into_parts(self) -> (u16, Bytes, Option<Error>, Option<RawResponse>) {
        (self.status, self.body, self.error, self.raw)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn raw(status: u16, body: &'static str) -> RawResponse {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "application/json".parse().expect("value"));
        RawResponse::new(status, headers, Some(Bytes::from_static(body.as_bytes())))
    }

    #[test]
    fn success_has_no_error() {
        let response = Response::from_raw(raw(201, r#"{"id":1}"#));

        assert_eq!(response.status(), 201);
        assert!(response.is_ok());
        assert!(response.is_success());
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert_eq!(response.body().as_ref(), br#"{"id":1}"#);
    }

    #[test]
    fn non_success_keeps_body() {
        let response = Response::from_raw(raw(404, r#"{"error":"missing"}"#));

        assert_eq!(response.status(), 404);
        assert!(response.is_client_error());
        assert_eq!(response.body().as_ref(), br#"{"error":"missing"}"#);

        let err = response.error().expect("status error");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "HTTP 404 Not Found");
        assert_eq!(err.body(), Some(response.body()));
    }

    #[test]
    fn redirect_is_not_success() {
        let response = Response::from_raw(raw(304, ""));
        assert!(response.is_redirection());
        assert_eq!(response.error().and_then(Error::status), Some(304));
    }

    #[test]
    fn missing_body_is_empty() {
        let response = Response::from_raw(RawResponse::new(204, HeaderMap::new(), None));

        assert_eq!(response.status(), 204);
        assert!(response.body().is_empty());
        assert!(response.is_ok());
        assert!(response.raw().is_some_and(|raw| raw.body().is_none()));
    }

    #[test]
    fn from_error_is_zero_valued() {
        let response = Response::from_error(Error::connection("refused"));

        assert_eq!(response.status(), 0);
        assert!(response.body().is_empty());
        assert!(response.raw().is_none());
        assert!(response.error().is_some_and(Error::is_transport));
    }

    #[test]
    fn decode_json_into_map() {
        let response = Response::from_raw(raw(200, r#"{"foo":{"baz":[1,2,3]}}"#));
        let mut target: HashMap<String, serde_json::Value> = HashMap::new();

        let response = response.decode_json(&mut target);

        assert!(response.is_ok());
        assert_eq!(response.status(), 200);
        assert_eq!(target["foo"], serde_json::json!({"baz": [1, 2, 3]}));
    }

    #[test]
    fn decode_json_keeps_prior_error() {
        let response = Response::from_raw(raw(500, r#"{"retry":false}"#));
        let mut target: HashMap<String, bool> = HashMap::new();

        let response = response.decode_json(&mut target);

        assert_eq!(target.get("retry"), Some(&false));
        assert!(response.error().is_some_and(Error::is_server_error));
    }

    #[test]
    fn decode_json_empty_body_sets_error() {
        let response = Response::from_raw(raw(400, ""));
        let mut target: HashMap<String, serde_json::Value> = HashMap::new();

        let response = response.decode_json(&mut target);

        assert_eq!(response.status(), 400);
        assert!(response.body().is_empty());
        assert!(target.is_empty());
        assert!(response.error().is_some_and(Error::is_decode));
    }

    #[test]
    fn decode_xml_into_struct() {
        #[derive(Debug, Default, PartialEq, serde::Deserialize)]
        struct Note {
            to: String,
            body: String,
        }

        let response = Response::from_raw(raw(
            200,
            "<note><to>Tove</to><body>Don't forget me</body></note>",
        ));
        let mut note = Note::default();

        let response = response.decode_xml(&mut note);

        assert!(response.is_ok());
        assert_eq!(
            note,
            Note {
                to: "Tove".to_string(),
                body: "Don't forget me".to_string(),
            }
        );

        #[derive(Debug, Default, serde::Deserialize)]
        struct Other {
            #[allow(dead_code)]
            id: u32,
        }

        let response = response.decode_xml(&mut Other::default());
        assert!(matches!(response.error(), Some(Error::XmlDeserialization(_))));
        assert_eq!(response.status(), 200);
    }

    #[test]
    fn response_text_and_into_result() {
        let response = Response::from_raw(raw(200, "Hello, World!"));
        assert_eq!(response.text().expect("text"), "Hello, World!");
        assert!(response.into_result().is_ok());

        let response = Response::from_raw(raw(503, "down"));
        let err = response.into_result().expect_err("5xx");
        assert_eq!(err.status(), Some(503));
    }
}
