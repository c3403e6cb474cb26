//! Error types for cora.
//!
//! A request never fails with a `Result`: whatever goes wrong is attached to
//! the [`Response`](crate::Response). [`Error::kind`] tells where in the
//! pipeline it happened, and therefore which response fields can be trusted.

use bytes::Bytes;
use derive_more::{Display, Error, From};

/// Where in the request pipeline an error was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ErrorKind {
    /// The request could not be built; nothing was sent.
    #[display("construction")]
    Construction,
    /// The exchange failed; status and body are empty.
    #[display("transport")]
    Transport,
    /// The server answered outside of `2xx`; status and body are real.
    #[display("status")]
    Status,
    /// The body could not be deserialized into the requested type.
    #[display("decode")]
    Decode,
}

/// Main error type for cora operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    // construction
    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),

    /// Header name or value rejected while building the request.
    #[display("invalid header: {_0}")]
    #[from(skip)]
    InvalidHeader(#[error(not(source))] String),

    /// Request that `http` refused to assemble.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// Body could not be encoded, neither as JSON nor as binary.
    #[display("body encoding error: {_0}")]
    #[from(skip)]
    Encoding(#[error(not(source))] String),

    // transport
    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// The exchange did not complete within the configured timeout.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    // status
    /// Non-`2xx` status.
    #[display("HTTP {code} {reason}")]
    #[from(skip)]
    Status {
        /// Status code.
        code: u16,
        /// Canonical reason phrase, `Unknown Status` when there is none.
        reason: String,
        /// Response body, also kept on the response.
        #[error(not(source))]
        body: Bytes,
    },

    // decode
    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// Path to the offending value (e.g. `user.address.city`).
        path: String,
        /// Error message.
        message: String,
    },

    /// XML deserialization error.
    #[display("XML deserialization error: {_0}")]
    #[from(skip)]
    XmlDeserialization(#[error(not(source))] String),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The error for a non-success status, named by its canonical reason.
    #[must_use]
    pub fn from_status(code: u16, body: Bytes) -> Self {
        let reason = http::StatusCode::from_u16(code)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("Unknown Status");
        Self::Status {
            code,
            reason: reason.to_string(),
            body,
        }
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create an invalid header error.
    #[must_use]
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader(message.into())
    }

    /// Create a body encoding error.
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding(message.into())
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an XML deserialization error.
    #[must_use]
    pub fn xml_deserialization(message: impl Into<String>) -> Self {
        Self::XmlDeserialization(message.into())
    }

    /// Pipeline stage that raised the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUrl(_)
            | Self::InvalidHeader(_)
            | Self::InvalidRequest(_)
            | Self::JsonSerialization(_)
            | Self::Encoding(_) => ErrorKind::Construction,
            Self::Connection(_) | Self::Tls(_) | Self::Timeout => ErrorKind::Transport,
            Self::Status { .. } => ErrorKind::Status,
            Self::JsonDeserialization { .. } | Self::XmlDeserialization(_) => ErrorKind::Decode,
        }
    }

    /// The request was never sent.
    #[must_use]
    pub const fn is_construction(&self) -> bool {
        matches!(self.kind(), ErrorKind::Construction)
    }

    /// The exchange with the server failed.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transport)
    }

    /// A response body failed to deserialize.
    #[must_use]
    pub const fn is_decode(&self) -> bool {
        matches!(self.kind(), ErrorKind::Decode)
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Status code of a [`Error::Status`].
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// `4xx` status.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|code| (400..500).contains(&code))
    }

    /// `5xx` status.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|code| (500..600).contains(&code))
    }

    /// `404 Not Found`.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Body of a [`Error::Status`].
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        match self {
            Self::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Decodes the body of a [`Error::Status`] as JSON.
    ///
    /// `None` for other errors, or when the server sent no body.
    pub fn decode_body<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T>> {
        self.body()
            .filter(|body| !body.is_empty())
            .map(|body| crate::from_json(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(Error::Timeout.to_string(), "request timeout");
        assert_eq!(
            Error::connection("failed to connect").to_string(),
            "connection error: failed to connect"
        );
        assert_eq!(
            Error::invalid_header("bad name").to_string(),
            "invalid header: bad name"
        );
        assert_eq!(
            Error::json_deserialization("user.address.city", "missing field `city`").to_string(),
            "JSON deserialization error at 'user.address.city': missing field `city`"
        );
    }

    #[test]
    fn from_status_uses_canonical_reason() {
        let err = Error::from_status(404, Bytes::from_static(b"{}"));
        assert_eq!(err.to_string(), "HTTP 404 Not Found");
        assert_eq!(err.body().map(Bytes::as_ref), Some(&b"{}"[..]));

        let err = Error::from_status(599, Bytes::new());
        assert_eq!(err.to_string(), "HTTP 599 Unknown Status");
    }

    #[test]
    fn status_helpers() {
        let err = Error::from_status(404, Bytes::new());
        assert_eq!(err.status(), Some(404));
        assert!(err.is_client_error());
        assert!(err.is_not_found());
        assert!(!err.is_server_error());

        let err = Error::from_status(500, Bytes::new());
        assert!(err.is_server_error());
        assert!(!err.is_not_found());

        assert_eq!(Error::Timeout.status(), None);
        assert!(!Error::Timeout.is_client_error());
    }

    #[test]
    fn kinds() {
        assert_eq!(Error::invalid_header("x").kind(), ErrorKind::Construction);
        assert_eq!(Error::encoding("x").kind(), ErrorKind::Construction);
        assert_eq!(Error::Timeout.kind(), ErrorKind::Transport);
        assert_eq!(Error::tls("handshake").kind(), ErrorKind::Transport);
        assert_eq!(
            Error::from_status(503, Bytes::new()).kind(),
            ErrorKind::Status
        );
        assert_eq!(Error::xml_deserialization("x").kind(), ErrorKind::Decode);
        assert_eq!(ErrorKind::Transport.to_string(), "transport");

        assert!(Error::connection("refused").is_transport());
        assert!(Error::json_deserialization("", "x").is_decode());
        assert!(!Error::from_status(500, Bytes::new()).is_transport());
    }

    #[test]
    fn url_errors_convert() {
        let err = Error::from(url::Url::parse("no scheme").expect_err("relative URL"));
        assert!(err.is_construction());
        assert!(err.to_string().starts_with("invalid URL"));
    }

    #[test]
    fn decode_status_body() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct ApiError {
            error: String,
        }

        let err = Error::from_status(404, Bytes::from(r#"{"error": "not found"}"#));
        let decoded = err
            .decode_body::<ApiError>()
            .expect("has body")
            .expect("decodes");
        assert_eq!(decoded.error, "not found");

        assert!(
            Error::from_status(404, Bytes::new())
                .decode_body::<ApiError>()
                .is_none()
        );
        assert!(Error::Timeout.decode_body::<ApiError>().is_none());
    }
}
