//! Body encoding, decoding and content-type inference.

use bytes::Bytes;
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};

use crate::{Error, Result, detect_content_type};

/// Well-known content types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// JSON content type (`application/json`).
    Json,
    /// XML content type (`application/xml`).
    Xml,
    /// Plain text content type (`text/plain`).
    PlainText,
    /// Binary content type (`application/octet-stream`).
    OctetStream,
}

impl ContentType {
    /// Get the MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xml => "application/xml",
            Self::PlainText => "text/plain",
            Self::OctetStream => "application/octet-stream",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a [`Payload`] was turned into bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyEncoding {
    /// Bytes given by the caller, untouched.
    Raw,
    /// JSON serialization of a value.
    Json,
    /// Binary serialization of a value JSON could not represent.
    Binary,
}

/// A request body.
///
/// Raw bytes are sent verbatim. Serializable values are encoded as JSON, or
/// with a compact binary encoding when JSON cannot represent them (for
/// example maps with non-string keys).
///
/// Encoding happens when the payload is built; a failure is kept and reported
/// in the [`Response`](crate::Response) of the request that carries it.
///
/// # Example
///
/// ```
/// use cora_core::{BodyEncoding, Payload};
/// use std::collections::BTreeMap;
///
/// let raw = Payload::from("hello");
/// assert_eq!(raw.encoding(), Some(BodyEncoding::Raw));
///
/// let json = Payload::value(&serde_json::json!({"id": 1}));
/// assert_eq!(json.encoding(), Some(BodyEncoding::Json));
///
/// let tuple_keys = BTreeMap::from([((1, 2), "x")]);
/// assert_eq!(Payload::value(&tuple_keys).encoding(), Some(BodyEncoding::Binary));
/// ```
#[derive(Debug)]
pub struct Payload(Repr);

#[derive(Debug)]
enum Repr {
    Encoded(BodyEncoding, Bytes),
    Failed(Error),
}

impl Payload {
    /// Raw bytes, sent as is.
    #[must_use]
    pub fn bytes(bytes: impl Into<Bytes>) -> Self {
        Self(Repr::Encoded(BodyEncoding::Raw, bytes.into()))
    }

    /// A serializable value: JSON first, binary as a fallback.
    #[must_use]
    pub fn value<T: Serialize + ?Sized>(value: &T) -> Self {
        let repr = match to_json(value) {
            Ok(bytes) => Repr::Encoded(BodyEncoding::Json, bytes),
            Err(json_err) => match to_binary(value) {
                Ok(bytes) => Repr::Encoded(BodyEncoding::Binary, bytes),
                Err(binary_err) => Repr::Failed(Error::encoding(format!(
                    "{json_err}; binary fallback: {binary_err}"
                ))),
            },
        };
        Self(repr)
    }

    /// The encoding used, or `None` if the value could not be encoded.
    #[must_use]
    pub const fn encoding(&self) -> Option<BodyEncoding> {
        match &self.0 {
            Repr::Encoded(encoding, _) => Some(*encoding),
            Repr::Failed(_) => None,
        }
    }

    /// Consume into the encoded bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] if the value could not be encoded.
    pub fn into_bytes(self) -> Result<Bytes> {
        match self.0 {
            Repr::Encoded(_, bytes) => Ok(bytes),
            Repr::Failed(err) => Err(err),
        }
    }
}

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self {
        Self::bytes(bytes)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::bytes(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Self::bytes(Bytes::copy_from_slice(bytes))
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::bytes(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::bytes(Bytes::copy_from_slice(text.as_bytes()))
    }
}

/// Serialize a value to JSON bytes.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Example
///
/// ```
/// use cora_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct User { name: String }
///
/// let user = User { name: "Alice".to_string() };
/// let bytes = to_json(&user).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"name":"Alice"}"#);
/// ```
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Serialize a value with the binary fallback encoding (`bincode`).
///
/// # Errors
///
/// Returns [`Error::Encoding`] if the value cannot be serialized.
pub fn to_binary<T: Serialize + ?Sized>(value: &T) -> Result<Bytes> {
    bincode::serialize(value)
        .map(Bytes::from)
        .map_err(|e| Error::encoding(e.to_string()))
}

/// Deserialize JSON bytes to a value with path-aware error messages.
///
/// Uses `serde_path_to_error` so the message includes the path to the field
/// that failed to deserialize.
///
/// # Errors
///
/// Returns [`Error::JsonDeserialization`] if deserialization fails.
///
/// # Example
///
/// ```
/// use cora_core::from_json;
/// use serde::Deserialize;
///
/// #[derive(Debug, PartialEq, Deserialize)]
/// struct User { name: String }
///
/// let bytes = br#"{"name":"Alice"}"#;
/// let user: User = from_json(bytes).expect("deserialize");
/// assert_eq!(user, User { name: "Alice".to_string() });
/// ```
pub fn from_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}

/// Deserialize XML bytes to a value.
///
/// # Errors
///
/// Returns [`Error::XmlDeserialization`] if the bytes are not UTF-8 or do not
/// match the target type.
///
/// # Example
///
/// ```
/// use cora_core::from_xml;
/// use serde::Deserialize;
///
/// #[derive(Debug, PartialEq, Deserialize)]
/// struct User { name: String }
///
/// let user: User = from_xml(b"<user><name>Alice</name></user>").expect("deserialize");
/// assert_eq!(user, User { name: "Alice".to_string() });
/// ```
pub fn from_xml<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let text = std::str::from_utf8(bytes).map_err(|e| Error::xml_deserialization(e.to_string()))?;
    quick_xml::de::from_str(text).map_err(|e| Error::xml_deserialization(e.to_string()))
}

/// Returns `true` if `bytes` hold one well-formed JSON document.
#[must_use]
pub fn is_json(bytes: &[u8]) -> bool {
    serde_json::from_slice::<IgnoredAny>(bytes).is_ok()
}

/// Content type for a request body the caller did not describe.
///
/// JSON documents are `application/json`, anything else is sniffed with
/// [`detect_content_type`].
#[must_use]
pub fn infer_content_type(bytes: &[u8]) -> &'static str {
    if is_json(bytes) {
        ContentType::Json.as_str()
    } else {
        detect_content_type(bytes)
    }
}
