//! Core types and traits for the cora fluent HTTP client.
//!
//! This crate provides the transport-agnostic pieces used by cora:
//! - [`Method`] - HTTP method enum
//! - [`Header`] and [`apply_headers`] - multi-value headers and merge policy
//! - [`Payload`] - request body with JSON/binary encoding
//! - [`detect_content_type`] and [`infer_content_type`] - content-type inference
//! - [`Request`] and [`RequestBuilder`] - outgoing requests
//! - [`RawResponse`] and [`Response`] - transport output and uniform response
//! - [`Transport`] - the HTTP transport capability
//! - [`Error`] and [`Result`] - Error handling
//! - [`StatusCode`] - HTTP status codes (re-exported from `http` crate)
//! - [`header`] - HTTP header names (re-exported from `http` crate)

mod body;
mod error;
mod headers;
mod method;
pub mod prelude;
mod request;
mod response;
mod sniff;
mod transport;

pub use body::{
    BodyEncoding, ContentType, Payload, from_json, from_xml, infer_content_type, is_json,
    to_binary, to_json,
};
pub use error::{Error, ErrorKind, Result};
pub use headers::{Header, HeaderMode, apply_headers};
pub use method::Method;
pub use request::{Request, RequestBuilder};
pub use response::{RawResponse, Response};
pub use sniff::{SNIFF_LEN, detect_content_type};
pub use transport::Transport;

// Re-export http crate types for status codes and headers
pub use http::{HeaderMap, StatusCode, Version, header};
