//! Fluent HTTP client for Rust.
//!
//! Configure a [`Cora`] client once (host override, default headers), then
//! issue requests with one method per HTTP verb. Bodies are encoded from any
//! `Serialize` value and their content type is inferred; every outcome,
//! including transport failures and non-2xx statuses, is returned as a
//! [`Response`] carrying at most one [`Error`].
//!
//! # Example
//!
//! ```ignore
//! use cora::prelude::*;
//!
//! #[derive(Debug, Default, Deserialize)]
//! pub struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! let client = Cora::new().set_headers([Header::single("Accept", "application/json")]);
//!
//! let mut user = User::default();
//! let response = client
//!     .get("https://api.example.com/users/42", &[])
//!     .await
//!     .decode_json(&mut user);
//!
//! match response.error() {
//!     Some(err) => eprintln!("failed: {err}"),
//!     None => println!("{user:?}"),
//! }
//! ```

mod client;
mod config;
mod connector;
pub mod middleware;
pub mod prelude;
mod transport;

// Re-export client types
pub use client::Cora;
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_TIMEOUT, Protocol};
pub use transport::{BoxedService, HyperTransport, HyperTransportBuilder, ServiceFuture};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use cora_core::{
    BodyEncoding, ContentType, Error, ErrorKind, Header, HeaderMode, Method, Payload, RawResponse,
    Request, RequestBuilder, Response, Result, SNIFF_LEN, Transport, apply_headers,
    detect_content_type, from_json, from_xml, infer_content_type, is_json, to_binary, to_json,
};

// Re-export http types for status codes and headers
pub use cora_core::{HeaderMap, StatusCode, Version, header};

pub use url;
