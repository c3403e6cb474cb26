//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and functions
//! for easy glob importing:
//!
//! ```ignore
//! use cora_core::prelude::*;
//! ```

pub use crate::{
    ContentType, Error, Header, Method, Payload, RawResponse, Request, RequestBuilder, Response,
    Result, Transport, from_json, from_xml, to_json,
};
