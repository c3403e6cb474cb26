//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and functions
//! for easy glob importing:
//!
//! ```ignore
//! use cora::prelude::*;
//! ```

pub use crate::{
    ClientConfig, ContentType, Cora, Error, Header, HeaderMode, HyperTransport, Method, Payload,
    Response, Result, StatusCode, Transport, from_json, from_xml, header, to_json,
};
pub use serde::{Deserialize, Serialize};
