//! Tower middleware layers for the cora HTTP transport.
//!
//! Layers wrap the [`HyperTransport`](crate::HyperTransport) service and see
//! every [`Request`](crate::Request) before it reaches hyper. Add them with
//! [`HyperTransportBuilder::layer`](crate::HyperTransportBuilder::layer) or
//! the `with_*` helpers.
//!
//! # Available Layers
//!
//! - [`LoggingLayer`] - Logs requests/responses using `tracing`
//!
//! # Example
//!
//! ```ignore
//! use cora::{Cora, HyperTransport};
//!
//! let transport = HyperTransport::builder().with_logging().build();
//! let client = Cora::with_transport(transport);
//! ```

mod logging;

pub use logging::{LogLevel, Logging, LoggingLayer};

// Re-export tower types for convenience
pub use tower::{Layer, ServiceBuilder};
