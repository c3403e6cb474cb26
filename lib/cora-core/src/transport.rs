//! The transport capability.
//!
//! A [`Transport`] performs the network exchange for one [`Request`]: dial,
//! TLS, protocol framing, timeout, and draining the body. Cora's request
//! pipeline only depends on this trait, so tests can substitute a fake.
//!
//! # Example
//!
//! ```
//! use cora_core::{RawResponse, Request, Result, Transport};
//! use http::HeaderMap;
//!
//! /// Answers every request with `204 No Content`.
//! struct NoContent;
//!
//! impl Transport for NoContent {
//!     async fn execute(&self, _request: Request) -> Result<RawResponse> {
//!         Ok(RawResponse::new(204, HeaderMap::new(), None))
//!     }
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use crate::{RawResponse, Request, Result};

/// Executes HTTP requests.
pub trait Transport: Send + Sync {
    /// Execute an HTTP request and return the buffered response.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails for any reason:
    /// - Network errors
    /// - TLS errors
    /// - Timeouts
    ///
    /// A response with a non-success status is not an error at this level.
    fn execute(&self, request: Request) -> impl Future<Output = Result<RawResponse>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn execute(&self, request: Request) -> impl Future<Output = Result<RawResponse>> + Send {
        (**self).execute(request)
    }
}

impl<T: Transport> Transport for &T {
    fn execute(&self, request: Request) -> impl Future<Output = Result<RawResponse>> + Send {
        (**self).execute(request)
    }
}

#[cfg(test)]
mod tests {
    use http::HeaderMap;

    use super::*;
    use crate::Method;

    struct Echo;

    impl Transport for Echo {
        async fn execute(&self, request: Request) -> Result<RawResponse> {
            Ok(RawResponse::new(
                200,
                request.headers().clone(),
                request.body().cloned(),
            ))
        }
    }

    async fn call(transport: impl Transport) -> RawResponse {
        let url = url::Url::parse("http://localhost/echo").expect("url");
        let request = Request::builder(Method::Put, url).body("ping").build();
        transport.execute(request).await.expect("response")
    }

    #[tokio::test]
    async fn shared_and_borrowed_transports() {
        let shared = Arc::new(Echo);
        assert_eq!(call(Arc::clone(&shared)).await.status(), 200);

        let response = call(&Echo).await;
        assert_eq!(response.body().map(|body| &body[..]), Some(&b"ping"[..]));
        assert_eq!(response.headers(), &HeaderMap::new());
    }
}
