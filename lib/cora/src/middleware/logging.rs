//! Exchange logging middleware.
//!
//! Wraps the transport service and reports each exchange through `tracing`:
//! one event when the request leaves, one when the raw response (or the
//! transport error) comes back. Status classification is left to the client
//! pipeline, this layer only observes.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use tower::{Layer, Service};
use tracing::{Instrument, Level, debug, info, span, warn};

use crate::{Error, RawResponse, Request, Result};

/// Layer that adds exchange logging to a transport.
///
/// # Example
///
/// ```ignore
/// use cora::HyperTransport;
/// use cora::middleware::LoggingLayer;
///
/// let transport = HyperTransport::builder()
///     .layer(LoggingLayer::debug())
///     .build();
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLayer {
    level: LogLevel,
}

/// How much the logging middleware reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Summary at info, plus headers, host override and sizes at debug.
    Debug,
    /// Summary only.
    #[default]
    Info,
}

impl LoggingLayer {
    /// Summary logging.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Detailed logging.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            level: LogLevel::Debug,
        }
    }

    /// The configured level.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = Logging<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Logging {
            inner,
            level: self.level,
        }
    }
}

/// Service produced by [`LoggingLayer`].
#[derive(Debug, Clone)]
pub struct Logging<S> {
    inner: S,
    level: LogLevel,
}

impl<S> Logging<S> {
    /// Wraps `inner` with summary logging.
    #[must_use]
    pub fn new(inner: S) -> Self {
        LoggingLayer::new().layer(inner)
    }
}

impl<S> Service<Request> for Logging<S>
where
    S: Service<Request, Response = RawResponse, Error = Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = RawResponse;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<RawResponse>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let span = span!(
            Level::INFO,
            "http_exchange",
            method = %request.method(),
            url = %request.url()
        );
        let level = self.level;
        let mut inner = self.inner.clone();

        Box::pin(
            async move {
                log_request(level, &request);

                let start = Instant::now();
                let result = inner.call(request).await;
                log_outcome(level, &result, start.elapsed());

                result
            }
            .instrument(span),
        )
    }
}

fn log_request(level: LogLevel, request: &Request) {
    info!("exchange started");
    if level == LogLevel::Debug {
        debug!(
            host = request.host(),
            headers = ?request.headers(),
            body_len = request.body().map_or(0, bytes::Bytes::len),
            "request details"
        );
    }
}

fn log_outcome(level: LogLevel, result: &Result<RawResponse>, elapsed: Duration) {
    let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    match result {
        Ok(response) => {
            info!(status = response.status(), elapsed_ms, "exchange finished");
            if level == LogLevel::Debug {
                debug!(
                    version = ?response.version(),
                    headers = ?response.headers(),
                    body_len = response.body().map_or(0, bytes::Bytes::len),
                    "response details"
                );
            }
        }
        Err(err) if err.is_timeout() => warn!(elapsed_ms, "exchange timed out"),
        Err(err) => warn!(error = %err, elapsed_ms, "exchange failed"),
    }
}

#[cfg(test)]
mod tests {
    use http::HeaderMap;
    use tower::{ServiceExt, service_fn};

    use super::*;
    use crate::Method;

    fn request() -> Request {
        let url = url::Url::parse("http://localhost/logged").expect("url");
        Request::builder(Method::Get, url).build()
    }

    #[test]
    fn levels() {
        assert_eq!(LoggingLayer::new().level(), LogLevel::Info);
        assert_eq!(LoggingLayer::debug().level(), LogLevel::Debug);
        assert_eq!(Logging::new(()).level, LogLevel::Info);
        assert_eq!(LoggingLayer::debug().layer(()).level, LogLevel::Debug);
    }

    #[tokio::test]
    async fn passes_responses_through() {
        let inner = service_fn(|_request: Request| async {
            Ok::<_, Error>(RawResponse::new(418, HeaderMap::new(), None))
        });

        let response = LoggingLayer::debug()
            .layer(inner)
            .oneshot(request())
            .await
            .expect("response");

        assert_eq!(response.status(), 418);
    }

    #[tokio::test]
    async fn passes_errors_through() {
        let inner =
            service_fn(|_request: Request| async { Err::<RawResponse, _>(Error::Timeout) });

        let err = Logging::new(inner)
            .oneshot(request())
            .await
            .expect_err("timeout");

        assert!(err.is_timeout());
    }
}
