//! HTTPS connector using rustls.

use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;

use crate::Protocol;

/// Create an HTTPS connector with rustls for the given protocol.
///
/// Both variants accept plain `http` URLs as well. With
/// [`Protocol::Negotiated`] the connector offers HTTP/1.1 and HTTP/2 through
/// ALPN; with [`Protocol::Http2PriorKnowledge`] it only offers HTTP/2.
/// TLS uses the Mozilla root certificates.
#[must_use]
pub fn https_connector(protocol: Protocol) -> HttpsConnector<HttpConnector> {
    let root_store: rustls::RootCertStore =
        webpki_roots::TLS_SERVER_ROOTS.iter().cloned().collect();

    let tls_config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    let builder = HttpsConnectorBuilder::new()
        .with_tls_config(tls_config)
        .https_or_http();

    match protocol {
        Protocol::Negotiated => builder.enable_http1().enable_http2().build(),
        Protocol::Http2PriorKnowledge => builder.enable_http2().build(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_connectors() {
        let _negotiated = https_connector(Protocol::Negotiated);
        let _h2 = https_connector(Protocol::Http2PriorKnowledge);
    }
}
