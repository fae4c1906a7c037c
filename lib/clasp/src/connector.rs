//! Connector used by [`crate::HyperTransport`] to open connections.

use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;

use crate::ClientConfig;

/// Build the connector behind every [`crate::HyperTransport`].
///
/// TLS goes through rustls with the Mozilla roots from `webpki-roots`, so
/// certificate failures surface as [`crate::Error::Tls`]. Plain `http://`
/// URLs are accepted as well. ALPN offers HTTP/2 and HTTP/1.1. The TCP
/// connect is bounded by [`ClientConfig::connect_timeout`].
#[must_use]
pub fn https_connector(config: &ClientConfig) -> HttpsConnector<HttpConnector> {
    let root_store: rustls::RootCertStore =
        webpki_roots::TLS_SERVER_ROOTS.iter().cloned().collect();

    let tls_config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    let mut http = HttpConnector::new();
    http.enforce_http(false);
    http.set_connect_timeout(Some(config.connect_timeout));

    HttpsConnectorBuilder::new()
        .with_tls_config(tls_config)
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .wrap_connector(http)
}
