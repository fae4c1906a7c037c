//! HTTP transport using hyper-util.

use std::error::Error as StdError;

use bytes::Bytes;
use clasp_core::{BodyMode, Error, Headers, Request, Response, Result, Transport};
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use tokio::sync::mpsc;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, trace};

use crate::{ChannelStream, ClientConfig, connector::https_connector};

/// [`Transport`] over a pooled hyper-util client with rustls TLS.
///
/// Must be used from within a tokio runtime.
///
/// # Example
///
/// ```ignore
/// use clasp::{ClientConfig, HyperTransport};
/// use std::time::Duration;
///
/// let transport = HyperTransport::with_config(
///     ClientConfig::builder().timeout(Duration::from_secs(5)).build(),
/// );
/// ```
#[derive(Clone)]
pub struct HyperTransport {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    config: ClientConfig,
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperTransport {
    /// Create a transport with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Create a transport with custom configuration.
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        let connector = https_connector(&config);

        let inner = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_idle_per_host)
            .build(connector);

        Self { inner, config }
    }

    /// Get the transport configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn build_hyper_request(request: Request) -> Result<http::Request<Full<Bytes>>> {
        let (method, url, headers, body) = request.into_parts();

        let mut builder = http::Request::builder().method(method).uri(url.as_str());
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let body = body.map_or_else(Full::default, Full::new);
        builder
            .body(body)
            .map_err(|e| Error::invalid_request(e.to_string()))
    }
}

impl Transport for HyperTransport {
    async fn execute(&self, request: Request, mode: BodyMode) -> Result<Response> {
        let hyper_request = Self::build_hyper_request(request)?;
        let deadline = Instant::now() + self.config.timeout;

        let response = timeout_at(deadline, self.inner.request(hyper_request))
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(|e| map_hyper_error(&e))?;

        let status = response.status().as_u16();
        let headers = Headers::from(response.headers());
        let mut body = response.into_body();

        match mode {
            BodyMode::Buffered => {
                let bytes = timeout_at(deadline, body.collect())
                    .await
                    .map_err(|_| Error::Timeout)?
                    .map_err(|e| Error::connection(e.to_string()))?
                    .to_bytes();
                debug!(status, len = bytes.len(), "buffered response body");
                Ok(Response::from_bytes(status, headers, bytes))
            }
            BodyMode::Streamed => {
                let (sender, receiver) = mpsc::channel(self.config.stream_channel_capacity.max(1));
                let chunk_timeout = self.config.timeout;
                tokio::spawn(async move {
                    loop {
                        let chunk = match timeout(chunk_timeout, body.frame()).await {
                            Err(_) => Err(Error::Timeout),
                            Ok(None) => break,
                            Ok(Some(Err(e))) => Err(Error::connection(e.to_string())),
                            Ok(Some(Ok(frame))) => match frame.into_data() {
                                Ok(data) => Ok(data),
                                Err(_) => continue,
                            },
                        };
                        let failed = chunk.is_err();
                        if sender.send(chunk).await.is_err() {
                            trace!("streamed body dropped before the end");
                            break;
                        }
                        if failed {
                            break;
                        }
                    }
                });
                Ok(Response::new(status, headers, ChannelStream::new(receiver)))
            }
        }
    }
}

/// Classify a hyper-util client error by walking its source chain.
fn map_hyper_error(err: &hyper_util::client::legacy::Error) -> Error {
    let mut message = err.to_string();
    let mut timed_out = false;

    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            timed_out |= io.kind() == std::io::ErrorKind::TimedOut;
        }
        source = cause.source();
    }

    if timed_out {
        return Error::Timeout;
    }

    let lower = message.to_ascii_lowercase();
    if ["ssl", "tls", "certificate"]
        .iter()
        .any(|marker| lower.contains(marker))
    {
        return Error::tls(message);
    }

    Error::connection(message)
}
