//! JSON API client.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use clasp_core::{
    BodyMode, Error, Logger, Method, Request, Response, Result, TracingLogger, Transport,
};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::{ClientConfig, HyperTransport};

/// Per-request policy for [`JsonClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOptions {
    /// Return non-2xx responses instead of failing with [`Error::Http`].
    pub allow_failure: bool,
    /// Read the body on demand instead of buffering it.
    pub stream: bool,
    /// Fail with [`Error::NonJsonResponse`] when a 2xx response is not JSON.
    pub require_json: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            allow_failure: false,
            stream: false,
            require_json: true,
        }
    }
}

impl RequestOptions {
    /// Set whether non-2xx responses are returned as is.
    #[must_use]
    pub const fn allow_failure(mut self, allow: bool) -> Self {
        self.allow_failure = allow;
        self
    }

    /// Set whether the body is streamed.
    #[must_use]
    pub const fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Set whether successful responses must declare a JSON content type.
    #[must_use]
    pub const fn require_json(mut self, require: bool) -> Self {
        self.require_json = require;
        self
    }

    const fn body_mode(self) -> BodyMode {
        if self.stream {
            BodyMode::Streamed
        } else {
            BodyMode::Buffered
        }
    }
}

/// Client for JSON APIs over any [`Transport`].
///
/// Transport failures propagate with their classified kind. Non-2xx statuses
/// become [`Error::Http`] unless [`RequestOptions::allow_failure`] is set.
/// Every returned [`Response`] reports header warnings to the client's logger.
///
/// # Example
///
/// ```ignore
/// use clasp::{JsonClient, RequestOptions};
///
/// let client = JsonClient::default();
/// let response = client.get("https://api.example.com/users", RequestOptions::default()).await?;
/// let users: Vec<User> = response.json_as()?;
/// ```
pub struct JsonClient<T = HyperTransport> {
    transport: T,
    extra_headers: Vec<(String, String)>,
    logger: Arc<dyn Logger>,
}

impl<T: std::fmt::Debug> std::fmt::Debug for JsonClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonClient")
            .field("transport", &self.transport)
            .field("extra_headers", &self.extra_headers)
            .finish_non_exhaustive()
    }
}

impl JsonClient<HyperTransport> {
    /// Create a client over a [`HyperTransport`] with custom configuration.
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        Self::new(HyperTransport::with_config(config))
    }
}

impl Default for JsonClient<HyperTransport> {
    fn default() -> Self {
        Self::new(HyperTransport::new())
    }
}

impl<T: Transport> JsonClient<T> {
    /// Create a client over `transport`, logging through `tracing`.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            extra_headers: Vec::new(),
            logger: Arc::new(TracingLogger),
        }
    }

    /// Replace the logger handed to every response.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Send `name: value` with every request, unless the request sets the
    /// header itself. Setting the same name again replaces the value.
    pub fn set_extra_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .extra_headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(&name))
        {
            Some(entry) => *entry = (name, value),
            None => self.extra_headers.push((name, value)),
        }
    }

    /// The underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Send a GET request.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, or as [`JsonClient::request`].
    pub async fn get(&self, url: &str, options: RequestOptions) -> Result<Response> {
        let url = url::Url::parse(url)?;
        let request = Request::builder(Method::GET, url)
            .header("Accept", "application/json")
            .build();
        self.request(request, options).await
    }

    /// Send a POST request with a raw body.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, or as [`JsonClient::request`].
    pub async fn post(
        &self,
        url: &str,
        body: impl Into<Bytes>,
        content_type: &str,
        options: RequestOptions,
    ) -> Result<Response> {
        let url = url::Url::parse(url)?;
        let request = Request::builder(Method::POST, url)
            .header("Accept", "application/json")
            .header("Content-Type", content_type)
            .body(body)
            .build();
        self.request(request, options).await
    }

    /// Send a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the value cannot be encoded,
    /// or as [`JsonClient::request`].
    pub async fn post_json<B: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        value: &B,
        options: RequestOptions,
    ) -> Result<Response> {
        let url = url::Url::parse(url)?;
        let request = Request::builder(Method::POST, url)
            .header("Accept", "application/json")
            .json(value)?
            .build();
        self.request(request, options).await
    }

    /// Send a request and apply the response policy.
    ///
    /// # Errors
    ///
    /// - Transport errors ([`Error::Connection`], [`Error::Tls`], [`Error::Timeout`], ...)
    /// - [`Error::Http`] for a non-2xx status without `allow_failure`
    /// - [`Error::NonJsonResponse`] for a non-JSON 2xx response with `require_json`
    pub async fn request(&self, mut request: Request, options: RequestOptions) -> Result<Response> {
        for (name, value) in &self.extra_headers {
            request.set_default_header(name.as_str(), value.as_str());
        }

        let method = request.method().clone();
        let url = request.url().clone();
        let sent_headers = summarize_headers(request.headers());
        let mode = options.body_mode();

        let span = info_span!("http_request", %method, %url);
        debug!(parent: &span, headers = %sent_headers, ?mode, "sending request");

        let start = Instant::now();
        let result = self
            .transport
            .execute(request, mode)
            .instrument(span.clone())
            .await;
        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let response = match result {
            Ok(response) => response.with_logger(Arc::clone(&self.logger)),
            Err(err) => {
                warn!(parent: &span, error = %err, elapsed_ms, "request failed");
                return Err(err);
            }
        };

        let status = response.status();
        if response.is_success() {
            info!(parent: &span, status, elapsed_ms, "request completed");
        } else {
            warn!(parent: &span, status, elapsed_ms, "request failed with HTTP error");
        }

        if !response.is_success() && !options.allow_failure {
            let message = format!("{method} {url} with headers [{sent_headers}]");
            let body = match mode {
                BodyMode::Buffered => response.body_bytes().ok().cloned(),
                BodyMode::Streamed => None,
            };
            return Err(match body {
                Some(body) => Error::http_with_body(status, message, body),
                None => Error::http(status, message),
            });
        }

        if options.require_json && response.is_success() && !response.is_json() {
            let content_type = response.bare_content_type();
            warn!(parent: &span, status, ?content_type, "expected a JSON response");
            return Err(Error::NonJsonResponse {
                status,
                content_type,
            });
        }

        Ok(response)
    }
}

fn summarize_headers(headers: &[(String, String)]) -> String {
    headers
        .iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect::<Vec<_>>()
        .join(", ")
}
