//! Error types for clasp.

use derive_more::{Display, Error, From};

/// Maximum number of input characters echoed back in a decode error.
const INPUT_EXCERPT_LEN: usize = 256;

// ============================================================================
// Error Type
// ============================================================================

/// Main error type for clasp operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// HTTP-level errors (non-2xx status codes).
    #[display("HTTP error {status}: {message}")]
    #[from(skip)]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
        /// Response body, if available.
        #[error(not(source))]
        body: Option<bytes::Bytes>,
    },

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// Request timeout.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// Invalid request configuration.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),

    /// A successful response did not carry a JSON content type.
    #[display(
        "expected JSON response but got {} (status {status})",
        content_type.as_deref().unwrap_or("no content type")
    )]
    #[from(skip)]
    NonJsonResponse {
        /// HTTP status code.
        status: u16,
        /// Bare content type of the response, if any.
        #[error(not(source))]
        content_type: Option<String>,
    },

    /// Input is not valid JSON or nests too deeply.
    #[display("JSON decode error: {message} in: {input}")]
    #[from(skip)]
    Decode {
        /// Excerpt of the offending input.
        input: String,
        /// Error message.
        message: String,
    },

    /// Value could not be serialized to JSON.
    #[display("JSON encode error: {_0}")]
    #[from(skip)]
    Encode(#[error(not(source))] String),

    /// Decoded value does not have the expected shape.
    #[display("expected {expected}, got {actual}")]
    #[from(skip)]
    TypeMismatch {
        /// Expected shape.
        expected: &'static str,
        /// Observed shape.
        actual: &'static str,
    },

    /// Malformed or truncated data while streaming JSON.
    #[display("JSON stream parse error: {_0}")]
    #[from(skip)]
    StreamParse(#[error(not(source))] String),

    /// The body stream reports itself as not readable.
    #[display("stream is not readable")]
    #[from(skip)]
    StreamUnreadable,

    /// The body was already consumed incrementally.
    #[display("body is not available after streaming")]
    #[from(skip)]
    BodyUnavailable,

    /// A required header is absent (or ambiguous).
    #[display("missing header: {_0}")]
    #[from(skip)]
    MissingHeader(#[error(not(source))] String),

    /// The body is not valid UTF-8 text.
    #[display("body is not valid UTF-8: {_0}")]
    #[from]
    InvalidUtf8(std::str::Utf8Error),

    /// Typed JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "user.address.city").
        path: String,
        /// Error message.
        message: String,
    },
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an HTTP error from status code and message.
    #[must_use]
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            body: None,
        }
    }

    /// Create an HTTP error with body.
    #[must_use]
    pub fn http_with_body(status: u16, message: impl Into<String>, body: bytes::Bytes) -> Self {
        Self::Http {
            status,
            message: message.into(),
            body: Some(body),
        }
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a decode error, keeping a bounded excerpt of the input.
    #[must_use]
    pub fn decode(input: &[u8], message: impl Into<String>) -> Self {
        let text = String::from_utf8_lossy(input);
        let mut input: String = text.chars().take(INPUT_EXCERPT_LEN).collect();
        if input.len() < text.len() {
            input.push_str("...");
        }
        Self::Decode {
            input,
            message: message.into(),
        }
    }

    /// Create an encode error.
    #[must_use]
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode(message.into())
    }

    /// Create a type mismatch error.
    #[must_use]
    pub const fn type_mismatch(expected: &'static str, actual: &'static str) -> Self {
        Self::TypeMismatch { expected, actual }
    }

    /// Create a stream parse error.
    #[must_use]
    pub fn stream_parse(message: impl Into<String>) -> Self {
        Self::StreamParse(message.into())
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection or TLS error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Tls(_))
    }

    /// Returns `true` if this error came from reading or decoding JSON.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(
            self,
            Self::Decode { .. }
                | Self::Encode(_)
                | Self::TypeMismatch { .. }
                | Self::StreamParse(_)
                | Self::JsonDeserialization { .. }
        )
    }

    /// Returns the HTTP status code if this is an HTTP error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } | Self::NonJsonResponse { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if this is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// Returns `true` if this is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| (500..600).contains(&s))
    }

    /// Returns `true` if this is a 404 Not Found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http { status: 404, .. })
    }

    /// Returns the response body if this is an HTTP error with a body.
    #[must_use]
    pub fn body(&self) -> Option<&bytes::Bytes> {
        match self {
            Self::Http { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Try to decode the HTTP error body as JSON.
    ///
    /// Returns `Some(Ok(value))` if the error has a body and it deserializes successfully,
    /// `Some(Err(error))` if the body exists but deserialization fails,
    /// or `None` if there is no body or this is not an HTTP error.
    ///
    /// # Example
    ///
    /// ```ignore
    /// #[derive(Debug, Deserialize)]
    /// struct ApiError {
    ///     code: String,
    ///     message: String,
    /// }
    ///
    /// match client.get(url, RequestOptions::default()).await {
    ///     Ok(response) => println!("{response}"),
    ///     Err(e) => {
    ///         if let Some(Ok(api_error)) = e.decode_body::<ApiError>() {
    ///             println!("API error: {} - {}", api_error.code, api_error.message);
    ///         }
    ///     }
    /// }
    /// ```
    pub fn decode_body<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T>> {
        self.body().map(|body| crate::from_json(body))
    }
}
