//! HTTP response envelope.
//!
//! [`Response`] wraps a status code, normalized headers and a single-pass body
//! stream. The body can be consumed in exactly one of two ways:
//!
//! - fully, with [`Response::body`] or [`Response::json`], which cache the result
//! - incrementally, with [`Response::stream_body`] or [`Response::stream_json`]
//!
//! # Example
//!
//! ```
//! use clasp_core::{Headers, MemoryStream, Response};
//!
//! let headers: Headers = [("Content-Type", ["application/json"])].into_iter().collect();
//! let response = Response::new(200, headers, MemoryStream::new(r#"{"id": 1}"#));
//!
//! assert!(response.is_json());
//! assert_eq!(response.json()?["id"], 1);
//! # Ok::<(), clasp_core::Error>(())
//! ```

use std::cell::{Cell, OnceCell, RefCell};
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use serde_json::{Map, Value};

use crate::decoder::{JsonStream, StreamOptions};
use crate::json::{Container, JsonCodec, from_value};
use crate::logger::Logger;
use crate::stream::{BodyStream, MemoryStream};
use crate::{Error, Headers, Result};

/// Placeholder shown by [`Response`]'s `Display` when the body cannot be read.
pub const BODY_NOT_AVAILABLE: &str = "[Body not available]";

/// How far the body stream has been consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyState {
    /// Nothing read yet.
    #[default]
    Unread,
    /// Fully read and cached.
    Read,
    /// Partially consumed, incrementally or by a failed read.
    Streamed,
    /// End of data reached incrementally.
    Gone,
}

/// An HTTP response with a lazily consumed body.
///
/// A response is `Send` but not `Sync`: the caches are single-threaded cells.
pub struct Response {
    status: u16,
    headers: Headers,
    body: RefCell<Box<dyn BodyStream + Send>>,
    state: Cell<BodyState>,
    raw: OnceCell<Bytes>,
    json: OnceCell<Value>,
    codec: JsonCodec,
    logger: Option<Arc<dyn Logger>>,
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("state", &self.state.get())
            .finish_non_exhaustive()
    }
}

impl Response {
    /// Creates a response over a body stream.
    #[must_use]
    pub fn new(status: u16, headers: Headers, body: impl BodyStream + Send + 'static) -> Self {
        Self {
            status,
            headers,
            body: RefCell::new(Box::new(body)),
            state: Cell::new(BodyState::Unread),
            raw: OnceCell::new(),
            json: OnceCell::new(),
            codec: JsonCodec::default(),
            logger: None,
        }
    }

    /// Creates a response over an in-memory body.
    #[must_use]
    pub fn from_bytes(status: u16, headers: Headers, body: impl Into<Bytes>) -> Self {
        Self::new(status, headers, MemoryStream::new(body))
    }

    /// Report non-fatal conditions to `logger`.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Decode the body with `codec`.
    #[must_use]
    pub const fn with_codec(mut self, codec: JsonCodec) -> Self {
        self.codec = codec;
        self
    }

    // ------------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------------

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Status is 3xx and a `location` header is present.
    #[must_use]
    pub fn is_redirect(&self) -> bool {
        self.status >= 300 && self.status < 400 && self.has_header("location")
    }

    /// Status is 4xx.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Status is 5xx.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }

    /// Progress of the body stream.
    #[must_use]
    pub fn body_state(&self) -> BodyState {
        self.state.get()
    }

    // ------------------------------------------------------------------------
    // Headers
    // ------------------------------------------------------------------------

    /// Normalized headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// All values of a header, matched case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&[String]> {
        self.headers.get(name)
    }

    /// Whether a header is present, matched case-insensitively.
    #[must_use]
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains(name)
    }

    /// A single header value.
    ///
    /// With several values and `consolidate` set, they are joined with `", "`.
    /// Without it the header is treated as absent and the logger, if any,
    /// receives one warning.
    #[must_use]
    pub fn one_header(&self, name: &str, consolidate: bool) -> Option<String> {
        match self.headers.get(name)? {
            [value] => Some(value.clone()),
            values if consolidate => Some(values.join(", ")),
            values => {
                if let Some(logger) = &self.logger {
                    let mut context = Map::new();
                    context.insert(
                        name.to_string(),
                        values.iter().cloned().map(Value::String).collect(),
                    );
                    logger.warning("Unexpected multiple headers found.", &context);
                }
                None
            }
        }
    }

    /// Like [`Response::one_header`] without consolidation, failing when the
    /// header is absent or ambiguous.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingHeader`].
    pub fn one_header_required(&self, name: &str) -> Result<String> {
        self.one_header(name, false)
            .ok_or_else(|| Error::MissingHeader(name.to_string()))
    }

    /// The content type without parameters, e.g. `text/plain` for
    /// `text/plain; charset=utf-8`.
    #[must_use]
    pub fn bare_content_type(&self) -> Option<String> {
        let content_type = self.one_header("content-type", false)?;
        let bare = content_type.split(';').next().unwrap_or_default();
        Some(bare.trim().to_string())
    }

    /// Exact content type match.
    ///
    /// `kind` is either a full `type/subtype` or, with `subtype`, the type half.
    #[must_use]
    pub fn is_content_type(&self, kind: &str, subtype: Option<&str>) -> bool {
        let expected = match subtype {
            Some(subtype) => format!("{kind}/{subtype}"),
            None => kind.to_string(),
        };
        self.bare_content_type().is_some_and(|bare| bare == expected)
    }

    /// Whether the content type starts with `kind/`.
    #[must_use]
    pub fn is_content_type_type(&self, kind: &str) -> bool {
        self.bare_content_type()
            .is_some_and(|bare| bare.strip_prefix(kind).is_some_and(|rest| rest.starts_with('/')))
    }

    /// Whether one of the `+`-separated parts of the subtype is `subtype`.
    ///
    /// `application/json+foo` matches both `json` and `foo`.
    #[must_use]
    pub fn is_content_type_subtype(&self, subtype: &str) -> bool {
        self.bare_content_type().is_some_and(|bare| {
            bare.split_once('/')
                .is_some_and(|(_, rest)| rest.split('+').any(|part| part == subtype))
        })
    }

    /// [`Response::is_content_type_type`] and
    /// [`Response::is_content_type_subtype`] together.
    #[must_use]
    pub fn is_content_type_loose(&self, kind: &str, subtype: &str) -> bool {
        self.is_content_type_type(kind) && self.is_content_type_subtype(subtype)
    }

    /// Whether the body is declared as JSON, including suffixed forms like
    /// `application/json+foo`.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.is_content_type_loose("application", "json")
    }

    // ------------------------------------------------------------------------
    // Full body
    // ------------------------------------------------------------------------

    /// The full body as bytes, read once and cached.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BodyUnavailable`] once the body has been streamed,
    /// [`Error::StreamUnreadable`] for an unreadable stream, or the stream's
    /// own read error.
    pub fn body_bytes(&self) -> Result<&Bytes> {
        if let Some(raw) = self.raw.get() {
            return Ok(raw);
        }
        if matches!(self.state.get(), BodyState::Streamed | BodyState::Gone) {
            return Err(Error::BodyUnavailable);
        }

        let bytes = {
            let mut body = self.body.borrow_mut();
            if !body.is_readable() {
                return Err(Error::StreamUnreadable);
            }
            // A failed read leaves the stream advanced, so the body is lost.
            self.state.set(BodyState::Streamed);
            body.contents()?
        };
        self.state.set(BodyState::Read);
        Ok(self.raw.get_or_init(|| bytes))
    }

    /// The full body as text.
    ///
    /// # Errors
    ///
    /// As [`Response::body_bytes`], plus [`Error::InvalidUtf8`].
    pub fn body(&self) -> Result<&str> {
        let bytes = self.body_bytes()?;
        Ok(std::str::from_utf8(bytes)?)
    }

    /// The body decoded as JSON, parsed once and cached.
    ///
    /// # Errors
    ///
    /// As [`Response::body_bytes`], plus [`Error::Decode`].
    pub fn json(&self) -> Result<&Value> {
        if let Some(value) = self.json.get() {
            return Ok(value);
        }
        let value = self.codec.decode_slice(self.body_bytes()?)?;
        Ok(self.json.get_or_init(|| value))
    }

    /// The JSON body, which must be a list or a dict.
    ///
    /// # Errors
    ///
    /// As [`Response::json`], plus [`Error::TypeMismatch`].
    pub fn json_array(&self) -> Result<Container> {
        JsonCodec::expect_array(self.json()?.clone())
    }

    /// The JSON body deserialized into `T`.
    ///
    /// # Errors
    ///
    /// As [`Response::json`], plus [`Error::JsonDeserialization`].
    pub fn json_as<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        from_value(self.json()?)
    }

    // ------------------------------------------------------------------------
    // Incremental body
    // ------------------------------------------------------------------------

    /// Read the next chunk of at most `max_len` bytes.
    ///
    /// Returns `None` at end of data. Afterwards [`Response::body`] fails
    /// unless the body was already cached. A read error also makes the body
    /// unavailable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StreamUnreadable`] or the stream's read error.
    pub fn stream_body(&mut self, max_len: usize) -> Result<Option<Bytes>> {
        if !self.body.get_mut().is_readable() {
            return Err(Error::StreamUnreadable);
        }
        self.advance_state(BodyState::Streamed);
        let body = self.body.get_mut();
        if body.eof()? {
            self.advance_state(BodyState::Gone);
            return Ok(None);
        }
        Ok(Some(body.read(max_len)?))
    }

    /// Decode the body incrementally.
    ///
    /// A seekable stream is rewound first. The decoded values are not cached.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StreamUnreadable`] or a rewind failure. Decode errors
    /// surface through the returned iterator.
    pub fn stream_json(
        &mut self,
        options: StreamOptions,
    ) -> Result<JsonStream<&mut (dyn BodyStream + Send + 'static)>> {
        let body = self.body.get_mut();
        if !body.is_readable() {
            return Err(Error::StreamUnreadable);
        }
        if body.is_seekable() {
            body.rewind()?;
        }
        self.advance_state(BodyState::Streamed);
        Ok(JsonStream::new(&mut **self.body.get_mut(), options))
    }

    /// Move to `next` unless the body is cached or already gone.
    fn advance_state(&self, next: BodyState) {
        if !matches!(self.state.get(), BodyState::Read | BodyState::Gone) {
            self.state.set(next);
        }
    }
}

/// Formats the status line, headers and body.
///
/// An unread body is read in full to print it, so a later incremental read
/// sees an exhausted stream unless it is seekable. Formatting a response over
/// a `ChannelStream` blocks, and panics inside an async context: format it
/// from a blocking task, as with the other body accessors.
impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "status: {}", self.status)?;
        for (name, values) in self.headers.iter() {
            writeln!(f, "{name}: {}", values.join(", "))?;
        }
        writeln!(f)?;
        f.write_str(self.body().unwrap_or(BODY_NOT_AVAILABLE))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert2::check;
    use serde_json::json;

    use super::*;

    fn build(status: u16, pairs: &[(&str, &[&str])], body: &'static str) -> Response {
        let headers: Headers = pairs
            .iter()
            .map(|(name, values)| (*name, values.iter().copied()))
            .collect();
        Response::from_bytes(status, headers, body)
    }

    fn with_content_type(content_type: &'static str) -> Response {
        build(200, &[("Content-Type", &[content_type])], "")
    }

    #[derive(Default)]
    struct RecordingLogger {
        calls: Mutex<Vec<(String, Map<String, Value>)>>,
    }

    impl Logger for RecordingLogger {
        fn warning(&self, message: &str, context: &Map<String, Value>) {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push((message.to_string(), context.clone()));
            }
        }
    }

    /// Memory stream that counts full reads.
    struct CountingStream {
        inner: MemoryStream,
        contents_calls: Arc<AtomicUsize>,
    }

    impl BodyStream for CountingStream {
        fn eof(&mut self) -> Result<bool> {
            self.inner.eof()
        }

        fn read(&mut self, max_len: usize) -> Result<Bytes> {
            self.inner.read(max_len)
        }

        fn contents(&mut self) -> Result<Bytes> {
            self.contents_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.contents()
        }
    }

    /// Stream that yields its chunks in order, failing at the `fail_at` read.
    struct FlakyStream {
        chunks: Vec<&'static str>,
        reads: usize,
        fail_at: usize,
    }

    impl FlakyStream {
        fn new(fail_at: usize) -> Self {
            Self {
                chunks: vec!["ab", "cd"],
                reads: 0,
                fail_at,
            }
        }
    }

    impl BodyStream for FlakyStream {
        fn eof(&mut self) -> Result<bool> {
            Ok(self.chunks.is_empty())
        }

        fn read(&mut self, _max_len: usize) -> Result<Bytes> {
            self.reads += 1;
            if self.reads == self.fail_at {
                return Err(Error::Connection("reset".to_string()));
            }
            if self.chunks.is_empty() {
                return Ok(Bytes::new());
            }
            Ok(Bytes::from_static(self.chunks.remove(0).as_bytes()))
        }
    }

    #[test]
    fn display_shows_status_headers_and_body() {
        let response = build(12345, &[("foo", &["bar", "qux"])], "baz");
        check!(response.to_string() == "status: 12345\nfoo: bar, qux\n\nbaz");
    }

    #[test]
    fn display_after_streaming() {
        let mut response = build(12345, &[("foo", &["bar", "qux"])], "baz");
        while response.stream_body(1).expect("chunk").is_some() {}
        check!(response.to_string() == "status: 12345\nfoo: bar, qux\n\n[Body not available]");
    }

    #[test]
    fn body_is_repeatable() {
        let response = build(200, &[], "foo");
        check!(response.body().expect("body") == "foo");
        check!(response.body().expect("body") == "foo");
        check!(response.body_state() == BodyState::Read);
    }

    #[test]
    fn body_fails_after_stream_body() {
        let mut response = build(200, &[], "foo");
        check!(response.stream_body(2).expect("chunk").as_deref() == Some(&b"fo"[..]));
        check!(response.body_state() == BodyState::Streamed);
        assert!(matches!(response.body(), Err(Error::BodyUnavailable)));

        check!(response.stream_body(2).expect("chunk").as_deref() == Some(&b"o"[..]));
        check!(response.stream_body(2).expect("end").is_none());
        check!(response.body_state() == BodyState::Gone);
        assert!(matches!(response.json(), Err(Error::BodyUnavailable)));
    }

    #[test]
    fn cached_body_survives_stream_body() {
        let mut response = build(200, &[], "foo");
        check!(response.body().expect("body") == "foo");
        check!(response.stream_body(10).expect("end").is_none());
        check!(response.body_state() == BodyState::Read);
        check!(response.body().expect("body") == "foo");
    }

    #[test]
    fn failed_body_read_is_not_retried() {
        let response = Response::new(200, Headers::new(), FlakyStream::new(2));
        assert!(matches!(response.body(), Err(Error::Connection(_))));
        check!(response.body_state() == BodyState::Streamed);
        assert!(matches!(response.body(), Err(Error::BodyUnavailable)));
        assert!(matches!(response.json(), Err(Error::BodyUnavailable)));
    }

    #[test]
    fn failed_stream_body_read_loses_the_body() {
        let mut response = Response::new(200, Headers::new(), FlakyStream::new(1));
        assert!(matches!(response.stream_body(2), Err(Error::Connection(_))));
        check!(response.body_state() == BodyState::Streamed);
        assert!(matches!(response.body(), Err(Error::BodyUnavailable)));
    }

    #[test]
    fn gone_is_final() {
        let mut response = build(200, &[], "[1]");
        while response.stream_body(1).expect("chunk").is_some() {}
        check!(response.body_state() == BodyState::Gone);

        let values: Vec<Value> = response
            .stream_json(StreamOptions::default())
            .expect("stream")
            .collect::<Result<_>>()
            .expect("values");
        check!(values == vec![json!([1])]);
        check!(response.body_state() == BodyState::Gone);
        assert!(matches!(response.body(), Err(Error::BodyUnavailable)));
    }

    #[test]
    fn unreadable_stream() {
        let mut response = Response::new(
            200,
            Headers::new(),
            MemoryStream::new("foo").with_readable(false),
        );
        assert!(matches!(response.stream_body(1), Err(Error::StreamUnreadable)));
        assert!(matches!(response.body(), Err(Error::StreamUnreadable)));
        assert!(matches!(
            response.stream_json(StreamOptions::default()),
            Err(Error::StreamUnreadable)
        ));
    }

    #[test]
    fn invalid_utf8_body() {
        let response = Response::from_bytes(200, Headers::new(), &b"\xff\xfe"[..]);
        assert!(matches!(response.body(), Err(Error::InvalidUtf8(_))));
        check!(response.body_bytes().expect("bytes").len() == 2);
        assert!(response.to_string().ends_with(BODY_NOT_AVAILABLE));
    }

    #[test]
    fn json_reads_the_stream_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let stream = CountingStream {
            inner: MemoryStream::new(r#"{"a": [1, 2]}"#),
            contents_calls: Arc::clone(&calls),
        };
        let response = Response::new(200, Headers::new(), stream);

        let first = response.json().expect("json");
        let second = response.json().expect("json");
        check!(first == &json!({"a": [1, 2]}));
        assert!(std::ptr::eq(first, second));
        check!(calls.load(Ordering::SeqCst) == 1);

        check!(response.body().expect("body") == r#"{"a": [1, 2]}"#);
        check!(calls.load(Ordering::SeqCst) == 1);
    }

    #[test]
    fn json_decode_error() {
        let response = build(200, &[], "not json");
        assert!(matches!(response.json(), Err(Error::Decode { .. })));
    }

    #[test]
    fn json_array() {
        let response = build(200, &[], "[1, 2]");
        check!(response.json_array().expect("array").len() == 2);

        let response = build(200, &[], "54321");
        assert!(matches!(
            response.json_array(),
            Err(Error::TypeMismatch { expected: "list or dict", actual: "number" })
        ));
    }

    #[test]
    fn json_as_struct() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct User {
            id: u64,
            name: String,
        }

        let response = build(200, &[], r#"{"id": 7, "name": "ada"}"#);
        let user: User = response.json_as().expect("user");
        check!(user == User { id: 7, name: "ada".to_string() });

        let err = response.json_as::<Vec<u64>>().expect_err("wrong shape");
        assert!(matches!(err, Error::JsonDeserialization { .. }));
    }

    #[test]
    fn header_lookup_ignores_case() {
        let response = build(200, &[("Foo", &["bar"])], "");
        check!(response.header("foo") == Some(&["bar".to_string()][..]));
        check!(response.header("FOO") == Some(&["bar".to_string()][..]));
        check!(response.has_header("fOO"));
        check!(!response.has_header("bar"));
        check!(response.header("bar").is_none());
    }

    #[test]
    fn one_header_single_value() {
        let response = build(200, &[("foo", &["bar"])], "");
        check!(response.one_header("FOO", false).as_deref() == Some("bar"));
        check!(response.one_header("missing", false).is_none());
    }

    #[test]
    fn one_header_multiple_values_warns() {
        let logger = Arc::new(RecordingLogger::default());
        let response =
            build(200, &[("foo", &["v1", "v2"])], "").with_logger(logger.clone());

        check!(response.one_header("foo", false).is_none());

        let calls = logger.calls.lock().expect("lock");
        check!(calls.len() == 1);
        let (message, context) = &calls[0];
        check!(message == "Unexpected multiple headers found.");
        check!(Value::Object(context.clone()) == json!({"foo": ["v1", "v2"]}));
    }

    #[test]
    fn one_header_consolidated() {
        let logger = Arc::new(RecordingLogger::default());
        let response =
            build(200, &[("foo", &["v1", "v2"])], "").with_logger(logger.clone());

        check!(response.one_header("foo", true).as_deref() == Some("v1, v2"));
        check!(logger.calls.lock().expect("lock").is_empty());
    }

    #[test]
    fn one_header_without_logger() {
        let response = build(200, &[("foo", &["v1", "v2"])], "");
        check!(response.one_header("foo", false).is_none());
    }

    #[test]
    fn one_header_required() {
        let response = build(200, &[("foo", &["bar"]), ("many", &["a", "b"])], "");
        check!(response.one_header_required("foo").expect("header") == "bar");
        assert!(matches!(
            response.one_header_required("missing"),
            Err(Error::MissingHeader(name)) if name == "missing"
        ));
        assert!(response.one_header_required("many").is_err());
    }

    #[test]
    fn bare_content_type() {
        check!(
            with_content_type("text/plain; charset=utf-8")
                .bare_content_type()
                .as_deref()
                == Some("text/plain")
        );
        check!(with_content_type(" text/html ").bare_content_type().as_deref() == Some("text/html"));
        check!(build(200, &[], "").bare_content_type().is_none());
    }

    #[test]
    fn content_type_exact() {
        let response = with_content_type("text/plain; charset=utf-8");
        check!(response.is_content_type("text/plain", None));
        check!(response.is_content_type("text", Some("plain")));
        check!(!response.is_content_type("text/plainx", None));
        check!(!response.is_content_type("text", None));
    }

    #[test]
    fn content_type_type() {
        let response = with_content_type("text/plain");
        check!(response.is_content_type_type("text"));
        check!(!response.is_content_type_type("tex"));
        check!(!response.is_content_type_type("text/plain"));
    }

    #[test]
    fn content_type_subtype() {
        let response = with_content_type("application/json+foo");
        check!(response.is_content_type_subtype("json"));
        check!(response.is_content_type_subtype("foo"));
        check!(!response.is_content_type_subtype("application"));

        check!(!with_content_type("foo-bar").is_content_type_subtype("foo-bar"));
    }

    #[test]
    fn is_json() {
        for content_type in [
            "application/json",
            "application/json+foo",
            "application/json; charset=utf-8",
            "application/json+foo; charset=utf-8",
        ] {
            check!(with_content_type(content_type).is_json(), "{content_type}");
        }
        for content_type in ["application/jsonx", "text/json", "application"] {
            check!(!with_content_type(content_type).is_json(), "{content_type}");
        }
        check!(!build(200, &[], "{}").is_json());
    }

    #[test]
    fn is_json_with_ambiguous_content_type() {
        let logger = Arc::new(RecordingLogger::default());
        let response = build(200, &[("content-type", &["application/json", "text/plain"])], "")
            .with_logger(logger.clone());
        check!(!response.is_json());
        check!(!logger.calls.lock().expect("lock").is_empty());
    }

    #[test]
    fn status_classes() {
        let location: Headers = [("Location", ["/next"])].into_iter().collect();
        check!(Response::from_bytes(301, location.clone(), "").is_redirect());
        check!(!Response::from_bytes(200, location, "").is_redirect());
        check!(!Response::from_bytes(301, Headers::new(), "").is_redirect());
        check!(!Response::from_bytes(500, Headers::new(), "").is_redirect());

        check!(Response::from_bytes(200, Headers::new(), "").is_success());
        check!(Response::from_bytes(204, Headers::new(), "").is_success());
        check!(!Response::from_bytes(302, Headers::new(), "").is_success());
        check!(Response::from_bytes(404, Headers::new(), "").is_client_error());
        check!(Response::from_bytes(503, Headers::new(), "").is_server_error());
    }

    #[test]
    fn stream_json_elements() {
        let mut response = build(200, &[], "[1,2,3]");
        let values: Vec<Value> = response
            .stream_json(StreamOptions::default().skip_outer_array(true))
            .expect("stream")
            .collect::<Result<_>>()
            .expect("values");
        check!(values == vec![json!(1), json!(2), json!(3)]);
        assert!(matches!(response.body(), Err(Error::BodyUnavailable)));
    }

    #[test]
    fn stream_json_whole_value() {
        let mut response = build(200, &[], "[1,2,3]");
        let values: Vec<Value> = response
            .stream_json(StreamOptions::default())
            .expect("stream")
            .collect::<Result<_>>()
            .expect("values");
        check!(values == vec![json!([1, 2, 3])]);
    }

    #[test]
    fn stream_json_rewinds_after_body() {
        let mut response = build(200, &[], "[1,2]");
        check!(response.body().expect("body") == "[1,2]");

        let values: Vec<Value> = response
            .stream_json(StreamOptions::default().skip_outer_array(true))
            .expect("stream")
            .collect::<Result<_>>()
            .expect("values");
        check!(values == vec![json!(1), json!(2)]);
        check!(response.body().expect("cached") == "[1,2]");
    }

    #[test]
    fn codec_depth_applies_to_json() {
        let response = build(200, &[], "[[1]]").with_codec(JsonCodec::with_max_depth(1));
        assert!(matches!(response.json(), Err(Error::Decode { .. })));
    }

    #[test]
    fn response_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Response>();
    }
}
