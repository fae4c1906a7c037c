//! Incremental JSON decoding from a [`BodyStream`].
//!
//! [`JsonStream`] yields decoded values as they become available instead of
//! buffering the whole body. With [`StreamOptions::skip_outer_array`], a
//! top-level array is yielded element by element:
//!
//! ```
//! use clasp_core::{JsonStream, MemoryStream, StreamOptions};
//!
//! let mut body = MemoryStream::new("[1, 2, 3]");
//! let options = StreamOptions::default().skip_outer_array(true);
//! let values: Vec<_> = JsonStream::new(&mut body, options)
//!     .collect::<Result<_, _>>()
//!     .expect("decode");
//! assert_eq!(values, [1, 2, 3]);
//! ```

use bytes::{Buf, BytesMut};
use serde_json::Value;

use crate::scan::Scanner;
use crate::{BodyStream, Error, JsonCodec, Result};

/// Options for [`JsonStream`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOptions {
    /// Yield the elements of a top-level array one at a time.
    pub skip_outer_array: bool,
    /// Refill the buffer while fewer than this many bytes are pending.
    pub buffer_size: usize,
    /// Maximum bytes requested from the stream per read.
    pub max_read_size: usize,
    /// Bytes separating array elements; `,` when `None`.
    pub element_delimiters: Option<Vec<u8>>,
    /// Codec used to decode each value.
    pub codec: JsonCodec,
}

impl StreamOptions {
    /// Default refill threshold.
    pub const DEFAULT_BUFFER_SIZE: usize = 16 * 1024;
    /// Default per-read cap.
    pub const DEFAULT_MAX_READ_SIZE: usize = 8 * 1024;

    /// Set whether a top-level array is streamed element by element.
    #[must_use]
    pub const fn skip_outer_array(mut self, skip: bool) -> Self {
        self.skip_outer_array = skip;
        self
    }

    /// Set the refill threshold.
    #[must_use]
    pub const fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Set the per-read cap. Zero is treated as one.
    #[must_use]
    pub const fn max_read_size(mut self, size: usize) -> Self {
        self.max_read_size = size;
        self
    }

    /// Override the element delimiter bytes.
    #[must_use]
    pub fn element_delimiters(mut self, delimiters: impl Into<Vec<u8>>) -> Self {
        self.element_delimiters = Some(delimiters.into());
        self
    }

    /// Set the codec used for each value.
    #[must_use]
    pub const fn codec(mut self, codec: JsonCodec) -> Self {
        self.codec = codec;
        self
    }
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            skip_outer_array: false,
            buffer_size: Self::DEFAULT_BUFFER_SIZE,
            max_read_size: Self::DEFAULT_MAX_READ_SIZE,
            element_delimiters: None,
            codec: JsonCodec::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Nothing consumed yet.
    Start,
    /// Inside the outer array; `first` until an element or `]` is seen.
    Elements { first: bool },
    /// Outer array closed; only whitespace may follow.
    Trailing,
    Done,
}

/// Where an element ended.
enum Boundary {
    /// At a delimiter byte; more elements follow.
    Delimiter(usize),
    /// At the closing `]` of the outer array.
    Close(usize),
}

/// Lazy, forward-only iterator of JSON values read from a stream.
///
/// Nothing is read until the first call to [`Iterator::next`]. Once an error
/// has been yielded the iterator is finished. The stream is borrowed, never
/// closed.
#[derive(Debug)]
pub struct JsonStream<S> {
    stream: S,
    options: StreamOptions,
    buffer: BytesMut,
    scanner: Scanner,
    /// Bytes of the current element already fed to `scanner`.
    scanned: usize,
    exhausted: bool,
    state: State,
}

impl<S: BodyStream> JsonStream<S> {
    /// Creates a decoder over `stream`. Does not touch the stream.
    pub fn new(stream: S, options: StreamOptions) -> Self {
        Self {
            stream,
            options,
            buffer: BytesMut::new(),
            scanner: Scanner::default(),
            scanned: 0,
            exhausted: false,
            state: State::Start,
        }
    }

    fn delimiters(&self) -> &[u8] {
        self.options.element_delimiters.as_deref().unwrap_or(b",")
    }

    /// Read one chunk into the buffer. Returns `false` at end of data.
    fn fill(&mut self) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        if self.stream.eof()? {
            self.exhausted = true;
            return Ok(false);
        }
        let chunk = self.stream.read(self.options.max_read_size.max(1))?;
        self.buffer.extend_from_slice(&chunk);
        Ok(true)
    }

    /// Top the buffer up to the refill threshold.
    fn top_up(&mut self) -> Result<()> {
        while self.buffer.len() < self.options.buffer_size && self.fill()? {}
        Ok(())
    }

    /// Drop leading whitespace, reading more as needed. Returns the next
    /// byte, or `None` at end of data.
    fn skip_whitespace(&mut self) -> Result<Option<u8>> {
        loop {
            let skip = self
                .buffer
                .iter()
                .take_while(|b| b.is_ascii_whitespace())
                .count();
            self.buffer.advance(skip);
            if let Some(&byte) = self.buffer.first() {
                return Ok(Some(byte));
            }
            if !self.fill()? {
                return Ok(None);
            }
        }
    }

    /// Scan forward for the end of the current element.
    fn find_boundary(&mut self) -> Result<Boundary> {
        loop {
            while let Some(&byte) = self.buffer.get(self.scanned) {
                if self.scanner.at_top_level() {
                    if self.delimiters().contains(&byte) {
                        return Ok(Boundary::Delimiter(self.scanned));
                    }
                    match byte {
                        b']' => return Ok(Boundary::Close(self.scanned)),
                        b'}' => {
                            return Err(Error::stream_parse(
                                "unexpected '}' at the top level of the array",
                            ));
                        }
                        _ => {}
                    }
                }
                self.scanner.feed(byte);
                self.scanned += 1;
            }
            if !self.fill()? {
                return Err(Error::stream_parse("stream ended inside the top-level array"));
            }
        }
    }

    fn decode_element(&self, raw: &[u8]) -> Result<Value> {
        let trimmed = raw.trim_ascii();
        if trimmed.is_empty() {
            return Err(Error::stream_parse("empty array element"));
        }
        self.options
            .codec
            .decode_slice(trimmed)
            .map_err(|e| Error::stream_parse(e.to_string()))
    }

    fn next_whole(&mut self) -> Result<Option<Value>> {
        while self.fill()? {}
        self.state = State::Done;
        if self.buffer.trim_ascii().is_empty() {
            return Err(Error::stream_parse("stream is empty"));
        }
        let value = self
            .options
            .codec
            .decode_slice(&self.buffer)
            .map_err(|e| Error::stream_parse(e.to_string()))?;
        self.buffer.clear();
        Ok(Some(value))
    }

    fn next_element(&mut self) -> Result<Option<Value>> {
        loop {
            match self.state {
                State::Start => {
                    self.top_up()?;
                    match self.skip_whitespace()? {
                        Some(b'[') => {
                            self.buffer.advance(1);
                            self.state = State::Elements { first: true };
                        }
                        Some(_) => {
                            return Err(Error::stream_parse("expected a top-level array"));
                        }
                        None => return Err(Error::stream_parse("stream is empty")),
                    }
                }
                State::Elements { first } => {
                    self.top_up()?;
                    match self.skip_whitespace()? {
                        Some(b']') if first => {
                            self.buffer.advance(1);
                            self.state = State::Trailing;
                            continue;
                        }
                        Some(_) => {}
                        None => {
                            return Err(Error::stream_parse(
                                "stream ended inside the top-level array",
                            ));
                        }
                    }

                    self.scanner = Scanner::default();
                    self.scanned = 0;
                    let boundary = self.find_boundary()?;
                    let (end, closed) = match boundary {
                        Boundary::Delimiter(end) => (end, false),
                        Boundary::Close(end) => (end, true),
                    };
                    let raw = self.buffer.split_to(end + 1);
                    let value = self.decode_element(raw.get(..end).unwrap_or_default())?;
                    self.state = if closed {
                        State::Trailing
                    } else {
                        State::Elements { first: false }
                    };
                    return Ok(Some(value));
                }
                State::Trailing => {
                    self.state = State::Done;
                    return match self.skip_whitespace()? {
                        None => Ok(None),
                        Some(_) => Err(Error::stream_parse(
                            "unexpected data after the top-level array",
                        )),
                    };
                }
                State::Done => return Ok(None),
            }
        }
    }
}

impl<S: BodyStream> Iterator for JsonStream<S> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == State::Done {
            return None;
        }
        let step = if self.options.skip_outer_array {
            self.next_element()
        } else if self.state == State::Start {
            self.next_whole()
        } else {
            Ok(None)
        };
        match step {
            Ok(value) => value.map(Ok),
            Err(e) => {
                self.state = State::Done;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use assert2::let_assert;
    use bytes::Bytes;
    use serde_json::json;

    use super::*;
    use crate::MemoryStream;

    /// Serves fixed chunks and records the size of every read request.
    struct ChunkedStream {
        chunks: Vec<Bytes>,
        requests: Vec<usize>,
    }

    impl ChunkedStream {
        fn new(chunks: &[&'static str]) -> Self {
            Self {
                chunks: chunks.iter().rev().map(|c| Bytes::from_static(c.as_bytes())).collect(),
                requests: Vec::new(),
            }
        }
    }

    impl BodyStream for ChunkedStream {
        fn eof(&mut self) -> Result<bool> {
            Ok(self.chunks.is_empty())
        }

        fn read(&mut self, max_len: usize) -> Result<Bytes> {
            self.requests.push(max_len);
            Ok(self.chunks.pop().unwrap_or_default())
        }
    }

    fn collect(text: &'static str, options: StreamOptions) -> Result<Vec<Value>> {
        let mut body = MemoryStream::new(text);
        JsonStream::new(&mut body, options).collect()
    }

    fn elements() -> StreamOptions {
        StreamOptions::default().skip_outer_array(true)
    }

    #[test]
    fn whole_value() {
        let values = collect("[1,2,3]", StreamOptions::default()).expect("decode");
        assert_eq!(values, vec![json!([1, 2, 3])]);

        let values = collect(r#"  {"a": 1}  "#, StreamOptions::default()).expect("decode");
        assert_eq!(values, vec![json!({"a": 1})]);
    }

    #[test]
    fn outer_array_elements() {
        let values = collect("[1,2,3]", elements()).expect("decode");
        assert_eq!(values, vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn nested_elements_and_strings() {
        let text = r#" [ {"a": [1, 2], "s": "x,]y"} , "q\"]," , [[]], null ] "#;
        let values = collect(text, elements()).expect("decode");
        assert_eq!(
            values,
            vec![
                json!({"a": [1, 2], "s": "x,]y"}),
                json!("q\"],"),
                json!([[]]),
                Value::Null
            ]
        );
    }

    #[test]
    fn empty_array() {
        assert!(collect("[]", elements()).expect("decode").is_empty());
        assert!(collect(" [ ] \n", elements()).expect("decode").is_empty());
    }

    #[test]
    fn values_are_lazy() {
        let mut body = MemoryStream::new("[1,2,3]");
        let mut stream = JsonStream::new(&mut body, elements().buffer_size(0).max_read_size(2));
        assert_eq!(stream.next().expect("first").expect("value"), json!(1));
        drop(stream);
        // Only the bytes needed for the first element were read.
        assert!(body.remaining() > 0);
    }

    #[test]
    fn construction_does_not_read() {
        let mut body = ChunkedStream::new(&["[1]"]);
        let stream = JsonStream::new(&mut body, elements());
        drop(stream);
        assert!(body.requests.is_empty());
    }

    #[test]
    fn elements_split_across_reads() {
        let mut body = ChunkedStream::new(&["[{\"na", "me\": \"al", "ice\"}, 4", "2]"]);
        let values: Vec<_> = JsonStream::new(&mut body, elements().buffer_size(0))
            .collect::<Result<_>>()
            .expect("decode");
        assert_eq!(values, vec![json!({"name": "alice"}), json!(42)]);
    }

    #[test]
    fn reads_are_capped() {
        let mut body = ChunkedStream::new(&["[1,", "2]"]);
        let options = elements().max_read_size(3);
        let values: Vec<_> = JsonStream::new(&mut body, options)
            .collect::<Result<_>>()
            .expect("decode");
        assert_eq!(values, vec![json!(1), json!(2)]);
        assert!(body.requests.iter().all(|&n| n == 3));
    }

    #[test]
    fn custom_delimiters() {
        let text = "[{\"a\":1}\n{\"a\":2}\n\n{\"a\":3}]";
        let values = collect(text, elements().element_delimiters(*b"\n")).expect("decode");
        assert_eq!(values, vec![json!({"a": 1}), json!({"a": 2}), json!({"a": 3})]);
    }

    #[test]
    fn empty_stream_fails_on_first_step() {
        let mut body = MemoryStream::new("");
        let mut stream = JsonStream::new(&mut body, elements());
        let_assert!(Some(Err(Error::StreamParse(_))) = stream.next());
        assert!(stream.next().is_none());

        let_assert!(Err(Error::StreamParse(_)) = collect("  ", StreamOptions::default()));
    }

    #[test]
    fn non_array_with_skip_fails() {
        let_assert!(Err(Error::StreamParse(message)) = collect(r#"{"a":1}"#, elements()));
        assert!(message.contains("expected a top-level array"));
    }

    #[test]
    fn truncated_stream_fails() {
        let mut body = MemoryStream::new("[1, 2, {\"a\":");
        let mut stream = JsonStream::new(&mut body, elements());
        assert_eq!(stream.next().expect("first").expect("value"), json!(1));
        assert_eq!(stream.next().expect("second").expect("value"), json!(2));
        let_assert!(Some(Err(Error::StreamParse(_))) = stream.next());
        assert!(stream.next().is_none());

        let_assert!(Err(Error::StreamParse(_)) = collect("[1, 2", elements()));
        let_assert!(Err(Error::StreamParse(_)) = collect("[1, 2", StreamOptions::default()));
    }

    #[test]
    fn malformed_elements_fail() {
        let_assert!(Err(Error::StreamParse(_)) = collect("[1,,2]", elements()));
        let_assert!(Err(Error::StreamParse(_)) = collect("[1,]", elements()));
        let_assert!(Err(Error::StreamParse(_)) = collect("[1 2]", elements()));
        let_assert!(Err(Error::StreamParse(_)) = collect("[1}]", elements()));
    }

    #[test]
    fn trailing_data_fails() {
        let mut body = MemoryStream::new("[1] x");
        let mut stream = JsonStream::new(&mut body, elements());
        assert_eq!(stream.next().expect("first").expect("value"), json!(1));
        let_assert!(Some(Err(Error::StreamParse(message))) = stream.next());
        assert!(message.contains("after the top-level array"));

        let_assert!(Err(Error::StreamParse(_)) = collect("[1] [2]", StreamOptions::default()));
    }

    #[test]
    fn element_depth_limit_applies() {
        let options = elements().codec(JsonCodec::with_max_depth(1));
        let values = collect("[[1], [2]]", options.clone()).expect("decode");
        assert_eq!(values.len(), 2);
        let_assert!(Err(Error::StreamParse(_)) = collect("[[[1]]]", options));
    }
}
