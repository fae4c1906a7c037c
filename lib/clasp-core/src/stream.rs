//! Response body streams.
//!
//! [`BodyStream`] is the byte source a [`crate::Response`] wraps. It is
//! single-pass unless [`BodyStream::is_seekable`] says otherwise.
//!
//! - [`MemoryStream`] - an in-memory, seekable body
//! - [`ReaderStream`] - adapts any [`std::io::Read`]

use std::io::Read;

use bytes::{Bytes, BytesMut};

use crate::{Error, Result};

/// Chunk size used when a stream is drained to the end.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// A readable body byte stream.
///
/// Reads may block until the transport delivers data.
pub trait BodyStream {
    /// Whether the stream can be read at all.
    fn is_readable(&self) -> bool {
        true
    }

    /// Whether the end of the data has been reached.
    ///
    /// May block to find out.
    fn eof(&mut self) -> Result<bool>;

    /// Read up to `max_len` bytes.
    ///
    /// Returns an empty chunk only at end of data.
    fn read(&mut self, max_len: usize) -> Result<Bytes>;

    /// Read everything that remains.
    fn contents(&mut self) -> Result<Bytes> {
        let mut collected = BytesMut::new();
        while !self.eof()? {
            collected.extend_from_slice(&self.read(DEFAULT_CHUNK_SIZE)?);
        }
        Ok(collected.freeze())
    }

    /// Whether [`BodyStream::rewind`] is supported.
    fn is_seekable(&self) -> bool {
        false
    }

    /// Move back to the start of the data.
    fn rewind(&mut self) -> Result<()> {
        Err(Error::invalid_request("stream is not seekable"))
    }
}

impl<S: BodyStream + ?Sized> BodyStream for &mut S {
    fn is_readable(&self) -> bool {
        (**self).is_readable()
    }

    fn eof(&mut self) -> Result<bool> {
        (**self).eof()
    }

    fn read(&mut self, max_len: usize) -> Result<Bytes> {
        (**self).read(max_len)
    }

    fn contents(&mut self) -> Result<Bytes> {
        (**self).contents()
    }

    fn is_seekable(&self) -> bool {
        (**self).is_seekable()
    }

    fn rewind(&mut self) -> Result<()> {
        (**self).rewind()
    }
}

impl<S: BodyStream + ?Sized> BodyStream for Box<S> {
    fn is_readable(&self) -> bool {
        (**self).is_readable()
    }

    fn eof(&mut self) -> Result<bool> {
        (**self).eof()
    }

    fn read(&mut self, max_len: usize) -> Result<Bytes> {
        (**self).read(max_len)
    }

    fn contents(&mut self) -> Result<Bytes> {
        (**self).contents()
    }

    fn is_seekable(&self) -> bool {
        (**self).is_seekable()
    }

    fn rewind(&mut self) -> Result<()> {
        (**self).rewind()
    }
}

// ============================================================================
// In-memory stream
// ============================================================================

/// A body held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryStream {
    data: Bytes,
    position: usize,
    readable: bool,
}

impl MemoryStream {
    /// Creates a readable stream over `data`.
    #[must_use]
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            position: 0,
            readable: true,
        }
    }

    /// Marks the stream readable or not.
    #[must_use]
    pub const fn with_readable(mut self, readable: bool) -> Self {
        self.readable = readable;
        self
    }

    /// Bytes not yet read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }
}

impl BodyStream for MemoryStream {
    fn is_readable(&self) -> bool {
        self.readable
    }

    fn eof(&mut self) -> Result<bool> {
        Ok(self.remaining() == 0)
    }

    fn read(&mut self, max_len: usize) -> Result<Bytes> {
        let end = self.position + max_len.min(self.remaining());
        let chunk = self.data.slice(self.position..end);
        self.position = end;
        Ok(chunk)
    }

    fn contents(&mut self) -> Result<Bytes> {
        let rest = self.data.slice(self.position..);
        self.position = self.data.len();
        Ok(rest)
    }

    fn is_seekable(&self) -> bool {
        true
    }

    fn rewind(&mut self) -> Result<()> {
        self.position = 0;
        Ok(())
    }
}

// ============================================================================
// Reader adapter
// ============================================================================

/// Adapts a [`Read`] implementation into a non-seekable [`BodyStream`].
///
/// I/O failures surface as [`Error::Connection`].
#[derive(Debug)]
pub struct ReaderStream<R> {
    reader: R,
    pending: BytesMut,
    done: bool,
}

impl<R: Read> ReaderStream<R> {
    /// Wraps `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: BytesMut::new(),
            done: false,
        }
    }

    /// Consume into the inner reader, dropping any read-ahead bytes.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn fill(&mut self) -> Result<()> {
        let mut chunk = vec![0; DEFAULT_CHUNK_SIZE];
        let read = loop {
            match self.reader.read(&mut chunk) {
                Ok(read) => break read,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => return Err(Error::connection(e.to_string())),
            }
        };
        if read == 0 {
            self.done = true;
        } else {
            chunk.truncate(read);
            self.pending.extend_from_slice(&chunk);
        }
        Ok(())
    }
}

impl<R: Read> BodyStream for ReaderStream<R> {
    fn eof(&mut self) -> Result<bool> {
        if self.pending.is_empty() && !self.done {
            self.fill()?;
        }
        Ok(self.pending.is_empty() && self.done)
    }

    fn read(&mut self, max_len: usize) -> Result<Bytes> {
        if self.eof()? {
            return Ok(Bytes::new());
        }
        let len = max_len.min(self.pending.len());
        Ok(self.pending.split_to(len).freeze())
    }

    fn contents(&mut self) -> Result<Bytes> {
        let mut rest = std::mem::take(&mut self.pending).to_vec();
        self.reader
            .read_to_end(&mut rest)
            .map_err(|e| Error::connection(e.to_string()))?;
        self.done = true;
        Ok(Bytes::from(rest))
    }
}
