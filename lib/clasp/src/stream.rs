//! Bridge from an async response body to a blocking [`BodyStream`].

use bytes::Bytes;
use clasp_core::{BodyStream, Result};
use tokio::sync::mpsc;

/// A streamed network body.
///
/// Chunks are pumped by a background task into a bounded channel; reads block
/// until the next chunk arrives. Reading from inside an async context panics,
/// so consume it from a plain thread or `tokio::task::spawn_blocking`.
#[derive(Debug)]
pub struct ChannelStream {
    receiver: mpsc::Receiver<Result<Bytes>>,
    pending: Bytes,
    done: bool,
}

impl ChannelStream {
    /// Wraps the receiving end of a chunk channel. The stream ends when every
    /// sender is dropped; an `Err` chunk is reported once, then the stream ends.
    #[must_use]
    pub const fn new(receiver: mpsc::Receiver<Result<Bytes>>) -> Self {
        Self {
            receiver,
            pending: Bytes::new(),
            done: false,
        }
    }

    fn fill(&mut self) -> Result<()> {
        while self.pending.is_empty() && !self.done {
            match self.receiver.blocking_recv() {
                Some(Ok(chunk)) => self.pending = chunk,
                Some(Err(err)) => {
                    self.done = true;
                    return Err(err);
                }
                None => self.done = true,
            }
        }
        Ok(())
    }
}

impl BodyStream for ChannelStream {
    fn eof(&mut self) -> Result<bool> {
        self.fill()?;
        Ok(self.pending.is_empty())
    }

    fn read(&mut self, max_len: usize) -> Result<Bytes> {
        self.fill()?;
        let len = max_len.min(self.pending.len());
        Ok(self.pending.split_to(len))
    }
}

#[cfg(test)]
mod tests {
    use clasp_core::Error;

    use super::*;

    fn stream_of(chunks: Vec<Result<Bytes>>) -> ChannelStream {
        let (sender, receiver) = mpsc::channel(chunks.len().max(1));
        for chunk in chunks {
            sender.try_send(chunk).expect("capacity");
        }
        ChannelStream::new(receiver)
    }

    #[test]
    fn reads_across_chunks() {
        let mut stream = stream_of(vec![
            Ok(Bytes::from("hel")),
            Ok(Bytes::new()),
            Ok(Bytes::from("lo")),
        ]);

        assert_eq!(stream.read(2).expect("read"), "he");
        assert_eq!(stream.read(10).expect("read"), "l");
        assert!(!stream.eof().expect("eof"));
        assert_eq!(stream.contents().expect("contents"), "lo");
        assert!(stream.eof().expect("eof"));
        assert_eq!(stream.read(10).expect("read"), "");
    }

    #[test]
    fn not_seekable() {
        let mut stream = stream_of(vec![]);
        assert!(!stream.is_seekable());
        assert!(stream.rewind().is_err());
        assert!(stream.eof().expect("eof"));
    }

    #[test]
    fn error_chunk_ends_the_stream() {
        let mut stream = stream_of(vec![
            Ok(Bytes::from("ab")),
            Err(Error::connection("reset")),
            Ok(Bytes::from("never")),
        ]);

        assert_eq!(stream.read(10).expect("read"), "ab");
        assert!(matches!(stream.read(10), Err(Error::Connection(_))));
        assert!(stream.eof().expect("eof"));
    }
}
