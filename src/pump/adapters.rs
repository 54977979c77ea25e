//! Ready-made sources and sinks.
//!
//! - [`StreamSource`] - pulls from a `Stream` of `Bytes` chunks
//! - [`BytesSink`] - collects into memory, optionally saturating at a limit
//! - [`AsyncReadSource`] / [`AsyncWriteSink`] - wrap `futures_io` readers and
//!   writers (requires the `async-io` feature)
//!
//! The futures-io adapters are runtime-agnostic. Tokio users can bridge with
//! `tokio_util::compat`:
//!
//! ```ignore
//! use tokio_util::compat::TokioAsyncReadCompatExt;
//! use b64pump::AsyncReadSource;
//!
//! let file = tokio::fs::File::open("data.b64").await?;
//! let source = AsyncReadSource::new(file.compat());
//! ```

use std::io;
use std::pin::pin;

use bytes::{Bytes, BytesMut};
use futures_core::Stream;
use futures_util::StreamExt;
use futures_util::future::{Either, select};
use tokio_util::sync::CancellationToken;

use super::io::{FlushStatus, PullSource, PushSink};
use crate::error::PumpError;

/// A [`PullSource`] over a stream of byte chunks.
///
/// A chunk larger than the caller's buffer is handed out over several reads.
#[derive(Debug)]
pub struct StreamSource<S> {
    stream: S,
    pending: Bytes,
    done: bool,
}

impl<S> StreamSource<S>
where
    S: Stream<Item = io::Result<Bytes>> + Unpin,
{
    /// Wraps `stream`.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            pending: Bytes::new(),
            done: false,
        }
    }

    /// Returns the wrapped stream. Unread bytes of a partially consumed chunk
    /// are lost.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S> PullSource for StreamSource<S>
where
    S: Stream<Item = io::Result<Bytes>> + Unpin + Send,
{
    async fn read(
        &mut self,
        buf: &mut [u8],
        cancel: &CancellationToken,
    ) -> Result<usize, PumpError> {
        loop {
            if !self.pending.is_empty() {
                let n = buf.len().min(self.pending.len());
                let chunk = self.pending.split_to(n);
                buf[..n].copy_from_slice(&chunk);
                return Ok(n);
            }
            if self.done {
                return Ok(0);
            }

            let cancelled = pin!(cancel.cancelled());
            match select(self.stream.next(), cancelled).await {
                Either::Left((Some(Ok(chunk)), _)) => self.pending = chunk,
                Either::Left((Some(Err(e)), _)) => return Err(PumpError::Io(e)),
                Either::Left((None, _)) => self.done = true,
                Either::Right(_) => return Err(PumpError::Cancelled),
            }
        }
    }
}

/// How a [`BytesSink`] was completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The transfer succeeded.
    Success,
    /// The transfer was cancelled.
    Cancelled,
    /// The transfer failed with the given message.
    Failed(String),
}

/// A [`PushSink`] that collects everything in memory.
///
/// With a limit set, [`flush`](PushSink::flush) reports saturation once at
/// least `limit` bytes were written.
#[derive(Debug, Default)]
pub struct BytesSink {
    data: BytesMut,
    limit: Option<usize>,
    writes: usize,
    completion: Option<Completion>,
}

impl BytesSink {
    /// Creates an unbounded sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that saturates after `limit` bytes.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Bytes written so far.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of `write` calls received.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// How the sink was completed, if it was.
    pub fn completion(&self) -> Option<&Completion> {
        self.completion.as_ref()
    }

    /// Consumes the sink, returning the collected bytes.
    pub fn into_bytes(self) -> Bytes {
        self.data.freeze()
    }
}

impl PushSink for BytesSink {
    async fn write(&mut self, data: &[u8]) -> Result<(), PumpError> {
        self.data.extend_from_slice(data);
        self.writes += 1;
        Ok(())
    }

    async fn flush(&mut self, _cancel: &CancellationToken) -> Result<FlushStatus, PumpError> {
        let saturated = self.limit.is_some_and(|limit| self.data.len() >= limit);
        Ok(FlushStatus { saturated })
    }

    async fn complete(&mut self, error: Option<&PumpError>) -> Result<(), PumpError> {
        if self.completion.is_none() {
            self.completion = Some(match error {
                None => Completion::Success,
                Some(e) if e.is_cancelled() => Completion::Cancelled,
                Some(e) => Completion::Failed(e.to_string()),
            });
        }
        Ok(())
    }
}

#[cfg(feature = "async-io")]
pub use self::async_io::{AsyncReadSource, AsyncWriteSink};

#[cfg(feature = "async-io")]
mod async_io {
    use std::pin::pin;

    use futures_io::{AsyncRead, AsyncWrite};
    use futures_util::future::{Either, select};
    use futures_util::{AsyncReadExt, AsyncWriteExt};
    use tokio_util::sync::CancellationToken;

    use crate::error::PumpError;
    use crate::pump::io::{FlushStatus, PullSource, PushSink};

    /// A [`PullSource`] over any `futures_io::AsyncRead`.
    #[derive(Debug)]
    pub struct AsyncReadSource<R> {
        reader: R,
    }

    impl<R> AsyncReadSource<R> {
        /// Wraps `reader`.
        pub fn new(reader: R) -> Self {
            Self { reader }
        }

        /// Returns the wrapped reader.
        pub fn into_inner(self) -> R {
            self.reader
        }
    }

    impl<R> PullSource for AsyncReadSource<R>
    where
        R: AsyncRead + Unpin + Send,
    {
        async fn read(
            &mut self,
            buf: &mut [u8],
            cancel: &CancellationToken,
        ) -> Result<usize, PumpError> {
            let cancelled = pin!(cancel.cancelled());
            match select(self.reader.read(buf), cancelled).await {
                Either::Left((result, _)) => Ok(result?),
                Either::Right(_) => Err(PumpError::Cancelled),
            }
        }
    }

    /// A [`PushSink`] over any `futures_io::AsyncWrite`.
    ///
    /// Never saturates. On successful completion the writer is closed; on
    /// failure it is left as is.
    #[derive(Debug)]
    pub struct AsyncWriteSink<W> {
        writer: W,
    }

    impl<W> AsyncWriteSink<W> {
        /// Wraps `writer`.
        pub fn new(writer: W) -> Self {
            Self { writer }
        }

        /// Returns the wrapped writer.
        pub fn into_inner(self) -> W {
            self.writer
        }
    }

    impl<W> PushSink for AsyncWriteSink<W>
    where
        W: AsyncWrite + Unpin + Send,
    {
        async fn write(&mut self, data: &[u8]) -> Result<(), PumpError> {
            self.writer.write_all(data).await?;
            Ok(())
        }

        async fn flush(&mut self, cancel: &CancellationToken) -> Result<FlushStatus, PumpError> {
            let cancelled = pin!(cancel.cancelled());
            match select(self.writer.flush(), cancelled).await {
                Either::Left((result, _)) => {
                    result?;
                    Ok(FlushStatus::ready())
                }
                Either::Right(_) => Err(PumpError::Cancelled),
            }
        }

        async fn complete(&mut self, error: Option<&PumpError>) -> Result<(), PumpError> {
            if error.is_none() {
                self.writer.close().await?;
            }
            Ok(())
        }
    }
}
