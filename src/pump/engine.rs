//! Double-buffered transfer loop.
//!
//! A [`Pump`] moves bytes from a [`PullSource`] to a [`PushSink`] through two
//! pooled buffers. While one buffer is transformed and written, the next read
//! is already filling the other one, so at most one read and one write are in
//! flight at any time. Writes are issued strictly in read order.
//!
//! # Example
//!
//! ```
//! use b64pump::{BytesSink, Pump, PumpConfig, StreamSource, Transform};
//! use bytes::Bytes;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> Result<(), b64pump::PumpError> {
//! let chunks = futures_util::stream::iter(vec![Ok(Bytes::from_static(b"+/8="))]);
//! let mut source = StreamSource::new(chunks);
//! let mut sink = BytesSink::new();
//!
//! let config = PumpConfig::default().with_transform(Transform::ToUrlSafe);
//! let pump = Pump::with_shared_pool(config)?;
//! pump.transfer(&mut source, &mut sink, &CancellationToken::new()).await?;
//!
//! assert_eq!(sink.data(), b"-_8");
//! # Ok(())
//! # }
//! ```

use std::io;

use futures_util::future::join;
use tokio_util::sync::CancellationToken;

use super::io::{FlushStatus, PullSource, PushSink};
use super::slots::DoubleBuffer;
use crate::buffer::ArrayPool;
use crate::codec::{PAD, make_url_safe, required_padding, revert_symbols};
use crate::config::{PumpConfig, Transform};
use crate::error::PumpError;

const PADDING: [u8; 2] = [PAD; 2];

/// How a successful transfer ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TransferEnd {
    /// The source reported end of stream.
    #[default]
    Exhausted,
    /// The sink asked for no more data.
    Saturated,
}

/// Counters of a finished transfer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TransferSummary {
    /// Bytes delivered by the source, including a drained read that was
    /// never written.
    pub bytes_read: u64,
    /// Bytes handed to the sink.
    pub bytes_written: u64,
    /// Number of `write` calls on the sink.
    pub writes: u64,
    /// Why the transfer stopped.
    pub end: TransferEnd,
}

/// Double-buffered source-to-sink transfer.
#[derive(Debug, Clone)]
pub struct Pump {
    pool: ArrayPool<u8>,
    config: PumpConfig,
}

impl Pump {
    /// Creates a pump renting from `pool`.
    ///
    /// # Errors
    ///
    /// Returns [`PumpError::InvalidConfig`] if `config` does not validate or
    /// its buffer size exceeds what `pool` hands out.
    pub fn new(pool: ArrayPool<u8>, config: PumpConfig) -> Result<Self, PumpError> {
        config.validate()?;
        if config.buffer_size() > pool.config().max_buffer_size() {
            return Err(PumpError::InvalidConfig {
                message: "buffer_size cannot be greater than the pool's max_buffer_size",
            });
        }
        Ok(Self { pool, config })
    }

    /// Creates a pump renting from [`ArrayPool::shared`].
    pub fn with_shared_pool(config: PumpConfig) -> Result<Self, PumpError> {
        Self::new(ArrayPool::shared().clone(), config)
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PumpConfig {
        &self.config
    }

    /// Returns the pool buffers are rented from.
    pub fn pool(&self) -> &ArrayPool<u8> {
        &self.pool
    }

    /// Moves everything from `source` to `sink`.
    ///
    /// The transfer stops when the source is exhausted, the sink reports
    /// saturation, `cancel` fires, or any step fails. In every case both
    /// buffers go back to the pool and `sink.complete` is called exactly once:
    /// with `None` on success, otherwise with the error that is then returned
    /// unchanged.
    ///
    /// # Errors
    ///
    /// - [`PumpError::Cancelled`] if cancellation was observed
    /// - [`PumpError::Codec`] if the transform rejected the data
    /// - any error raised by `source` or `sink`
    pub async fn transfer<S, K>(
        &self,
        source: &mut S,
        sink: &mut K,
        cancel: &CancellationToken,
    ) -> Result<TransferSummary, PumpError>
    where
        S: PullSource,
        K: PushSink,
    {
        tracing::debug!(
            buffer_size = self.config.buffer_size(),
            transform = ?self.config.transform(),
            "transfer starting"
        );

        let result = self.run(source, sink, cancel).await;

        match result {
            Ok(summary) => {
                sink.complete(None).await?;
                tracing::debug!(
                    bytes_read = summary.bytes_read,
                    bytes_written = summary.bytes_written,
                    writes = summary.writes,
                    end = ?summary.end,
                    "transfer complete"
                );
                Ok(summary)
            }
            Err(err) => {
                if let Err(complete_err) = sink.complete(Some(&err)).await {
                    tracing::warn!(error = %complete_err, "sink failed to complete");
                }
                if err.is_cancelled() {
                    tracing::debug!("transfer cancelled");
                } else {
                    tracing::debug!(error = %err, "transfer failed");
                }
                Err(err)
            }
        }
    }

    /// Rents the slots, pumps, and releases the slots on every exit path.
    async fn run<S, K>(
        &self,
        source: &mut S,
        sink: &mut K,
        cancel: &CancellationToken,
    ) -> Result<TransferSummary, PumpError>
    where
        S: PullSource,
        K: PushSink,
    {
        let mut slots = DoubleBuffer::rent(&self.pool, self.config.buffer_size())?;
        let result = self.pump(&mut slots, source, sink, cancel).await;
        slots.release();
        result
    }

    async fn pump<S, K>(
        &self,
        slots: &mut DoubleBuffer,
        source: &mut S,
        sink: &mut K,
        cancel: &CancellationToken,
    ) -> Result<TransferSummary, PumpError>
    where
        S: PullSource,
        K: PushSink,
    {
        let mut summary = TransferSummary::default();
        let mut transform = TransformState::new(self.config.transform());

        if cancel.is_cancelled() {
            return Err(PumpError::Cancelled);
        }
        let current = slots.current_mut();
        let mut filled = checked_fill(source.read(current, cancel).await?, current.len())?;
        summary.bytes_read += filled as u64;

        while filled > 0 {
            if cancel.is_cancelled() {
                return Err(PumpError::Cancelled);
            }

            let (current, next) = slots.split_mut();
            let capacity = next.len();
            let read = source.read(next, cancel);
            let write = async {
                let data = transform.apply(&mut current[..filled])?;
                if data.is_empty() {
                    return Ok::<_, PumpError>(None);
                }
                sink.write(data).await?;
                let status = sink.flush(cancel).await?;
                Ok(Some((data.len(), status)))
            };
            let (read, written) = join(read, write).await;

            let (len, status) = match written? {
                Some((len, status)) => {
                    summary.writes += 1;
                    summary.bytes_written += len as u64;
                    (len, status)
                }
                None => (0, FlushStatus::ready()),
            };

            let next_filled = checked_fill(read?, capacity)?;
            summary.bytes_read += next_filled as u64;
            tracing::trace!(written = len, read = next_filled, "pump iteration");

            if status.saturated {
                tracing::debug!(
                    discarded = next_filled,
                    "sink saturated, stopping reads"
                );
                summary.end = TransferEnd::Saturated;
                return Ok(summary);
            }

            slots.swap();
            filled = next_filled;
        }

        let padding = transform.finish()?;
        if !padding.is_empty() {
            sink.write(padding).await?;
            sink.flush(cancel).await?;
            summary.writes += 1;
            summary.bytes_written += padding.len() as u64;
        }

        Ok(summary)
    }
}

/// Rejects a source that claims to have filled more than it was given.
fn checked_fill(filled: usize, capacity: usize) -> Result<usize, PumpError> {
    if filled > capacity {
        return Err(PumpError::Io(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("source reported {filled} bytes read into a buffer of {capacity}"),
        )));
    }
    Ok(filled)
}

/// Per-transfer state of the configured [`Transform`].
struct TransformState {
    transform: Transform,
    /// Symbols seen so far, for `FromUrlSafe` error offsets and padding.
    symbols: usize,
    /// `ToUrlSafe` hit a padding symbol; nothing after it is text.
    ended: bool,
}

impl TransformState {
    fn new(transform: Transform) -> Self {
        Self {
            transform,
            symbols: 0,
            ended: false,
        }
    }

    /// Transforms `data` in place, returning the part to write.
    fn apply<'a>(&mut self, data: &'a mut [u8]) -> Result<&'a [u8], PumpError> {
        match self.transform {
            Transform::None => Ok(data),
            Transform::ToUrlSafe => {
                if self.ended {
                    return Ok(&[]);
                }
                let len = make_url_safe(&mut *data);
                self.ended = len < data.len();
                Ok(&data[..len])
            }
            Transform::FromUrlSafe => {
                revert_symbols(&mut *data, self.symbols)?;
                self.symbols += data.len();
                Ok(data)
            }
        }
    }

    /// Trailing bytes to emit once the source is exhausted.
    fn finish(&self) -> Result<&'static [u8], PumpError> {
        match self.transform {
            Transform::FromUrlSafe => {
                let padding = required_padding(self.symbols)?;
                Ok(&PADDING[..padding])
            }
            Transform::None | Transform::ToUrlSafe => Ok(&[]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;
    use crate::error::CodecError;

    #[test]
    fn test_pump_rejects_oversized_buffer() {
        let pool = ArrayPool::new(PoolConfig::new(16, 1024, 2).unwrap()).unwrap();
        let err = Pump::new(pool, PumpConfig::new(2048).unwrap()).unwrap_err();
        assert!(matches!(err, PumpError::InvalidConfig { .. }));
    }

    #[test]
    fn test_checked_fill_rejects_overrun() {
        assert_eq!(checked_fill(16, 16).unwrap(), 16);
        assert!(matches!(checked_fill(17, 16), Err(PumpError::Io(_))));
    }

    #[test]
    fn test_transform_none_passes_through() {
        let mut state = TransformState::new(Transform::None);
        let mut data = *b"+/==";
        assert_eq!(state.apply(&mut data).unwrap(), b"+/==");
        assert!(state.finish().unwrap().is_empty());
    }

    #[test]
    fn test_transform_to_url_safe_stops_after_padding() {
        let mut state = TransformState::new(Transform::ToUrlSafe);
        let mut first = *b"ab+/";
        assert_eq!(state.apply(&mut first).unwrap(), b"ab-_");
        let mut second = *b"8=\n";
        assert_eq!(state.apply(&mut second).unwrap(), b"8");
        let mut third = *b"more";
        assert!(state.apply(&mut third).unwrap().is_empty());
    }

    #[test]
    fn test_transform_from_url_safe_pads_at_end() {
        let mut state = TransformState::new(Transform::FromUrlSafe);
        let mut first = *b"-_";
        assert_eq!(state.apply(&mut first).unwrap(), b"+/");
        let mut second = *b"8";
        assert_eq!(state.apply(&mut second).unwrap(), b"8");
        assert_eq!(state.finish().unwrap(), b"=");
    }

    #[test]
    fn test_transform_from_url_safe_errors() {
        let mut state = TransformState::new(Transform::FromUrlSafe);
        let mut first = *b"abcd";
        state.apply(&mut first).unwrap();
        let mut second = *b"e+";
        assert!(matches!(
            state.apply(&mut second),
            Err(PumpError::Codec(CodecError::InvalidData { offset: 5 }))
        ));

        let mut state = TransformState::new(Transform::FromUrlSafe);
        let mut data = *b"abcde";
        state.apply(&mut data).unwrap();
        assert!(matches!(
            state.finish(),
            Err(PumpError::Codec(CodecError::InvalidLength { length: 5 }))
        ));
    }
}
