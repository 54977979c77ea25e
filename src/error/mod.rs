//! Error types for b64pump.
//!
//! - [`CodecError`] - malformed Base64 input
//! - [`PoolError`] - invalid rentals and views
//! - [`PumpError`] - everything a transfer can fail with

use thiserror::Error;

/// Errors raised by eager (non-streaming) codec operations.
///
/// Streaming calls report expected conditions through
/// [`OperationStatus`](crate::OperationStatus) instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A symbol outside the expected alphabet was found.
    #[error("invalid base64 symbol at offset {offset}")]
    InvalidData {
        /// Position of the offending symbol.
        offset: usize,
    },

    /// The symbol count leaves a single dangling sextet (`length % 4 == 1`).
    #[error("invalid base64 length {length}: a group never leaves one symbol")]
    InvalidLength {
        /// The symbol count that was rejected.
        length: usize,
    },
}

/// Errors raised by [`ArrayPool`](crate::ArrayPool) and its buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PoolError {
    /// The requested size exceeds what the pool hands out.
    #[error("invalid buffer size {requested} (max {max})")]
    InvalidSize {
        /// The size that was asked for.
        requested: usize,
        /// The largest size the pool supports.
        max: usize,
    },

    /// A view was requested outside the buffer's live region.
    #[error("slice {start}..{start}+{len} is outside a buffer of length {capacity}")]
    InvalidSlice {
        /// Requested start offset.
        start: usize,
        /// Requested length.
        len: usize,
        /// Length of the live region.
        capacity: usize,
    },

    /// The buffer was already returned to its pool.
    #[error("buffer was already released")]
    Released,
}

/// Errors that end a [`Pump`](crate::Pump) transfer.
///
/// Errors produced by a source or sink are propagated unchanged.
#[derive(Debug, Error)]
pub enum PumpError {
    /// An I/O error from a source or sink.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The configured transform rejected the data.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Renting or viewing a buffer failed.
    #[error("pool error: {0}")]
    Pool(#[from] PoolError),

    /// Invalid configuration parameter.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// The transfer was cancelled cooperatively.
    #[error("transfer cancelled")]
    Cancelled,

    /// Any other failure raised by a collaborator.
    #[error(transparent)]
    Upstream(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl PumpError {
    /// Wraps an arbitrary collaborator error.
    pub fn upstream<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        PumpError::Upstream(Box::new(err))
    }

    /// Returns `true` if this is the cancellation signal.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PumpError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: PumpError = io_err.into();
        assert!(matches!(err, PumpError::Io(_)));
    }

    #[test]
    fn test_codec_error_conversion() {
        let err: PumpError = CodecError::InvalidLength { length: 5 }.into();
        assert!(matches!(
            err,
            PumpError::Codec(CodecError::InvalidLength { length: 5 })
        ));
    }

    #[test]
    fn test_display() {
        let err = PoolError::InvalidSize {
            requested: 100,
            max: 50,
        };
        assert!(err.to_string().contains("invalid buffer size"));
        assert!(
            CodecError::InvalidData { offset: 3 }
                .to_string()
                .contains("offset 3")
        );
    }

    #[test]
    fn test_upstream_is_transparent() {
        let inner = std::io::Error::other("sink on fire");
        let err = PumpError::upstream(inner);
        assert_eq!(err.to_string(), "sink on fire");
        assert!(!err.is_cancelled());
        assert!(PumpError::Cancelled.is_cancelled());
    }
}
