//! b64pump
//!
//! Streaming URL-safe Base64 transcoding over pooled buffers.
//!
//! `b64pump` converts Base64 text between the standard and URL-safe
//! alphabets and moves it through an async pipeline without per-chunk
//! allocation. It is designed as a small, composable primitive for:
//!
//! - tokens and identifiers embedded in URLs and file names
//! - re-encoding large Base64 payloads on the fly
//! - bridging sources and sinks that disagree on the alphabet
//!
//! The crate intentionally:
//! - does NOT pick an async runtime
//! - does NOT persist anything
//! - does NOT provide cryptographic guarantees
//!
//! It does three things: **substitute symbols, pool buffers, pump bytes**.
//!
//! # Codec
//!
//! ```
//! use b64pump::{make_url_safe, revert_url_safe};
//!
//! let mut text = *b"Zg==";
//! let len = make_url_safe(&mut text[..]);
//! assert_eq!(&text[..len], b"Zg");
//!
//! let (len, padding) = revert_url_safe(&mut text[..len])?;
//! assert_eq!((len, padding), (2, 2));
//! # Ok::<(), b64pump::CodecError>(())
//! ```
//!
//! # Pump
//!
//! ```ignore
//! use b64pump::{AsyncReadSource, AsyncWriteSink, Pump, PumpConfig, Transform};
//! use tokio_util::compat::{TokioAsyncReadCompatExt, TokioAsyncWriteCompatExt};
//! use tokio_util::sync::CancellationToken;
//!
//! async fn demo() -> Result<(), b64pump::PumpError> {
//!     let input = tokio::fs::File::open("payload.b64").await?;
//!     let output = tokio::fs::File::create("payload.url").await?;
//!
//!     let pump = Pump::with_shared_pool(PumpConfig::default().with_transform(Transform::ToUrlSafe))?;
//!     let summary = pump
//!         .transfer(
//!             &mut AsyncReadSource::new(input.compat()),
//!             &mut AsyncWriteSink::new(output.compat_write()),
//!             &CancellationToken::new(),
//!         )
//!         .await?;
//!     println!("{} bytes written", summary.bytes_written);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod buffer;
mod codec;
mod config;
mod error;
mod pump;

//
// Public surface
//

pub use buffer::{ArrayPool, PoolStats, PooledBuffer};
pub use codec::{
    CodecOutcome, OperationStatus, Symbol, decode, decode_url_safe, encode, encode_url_safe,
    make_url_safe, required_padding, revert_url_safe, url_safe_decoded_len,
    url_safe_encoded_len,
};
pub use config::{PoolConfig, PumpConfig, Transform};
pub use error::{CodecError, PoolError, PumpError};
pub use pump::{
    BytesSink, Completion, FlushStatus, PullSource, Pump, PushSink, StreamSource, TransferEnd,
    TransferSummary,
};

#[cfg(feature = "async-io")]
pub use pump::{AsyncReadSource, AsyncWriteSink};

pub use tokio_util::sync::CancellationToken;
