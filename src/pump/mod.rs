//! Double-buffered asynchronous transfer.
//!
//! - [`Pump`] - moves bytes from a source to a sink through two pooled
//!   buffers, optionally applying a [`Transform`](crate::Transform)
//! - [`PullSource`] / [`PushSink`] - the collaborator contracts
//! - [`StreamSource`], [`BytesSink`], and (feature `async-io`)
//!   [`AsyncReadSource`] / [`AsyncWriteSink`] - ready-made adapters

mod adapters;
mod engine;
mod io;
mod slots;

pub use adapters::{BytesSink, Completion, StreamSource};
#[cfg(feature = "async-io")]
pub use adapters::{AsyncReadSource, AsyncWriteSink};
pub use engine::{Pump, TransferEnd, TransferSummary};
pub use io::{FlushStatus, PullSource, PushSink};
