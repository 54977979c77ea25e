//! Boundary contracts between the pump and its collaborators.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::PumpError;

/// A pull-based byte source.
///
/// Implementations should honor `cancel` and return
/// [`PumpError::Cancelled`] once it fires.
pub trait PullSource {
    /// Reads into `buf`, returning the number of bytes filled.
    ///
    /// `Ok(0)` means end of stream.
    fn read(
        &mut self,
        buf: &mut [u8],
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<usize, PumpError>> + Send;
}

/// Result of [`PushSink::flush`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FlushStatus {
    /// The sink wants no more data; the pump stops reading.
    pub saturated: bool,
}

impl FlushStatus {
    /// The sink accepts more data.
    pub const fn ready() -> Self {
        Self { saturated: false }
    }

    /// The sink is full or already done.
    pub const fn saturated() -> Self {
        Self { saturated: true }
    }
}

/// A push-based byte sink.
pub trait PushSink {
    /// Accepts `data`. The slice is only valid for the duration of the call.
    fn write(&mut self, data: &[u8]) -> impl Future<Output = Result<(), PumpError>> + Send;

    /// Flushes written data and reports whether more is wanted.
    fn flush(
        &mut self,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<FlushStatus, PumpError>> + Send;

    /// Signals the end of the transfer, exactly once.
    ///
    /// `error` is `None` on success, [`PumpError::Cancelled`] after
    /// cancellation, or the failure that ended the transfer.
    fn complete(
        &mut self,
        error: Option<&PumpError>,
    ) -> impl Future<Output = Result<(), PumpError>> + Send;
}
