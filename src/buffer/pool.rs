//! Shared array pool with single-owner buffer leases.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::config::{MIN_BUCKET_SIZE, PoolConfig};
use crate::error::{PoolError, PumpError};

/// A thread-safe pool of fixed-capacity arrays.
///
/// Arrays are kept in power-of-two size classes. Cloning an `ArrayPool` is
/// cheap and yields a handle to the same pool, so one pool can be shared by
/// any number of unrelated transfers.
///
/// # Example
///
/// ```
/// use b64pump::{ArrayPool, PoolConfig};
///
/// let pool = ArrayPool::<u8>::new(PoolConfig::default())?;
/// let mut buf = pool.rent(1000)?;
/// assert_eq!(buf.len(), 1024);
/// buf[0] = b'A';
///
/// buf.release();
/// assert_eq!(pool.stats().outstanding(), 0);
/// # Ok::<(), b64pump::PumpError>(())
/// ```
pub struct ArrayPool<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    config: PoolConfig,
    buckets: Vec<Mutex<Vec<Vec<T>>>>,
    rented: AtomicU64,
    returned: AtomicU64,
}

/// Snapshot of pool activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Buffers handed out since creation.
    pub rented: u64,
    /// Buffers given back since creation.
    pub returned: u64,
    /// Idle arrays currently held for reuse.
    pub retained: usize,
}

impl PoolStats {
    /// Buffers rented and not yet released.
    pub fn outstanding(&self) -> u64 {
        self.rented.saturating_sub(self.returned)
    }
}

impl<T> Clone for ArrayPool<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> ArrayPool<T> {
    /// Creates a new pool.
    ///
    /// # Errors
    ///
    /// Returns [`PumpError::InvalidConfig`] if `config` does not validate.
    pub fn new(config: PoolConfig) -> Result<Self, PumpError> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: PoolConfig) -> Self {
        let classes = bucket_index(config.max_buffer_size().next_power_of_two()) + 1;
        Self {
            inner: Arc::new(Inner {
                config,
                buckets: (0..classes).map(|_| Mutex::new(Vec::new())).collect(),
                rented: AtomicU64::new(0),
                returned: AtomicU64::new(0),
            }),
        }
    }

    /// Returns the pool configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }

    /// Returns a snapshot of pool activity.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            rented: self.inner.rented.load(Ordering::Acquire),
            returned: self.inner.returned.load(Ordering::Acquire),
            retained: self.inner.buckets.iter().map(|b| b.lock().len()).sum(),
        }
    }

    /// Returns `true` if both handles refer to the same pool.
    pub fn same_pool(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn give_back(&self, array: Vec<T>) {
        let size = array.len();
        let mut bucket = self.inner.buckets[bucket_index(size)].lock();
        if bucket.len() < self.inner.config.max_arrays_per_bucket() {
            bucket.push(array);
        } else {
            tracing::trace!(size, "pool bucket full, dropping array");
        }
        drop(bucket);
        self.inner.returned.fetch_add(1, Ordering::AcqRel);
    }
}

impl<T: Copy + Default> ArrayPool<T> {
    /// Rents a buffer holding at least `min_size` elements.
    ///
    /// A `min_size` of zero rents the configured default size. The live view
    /// of the returned buffer spans its whole capacity.
    ///
    /// Reused arrays are not cleared.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidSize`] if `min_size` exceeds the pool's
    /// `max_buffer_size`.
    pub fn rent(&self, min_size: usize) -> Result<PooledBuffer<T>, PoolError> {
        let config = &self.inner.config;
        let requested = if min_size == 0 {
            config.default_buffer_size()
        } else {
            min_size
        };
        if requested > config.max_buffer_size() {
            return Err(PoolError::InvalidSize {
                requested: min_size,
                max: config.max_buffer_size(),
            });
        }

        let size = requested.next_power_of_two().max(MIN_BUCKET_SIZE);
        let reused = self.inner.buckets[bucket_index(size)].lock().pop();
        let array = match reused {
            Some(array) => {
                tracing::trace!(size, "pool hit");
                array
            }
            None => {
                tracing::trace!(size, "pool miss, allocating");
                vec![T::default(); size]
            }
        };
        self.inner.rented.fetch_add(1, Ordering::AcqRel);

        Ok(PooledBuffer {
            len: array.len(),
            array: Some(array),
            pool: self.clone(),
        })
    }
}

impl ArrayPool<u8> {
    /// Returns the process-wide byte pool, creating it on first use.
    ///
    /// Prefer passing an explicit pool where testability matters.
    pub fn shared() -> &'static ArrayPool<u8> {
        static SHARED: OnceLock<ArrayPool<u8>> = OnceLock::new();
        SHARED.get_or_init(ArrayPool::default)
    }
}

impl<T> Default for ArrayPool<T> {
    fn default() -> Self {
        Self::from_config(PoolConfig::default())
    }
}

impl<T> fmt::Debug for ArrayPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayPool")
            .field("config", &self.inner.config)
            .field("rented", &self.inner.rented.load(Ordering::Relaxed))
            .field("returned", &self.inner.returned.load(Ordering::Relaxed))
            .finish()
    }
}

/// Size class index of a power-of-two `size`.
fn bucket_index(size: usize) -> usize {
    let size = size.max(MIN_BUCKET_SIZE);
    (size.trailing_zeros() - MIN_BUCKET_SIZE.trailing_zeros()) as usize
}

/// A pooled buffer held by exactly one owner.
///
/// The buffer derefs to its live view: the first [`len`](Self::len) elements
/// of the rented array. Ownership moves with the value; the array itself is
/// never copied. Dropping or [`release`](Self::release)-ing returns the array
/// to its pool; releasing more than once is a no-op.
pub struct PooledBuffer<T> {
    array: Option<Vec<T>>,
    len: usize,
    pool: ArrayPool<T>,
}

impl<T> PooledBuffer<T> {
    /// Logical length of the live view.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the live view is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of the rented array, or zero once released.
    pub fn capacity(&self) -> usize {
        self.array.as_ref().map_or(0, Vec::len)
    }

    /// Returns `true` once the array went back to the pool.
    pub fn is_released(&self) -> bool {
        self.array.is_none()
    }

    /// Resizes the live view.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidSlice`] if `len` exceeds the capacity, or
    /// [`PoolError::Released`].
    pub fn set_len(&mut self, len: usize) -> Result<(), PoolError> {
        let capacity = self.array.as_ref().ok_or(PoolError::Released)?.len();
        if len > capacity {
            return Err(PoolError::InvalidSlice {
                start: 0,
                len,
                capacity,
            });
        }
        self.len = len;
        Ok(())
    }

    /// Borrows `len` elements of the live view starting at `start`.
    ///
    /// The view does not own anything; this buffer stays responsible for the
    /// release.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidSlice`] if the range leaves the live view, or
    /// [`PoolError::Released`].
    pub fn slice(&self, start: usize, len: usize) -> Result<&[T], PoolError> {
        let range = self.checked_range(start, len)?;
        let array = self.array.as_deref().ok_or(PoolError::Released)?;
        Ok(&array[range])
    }

    /// Mutable counterpart of [`slice`](Self::slice).
    pub fn slice_mut(&mut self, start: usize, len: usize) -> Result<&mut [T], PoolError> {
        let range = self.checked_range(start, len)?;
        let array = self.array.as_deref_mut().ok_or(PoolError::Released)?;
        Ok(&mut array[range])
    }

    fn checked_range(&self, start: usize, len: usize) -> Result<std::ops::Range<usize>, PoolError> {
        if self.array.is_none() {
            return Err(PoolError::Released);
        }
        match start.checked_add(len) {
            Some(end) if end <= self.len => Ok(start..end),
            _ => Err(PoolError::InvalidSlice {
                start,
                len,
                capacity: self.len,
            }),
        }
    }

    /// Returns the array to its pool.
    ///
    /// Idempotent: only the first call has an effect.
    pub fn release(&mut self) {
        if let Some(array) = self.array.take() {
            self.len = 0;
            self.pool.give_back(array);
        }
    }
}

impl<T> Deref for PooledBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        match &self.array {
            Some(array) => &array[..self.len],
            None => &[],
        }
    }
}

impl<T> DerefMut for PooledBuffer<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        match &mut self.array {
            Some(array) => &mut array[..self.len],
            None => &mut [],
        }
    }
}

impl<T> Drop for PooledBuffer<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T> fmt::Debug for PooledBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledBuffer")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .field("released", &self.is_released())
            .finish()
    }
}
