//! Configuration for pooling and pumping.
//!
//! This module provides types to configure how buffers are pooled and how a
//! transfer is performed:
//!
//! - [`PoolConfig`] - Buffer size limits and retention of an [`ArrayPool`](crate::ArrayPool)
//! - [`PumpConfig`] - Buffer size and transform of a [`Pump`](crate::Pump)
//! - [`Transform`] - Alphabet conversion applied to each buffer in flight
//!
//! # Example
//!
//! ```
//! use b64pump::{PoolConfig, PumpConfig, Transform};
//!
//! let pool = PoolConfig::new(8192, 1 << 20, 16)?;
//!
//! let pump = PumpConfig::new(8192)?.with_transform(Transform::ToUrlSafe);
//!
//! # Ok::<(), b64pump::PumpError>(())
//! ```

use crate::error::PumpError;

/// Default size of a rented buffer (4 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 4 * 1024;

/// Default largest buffer a pool hands out (1 MiB).
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 1024 * 1024;

/// Default number of idle buffers retained per size class.
pub const DEFAULT_MAX_ARRAYS_PER_BUCKET: usize = 32;

/// Smallest size class; smaller requests are rounded up to it.
pub const MIN_BUCKET_SIZE: usize = 16;

/// Configuration for an [`ArrayPool`](crate::ArrayPool).
///
/// Buffers are grouped into power-of-two size classes between
/// [`MIN_BUCKET_SIZE`] and `max_buffer_size`. Each class retains at most
/// `max_arrays_per_bucket` idle buffers; extra returns are dropped.
///
/// # Example
///
/// ```
/// use b64pump::PoolConfig;
///
/// let config = PoolConfig::default()
///     .with_default_buffer_size(16 * 1024)
///     .with_max_arrays_per_bucket(8);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolConfig {
    /// Size rented when a caller asks for zero elements.
    default_buffer_size: usize,

    /// Largest size the pool accepts.
    max_buffer_size: usize,

    /// Idle buffers kept per size class.
    max_arrays_per_bucket: usize,
}

impl PoolConfig {
    /// Creates a new pool configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PumpError::InvalidConfig`] if:
    /// - `default_buffer_size` is zero
    /// - `default_buffer_size > max_buffer_size`
    /// - `max_buffer_size` has no power-of-two size class (above `usize::MAX / 2 + 1`)
    pub fn new(
        default_buffer_size: usize,
        max_buffer_size: usize,
        max_arrays_per_bucket: usize,
    ) -> Result<Self, PumpError> {
        if default_buffer_size == 0 {
            return Err(PumpError::InvalidConfig {
                message: "default_buffer_size must be non-zero",
            });
        }

        if default_buffer_size > max_buffer_size {
            return Err(PumpError::InvalidConfig {
                message: "default_buffer_size cannot be greater than max_buffer_size",
            });
        }

        if max_buffer_size.checked_next_power_of_two().is_none() {
            return Err(PumpError::InvalidConfig {
                message: "max_buffer_size is too large for a power-of-two size class",
            });
        }

        Ok(Self {
            default_buffer_size,
            max_buffer_size,
            max_arrays_per_bucket,
        })
    }

    /// Sets the size rented for a zero-sized request.
    pub fn with_default_buffer_size(mut self, size: usize) -> Self {
        self.default_buffer_size = size;
        self
    }

    /// Sets the largest size the pool accepts.
    pub fn with_max_buffer_size(mut self, size: usize) -> Self {
        self.max_buffer_size = size;
        self
    }

    /// Sets how many idle buffers each size class retains.
    pub fn with_max_arrays_per_bucket(mut self, count: usize) -> Self {
        self.max_arrays_per_bucket = count;
        self
    }

    /// Returns the size rented for a zero-sized request.
    pub fn default_buffer_size(&self) -> usize {
        self.default_buffer_size
    }

    /// Returns the largest size the pool accepts.
    pub fn max_buffer_size(&self) -> usize {
        self.max_buffer_size
    }

    /// Returns how many idle buffers each size class retains.
    pub fn max_arrays_per_bucket(&self) -> usize {
        self.max_arrays_per_bucket
    }

    /// Validates the current configuration.
    pub fn validate(&self) -> Result<(), PumpError> {
        Self::new(
            self.default_buffer_size,
            self.max_buffer_size,
            self.max_arrays_per_bucket,
        )
        .map(|_| ())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            default_buffer_size: DEFAULT_BUFFER_SIZE,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            max_arrays_per_bucket: DEFAULT_MAX_ARRAYS_PER_BUCKET,
        }
    }
}

/// Alphabet conversion a [`Pump`](crate::Pump) applies to each buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Transform {
    /// Bytes are forwarded untouched.
    #[default]
    None,

    /// Standard Base64 text is rewritten to the URL-safe alphabet and its
    /// padding is dropped.
    ToUrlSafe,

    /// URL-safe text is rewritten to the standard alphabet and padding is
    /// appended at the end of the stream.
    FromUrlSafe,
}

/// Configuration for a [`Pump`](crate::Pump).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PumpConfig {
    /// Minimum size of each of the two pooled buffers.
    buffer_size: usize,

    /// Conversion applied between read and write.
    transform: Transform,
}

impl PumpConfig {
    /// Creates a configuration with the given buffer size and no transform.
    ///
    /// # Errors
    ///
    /// Returns [`PumpError::InvalidConfig`] if `buffer_size` is zero.
    pub fn new(buffer_size: usize) -> Result<Self, PumpError> {
        if buffer_size == 0 {
            return Err(PumpError::InvalidConfig {
                message: "buffer_size must be non-zero",
            });
        }

        Ok(Self {
            buffer_size,
            transform: Transform::None,
        })
    }

    /// Sets the buffer size.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Sets the transform.
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Returns the buffer size.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Returns the transform.
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Validates the current configuration.
    pub fn validate(&self) -> Result<(), PumpError> {
        Self::new(self.buffer_size).map(|_| ())
    }
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            transform: Transform::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_config_default() {
        let config = PoolConfig::default();
        assert_eq!(config.default_buffer_size(), 4 * 1024);
        assert_eq!(config.max_buffer_size(), 1024 * 1024);
        assert_eq!(config.max_arrays_per_bucket(), 32);
    }

    #[test]
    fn test_pool_config_builder() {
        let config = PoolConfig::default()
            .with_default_buffer_size(8192)
            .with_max_buffer_size(65536)
            .with_max_arrays_per_bucket(2);
        assert_eq!(config.default_buffer_size(), 8192);
        assert_eq!(config.max_buffer_size(), 65536);
        assert_eq!(config.max_arrays_per_bucket(), 2);
    }

    #[test]
    fn test_pool_config_invalid() {
        assert!(PoolConfig::new(0, 1024, 4).is_err());
        assert!(PoolConfig::new(2048, 1024, 4).is_err());
        assert!(PoolConfig::new(1024, 1024, 0).is_ok());
    }

    #[test]
    fn test_pool_config_validate() {
        let config = PoolConfig::default().with_max_buffer_size(16);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pool_config_max_size_bound() {
        let largest = 1usize << (usize::BITS - 1);
        assert!(PoolConfig::new(4096, largest, 4).is_ok());
        assert!(PoolConfig::new(4096, largest + 1, 4).is_err());
        assert!(
            PoolConfig::default()
                .with_max_buffer_size(usize::MAX)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_pump_config() {
        let config = PumpConfig::new(1024).unwrap().with_transform(Transform::FromUrlSafe);
        assert_eq!(config.buffer_size(), 1024);
        assert_eq!(config.transform(), Transform::FromUrlSafe);
        assert_eq!(PumpConfig::default().transform(), Transform::None);
    }

    #[test]
    fn test_pump_config_invalid_zero() {
        assert!(PumpConfig::new(0).is_err());
        assert!(PumpConfig::default().with_buffer_size(0).validate().is_err());
    }
}
