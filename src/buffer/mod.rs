//! Pooled buffer management.
//!
//! - [`ArrayPool`] - thread-safe pool of power-of-two sized arrays
//! - [`PooledBuffer`] - single-owner lease, returned on release or drop
//! - [`PoolStats`] - rental counters

mod pool;

pub use pool::{ArrayPool, PoolStats, PooledBuffer};
