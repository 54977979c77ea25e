//! The pump's pair of pooled buffers.

use crate::buffer::{ArrayPool, PooledBuffer};
use crate::error::PoolError;

/// Two pooled buffers and a flag naming the current one.
///
/// While one slot is written out the other is being filled; [`swap`](Self::swap)
/// exchanges their roles without moving any data.
pub(crate) struct DoubleBuffer {
    slots: [PooledBuffer<u8>; 2],
    current: usize,
}

impl DoubleBuffer {
    /// Rents both slots from `pool`.
    pub(crate) fn rent(pool: &ArrayPool<u8>, size: usize) -> Result<Self, PoolError> {
        let first = pool.rent(size)?;
        let second = pool.rent(size)?;
        Ok(Self {
            slots: [first, second],
            current: 0,
        })
    }

    pub(crate) fn current_mut(&mut self) -> &mut PooledBuffer<u8> {
        &mut self.slots[self.current]
    }

    /// Borrows `(current, next)` at the same time.
    pub(crate) fn split_mut(&mut self) -> (&mut PooledBuffer<u8>, &mut PooledBuffer<u8>) {
        let [a, b] = &mut self.slots;
        if self.current == 0 { (a, b) } else { (b, a) }
    }

    pub(crate) fn swap(&mut self) {
        self.current ^= 1;
    }

    /// Returns both slots to the pool. Safe to call more than once.
    pub(crate) fn release(&mut self) {
        for slot in &mut self.slots {
            slot.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;

    #[test]
    fn test_swap_exchanges_roles() {
        let pool = ArrayPool::<u8>::default();
        let mut slots = DoubleBuffer::rent(&pool, 16).unwrap();

        let (current, next) = slots.split_mut();
        current[0] = b'a';
        next[0] = b'b';

        slots.swap();
        assert_eq!(slots.current_mut()[0], b'b');
        let (current, next) = slots.split_mut();
        assert_eq!((current[0], next[0]), (b'b', b'a'));

        slots.swap();
        assert_eq!(slots.current_mut()[0], b'a');
    }

    #[test]
    fn test_release_returns_both_once() {
        let pool = ArrayPool::<u8>::default();
        let mut slots = DoubleBuffer::rent(&pool, 64).unwrap();
        slots.release();
        slots.release();
        drop(slots);

        let stats = pool.stats();
        assert_eq!(stats.rented, 2);
        assert_eq!(stats.returned, 2);
    }

    #[test]
    fn test_rent_failure_leaks_nothing() {
        let pool = ArrayPool::<u8>::new(PoolConfig::new(16, 64, 4).unwrap()).unwrap();
        assert!(DoubleBuffer::rent(&pool, 128).is_err());
        assert_eq!(pool.stats().outstanding(), 0);
    }
}
