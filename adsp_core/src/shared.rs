//! Cache-coherency wrapper for cross-core shared state.
//!
//! `Shared<T>` centralizes that discipline: instead of cache
//! invalidate/writeback calls scattered through buffer and component code,
//! every access to cross-core state goes through `read`/`write`,
//! which take an explicit byte range and invoke an injectable [`CacheOps`].
//! Byte-range precision is preserved end to end — callers pass the region
//! they are about to touch, not "the whole object".

use core::ops::Range;

/// Platform cache-maintenance operations, bounded to a byte range.
///
/// Implementations on real silicon issue the DCACHE invalidate/clean
/// instructions for the given range; the host-simulation implementation is
/// a no-op (there is no coherency domain to cross on one host CPU), kept
/// distinct so call sites are exercised even though the operation itself
/// does nothing.
pub trait CacheOps {
    /// Invalidate the given byte range before a read observes it.
    fn invalidate(&self, range: Range<usize>);

    /// Write back the given byte range after a write produced it.
    fn writeback(&self, range: Range<usize>);
}

/// No-op cache operations for the host-simulation target.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCacheOps;

impl CacheOps for NullCacheOps {
    fn invalidate(&self, _range: Range<usize>) {}
    fn writeback(&self, _range: Range<usize>) {}
}

/// Wraps a value that may be observed from more than one coherency domain.
///
/// `T` is usually a POD-ish struct (buffer bookkeeping, component private
/// state) whose byte layout the cache-maintenance instructions operate on.
/// Pipeline and component code never calls [`CacheOps`] directly; it goes
/// through `read`/`write` on this type instead.
pub struct Shared<T, C: CacheOps> {
    value: T,
    cache: C,
}

impl<T, C: CacheOps> Shared<T, C> {
    pub fn new(value: T, cache: C) -> Self {
        Self { value, cache }
    }

    /// Read-only access to `byte_range` of the wrapped value, preceded by a
    /// cache invalidate bounded to that range.
    pub fn read<R>(&self, byte_range: Range<usize>, f: impl FnOnce(&T) -> R) -> R {
        self.cache.invalidate(byte_range);
        f(&self.value)
    }

    /// Mutable access to `byte_range` of the wrapped value, followed by a
    /// cache writeback bounded to that range.
    pub fn write<R>(&mut self, byte_range: Range<usize>, f: impl FnOnce(&mut T) -> R) -> R {
        let result = f(&mut self.value);
        self.cache.writeback(byte_range);
        result
    }

    /// Perform the invalidate/writeback pair as two ranges, used when a
    /// circular region wraps and the touched bytes are not contiguous.
    pub fn write_split<R>(&mut self, first: Range<usize>, second: Range<usize>, f: impl FnOnce(&mut T) -> R) -> R {
        let result = f(&mut self.value);
        self.cache.writeback(first);
        self.cache.writeback(second);
        result
    }
}
