//! The audio buffer entity (§3/§4.2): a circular byte-level producer/
//! consumer FIFO owned by one source component and drained by one sink
//! component.

use adsp_core::{BufferId, CacheOps, CoreError, NullCacheOps, Result, Shared};

use crate::format::{SetParamsMode, StreamParams};

/// The mutable bookkeeping a buffer carries: pointers and counters only.
/// Kept as its own struct so it is exactly what gets wrapped in
/// `Shared<BufferState, C>` when the buffer crosses a coherency domain.
struct BufferState {
    storage: Vec<u8>,
    read_offset: usize,
    write_offset: usize,
    avail: usize,
    free: usize,
}

impl BufferState {
    fn new(alloc_size: usize) -> Self {
        Self {
            storage: vec![0u8; alloc_size],
            read_offset: 0,
            write_offset: 0,
            avail: 0,
            free: alloc_size,
        }
    }
}

/// Holds the buffer's mutable state either directly, or behind a
/// `Shared<T>` cache wrapper when the buffer is cross-core. Unshared
/// buffers never pay for the wrapper's indirection.
enum StateHolder<C: CacheOps> {
    Local(BufferState),
    Shared(Shared<BufferState, C>),
}

impl<C: CacheOps> StateHolder<C> {
    fn read<R>(&self, range: core::ops::Range<usize>, f: impl FnOnce(&BufferState) -> R) -> R {
        match self {
            StateHolder::Local(state) => f(state),
            StateHolder::Shared(shared) => shared.read(range, f),
        }
    }

    fn write<R>(&mut self, range: core::ops::Range<usize>, f: impl FnOnce(&mut BufferState) -> R) -> R {
        match self {
            StateHolder::Local(state) => f(state),
            StateHolder::Shared(shared) => shared.write(range, f),
        }
    }

    fn write_split<R>(
        &mut self,
        first: core::ops::Range<usize>,
        second: core::ops::Range<usize>,
        f: impl FnOnce(&mut BufferState) -> R,
    ) -> R {
        match self {
            StateHolder::Local(state) => f(state),
            StateHolder::Shared(shared) => shared.write_split(first, second, f),
        }
    }
}

/// A circular byte-level FIFO between a source and a sink component.
pub struct AudioBuffer<C: CacheOps = NullCacheOps> {
    id: BufferId,
    alloc_size: usize,
    size: usize,
    params: Option<StreamParams>,
    overrun_permitted: bool,
    underrun_permitted: bool,
    shared: bool,
    state: StateHolder<C>,
}

impl AudioBuffer<NullCacheOps> {
    /// Allocate a buffer of `size` bytes. `shared` starts false; a buffer
    /// becomes shared only when `mark_shared` is called during connection
    /// (a component's core differs from the buffer's core).
    pub fn new(size: usize, overrun_permitted: bool, underrun_permitted: bool) -> Self {
        Self {
            id: BufferId::new(0),
            alloc_size: size,
            size,
            params: None,
            overrun_permitted,
            underrun_permitted,
            shared: false,
            state: StateHolder::Local(BufferState::new(size)),
        }
    }
}

impl<C: CacheOps> AudioBuffer<C> {
    pub fn with_id(mut self, id: BufferId) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_shared(&self) -> bool {
        self.shared
    }

    /// Install stream parameters. Fails with `bad_param` in `IfUnset` mode
    /// if parameters are already set to a different value.
    pub fn set_params(&mut self, params: StreamParams, mode: SetParamsMode) -> Result<()> {
        match (self.params, mode) {
            (Some(existing), SetParamsMode::IfUnset) if existing != params => Err(CoreError::BadParam),
            _ => {
                self.params = Some(params);
                Ok(())
            }
        }
    }

    pub fn params(&self) -> Option<StreamParams> {
        self.params
    }

    /// Re-size in place. Valid only when the buffer is empty and
    /// `new_size <= alloc_size`.
    pub fn set_size(&mut self, new_size: usize) -> Result<()> {
        if new_size > self.alloc_size {
            return Err(CoreError::BadParam);
        }
        let avail = self.state.read(0..0, |s| s.avail);
        if avail != 0 {
            return Err(CoreError::BadState);
        }
        self.size = new_size;
        self.state.write(0..0, |s| {
            s.free = new_size;
            s.read_offset = 0;
            s.write_offset = 0;
        });
        Ok(())
    }

    pub fn avail(&self) -> usize {
        self.state.read(0..0, |s| s.avail)
    }

    pub fn free(&self) -> usize {
        self.state.read(0..0, |s| s.free)
    }

    /// Mark this buffer as crossing a coherency domain, converting its
    /// local state into a `Shared<BufferState, C>` under the given cache
    /// operations. Called from `comp_buffer_connect` when the producer and
    /// consumer components run on different cores.
    pub fn into_shared(self, cache: C) -> AudioBuffer<C> {
        let state = match self.state {
            StateHolder::Local(state) => state,
            StateHolder::Shared(_) => unreachable!("buffer already shared"),
        };
        AudioBuffer {
            id: self.id,
            alloc_size: self.alloc_size,
            size: self.size,
            params: self.params,
            overrun_permitted: self.overrun_permitted,
            underrun_permitted: self.underrun_permitted,
            shared: true,
            state: StateHolder::Shared(Shared::new(state, cache)),
        }
    }

    /// Contiguous writable region at the current write pointer, and its
    /// length before a wrap would occur. The caller must re-query after
    /// writing more than this many bytes.
    pub fn sink_region_len(&self) -> usize {
        self.state.read(0..0, |s| {
            let contiguous = self.alloc_size - s.write_offset;
            contiguous.min(s.free)
        })
    }

    /// Contiguous readable region at the current read pointer, mirroring
    /// `sink_region_len`.
    pub fn source_region_len(&self) -> usize {
        self.state.read(0..0, |s| {
            let contiguous = self.alloc_size - s.read_offset;
            contiguous.min(s.avail)
        })
    }

    /// Write `data` into the buffer and commit it, advancing the write
    /// pointer. On overrun (`data.len() > free`) without `overrun_permitted`
    /// no bytes are written and `xrun` is returned for the caller to notify
    /// the pipeline; with `overrun_permitted`, the read pointer is advanced
    /// to make room, discarding the oldest data.
    pub fn produce_from(&mut self, data: &[u8]) -> Result<()> {
        let bytes = data.len();
        let alloc_size = self.alloc_size;
        let (write_offset, needs_discard) = self.state.read(0..0, |s| {
            let short = bytes.saturating_sub(s.free);
            (s.write_offset, short)
        });

        if needs_discard > 0 {
            if !self.overrun_permitted {
                tracing::warn!(buffer = ?self.id, bytes, free = self.free(), "overrun without overrun_permitted");
                return Err(CoreError::Xrun);
            }
            tracing::debug!(buffer = ?self.id, discarded = needs_discard, "overrun discarding oldest data");
            self.state.write(0..0, |s| {
                s.read_offset = (s.read_offset + needs_discard) % alloc_size;
                s.avail -= needs_discard;
                s.free += needs_discard;
            });
        }

        let first_len = (alloc_size - write_offset).min(bytes);
        let second_len = bytes - first_len;

        if second_len == 0 {
            let range = write_offset..write_offset + first_len;
            self.state.write(range.clone(), |s| {
                s.storage[range].copy_from_slice(data);
            });
        } else {
            let first_range = write_offset..alloc_size;
            let second_range = 0..second_len;
            let (first_data, second_data) = data.split_at(first_len);
            self.state.write_split(first_range.clone(), second_range.clone(), |s| {
                s.storage[first_range].copy_from_slice(first_data);
                s.storage[second_range].copy_from_slice(second_data);
            });
        }

        self.state.write(0..0, |s| {
            s.write_offset = (write_offset + bytes) % alloc_size;
            s.avail += bytes;
            s.free -= bytes;
        });
        Ok(())
    }

    /// Read `out.len()` bytes from the buffer and commit the consumption,
    /// advancing the read pointer. On underrun with `underrun_permitted`,
    /// the unavailable tail of `out` is zero-filled instead of real data;
    /// without it, `xrun` is returned and no bytes are consumed.
    pub fn consume_into(&mut self, out: &mut [u8]) -> Result<()> {
        let bytes = out.len();
        let alloc_size = self.alloc_size;
        let (read_offset, avail) = self.state.read(0..0, |s| (s.read_offset, s.avail));

        if bytes > avail {
            if !self.underrun_permitted {
                tracing::warn!(buffer = ?self.id, bytes, avail, "underrun without underrun_permitted");
                return Err(CoreError::Xrun);
            }
            tracing::debug!(buffer = ?self.id, bytes, avail, "underrun zero-filling tail");
            let real = avail;
            let (real_part, silence_part) = out.split_at_mut(real);
            self.read_region(read_offset, real_part);
            silence_part.fill(0);
            self.state.write(0..0, |s| {
                s.read_offset = (read_offset + real) % alloc_size;
                s.avail = 0;
                s.free = alloc_size;
            });
            return Ok(());
        }

        self.read_region(read_offset, out);
        self.state.write(0..0, |s| {
            s.read_offset = (read_offset + bytes) % alloc_size;
            s.avail -= bytes;
            s.free += bytes;
        });
        Ok(())
    }

    fn read_region(&self, read_offset: usize, out: &mut [u8]) {
        let bytes = out.len();
        if bytes == 0 {
            return;
        }
        let alloc_size = self.alloc_size;
        let first_len = (alloc_size - read_offset).min(bytes);
        let second_len = bytes - first_len;
        self.state.read(read_offset..read_offset + first_len, |s| {
            out[..first_len].copy_from_slice(&s.storage[read_offset..read_offset + first_len]);
            if second_len > 0 {
                out[first_len..].copy_from_slice(&s.storage[..second_len]);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn avail_plus_free_equals_size_through_produce_consume() {
        let mut buffer = AudioBuffer::new(16, false, false);
        buffer.produce_from(&[1, 2, 3, 4]).unwrap();
        assert_eq!(buffer.avail() + buffer.free(), buffer.size());
        let mut out = [0u8; 4];
        buffer.consume_into(&mut out).unwrap();
        assert_eq!(out, [1, 2, 3, 4]);
        assert_eq!(buffer.avail() + buffer.free(), buffer.size());
    }

    #[test]
    fn produce_exactly_free_fills_buffer() {
        let mut buffer = AudioBuffer::new(8, false, false);
        buffer.produce_from(&[0; 8]).unwrap();
        assert_eq!(buffer.avail(), 8);
        assert_eq!(buffer.free(), 0);
    }

    #[test]
    fn produce_over_free_without_overrun_permitted_is_xrun() {
        let mut buffer = AudioBuffer::new(4, false, false);
        buffer.produce_from(&[1, 2, 3, 4]).unwrap();
        let err = buffer.produce_from(&[5]).unwrap_err();
        assert_eq!(err, CoreError::Xrun);
        assert_eq!(buffer.avail(), 4);
    }

    #[test]
    fn produce_over_free_with_overrun_permitted_discards_oldest() {
        let mut buffer = AudioBuffer::new(4, true, false);
        buffer.produce_from(&[1, 2, 3, 4]).unwrap();
        buffer.produce_from(&[5, 6]).unwrap();
        let mut out = [0u8; 4];
        buffer.consume_into(&mut out).unwrap();
        assert_eq!(out, [3, 4, 5, 6]);
    }

    #[test]
    fn consume_under_avail_without_underrun_permitted_is_xrun() {
        let mut buffer = AudioBuffer::new(8, false, false);
        buffer.produce_from(&[1, 2]).unwrap();
        let mut out = [0u8; 4];
        let err = buffer.consume_into(&mut out).unwrap_err();
        assert_eq!(err, CoreError::Xrun);
    }

    #[test]
    fn consume_under_avail_with_underrun_permitted_zero_fills_tail() {
        let mut buffer = AudioBuffer::new(8, false, true);
        buffer.produce_from(&[1, 2]).unwrap();
        let mut out = [9u8; 4];
        buffer.consume_into(&mut out).unwrap();
        assert_eq!(out, [1, 2, 0, 0]);
        assert_eq!(buffer.avail(), 0);
    }

    #[test]
    fn wrap_around_produce_and_consume_round_trips() {
        let mut buffer = AudioBuffer::new(4, false, false);
        buffer.produce_from(&[1, 2, 3]).unwrap();
        let mut out = [0u8; 3];
        buffer.consume_into(&mut out).unwrap();
        buffer.produce_from(&[4, 5, 6]).unwrap();
        let mut out2 = [0u8; 3];
        buffer.consume_into(&mut out2).unwrap();
        assert_eq!(out2, [4, 5, 6]);
    }

    proptest::proptest! {
        /// Whatever sequence of (always-in-bounds) produce/consume calls runs
        /// against a fixed-capacity buffer, `avail() + free()` never drifts
        /// away from `size()` — the invariant the wrap-around offset
        /// arithmetic in `produce_from`/`consume_into` depends on.
        #[test]
        fn avail_and_free_always_sum_to_size(
            capacity in 1usize..64,
            ops in proptest::collection::vec((proptest::bool::ANY, 0usize..32), 1..64),
        ) {
            let mut buffer = AudioBuffer::new(capacity, false, true);
            for (produce, len) in ops {
                if produce {
                    let len = len.min(buffer.free());
                    let data = vec![0xabu8; len];
                    buffer.produce_from(&data).unwrap();
                } else {
                    let len = len.min(capacity);
                    let mut out = vec![0u8; len];
                    buffer.consume_into(&mut out).unwrap();
                }
                proptest::prop_assert_eq!(buffer.avail() + buffer.free(), buffer.size());
            }
        }
    }
}
