//! Typed memory-region allocator.
//!
//! Models the six named pools (`system`, `system_runtime`, `runtime`,
//! `runtime_shared`, `buffer`, `low_power_buffer`) as [`RegionPool`]
//! instances, each advertising a [`Capabilities`] mask. Allocation picks the
//! ceiling size class and pops a free block index — a `Vec<u32>` acting as a
//! stack of free slots, not an intrusive list, matching the registry-key
//! addressing used everywhere else in this workspace.
//!
//! On the host-simulation target there is no MMU to back a real
//! virtual-page allocator; [`RegionPool`] degrades to the same bump/free-list
//! scheme used by every other region, and that degradation is the
//! documented behavior rather than a silent stub.

#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use crate::error::{CoreError, Result};

/// Capability mask a memory region advertises. Hand-rolled bitflags (small
/// `#[repr(C)]`-style enum rather than pulling in a flags crate for a
/// handful of bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities(u32);

impl Capabilities {
    pub const RAM: Self = Self(1 << 0);
    pub const ROM: Self = Self(1 << 1);
    pub const EXT: Self = Self(1 << 2);
    pub const LP: Self = Self(1 << 3);
    pub const HP: Self = Self(1 << 4);
    pub const DMA: Self = Self(1 << 5);
    pub const CACHE: Self = Self(1 << 6);
    pub const EXEC: Self = Self(1 << 7);
    pub const L3: Self = Self(1 << 8);
    pub const NONE: Self = Self(0);

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, required: Self) -> bool {
        self.0 & required.0 == required.0
    }
}

impl core::ops::BitOr for Capabilities {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// The six named pools from the memory-region design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    System,
    SystemRuntime,
    Runtime,
    RuntimeShared,
    Buffer,
    LowPowerBuffer,
}

impl RegionKind {
    /// The capability mask each named pool advertises.
    pub const fn capabilities(self) -> Capabilities {
        match self {
            RegionKind::System => Capabilities(Capabilities::RAM.0 | Capabilities::HP.0),
            RegionKind::SystemRuntime => Capabilities(Capabilities::RAM.0 | Capabilities::HP.0),
            RegionKind::Runtime => Capabilities(Capabilities::RAM.0),
            RegionKind::RuntimeShared => Capabilities(Capabilities::RAM.0 | Capabilities::CACHE.0),
            RegionKind::Buffer => Capabilities(Capabilities::RAM.0 | Capabilities::DMA.0 | Capabilities::HP.0),
            RegionKind::LowPowerBuffer => Capabilities(Capabilities::RAM.0 | Capabilities::DMA.0 | Capabilities::LP.0),
        }
    }
}

/// Power-of-two size-class buckets, matching the ranges named in the
/// memory-region design.
const SIZE_CLASSES: [usize; 7] = [64, 128, 256, 512, 1024, 2048, 4096];

/// An opaque handle to a live allocation. The region that produced it is the
/// only thing that can validly free it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionPtr {
    class_index: usize,
    block_index: u32,
    large: bool,
}

struct SizeClass {
    block_size: usize,
    blocks: usize,
    free: Vec<u32>,
}

impl SizeClass {
    fn new(block_size: usize, blocks: usize) -> Self {
        Self {
            block_size,
            blocks,
            free: (0..blocks as u32).rev().collect(),
        }
    }

    fn alloc(&mut self) -> Option<u32> {
        self.free.pop()
    }

    fn free(&mut self, index: u32) {
        debug_assert!((index as usize) < self.blocks);
        debug_assert!(!self.free.contains(&index), "double free of region block");
        self.free.push(index);
    }
}

/// A single large-block extent used for allocations above the largest size
/// class (e.g. the DMA-reachable buffer pool's bulk audio storage).
struct LargeBlock {
    offset: usize,
    len: usize,
    used: bool,
}

/// One named memory pool: a capability mask plus size-class free lists and a
/// large-block extent list.
pub struct RegionPool {
    kind: RegionKind,
    classes: Vec<SizeClass>,
    large: Vec<LargeBlock>,
    large_cursor: usize,
}

impl RegionPool {
    /// Create a pool with `blocks_per_class` blocks in each size class and a
    /// `large_capacity`-byte arena for oversized allocations.
    pub fn new(kind: RegionKind, blocks_per_class: usize, large_capacity: usize) -> Self {
        let classes = SIZE_CLASSES.iter().map(|&sz| SizeClass::new(sz, blocks_per_class)).collect();
        let large = if large_capacity > 0 {
            alloc::vec![LargeBlock { offset: 0, len: large_capacity, used: false }]
        } else {
            Vec::new()
        };
        Self { kind, classes, large, large_cursor: 0 }
    }

    pub fn kind(&self) -> RegionKind {
        self.kind
    }

    pub fn capabilities(&self) -> Capabilities {
        self.kind.capabilities()
    }

    /// Allocate `size` bytes satisfying `required` capabilities. Never
    /// panics on failure: returns `no_memory`.
    pub fn alloc(&mut self, size: usize, required: Capabilities) -> Result<RegionPtr> {
        if !self.capabilities().contains(required) {
            return Err(CoreError::NotSupported);
        }
        if let Some(class_index) = SIZE_CLASSES.iter().position(|&sz| sz >= size) {
            if let Some(block_index) = self.classes[class_index].alloc() {
                return Ok(RegionPtr { class_index, block_index, large: false });
            }
        }
        self.alloc_large(size)
    }

    fn alloc_large(&mut self, size: usize) -> Result<RegionPtr> {
        for (i, block) in self.large.iter_mut().enumerate() {
            if !block.used && block.len >= size {
                block.used = true;
                return Ok(RegionPtr { class_index: SIZE_CLASSES.len(), block_index: i as u32, large: true });
            }
        }
        Err(CoreError::NoMemory)
    }

    /// Free a previously allocated block. Freeing a pointer this pool did
    /// not produce is a programming error and is reported, not panicked.
    pub fn free(&mut self, ptr: RegionPtr) -> Result<()> {
        if ptr.large {
            let block = self.large.get_mut(ptr.block_index as usize).ok_or(CoreError::BadParam)?;
            if !block.used {
                return Err(CoreError::BadParam);
            }
            block.used = false;
            return Ok(());
        }
        let class = self.classes.get_mut(ptr.class_index).ok_or(CoreError::BadParam)?;
        class.free(ptr.block_index);
        Ok(())
    }

    /// Total free blocks remaining across all size classes, for diagnostics.
    pub fn free_block_count(&self) -> usize {
        self.classes.iter().map(|c| c.free.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_picks_ceiling_class() {
        let mut pool = RegionPool::new(RegionKind::Runtime, 4, 0);
        let ptr = pool.alloc(100, Capabilities::RAM).unwrap();
        assert_eq!(ptr.class_index, 1); // ceiling of 100 is 128
    }

    #[test]
    fn exhausting_a_class_falls_back_to_large_block() {
        let mut pool = RegionPool::new(RegionKind::Buffer, 1, 8192);
        let _first = pool.alloc(64, Capabilities::RAM).unwrap();
        let second = pool.alloc(64, Capabilities::RAM).unwrap();
        assert!(second.large);
    }

    #[test]
    fn capability_mismatch_is_not_supported() {
        let mut pool = RegionPool::new(RegionKind::System, 4, 0);
        let err = pool.alloc(64, Capabilities::DMA).unwrap_err();
        assert_eq!(err, CoreError::NotSupported);
    }

    #[test]
    fn free_then_realloc_reuses_block() {
        let mut pool = RegionPool::new(RegionKind::Runtime, 1, 0);
        let ptr = pool.alloc(64, Capabilities::RAM).unwrap();
        pool.free(ptr).unwrap();
        let ptr2 = pool.alloc(64, Capabilities::RAM).unwrap();
        assert_eq!(ptr2.block_index, ptr.block_index);
    }

    #[test]
    fn out_of_memory_never_panics() {
        let mut pool = RegionPool::new(RegionKind::Runtime, 0, 0);
        let err = pool.alloc(64, Capabilities::RAM).unwrap_err();
        assert_eq!(err, CoreError::NoMemory);
    }
}
