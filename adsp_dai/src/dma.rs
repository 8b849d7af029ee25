//! DMA channel ownership. One channel per direction; exclusive for the
//! lifetime of the [`crate::gateway::DaiGateway`] binding that holds it
//! (§4.4, "DMA channel lifecycle"): a channel is claimed exactly once via
//! `acquire()` from a pool of `count` interchangeable channels, and released
//! back to the pool on `Drop`.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{DaiError, Result};

struct PoolState {
    free: Vec<u32>,
}

/// An exclusively-owned DMA channel handle. Dropping it returns the channel
/// index to the owning pool's free list.
pub struct DmaChannel {
    index: u32,
    pool: Arc<Mutex<PoolState>>,
}

impl DmaChannel {
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl Drop for DmaChannel {
    fn drop(&mut self) {
        self.pool.lock().free.push(self.index);
    }
}

/// A fixed-size pool of DMA channel indices. `acquire` hands out exclusive
/// ownership; there is no way to observe or touch a channel index that is
/// currently held by another `DmaChannel`.
#[derive(Clone)]
pub struct DmaChannelPool {
    state: Arc<Mutex<PoolState>>,
}

impl DmaChannelPool {
    pub fn new(count: u32) -> Self {
        let free = (0..count).rev().collect();
        Self { state: Arc::new(Mutex::new(PoolState { free })) }
    }

    pub fn acquire(&self) -> Result<DmaChannel> {
        let mut state = self.state.lock();
        let index = state.free.pop().ok_or(DaiError::NoResource)?;
        drop(state);
        Ok(DmaChannel { index, pool: self.state.clone() })
    }

    pub fn free_count(&self) -> usize {
        self.state.lock().free.len()
    }
}
