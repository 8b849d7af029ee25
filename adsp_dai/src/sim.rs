//! A loopback [`adsp_component::GatewayTransport`] standing in for a real
//! register-level DAI driver, for host-hosted testing (end-to-end scenarios
//! E1-E4 run entirely against this transport rather than silicon).

use std::collections::VecDeque;

use adsp_component::{GatewayTransport, Result};

pub struct SimTransport {
    ring: VecDeque<u8>,
    capacity: usize,
}

impl SimTransport {
    pub fn new(capacity: usize) -> Self {
        Self { ring: VecDeque::with_capacity(capacity), capacity }
    }

    /// Bytes currently buffered, for test assertions.
    pub fn peek_all(&self) -> Vec<u8> {
        self.ring.iter().copied().collect()
    }
}

impl GatewayTransport for SimTransport {
    fn push_output(&mut self, frames: &[u8]) -> Result<()> {
        for &b in frames {
            if self.ring.len() == self.capacity {
                self.ring.pop_front();
            }
            self.ring.push_back(b);
        }
        Ok(())
    }

    fn pull_input(&mut self, out: &mut [u8]) -> Result<()> {
        for slot in out.iter_mut() {
            *slot = self.ring.pop_front().unwrap_or(0);
        }
        Ok(())
    }
}
