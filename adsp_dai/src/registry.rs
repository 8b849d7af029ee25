//! `DaiRegistry`: DAI instances grouped by [`DaiType`] and looked up by
//! `(type, instance)`, mirroring the `struct dai_type_info` grouping used by
//! `dai.h` rather than one flat array (§11). `get` claims a
//! gateway with a spinlock-guarded ref count; `put` releases it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{DaiError, Result};
use crate::gateway::DaiGateway;
use crate::kind::DaiType;

struct Slot {
    gateway: Mutex<DaiGateway>,
    claimed: Mutex<bool>,
}

/// A claimed DAI instance. Releases the claim (not the gateway state) when
/// dropped, so a caller that forgets to `put` cannot wedge the instance.
pub struct DaiHandle {
    dai_type: DaiType,
    instance: u32,
    registry: Arc<Inner>,
}

impl DaiHandle {
    pub fn dai_type(&self) -> DaiType {
        self.dai_type
    }

    pub fn instance(&self) -> u32 {
        self.instance
    }

    pub fn with_gateway<R>(&self, f: impl FnOnce(&mut DaiGateway) -> R) -> R {
        let slot = self.registry.slot(self.dai_type, self.instance).expect("handle outlives its slot");
        let mut gw = slot.gateway.lock();
        f(&mut gw)
    }
}

impl Drop for DaiHandle {
    fn drop(&mut self) {
        if let Some(slot) = self.registry.slot(self.dai_type, self.instance) {
            *slot.claimed.lock() = false;
        }
    }
}

struct Inner {
    by_type: Mutex<HashMap<DaiType, HashMap<u32, Arc<Slot>>>>,
}

impl Inner {
    fn slot(&self, dai_type: DaiType, instance: u32) -> Option<Arc<Slot>> {
        self.by_type.lock().get(&dai_type)?.get(&instance).cloned()
    }
}

#[derive(Clone)]
pub struct DaiRegistry {
    inner: Arc<Inner>,
}

impl DaiRegistry {
    pub fn new() -> Self {
        Self { inner: Arc::new(Inner { by_type: Mutex::new(HashMap::new()) }) }
    }

    pub fn register(&self, dai_type: DaiType, instance: u32, gateway: DaiGateway) {
        let slot = Arc::new(Slot { gateway: Mutex::new(gateway), claimed: Mutex::new(false) });
        self.inner.by_type.lock().entry(dai_type).or_default().insert(instance, slot);
    }

    /// `get(type, index, flags)`.
    pub fn get(&self, dai_type: DaiType, instance: u32) -> Result<DaiHandle> {
        let slot = self.inner.slot(dai_type, instance).ok_or(DaiError::NotFound)?;
        let mut claimed = slot.claimed.lock();
        if *claimed {
            return Err(DaiError::Busy);
        }
        *claimed = true;
        drop(claimed);
        Ok(DaiHandle { dai_type, instance, registry: self.inner.clone() })
    }

    /// Read the current LLP position for `(dai_type, instance)` without
    /// claiming it — a host polls a DAI's LLP slot for playback/capture
    /// position without needing to own the DAI the way `copy`/`trigger` do.
    pub fn read_llp(&self, dai_type: DaiType, instance: u32) -> Result<u64> {
        let slot = self.inner.slot(dai_type, instance).ok_or(DaiError::NotFound)?;
        Ok(slot.gateway.lock().read_llp())
    }

    pub fn instances_of(&self, dai_type: DaiType) -> Vec<u32> {
        self.inner
            .by_type
            .lock()
            .get(&dai_type)
            .map(|m| m.keys().copied().collect())
            .unwrap_or_default()
    }
}

impl Default for DaiRegistry {
    fn default() -> Self {
        Self::new()
    }
}
