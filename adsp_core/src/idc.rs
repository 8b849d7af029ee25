//! Inter-DSP-Core Communication (IDC): the cross-core blocking call
//! primitive.
//!
//! `call_remote` is the only path by which one core invokes another core's
//! component vtable. The request travels over an [`crate::spsc::SpscRingBuffer`]
//! (grounded verbatim on that ring's lock-free SPSC discipline); the caller
//! blocks on a per-request slot until the remote core's poll loop resolves
//! it or the configured timeout elapses.
//!
//! This module requires `std` (condvar-based blocking has no `no_std`
//! equivalent in this workspace); it is not built into on-target firmware
//! images, only into the host-hosted digital twin and any std-capable core.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::error::{CoreError, Result};
use crate::spsc::{Consumer, Producer, SpscRingBuffer};

/// Shared table of in-flight requests, keyed by request id.
///
/// On real silicon the remote core would push its response onto a second
/// ring that the caller's core polls; in this host-hosted digital twin both
/// cores share process memory, so the remote side resolves the slot
/// directly once it has processed the request. The blocking/timeout
/// contract exercised by callers is identical either way.
struct PendingTable<Resp> {
    slots: Mutex<HashMap<u64, Option<Resp>>>,
    cvar: Condvar,
}

impl<Resp> PendingTable<Resp> {
    fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            cvar: Condvar::new(),
        }
    }

    fn register(&self, id: u64) {
        self.slots.lock().unwrap().insert(id, None);
    }

    fn resolve(&self, id: u64, response: Resp) {
        let mut guard = self.slots.lock().unwrap();
        if let Some(slot) = guard.get_mut(&id) {
            *slot = Some(response);
        }
        self.cvar.notify_all();
    }

    fn wait(&self, id: u64, timeout: Duration) -> Result<Resp> {
        let deadline = Instant::now() + timeout;
        let mut guard = self.slots.lock().unwrap();
        loop {
            if let Some(slot) = guard.get_mut(&id) {
                if let Some(response) = slot.take() {
                    guard.remove(&id);
                    return Ok(response);
                }
            } else {
                return Err(CoreError::BadState);
            }
            let now = Instant::now();
            if now >= deadline {
                guard.remove(&id);
                return Err(CoreError::NoResource);
            }
            let (next_guard, timeout_result) = self.cvar.wait_timeout(guard, deadline - now).unwrap();
            guard = next_guard;
            if timeout_result.timed_out() && guard.get(&id).map(|s| s.is_none()).unwrap_or(false) {
                guard.remove(&id);
                return Err(CoreError::NoResource);
            }
        }
    }
}

/// The caller-side half of an IDC link to one remote core.
pub struct IdcCaller<Req, Resp> {
    requests: Producer<(u64, Req)>,
    pending: Arc<PendingTable<Resp>>,
    next_id: u64,
}

/// The remote-core-side half: the poll loop drains requests here and
/// resolves the caller's pending slot once the local vtable call completes.
pub struct IdcResponder<Req, Resp> {
    requests: Consumer<(u64, Req)>,
    pending: Arc<PendingTable<Resp>>,
}

/// Build a linked caller/responder pair, as if wiring one core's outbound
/// IDC channel to another core's inbound poll loop.
pub fn idc_link<Req, Resp>(capacity: usize) -> (IdcCaller<Req, Resp>, IdcResponder<Req, Resp>) {
    let (producer, consumer) = SpscRingBuffer::new(capacity);
    let pending = Arc::new(PendingTable::new());
    (
        IdcCaller { requests: producer, pending: pending.clone(), next_id: 0 },
        IdcResponder { requests: consumer, pending },
    )
}

impl<Req, Resp> IdcCaller<Req, Resp> {
    /// Serialize `body` onto the ring and block until the remote core
    /// resolves it or `timeout` elapses. On timeout the remote is treated
    /// as wedged and `no_resource` is returned, per the concurrency model.
    pub fn call_remote(&mut self, body: Req, timeout: Duration) -> Result<Resp> {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.pending.register(id);
        if self.requests.try_push((id, body)).is_err() {
            return Err(CoreError::Busy);
        }
        self.pending.wait(id, timeout)
    }
}

impl<Req, Resp> IdcResponder<Req, Resp> {
    /// Drain one pending request, if any, invoking `handler` with its body
    /// and resolving the caller with the returned response. Called from the
    /// remote core's own message-handler poll tick; never blocks.
    pub fn poll_once(&mut self, handler: impl FnOnce(Req) -> Resp) -> bool {
        match self.requests.try_pop() {
            Some((id, body)) => {
                let response = handler(body);
                self.pending.resolve(id, response);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn call_remote_round_trips_through_responder() {
        let (mut caller, mut responder) = idc_link::<u32, u32>(8);
        let handle = thread::spawn(move || {
            while !responder.poll_once(|req| req * 2) {
                thread::yield_now();
            }
        });
        let result = caller.call_remote(21, Duration::from_secs(1)).unwrap();
        assert_eq!(result, 42);
        handle.join().unwrap();
    }

    #[test]
    fn call_remote_times_out_when_remote_never_polls() {
        let (mut caller, _responder) = idc_link::<u32, u32>(8);
        let result = caller.call_remote(1, Duration::from_millis(20));
        assert_eq!(result, Err(CoreError::NoResource));
    }
}
