//! Large-config fragment reassembly (§4.6, §6): a configuration blob that
//! exceeds the mailbox size arrives as a sequence of `set_config(param_id,
//! offset, fragment, position)` messages. `first` allocates the assembly
//! buffer sized by the first fragment's declared total length; `middle`/
//! `last` must continue the same `param_id`'s pending assembly in order.

use crate::error::{IpcError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentPosition {
    First,
    Middle,
    Last,
    Single,
}

struct Pending {
    param_id: u32,
    total_len: usize,
    received: Vec<u8>,
}

/// One in-flight large-config assembly. The dispatcher owns a single
/// instance since only one host->dsp message is ever in flight at a time.
#[derive(Default)]
pub struct Reassembler {
    pending: Option<Pending>,
}

impl Reassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next fragment. Returns the completed blob on `Last`/`Single`,
    /// `None` while assembly is still in progress.
    pub fn accept(
        &mut self,
        param_id: u32,
        offset: usize,
        total_len: usize,
        fragment: &[u8],
        position: FragmentPosition,
    ) -> Result<Option<Vec<u8>>> {
        match position {
            FragmentPosition::Single => {
                if self.pending.is_some() {
                    return Err(IpcError::BadState);
                }
                Ok(Some(fragment.to_vec()))
            }
            FragmentPosition::First => {
                if self.pending.is_some() {
                    return Err(IpcError::BadState);
                }
                if offset != 0 || total_len < fragment.len() {
                    return Err(IpcError::BadParam);
                }
                let mut received = vec![0u8; total_len];
                received[..fragment.len()].copy_from_slice(fragment);
                self.pending = Some(Pending { param_id, total_len, received });
                Ok(None)
            }
            FragmentPosition::Middle | FragmentPosition::Last => {
                let pending = self.pending.as_mut().ok_or(IpcError::BadState)?;
                if pending.param_id != param_id {
                    return Err(IpcError::BadState);
                }
                let end = offset.checked_add(fragment.len()).ok_or(IpcError::BadParam)?;
                if end > pending.total_len {
                    return Err(IpcError::BadParam);
                }
                pending.received[offset..end].copy_from_slice(fragment);
                if position == FragmentPosition::Last {
                    let Pending { received, .. } = self.pending.take().unwrap();
                    Ok(Some(received))
                } else {
                    Ok(None)
                }
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Abandon an in-progress assembly (e.g. on `pipe_free`/reset of the
    /// owning pipeline).
    pub fn abandon(&mut self) {
        self.pending = None;
    }
}
