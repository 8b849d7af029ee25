//! The copier/gateway shim: a thin component binding one pipeline endpoint
//! to a physical transport (host DMA mailbox or a DAI gateway). Both the
//! host-facing and DAI-facing endpoints are the same shape — one
//! [`crate::component::GatewayTransport`] object pushed to or pulled from —
//! so one struct covers both per the system overview's "+Copier/gateway
//! shim" row.

use crate::component::{ComponentBase, ComponentOps, Direction, GatewayTransport, decode_s16, encode_s16};
use crate::error::Result;
use crate::kind::ComponentKind;

pub struct GatewayComponent {
    base: ComponentBase,
    transport: Box<dyn GatewayTransport>,
}

impl GatewayComponent {
    pub fn new(base: ComponentBase, transport: Box<dyn GatewayTransport>) -> Self {
        Self { base, transport }
    }
}

impl ComponentOps for GatewayComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Dai
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn copy(&mut self, inputs: &[&[i32]], outputs: &mut [Vec<i32>], frames: usize) -> Result<()> {
        match self.base.direction {
            Direction::Playback => {
                let input = inputs.first().ok_or(adsp_core::CoreError::NoResource)?;
                let mut bytes = vec![0u8; frames * 2];
                encode_s16(&input[..frames], &mut bytes);
                self.transport.push_output(&bytes)?;
                Ok(())
            }
            Direction::Capture => {
                let output = outputs.first_mut().ok_or(adsp_core::CoreError::NoResource)?;
                let mut bytes = vec![0u8; frames * 2];
                self.transport.pull_input(&mut bytes)?;
                output.clear();
                output.extend(decode_s16(&bytes));
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adsp_core::{ComponentId, PipelineId};
    use std::sync::{Arc, Mutex};

    struct RecordingTransport {
        pushed: Arc<Mutex<Vec<u8>>>,
    }

    impl GatewayTransport for RecordingTransport {
        fn push_output(&mut self, frames: &[u8]) -> Result<()> {
            self.pushed.lock().unwrap().extend_from_slice(frames);
            Ok(())
        }
        fn pull_input(&mut self, out: &mut [u8]) -> Result<()> {
            out.fill(0);
            Ok(())
        }
    }

    #[test]
    fn playback_forwards_encoded_samples_to_transport() {
        let pushed = Arc::new(Mutex::new(Vec::new()));
        let transport = RecordingTransport { pushed: pushed.clone() };
        let base = ComponentBase::new(ComponentId::new(1), PipelineId::new(1), 0, Direction::Playback);
        let mut gateway = GatewayComponent::new(base, Box::new(transport));
        let input = [100i32, -100];
        let mut outputs = vec![];
        gateway.copy(&[&input], &mut outputs, 2).unwrap();
        assert_eq!(decode_s16(&pushed.lock().unwrap()), vec![100, -100]);
    }
}
