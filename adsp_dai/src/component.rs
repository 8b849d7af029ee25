//! `DaiGatewayComponent`: the DAI-facing half of the copier/gateway shim
//! (§4.4), wired to a claimed [`DaiHandle`] instead of a bare
//! [`adsp_component::GatewayTransport`]. `prepare`/`trigger`/`copy` drive the
//! DAI's own DMA-channel claim and LLP slot through the handle, so a real
//! cross-core pipeline observes the same monotonic LLP advance
//! [`crate::llp::LlpSlot`]'s own tests exercise in isolation. The
//! host-mailbox endpoint of a pipeline still uses
//! `adsp_component::components::gateway::GatewayComponent` directly — only
//! the DAI-facing endpoint needs the extra DMA/LLP machinery this wraps.

use adsp_component::{
    ComponentBase, ComponentError, ComponentKind, ComponentOps, ComponentState, Direction, Result, TriggerCmd,
    TriggerOutcome, apply_trigger, decode_s16, encode_s16,
};

use crate::gateway::TriggerCmd as DaiTriggerCmd;
use crate::registry::DaiHandle;

pub struct DaiGatewayComponent {
    base: ComponentBase,
    handle: DaiHandle,
}

impl DaiGatewayComponent {
    pub fn new(base: ComponentBase, handle: DaiHandle) -> Self {
        Self { base, handle }
    }
}

fn wrap(e: crate::error::DaiError) -> ComponentError {
    adsp_core::CoreError::from(e).into()
}

impl ComponentOps for DaiGatewayComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Dai
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    /// Claims the DAI's DMA channel as part of locking in `prepared`.
    fn prepare(&mut self) -> Result<()> {
        if self.base.state == ComponentState::Prepared {
            return Ok(());
        }
        if self.base.state != ComponentState::Ready {
            return Err(adsp_core::CoreError::BadState.into());
        }
        self.handle.with_gateway(|gw| gw.prepare()).map_err(wrap)?;
        self.base.state = ComponentState::Prepared;
        Ok(())
    }

    /// Drives the DAI's own trigger state machine alongside the component
    /// state lattice. `Reset`/`Xrun` only touch the component side — the
    /// DAI gateway has no matching command and clears itself on the next
    /// `Stop`.
    fn trigger(&mut self, cmd: TriggerCmd) -> Result<TriggerOutcome> {
        let dai_cmd = match cmd {
            TriggerCmd::Start => Some(DaiTriggerCmd::Start),
            TriggerCmd::Stop => Some(DaiTriggerCmd::Stop),
            TriggerCmd::Pause => Some(DaiTriggerCmd::Pause),
            TriggerCmd::Release => Some(DaiTriggerCmd::Release),
            TriggerCmd::Reset | TriggerCmd::Xrun => None,
        };
        let current = self.base.state;
        let next = apply_trigger(current, cmd)?;
        if let Some(dai_cmd) = dai_cmd {
            self.handle.with_gateway(|gw| gw.trigger(dai_cmd)).map_err(wrap)?;
        }
        tracing::debug!(component = ?self.id(), ?cmd, ?current, ?next, "dai gateway component trigger");
        self.base.state = next;
        Ok(TriggerOutcome::Ok)
    }

    fn copy(&mut self, inputs: &[&[i32]], outputs: &mut [Vec<i32>], frames: usize) -> Result<()> {
        match self.base.direction {
            Direction::Playback => {
                let input = inputs.first().ok_or(adsp_core::CoreError::NoResource)?;
                let mut bytes = vec![0u8; frames * 2];
                encode_s16(&input[..frames], &mut bytes);
                self.handle.with_gateway(|gw| gw.pump_playback(&bytes, frames)).map_err(wrap)?;
                Ok(())
            }
            Direction::Capture => {
                let output = outputs.first_mut().ok_or(adsp_core::CoreError::NoResource)?;
                let mut bytes = vec![0u8; frames * 2];
                self.handle.with_gateway(|gw| gw.pump_capture(&mut bytes, frames)).map_err(wrap)?;
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
    use crate::dma::DmaChannelPool;
    use crate::kind::DaiType;
    use crate::registry::DaiRegistry;
    use crate::sim::SimTransport;
    use adsp_core::{ComponentId, PipelineId};

    fn handle(registry: &DaiRegistry) -> DaiHandle {
        let gateway =
            crate::gateway::DaiGateway::new(DaiType::Ssp, 0, Direction::Playback, DmaChannelPool::new(1), Box::new(SimTransport::new(16)));
        registry.register(DaiType::Ssp, 0, gateway);
        registry.get(DaiType::Ssp, 0).unwrap()
    }

    fn base() -> ComponentBase {
        ComponentBase::new(ComponentId::new(1), PipelineId::new(1), 0, Direction::Playback)
    }

    #[test]
    fn prepare_then_start_claims_channel_and_advances_llp() {
        let registry = DaiRegistry::new();
        let mut comp = DaiGatewayComponent::new(base(), handle(&registry));
        comp.prepare().unwrap();
        comp.trigger(TriggerCmd::Start).unwrap();

        let input = [0i32; 4];
        let mut outputs = vec![];
        comp.copy(&[&input], &mut outputs, 4).unwrap();
        let first = comp.handle.with_gateway(|gw| gw.read_llp());
        comp.copy(&[&input], &mut outputs, 4).unwrap();
        assert!(comp.handle.with_gateway(|gw| gw.read_llp()) > first);
    }

    #[test]
    fn copy_before_prepare_is_rejected() {
        let registry = DaiRegistry::new();
        let mut comp = DaiGatewayComponent::new(base(), handle(&registry));
        let input = [0i32; 4];
        let mut outputs = vec![];
        assert!(comp.copy(&[&input], &mut outputs, 4).is_err());
    }
}
