//! `ComponentOps`: the processing-component vtable (§4.3).
//!
//! This is a trait object (`Box<dyn ComponentOps>`), not an enum-dispatch
//! sum type over a `BlockType`-style enum, because the pipeline code here
//! must never switch on the component kind, only call through the vtable.

use adsp_core::{BufferId, ComponentId, PipelineId, StackVec};
use adsp_buffer::StreamParams;

use crate::error::Result;
use crate::kind::ComponentKind;
use crate::state::{ComponentState, TriggerCmd, TriggerOutcome};

/// Maximum fan-out/fan-in per component (typical fan-out is <= 8, per the
/// source-pattern redesign note).
pub const MAX_BUFFER_REFS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Playback,
    Capture,
}

/// The small fixed set of generic attributes `get_attribute`/`set_attribute`
/// operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    BaseConfig,
    IpcConfig,
}

#[derive(Debug, Clone)]
pub enum AttributeValue {
    Bytes(Vec<u8>),
}

/// The physical-transport side of a copier/gateway-shim component: either
/// the host-facing mailbox DMA endpoint or a DAI gateway. Implemented by
/// `adsp_dai`'s gateway type and by the runtime's host-mailbox stand-in, so
/// `adsp_component` never depends on `adsp_dai` directly.
pub trait GatewayTransport: Send {
    /// Push a fully-formed output period to the physical transport.
    fn push_output(&mut self, frames: &[u8]) -> Result<()>;

    /// Pull the next captured period from the physical transport into `out`.
    fn pull_input(&mut self, out: &mut [u8]) -> Result<()>;
}

/// Bookkeeping common to every component, embedded by each concrete
/// component type rather than inherited (no inheritance in Rust — every
/// `ComponentOps` implementor holds one of these for its shared fields).
pub struct ComponentBase {
    pub id: ComponentId,
    pub pipeline_id: PipelineId,
    pub core: u8,
    pub direction: Direction,
    pub shared: bool,
    pub state: ComponentState,
    pub sources: StackVec<BufferId, MAX_BUFFER_REFS>,
    pub sinks: StackVec<BufferId, MAX_BUFFER_REFS>,
    pub config: Option<Vec<u8>>,
    pub stream_params: Option<StreamParams>,
}

impl ComponentBase {
    pub fn new(id: ComponentId, pipeline_id: PipelineId, core: u8, direction: Direction) -> Self {
        Self {
            id,
            pipeline_id,
            core,
            direction,
            shared: false,
            state: ComponentState::Ready,
            sources: StackVec::new(),
            sinks: StackVec::new(),
            config: None,
            stream_params: None,
        }
    }

    pub fn add_source(&mut self, id: BufferId) -> Result<()> {
        self.sources.push(id).map_err(|_| adsp_core::CoreError::NoResource.into())
    }

    pub fn add_sink(&mut self, id: BufferId) -> Result<()> {
        self.sinks.push(id).map_err(|_| adsp_core::CoreError::NoResource.into())
    }
}

/// The fixed operation vtable every component implements (§4.3).
pub trait ComponentOps: Send {
    fn kind(&self) -> ComponentKind;
    fn base(&self) -> &ComponentBase;
    fn base_mut(&mut self) -> &mut ComponentBase;

    fn id(&self) -> ComponentId {
        self.base().id
    }

    fn state(&self) -> ComponentState {
        self.base().state
    }

    /// Lock stream parameters. Allowed only in `ready`.
    fn params(&mut self, params: StreamParams) -> Result<()> {
        if self.state() != ComponentState::Ready {
            return Err(adsp_core::CoreError::BadState.into());
        }
        self.base_mut().stream_params = Some(params);
        Ok(())
    }

    /// Negotiate stream parameters during pipeline-wide propagation: locks
    /// `params` on this component, then returns the possibly-rewritten
    /// parameters the walk should push onward (an SRC rewrites the rate, a
    /// format converter rewrites the frame format). The default forwards
    /// `params` unchanged.
    fn negotiate_params(&mut self, params: StreamParams) -> Result<StreamParams> {
        self.params(params)?;
        Ok(params)
    }

    /// Recompute per-frame coefficients / program DMA. `ready -> prepared`.
    /// Idempotent if already prepared.
    fn prepare(&mut self) -> Result<()> {
        match self.state() {
            ComponentState::Prepared => Ok(()),
            ComponentState::Ready => {
                self.base_mut().state = ComponentState::Prepared;
                Ok(())
            }
            _ => Err(adsp_core::CoreError::BadState.into()),
        }
    }

    /// Drive the state machine. `start`, `stop`, `pause`, `release`,
    /// `reset`, `xrun`.
    fn trigger(&mut self, cmd: TriggerCmd) -> Result<TriggerOutcome> {
        let current = self.state();
        match crate::state::apply_trigger(current, cmd) {
            Ok(next) => {
                tracing::debug!(component = ?self.id(), ?cmd, ?current, ?next, "component trigger");
                self.base_mut().state = next;
                Ok(TriggerOutcome::Ok)
            }
            Err(e) => {
                tracing::warn!(component = ?self.id(), ?cmd, ?current, "rejected trigger");
                Err(e)
            }
        }
    }

    /// Consume from sources, produce to sinks, exactly once. Safe to call at
    /// scheduler rate. `inputs`/`outputs` are already-decoded integer
    /// sample frames, one slice per connected buffer.
    fn copy(&mut self, inputs: &[&[i32]], outputs: &mut [Vec<i32>], frames: usize) -> Result<()>;

    /// Return to `ready`; drop runtime state, keep configuration.
    fn reset(&mut self) -> Result<()> {
        self.base_mut().state = ComponentState::Ready;
        Ok(())
    }

    /// `get_attribute(AttributeKind::BaseConfig)` returns the IPC-supplied
    /// configuration blob loaded at construction, byte-for-byte (§8
    /// testable property 6's `get_config` round trip). Other attribute
    /// kinds are not generically backed and return `None` unless a
    /// concrete component overrides this.
    fn get_attribute(&self, attr: AttributeKind) -> Option<AttributeValue> {
        match attr {
            AttributeKind::BaseConfig => self.base().config.clone().map(AttributeValue::Bytes),
            AttributeKind::IpcConfig => None,
        }
    }

    fn set_attribute(&mut self, attr: AttributeKind, value: AttributeValue) -> Result<()> {
        match attr {
            AttributeKind::BaseConfig => {
                let AttributeValue::Bytes(bytes) = value;
                self.base_mut().config = Some(bytes);
                Ok(())
            }
            AttributeKind::IpcConfig => Err(adsp_core::CoreError::NotSupported.into()),
        }
    }
}

/// Decode little-endian 16-bit samples into `i32` for kernel processing.
pub fn decode_s16(bytes: &[u8]) -> Vec<i32> {
    bytes.chunks_exact(2).map(|c| i16::from_le_bytes([c[0], c[1]]) as i32).collect()
}

/// Encode `i32` kernel output back into little-endian 16-bit samples,
/// saturating each value to the format's range.
pub fn encode_s16(samples: &[i32], out: &mut [u8]) {
    for (i, &sample) in samples.iter().enumerate() {
        let clamped = adsp_core::saturate_to_bits(sample as i64, 16) as i16;
        out[i * 2..i * 2 + 2].copy_from_slice(&clamped.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_config_round_trips_through_get_attribute() {
        use crate::components::volume::VolumeComponent;
        use adsp_core::{ComponentId, PipelineId};

        let base = ComponentBase::new(ComponentId::new(1), PipelineId::new(1), 0, Direction::Playback);
        let mut comp = VolumeComponent::new(base, adsp_core::Q8_16::ONE, 16);
        assert!(comp.get_attribute(AttributeKind::BaseConfig).is_none());

        let loaded = vec![0x11, 0x22, 0x33, 0x44];
        comp.set_attribute(AttributeKind::BaseConfig, AttributeValue::Bytes(loaded.clone())).unwrap();

        match comp.get_attribute(AttributeKind::BaseConfig) {
            Some(AttributeValue::Bytes(bytes)) => assert_eq!(bytes, loaded),
            other => panic!("expected BaseConfig bytes, got {other:?}"),
        }
    }

    #[test]
    fn s16_round_trip_is_identity() {
        let samples = [0i32, 100, -100, 32_767, -32_768];
        let mut bytes = vec![0u8; samples.len() * 2];
        encode_s16(&samples, &mut bytes);
        let decoded = decode_s16(&bytes);
        assert_eq!(decoded, samples);
    }
}
