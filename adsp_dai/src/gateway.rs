//! The uniform DAI operations interface (§4.4): `get/put/set_config/
//! trigger/get_hw_params/probe/remove`, plus the timestamp sub-interface.
//! Implementations plug in by owning a [`SimTransport`] or a real hardware
//! backend; the core never matches on [`crate::kind::DaiType`] to decide how
//! to drive one, only calls through this trait.

use adsp_buffer::StreamParams;
use adsp_component::{ComponentError, GatewayTransport};

use crate::dma::{DmaChannel, DmaChannelPool};
use crate::error::{DaiError, Result};
use crate::kind::DaiType;
use crate::llp::LlpSlot;
use crate::timestamp::{TsConfig, WallclockSample};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DaiState {
    Removed,
    Ready,
    Prepared,
    Active,
    Paused,
}

/// Per-DAI-type clock/format configuration, carried as an opaque blob
/// (§6.5): the core forwards it intact to the matched driver's
/// `set_config` without interpreting it.
#[derive(Debug, Clone, Default)]
pub struct DaiConfig {
    pub blob: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerCmd {
    Start,
    Stop,
    Pause,
    Release,
}

/// One claimed DAI instance: a DMA channel, the transport it fronts, and its
/// LLP reporting slot. `SimTransport` stands in for the register-level
/// driver a real backend would own here.
pub struct DaiGateway {
    dai_type: DaiType,
    instance: u32,
    direction: adsp_component::Direction,
    state: DaiState,
    channel: Option<DmaChannel>,
    pool: DmaChannelPool,
    config: Option<DaiConfig>,
    hw_params: Option<StreamParams>,
    llp: LlpSlot,
    ts_config: Option<TsConfig>,
    transport: Box<dyn GatewayTransport>,
    frames_moved: u64,
}

impl DaiGateway {
    pub fn new(
        dai_type: DaiType,
        instance: u32,
        direction: adsp_component::Direction,
        pool: DmaChannelPool,
        transport: Box<dyn GatewayTransport>,
    ) -> Self {
        Self {
            dai_type,
            instance,
            direction,
            state: DaiState::Ready,
            channel: None,
            pool,
            config: None,
            hw_params: None,
            llp: LlpSlot::new(instance),
            ts_config: None,
            transport,
            frames_moved: 0,
        }
    }

    pub fn dai_type(&self) -> DaiType {
        self.dai_type
    }

    pub fn instance(&self) -> u32 {
        self.instance
    }

    pub fn state(&self) -> DaiState {
        self.state
    }

    /// `set_config(dai, cfg)`.
    pub fn set_config(&mut self, cfg: DaiConfig) -> Result<()> {
        tracing::debug!(dai_type = ?self.dai_type, instance = self.instance, blob_len = cfg.blob.len(), "dai config set");
        self.config = Some(cfg);
        Ok(())
    }

    /// `get_hw_params(dai, params, direction)`.
    pub fn get_hw_params(&self, params: &mut StreamParams) -> Result<()> {
        if let Some(hw) = self.hw_params {
            *params = hw;
            Ok(())
        } else {
            Err(DaiError::NotSupported)
        }
    }

    pub fn set_hw_params(&mut self, params: StreamParams) {
        self.hw_params = Some(params);
    }

    /// Allocates a DMA channel: `ready -> prepared`.
    pub fn prepare(&mut self) -> Result<()> {
        match self.state {
            DaiState::Prepared => Ok(()),
            DaiState::Ready => {
                self.channel = Some(self.pool.acquire()?);
                self.state = DaiState::Prepared;
                Ok(())
            }
            _ => Err(DaiError::BadState),
        }
    }

    /// `trigger(dai, cmd, direction)`.
    pub fn trigger(&mut self, cmd: TriggerCmd) -> Result<()> {
        let next = match (self.state, cmd) {
            (DaiState::Prepared, TriggerCmd::Start) => DaiState::Active,
            (DaiState::Paused, TriggerCmd::Start) => DaiState::Active,
            (DaiState::Active, TriggerCmd::Pause) => DaiState::Paused,
            (DaiState::Active, TriggerCmd::Stop) | (DaiState::Paused, TriggerCmd::Stop) => {
                self.llp.clear();
                DaiState::Ready
            }
            (DaiState::Active, TriggerCmd::Release) | (DaiState::Paused, TriggerCmd::Release) => {
                DaiState::Ready
            }
            _ => {
                tracing::warn!(dai_type = ?self.dai_type, instance = self.instance, ?cmd, state = ?self.state, "rejected dai trigger");
                return Err(DaiError::BadState);
            }
        };
        tracing::debug!(dai_type = ?self.dai_type, instance = self.instance, ?cmd, state = ?next, "dai trigger");
        self.state = next;
        Ok(())
    }

    /// One-time hardware init; no-op for the simulated transport.
    pub fn probe(&mut self) -> Result<()> {
        Ok(())
    }

    /// `reset`: channel free on reset (§4.4 DMA channel lifecycle).
    pub fn remove(&mut self) -> Result<()> {
        self.channel = None;
        self.state = DaiState::Ready;
        Ok(())
    }

    pub fn ts_config(&mut self, cfg: TsConfig) -> Result<()> {
        self.ts_config = Some(cfg);
        Ok(())
    }

    pub fn ts_start(&mut self) -> Result<()> {
        if self.ts_config.is_none() {
            return Err(DaiError::BadState);
        }
        Ok(())
    }

    pub fn ts_stop(&mut self) -> Result<()> {
        Ok(())
    }

    pub fn ts_get(&self) -> Result<WallclockSample> {
        let cfg = self.ts_config.ok_or(DaiError::BadState)?;
        Ok(WallclockSample {
            walclock: self.llp.read_wallclock(),
            sample_count: self.frames_moved,
            walclock_rate: cfg.walclock_rate,
        })
    }

    pub fn read_llp(&self) -> u64 {
        self.llp.read_llp()
    }

    /// Drive one playback period through the underlying transport, advancing
    /// the LLP slot. Called by the copier/gateway-shim component's `copy`.
    pub fn pump_playback(&mut self, bytes: &[u8], frames: usize) -> Result<()> {
        if self.state != DaiState::Active {
            return Err(DaiError::BadState);
        }
        if self.direction != adsp_component::Direction::Playback {
            return Err(DaiError::NotSupported);
        }
        self.transport.push_output(bytes).map_err(wrap)?;
        self.advance(frames);
        Ok(())
    }

    /// Drive one capture period through the underlying transport, advancing
    /// the LLP slot.
    pub fn pump_capture(&mut self, out: &mut [u8], frames: usize) -> Result<()> {
        if self.state != DaiState::Active {
            return Err(DaiError::BadState);
        }
        if self.direction != adsp_component::Direction::Capture {
            return Err(DaiError::NotSupported);
        }
        self.transport.pull_input(out).map_err(wrap)?;
        self.advance(frames);
        Ok(())
    }

    fn advance(&mut self, frames: usize) {
        self.frames_moved += frames as u64;
        let wallclock = self.llp.read_wallclock() + frames as u64;
        self.llp.update(self.frames_moved, wallclock);
    }
}

fn wrap(e: ComponentError) -> DaiError {
    DaiError::Component(e)
}
