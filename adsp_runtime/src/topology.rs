//! Host-side topology-authoring format: a `serde_json` document describing
//! components, buffers, pipelines and their connections, loaded in place of
//! hand-built binary topology blobs (§6.2 describes the wire format a real
//! host topology compiler emits; this is the test-harness-friendly
//! alternative named in the ambient configuration surface).

use std::collections::HashMap;
use std::path::Path;

use adsp_buffer::{Interleaving, SampleFormat, StreamParams};
use adsp_component::kernel::SrcMode;
use adsp_component::Direction;
use adsp_core::{ComponentId, PipelineId};
use adsp_pipeline::TimeDomain;
use serde::Deserialize;

use crate::error::{Result, RuntimeError};
use crate::runtime::{ComponentSpec, Runtime};

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComponentDoc {
    Volume { gain: f64, bits: u32 },
    Mixer { bits: u32 },
    Src { input_rate: u32, output_rate: u32, linear: bool },
    DcBlock { coefficient: f64 },
    HostGateway { ring_capacity: usize },
    DaiGateway { ring_capacity: usize },
}

#[derive(Debug, Deserialize)]
pub struct ComponentEntry {
    pub id: u32,
    /// For a `host_gateway`/`dai_gateway`, the direction relative to its own
    /// transport, not the pipeline's stream direction: a playback
    /// pipeline's host endpoint is `capture` (pulls from the host mailbox)
    /// and its DAI endpoint is `playback` (pushes to hardware). Ignored by
    /// non-gateway kinds.
    pub direction: DirectionDoc,
    /// The pipeline this component belongs to, for bookkeeping only — the
    /// actual connectivity comes from `connections`/`pipelines` below.
    #[serde(default)]
    pub pipeline: u32,
    #[serde(flatten)]
    pub spec: ComponentDoc,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum DirectionDoc {
    Playback,
    Capture,
}

impl From<DirectionDoc> for Direction {
    fn from(d: DirectionDoc) -> Self {
        match d {
            DirectionDoc::Playback => Direction::Playback,
            DirectionDoc::Capture => Direction::Capture,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BufferEntry {
    pub id: u32,
    pub size: usize,
    #[serde(default)]
    pub overrun_permitted: bool,
    #[serde(default)]
    pub underrun_permitted: bool,
}

#[derive(Debug, Deserialize)]
pub struct ConnectionEntry {
    pub producer: u32,
    pub buffer: u32,
    pub consumer: u32,
}

#[derive(Debug, Deserialize)]
pub struct StreamParamsDoc {
    pub rate: u32,
    pub channels: u16,
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "s16_le".to_string()
}

impl StreamParamsDoc {
    fn to_stream_params(&self) -> Result<StreamParams> {
        let format = match self.format.as_str() {
            "s16_le" => SampleFormat::S16Le,
            "s24_le" => SampleFormat::S24Le,
            "s32_le" => SampleFormat::S32Le,
            "float_le" => SampleFormat::FloatLe,
            other => return Err(RuntimeError::UnknownComponentKind(format!("sample format {other}"))),
        };
        Ok(StreamParams { rate: self.rate, channels: self.channels, format, interleaving: Interleaving::ChannelsSamplesInterleaved })
    }
}

#[derive(Debug, Deserialize)]
pub struct PipelineEntry {
    pub id: u32,
    pub sched_comp: u32,
    pub source_endpoint: u32,
    pub sink_endpoint: u32,
    pub period_usecs: u32,
    #[serde(default = "default_priority")]
    pub priority: u8,
    pub frames_per_sched: usize,
    #[serde(default)]
    pub xrun_limit_usecs: u64,
    pub direction: DirectionDoc,
    pub params: StreamParamsDoc,
}

fn default_priority() -> u8 {
    5
}

#[derive(Debug, Deserialize)]
pub struct TopologyDoc {
    #[serde(default)]
    pub components: Vec<ComponentEntry>,
    #[serde(default)]
    pub buffers: Vec<BufferEntry>,
    #[serde(default)]
    pub pipelines: Vec<PipelineEntry>,
    #[serde(default)]
    pub connections: Vec<ConnectionEntry>,
}

impl TopologyDoc {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Apply this document to `runtime`, returning the map from this
    /// document's small integer ids to the runtime's allocated ids (the
    /// document's ids are author-chosen and reused verbatim as the
    /// allocated id's raw value, so the map is the identity in practice,
    /// but callers should go through it rather than assume that).
    pub fn apply(&self, runtime: &mut Runtime) -> Result<HashMap<u32, PipelineId>> {
        for entry in &self.buffers {
            runtime.buffer_new(entry.id.into(), entry.size, entry.overrun_permitted, entry.underrun_permitted);
        }

        for entry in &self.components {
            let spec = match &entry.spec {
                ComponentDoc::Volume { gain, bits } => {
                    ComponentSpec::Volume { gain: adsp_core::Q8_16::from_f64(*gain), bits: *bits }
                }
                ComponentDoc::Mixer { bits } => ComponentSpec::Mixer { bits: *bits },
                ComponentDoc::Src { input_rate, output_rate, linear } => ComponentSpec::Src {
                    input_rate: *input_rate,
                    output_rate: *output_rate,
                    mode: if *linear { SrcMode::Linear } else { SrcMode::Nearest },
                },
                ComponentDoc::DcBlock { coefficient } => {
                    ComponentSpec::DcBlock { coefficient: adsp_core::Q8_16::from_f64(*coefficient) }
                }
                ComponentDoc::HostGateway { ring_capacity } => {
                    ComponentSpec::Gateway { transport: Box::new(adsp_dai::SimTransport::new(*ring_capacity)) }
                }
                ComponentDoc::DaiGateway { ring_capacity } => ComponentSpec::DaiGateway {
                    dai_type: adsp_dai::DaiType::Ssp,
                    instance: entry.id,
                    ring_capacity: *ring_capacity,
                },
            };
            runtime.comp_new(ComponentId::new(entry.id), PipelineId::new(entry.pipeline), entry.direction.into(), spec, None)?;
        }

        for conn in &self.connections {
            runtime.comp_connect(ComponentId::new(conn.producer), conn.buffer.into(), ComponentId::new(conn.consumer))?;
        }

        let mut pipeline_ids = HashMap::new();
        for entry in &self.pipelines {
            let id = PipelineId::new(entry.id);
            runtime.pipe_new(
                id,
                ComponentId::new(entry.sched_comp),
                ComponentId::new(entry.source_endpoint),
                ComponentId::new(entry.sink_endpoint),
                entry.period_usecs,
                entry.priority,
                entry.frames_per_sched,
                TimeDomain::TimerIrq,
                entry.xrun_limit_usecs,
            );
            runtime.pipe_complete(id)?;
            runtime.pcm_params(id, entry.direction.into(), entry.params.to_stream_params()?)?;
            pipeline_ids.insert(entry.id, id);
        }

        Ok(pipeline_ids)
    }
}
