//! The `Runtime` context: the single owner of a core's pipeline graph,
//! pipeline table, DAI registry and id allocator, replacing the per-call
//! globals a register-level firmware build would keep. One `Runtime` models
//! one DSP core; a cross-core topology (scenario E4) wires two `Runtime`s
//! together over an `adsp_core::idc` link.

use std::collections::HashMap;

use adsp_buffer::{AudioBuffer, StreamParams};
use adsp_component::components::{DcBlockComponent, GatewayComponent, MixerComponent, SrcComponent, VolumeComponent};
use adsp_component::kernel::SrcMode;
use adsp_component::{ComponentBase, ComponentOps, Direction, GatewayTransport, TriggerCmd};
use adsp_core::{BufferId, ComponentId, IdGenerator, PipelineId, Q8_16};
use adsp_dai::DaiRegistry;
use adsp_pipeline::{Graph, Pipeline, TimeDomain};

use crate::error::{Result, RuntimeError};

/// What kind of component to build for `comp_new`. Mirrors the subset of
/// `SOF_COMP_*` kinds this workspace ships reference kernels for; anything
/// else is `UnknownComponentKind`.
pub enum ComponentSpec {
    Volume { gain: Q8_16, bits: u32 },
    Mixer { bits: u32 },
    Src { input_rate: u32, output_rate: u32, mode: SrcMode },
    DcBlock { coefficient: Q8_16 },
    /// A host-mailbox or DAI-facing copier shim; `transport` is the
    /// physical-transport side (a `SimTransport` on the host-simulation
    /// target, a real DAI gateway's transport on target). `direction` here
    /// is relative to the transport, not the pipeline's stream direction: a
    /// playback pipeline's upstream host endpoint is `Capture` (it pulls
    /// samples in from the host mailbox) and its downstream DAI endpoint is
    /// `Playback` (it pushes samples out to hardware) — the two gateway
    /// endpoints of one pipeline take opposite `Direction` values.
    Gateway { transport: Box<dyn GatewayTransport> },
    /// A DAI-facing copier shim backed by a real [`adsp_dai::DaiGateway`]
    /// rather than a bare transport: claims (registering on first use) a
    /// DMA channel and an LLP reporting slot from this runtime's
    /// `DaiRegistry`, so `prepare`/`trigger`/`copy` drive the same
    /// DMA-claim and LLP-advance machinery a real hardware-backed DAI
    /// would. Use `Gateway` instead for the host-mailbox endpoint, which
    /// has no DAI-side state to claim.
    DaiGateway { dai_type: adsp_dai::DaiType, instance: u32, ring_capacity: usize },
}

/// One DSP core's worth of pipeline state: the component/buffer graph, the
/// pipeline table keyed by id, the DAI registry, and the id allocator that
/// hands out fresh `ComponentId`/`BufferId`/`PipelineId` values on request.
pub struct Runtime {
    pub core: u8,
    pub graph: Graph,
    pub pipelines: HashMap<PipelineId, Pipeline>,
    pub dais: DaiRegistry,
    ids: IdGenerator,
}

impl Runtime {
    pub fn new(core: u8) -> Self {
        Self { core, graph: Graph::new(), pipelines: HashMap::new(), dais: DaiRegistry::new(), ids: IdGenerator::new() }
    }

    pub fn alloc_component_id(&mut self) -> ComponentId {
        ComponentId::new(self.ids.next_raw())
    }

    pub fn alloc_buffer_id(&mut self) -> BufferId {
        BufferId::new(self.ids.next_raw())
    }

    pub fn alloc_pipeline_id(&mut self) -> PipelineId {
        PipelineId::new(self.ids.next_raw())
    }

    /// `comp_new`: build and register a component of the requested kind,
    /// on this runtime's core, inside `pipeline_id`. `config` is the raw
    /// IPC-supplied configuration blob (if any), stored verbatim so a later
    /// `get_attribute(BaseConfig)` returns exactly what was loaded here.
    pub fn comp_new(
        &mut self,
        id: ComponentId,
        pipeline_id: PipelineId,
        direction: Direction,
        spec: ComponentSpec,
        config: Option<Vec<u8>>,
    ) -> Result<ComponentId> {
        let base = ComponentBase::new(id, pipeline_id, self.core, direction);
        let mut component: Box<dyn ComponentOps> = match spec {
            ComponentSpec::Volume { gain, bits } => Box::new(VolumeComponent::new(base, gain, bits)),
            ComponentSpec::Mixer { bits } => Box::new(MixerComponent::new(base, bits)),
            ComponentSpec::Src { input_rate, output_rate, mode } => {
                Box::new(SrcComponent::new(base, input_rate, output_rate, mode))
            }
            ComponentSpec::DcBlock { coefficient } => Box::new(DcBlockComponent::new(base, coefficient)),
            ComponentSpec::Gateway { transport } => Box::new(GatewayComponent::new(base, transport)),
            ComponentSpec::DaiGateway { dai_type, instance, ring_capacity } => {
                if !self.dais.instances_of(dai_type).contains(&instance) {
                    let pool = adsp_dai::DmaChannelPool::new(1);
                    let transport = adsp_dai::SimTransport::new(ring_capacity);
                    self.dais.register(dai_type, instance, adsp_dai::DaiGateway::new(dai_type, instance, direction, pool, Box::new(transport)));
                }
                let handle = self.dais.get(dai_type, instance)?;
                Box::new(adsp_dai::DaiGatewayComponent::new(base, handle))
            }
        };
        component.base_mut().config = config;
        self.graph.add_component(component);
        Ok(id)
    }

    /// `buffer_new`.
    pub fn buffer_new(&mut self, id: BufferId, size: usize, overrun_permitted: bool, underrun_permitted: bool) -> BufferId {
        self.graph.add_buffer(AudioBuffer::new(size, overrun_permitted, underrun_permitted).with_id(id));
        id
    }

    /// `comp_connect`.
    pub fn comp_connect(&mut self, producer: ComponentId, buffer: BufferId, consumer: ComponentId) -> Result<()> {
        Ok(self.graph.connect(producer, buffer, consumer)?)
    }

    /// `component_free`: must find the component in `ready` state, with no
    /// remaining source/sink connections.
    pub fn comp_free(&mut self, id: ComponentId) -> Result<()> {
        Ok(self.graph.remove_component(id)?)
    }

    /// `buffer_free`: must find the buffer unbound from every component.
    pub fn buffer_free(&mut self, id: BufferId) -> Result<()> {
        Ok(self.graph.remove_buffer(id)?)
    }

    /// `pipe_new`: `init -> ready`.
    #[allow(clippy::too_many_arguments)]
    pub fn pipe_new(
        &mut self,
        id: PipelineId,
        sched_comp: ComponentId,
        source_endpoint: ComponentId,
        sink_endpoint: ComponentId,
        period_usecs: u32,
        priority: u8,
        frames_per_sched: usize,
        time_domain: TimeDomain,
        xrun_limit_usecs: u64,
    ) -> PipelineId {
        let pipeline = Pipeline::new(
            id,
            sched_comp,
            source_endpoint,
            sink_endpoint,
            period_usecs,
            priority,
            self.core,
            frames_per_sched,
            time_domain,
            xrun_limit_usecs,
        );
        self.pipelines.insert(id, pipeline);
        id
    }

    fn pipeline_mut(&mut self, id: PipelineId) -> Result<&mut Pipeline> {
        self.pipelines.get_mut(&id).ok_or(RuntimeError::PipelineNotFound(id.raw()))
    }

    /// `pipeline_complete`.
    pub fn pipe_complete(&mut self, id: PipelineId) -> Result<()> {
        let graph = &self.graph;
        self.pipelines.get_mut(&id).ok_or(RuntimeError::PipelineNotFound(id.raw()))?.complete(graph)?;
        Ok(())
    }

    /// `pcm_params`: negotiate stream parameters, then prepare every member
    /// component for the negotiated format.
    pub fn pcm_params(&mut self, id: PipelineId, direction: Direction, params: StreamParams) -> Result<()> {
        let graph = &mut self.graph;
        let pipeline = self.pipelines.get_mut(&id).ok_or(RuntimeError::PipelineNotFound(id.raw()))?;
        pipeline.negotiate_params(graph, direction, params)?;
        pipeline.prepare(graph)?;
        Ok(())
    }

    /// `trigger`.
    pub fn trigger(&mut self, id: PipelineId, cmd: TriggerCmd) -> Result<()> {
        let graph = &mut self.graph;
        self.pipelines.get_mut(&id).ok_or(RuntimeError::PipelineNotFound(id.raw()))?.trigger(graph, cmd)?;
        Ok(())
    }

    /// Fire one scheduling period on `id`. Returns `true` if an xrun crossed
    /// the pipeline's reporting threshold this period.
    pub fn run_period(&mut self, id: PipelineId) -> Result<bool> {
        let graph = &mut self.graph;
        Ok(self.pipelines.get_mut(&id).ok_or(RuntimeError::PipelineNotFound(id.raw()))?.run_period(graph)?)
    }

    /// `pipeline_free`.
    pub fn pipe_free(&mut self, id: PipelineId) -> Result<()> {
        self.pipeline_mut(id)?.free()?;
        self.pipelines.remove(&id);
        Ok(())
    }
}
