//! The pipeline entity and its per-pipeline state machine (§4.5): parameter
//! negotiation, prepare, trigger ordering, and xrun handling on top of the
//! graph's tree-walk primitive.

use std::cell::Cell;
use std::collections::HashSet;

use adsp_buffer::StreamParams;
use adsp_component::{Direction, TriggerCmd};
use adsp_core::{ComponentId, PipelineId};

use crate::error::{PipelineError, Result};
use crate::graph::{Graph, WalkDirection};
use crate::xrun::XrunTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Init,
    Ready,
    Prepared,
    Active,
    Paused,
    ErrorStop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeDomain {
    DmaIrq,
    TimerIrq,
}

pub struct Pipeline {
    pub id: PipelineId,
    pub sched_comp: ComponentId,
    pub source_endpoint: ComponentId,
    pub sink_endpoint: ComponentId,
    pub period_usecs: u32,
    pub priority: u8,
    pub core: u8,
    pub frames_per_sched: usize,
    pub time_domain: TimeDomain,
    state: PipelineState,
    xrun: XrunTracker,
    members: HashSet<ComponentId>,
}

impl Pipeline {
    /// `pipeline_new`: `init -> ready`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: PipelineId,
        sched_comp: ComponentId,
        source_endpoint: ComponentId,
        sink_endpoint: ComponentId,
        period_usecs: u32,
        priority: u8,
        core: u8,
        frames_per_sched: usize,
        time_domain: TimeDomain,
        xrun_limit_usecs: u64,
    ) -> Self {
        let mut members = HashSet::new();
        members.insert(source_endpoint);
        members.insert(sink_endpoint);
        members.insert(sched_comp);
        Self {
            id,
            sched_comp,
            source_endpoint,
            sink_endpoint,
            period_usecs,
            priority: priority.min(10),
            core,
            frames_per_sched,
            time_domain,
            state: PipelineState::Ready,
            xrun: XrunTracker::new(xrun_limit_usecs),
            members,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn members(&self) -> impl Iterator<Item = &ComponentId> {
        self.members.iter()
    }

    /// `component_connect`. Both endpoints must already carry this
    /// pipeline's id.
    pub fn connect(
        &mut self,
        graph: &mut Graph,
        producer: ComponentId,
        buffer: adsp_core::BufferId,
        consumer: ComponentId,
    ) -> Result<()> {
        for id in [producer, consumer] {
            if graph.component(id)?.base().pipeline_id != self.id {
                return Err(PipelineError::NotFound);
            }
        }
        graph.connect(producer, buffer, consumer)?;
        self.members.insert(producer);
        self.members.insert(consumer);
        Ok(())
    }

    /// `pipeline_complete`: the graph from `source_endpoint` must reach
    /// `sink_endpoint`, and `sched_comp` must lie on that path.
    pub fn complete(&mut self, graph: &Graph) -> Result<()> {
        if self.state != PipelineState::Ready {
            return Err(PipelineError::BadState);
        }
        if !graph.reaches(self.source_endpoint, self.sink_endpoint) {
            return Err(PipelineError::Disconnected);
        }
        let sched_on_path = self.sched_comp == self.source_endpoint
            || (graph.reaches(self.source_endpoint, self.sched_comp)
                && graph.reaches(self.sched_comp, self.sink_endpoint));
        if !sched_on_path {
            return Err(PipelineError::Disconnected);
        }
        Ok(())
    }

    /// `pipeline_params`: negotiates stream parameters along the direction
    /// implied by `direction` (playback walks downstream from the source
    /// endpoint, capture walks upstream from the sink endpoint), letting
    /// each component rewrite fields it owns (an SRC rewrites rate).
    ///
    /// Simplification: side branches are not walked in the opposite
    /// direction first before downstream propagation resumes, which a
    /// fan-out topology with format-dependent upstream siblings would need;
    /// linear chains (the only topologies exercised here) negotiate
    /// correctly.
    pub fn negotiate_params(&mut self, graph: &mut Graph, direction: Direction, params: StreamParams) -> Result<()> {
        let (start, walk_direction) = match direction {
            Direction::Playback => (self.source_endpoint, WalkDirection::Downstream),
            Direction::Capture => (self.sink_endpoint, WalkDirection::Upstream),
        };
        let current = Cell::new(params);
        graph.for_each_comp(start, walk_direction, &mut |comp, _via| {
            let next = comp.negotiate_params(current.get())?;
            current.set(next);
            Ok(())
        })?;
        Ok(())
    }

    /// `prepare`: second walk, `ready -> prepared`.
    pub fn prepare(&mut self, graph: &mut Graph) -> Result<()> {
        if self.state != PipelineState::Ready {
            return Err(PipelineError::BadState);
        }
        graph.for_each_comp(self.source_endpoint, WalkDirection::Downstream, &mut |comp, _via| {
            comp.prepare()?;
            Ok(())
        })?;
        self.state = PipelineState::Prepared;
        Ok(())
    }

    /// Drive the pipeline-level state machine and propagate the trigger
    /// through every member component in the required order (start/pause/
    /// release pre-order so leaves fire last, stop/reset post-order so
    /// they fire first).
    pub fn trigger(&mut self, graph: &mut Graph, cmd: TriggerCmd) -> Result<()> {
        let next_state = match (self.state, cmd) {
            (PipelineState::Prepared, TriggerCmd::Start) => PipelineState::Active,
            (PipelineState::Paused, TriggerCmd::Start | TriggerCmd::Release) => PipelineState::Active,
            (PipelineState::Active, TriggerCmd::Pause) => PipelineState::Paused,
            (PipelineState::Active, TriggerCmd::Stop) | (PipelineState::Paused, TriggerCmd::Stop) => {
                PipelineState::Ready
            }
            (_, TriggerCmd::Xrun) => PipelineState::ErrorStop,
            (PipelineState::ErrorStop, TriggerCmd::Reset) => PipelineState::Ready,
            _ => return Err(PipelineError::BadState),
        };
        let pre_order = matches!(cmd, TriggerCmd::Start | TriggerCmd::Pause | TriggerCmd::Release);
        graph.trigger_propagate(self.source_endpoint, cmd, pre_order)?;
        self.state = next_state;
        Ok(())
    }

    /// Fire one scheduling period from the scheduling component. Any
    /// resulting xrun is tracked against the sliding threshold and, if it
    /// trips, the pipeline is trigger-propagated into `error_stop` so every
    /// member component observes the xrun.
    pub fn run_period(&mut self, graph: &mut Graph) -> Result<bool> {
        match graph.run_period(self.sched_comp, self.frames_per_sched) {
            Ok(()) => Ok(false),
            Err(PipelineError::Core(adsp_core::CoreError::Xrun)) => {
                let period_usecs = self.period_usecs as u64;
                let report = self.xrun.record(period_usecs);
                self.trigger(graph, TriggerCmd::Xrun)?;
                Ok(report)
            }
            Err(e) => Err(e),
        }
    }

    /// `pipeline_free` on anything but a ready pipeline returns `bad_state`;
    /// a paused or active pipeline must be stopped (and an error-stopped one
    /// reset) before it can be freed.
    pub fn free(&self) -> Result<()> {
        if self.state != PipelineState::Ready {
            return Err(PipelineError::BadState);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adsp_buffer::{AudioBuffer, Interleaving, SampleFormat};
    use adsp_component::components::volume::VolumeComponent;
    use adsp_component::ComponentBase;
    use adsp_core::{BufferId, Q8_16};

    fn params() -> StreamParams {
        StreamParams { rate: 48_000, channels: 2, format: SampleFormat::S16Le, interleaving: Interleaving::ChannelsSamplesInterleaved }
    }

    fn simple_graph() -> (Graph, Pipeline) {
        let mut graph = Graph::new();
        let host = ComponentId::new(1);
        let dai = ComponentId::new(2);
        let pid = PipelineId::new(1);
        graph.add_component(Box::new(VolumeComponent::new(
            ComponentBase::new(host, pid, 0, Direction::Playback),
            Q8_16::from_f64(0.5),
            16,
        )));
        graph.add_component(Box::new(VolumeComponent::new(
            ComponentBase::new(dai, pid, 0, Direction::Playback),
            Q8_16::ONE,
            16,
        )));
        graph.add_buffer(AudioBuffer::new(64, false, true).with_id(BufferId::new(1)));
        graph.connect(host, BufferId::new(1), dai).unwrap();
        let pipeline = Pipeline::new(pid, host, host, dai, 1000, 5, 0, 48, TimeDomain::TimerIrq, 5000);
        (graph, pipeline)
    }

    #[test]
    fn complete_requires_sink_reachable_from_source() {
        let (graph, mut pipeline) = simple_graph();
        pipeline.complete(&graph).unwrap();
    }

    #[test]
    fn prepare_then_start_reaches_active_on_every_member() {
        let (mut graph, mut pipeline) = simple_graph();
        pipeline.complete(&graph).unwrap();
        pipeline.negotiate_params(&mut graph, Direction::Playback, params()).unwrap();
        pipeline.prepare(&mut graph).unwrap();
        assert_eq!(pipeline.state(), PipelineState::Prepared);
        pipeline.trigger(&mut graph, TriggerCmd::Start).unwrap();
        assert_eq!(pipeline.state(), PipelineState::Active);
        assert_eq!(graph.component(ComponentId::new(1)).unwrap().state(), adsp_component::ComponentState::Active);
        assert_eq!(graph.component(ComponentId::new(2)).unwrap().state(), adsp_component::ComponentState::Active);
    }

    #[test]
    fn stop_returns_every_member_to_ready() {
        let (mut graph, mut pipeline) = simple_graph();
        pipeline.complete(&graph).unwrap();
        pipeline.negotiate_params(&mut graph, Direction::Playback, params()).unwrap();
        pipeline.prepare(&mut graph).unwrap();
        pipeline.trigger(&mut graph, TriggerCmd::Start).unwrap();
        pipeline.trigger(&mut graph, TriggerCmd::Stop).unwrap();
        assert_eq!(pipeline.state(), PipelineState::Ready);
        assert_eq!(graph.component(ComponentId::new(2)).unwrap().state(), adsp_component::ComponentState::Ready);
    }

    #[test]
    fn free_while_paused_is_bad_state() {
        let (mut graph, mut pipeline) = simple_graph();
        pipeline.complete(&graph).unwrap();
        pipeline.negotiate_params(&mut graph, Direction::Playback, params()).unwrap();
        pipeline.prepare(&mut graph).unwrap();
        pipeline.trigger(&mut graph, TriggerCmd::Start).unwrap();
        pipeline.trigger(&mut graph, TriggerCmd::Pause).unwrap();
        assert!(pipeline.free().is_err());
    }
}
