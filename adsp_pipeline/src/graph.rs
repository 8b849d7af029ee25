//! The pipeline graph and its tree-walk primitive (§4.5): `for_each_comp`
//! invokes a callback on each component reachable from a start point,
//! passing the buffer that was traversed to reach it. Components and buffers
//! are looked up by registry key rather than indexed by position in a flat
//! list.

use std::collections::{HashMap, HashSet};

use adsp_buffer::AudioBuffer;
use adsp_component::{ComponentOps, decode_s16, encode_s16};
use adsp_core::{BufferId, ComponentId, CoreError};

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkDirection {
    Downstream,
    Upstream,
}

/// Owns every component and buffer in one or more pipelines, plus the
/// producer/consumer adjacency used to walk between them. A real build
/// shares one `Graph` across all pipelines on a core; this crate does not
/// impose multi-pipeline bookkeeping beyond that.
#[derive(Default)]
pub struct Graph {
    components: HashMap<ComponentId, Box<dyn ComponentOps>>,
    buffers: HashMap<BufferId, AudioBuffer>,
    producer_of: HashMap<BufferId, ComponentId>,
    consumer_of: HashMap<BufferId, ComponentId>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_component(&mut self, component: Box<dyn ComponentOps>) {
        self.components.insert(component.id(), component);
    }

    pub fn add_buffer(&mut self, buffer: AudioBuffer) {
        self.buffers.insert(buffer.id(), buffer);
    }

    pub fn component(&self, id: ComponentId) -> Result<&dyn ComponentOps> {
        self.components.get(&id).map(|c| c.as_ref()).ok_or(PipelineError::NotFound)
    }

    pub fn component_mut(&mut self, id: ComponentId) -> Result<&mut Box<dyn ComponentOps>> {
        self.components.get_mut(&id).ok_or(PipelineError::NotFound)
    }

    pub fn buffer_mut(&mut self, id: BufferId) -> Result<&mut AudioBuffer> {
        self.buffers.get_mut(&id).ok_or(PipelineError::NotFound)
    }

    /// `component_free`: removes a component that is in `ready` state and
    /// has no remaining source/sink connections.
    pub fn remove_component(&mut self, id: ComponentId) -> Result<()> {
        {
            let comp = self.component(id)?;
            if comp.state() != adsp_component::ComponentState::Ready {
                return Err(PipelineError::BadState);
            }
            if !comp.base().sources.as_slice().is_empty() || !comp.base().sinks.as_slice().is_empty() {
                return Err(PipelineError::BadState);
            }
        }
        self.components.remove(&id);
        Ok(())
    }

    /// `buffer_free`: removes a buffer that is no longer bound as any
    /// component's source or sink.
    pub fn remove_buffer(&mut self, id: BufferId) -> Result<()> {
        if self.producer_of.contains_key(&id) || self.consumer_of.contains_key(&id) {
            return Err(PipelineError::BadState);
        }
        self.buffers.remove(&id).ok_or(PipelineError::NotFound)?;
        Ok(())
    }

    /// `component_connect`: binds `buffer` as a sink of `producer` and a
    /// source of `consumer`.
    pub fn connect(&mut self, producer: ComponentId, buffer: BufferId, consumer: ComponentId) -> Result<()> {
        self.component_mut(producer)?.base_mut().add_sink(buffer)?;
        self.component_mut(consumer)?.base_mut().add_source(buffer)?;
        self.producer_of.insert(buffer, producer);
        self.consumer_of.insert(buffer, consumer);
        Ok(())
    }

    /// True if `sink` is reachable from `source` by following sink
    /// connections downstream (used by `pipeline_complete`).
    pub fn reaches(&self, source: ComponentId, sink: ComponentId) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![source];
        while let Some(id) = stack.pop() {
            if id == sink {
                return true;
            }
            if !visited.insert(id) {
                continue;
            }
            stack.extend(self.neighbors(id, WalkDirection::Downstream).into_iter().map(|(_, n)| n));
        }
        false
    }

    fn neighbors(&self, id: ComponentId, direction: WalkDirection) -> Vec<(BufferId, ComponentId)> {
        let Ok(comp) = self.component(id) else {
            return Vec::new();
        };
        let ids: Vec<BufferId> = match direction {
            WalkDirection::Downstream => comp.base().sinks.as_slice().to_vec(),
            WalkDirection::Upstream => comp.base().sources.as_slice().to_vec(),
        };
        ids.into_iter()
            .filter_map(|buf_id| {
                let map = match direction {
                    WalkDirection::Downstream => &self.consumer_of,
                    WalkDirection::Upstream => &self.producer_of,
                };
                map.get(&buf_id).map(|&next| (buf_id, next))
            })
            .collect()
    }

    /// `for_each_comp(start_comp, walk_ctx, direction)` (§4.5): visits each
    /// reachable component exactly once, depth-first, calling `visitor` with
    /// the component and the buffer that led to it (`None` at `start`).
    pub fn for_each_comp(
        &mut self,
        start: ComponentId,
        direction: WalkDirection,
        visitor: &mut impl FnMut(&mut dyn ComponentOps, Option<BufferId>) -> Result<()>,
    ) -> Result<()> {
        let mut visited = HashSet::new();
        self.walk(start, None, direction, &mut visited, visitor)
    }

    fn walk(
        &mut self,
        id: ComponentId,
        via: Option<BufferId>,
        direction: WalkDirection,
        visited: &mut HashSet<ComponentId>,
        visitor: &mut impl FnMut(&mut dyn ComponentOps, Option<BufferId>) -> Result<()>,
    ) -> Result<()> {
        if !visited.insert(id) {
            return Ok(());
        }
        {
            let comp = self.component_mut(id)?;
            visitor(comp.as_mut(), via)?;
        }
        for (buf_id, next) in self.neighbors(id, direction) {
            self.walk(next, Some(buf_id), direction, visited, visitor)?;
        }
        Ok(())
    }

    /// Propagate a trigger command depth-first from `start`, downstream.
    /// `pre_order` controls whether each component is triggered before or
    /// after its downstream neighbors (§4.5: start triggers leaves last —
    /// `pre_order = true` — stop inverts that — `pre_order = false`).
    /// A component returning `path_stop` halts descent past it without
    /// propagating further down that branch.
    pub fn trigger_propagate(
        &mut self,
        start: ComponentId,
        cmd: adsp_component::TriggerCmd,
        pre_order: bool,
    ) -> Result<()> {
        let mut visited = HashSet::new();
        self.trigger_walk(start, cmd, pre_order, &mut visited)
    }

    fn trigger_walk(
        &mut self,
        id: ComponentId,
        cmd: adsp_component::TriggerCmd,
        pre_order: bool,
        visited: &mut HashSet<ComponentId>,
    ) -> Result<()> {
        if !visited.insert(id) {
            return Ok(());
        }
        let fire = |graph: &mut Self| -> Result<bool> {
            let comp = graph.component_mut(id)?;
            let outcome = comp.trigger(cmd)?;
            Ok(outcome == adsp_component::TriggerOutcome::PathStop)
        };

        if pre_order {
            let stop = fire(self)?;
            if stop {
                return Ok(());
            }
            for (_, next) in self.neighbors(id, WalkDirection::Downstream) {
                self.trigger_walk(next, cmd, pre_order, visited)?;
            }
        } else {
            for (_, next) in self.neighbors(id, WalkDirection::Downstream) {
                self.trigger_walk(next, cmd, pre_order, visited)?;
            }
            fire(self)?;
        }
        Ok(())
    }

    /// Fire `copy()` on `start` and transitively on every downstream
    /// neighbor that has enough data, moving `frames` 16-bit samples per
    /// hop. Buffers without `underrun_permitted`/
    /// `overrun_permitted` surface `Xrun` to the caller, which the pipeline
    /// layer turns into a trigger-propagated `xrun`.
    pub fn run_period(&mut self, start: ComponentId, frames: usize) -> Result<()> {
        let mut visited = HashSet::new();
        self.run_step(start, frames, &mut visited)
    }

    fn run_step(&mut self, id: ComponentId, frames: usize, visited: &mut HashSet<ComponentId>) -> Result<()> {
        if !visited.insert(id) {
            return Ok(());
        }
        let byte_len = frames * 2;

        let source_ids: Vec<BufferId> = self.component(id)?.base().sources.as_slice().to_vec();
        let sink_ids: Vec<BufferId> = self.component(id)?.base().sinks.as_slice().to_vec();

        let mut inputs: Vec<Vec<i32>> = Vec::with_capacity(source_ids.len());
        for &buf_id in &source_ids {
            let mut raw = vec![0u8; byte_len];
            self.buffer_mut(buf_id)?.consume_into(&mut raw).map_err(xrun_to_pipeline_error)?;
            inputs.push(decode_s16(&raw));
        }
        let input_refs: Vec<&[i32]> = inputs.iter().map(|v| v.as_slice()).collect();

        let mut outputs: Vec<Vec<i32>> = vec![Vec::new(); sink_ids.len()];
        {
            let comp = self.component_mut(id)?;
            comp.copy(&input_refs, &mut outputs, frames)?;
        }

        for (&buf_id, samples) in sink_ids.iter().zip(outputs.iter()) {
            let mut raw = vec![0u8; samples.len() * 2];
            encode_s16(samples, &mut raw);
            self.buffer_mut(buf_id)?.produce_from(&raw).map_err(xrun_to_pipeline_error)?;
        }

        for &buf_id in &sink_ids {
            if let Some(&next) = self.consumer_of.get(&buf_id) {
                self.run_step(next, frames, visited)?;
            }
        }
        Ok(())
    }
}

fn xrun_to_pipeline_error(e: CoreError) -> PipelineError {
    PipelineError::Core(e)
}
