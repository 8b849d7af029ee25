//! `SOF_COMP_MIXER`: sums N source buffers into one sink with saturation.
//! Sources deliver whatever frame count the pipeline handed it; an all-zero
//! or starved (underrun-permitted, zero-filled) source contributes nothing
//! extra to the sum without special-casing here — the buffer layer already
//! resolved starvation into silence before `copy` is called.

use crate::component::{ComponentBase, ComponentOps};
use crate::error::Result;
use crate::kernel::{KernelOp, MixerKernel};
use crate::kind::ComponentKind;

pub struct MixerComponent {
    base: ComponentBase,
    kernel: MixerKernel,
}

impl MixerComponent {
    pub fn new(base: ComponentBase, bits: u32) -> Self {
        Self { base, kernel: MixerKernel { bits } }
    }
}

impl ComponentOps for MixerComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Mixer
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn copy(&mut self, inputs: &[&[i32]], outputs: &mut [Vec<i32>], frames: usize) -> Result<()> {
        self.kernel.process(inputs, outputs, frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adsp_core::{ComponentId, PipelineId};
    use crate::component::Direction;

    fn base() -> ComponentBase {
        ComponentBase::new(ComponentId::new(1), PipelineId::new(1), 0, Direction::Playback)
    }

    #[test]
    fn two_sources_sum_as_in_scenario_e3() {
        let mut mixer = MixerComponent::new(base(), 16);
        let source_a = [0x1000i32; 4];
        let source_b = [0x2000i32; 4];
        let mut outputs = vec![Vec::new()];
        mixer.copy(&[&source_a, &source_b], &mut outputs, 4).unwrap();
        assert_eq!(outputs[0], vec![0x3000; 4]);
    }

    #[test]
    fn single_remaining_source_after_stall_passes_through() {
        let mut mixer = MixerComponent::new(base(), 16);
        let source_a = [0x1000i32; 4];
        let silence = [0i32; 4];
        let mut outputs = vec![Vec::new()];
        mixer.copy(&[&source_a, &silence], &mut outputs, 4).unwrap();
        assert_eq!(outputs[0], vec![0x1000; 4]);
    }
}
