//! `SOF_COMP_VOLUME`: per-channel gain in Q8.16/Q1.23 fixed-point.

use crate::component::{ComponentBase, ComponentOps};
use crate::error::Result;
use crate::kernel::{GainKernel, KernelOp};
use crate::kind::ComponentKind;

pub struct VolumeComponent {
    base: ComponentBase,
    kernel: GainKernel,
    /// Peak meter per channel, updated per block (simple running max of
    /// `|sample|`; a real implementation would decay this over time).
    peak: Vec<i32>,
}

impl VolumeComponent {
    pub fn new(base: ComponentBase, gain: adsp_core::Q8_16, bits: u32) -> Self {
        Self { base, kernel: GainKernel::new(gain, bits), peak: Vec::new() }
    }

    pub fn set_gain(&mut self, gain: adsp_core::Q8_16) {
        self.kernel.gain = gain;
    }

    pub fn peak_meter(&self) -> &[i32] {
        &self.peak
    }
}

impl ComponentOps for VolumeComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Volume
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn copy(&mut self, inputs: &[&[i32]], outputs: &mut [Vec<i32>], frames: usize) -> Result<()> {
        self.kernel.process(inputs, outputs, frames)?;
        if self.peak.len() < outputs.len() {
            self.peak.resize(outputs.len(), 0);
        }
        for (channel, output) in outputs.iter().enumerate() {
            let max = output.iter().map(|s| s.abs()).max().unwrap_or(0);
            self.peak[channel] = self.peak[channel].max(max);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adsp_core::{ComponentId, PipelineId, Q8_16};
    use crate::component::Direction;

    fn base() -> ComponentBase {
        ComponentBase::new(ComponentId::new(1), PipelineId::new(1), 0, Direction::Playback)
    }

    #[test]
    fn half_gain_on_identical_input_halves_output() {
        let mut volume = VolumeComponent::new(base(), Q8_16::from_f64(0.5), 16);
        let input = [20_000i32, -20_000];
        let mut outputs = vec![Vec::new()];
        volume.copy(&[&input], &mut outputs, 2).unwrap();
        assert_eq!(outputs[0], vec![10_000, -10_000]);
    }

    #[test]
    fn peak_meter_tracks_max_absolute_value() {
        let mut volume = VolumeComponent::new(base(), Q8_16::ONE, 16);
        let input = [100i32, -500, 200];
        let mut outputs = vec![Vec::new()];
        volume.copy(&[&input], &mut outputs, 3).unwrap();
        assert_eq!(volume.peak_meter()[0], 500);
    }
}
