//! `KernelOp`: the black-box DSP-algorithm contract (§1 Non-goals, §4.3).
//!
//! Each component owns its kernel via a trait object supplied at
//! construction, keeping the actual algorithm math out of pipeline and
//! component-lifecycle code. Reference kernels here exist only to make the
//! end-to-end scenarios testable; a real FIR/IIR/SRC/DRC kernel plugs in
//! without touching anything else.

use crate::error::{ComponentError, Result};
use adsp_core::saturate_to_bits;

/// A DSP kernel operating on decoded integer sample frames, one channel
/// per input/output slice. Must consume exactly `frames` from each input
/// and produce exactly the frames its own rate math implies into outputs.
pub trait KernelOp: Send {
    fn process(&mut self, inputs: &[&[i32]], outputs: &mut [Vec<i32>], frames: usize) -> Result<()>;
}

/// Per-channel gain in Q8.16, applied sample-wise with saturating
/// accumulation. A pass-through reference for the `volume` component.
pub struct GainKernel {
    pub gain: adsp_core::Q8_16,
    pub bits: u32,
}

impl GainKernel {
    pub fn new(gain: adsp_core::Q8_16, bits: u32) -> Self {
        Self { gain, bits }
    }
}

impl KernelOp for GainKernel {
    fn process(&mut self, inputs: &[&[i32]], outputs: &mut [Vec<i32>], frames: usize) -> Result<()> {
        if inputs.is_empty() || outputs.is_empty() {
            return Err(ComponentError::NoData);
        }
        let gain_raw = self.gain.raw() as i64;
        for (input, output) in inputs.iter().zip(outputs.iter_mut()) {
            if input.len() < frames {
                return Err(ComponentError::NoData);
            }
            output.clear();
            output.extend(input[..frames].iter().map(|&sample| {
                let product = (sample as i64) * gain_raw >> 16;
                saturate_to_bits(product, self.bits)
            }));
        }
        Ok(())
    }
}

/// Sums N source channels into one sink with saturation. Sources that
/// don't carry a channel simply don't contribute to it.
pub struct MixerKernel {
    pub bits: u32,
}

impl KernelOp for MixerKernel {
    fn process(&mut self, inputs: &[&[i32]], outputs: &mut [Vec<i32>], frames: usize) -> Result<()> {
        let output = outputs.first_mut().ok_or(ComponentError::NoSpace)?;
        output.clear();
        output.resize(frames, 0);
        for input in inputs {
            let len = input.len().min(frames);
            for i in 0..len {
                let sum = output[i] as i64 + input[i] as i64;
                output[i] = saturate_to_bits(sum, self.bits);
            }
        }
        Ok(())
    }
}

/// Sample-rate conversion mode for [`SrcKernel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SrcMode {
    Nearest,
    Linear,
}

/// A minimal synchronous rate converter: nearest-neighbour or linear
/// interpolation between `input_rate` and `output_rate`. Stands in for the
/// two-stage polyphase plan named in the component design; sufficient for
/// scenario E2's end-to-end exercise, not a production SRC.
pub struct SrcKernel {
    pub input_rate: u32,
    pub output_rate: u32,
    pub mode: SrcMode,
    phase: f64,
}

impl SrcKernel {
    pub fn new(input_rate: u32, output_rate: u32, mode: SrcMode) -> Self {
        Self { input_rate, output_rate, mode, phase: 0.0 }
    }

    fn output_frames(&self, input_frames: usize) -> usize {
        ((input_frames as f64) * self.output_rate as f64 / self.input_rate as f64).round() as usize
    }
}

impl KernelOp for SrcKernel {
    fn process(&mut self, inputs: &[&[i32]], outputs: &mut [Vec<i32>], frames: usize) -> Result<()> {
        let input = inputs.first().ok_or(ComponentError::NoData)?;
        if input.len() < frames {
            return Err(ComponentError::NoData);
        }
        let output = outputs.first_mut().ok_or(ComponentError::NoSpace)?;
        output.clear();
        let out_frames = self.output_frames(frames);
        let ratio = self.input_rate as f64 / self.output_rate as f64;
        for n in 0..out_frames {
            let src_pos = n as f64 * ratio + self.phase;
            let index = src_pos.floor() as usize;
            if index >= frames {
                break;
            }
            let sample = match self.mode {
                SrcMode::Nearest => input[index] as f64,
                SrcMode::Linear => {
                    let frac = src_pos - index as f64;
                    let next = input.get(index + 1).copied().unwrap_or(input[index]);
                    input[index] as f64 * (1.0 - frac) + next as f64 * frac
                }
            };
            output.push(sample.round() as i32);
        }
        Ok(())
    }
}

/// One-pole DC blocker: `y[n] = x[n] - x[n-1] + R*y[n-1]`.
pub struct DcBlockKernel {
    pub coefficient: adsp_core::Q8_16,
    prev_in: i32,
    prev_out: i32,
}

impl DcBlockKernel {
    pub fn new(coefficient: adsp_core::Q8_16) -> Self {
        Self { coefficient, prev_in: 0, prev_out: 0 }
    }
}

impl KernelOp for DcBlockKernel {
    fn process(&mut self, inputs: &[&[i32]], outputs: &mut [Vec<i32>], frames: usize) -> Result<()> {
        let input = inputs.first().ok_or(ComponentError::NoData)?;
        if input.len() < frames {
            return Err(ComponentError::NoData);
        }
        let output = outputs.first_mut().ok_or(ComponentError::NoSpace)?;
        output.clear();
        let coeff = self.coefficient.raw() as i64;
        for &x in &input[..frames] {
            let feedback = (self.prev_out as i64 * coeff) >> 16;
            let y = x as i64 - self.prev_in as i64 + feedback;
            let y = saturate_to_bits(y, 32);
            output.push(y);
            self.prev_in = x;
            self.prev_out = y;
        }
        Ok(())
    }
}
