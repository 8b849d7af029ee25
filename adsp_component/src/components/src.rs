//! `SOF_COMP_SRC`: synchronous sample-rate conversion.

use adsp_buffer::StreamParams;

use crate::component::{ComponentBase, ComponentOps};
use crate::error::Result;
use crate::kernel::{KernelOp, SrcKernel, SrcMode};
use crate::kind::ComponentKind;

pub struct SrcComponent {
    base: ComponentBase,
    kernel: SrcKernel,
    output_rate: u32,
}

impl SrcComponent {
    pub fn new(base: ComponentBase, input_rate: u32, output_rate: u32, mode: SrcMode) -> Self {
        Self { base, kernel: SrcKernel::new(input_rate, output_rate, mode), output_rate }
    }
}

impl ComponentOps for SrcComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Src
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    /// Rewrites the rate field to this converter's output rate before
    /// forwarding, per the pipeline's parameter negotiation walk (§4.5).
    fn negotiate_params(&mut self, params: StreamParams) -> Result<StreamParams> {
        self.params(params)?;
        Ok(StreamParams { rate: self.output_rate, ..params })
    }

    fn copy(&mut self, inputs: &[&[i32]], outputs: &mut [Vec<i32>], frames: usize) -> Result<()> {
        self.kernel.process(inputs, outputs, frames)
    }
}
