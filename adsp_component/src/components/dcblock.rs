//! `SOF_COMP_DCBLOCK`: one-pole DC blocker.

use crate::component::{ComponentBase, ComponentOps};
use crate::error::Result;
use crate::kernel::{DcBlockKernel, KernelOp};
use crate::kind::ComponentKind;

pub struct DcBlockComponent {
    base: ComponentBase,
    kernel: DcBlockKernel,
}

impl DcBlockComponent {
    pub fn new(base: ComponentBase, coefficient: adsp_core::Q8_16) -> Self {
        Self { base, kernel: DcBlockKernel::new(coefficient) }
    }
}

impl ComponentOps for DcBlockComponent {
    fn kind(&self) -> ComponentKind {
        ComponentKind::DcBlock
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
