//! Concrete component kinds, each a struct implementing [`crate::component::ComponentOps`].
//!
//! Every variant's `copy` delegates to a [`crate::kernel::KernelOp`] owned in
//! its private state; the component itself only manages lifecycle and
//! vtable plumbing.

pub mod dcblock;
pub mod gateway;
pub mod mixer;
pub mod src;
pub mod volume;

pub use dcblock::DcBlockComponent;
pub use gateway::GatewayComponent;
pub use mixer::MixerComponent;
pub use src::SrcComponent;
pub use volume::VolumeComponent;
