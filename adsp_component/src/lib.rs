//! # adsp_component
//!
//! The processing-component vtable (§4.3): a `ComponentOps` trait object per
//! instance, the component state lattice, and the
//! reference DSP kernels (gain, mixer, SRC, DC blocker) that make the
//! pipeline's end-to-end scenarios testable without a real algorithm
//! library plugged in.

pub mod component;
pub mod components;
pub mod error;
pub mod kernel;
pub mod kind;
pub mod state;

pub use component::{
    AttributeKind, AttributeValue, ComponentBase, ComponentOps, Direction, GatewayTransport, MAX_BUFFER_REFS,
    decode_s16, encode_s16,
};
pub use error::{ComponentError, Result};
pub use kind::ComponentKind;
pub use state::{ComponentState, TriggerCmd, TriggerOutcome, apply_trigger};
