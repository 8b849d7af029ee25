//! # adsp_runtime
//!
//! The `Runtime` context that owns one DSP core's pipeline graph,
//! pipeline table and DAI registry, the `CommandHandler` bridging it to
//! `adsp_ipc::Dispatcher`, a `serde_json` topology-authoring format, and a
//! runnable host-simulation binary driving the whole stack on nothing but
//! `adsp_dai::SimTransport`.

pub mod command;
pub mod error;
pub mod runtime;
pub mod topology;
mod wire;

pub use command::RuntimeCommandHandler;
pub use error::{Result, RuntimeError};
pub use runtime::{ComponentSpec, Runtime};
pub use topology::TopologyDoc;
