//! # adsp_pipeline
//!
//! The pipeline graph (§4.5): component/buffer ownership and the
//! `for_each_comp` tree-walk primitive it's built on, the per-pipeline
//! state machine with parameter negotiation, prepare, and trigger-ordering
//! semantics, the sliding xrun-threshold tracker, and the per-core EDF
//! scheduler that decides when a pipeline's scheduling component fires.

pub mod error;
pub mod graph;
pub mod pipeline;
pub mod scheduler;
pub mod xrun;

pub use error::{PipelineError, Result};
pub use graph::{Graph, WalkDirection};
pub use pipeline::{Pipeline, PipelineState, TimeDomain};
pub use scheduler::EdfScheduler;
pub use xrun::XrunTracker;
