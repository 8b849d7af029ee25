//! # adsp_buffer
//!
//! The circular byte-level audio buffer (§3/§4.2): producer/consumer FIFO
//! between exactly one source and one sink component, with stream
//! parameters, overrun/underrun policy, and cache-coherency discipline for
//! cross-core sharing.

pub mod buffer;
pub mod format;

pub use buffer::AudioBuffer;
pub use format::{Interleaving, SampleFormat, SetParamsMode, StreamParams};
