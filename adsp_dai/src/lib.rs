//! # adsp_dai
//!
//! The DAI gateway abstraction (§4.4): a uniform `get/put/set_config/
//! trigger/get_hw_params/probe/remove` interface over the heterogeneous
//! zoo of physical audio transports (SSP, DMIC, I2S, ALH, SAI, HDA, host
//! and link DMA), plus the timestamp sub-interface and the LLP position
//! slot the host polls for sub-frame position.
//!
//! This crate carries no register-level driver code — that is explicitly
//! out of scope — only the gateway shape and a simulated loopback
//! transport ([`SimTransport`]) so pipelines can be exercised end to end on
//! a host without real silicon.

pub mod component;
pub mod dma;
pub mod error;
pub mod gateway;
pub mod kind;
pub mod llp;
pub mod registry;
pub mod sim;
pub mod timestamp;

pub use component::DaiGatewayComponent;
pub use dma::{DmaChannel, DmaChannelPool};
pub use error::{DaiError, Result};
pub use gateway::{DaiConfig, DaiGateway, DaiState, TriggerCmd};
pub use kind::DaiType;
pub use llp::LlpSlot;
pub use registry::{DaiHandle, DaiRegistry};
pub use sim::SimTransport;
pub use timestamp::{TsConfig, WallclockSample};
