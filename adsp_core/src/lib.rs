//! # adsp_core
//!
//! Foundational primitives shared by every crate in the workspace: the
//! typed memory-region allocator, the `Shared<T>` cache-discipline wrapper,
//! the lock-free SPSC ring and the IDC cross-core call built on it, the
//! error taxonomy, registry id newtypes, fixed-capacity stack collections,
//! and Q-format fixed-point arithmetic.
//!
//! This crate stays `no_std`-capable (mirroring the firmware's own core
//! layer); `idc` additionally requires `std` since blocking cross-core
//! calls are modeled with a condvar, which has no bare-metal equivalent in
//! this workspace.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod error;
pub mod fixed;
#[cfg(feature = "std")]
pub mod idc;
pub mod ids;
pub mod region;
pub mod shared;
#[cfg(feature = "std")]
pub mod spsc;
pub mod stack_vec;

pub use error::{CoreError, Result};
pub use fixed::{Q, Q1_23, Q8_16, saturate_to_bits};
pub use ids::{BufferId, ComponentId, DaiId, IdGenerator, PipelineId};
pub use region::{Capabilities, RegionKind, RegionPool, RegionPtr};
pub use shared::{CacheOps, NullCacheOps, Shared};
#[cfg(feature = "std")]
pub use spsc::{Consumer, Producer, SpscRingBuffer};
pub use stack_vec::StackVec;
