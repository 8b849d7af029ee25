//! Error taxonomy shared by every crate in the workspace.
//!
//! This module provides a C-compatible error enum and a `Result` type alias.
//! `thiserror`-based crates further up the stack wrap [`CoreError`] rather
//! than duplicate the taxonomy, so a `bad_state` at the component layer and
//! a `bad_state` reported over IPC are the same value end to end.

use core::fmt;

/// Error codes for the audio co-processor runtime.
///
/// Uses `#[repr(C)]` for C-compatible memory layout, enabling FFI usage at
/// the IPC boundary. Variants mirror the abstract kinds named in the error
/// handling design: `bad_state`, `bad_param`, `no_memory`, `no_resource`,
/// `busy`, `xrun`, `not_supported`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoreError {
    /// Operation not valid in the current pipeline/component state.
    BadState = 0,
    /// Malformed payload, out-of-range value, or inconsistent graph.
    BadParam = 1,
    /// Allocation failure in any memory pool.
    NoMemory = 2,
    /// No DMA channel, no DAI instance, or the remote core is unreachable.
    NoResource = 3,
    /// Another long-running IPC or trigger is already in flight.
    Busy = 4,
    /// Data underflow or overflow (normally surfaced as a notification).
    Xrun = 5,
    /// Valid request the core declines to honor.
    NotSupported = 6,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::BadState => write!(f, "bad state"),
            CoreError::BadParam => write!(f, "bad parameter"),
            CoreError::NoMemory => write!(f, "out of memory"),
            CoreError::NoResource => write!(f, "no resource available"),
            CoreError::Busy => write!(f, "busy"),
            CoreError::Xrun => write!(f, "xrun"),
            CoreError::NotSupported => write!(f, "not supported"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CoreError {}

/// Result type alias for core operations.
pub type Result<T> = core::result::Result<T, CoreError>;
