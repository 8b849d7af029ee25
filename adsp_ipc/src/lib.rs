//! # adsp_ipc
//!
//! Host <-> DSP IPC (§4.6, §6): the 32-bit primary header wire format and
//! its per-class subcommand enumerations, 24-bit reply status codes, the
//! dispatch loop with one-in-flight serialization and a pluggable command
//! handler, the notification ring with reserved non-drop slots for
//! `xrun`/`watchdog`, large-config fragment reassembly, a bounds-checked
//! TLV cursor shared by the extended-init preamble and the topology blob
//! parser, and the topology binary format itself.

pub mod class;
pub mod dispatch;
pub mod error;
pub mod fragment;
pub mod header;
pub mod notify;
pub mod reply;
pub mod tlv;
pub mod topology;

pub use class::{GlbDebugCmd, GlbPmCmd, GlbStreamCmd, GlbTplgCmd, NotifyType};
pub use dispatch::{CommandHandler, Dispatcher, Request};
pub use error::{IpcError, Result};
pub use fragment::{FragmentPosition, Reassembler};
pub use header::{MsgClass, MsgDirection, PrimaryHeader, Target};
pub use notify::{Notification, NotifyRing};
pub use reply::ReplyStatus;
pub use tlv::{Tlv, TlvCursor, for_each_tlv};
pub use topology::{Block, BlockType, Token, TokenValue, parse_blocks};
