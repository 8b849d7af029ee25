//! The 32-bit primary header (§6.1): `target`/`direction`/`class`/
//! `subcommand`/`primary-specific` packed into one word, with a reply
//! re-using the same slot for a 24-bit status.

use crate::error::{IpcError, Result};

const TARGET_BIT: u32 = 30;
const DIRECTION_BIT: u32 = 29;
const CLASS_SHIFT: u32 = 24;
const CLASS_MASK: u32 = 0x1f;
const SUBCMD_SHIFT: u32 = 16;
const SUBCMD_MASK: u32 = 0xff;
const PRIMARY_MASK: u32 = 0xffff;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    FwGenMsg,
    ModuleMsg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MsgDirection {
    Request,
    Reply,
}

/// Message class (bits 28..24). `Notify` is dsp->host only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MsgClass {
    GlbTplg,
    GlbStream,
    GlbPm,
    GlbDebug,
    Notify,
}

impl MsgClass {
    fn from_bits(bits: u32) -> Result<Self> {
        match bits {
            0 => Ok(MsgClass::GlbTplg),
            1 => Ok(MsgClass::GlbStream),
            2 => Ok(MsgClass::GlbPm),
            3 => Ok(MsgClass::GlbDebug),
            4 => Ok(MsgClass::Notify),
            _ => Err(IpcError::BadParam),
        }
    }

    fn to_bits(self) -> u32 {
        match self {
            MsgClass::GlbTplg => 0,
            MsgClass::GlbStream => 1,
            MsgClass::GlbPm => 2,
            MsgClass::GlbDebug => 3,
            MsgClass::Notify => 4,
        }
    }
}

/// The decoded primary header. `subcmd` is kept as a raw byte here; callers
/// interpret it against the enum for `class` (see [`crate::class`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimaryHeader {
    pub target: Target,
    pub direction: MsgDirection,
    pub class: MsgClass,
    pub subcmd: u8,
    pub primary_specific: u16,
}

impl PrimaryHeader {
    pub fn new(target: Target, direction: MsgDirection, class: MsgClass, subcmd: u8, primary_specific: u16) -> Self {
        Self { target, direction, class, subcmd, primary_specific }
    }

    pub fn request(class: MsgClass, subcmd: u8, primary_specific: u16) -> Self {
        Self::new(Target::FwGenMsg, MsgDirection::Request, class, subcmd, primary_specific)
    }

    pub fn from_u32(raw: u32) -> Result<Self> {
        let target = if (raw >> TARGET_BIT) & 1 == 0 { Target::FwGenMsg } else { Target::ModuleMsg };
        let direction = if (raw >> DIRECTION_BIT) & 1 == 0 { MsgDirection::Request } else { MsgDirection::Reply };
        let class = MsgClass::from_bits((raw >> CLASS_SHIFT) & CLASS_MASK)?;
        let subcmd = ((raw >> SUBCMD_SHIFT) & SUBCMD_MASK) as u8;
        let primary_specific = (raw & PRIMARY_MASK) as u16;
        Ok(Self { target, direction, class, subcmd, primary_specific })
    }

    pub fn to_u32(self) -> u32 {
        let mut raw = 0u32;
        if self.target == Target::ModuleMsg {
            raw |= 1 << TARGET_BIT;
        }
        if self.direction == MsgDirection::Reply {
            raw |= 1 << DIRECTION_BIT;
        }
        raw |= self.class.to_bits() << CLASS_SHIFT;
        raw |= (self.subcmd as u32 & SUBCMD_MASK) << SUBCMD_SHIFT;
        raw |= self.primary_specific as u32 & PRIMARY_MASK;
        raw
    }

    /// Build the reply header for this request: same target/class/subcmd
    /// and primary-specific field, direction flipped to `Reply`.
    pub fn reply_header(self) -> Self {
        Self { direction: MsgDirection::Reply, ..self }
    }
}
