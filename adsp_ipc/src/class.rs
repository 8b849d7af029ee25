//! Subcommand enumerations for each [`crate::header::MsgClass`].

use crate::error::{IpcError, Result};
use crate::header::MsgClass;

macro_rules! subcmd_enum {
    ($name:ident { $($variant:ident = $val:expr),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant = $val),+
        }

        impl $name {
            pub fn from_u8(raw: u8) -> Result<Self> {
                match raw {
                    $($val => Ok($name::$variant),)+
                    _ => Err(IpcError::BadParam),
                }
            }

            pub fn as_u8(self) -> u8 {
                self as u8
            }
        }
    };
}

subcmd_enum!(GlbTplgCmd {
    CompNew = 0,
    BufferNew = 1,
    PipeNew = 2,
    CompConnect = 3,
    PipeComplete = 4,
    CompFree = 5,
    BufferFree = 6,
    PipeFree = 7,
    DaiConfig = 8,
});

subcmd_enum!(GlbStreamCmd {
    PcmParams = 0,
    PcmFree = 1,
    Trigger = 2,
    Position = 3,
});

subcmd_enum!(GlbPmCmd {
    CtxSave = 0,
    CtxRestore = 1,
    CoreEnable = 2,
});

subcmd_enum!(GlbDebugCmd {
    TraceDmaParams = 0,
    MemDump = 1,
});

subcmd_enum!(NotifyType {
    FwReady = 0,
    Xrun = 1,
    PositionAdvance = 2,
    ResourceEvent = 3,
    WatchdogTimeout = 4,
    PhraseDetected = 5,
});

impl NotifyType {
    /// Notification classes the ring must never silently drop (§4.6:
    /// "`xrun` and `watchdog` must never drop").
    pub fn is_drop_safe(self) -> bool {
        !matches!(self, NotifyType::Xrun | NotifyType::WatchdogTimeout)
    }
}

/// Validate that `subcmd` is one this `class` actually defines.
pub fn validate_subcmd(class: MsgClass, subcmd: u8) -> Result<()> {
    match class {
        MsgClass::GlbTplg => GlbTplgCmd::from_u8(subcmd).map(|_| ()),
        MsgClass::GlbStream => GlbStreamCmd::from_u8(subcmd).map(|_| ()),
        MsgClass::GlbPm => GlbPmCmd::from_u8(subcmd).map(|_| ()),
        MsgClass::GlbDebug => GlbDebugCmd::from_u8(subcmd).map(|_| ()),
        MsgClass::Notify => NotifyType::from_u8(subcmd).map(|_| ()),
    }
}
