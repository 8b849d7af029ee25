//! 24-bit reply status codes (§4.6, §7): zero is success, every other value
//! maps to one of the abstract error kinds from the error handling design.

use adsp_core::CoreError;

const STATUS_MASK: u32 = 0x00ff_ffff;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyStatus(u32);

impl ReplyStatus {
    pub const SUCCESS: Self = Self(0);

    pub fn from_u32(raw: u32) -> Self {
        Self(raw & STATUS_MASK)
    }

    pub fn to_u32(self) -> u32 {
        self.0 & STATUS_MASK
    }

    pub fn is_success(self) -> bool {
        self.0 == 0
    }

    pub fn as_core_error(self) -> Option<CoreError> {
        match self.0 {
            0 => None,
            1 => Some(CoreError::BadState),
            2 => Some(CoreError::BadParam),
            3 => Some(CoreError::NoMemory),
            4 => Some(CoreError::NoResource),
            5 => Some(CoreError::Busy),
            6 => Some(CoreError::Xrun),
            7 => Some(CoreError::NotSupported),
            _ => Some(CoreError::BadParam),
        }
    }
}

impl From<CoreError> for ReplyStatus {
    fn from(e: CoreError) -> Self {
        let code = match e {
            CoreError::BadState => 1,
            CoreError::BadParam => 2,
            CoreError::NoMemory => 3,
            CoreError::NoResource => 4,
            CoreError::Busy => 5,
            CoreError::Xrun => 6,
            CoreError::NotSupported => 7,
        };
        Self(code)
    }
}

impl From<crate::error::IpcError> for ReplyStatus {
    fn from(e: crate::error::IpcError) -> Self {
        Self::from(CoreError::from(e))
    }
}
