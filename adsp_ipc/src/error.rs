//! Error type for IPC dispatch.

pub type Result<T> = std::result::Result<T, IpcError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IpcError {
    #[error("malformed header or payload")]
    BadParam,
    #[error("a message is already in flight")]
    Busy,
    #[error("no resource available")]
    NoResource,
    #[error("request not supported")]
    NotSupported,
    #[error("operation not valid in the current dispatch state")]
    BadState,
    #[error("allocation failure")]
    NoMemory,
    #[error(transparent)]
    Core(#[from] adsp_core::CoreError),
}

impl From<IpcError> for adsp_core::CoreError {
    fn from(e: IpcError) -> Self {
        match e {
            IpcError::BadParam => adsp_core::CoreError::BadParam,
            IpcError::Busy => adsp_core::CoreError::Busy,
            IpcError::NoResource => adsp_core::CoreError::NoResource,
            IpcError::NotSupported => adsp_core::CoreError::NotSupported,
            IpcError::BadState => adsp_core::CoreError::BadState,
            IpcError::NoMemory => adsp_core::CoreError::NoMemory,
            IpcError::Core(inner) => inner,
        }
    }
}
