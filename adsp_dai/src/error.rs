use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaiError {
    #[error("dai instance already claimed")]
    Busy,
    #[error("no dai instance registered for that (type, index)")]
    NotFound,
    #[error("dai in wrong state for that operation")]
    BadState,
    #[error("no dma channel available")]
    NoResource,
    #[error("operation not supported by this dai type")]
    NotSupported,
    #[error(transparent)]
    Core(#[from] adsp_core::CoreError),
    #[error(transparent)]
    Component(#[from] adsp_component::ComponentError),
}

impl From<DaiError> for adsp_core::CoreError {
    fn from(e: DaiError) -> Self {
        match e {
            DaiError::Busy => adsp_core::CoreError::Busy,
            DaiError::NotFound => adsp_core::CoreError::NoResource,
            DaiError::BadState => adsp_core::CoreError::BadState,
            DaiError::NoResource => adsp_core::CoreError::NoResource,
            DaiError::NotSupported => adsp_core::CoreError::NotSupported,
            DaiError::Core(c) => c,
            DaiError::Component(_) => adsp_core::CoreError::BadState,
        }
    }
}

pub type Result<T> = core::result::Result<T, DaiError>;
