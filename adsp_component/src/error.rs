//! Error type for component operations.
//!
//! Wraps [`adsp_core::CoreError`] with component-specific context, using the
//! same `thiserror`-derived pattern as the rest of this workspace's error
//! types, generalized from block-graph errors to the component-vtable
//! contracts named in the error handling design.

pub type Result<T> = std::result::Result<T, ComponentError>;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ComponentError {
    #[error("component not in a state that permits this operation: {0}")]
    BadState(adsp_core::CoreError),

    #[error("malformed parameter or configuration: {0}")]
    BadParam(adsp_core::CoreError),

    #[error("input buffer below minimum frames to produce one output frame")]
    NoData,

    #[error("output buffer cannot hold the next result")]
    NoSpace,

    #[error("operation not supported by this component kind")]
    NotSupported,

    #[error("component core error: {0}")]
    Core(adsp_core::CoreError),
}

impl From<adsp_core::CoreError> for ComponentError {
    fn from(err: adsp_core::CoreError) -> Self {
        match err {
            adsp_core::CoreError::BadState => ComponentError::BadState(err),
            adsp_core::CoreError::BadParam => ComponentError::BadParam(err),
            other => ComponentError::Core(other),
        }
    }
}
