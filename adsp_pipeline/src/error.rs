use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline in wrong state for that operation")]
    BadState,
    #[error("parameter field conflicts with an already-active neighbor pipeline")]
    ParamConflict,
    #[error("component or buffer id not found in this pipeline")]
    NotFound,
    #[error("graph from source endpoint does not reach the sink endpoint")]
    Disconnected,
    #[error(transparent)]
    Component(#[from] adsp_component::ComponentError),
    #[error(transparent)]
    Core(#[from] adsp_core::CoreError),
}

pub type Result<T> = core::result::Result<T, PipelineError>;
