use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("component kind {0} cannot be constructed from a topology spec")]
    UnknownComponentKind(String),
    #[error("pipeline {0} not found")]
    PipelineNotFound(u32),
    #[error(transparent)]
    Pipeline(#[from] adsp_pipeline::PipelineError),
    #[error(transparent)]
    Core(#[from] adsp_core::CoreError),
    #[error(transparent)]
    Dai(#[from] adsp_dai::DaiError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn pipeline_error_to_core(e: adsp_pipeline::PipelineError) -> adsp_core::CoreError {
    use adsp_pipeline::PipelineError as P;
    match e {
        P::BadState => adsp_core::CoreError::BadState,
        P::ParamConflict => adsp_core::CoreError::BadParam,
        P::NotFound => adsp_core::CoreError::NoResource,
        P::Disconnected => adsp_core::CoreError::BadParam,
        P::Component(_) => adsp_core::CoreError::BadState,
        P::Core(c) => c,
    }
}

impl From<RuntimeError> for adsp_core::CoreError {
    fn from(e: RuntimeError) -> Self {
        match e {
            RuntimeError::UnknownComponentKind(_) => adsp_core::CoreError::BadParam,
            RuntimeError::PipelineNotFound(_) => adsp_core::CoreError::NoResource,
            RuntimeError::Pipeline(p) => pipeline_error_to_core(p),
            RuntimeError::Core(c) => c,
            RuntimeError::Dai(d) => d.into(),
            RuntimeError::Json(_) => adsp_core::CoreError::BadParam,
            RuntimeError::Io(_) => adsp_core::CoreError::BadParam,
        }
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
