use thiserror::Error;
use umbra_world::VolumeError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("stage `{stage}` failed: {message}")]
    Stage { stage: &'static str, message: String },
    #[error("stage `{stage}` panicked: {message}")]
    Panicked { stage: &'static str, message: String },
    #[error("upstream stage `{stage}` did not complete")]
    UpstreamFailed { stage: &'static str },
    #[error("task aborted")]
    Aborted,
    #[error("volume disposed while the pipeline was running")]
    Disposed,
    #[error("volume error: {0}")]
    Volume(String),
    #[error("failed to build thread pool `{pool}`: {message}")]
    Pool { pool: &'static str, message: String },
}

impl From<VolumeError> for PipelineError {
    fn from(e: VolumeError) -> Self {
        match e {
            VolumeError::Disposed => PipelineError::Disposed,
            other => PipelineError::Volume(other.to_string()),
        }
    }
}
