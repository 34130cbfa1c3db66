use thiserror::Error;

/// Errors that can occur in the noise-suppression pipeline.
///
/// Lifecycle and configuration errors surface synchronously from `start()`
/// and constructors; a `ConfigMismatch` detected mid-cycle is fatal and is
/// reported through `AudioPipeline::last_error` and the delegate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("malformed transport buffer: {len} bytes is not a whole number of 16-bit samples")]
    MalformedBuffer { len: usize },

    #[error("noise filter initialization failed: {0}")]
    InitFailure(String),

    #[error("noise filter used after release")]
    UseAfterRelease,

    #[error("frame size mismatch: filter expects {expected} samples, got {actual}")]
    FrameSizeMismatch { expected: usize, actual: usize },

    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("configuration mismatch: {0}")]
    ConfigMismatch(String),

    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    #[error("pipeline already running")]
    AlreadyRunning,
}
