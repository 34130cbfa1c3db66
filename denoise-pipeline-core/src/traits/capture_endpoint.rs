use crate::models::error::PipelineError;

/// Interface for platform-specific capture devices (microphone input).
///
/// Implemented by the host application over its audio stack (ALSA, WASAPI,
/// an in-process test double, …). The pipeline takes exclusive ownership of
/// the endpoint for the whole `Running` window; nothing else may read it
/// while the cycle is live.
///
/// Resource release is `Drop`; `stop_capture` only quiesces the device so
/// the endpoint can be restarted later.
pub trait CaptureEndpoint: Send {
    /// Open and start the capture stream.
    ///
    /// Fails with `DeviceUnavailable` if the device cannot be opened with
    /// the configured rate/channel/buffer combination (busy, permission
    /// denied, unsupported format).
    fn start_capture(&mut self) -> Result<(), PipelineError>;

    /// Block until captured bytes are available and copy them into `buf`.
    ///
    /// Returns the number of bytes read. This is the pipeline's only
    /// suspension point: it blocks for at most one buffer's capture
    /// duration. `Ok(0)` and `Err` are treated as transient by the cycle —
    /// the iteration is skipped, not aborted.
    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize, PipelineError>;

    /// Stop the capture stream.
    fn stop_capture(&mut self);
}
