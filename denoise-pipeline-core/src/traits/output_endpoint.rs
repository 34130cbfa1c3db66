use crate::models::error::PipelineError;

/// Interface for platform-specific output sinks: speaker playback and/or
/// onward transport into a communication stack.
///
/// Writes are best-effort from the pipeline's point of view: a short write
/// or a write error drops at most one frame and never stops the cycle.
pub trait OutputEndpoint: Send {
    /// Open and start the output stream.
    fn start_output(&mut self) -> Result<(), PipelineError>;

    /// Write processed bytes, returning how many were accepted.
    ///
    /// May accept fewer than `buf.len()` bytes (device buffer full).
    fn write(&mut self, buf: &[u8]) -> Result<usize, PipelineError>;

    /// Stop the output stream.
    fn stop_output(&mut self);
}
