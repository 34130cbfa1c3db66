use serde::{Deserialize, Serialize};

/// Counters maintained by the processing cycle, for debugging a live
/// pipeline without attaching to its audio path.
///
/// Transient anomalies the cycle recovers from (`skipped_reads`,
/// `short_writes`) are visible here even though they never surface as
/// errors; a permanently failed capture device shows up as `skipped_reads`
/// climbing while `frames_captured` stalls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Buffers successfully read from the capture endpoint.
    pub frames_captured: u64,
    /// Frames run through the noise filter.
    pub frames_denoised: u64,
    /// Bytes accepted by the output endpoint.
    pub bytes_emitted: u64,
    /// Iterations skipped on a zero-byte or failed capture read.
    pub skipped_reads: u64,
    /// Output writes that accepted fewer bytes than offered.
    pub short_writes: u64,
}
