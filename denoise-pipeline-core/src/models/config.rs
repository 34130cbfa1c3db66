use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Bytes per sample for 16-bit PCM transport buffers.
pub const BYTES_PER_SAMPLE: usize = 2;

/// Configuration for a denoise pipeline.
///
/// Fixed for the pipeline's lifetime once constructed. The transport format
/// is always little-endian signed 16-bit PCM, interleaved when stereo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Sample rate in Hz (default: 48000).
    pub sample_rate: u32,

    /// Number of channels (1 = mono, 2 = stereo interleaved).
    pub channels: u16,

    /// Bit depth for PCM transport. Fixed at 16.
    pub bit_depth: u16,

    /// Capture/output buffer size in bytes. One buffer is one filter frame:
    /// `buffer_size / (2 * channels)` samples per channel.
    pub buffer_size: usize,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if ![1, 2].contains(&self.channels) {
            return Err(format!("unsupported channel count: {}", self.channels));
        }
        if self.bit_depth != 16 {
            return Err(format!("unsupported bit depth: {}", self.bit_depth));
        }
        if self.buffer_size == 0 {
            return Err("buffer size must be positive".into());
        }
        if self.buffer_size % (BYTES_PER_SAMPLE * self.channels as usize) != 0 {
            return Err(format!(
                "buffer size {} is not a multiple of {} (2 bytes × {} channels)",
                self.buffer_size,
                BYTES_PER_SAMPLE * self.channels as usize,
                self.channels
            ));
        }
        Ok(())
    }

    /// Total interleaved samples in one transport buffer.
    pub fn samples_per_buffer(&self) -> usize {
        self.buffer_size / BYTES_PER_SAMPLE
    }

    /// Samples per channel in one transport buffer — the frame size the
    /// noise filter must accept.
    pub fn samples_per_channel(&self) -> usize {
        self.samples_per_buffer() / self.channels as usize
    }

    /// Wall-clock duration of one buffer. Shutdown latency is bounded by
    /// at most one of these (the blocking read in flight).
    pub fn buffer_duration(&self) -> Duration {
        let frames = self.samples_per_channel() as u64;
        Duration::from_nanos(frames.saturating_mul(1_000_000_000) / self.sample_rate as u64)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        // 480 samples of mono at 48 kHz: 10 ms, the RNNoise native frame.
        Self {
            sample_rate: 48_000,
            channels: 1,
            bit_depth: 16,
            buffer_size: 960,
        }
    }
}
