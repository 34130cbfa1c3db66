//! # denoise-pipeline-rnnoise
//!
//! RNNoise backend for denoise-pipeline, built on the pure-Rust
//! `nnnoiseless` crate.
//!
//! RNNoise natively processes 480-sample frames (10 ms at 48 kHz) of
//! 16-bit-range `f32` audio and reports a voice-activity probability per
//! frame. `RnnoiseFilter` adapts that to the core's `NoiseFilter` contract:
//! the configured frame size must be a whole multiple of the native size,
//! and larger frames are processed as consecutive native-size chunks in
//! order, so filter state still advances once per chunk in capture order.

use nnnoiseless::DenoiseState;

use denoise_pipeline_core::traits::noise_filter::{NoiseFilter, NoiseFilterFactory};
use denoise_pipeline_core::PipelineError;

/// Samples per native RNNoise frame.
pub const NATIVE_FRAME_SIZE: usize = DenoiseState::<'static>::FRAME_SIZE;

/// One RNNoise filter lane.
///
/// Owns its `DenoiseState` across calls; the adaptive noise estimate lives
/// there, which is why frame order matters. Scratch buffers are allocated
/// once at construction, keeping `process_frame` allocation-free.
pub struct RnnoiseFilter {
    state: Box<DenoiseState<'static>>,
    frame_size: usize,
    in_buf: Vec<f32>,
    out_buf: Vec<f32>,
    last_vad: f32,
}

impl RnnoiseFilter {
    /// Create a filter for `frame_size` samples per frame.
    ///
    /// `frame_size` must be a positive multiple of [`NATIVE_FRAME_SIZE`].
    pub fn new(frame_size: usize) -> Result<Self, PipelineError> {
        if frame_size == 0 || frame_size % NATIVE_FRAME_SIZE != 0 {
            return Err(PipelineError::InitFailure(format!(
                "frame size {frame_size} is not a multiple of the RNNoise native frame ({NATIVE_FRAME_SIZE})"
            )));
        }
        Ok(Self {
            state: DenoiseState::new(),
            frame_size,
            in_buf: vec![0.0; NATIVE_FRAME_SIZE],
            out_buf: vec![0.0; NATIVE_FRAME_SIZE],
            last_vad: 0.0,
        })
    }

    /// Voice-activity probability of the most recently processed chunk,
    /// in `[0.0, 1.0]`.
    pub fn last_vad(&self) -> f32 {
        self.last_vad
    }
}

impl NoiseFilter for RnnoiseFilter {
    fn frame_size(&self) -> usize {
        self.frame_size
    }

    fn process_frame(&mut self, frame: &mut [i16]) {
        for chunk in frame.chunks_exact_mut(NATIVE_FRAME_SIZE) {
            // RNNoise takes f32 samples in the i16 value range.
            for (dst, &src) in self.in_buf.iter_mut().zip(chunk.iter()) {
                *dst = f32::from(src);
            }

            self.last_vad = self.state.process_frame(&mut self.out_buf, &self.in_buf);

            for (dst, &src) in chunk.iter_mut().zip(self.out_buf.iter()) {
                *dst = src.round().clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16;
            }
        }
    }
}

/// Factory for [`RnnoiseFilter`] lanes.
#[derive(Debug, Clone)]
pub struct RnnoiseFilterFactory {
    frame_size: usize,
}

impl RnnoiseFilterFactory {
    /// Factory for the native 480-sample frame.
    pub fn new() -> Self {
        Self {
            frame_size: NATIVE_FRAME_SIZE,
        }
    }

    /// Factory for a larger frame, validated to a positive multiple of the
    /// native size.
    pub fn with_frame_size(frame_size: usize) -> Result<Self, PipelineError> {
        if frame_size == 0 || frame_size % NATIVE_FRAME_SIZE != 0 {
            return Err(PipelineError::InitFailure(format!(
                "frame size {frame_size} is not a multiple of the RNNoise native frame ({NATIVE_FRAME_SIZE})"
            )));
        }
        Ok(Self { frame_size })
    }
}

impl Default for RnnoiseFilterFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseFilterFactory for RnnoiseFilterFactory {
    type Filter = RnnoiseFilter;

    fn frame_size(&self) -> usize {
        self.frame_size
    }

    fn create(&self) -> Result<RnnoiseFilter, PipelineError> {
        RnnoiseFilter::new(self.frame_size)
    }
}
