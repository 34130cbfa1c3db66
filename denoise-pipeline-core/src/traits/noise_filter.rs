use crate::models::error::PipelineError;

/// One stateful noise-suppression filter lane.
///
/// A lane processes mono frames of exactly `frame_size()` samples and
/// carries filter state across calls: the output of a frame depends on the
/// full history of prior frames, so callers must feed frames strictly in
/// capture order. Geometry is enforced by the [`Denoiser`] wrapper, so
/// implementations may assume `frame.len() == frame_size()`.
///
/// For multi-channel audio the wrapper creates one lane per channel; an
/// implementation never sees interleaved data.
///
/// [`Denoiser`]: crate::processing::denoiser::Denoiser
pub trait NoiseFilter: Send {
    /// Samples per frame this filter processes.
    fn frame_size(&self) -> usize;

    /// Apply noise suppression to one frame, in place.
    fn process_frame(&mut self, frame: &mut [i16]);
}

/// Factory for [`NoiseFilter`] lanes.
///
/// Declares the frame size up front so the pipeline can validate its
/// configuration against the filter's geometry before opening any device,
/// and before any filter state is allocated.
pub trait NoiseFilterFactory: Send {
    type Filter: NoiseFilter;

    /// Samples per frame the produced filters require.
    fn frame_size(&self) -> usize;

    /// Allocate one filter lane.
    ///
    /// Fails with `InitFailure` if the underlying filter state cannot be
    /// allocated.
    fn create(&self) -> Result<Self::Filter, PipelineError>;
}
