//! Pipeline front-ends.
//!
//! Two drivers share one processing function: [`audio_pipeline`] pulls
//! transport buffers from a capture endpoint on a dedicated thread, while
//! [`intercept`] is handed already-captured buffers on the caller's thread.
//! Both run the same decode → denoise → encode step per frame.

pub mod audio_pipeline;
pub mod intercept;

use crate::models::error::PipelineError;
use crate::processing::denoiser::Denoiser;
use crate::processing::frame_codec;
use crate::traits::noise_filter::NoiseFilter;

/// One frame's worth of work: decode a transport buffer, run the filter,
/// re-encode. Fails on malformed input or a frame-geometry violation; the
/// caller decides whether that is fatal.
pub(crate) fn process_transport_buffer<F: NoiseFilter>(
    denoiser: &mut Denoiser<F>,
    bytes: &[u8],
) -> Result<Vec<u8>, PipelineError> {
    let mut samples = frame_codec::decode(bytes)?;
    denoiser.process(&mut samples)?;
    Ok(frame_codec::encode(&samples))
}
