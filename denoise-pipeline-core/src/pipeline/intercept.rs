//! Push-model denoise front-end.
//!
//! Some capture stacks deliver microphone buffers through a samples-ready
//! callback instead of exposing a readable device. `InterceptAdapter` is
//! the pipeline front-end for that shape: the external source pushes each
//! transport buffer in, the adapter denoises it synchronously on the
//! calling thread and forwards it to the sink. No thread is created here —
//! the cost per call is one frame's processing, so the caller must not
//! invoke it from a realtime audio callback unless the filter meets that
//! callback's deadline.

use crate::models::config::PipelineConfig;
use crate::models::diagnostics::PipelineDiagnostics;
use crate::models::error::PipelineError;
use crate::processing::denoiser::Denoiser;
use crate::traits::noise_filter::{NoiseFilter, NoiseFilterFactory};
use crate::traits::output_endpoint::OutputEndpoint;

use super::process_transport_buffer;

/// Receives already-captured sample buffers, denoises them, and forwards
/// the result to an external sink.
///
/// Shares the frame codec and the filter lifecycle with
/// [`AudioPipeline`](super::audio_pipeline::AudioPipeline), but none of the
/// pull loop. `&mut self` on [`on_samples_ready`](Self::on_samples_ready)
/// makes the source's "not reentrant per instance" guarantee a
/// compile-time property.
#[derive(Debug)]
pub struct InterceptAdapter<S, F>
where
    S: OutputEndpoint,
    F: NoiseFilter,
{
    denoiser: Denoiser<F>,
    sink: S,
    diagnostics: PipelineDiagnostics,
}

impl<S, F> InterceptAdapter<S, F>
where
    S: OutputEndpoint,
    F: NoiseFilter,
{
    /// Build an adapter for an externally-managed sink.
    ///
    /// Runs the same validation as `AudioPipeline::start()`: configuration
    /// invariants, then the frame-geometry check against the filter
    /// factory, then filter allocation. The sink is taken as-is; its
    /// start/stop lifecycle belongs to the caller.
    pub fn new<Fac>(config: &PipelineConfig, factory: &Fac, sink: S) -> Result<Self, PipelineError>
    where
        Fac: NoiseFilterFactory<Filter = F>,
    {
        config.validate().map_err(PipelineError::InvalidConfig)?;

        let expected = factory.frame_size();
        let actual = config.samples_per_channel();
        if expected != actual {
            return Err(PipelineError::FrameSizeMismatch { expected, actual });
        }

        let denoiser = Denoiser::init(factory, config.channels as usize)?;

        Ok(Self {
            denoiser,
            sink,
            diagnostics: PipelineDiagnostics::default(),
        })
    }

    /// Process one pushed transport buffer and forward it to the sink.
    ///
    /// Decode and filter failures are contract violations and propagate to
    /// the caller; a short write or write error at the sink drops at most
    /// this frame and is only observed in the diagnostics.
    pub fn on_samples_ready(&mut self, bytes: &[u8]) -> Result<(), PipelineError> {
        let encoded = process_transport_buffer(&mut self.denoiser, bytes)?;
        self.diagnostics.frames_captured += 1;
        self.diagnostics.frames_denoised += 1;

        match self.sink.write(&encoded) {
            Ok(written) => {
                self.diagnostics.bytes_emitted += written as u64;
                if written < encoded.len() {
                    self.diagnostics.short_writes += 1;
                    log::debug!("sink short write: {written}/{} bytes", encoded.len());
                }
            }
            Err(e) => {
                log::warn!("sink write failed: {e}");
            }
        }
        Ok(())
    }

    pub fn diagnostics(&self) -> &PipelineDiagnostics {
        &self.diagnostics
    }

    /// Release the filter. Further `on_samples_ready` calls fail with
    /// `UseAfterRelease`.
    pub fn release(&mut self) {
        self.denoiser.release();
    }

    /// Tear down the adapter and hand the sink back to the caller.
    pub fn into_sink(mut self) -> S {
        self.denoiser.release();
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::frame_codec;
    use crate::traits::noise_filter::NoiseFilter;

    /// Inverts every sample, so tests can tell processed from raw frames.
    #[derive(Debug)]
    struct InvertingFilter {
        frame_size: usize,
    }

    impl NoiseFilter for InvertingFilter {
        fn frame_size(&self) -> usize {
            self.frame_size
        }

        fn process_frame(&mut self, frame: &mut [i16]) {
            for sample in frame.iter_mut() {
                *sample = sample.wrapping_neg();
            }
        }
    }

    struct InvertingFactory {
        frame_size: usize,
    }

    impl NoiseFilterFactory for InvertingFactory {
        type Filter = InvertingFilter;

        fn frame_size(&self) -> usize {
            self.frame_size
        }

        fn create(&self) -> Result<InvertingFilter, PipelineError> {
            Ok(InvertingFilter {
                frame_size: self.frame_size,
            })
        }
    }

    #[derive(Default, Debug)]
    struct VecSink {
        written: Vec<Vec<u8>>,
        short_by: usize,
        fail_writes: bool,
    }

    impl OutputEndpoint for VecSink {
        fn start_output(&mut self) -> Result<(), PipelineError> {
            Ok(())
        }

        fn write(&mut self, buf: &[u8]) -> Result<usize, PipelineError> {
            if self.fail_writes {
                return Err(PipelineError::DeviceUnavailable("sink gone".into()));
            }
            self.written.push(buf.to_vec());
            Ok(buf.len().saturating_sub(self.short_by))
        }

        fn stop_output(&mut self) {}
    }

    fn config_320() -> PipelineConfig {
        PipelineConfig {
            sample_rate: 16_000,
            channels: 1,
            bit_depth: 16,
            buffer_size: 640,
        }
    }

    #[test]
    fn forwards_denoised_frames() {
        let factory = InvertingFactory { frame_size: 320 };
        let mut adapter =
            InterceptAdapter::new(&config_320(), &factory, VecSink::default()).unwrap();

        let samples = vec![100i16; 320];
        adapter
            .on_samples_ready(&frame_codec::encode(&samples))
            .unwrap();

        let sink = adapter.into_sink();
        assert_eq!(sink.written.len(), 1);
        assert_eq!(
            frame_codec::decode(&sink.written[0]).unwrap(),
            vec![-100i16; 320]
        );
    }

    #[test]
    fn geometry_is_checked_at_construction() {
        let factory = InvertingFactory { frame_size: 480 };
        let err = InterceptAdapter::new(&config_320(), &factory, VecSink::default()).unwrap_err();
        assert_eq!(
            err,
            PipelineError::FrameSizeMismatch {
                expected: 480,
                actual: 320
            }
        );
    }

    #[test]
    fn odd_buffer_propagates_to_caller() {
        let factory = InvertingFactory { frame_size: 320 };
        let mut adapter =
            InterceptAdapter::new(&config_320(), &factory, VecSink::default()).unwrap();

        let err = adapter.on_samples_ready(&[0u8; 641]).unwrap_err();
        assert_eq!(err, PipelineError::MalformedBuffer { len: 641 });
    }

    #[test]
    fn wrong_frame_size_propagates_to_caller() {
        let factory = InvertingFactory { frame_size: 320 };
        let mut adapter =
            InterceptAdapter::new(&config_320(), &factory, VecSink::default()).unwrap();

        let err = adapter.on_samples_ready(&[0u8; 320]).unwrap_err();
        assert_eq!(
            err,
            PipelineError::FrameSizeMismatch {
                expected: 320,
                actual: 160
            }
        );
    }

    #[test]
    fn sink_short_writes_are_swallowed() {
        let factory = InvertingFactory { frame_size: 320 };
        let sink = VecSink {
            short_by: 4,
            ..VecSink::default()
        };
        let mut adapter = InterceptAdapter::new(&config_320(), &factory, sink).unwrap();

        adapter.on_samples_ready(&[0u8; 640]).unwrap();
        assert_eq!(adapter.diagnostics().short_writes, 1);
        assert_eq!(adapter.diagnostics().bytes_emitted, 636);
    }

    #[test]
    fn sink_write_errors_are_swallowed() {
        let factory = InvertingFactory { frame_size: 320 };
        let sink = VecSink {
            fail_writes: true,
            ..VecSink::default()
        };
        let mut adapter = InterceptAdapter::new(&config_320(), &factory, sink).unwrap();

        adapter.on_samples_ready(&[0u8; 640]).unwrap();
        assert_eq!(adapter.diagnostics().frames_denoised, 1);
        assert_eq!(adapter.diagnostics().bytes_emitted, 0);
    }

    #[test]
    fn release_makes_further_pushes_fail() {
        let factory = InvertingFactory { frame_size: 320 };
        let mut adapter =
            InterceptAdapter::new(&config_320(), &factory, VecSink::default()).unwrap();

        adapter.release();
        let err = adapter.on_samples_ready(&[0u8; 640]).unwrap_err();
        assert_eq!(err, PipelineError::UseAfterRelease);
    }
}
