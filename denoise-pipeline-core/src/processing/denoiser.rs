//! Noise-filter lifecycle wrapper.
//!
//! The underlying filter is an opaque, stateful resource with an explicit
//! init/process/release lifecycle: acquired during pipeline start, owned by
//! exactly one execution context while running, released on every exit
//! path. `Denoiser` enforces that lifecycle and the frame geometry so filter
//! implementations never see a wrong-sized or post-release frame.

use crate::models::error::PipelineError;
use crate::traits::noise_filter::{NoiseFilter, NoiseFilterFactory};

/// A set of per-channel filter lanes behind one handle.
///
/// Interleaved multi-channel frames are split so each channel runs through
/// its own independent filter lane, the same per-channel treatment the
/// capture path applies to denoise/AGC stages. Mono frames are processed in
/// place without the split.
#[derive(Debug)]
pub struct Denoiser<F: NoiseFilter> {
    lanes: Vec<F>,
    frame_size: usize,
    channels: usize,
    // Per-channel scratch, allocated once; empty for mono.
    split: Vec<Vec<i16>>,
    released: bool,
}

impl<F: NoiseFilter> Denoiser<F> {
    /// Allocate one filter lane per channel.
    ///
    /// Must be called exactly once per handle, before any `process` call.
    /// Fails with `InitFailure` if any lane cannot be allocated.
    pub fn init<Fac>(factory: &Fac, channels: usize) -> Result<Self, PipelineError>
    where
        Fac: NoiseFilterFactory<Filter = F>,
    {
        let frame_size = factory.frame_size();
        if frame_size == 0 {
            return Err(PipelineError::InitFailure(
                "filter factory declares a zero frame size".into(),
            ));
        }

        let mut lanes = Vec::with_capacity(channels);
        for _ in 0..channels {
            lanes.push(factory.create()?);
        }

        let split = if channels > 1 {
            (0..channels).map(|_| vec![0i16; frame_size]).collect()
        } else {
            Vec::new()
        };

        Ok(Self {
            lanes,
            frame_size,
            channels,
            split,
            released: false,
        })
    }

    /// Samples per channel in one frame.
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Total interleaved samples in one frame (`frame_size × channels`).
    pub fn frame_samples(&self) -> usize {
        self.frame_size * self.channels
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Apply noise suppression to one interleaved frame, in place.
    ///
    /// The frame length must equal `frame_samples()`, else the call fails
    /// with `FrameSizeMismatch` and no filter state is advanced. Exactly one
    /// lane step per channel happens per successful call, so feeding frames
    /// in capture order keeps every lane's adaptive state coherent.
    pub fn process(&mut self, frame: &mut [i16]) -> Result<(), PipelineError> {
        if self.released {
            return Err(PipelineError::UseAfterRelease);
        }
        if frame.len() != self.frame_samples() {
            return Err(PipelineError::FrameSizeMismatch {
                expected: self.frame_samples(),
                actual: frame.len(),
            });
        }

        if self.channels == 1 {
            self.lanes[0].process_frame(frame);
            return Ok(());
        }

        // Split interleaved → per-channel
        for i in 0..self.frame_size {
            for ch in 0..self.channels {
                self.split[ch][i] = frame[i * self.channels + ch];
            }
        }

        for ch in 0..self.channels {
            self.lanes[ch].process_frame(&mut self.split[ch]);
        }

        // Merge per-channel → interleaved
        for i in 0..self.frame_size {
            for ch in 0..self.channels {
                frame[i * self.channels + ch] = self.split[ch][i];
            }
        }

        Ok(())
    }

    /// Free all filter lanes. Idempotent; further `process` calls fail with
    /// `UseAfterRelease`.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.lanes.clear();
        self.split.clear();
        self.released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Stateful test filter: adds a running total to every sample, so the
    /// output of a frame depends on every frame processed before it.
    #[derive(Debug)]
    struct AccumulatingFilter {
        frame_size: usize,
        total: i64,
    }

    impl NoiseFilter for AccumulatingFilter {
        fn frame_size(&self) -> usize {
            self.frame_size
        }

        fn process_frame(&mut self, frame: &mut [i16]) {
            for sample in frame.iter_mut() {
                self.total += i64::from(*sample);
                *sample = sample.wrapping_add((self.total % 7) as i16);
            }
        }
    }

    struct AccumulatingFactory {
        frame_size: usize,
        fail: bool,
    }

    impl NoiseFilterFactory for AccumulatingFactory {
        type Filter = AccumulatingFilter;

        fn frame_size(&self) -> usize {
            self.frame_size
        }

        fn create(&self) -> Result<AccumulatingFilter, PipelineError> {
            if self.fail {
                return Err(PipelineError::InitFailure("test factory refused".into()));
            }
            Ok(AccumulatingFilter {
                frame_size: self.frame_size,
                total: 0,
            })
        }
    }

    fn factory(frame_size: usize) -> AccumulatingFactory {
        AccumulatingFactory {
            frame_size,
            fail: false,
        }
    }

    fn run_sequence(denoiser: &mut Denoiser<AccumulatingFilter>, frames: &[Vec<i16>]) -> Vec<Vec<i16>> {
        frames
            .iter()
            .map(|frame| {
                let mut out = frame.clone();
                denoiser.process(&mut out).unwrap();
                out
            })
            .collect()
    }

    #[test]
    fn init_failure_propagates() {
        let factory = AccumulatingFactory {
            frame_size: 4,
            fail: true,
        };
        let err = Denoiser::init(&factory, 1).unwrap_err();
        assert!(matches!(err, PipelineError::InitFailure(_)));
    }

    #[test]
    fn wrong_length_fails_without_advancing_state() {
        let mut denoiser = Denoiser::init(&factory(4), 1).unwrap();
        let f1 = vec![10i16, 20, 30, 40];
        let f2 = vec![5i16, 5, 5, 5];

        // Reference run: f1 then f2, no bad call in between.
        let mut reference = Denoiser::init(&factory(4), 1).unwrap();
        let expected = run_sequence(&mut reference, &[f1.clone(), f2.clone()]);

        let mut out1 = f1.clone();
        denoiser.process(&mut out1).unwrap();

        let mut bad = vec![0i16; 3];
        assert_eq!(
            denoiser.process(&mut bad).unwrap_err(),
            PipelineError::FrameSizeMismatch {
                expected: 4,
                actual: 3
            }
        );

        // The bad call left the lane untouched: f2 behaves as if it never
        // happened.
        let mut out2 = f2.clone();
        denoiser.process(&mut out2).unwrap();
        assert_eq!(vec![out1, out2], expected);
    }

    #[test]
    fn output_depends_on_frame_order() {
        let f1 = vec![100i16, 0, 0, 0];
        let f2 = vec![0i16, 50, 0, 0];
        let f3 = vec![0i16, 0, 25, 0];

        let mut a = Denoiser::init(&factory(4), 1).unwrap();
        let run_a = run_sequence(&mut a, &[f1.clone(), f2.clone(), f3.clone()]);

        // Same frames, fresh state: identical outputs.
        let mut b = Denoiser::init(&factory(4), 1).unwrap();
        let run_b = run_sequence(&mut b, &[f1.clone(), f2.clone(), f3.clone()]);
        assert_eq!(run_a, run_b);

        // Reordered frames advance the state differently.
        let mut c = Denoiser::init(&factory(4), 1).unwrap();
        let run_c = run_sequence(&mut c, &[f2, f1, f3]);
        assert_ne!(run_a, run_c);
    }

    #[test]
    fn stereo_lanes_are_independent() {
        // Interleaved stereo: left = 100s, right = zeros. With one lane per
        // channel the zero lane must stay silent regardless of the left
        // channel's running state.
        let mut denoiser = Denoiser::init(&factory(2), 2).unwrap();
        let mut frame = vec![100i16, 0, 100, 0];
        denoiser.process(&mut frame).unwrap();

        let mut mono_reference = Denoiser::init(&factory(2), 1).unwrap();
        let mut left = vec![100i16, 100];
        mono_reference.process(&mut left).unwrap();

        assert_eq!(frame[0], left[0]);
        assert_eq!(frame[2], left[1]);
        assert_eq!(frame[1], 0);
        assert_eq!(frame[3], 0);
    }

    #[test]
    fn process_after_release_fails() {
        let mut denoiser = Denoiser::init(&factory(4), 1).unwrap();
        denoiser.release();
        denoiser.release(); // idempotent

        let mut frame = vec![0i16; 4];
        assert_eq!(
            denoiser.process(&mut frame).unwrap_err(),
            PipelineError::UseAfterRelease
        );
        assert!(denoiser.is_released());
    }

    #[test]
    fn geometry_accessors() {
        let denoiser = Denoiser::init(&factory(480), 2).unwrap();
        assert_eq!(denoiser.frame_size(), 480);
        assert_eq!(denoiser.frame_samples(), 960);
    }
}
