//! Pull-model denoise pipeline.
//!
//! Owns one capture endpoint, one output endpoint, and one noise-filter
//! handle, and drives a continuous capture → decode → denoise → encode →
//! emit cycle on a dedicated named thread. The endpoints move into the
//! cycle thread for the whole `Running` window and come back through the
//! join handle, so all mutable audio state stays single-owner and lock-free;
//! only the observational state/diagnostics/error slots are shared.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use crate::models::config::PipelineConfig;
use crate::models::diagnostics::PipelineDiagnostics;
use crate::models::error::PipelineError;
use crate::models::state::PipelineState;
use crate::processing::denoiser::Denoiser;
use crate::traits::capture_endpoint::CaptureEndpoint;
use crate::traits::noise_filter::{NoiseFilter, NoiseFilterFactory};
use crate::traits::output_endpoint::OutputEndpoint;
use crate::traits::pipeline_delegate::PipelineDelegate;

use super::process_transport_buffer;

/// Continuous capture/denoise/playback pipeline.
///
/// Generic over the capture and output backends and the filter factory.
/// State machine: `Idle → Running → Stopping → Idle`; `start()` is valid
/// only from `Idle` and performs all-or-nothing resource acquisition,
/// `stop()` is cooperative — the in-flight blocking read completes before
/// the cycle observes the flag, so shutdown latency is bounded by one
/// buffer's capture duration.
pub struct AudioPipeline<C, O, Fac>
where
    C: CaptureEndpoint + 'static,
    O: OutputEndpoint + 'static,
    Fac: NoiseFilterFactory,
    Fac::Filter: 'static,
{
    config: PipelineConfig,
    factory: Fac,
    // Present while idle; moved into the cycle thread while running.
    endpoints: Option<(C, O)>,
    state: Arc<Mutex<PipelineState>>,
    running: Arc<AtomicBool>,
    diagnostics: Arc<Mutex<PipelineDiagnostics>>,
    last_error: Arc<Mutex<Option<PipelineError>>>,
    delegate: Option<Arc<dyn PipelineDelegate>>,
    cycle_handle: Option<thread::JoinHandle<(C, O)>>,
}

impl<C, O, Fac> AudioPipeline<C, O, Fac>
where
    C: CaptureEndpoint + 'static,
    O: OutputEndpoint + 'static,
    Fac: NoiseFilterFactory,
    Fac::Filter: 'static,
{
    pub fn new(config: PipelineConfig, capture: C, output: O, factory: Fac) -> Self {
        Self {
            config,
            factory,
            endpoints: Some((capture, output)),
            state: Arc::new(Mutex::new(PipelineState::Idle)),
            running: Arc::new(AtomicBool::new(false)),
            diagnostics: Arc::new(Mutex::new(PipelineDiagnostics::default())),
            last_error: Arc::new(Mutex::new(None)),
            delegate: None,
            cycle_handle: None,
        }
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn PipelineDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn state(&self) -> PipelineState {
        *self.state.lock()
    }

    pub fn diagnostics(&self) -> PipelineDiagnostics {
        self.diagnostics.lock().clone()
    }

    /// The error that aborted the most recent cycle, if any. Cleared by the
    /// next successful `start()`.
    pub fn last_error(&self) -> Option<PipelineError> {
        self.last_error.lock().clone()
    }

    /// Start the pipeline. Valid only from `Idle`.
    ///
    /// Validates the configuration against the filter's frame geometry
    /// before any endpoint I/O, then acquires capture, output, and filter
    /// all-or-nothing: whatever was opened before a failing step is stopped
    /// again before the error returns, and the state stays `Idle`.
    pub fn start(&mut self) -> Result<(), PipelineError> {
        self.reap_finished_cycle();

        if !self.state().is_idle() {
            return Err(PipelineError::AlreadyRunning);
        }

        self.config
            .validate()
            .map_err(PipelineError::InvalidConfig)?;

        let expected = self.factory.frame_size();
        let actual = self.config.samples_per_channel();
        if expected != actual {
            return Err(PipelineError::FrameSizeMismatch { expected, actual });
        }

        let (mut capture, mut output) = self.endpoints.take().ok_or_else(|| {
            PipelineError::DeviceUnavailable("endpoints were lost by a previous cycle".into())
        })?;

        if let Err(e) = capture.start_capture() {
            self.endpoints = Some((capture, output));
            return Err(e);
        }
        if let Err(e) = output.start_output() {
            capture.stop_capture();
            self.endpoints = Some((capture, output));
            return Err(e);
        }

        let denoiser = match Denoiser::init(&self.factory, self.config.channels as usize) {
            Ok(d) => d,
            Err(e) => {
                capture.stop_capture();
                output.stop_output();
                self.endpoints = Some((capture, output));
                return Err(e);
            }
        };

        *self.last_error.lock() = None;
        *self.diagnostics.lock() = PipelineDiagnostics::default();
        self.running.store(true, Ordering::SeqCst);
        self.set_state(PipelineState::Running);

        let buffer_size = self.config.buffer_size;
        let running = Arc::clone(&self.running);
        let state = Arc::clone(&self.state);
        let diagnostics = Arc::clone(&self.diagnostics);
        let last_error = Arc::clone(&self.last_error);
        let delegate = self.delegate.clone();

        let spawned = thread::Builder::new().name("denoise-cycle".into()).spawn(move || {
            run_cycle(
                capture,
                output,
                denoiser,
                buffer_size,
                running,
                state,
                diagnostics,
                last_error,
                delegate,
            )
        });

        match spawned {
            Ok(handle) => {
                self.cycle_handle = Some(handle);
                log::info!(
                    "pipeline started: rate={}Hz, ch={}, buffer={}B ({} samples/ch)",
                    self.config.sample_rate,
                    self.config.channels,
                    self.config.buffer_size,
                    self.config.samples_per_channel(),
                );
                Ok(())
            }
            Err(e) => {
                // The endpoints and the denoiser moved into the closure that
                // never ran; they are gone. Report the spawn failure.
                self.running.store(false, Ordering::SeqCst);
                self.set_state(PipelineState::Idle);
                Err(PipelineError::InitFailure(format!(
                    "failed to spawn cycle thread: {e}"
                )))
            }
        }
    }

    /// Stop the pipeline and wait for the cycle to drain.
    ///
    /// No-op when no cycle is live. Does not interrupt an in-progress
    /// blocking read; a capture endpoint that never returns leaves this
    /// call pending, which is the documented limitation of cooperative
    /// shutdown.
    pub fn stop(&mut self) {
        self.reap_finished_cycle();

        let Some(handle) = self.cycle_handle.take() else {
            return;
        };

        self.set_state(PipelineState::Stopping);
        self.running.store(false, Ordering::SeqCst);

        match handle.join() {
            Ok(endpoints) => self.endpoints = Some(endpoints),
            Err(_) => log::error!("cycle thread panicked; endpoints lost"),
        }

        self.set_state(PipelineState::Idle);
        log::info!("pipeline stopped");
    }

    fn set_state(&self, new_state: PipelineState) {
        *self.state.lock() = new_state;
        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(&new_state);
        }
    }

    /// Join a cycle thread that exited on its own (fatal error) and take
    /// the endpoints back so the pipeline can be restarted.
    fn reap_finished_cycle(&mut self) {
        let finished = self
            .cycle_handle
            .as_ref()
            .is_some_and(|handle| handle.is_finished());
        if !finished {
            return;
        }
        if let Some(handle) = self.cycle_handle.take() {
            match handle.join() {
                Ok(endpoints) => self.endpoints = Some(endpoints),
                Err(_) => log::error!("cycle thread panicked; endpoints lost"),
            }
        }
    }
}

impl<C, O, Fac> Drop for AudioPipeline<C, O, Fac>
where
    C: CaptureEndpoint + 'static,
    O: OutputEndpoint + 'static,
    Fac: NoiseFilterFactory,
    Fac::Filter: 'static,
{
    fn drop(&mut self) {
        self.stop();
    }
}

/// The cycle body. Runs on the dedicated thread until the run flag clears
/// or a fatal geometry violation aborts it. Every exit path quiesces both
/// endpoints and releases the filter before handing the endpoints back.
fn run_cycle<C, O, F>(
    mut capture: C,
    mut output: O,
    mut denoiser: Denoiser<F>,
    buffer_size: usize,
    running: Arc<AtomicBool>,
    state: Arc<Mutex<PipelineState>>,
    diagnostics: Arc<Mutex<PipelineDiagnostics>>,
    last_error: Arc<Mutex<Option<PipelineError>>>,
    delegate: Option<Arc<dyn PipelineDelegate>>,
) -> (C, O)
where
    C: CaptureEndpoint,
    O: OutputEndpoint,
    F: NoiseFilter,
{
    let mut transport = vec![0u8; buffer_size];
    let mut fatal: Option<PipelineError> = None;

    while running.load(Ordering::SeqCst) {
        // The blocking read is the cycle's only suspension point.
        let read = match capture.read_into(&mut transport) {
            Ok(n) => n,
            Err(e) => {
                log::warn!("capture read failed: {e}, skipping buffer");
                diagnostics.lock().skipped_reads += 1;
                continue;
            }
        };
        if read == 0 {
            diagnostics.lock().skipped_reads += 1;
            continue;
        }
        diagnostics.lock().frames_captured += 1;

        let encoded = match process_transport_buffer(&mut denoiser, &transport[..read]) {
            Ok(bytes) => bytes,
            Err(e) => {
                // A geometry violation mid-cycle will not self-correct;
                // it should have been impossible past start() validation.
                fatal = Some(match e {
                    PipelineError::MalformedBuffer { len } => PipelineError::ConfigMismatch(
                        format!("capture produced an undecodable {len}-byte buffer"),
                    ),
                    PipelineError::FrameSizeMismatch { expected, actual } => {
                        PipelineError::ConfigMismatch(format!(
                            "capture buffer decoded to {actual} samples, filter expects {expected}"
                        ))
                    }
                    other => other,
                });
                break;
            }
        };
        diagnostics.lock().frames_denoised += 1;

        // Best-effort emit: a short write or write error drops at most this
        // frame and never stops the cycle.
        match output.write(&encoded) {
            Ok(written) => {
                let mut diag = diagnostics.lock();
                diag.bytes_emitted += written as u64;
                if written < encoded.len() {
                    diag.short_writes += 1;
                    log::debug!("short write: {written}/{} bytes", encoded.len());
                }
            }
            Err(e) => {
                log::warn!("output write failed: {e}");
            }
        }
    }

    capture.stop_capture();
    output.stop_output();
    denoiser.release();

    if let Some(err) = fatal {
        log::error!("pipeline cycle aborted: {err}");
        *last_error.lock() = Some(err.clone());
        running.store(false, Ordering::SeqCst);
        *state.lock() = PipelineState::Idle;
        if let Some(ref delegate) = delegate {
            delegate.on_error(&err);
            delegate.on_state_changed(&PipelineState::Idle);
        }
    }

    (capture, output)
}
