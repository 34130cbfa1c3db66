//! # denoise-pipeline-core
//!
//! Platform-agnostic noise-suppression pipeline core.
//!
//! Captures microphone audio through a pluggable endpoint, runs it through
//! a pluggable noise filter, and emits the cleaned audio for playback
//! and/or onward transport. Device backends implement the
//! `CaptureEndpoint`/`OutputEndpoint` traits; filter backends (e.g. the
//! RNNoise crate in this workspace) implement `NoiseFilter`.
//!
//! ## Architecture
//!
//! ```text
//! denoise-pipeline-core (this crate)
//! ├── traits/       ← CaptureEndpoint, OutputEndpoint, NoiseFilter, PipelineDelegate
//! ├── models/       ← PipelineError, PipelineState, PipelineConfig, PipelineDiagnostics
//! ├── processing/   ← frame codec (LE 16-bit PCM ↔ samples), Denoiser lifecycle
//! └── pipeline/     ← AudioPipeline (pull loop), InterceptAdapter (push callback)
//! ```
//!
//! ## Data flow
//!
//! ```text
//! [CaptureEndpoint] → decode → [Denoiser] → encode → [OutputEndpoint]
//! ```
//!
//! `AudioPipeline` drives that cycle on a dedicated thread with a blocking
//! capture read as its only suspension point; `InterceptAdapter` runs the
//! same per-frame step synchronously when an external source pushes
//! buffers in.

pub mod models;
pub mod pipeline;
pub mod processing;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::config::PipelineConfig;
pub use models::diagnostics::PipelineDiagnostics;
pub use models::error::PipelineError;
pub use models::state::PipelineState;
pub use pipeline::audio_pipeline::AudioPipeline;
pub use pipeline::intercept::InterceptAdapter;
pub use processing::denoiser::Denoiser;
pub use processing::frame_codec;
pub use traits::capture_endpoint::CaptureEndpoint;
pub use traits::noise_filter::{NoiseFilter, NoiseFilterFactory};
pub use traits::output_endpoint::OutputEndpoint;
pub use traits::pipeline_delegate::PipelineDelegate;
