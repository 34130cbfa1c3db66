pub mod denoiser;
pub mod frame_codec;
