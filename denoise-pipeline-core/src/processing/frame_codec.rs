//! Transport-buffer ↔ sample conversion.
//!
//! Transport buffers are little-endian signed 16-bit PCM, the one bit-exact
//! contract shared with the host audio stack. Both directions are stateless
//! and allocate only the output buffer.

use crate::models::error::PipelineError;

/// Decode a transport buffer into samples.
///
/// Every consecutive byte pair is one little-endian `i16`. Fails with
/// `MalformedBuffer` if the input length is odd; a truncated sample is a
/// wiring bug, never silently dropped.
pub fn decode(bytes: &[u8]) -> Result<Vec<i16>, PipelineError> {
    if bytes.len() % 2 != 0 {
        return Err(PipelineError::MalformedBuffer { len: bytes.len() });
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

/// Encode samples into a transport buffer. Output length is always
/// `2 * samples.len()`.
pub fn encode(samples: &[i16]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}
