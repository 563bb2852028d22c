//! PCM codec: base64 payload decoding and WAV wrapping

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::Result;

/// Sample rate of the PCM returned by the speech API
pub const SAMPLE_RATE: u32 = 24_000;

/// Channel count of the PCM returned by the speech API
pub const CHANNELS: u16 = 1;

/// Size of the canonical WAV header
pub const WAV_HEADER_LEN: usize = 44;

/// Bytes per 16-bit sample
const BYTES_PER_SAMPLE: u16 = 2;

/// Decode a standard base64 string into raw bytes
///
/// # Errors
///
/// Returns error if the input is not valid base64
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>> {
    Ok(STANDARD.decode(encoded)?)
}

/// Wrap 16-bit little-endian PCM bytes in a minimal WAV container
///
/// The samples are copied verbatim after the 44-byte header. An odd trailing
/// byte is passed through as-is.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn wrap_as_wav(samples: &[u8], sample_rate: u32, channels: u16) -> Vec<u8> {
    let data_len = samples.len() as u32;
    let block_align = channels * BYTES_PER_SAMPLE;
    let byte_rate = sample_rate * u32::from(block_align);

    let mut wav = Vec::with_capacity(WAV_HEADER_LEN + samples.len());
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    // PCM
    wav.extend_from_slice(&1u16.to_le_bytes());
    wav.extend_from_slice(&channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&(BYTES_PER_SAMPLE * 8).to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.extend_from_slice(samples);

    wav
}

/// Wrap speech API PCM using the fixed 24kHz mono format
#[must_use]
pub fn wrap_speech_pcm(samples: &[u8]) -> Vec<u8> {
    wrap_as_wav(samples, SAMPLE_RATE, CHANNELS)
}

/// Convert 16-bit little-endian PCM bytes to f32 samples in [-1.0, 1.0)
///
/// A trailing odd byte is ignored.
#[must_use]
pub fn pcm16_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32768.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ])
    }

    #[test]
    fn test_wav_layout() {
        let samples: Vec<u8> = (0..=255).collect();
        let wav = wrap_as_wav(&samples, SAMPLE_RATE, CHANNELS);

        assert_eq!(wav.len(), WAV_HEADER_LEN + samples.len());
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32_at(&wav, 4), 36 + 256);
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(u32_at(&wav, 16), 16);
        assert_eq!(u16_at(&wav, 20), 1);
        assert_eq!(u16_at(&wav, 22), 1);
        assert_eq!(u32_at(&wav, 24), 24_000);
        assert_eq!(u32_at(&wav, 28), 48_000);
        assert_eq!(u16_at(&wav, 32), 2);
        assert_eq!(u16_at(&wav, 34), 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32_at(&wav, 40), 256);
        assert_eq!(&wav[WAV_HEADER_LEN..], samples.as_slice());
    }

    #[test]
    fn test_wav_empty_payload() {
        let wav = wrap_speech_pcm(&[]);
        assert_eq!(wav.len(), WAV_HEADER_LEN);
        assert_eq!(u32_at(&wav, 4), 36);
        assert_eq!(u32_at(&wav, 40), 0);
    }

    #[test]
    fn test_wav_stereo_fields() {
        let wav = wrap_as_wav(&[0; 8], 44_100, 2);
        assert_eq!(u32_at(&wav, 28), 44_100 * 4);
        assert_eq!(u16_at(&wav, 32), 4);
    }

    #[test]
    fn test_wav_odd_length_passes_through() {
        let samples = [1u8, 2, 3];
        let wav = wrap_speech_pcm(&samples);
        assert_eq!(u32_at(&wav, 40), 3);
        assert_eq!(&wav[WAV_HEADER_LEN..], &samples);
    }

    #[test]
    fn test_decode_base64() {
        assert_eq!(decode_base64("SGVsbG8=").unwrap(), b"Hello");
        assert_eq!(decode_base64("").unwrap(), Vec::<u8>::new());
        assert!(decode_base64("not base64!").is_err());
    }

    #[test]
    fn test_decode_inverts_standard_encode() {
        // Lengths 0..=5 cover no padding, one `=` and two `=`
        for len in 0u8..=5 {
            for byte in 0..=u8::MAX {
                let bytes: Vec<u8> = (0..len)
                    .map(|i| byte.wrapping_add(i.wrapping_mul(37)))
                    .collect();
                let encoded = STANDARD.encode(&bytes);
                assert_eq!(decode_base64(&encoded).unwrap(), bytes, "input {encoded}");
            }
        }
    }

    #[test]
    fn test_pcm16_to_f32() {
        let bytes = [0x00, 0x00, 0x00, 0x40, 0x00, 0x80, 0x7f];
        let samples = pcm16_to_f32(&bytes);
        assert_eq!(samples, vec![0.0, 0.5, -1.0]);
    }
}
