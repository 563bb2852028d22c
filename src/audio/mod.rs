//! Audio encoding
//!
//! Turns the speech API's base64 PCM payload into playable WAV resources.

pub mod codec;
mod resource;

pub use codec::{
    CHANNELS, SAMPLE_RATE, WAV_HEADER_LEN, decode_base64, pcm16_to_f32, wrap_as_wav,
    wrap_speech_pcm,
};
pub use resource::AudioResource;
