//! Voice catalog
//!
//! Built-in prebuilt voices plus cosmetic custom voices. Custom voices are
//! labels only; generation maps them to a built-in voice by gender.

mod catalog;

pub use catalog::{
    CUSTOM_VOICE_PREFIX, DEFAULT_VOICE, Gender, UNKNOWN_VOICE_LABEL, VoiceCatalog, VoiceOption,
    builtin_voices,
};
