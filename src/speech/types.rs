//! Gemini `generateContent` wire types

use serde::{Deserialize, Serialize};

use crate::error::MissingAudio;

/// Request body for a speech render
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest<'a> {
    pub contents: Vec<Content<'a>>,
    pub generation_config: GenerationConfig<'a>,
}

impl<'a> GenerateRequest<'a> {
    /// Build an audio-only request for `text` spoken by the prebuilt `voice_name`
    #[must_use]
    pub fn speech(text: &'a str, voice_name: &'a str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![TextPart { text }],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["AUDIO"],
                speech_config: SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig { voice_name },
                    },
                },
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Content<'a> {
    pub parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
pub struct TextPart<'a> {
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig<'a> {
    pub response_modalities: Vec<&'a str>,
    pub speech_config: SpeechConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig<'a> {
    pub voice_config: VoiceConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig<'a> {
    pub prebuilt_voice_config: PrebuiltVoiceConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrebuiltVoiceConfig<'a> {
    pub voice_name: &'a str,
}

/// Response body; every level is optional on the wire
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default)]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
}

/// Outcome of looking for audio in a response
#[derive(Debug, PartialEq, Eq)]
pub enum AudioExtraction {
    /// Base64-encoded PCM payload
    Success(String),
    NoCandidate,
    NoContent,
    NoInlineData,
}

impl AudioExtraction {
    /// Collapse to the payload or the reason it is missing
    ///
    /// # Errors
    ///
    /// Returns the missing-audio reason for every non-success variant
    pub fn into_result(self) -> Result<String, MissingAudio> {
        match self {
            Self::Success(data) => Ok(data),
            Self::NoCandidate => Err(MissingAudio::NoCandidate),
            Self::NoContent => Err(MissingAudio::NoContent),
            Self::NoInlineData => Err(MissingAudio::NoInlineData),
        }
    }
}

impl GenerateResponse {
    /// Inspect the first candidate's first part for inline audio
    #[must_use]
    pub fn extract_audio(self) -> AudioExtraction {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return AudioExtraction::NoCandidate;
        };
        let Some(part) = candidate
            .content
            .and_then(|content| content.parts.into_iter().next())
        else {
            return AudioExtraction::NoContent;
        };

        match part.inline_data.and_then(|inline| inline.data) {
            Some(data) if !data.is_empty() => AudioExtraction::Success(data),
            _ => AudioExtraction::NoInlineData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GenerateResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_request_shape() {
        let request = GenerateRequest::speech("Hello world", "Kore");
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["contents"][0]["parts"][0]["text"], "Hello world");
        assert_eq!(value["generationConfig"]["responseModalities"][0], "AUDIO");
        assert_eq!(
            value["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]
                ["voiceName"],
            "Kore"
        );
    }

    #[test]
    fn test_extract_success() {
        let response = parse(
            r#"{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"audio/L16;rate=24000","data":"AAAA"}}]}}]}"#,
        );
        assert_eq!(
            response.extract_audio(),
            AudioExtraction::Success("AAAA".to_string())
        );
    }

    #[test]
    fn test_extract_missing_levels() {
        assert_eq!(parse("{}").extract_audio(), AudioExtraction::NoCandidate);
        assert_eq!(
            parse(r#"{"candidates":[{}]}"#).extract_audio(),
            AudioExtraction::NoContent
        );
        assert_eq!(
            parse(r#"{"candidates":[{"content":{"parts":[]}}]}"#).extract_audio(),
            AudioExtraction::NoContent
        );
        assert_eq!(
            parse(r#"{"candidates":[{"content":{"parts":[{"text":"hi"}]}}]}"#).extract_audio(),
            AudioExtraction::NoInlineData
        );
    }

    #[test]
    fn test_only_first_part_is_considered() {
        let response = parse(
            r#"{"candidates":[{"content":{"parts":[{"text":"x"},{"inlineData":{"data":"AAAA"}}]}}]}"#,
        );
        assert_eq!(response.extract_audio(), AudioExtraction::NoInlineData);
    }
}
