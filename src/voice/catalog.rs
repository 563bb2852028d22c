//! Built-in and custom voice catalog

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Prefix for generated custom voice ids, keeping them apart from built-in ids
pub const CUSTOM_VOICE_PREFIX: &str = "custom-";

/// Label shown when a clip references a voice that no longer exists
pub const UNKNOWN_VOICE_LABEL: &str = "Unknown Voice";

/// Voice sent upstream when nothing else resolves
pub const DEFAULT_VOICE: &str = "Kore";

/// Voice gender, used to map custom voices to a built-in one
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Built-in voice used upstream for custom voices of this gender
    #[must_use]
    pub const fn fallback_voice(self) -> &'static str {
        match self {
            Self::Female => "Kore",
            Self::Male => "Puck",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Male => f.write_str("Male"),
            Self::Female => f.write_str("Female"),
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Self::Male),
            "female" | "f" => Ok(Self::Female),
            other => Err(Error::Config(format!("unknown gender: {other}"))),
        }
    }
}

/// A selectable voice
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceOption {
    pub id: String,
    pub name: String,
    pub gender: Gender,
    pub description: String,
    pub is_custom: bool,
}

impl VoiceOption {
    fn builtin(name: &str, gender: Gender, description: &str) -> Self {
        Self {
            id: name.to_string(),
            name: name.to_string(),
            gender,
            description: description.to_string(),
            is_custom: false,
        }
    }

    /// Voice name to send to the speech API
    ///
    /// Custom voices carry no acoustic model and map to a built-in voice by gender.
    #[must_use]
    pub fn upstream_name(&self) -> &str {
        if self.is_custom {
            self.gender.fallback_voice()
        } else {
            &self.name
        }
    }
}

/// The five prebuilt voices offered by the speech API
#[must_use]
pub fn builtin_voices() -> Vec<VoiceOption> {
    vec![
        VoiceOption::builtin("Kore", Gender::Female, "Warm and soothing"),
        VoiceOption::builtin("Puck", Gender::Male, "Energetic and clear"),
        VoiceOption::builtin("Charon", Gender::Male, "Deep and authoritative"),
        VoiceOption::builtin("Fenrir", Gender::Male, "Rough and intense"),
        VoiceOption::builtin("Zephyr", Gender::Female, "Soft and gentle"),
    ]
}

/// Built-in voices followed by custom voices in creation order
#[derive(Clone, Debug)]
pub struct VoiceCatalog {
    voices: Vec<VoiceOption>,
}

impl Default for VoiceCatalog {
    fn default() -> Self {
        Self {
            voices: builtin_voices(),
        }
    }
}

impl VoiceCatalog {
    /// Create a catalog holding only the built-in voices
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All voices, built-in first
    #[must_use]
    pub fn voices(&self) -> &[VoiceOption] {
        &self.voices
    }

    /// Look up a voice by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&VoiceOption> {
        self.voices.iter().find(|v| v.id == id)
    }

    /// Find a voice by id, or by name ignoring case
    #[must_use]
    pub fn find(&self, id_or_name: &str) -> Option<&VoiceOption> {
        self.get(id_or_name).or_else(|| {
            self.voices
                .iter()
                .find(|v| v.name.eq_ignore_ascii_case(id_or_name))
        })
    }

    /// Display label for a voice id, falling back to "Unknown Voice"
    #[must_use]
    pub fn label(&self, id: &str) -> &str {
        self.get(id).map_or(UNKNOWN_VOICE_LABEL, |v| v.name.as_str())
    }

    /// Voice name to send upstream for a voice id
    #[must_use]
    pub fn upstream_name(&self, id: &str) -> &str {
        self.get(id).map_or(DEFAULT_VOICE, VoiceOption::upstream_name)
    }

    /// Register a cosmetic custom ("cloned") voice
    ///
    /// # Errors
    ///
    /// Returns error if the name is empty
    pub fn add_custom(&mut self, name: &str, gender: Gender) -> Result<&VoiceOption> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Config("voice name must not be empty".to_string()));
        }

        let voice = VoiceOption {
            id: format!("{CUSTOM_VOICE_PREFIX}{}", uuid::Uuid::new_v4()),
            name: name.to_string(),
            gender,
            description: "Custom cloned voice".to_string(),
            is_custom: true,
        };

        tracing::debug!(id = %voice.id, name = %voice.name, %gender, "custom voice created");

        self.voices.push(voice);
        Ok(&self.voices[self.voices.len() - 1])
    }

    /// Remove a custom voice; built-in voices cannot be removed
    ///
    /// # Errors
    ///
    /// Returns error if the id is unknown or names a built-in voice
    pub fn remove_custom(&mut self, id: &str) -> Result<VoiceOption> {
        let index = self
            .voices
            .iter()
            .position(|v| v.id == id && v.is_custom)
            .ok_or_else(|| Error::NotFound(format!("custom voice {id}")))?;
        Ok(self.voices.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = VoiceCatalog::new();
        let ids: Vec<&str> = catalog.voices().iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["Kore", "Puck", "Charon", "Fenrir", "Zephyr"]);
        assert!(catalog.voices().iter().all(|v| !v.is_custom));
    }

    #[test]
    fn test_custom_voice_maps_by_gender() {
        let mut catalog = VoiceCatalog::new();
        let her = catalog.add_custom("Grandma", Gender::Female).unwrap().id.clone();
        let him = catalog.add_custom("Zephyr", Gender::Male).unwrap().id.clone();

        assert_eq!(catalog.upstream_name(&her), "Kore");
        assert_eq!(catalog.upstream_name(&him), "Puck");
        assert_eq!(catalog.label(&him), "Zephyr");
    }

    #[test]
    fn test_builtin_voice_sent_by_name() {
        let catalog = VoiceCatalog::new();
        assert_eq!(catalog.upstream_name("Charon"), "Charon");
        assert_eq!(catalog.upstream_name("missing"), DEFAULT_VOICE);
    }

    #[test]
    fn test_custom_ids_do_not_shadow_builtins() {
        let mut catalog = VoiceCatalog::new();
        let voice = catalog.add_custom("Kore", Gender::Female).unwrap();
        assert!(voice.id.starts_with(CUSTOM_VOICE_PREFIX));
        assert!(!catalog.get("Kore").unwrap().is_custom);
    }

    #[test]
    fn test_unknown_label_after_removal() {
        let mut catalog = VoiceCatalog::new();
        let id = catalog.add_custom("Temp", Gender::Male).unwrap().id.clone();
        catalog.remove_custom(&id).unwrap();
        assert_eq!(catalog.label(&id), UNKNOWN_VOICE_LABEL);
        assert!(catalog.remove_custom("Kore").is_err());
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut catalog = VoiceCatalog::new();
        assert!(catalog.add_custom("   ", Gender::Male).is_err());
    }

    #[test]
    fn test_find_by_name_case_insensitive() {
        let catalog = VoiceCatalog::new();
        assert_eq!(catalog.find("fenrir").unwrap().id, "Fenrir");
    }

    #[test]
    fn test_gender_parse() {
        assert_eq!("Female".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!("m".parse::<Gender>().unwrap(), Gender::Male);
        assert!("other".parse::<Gender>().is_err());
    }
}
