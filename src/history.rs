//! Generation history
//!
//! Clips in the order they were generated, plus the one clip that is
//! currently selected for playback. Nothing here survives the session.

use chrono::{DateTime, Utc};

use crate::audio::AudioResource;
use crate::{Error, Result};

/// One generated take
#[derive(Clone, Debug)]
pub struct AudioClip {
    /// Unique clip id
    pub id: String,
    /// Source script
    pub text: String,
    /// Voice the user selected (may be a custom voice)
    pub voice_id: String,
    /// Playable WAV resource
    pub resource: AudioResource,
    pub created_at: DateTime<Utc>,
}

impl AudioClip {
    /// Create a clip with a fresh id, stamped now
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        voice_id: impl Into<String>,
        resource: AudioResource,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            voice_id: voice_id.into(),
            resource,
            created_at: Utc::now(),
        }
    }

    /// Playback length
    #[must_use]
    pub fn duration(&self) -> std::time::Duration {
        self.resource.duration()
    }
}

/// A clip removed from history
#[derive(Debug)]
pub struct Removal {
    pub clip: AudioClip,
    /// The clip was the current one; current is now empty
    pub was_current: bool,
}

/// What the player should do after a clip was picked
#[derive(Debug)]
pub enum Selection {
    /// The clip was already current and playing
    Pause,
    /// Start this resource from the beginning
    Play(AudioResource),
}

/// Ordered, session-scoped clip list
#[derive(Debug, Default)]
pub struct HistoryStore {
    clips: Vec<AudioClip>,
    current: Option<String>,
}

impl HistoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clip at the end; it becomes current
    pub fn append(&mut self, clip: AudioClip) -> &AudioClip {
        tracing::debug!(id = %clip.id, voice = %clip.voice_id, "clip added to history");
        self.current = Some(clip.id.clone());
        self.clips.push(clip);
        &self.clips[self.clips.len() - 1]
    }

    /// Remove a clip by id
    pub fn remove(&mut self, id: &str) -> Option<Removal> {
        let index = self.clips.iter().position(|c| c.id == id)?;
        let clip = self.clips.remove(index);

        let was_current = self.current.as_deref() == Some(id);
        if was_current {
            self.current = None;
        }

        tracing::debug!(id, was_current, "clip removed from history");
        Some(Removal { clip, was_current })
    }

    /// Toggle playback of a clip
    ///
    /// # Errors
    ///
    /// Returns error if no clip has this id
    pub fn select_for_playback(&mut self, id: &str, is_playing: bool) -> Result<Selection> {
        let clip = self
            .get(id)
            .ok_or_else(|| Error::NotFound(format!("clip {id}")))?;

        if is_playing && self.current.as_deref() == Some(id) {
            return Ok(Selection::Pause);
        }

        let resource = clip.resource.clone();
        self.current = Some(id.to_string());
        Ok(Selection::Play(resource))
    }

    /// The current clip, if any
    #[must_use]
    pub fn current(&self) -> Option<&AudioClip> {
        let id = self.current.as_deref()?;
        self.get(id)
    }

    #[must_use]
    pub fn current_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&AudioClip> {
        self.clips.iter().find(|c| c.id == id)
    }

    /// Resolve `#n` as the 1-based position `n`, anything else as a full id
    /// or a unique id prefix
    #[must_use]
    pub fn resolve(&self, reference: &str) -> Option<&AudioClip> {
        let reference = reference.trim();
        if let Some(position) = reference.strip_prefix('#') {
            let index = position.parse::<usize>().ok()?.checked_sub(1)?;
            return self.clips.get(index);
        }
        if let Some(clip) = self.get(reference) {
            return Some(clip);
        }

        let mut matches = self.clips.iter().filter(|c| c.id.starts_with(reference));
        match (matches.next(), matches.next()) {
            (Some(clip), None) if !reference.is_empty() => Some(clip),
            _ => None,
        }
    }

    /// Clips in chronological order
    #[must_use]
    pub fn clips(&self) -> &[AudioClip] {
        &self.clips
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(text: &str) -> AudioClip {
        AudioClip::new(text, "Kore", AudioResource::from_pcm(&[0, 0, 0, 0]))
    }

    fn ids(store: &HistoryStore) -> Vec<&str> {
        store.clips().iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_append_keeps_order_and_sets_current() {
        let mut store = HistoryStore::new();
        let c1 = clip("one");
        let c2 = clip("two");
        let (id1, id2) = (c1.id.clone(), c2.id.clone());

        store.append(c1);
        assert_eq!(store.current_id(), Some(id1.as_str()));
        store.append(c2);

        assert_eq!(ids(&store), [id1.as_str(), id2.as_str()]);
        assert_eq!(store.current().unwrap().text, "two");
    }

    #[test]
    fn test_remove_current_clears_it() {
        let mut store = HistoryStore::new();
        let c1 = clip("one");
        let c2 = clip("two");
        let (id1, id2) = (c1.id.clone(), c2.id.clone());
        store.append(c1);
        store.append(c2);

        store.select_for_playback(&id1, false).unwrap();
        let removal = store.remove(&id1).unwrap();

        assert!(removal.was_current);
        assert_eq!(removal.clip.text, "one");
        assert_eq!(ids(&store), [id2.as_str()]);
        assert!(store.current().is_none());
    }

    #[test]
    fn test_remove_other_keeps_current() {
        let mut store = HistoryStore::new();
        let c1 = clip("one");
        let id1 = c1.id.clone();
        store.append(c1);
        let id2 = store.append(clip("two")).id.clone();

        let removal = store.remove(&id1).unwrap();
        assert!(!removal.was_current);
        assert_eq!(store.current_id(), Some(id2.as_str()));
        assert!(store.remove("missing").is_none());
    }

    #[test]
    fn test_select_toggles() {
        let mut store = HistoryStore::new();
        let id1 = store.append(clip("one")).id.clone();
        let id2 = store.append(clip("two")).id.clone();

        // Current and playing: pause
        assert!(matches!(
            store.select_for_playback(&id2, true).unwrap(),
            Selection::Pause
        ));
        // Current but paused: play again
        assert!(matches!(
            store.select_for_playback(&id2, false).unwrap(),
            Selection::Play(_)
        ));
        // Different clip while playing: switch
        assert!(matches!(
            store.select_for_playback(&id1, true).unwrap(),
            Selection::Play(_)
        ));
        assert_eq!(store.current_id(), Some(id1.as_str()));

        assert!(store.select_for_playback("missing", false).is_err());
    }

    #[test]
    fn test_resolve() {
        let mut store = HistoryStore::new();
        let id1 = store.append(clip("one")).id.clone();
        let id2 = store.append(clip("two")).id.clone();

        assert_eq!(store.resolve("#1").unwrap().id, id1);
        assert_eq!(store.resolve(" #2 ").unwrap().id, id2);
        assert!(store.resolve("#0").is_none());
        assert!(store.resolve("#3").is_none());
        assert!(store.resolve("#x").is_none());
        assert_eq!(store.resolve(&id2).unwrap().id, id2);
        assert_eq!(store.resolve(&id1[..8]).unwrap().id, id1);
        assert!(store.resolve("").is_none());
    }

    #[test]
    fn test_resolve_numeric_id_prefix() {
        let mut store = HistoryStore::new();
        let first = store.append(clip("one")).id.clone();
        let mut numeric = clip("two");
        numeric.id = "12345678-0000-4000-8000-000000000000".to_string();
        store.append(numeric);

        assert_eq!(store.resolve("12345678").unwrap().text, "two");
        assert_eq!(store.resolve("#1").unwrap().id, first);
        assert_eq!(store.resolve("#2").unwrap().text, "two");
    }
}
