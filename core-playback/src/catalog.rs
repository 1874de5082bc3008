//! # Track Catalog
//!
//! The immutable list of every track the app knows about, loaded once at
//! startup. Catalog order is the order used for sequential next/previous and
//! for the offline playable list.

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Track identifier. Identity of a [`Track`] is its id alone.
pub type TrackId = String;

/// An immutable catalog entry.
///
/// Serialized with camelCase keys, the same shape stored as the persisted
/// last-played record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    /// Cover art locator
    #[serde(default)]
    pub cover: String,
    /// Audio locator handed to the transport
    pub audio_url: String,
    /// Nominal length in seconds
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub popularity: u32,
    /// ISO date, e.g. `2026-02-01`
    #[serde(default)]
    pub release_date: String,
}

impl Track {
    /// Minimal track for tests and fixtures; descriptive fields are empty.
    pub fn new(
        id: impl Into<TrackId>,
        title: impl Into<String>,
        artist: impl Into<String>,
        audio_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            cover: String::new(),
            audio_url: audio_url.into(),
            duration: 0,
            category: String::new(),
            popularity: 0,
            release_date: String::new(),
        }
    }

    pub fn with_duration(mut self, seconds: u32) -> Self {
        self.duration = seconds;
        self
    }

    pub fn with_cover(mut self, cover: impl Into<String>) -> Self {
        self.cover = cover.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

/// One artist "folder": the artist's track count and the first cover seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistFolder {
    pub name: String,
    pub track_count: usize,
    pub cover: String,
}

/// Ordered, id-indexed track list.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tracks: Vec<Track>,
    index: HashMap<TrackId, usize>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids.
    pub fn new(tracks: Vec<Track>) -> Result<Self> {
        let mut index = HashMap::with_capacity(tracks.len());
        for (position, track) in tracks.iter().enumerate() {
            if index.insert(track.id.clone(), position).is_some() {
                return Err(PlaybackError::InvalidCatalog(format!(
                    "duplicate track id {}",
                    track.id
                )));
            }
        }

        Ok(Self { tracks, index })
    }

    /// Parse a JSON array of tracks.
    pub fn from_json(json: &str) -> Result<Self> {
        let tracks: Vec<Track> = serde_json::from_str(json)?;
        Self::new(tracks)
    }

    pub fn get(&self, id: &str) -> Option<&Track> {
        self.index.get(id).map(|&position| &self.tracks[position])
    }

    /// Catalog position of `id`.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.tracks.iter().map(|t| t.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Group tracks by artist, ordered by artist name ignoring case.
    pub fn artists(&self) -> Vec<ArtistFolder> {
        let mut folders: Vec<ArtistFolder> = Vec::new();
        let mut seen: HashMap<&str, usize> = HashMap::new();

        for track in &self.tracks {
            match seen.get(track.artist.as_str()) {
                Some(&slot) => folders[slot].track_count += 1,
                None => {
                    seen.insert(track.artist.as_str(), folders.len());
                    folders.push(ArtistFolder {
                        name: track.artist.clone(),
                        track_count: 1,
                        cover: track.cover.clone(),
                    });
                }
            }
        }

        folders.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });
        folders
    }
}
