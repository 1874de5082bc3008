//! Recommendation collaborator.
//!
//! A free-text prompt ("rainy evening melodies") goes in, an ordered list of
//! title/artist pairs comes out. The core treats the result as optional
//! display data and never lets it influence playback state.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A suggested track, not necessarily present in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub title: String,
    pub artist: String,
}

impl Suggestion {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
        }
    }
}

/// Source of track suggestions (remote model, curated list, ...).
#[async_trait::async_trait]
pub trait RecommendationProvider: Send + Sync {
    /// Return suggestions for `prompt`, best first.
    async fn suggest(&self, prompt: &str) -> Result<Vec<Suggestion>>;
}
