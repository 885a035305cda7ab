//! Album and song models.
//!
//! Albums are built fresh on every run from the discography source (or its
//! cache) and only grow by accumulating songs during aggregation.

use serde::{Deserialize, Serialize};

use super::common::ReleaseDate;
use crate::lyrics::clean_lyrics;

/// A song inside an album.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Song {
    /// Source identifier, used to fetch lyrics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Song title.
    pub title: String,

    /// Track number on the album (1-indexed), if the source reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_number: Option<u32>,

    /// Raw lyric text as returned by the source.
    #[serde(default)]
    pub lyrics: Option<String>,
}

impl Song {
    /// Create a song with a title and raw lyrics.
    pub fn new<S: Into<String>>(title: S, lyrics: Option<String>) -> Self {
        Self {
            title: title.into(),
            lyrics,
            ..Default::default()
        }
    }

    /// Whether the song carries any non-blank lyric text.
    pub fn has_lyrics(&self) -> bool {
        self.lyrics
            .as_deref()
            .map(|l| !l.trim().is_empty())
            .unwrap_or(false)
    }

    /// Lyrics as printed on the poster, or `None` if nothing survives
    /// cleanup.
    pub fn cleaned_lyrics(&self) -> Option<String> {
        let cleaned = clean_lyrics(self.lyrics.as_deref()?);
        (!cleaned.is_empty()).then_some(cleaned)
    }
}

/// A full album record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Album {
    /// Stable identifier reported by the source (or the album name when the
    /// source only groups songs by name).
    pub id: String,

    /// Album title.
    pub title: String,

    /// Resolved release date, if the source reported a usable one.
    #[serde(default)]
    pub release_date: Option<ReleaseDate>,

    /// Songs in source track order.
    #[serde(default)]
    pub songs: Vec<Song>,
}

impl Album {
    /// Create an album without songs.
    pub fn new<S1: Into<String>, S2: Into<String>>(
        id: S1,
        title: S2,
        release_date: Option<ReleaseDate>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            release_date,
            songs: Vec::new(),
        }
    }

    /// Add songs to the album.
    pub fn with_songs(mut self, songs: Vec<Song>) -> Self {
        self.songs = songs;
        self
    }

    /// Whether the album may appear in the final document: it needs a
    /// resolved release date and at least one song whose cleaned lyrics
    /// are non-empty.
    pub fn is_publishable(&self) -> bool {
        self.release_date.is_some()
            && self.songs.iter().any(|song| song.cleaned_lyrics().is_some())
    }
}
