//! Discography data source interface.
//!
//! The aggregator only talks to a [`DiscographySource`]; the Deezer-backed
//! implementation lives in [`crate::deezer`]. Records here are the raw shapes
//! a source reports, before filtering and date resolution.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// An artist resolved by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ArtistHandle {
    /// Source identifier.
    pub id: String,
    /// Name as reported by the source.
    pub name: String,
}

/// An album entity as listed for an artist.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AlbumSummary {
    /// Album identifier.
    pub id: String,
    /// Album title.
    pub title: String,
    /// Release date as reported (full date or year only).
    #[serde(default)]
    pub release_date: Option<String>,
}

/// One track of an album with its lyric text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TrackListing {
    /// Track identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Position on the album.
    #[serde(default)]
    pub track_number: Option<u32>,
    /// Song title.
    pub title: String,
    /// Raw lyric text, absent when the source has none.
    #[serde(default)]
    pub lyrics: Option<String>,
}

/// A song listed directly for an artist, with the album it reports.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SongListing {
    /// Song identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Song title.
    pub title: String,
    /// Name of the album the song appears on, if any.
    #[serde(default)]
    pub album_title: Option<String>,
    /// Release date reported for the song.
    #[serde(default)]
    pub release_date: Option<String>,
    /// Raw lyric text.
    #[serde(default)]
    pub lyrics: Option<String>,
}

/// Where albums, tracks and lyrics come from.
#[async_trait]
pub trait DiscographySource: Send + Sync {
    /// Resolve an artist by name.
    ///
    /// # Errors
    ///
    /// Returns `ArtistNotFound` if the source knows no such artist.
    async fn find_artist(&self, name: &str) -> Result<ArtistHandle>;

    /// List the artist's album entities in source order.
    async fn list_albums(&self, artist: &ArtistHandle) -> Result<Vec<AlbumSummary>>;

    /// List an album's tracks in track order, lyrics included.
    async fn list_tracks(&self, album_id: &str) -> Result<Vec<TrackListing>>;

    /// List the artist's songs, each reporting its album, lyrics included.
    async fn list_songs(&self, artist: &ArtistHandle) -> Result<Vec<SongListing>>;
}
