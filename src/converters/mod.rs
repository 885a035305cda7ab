//! JSON to record converters.
//!
//! This module turns raw Deezer API JSON responses into the source records
//! the aggregator works with.

use serde_json::Value;

use crate::error::{PosterError, Result};
use crate::source::{AlbumSummary, ArtistHandle, SongListing, TrackListing};

/// Get string from JSON, returning empty string if not found.
fn get_str(json: &Value, key: &str) -> String {
    json.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

/// Get optional non-empty string from JSON.
fn get_opt_str(json: &Value, key: &str) -> Option<String> {
    json.get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Get string ID from JSON (handles both string and numeric IDs).
fn get_id(json: &Value, key: &str) -> Option<String> {
    json.get(key).and_then(|v| {
        if let Some(s) = v.as_str() {
            Some(s.to_string())
        } else if let Some(n) = v.as_u64() {
            Some(n.to_string())
        } else {
            v.as_i64().map(|n| n.to_string())
        }
    })
}

/// Get optional positive u32 from JSON.
fn get_opt_u32(json: &Value, key: &str) -> Option<u32> {
    json.get(key)
        .and_then(|v| v.as_u64())
        .filter(|n| *n > 0)
        .map(|n| n as u32)
}

/// Parse an artist search hit.
pub fn parse_artist(json: &Value) -> Result<ArtistHandle> {
    let id = get_id(json, "id")
        .ok_or_else(|| PosterError::ApiError("Artist without id".to_string()))?;

    Ok(ArtistHandle {
        id,
        name: get_str(json, "name"),
    })
}

/// Parse an album as listed under `artist/{id}/albums`.
pub fn parse_album_summary(json: &Value) -> Result<AlbumSummary> {
    let id = get_id(json, "id")
        .ok_or_else(|| PosterError::ApiError("Album without id".to_string()))?;

    Ok(AlbumSummary {
        id,
        title: get_str(json, "title"),
        release_date: get_opt_str(json, "release_date"),
    })
}

/// Parse a track as listed under `album/{id}/tracks`. Lyrics are attached
/// separately through the gateway.
pub fn parse_track_listing(json: &Value) -> TrackListing {
    TrackListing {
        id: get_id(json, "id"),
        track_number: get_opt_u32(json, "track_position"),
        title: get_str(json, "title"),
        lyrics: None,
    }
}

/// Parse a track from `artist/{id}/top`.
///
/// The nested album does not carry a release date; callers fill it in from
/// the album itself.
pub fn parse_song_listing(json: &Value) -> SongListing {
    let album = json.get("album");

    SongListing {
        id: get_id(json, "id"),
        title: get_str(json, "title"),
        album_title: album.and_then(|a| get_opt_str(a, "title")),
        release_date: get_opt_str(json, "release_date"),
        lyrics: None,
    }
}

/// Album identifier nested in a track object.
pub fn nested_album_id(json: &Value) -> Option<String> {
    json.get("album").and_then(|a| get_id(a, "id"))
}
