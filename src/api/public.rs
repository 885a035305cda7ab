//! Public Deezer API client.
//!
//! This module provides a client for the public Deezer API (api.deezer.com).
//! No authentication is required for catalogue lookups.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error};

use crate::converters;
use crate::error::{PosterError, Result};
use crate::source::{AlbumSummary, ArtistHandle, SongListing, TrackListing};

/// Base URL for the Deezer public API.
const API_BASE_URL: &str = "https://api.deezer.com/";

/// Page size requested from paginated endpoints.
const PAGE_LIMIT: u32 = 100;

/// Per-request timeout.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Browser user agent sent with every request.
pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Public Deezer API client.
///
/// Provides methods to look up artists, their albums and album tracks
/// without requiring authentication.
///
/// # Example
///
/// ```rust,no_run
/// use lyric_poster::DeezerApi;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let api = DeezerApi::new()?;
///     let artist = api.search_artist("Daft Punk").await?;
///     let albums = api.get_artist_albums(&artist.id).await?;
///     println!("{} has {} albums", artist.name, albums.len());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DeezerApi {
    client: Client,
}

impl DeezerApi {
    /// Create a new Deezer API client.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { client })
    }

    /// Make a GET request to the Deezer API.
    async fn get_api(&self, endpoint: &str) -> Result<Value> {
        let url = format!("{}{}", API_BASE_URL, endpoint);
        self.get_url(&url, &[]).await
    }

    /// Make a GET request with query parameters.
    async fn get_api_with_params(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Value> {
        let url = format!("{}{}", API_BASE_URL, endpoint);
        self.get_url(&url, params).await
    }

    async fn get_url(&self, url: &str, params: &[(&str, &str)]) -> Result<Value> {
        debug!("GET {} with params: {:?}", url, params);

        let response = self.client.get(url).query(params).send().await?;
        let data: Value = response.json().await?;

        // Check for API errors
        if let Some(error) = data.get("error") {
            let error_msg = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown error");
            error!("Deezer API error: {}", error_msg);
            return Err(PosterError::ApiError(error_msg.to_string()));
        }

        Ok(data)
    }

    /// Collect every `data` item of a paginated endpoint by following `next`.
    async fn get_all_pages(&self, endpoint: &str) -> Result<Vec<Value>> {
        let limit = PAGE_LIMIT.to_string();
        let mut page = self
            .get_api_with_params(endpoint, &[("limit", &limit)])
            .await?;
        let mut items = Vec::new();

        loop {
            if let Some(data) = page.get("data").and_then(|d| d.as_array()) {
                items.extend(data.iter().cloned());
            }

            let next_url = page
                .get("next")
                .and_then(|n| n.as_str())
                .map(|s| s.to_string());

            match next_url {
                Some(url) => page = self.get_url(&url, &[]).await?,
                None => break,
            }
        }

        debug!("Fetched {} items from {}", items.len(), endpoint);
        Ok(items)
    }

    /// Find the best matching artist for a name.
    ///
    /// Prefers a case-insensitive exact name match, else the top hit.
    ///
    /// # Errors
    ///
    /// Returns `ArtistNotFound` when the search has no hits.
    pub async fn search_artist(&self, name: &str) -> Result<ArtistHandle> {
        let response = self
            .get_api_with_params("search/artist", &[("q", name), ("limit", "10")])
            .await?;

        let hits = response
            .get("data")
            .and_then(|d| d.as_array())
            .cloned()
            .unwrap_or_default();

        let artists: Vec<ArtistHandle> = hits
            .iter()
            .filter_map(|a| converters::parse_artist(a).ok())
            .collect();

        let wanted = name.trim().to_lowercase();
        artists
            .iter()
            .find(|a| a.name.to_lowercase() == wanted)
            .or_else(|| artists.first())
            .cloned()
            .ok_or_else(|| PosterError::ArtistNotFound(name.to_string()))
    }

    /// Get every album entity of an artist.
    pub async fn get_artist_albums(&self, artist_id: &str) -> Result<Vec<AlbumSummary>> {
        self.get_all_pages(&format!("artist/{}/albums", artist_id))
            .await?
            .iter()
            .map(converters::parse_album_summary)
            .collect()
    }

    /// Get an album's tracks in track order, without lyrics.
    pub async fn get_album_tracks(&self, album_id: &str) -> Result<Vec<TrackListing>> {
        Ok(self
            .get_all_pages(&format!("album/{}/tracks", album_id))
            .await?
            .iter()
            .map(converters::parse_track_listing)
            .collect())
    }

    /// Get a single album summary (used for its release date).
    pub async fn get_album(&self, album_id: &str) -> Result<AlbumSummary> {
        let album_json = self.get_api(&format!("album/{}", album_id)).await?;
        converters::parse_album_summary(&album_json)
    }

    /// Get an artist's most popular tracks, each with its album id.
    pub async fn get_artist_top_tracks(
        &self,
        artist_id: &str,
        limit: u32,
    ) -> Result<Vec<(SongListing, Option<String>)>> {
        let response = self
            .get_api_with_params(
                &format!("artist/{}/top", artist_id),
                &[("limit", &limit.to_string())],
            )
            .await?;

        let tracks_data = response
            .get("data")
            .and_then(|d| d.as_array())
            .ok_or_else(|| PosterError::ApiError("No tracks data".to_string()))?;

        Ok(tracks_data
            .iter()
            .map(|t| {
                (
                    converters::parse_song_listing(t),
                    converters::nested_album_id(t),
                )
            })
            .collect())
    }
}
