//! Deezer-backed discography source.
//!
//! Catalogue data (artists, albums, tracks) comes from the public API;
//! lyric text comes from the authenticated gateway.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::api::{DeezerApi, GatewayApi};
use crate::error::Result;
use crate::source::{AlbumSummary, ArtistHandle, DiscographySource, SongListing, TrackListing};

/// Default number of top tracks listed per artist.
pub const DEFAULT_SONG_LIMIT: u32 = 500;

/// Discography source combining both Deezer APIs.
///
/// # Example
///
/// ```rust,no_run
/// use lyric_poster::{DeezerDiscography, DiscographySource};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let source = DeezerDiscography::new("your_arl_token").await?;
///     let artist = source.find_artist("Daft Punk").await?;
///     let albums = source.list_albums(&artist).await?;
///     println!("{} albums", albums.len());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct DeezerDiscography {
    public_api: DeezerApi,
    gateway_api: GatewayApi,
    song_limit: u32,
}

impl DeezerDiscography {
    /// Create a new source from an ARL token.
    ///
    /// # Errors
    ///
    /// Returns `BadCredentials` if the ARL token is invalid.
    pub async fn new(arl: &str) -> Result<Self> {
        let gateway_api = GatewayApi::new(arl).await?;
        let public_api = DeezerApi::new()?;

        Ok(Self {
            public_api,
            gateway_api,
            song_limit: DEFAULT_SONG_LIMIT,
        })
    }

    /// Set how many songs [`DiscographySource::list_songs`] asks for.
    pub fn set_song_limit(&mut self, limit: u32) {
        self.song_limit = limit;
    }

    async fn lyrics_for(&self, song_id: Option<&str>) -> Result<Option<String>> {
        match song_id {
            Some(id) => self.gateway_api.get_lyrics(id).await,
            None => Ok(None),
        }
    }
}

#[async_trait]
impl DiscographySource for DeezerDiscography {
    async fn find_artist(&self, name: &str) -> Result<ArtistHandle> {
        let artist = self.public_api.search_artist(name).await?;
        info!("Resolved artist '{}' to {} ({})", name, artist.name, artist.id);
        Ok(artist)
    }

    async fn list_albums(&self, artist: &ArtistHandle) -> Result<Vec<AlbumSummary>> {
        self.public_api.get_artist_albums(&artist.id).await
    }

    async fn list_tracks(&self, album_id: &str) -> Result<Vec<TrackListing>> {
        let mut tracks = self.public_api.get_album_tracks(album_id).await?;

        for track in &mut tracks {
            track.lyrics = self.lyrics_for(track.id.as_deref()).await?;
        }

        debug!(
            "Album {}: {} tracks, {} with lyrics",
            album_id,
            tracks.len(),
            tracks.iter().filter(|t| t.lyrics.is_some()).count()
        );
        Ok(tracks)
    }

    async fn list_songs(&self, artist: &ArtistHandle) -> Result<Vec<SongListing>> {
        let top = self
            .public_api
            .get_artist_top_tracks(&artist.id, self.song_limit)
            .await?;

        let mut release_dates: HashMap<String, Option<String>> = HashMap::new();
        let mut songs = Vec::with_capacity(top.len());

        for (mut song, album_id) in top {
            if song.release_date.is_none() {
                if let Some(album_id) = album_id {
                    if !release_dates.contains_key(&album_id) {
                        let album = self.public_api.get_album(&album_id).await?;
                        release_dates.insert(album_id.clone(), album.release_date);
                    }
                    song.release_date = release_dates.get(&album_id).cloned().flatten();
                }
            }

            song.lyrics = self.lyrics_for(song.id.as_deref()).await?;
            songs.push(song);
        }

        debug!("Listed {} songs for {}", songs.len(), artist.name);
        Ok(songs)
    }
}
