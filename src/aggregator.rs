//! Content aggregation.
//!
//! Turns an artist's discography into the ordered, cleaned sequence of
//! [`ContentBlock`]s printed on the poster:
//!
//! 1. [`Aggregator::collect_albums`] resolves the artist and groups its
//!    songs into dated albums, using one of two [`GroupingStrategy`]s.
//! 2. [`Aggregator::attach_lyrics`] fills each album with its songs and
//!    lyric text, going through the [`LookupCache`].
//! 3. [`build_content_blocks`] sorts albums by release date and emits a
//!    header followed by one entry per song.
//!
//! Any retrieval failure aborts the run; a poster missing a song would be
//! laid out differently from the complete one.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use futures_util::{stream, StreamExt, TryStreamExt};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::cache::{cache_key, LookupCache};
use crate::error::{PosterError, Result};
use crate::filters::{has_alternate_version_marker, is_excluded_pairing, is_live_release};
use crate::models::{Album, ContentBlock, ReleaseDate, Song};
use crate::source::{ArtistHandle, DiscographySource, TrackListing};

/// Album name used for songs the source reports without an album.
pub const UNRELEASED_ALBUM: &str = "Unreleased";

/// Default number of albums whose lyrics are fetched at the same time.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// How songs are grouped into albums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupingStrategy {
    /// List album entities and deduplicate them by identifier.
    #[default]
    AlbumEntities,
    /// List songs and group them by the album name they report.
    SongAlbumName,
}

/// Aggregation settings.
#[derive(Debug, Clone)]
pub struct AggregatorOptions {
    /// Album grouping strategy.
    pub grouping: GroupingStrategy,
    /// Albums fetched concurrently while attaching lyrics.
    pub concurrency: usize,
}

impl Default for AggregatorOptions {
    fn default() -> Self {
        Self {
            grouping: GroupingStrategy::default(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Builds poster content from a discography source.
pub struct Aggregator<S> {
    source: S,
    cache: Arc<dyn LookupCache>,
    options: AggregatorOptions,
}

impl<S: DiscographySource> Aggregator<S> {
    /// Create an aggregator over a source and a cache.
    pub fn new(source: S, cache: Arc<dyn LookupCache>) -> Self {
        Self {
            source,
            cache,
            options: AggregatorOptions::default(),
        }
    }

    /// Replace the aggregation settings.
    pub fn with_options(mut self, options: AggregatorOptions) -> Self {
        self.options = options;
        self
    }

    /// Produce the full, ordered content for an artist.
    ///
    /// # Errors
    ///
    /// `ArtistNotFound` if the source has no such artist, `Fetch` if any
    /// album or lyric lookup fails, `EmptyContent` if nothing survives
    /// filtering.
    pub async fn aggregate(&self, artist_name: &str) -> Result<Vec<ContentBlock>> {
        let albums = self.collect_albums(artist_name).await?;

        let albums: Vec<Album> = stream::iter(albums)
            .map(|album| self.attach_lyrics(album))
            .buffered(self.options.concurrency.max(1))
            .try_collect()
            .await?;

        let blocks = build_content_blocks(&albums);
        if blocks.is_empty() {
            return Err(PosterError::EmptyContent(artist_name.to_string()));
        }

        info!("Aggregated {} blocks for {}", blocks.len(), artist_name);
        Ok(blocks)
    }

    /// Resolve the artist and collect its dated, deduplicated albums.
    ///
    /// Albums without a resolvable release date and live releases are
    /// dropped. Albums keep source order.
    pub async fn collect_albums(&self, artist_name: &str) -> Result<Vec<Album>> {
        let artist = self
            .source
            .find_artist(artist_name)
            .await
            .map_err(|e| e.into_fetch("artist lookup"))?;

        let albums = match self.options.grouping {
            GroupingStrategy::AlbumEntities => self.collect_album_entities(&artist).await?,
            GroupingStrategy::SongAlbumName => self.collect_by_album_name(&artist).await?,
        };

        let total = albums.len();
        let albums: Vec<Album> = albums.into_iter().filter(keep_album).collect();
        info!(
            "Collected {} albums for {} ({} dropped)",
            albums.len(),
            artist.name,
            total - albums.len()
        );
        Ok(albums)
    }

    async fn collect_album_entities(&self, artist: &ArtistHandle) -> Result<Vec<Album>> {
        let summaries = self
            .cached(json!({ "artist": artist.id, "kind": "albums" }), || async move {
                self.source
                    .list_albums(artist)
                    .await
                    .map_err(|e| e.into_fetch(&format!("albums of {}", artist.name)))
            })
            .await?;

        let mut seen: HashSet<String> = HashSet::new();
        Ok(summaries
            .into_iter()
            .filter(|summary| seen.insert(summary.id.clone()))
            .filter(|summary| !has_alternate_version_marker(&summary.title))
            .map(|summary| {
                let release_date = summary.release_date.as_deref().and_then(ReleaseDate::parse);
                Album::new(summary.id, summary.title, release_date)
            })
            .collect())
    }

    async fn collect_by_album_name(&self, artist: &ArtistHandle) -> Result<Vec<Album>> {
        let songs = self
            .cached(json!({ "artist": artist.id, "kind": "songs" }), || async move {
                self.source
                    .list_songs(artist)
                    .await
                    .map_err(|e| e.into_fetch(&format!("songs of {}", artist.name)))
            })
            .await?;

        let mut albums: Vec<Album> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for listing in songs {
            let album_title = listing
                .album_title
                .clone()
                .unwrap_or_else(|| UNRELEASED_ALBUM.to_string());

            let song = Song {
                id: listing.id,
                title: listing.title,
                track_number: None,
                lyrics: listing.lyrics,
            };
            if !song.has_lyrics() || is_excluded_pairing(&song.title, &album_title) {
                continue;
            }

            let position = *index.entry(album_title.clone()).or_insert_with(|| {
                albums.push(Album::new(album_title.clone(), album_title.clone(), None));
                albums.len() - 1
            });

            let album = &mut albums[position];
            if album.release_date.is_none() {
                album.release_date = listing.release_date.as_deref().and_then(ReleaseDate::parse);
            }
            album.songs.push(song);
        }

        Ok(albums)
    }

    /// Populate an album's songs with lyric text.
    ///
    /// Albums that already carry songs are only filtered. Otherwise the
    /// album's tracks are fetched through the cache, keyed by album id.
    /// Songs excluded by the version heuristic or without lyrics are removed.
    pub async fn attach_lyrics(&self, mut album: Album) -> Result<Album> {
        if album.songs.is_empty() {
            let album_id = album.id.clone();
            let tracks: Vec<TrackListing> = self
                .cached(json!({ "album": album_id }), || async move {
                    self.source
                        .list_tracks(&album_id)
                        .await
                        .map_err(|e| e.into_fetch(&format!("album {}", album_id)))
                })
                .await?;

            album.songs = tracks
                .into_iter()
                .map(|track| Song {
                    id: track.id,
                    title: track.title,
                    track_number: track.track_number,
                    lyrics: track.lyrics,
                })
                .collect();
        }

        let album_title = album.title.clone();
        album
            .songs
            .retain(|song| song.has_lyrics() && !is_excluded_pairing(&song.title, &album_title));

        debug!("Album '{}': {} songs with lyrics", album.title, album.songs.len());
        Ok(album)
    }

    /// Read a value through the cache, fetching and storing it on a miss.
    async fn cached<T, F, Fut>(&self, identity: Value, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let key = cache_key(&identity);

        match self.cache.get(&key) {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(hit) => {
                    debug!("Cache hit for {}", identity);
                    return Ok(hit);
                }
                Err(e) => warn!("Discarding stale cache entry for {}: {}", identity, e),
            },
            Ok(None) => debug!("Cache miss for {}", identity),
            Err(e) => warn!("Cache read failed for {}: {}", identity, e),
        }

        let fresh = fetch().await?;
        if let Err(e) = self.cache.put(&key, &serde_json::to_value(&fresh)?) {
            warn!("Cache write failed for {}: {}", identity, e);
        }
        Ok(fresh)
    }
}

fn keep_album(album: &Album) -> bool {
    if album.release_date.is_none() {
        warn!("Dropping '{}': no release date", album.title);
        return false;
    }
    if is_live_release(&album.title) {
        warn!("Dropping '{}': live release", album.title);
        return false;
    }
    true
}

/// Order albums by release date and flatten them into content blocks.
///
/// The sort is stable, so albums released on the same resolved date keep
/// source order. Albums without a date or without any song whose cleaned
/// lyrics are non-empty produce no blocks.
pub fn build_content_blocks(albums: &[Album]) -> Vec<ContentBlock> {
    let mut publishable: Vec<(ReleaseDate, &Album)> = albums
        .iter()
        .filter(|album| album.is_publishable())
        .filter_map(|album| album.release_date.map(|date| (date, album)))
        .collect();
    publishable.sort_by_key(|(date, _)| date.sort_key());

    let mut blocks = Vec::new();
    for (date, album) in publishable {
        blocks.push(ContentBlock::header(&album.title, date.year));
        blocks.extend(album.songs.iter().filter_map(|song| {
            Some(ContentBlock::song(&song.title, song.cleaned_lyrics()?))
        }));
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::source::{AlbumSummary, SongListing};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeSource {
        albums: Vec<AlbumSummary>,
        tracks: HashMap<String, Vec<TrackListing>>,
        songs: Vec<SongListing>,
        failing_album: Option<String>,
        track_calls: AtomicUsize,
    }

    #[async_trait]
    impl DiscographySource for FakeSource {
        async fn find_artist(&self, name: &str) -> Result<ArtistHandle> {
            if name == "Nobody" {
                return Err(PosterError::ArtistNotFound(name.to_string()));
            }
            Ok(ArtistHandle {
                id: "7".to_string(),
                name: name.to_string(),
            })
        }

        async fn list_albums(&self, _artist: &ArtistHandle) -> Result<Vec<AlbumSummary>> {
            Ok(self.albums.clone())
        }

        async fn list_tracks(&self, album_id: &str) -> Result<Vec<TrackListing>> {
            self.track_calls.fetch_add(1, Ordering::SeqCst);
            if self.failing_album.as_deref() == Some(album_id) {
                return Err(PosterError::ApiError("timeout".to_string()));
            }
            Ok(self.tracks.get(album_id).cloned().unwrap_or_default())
        }

        async fn list_songs(&self, _artist: &ArtistHandle) -> Result<Vec<SongListing>> {
            Ok(self.songs.clone())
        }
    }

    fn summary(id: &str, title: &str, date: Option<&str>) -> AlbumSummary {
        AlbumSummary {
            id: id.to_string(),
            title: title.to_string(),
            release_date: date.map(|d| d.to_string()),
        }
    }

    fn track(n: u32, title: &str, lyrics: Option<&str>) -> TrackListing {
        TrackListing {
            id: Some(format!("t{}", n)),
            track_number: Some(n),
            title: title.to_string(),
            lyrics: lyrics.map(|l| l.to_string()),
        }
    }

    fn listing(title: &str, album: Option<&str>, date: Option<&str>, lyrics: &str) -> SongListing {
        SongListing {
            id: None,
            title: title.to_string(),
            album_title: album.map(|a| a.to_string()),
            release_date: date.map(|d| d.to_string()),
            lyrics: Some(lyrics.to_string()).filter(|l| !l.is_empty()),
        }
    }

    fn two_album_source() -> FakeSource {
        FakeSource {
            albums: vec![
                summary("a", "Album A", Some("2001")),
                summary("b", "Album B", Some("1999")),
            ],
            tracks: HashMap::from([
                (
                    "a".to_string(),
                    vec![track(1, "Intro", Some("[Verse]\nHEY\nHEY"))],
                ),
                ("b".to_string(), vec![track(1, "Outro", Some("bye"))]),
            ]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_two_album_scenario() {
        let aggregator = Aggregator::new(two_album_source(), Arc::new(MemoryCache::new()));
        let blocks = aggregator.aggregate("Someone").await.unwrap();

        assert_eq!(
            blocks,
            vec![
                ContentBlock::header("Album B", 1999),
                ContentBlock::song("Outro", "bye"),
                ContentBlock::header("Album A", 2001),
                ContentBlock::song("Intro", "hey · hey"),
            ]
        );
    }

    #[tokio::test]
    async fn test_collect_albums_filters_and_dedupes() {
        let source = FakeSource {
            albums: vec![
                summary("1", "First", Some("2001-05-01")),
                summary("1", "First (again)", Some("2001-05-01")),
                summary("2", "Live at Home", Some("2002")),
                summary("3", "Undated", None),
                summary("4", "Deluxe (Remastered)", Some("2003")),
                summary("5", "Placeholder", Some("0000-00-00")),
                summary("6", "Second", Some("2004")),
            ],
            ..Default::default()
        };
        let aggregator = Aggregator::new(source, Arc::new(MemoryCache::new()));
        let albums = aggregator.collect_albums("Someone").await.unwrap();

        let titles: Vec<&str> = albums.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second"]);
        assert_eq!(albums[0].release_date, Some(ReleaseDate::full(2001, 5, 1)));
    }

    #[tokio::test]
    async fn test_artist_not_found_is_terminal() {
        let aggregator = Aggregator::new(two_album_source(), Arc::new(MemoryCache::new()));
        let err = aggregator.aggregate("Nobody").await.unwrap_err();
        assert!(matches!(err, PosterError::ArtistNotFound(_)));
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_run() {
        let mut source = two_album_source();
        source.failing_album = Some("b".to_string());
        let aggregator = Aggregator::new(source, Arc::new(MemoryCache::new()));

        match aggregator.aggregate("Someone").await {
            Err(PosterError::Fetch(msg)) => assert!(msg.contains("album b")),
            other => panic!("expected fetch error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_content_error() {
        let source = FakeSource {
            albums: vec![summary("a", "Album A", Some("2001"))],
            tracks: HashMap::from([(
                "a".to_string(),
                vec![track(1, "Silence", None), track(2, "Intro (Demo)", Some("la"))],
            )]),
            ..Default::default()
        };
        let aggregator = Aggregator::new(source, Arc::new(MemoryCache::new()));
        let err = aggregator.aggregate("Someone").await.unwrap_err();
        assert!(matches!(err, PosterError::EmptyContent(_)));
    }

    #[tokio::test]
    async fn test_attach_lyrics_uses_cache() {
        let cache = Arc::new(MemoryCache::new());
        let aggregator = Aggregator::new(two_album_source(), cache.clone());
        let album = Album::new("b", "Album B", Some(ReleaseDate::year(1999)));

        let first = aggregator.attach_lyrics(album.clone()).await.unwrap();
        let second = aggregator.attach_lyrics(album).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.songs.len(), 1);
        assert_eq!(aggregator.source.track_calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_attach_lyrics_keeps_track_order() {
        let source = FakeSource {
            tracks: HashMap::from([(
                "x".to_string(),
                vec![
                    track(3, "Third", Some("c")),
                    track(1, "First", Some("a")),
                    track(2, "No Words", Some("")),
                ],
            )]),
            ..Default::default()
        };
        let aggregator = Aggregator::new(source, Arc::new(MemoryCache::new()));
        let album = aggregator
            .attach_lyrics(Album::new("x", "X", Some(ReleaseDate::year(2000))))
            .await
            .unwrap();

        let titles: Vec<&str> = album.songs.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Third", "First"]);
    }

    #[tokio::test]
    async fn test_group_by_album_name() {
        let source = FakeSource {
            songs: vec![
                listing("Song 1", Some("Debut"), None, "one"),
                listing("Song 2", Some("Debut"), Some("March 3, 2001"), "two"),
                listing("Song 3", Some("Debut"), Some("2005"), "three"),
                listing("Song 4", Some("debut"), Some("2009"), "four"),
                listing("Loose", None, None, "loose"),
                listing("Song 5 (Remix)", Some("Debut"), Some("2001"), "five"),
                listing("Quiet", Some("Debut"), Some("2001"), ""),
                listing("Bonus", Some("Extras (Deluxe)"), Some("2002"), "bonus"),
            ],
            ..Default::default()
        };
        let aggregator = Aggregator::new(source, Arc::new(MemoryCache::new())).with_options(
            AggregatorOptions {
                grouping: GroupingStrategy::SongAlbumName,
                ..Default::default()
            },
        );

        let albums = aggregator.collect_albums("Someone").await.unwrap();
        assert_eq!(albums.len(), 2);

        assert_eq!(albums[0].title, "Debut");
        assert_eq!(albums[0].release_date, Some(ReleaseDate::full(2001, 3, 3)));
        let titles: Vec<&str> = albums[0].songs.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Song 1", "Song 2", "Song 3"]);

        assert_eq!(albums[1].title, "debut");
        assert_eq!(albums[1].release_date, Some(ReleaseDate::year(2009)));
    }

    #[tokio::test]
    async fn test_grouped_albums_skip_track_fetch() {
        let source = FakeSource {
            songs: vec![listing("Song", Some("Debut"), Some("2001"), "words")],
            ..Default::default()
        };
        let aggregator = Aggregator::new(source, Arc::new(MemoryCache::new())).with_options(
            AggregatorOptions {
                grouping: GroupingStrategy::SongAlbumName,
                concurrency: 1,
            },
        );

        let blocks = aggregator.aggregate("Someone").await.unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(aggregator.source.track_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_build_content_blocks_ordering() {
        let albums = vec![
            Album::new("3", "Third", Some(ReleaseDate::year(2010)))
                .with_songs(vec![Song::new("c1", Some("c".to_string()))]),
            Album::new("1", "First", Some(ReleaseDate::full(1995, 6, 1))).with_songs(vec![
                Song::new("a1", Some("a".to_string())),
                Song::new("a2", Some("aa".to_string())),
            ]),
            Album::new("2", "Tie", Some(ReleaseDate::year(2010)))
                .with_songs(vec![Song::new("t1", Some("t".to_string()))]),
        ];

        let blocks = build_content_blocks(&albums);
        assert_eq!(
            blocks,
            vec![
                ContentBlock::header("First", 1995),
                ContentBlock::song("a1", "a"),
                ContentBlock::song("a2", "aa"),
                ContentBlock::header("Third", 2010),
                ContentBlock::song("c1", "c"),
                ContentBlock::header("Tie", 2010),
                ContentBlock::song("t1", "t"),
            ]
        );
    }

    #[test]
    fn test_build_content_blocks_skips_unpublishable() {
        let albums = vec![
            Album::new("1", "Undated", None)
                .with_songs(vec![Song::new("s", Some("words".to_string()))]),
            Album::new("2", "Instrumental", Some(ReleaseDate::year(2000)))
                .with_songs(vec![Song::new("s", Some("[Instrumental]".to_string()))]),
            Album::new("3", "Empty", Some(ReleaseDate::year(2001))),
        ];
        assert!(build_content_blocks(&albums).is_empty());
    }

    #[test]
    fn test_year_only_date_ties_with_new_year() {
        let albums = vec![
            Album::new("1", "New Year", Some(ReleaseDate::full(2001, 1, 1)))
                .with_songs(vec![Song::new("n", Some("n".to_string()))]),
            Album::new("2", "Some Time", Some(ReleaseDate::year(2001)))
                .with_songs(vec![Song::new("s", Some("s".to_string()))]),
            Album::new("3", "Later", Some(ReleaseDate::full(2001, 1, 2)))
                .with_songs(vec![Song::new("l", Some("l".to_string()))]),
        ];

        let headers: Vec<ContentBlock> = build_content_blocks(&albums)
            .into_iter()
            .filter(ContentBlock::is_header)
            .collect();
        assert_eq!(
            headers,
            vec![
                ContentBlock::header("New Year", 2001),
                ContentBlock::header("Some Time", 2001),
                ContentBlock::header("Later", 2001),
            ]
        );
    }

    #[test]
    fn test_every_song_follows_its_header() {
        let albums: Vec<Album> = (0..5)
            .map(|i| {
                Album::new(
                    i.to_string(),
                    format!("Album {}", i),
                    Some(ReleaseDate::year(2000 + (i * 7) % 5)),
                )
                .with_songs(vec![
                    Song::new("x", Some("x".to_string())),
                    Song::new("y", Some("y".to_string())),
                ])
            })
            .collect();

        let blocks = build_content_blocks(&albums);
        assert!(blocks[0].is_header());

        let years: Vec<i32> = blocks
            .iter()
            .filter_map(|b| match b {
                ContentBlock::AlbumHeader { display_year, .. } => Some(*display_year),
                _ => None,
            })
            .collect();
        assert!(years.windows(2).all(|w| w[0] <= w[1]));

        for chunk in blocks.chunks(3) {
            assert!(chunk[0].is_header());
            assert!(!chunk[1].is_header() && !chunk[2].is_header());
        }
    }

    #[test]
    fn test_disk_cache_serves_second_run() {
        let dir = tempfile::tempdir().unwrap();

        let first = Aggregator::new(
            two_album_source(),
            Arc::new(crate::cache::DiskCache::open(dir.path()).unwrap()),
        );
        let expected = tokio_test::block_on(first.aggregate("Someone")).unwrap();
        assert_eq!(first.source.track_calls.load(Ordering::SeqCst), 2);

        let second = Aggregator::new(
            two_album_source(),
            Arc::new(crate::cache::DiskCache::open(dir.path()).unwrap()),
        );
        let blocks = tokio_test::block_on(second.aggregate("Someone")).unwrap();

        assert_eq!(blocks, expected);
        assert_eq!(second.source.track_calls.load(Ordering::SeqCst), 0);
    }
}
