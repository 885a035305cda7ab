//! Content blocks consumed by the renderers and the font fitter.

use serde::{Deserialize, Serialize};

/// One ordered unit of the poster document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Album title followed by its release year.
    AlbumHeader { title: String, display_year: i32 },
    /// A song title with its cleaned, single-line lyrics.
    SongEntry {
        title: String,
        cleaned_lyrics: String,
    },
}

impl ContentBlock {
    /// Create an album header block.
    pub fn header<S: Into<String>>(title: S, display_year: i32) -> Self {
        ContentBlock::AlbumHeader {
            title: title.into(),
            display_year,
        }
    }

    /// Create a song entry block.
    pub fn song<S1: Into<String>, S2: Into<String>>(title: S1, cleaned_lyrics: S2) -> Self {
        ContentBlock::SongEntry {
            title: title.into(),
            cleaned_lyrics: cleaned_lyrics.into(),
        }
    }

    /// Whether this block opens a new album.
    pub fn is_header(&self) -> bool {
        matches!(self, ContentBlock::AlbumHeader { .. })
    }
}

/// The full poster document: the ordered blocks plus the optional artwork
/// references that only the HTML template uses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosterDocument {
    /// Ordered content.
    pub blocks: Vec<ContentBlock>,

    /// Faded full-page background image.
    pub background_url: Option<String>,

    /// Signature image in the lower right corner.
    pub signature_url: Option<String>,
}

impl PosterDocument {
    /// Create a document from content blocks.
    pub fn new(blocks: Vec<ContentBlock>) -> Self {
        Self {
            blocks,
            ..Default::default()
        }
    }

    /// Set the background image URL.
    pub fn with_background(mut self, url: Option<String>) -> Self {
        self.background_url = url;
        self
    }

    /// Set the signature image URL.
    pub fn with_signature(mut self, url: Option<String>) -> Self {
        self.signature_url = url;
        self
    }

    /// Number of album headers in the document.
    pub fn album_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_header()).count()
    }

    /// Number of song entries in the document.
    pub fn song_count(&self) -> usize {
        self.blocks.len() - self.album_count()
    }
}
