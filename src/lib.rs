//! # Lyric Poster
//!
//! Print an artist's complete lyrics on a single poster page.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use lyric_poster::{generate, Aggregator, DeezerDiscography, DiskCache, PosterOptions, TypesetRenderer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Discography source authenticated with an ARL token
//!     let source = DeezerDiscography::new("your_arl_token").await?;
//!
//!     // Lookups are cached on disk between runs
//!     let cache = Arc::new(DiskCache::open("artist_cache")?);
//!     let aggregator = Aggregator::new(source, cache);
//!
//!     let outcome = generate(&aggregator, Arc::new(TypesetRenderer::default()), "Daft Punk", &PosterOptions::default()).await?;
//!     println!("Saved {} at {}pt", outcome.path.display(), outcome.font_size);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - [`Aggregator`] - collects albums, attaches cleaned lyrics and orders
//!   them into [`ContentBlock`]s
//! - [`FontFitter`] - binary-searches the largest font size that keeps the
//!   document on one page
//! - [`RenderingOracle`] - page counting and PDF output, either
//!   [`TypesetRenderer`] or [`WeasyprintRenderer`]
//!
//! ## Low-Level APIs
//!
//! - [`DeezerApi`] - Public API for catalogue data (no auth required)
//! - [`GatewayApi`] - Private API for lyrics (requires ARL token)

pub mod aggregator;
pub mod api;
pub mod cache;
pub mod converters;
mod deezer;
pub mod error;
pub mod filters;
pub mod fitter;
pub mod lyrics;
pub mod models;
pub mod poster;
pub mod render;
pub mod source;

// Main interface (recommended)
pub use aggregator::{Aggregator, AggregatorOptions, GroupingStrategy};
pub use deezer::{DeezerDiscography, DEFAULT_SONG_LIMIT};
pub use fitter::{FitResult, FitterConfig, FontFitter};
pub use poster::{generate, output_file_name, PosterOptions, PosterOutcome};

// Seams
pub use cache::{DiskCache, LookupCache, MemoryCache};
pub use render::{PageSize, RenderingOracle, StyleConfig, TypesetRenderer, WeasyprintRenderer};
pub use source::{ArtistHandle, DiscographySource};

// Low-level APIs
pub use api::{DeezerApi, GatewayApi};
pub use error::{PosterError, Result};
pub use models::{Album, ContentBlock, PosterDocument, ReleaseDate, Song};
