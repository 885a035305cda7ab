//! Data models for the poster pipeline.
//!
//! This module contains the album/song records produced by aggregation,
//! the release date resolution they rely on, and the content blocks that
//! make up the rendered document.

pub mod album;
pub mod common;
pub mod content;

// Re-exports for convenience
pub use album::{Album, Song};
pub use common::ReleaseDate;
pub use content::{ContentBlock, PosterDocument};
