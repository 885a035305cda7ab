//! End-to-end poster generation.
//!
//! Aggregate the artist's content, fit it on one page and write the PDF.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::aggregator::Aggregator;
use crate::error::{PosterError, Result};
use crate::fitter::{FitterConfig, FontFitter};
use crate::models::PosterDocument;
use crate::render::RenderingOracle;
use crate::source::DiscographySource;

/// Settings for one poster run.
#[derive(Debug, Clone)]
pub struct PosterOptions {
    /// Font search bounds and page geometry.
    pub fitter: FitterConfig,
    /// Optional faded background image.
    pub background_url: Option<String>,
    /// Optional signature image.
    pub signature_url: Option<String>,
    /// Directory the PDF is written to.
    pub output_dir: PathBuf,
}

impl Default for PosterOptions {
    fn default() -> Self {
        Self {
            fitter: FitterConfig::default(),
            background_url: None,
            signature_url: None,
            output_dir: PathBuf::from("."),
        }
    }
}

/// What a run produced.
#[derive(Debug, Clone)]
pub struct PosterOutcome {
    /// Written PDF.
    pub path: PathBuf,
    /// Chosen font size in points.
    pub font_size: f64,
    /// Oracle measurements made.
    pub iterations: usize,
    /// Album headers on the poster.
    pub albums: usize,
    /// Songs on the poster.
    pub songs: usize,
}

/// Sanitize a name for use in a file name.
pub fn sanitize_filename(name: &str) -> String {
    name.replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_")
        .trim()
        .to_string()
}

/// Output file name for an artist.
pub fn output_file_name(artist: &str) -> String {
    format!("{} poster.pdf", sanitize_filename(artist))
}

/// Generate the poster for `artist` and write it to the output directory.
///
/// The font search runs on tokio's blocking pool, so `oracle` may block.
///
/// # Errors
///
/// Aggregation errors (`ArtistNotFound`, `Fetch`, `EmptyContent`),
/// `InvalidConfig` for unusable fitter settings, `Render` for oracle
/// failures and `IoError` if the file cannot be written.
pub async fn generate<S, O>(
    aggregator: &Aggregator<S>,
    oracle: Arc<O>,
    artist: &str,
    options: &PosterOptions,
) -> Result<PosterOutcome>
where
    S: DiscographySource,
    O: RenderingOracle + ?Sized + 'static,
{
    let fitter = FontFitter::new(options.fitter)?;

    let blocks = aggregator.aggregate(artist).await?;
    let document = PosterDocument::new(blocks)
        .with_background(options.background_url.clone())
        .with_signature(options.signature_url.clone());

    let (albums, songs) = (document.album_count(), document.song_count());
    info!("Fitting {} albums and {} songs on one page", albums, songs);

    let fit = tokio::task::spawn_blocking(move || fitter.fit(oracle.as_ref(), &document))
        .await
        .map_err(|e| PosterError::Render(format!("font fitting task failed: {}", e)))??;

    let path = write_artifact(&options.output_dir, artist, &fit.artifact)?;
    info!("Saved {} at {}pt", path.display(), fit.font_size);

    Ok(PosterOutcome {
        path,
        font_size: fit.font_size,
        iterations: fit.iterations,
        albums,
        songs,
    })
}

fn write_artifact(output_dir: &Path, artist: &str, artifact: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(output_file_name(artist));
    fs::write(&path, artifact)?;
    Ok(path)
}
