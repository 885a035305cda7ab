//! Rendering oracles.
//!
//! The font fitter never lays text out itself; it asks a
//! [`RenderingOracle`] how many pages the document takes at a given font
//! size, and finally asks it for the artifact. Two oracles are provided:
//!
//! - [`TypesetRenderer`]: built-in monospace flow layout written straight to
//!   PDF, no external tools needed
//! - [`WeasyprintRenderer`]: the HTML poster template rendered by the
//!   `weasyprint` command, with background and signature artwork

pub mod html;
pub mod typeset;

pub use html::{poster_html, WeasyprintRenderer};
pub use typeset::TypesetRenderer;

use crate::error::{PosterError, Result};
use crate::models::PosterDocument;

/// PostScript points per millimetre.
pub const POINTS_PER_MM: f64 = 72.0 / 25.4;

/// Padding around the poster content: 70 CSS px expressed in points.
pub const CONTENT_PADDING_PT: f64 = 52.5;

/// Physical page dimensions in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    /// Page width.
    pub width_mm: f64,
    /// Page height.
    pub height_mm: f64,
}

impl Default for PageSize {
    /// The 1000 × 1380 mm poster sheet.
    fn default() -> Self {
        Self {
            width_mm: 1000.0,
            height_mm: 1380.0,
        }
    }
}

impl PageSize {
    /// Create a page size, rejecting non-positive or non-finite dimensions.
    pub fn new(width_mm: f64, height_mm: f64) -> Result<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(width_mm) || !valid(height_mm) {
            return Err(PosterError::InvalidConfig(format!(
                "page size must be positive, got {}mm x {}mm",
                width_mm, height_mm
            )));
        }
        Ok(Self {
            width_mm,
            height_mm,
        })
    }

    /// Width and height in points.
    pub fn to_points(&self) -> (f64, f64) {
        (self.width_mm * POINTS_PER_MM, self.height_mm * POINTS_PER_MM)
    }
}

/// Everything that varies between oracle calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleConfig {
    /// Page dimensions.
    pub page: PageSize,
    /// Uniform font size in points.
    pub font_size: f64,
}

impl StyleConfig {
    /// Create a style for a page at a font size.
    pub fn new(page: PageSize, font_size: f64) -> Self {
        Self { page, font_size }
    }
}

/// Black-box layout engine queried by the font fitter.
///
/// Implementations may block. [`crate::poster::generate`] runs them on a
/// blocking thread.
pub trait RenderingOracle: Send + Sync {
    /// Number of pages the document occupies in this style.
    fn measure(&self, document: &PosterDocument, style: &StyleConfig) -> Result<usize>;

    /// Produce the final artifact (PDF bytes) in this style.
    fn render(&self, document: &PosterDocument, style: &StyleConfig) -> Result<Vec<u8>>;
}
