//! Single-page font fitting.
//!
//! Binary search over the font size for the largest value at which the
//! whole document still fits on one page. The page count is assumed to be
//! monotonic in the font size; that is not checked.

use tracing::{debug, info};

use crate::error::{PosterError, Result};
use crate::models::PosterDocument;
use crate::render::{PageSize, RenderingOracle, StyleConfig};

/// Round `value` to `decimals` decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Search bounds and page geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitterConfig {
    /// Target page.
    pub page: PageSize,
    /// Smallest font size tried, in points.
    pub min_size: f64,
    /// Largest font size tried, in points.
    pub max_size: f64,
    /// Stop once the search interval is no wider than this, in points.
    pub precision: f64,
}

impl Default for FitterConfig {
    fn default() -> Self {
        Self {
            page: PageSize::default(),
            min_size: 1.0,
            max_size: 20.0,
            precision: 0.01,
        }
    }
}

impl FitterConfig {
    /// Create a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` unless `0 < min_size < max_size` and
    /// `precision > 0`, all finite.
    pub fn new(page: PageSize, min_size: f64, max_size: f64, precision: f64) -> Result<Self> {
        let config = Self {
            page,
            min_size,
            max_size,
            precision,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the bounds.
    pub fn validate(&self) -> Result<()> {
        if !self.min_size.is_finite() || !self.max_size.is_finite() || self.min_size <= 0.0 {
            return Err(PosterError::InvalidConfig(format!(
                "font size bounds must be finite and positive, got {}..{}",
                self.min_size, self.max_size
            )));
        }
        if self.min_size >= self.max_size {
            return Err(PosterError::InvalidConfig(format!(
                "minimum font size {} must be below maximum {}",
                self.min_size, self.max_size
            )));
        }
        if !self.precision.is_finite() || self.precision <= 0.0 {
            return Err(PosterError::InvalidConfig(format!(
                "precision must be positive, got {}",
                self.precision
            )));
        }
        // Re-check the page in case it was built by hand.
        PageSize::new(self.page.width_mm, self.page.height_mm)?;
        Ok(())
    }

    fn style(&self, font_size: f64) -> StyleConfig {
        StyleConfig::new(self.page, font_size)
    }
}

/// Outcome of a fit.
#[derive(Debug, Clone)]
pub struct FitResult {
    /// Chosen font size in points.
    pub font_size: f64,
    /// Artifact rendered at `font_size`.
    pub artifact: Vec<u8>,
    /// Number of oracle measurements made during the search.
    pub iterations: usize,
}

/// Binary-search font fitter.
#[derive(Debug, Clone, Default)]
pub struct FontFitter {
    config: FitterConfig,
}

impl FontFitter {
    /// Create a fitter, validating the configuration.
    pub fn new(config: FitterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Search for the largest fitting font size.
    ///
    /// `measure` returns the page count at a font size. Returns the best
    /// size and the number of measurements taken.
    pub fn search<F>(&self, mut measure: F) -> Result<(f64, usize)>
    where
        F: FnMut(f64) -> Result<usize>,
    {
        let mut low = self.config.min_size;
        let mut high = self.config.max_size;
        let mut best = low;
        let mut iterations = 0;

        while round_to(high - low, 4) > self.config.precision {
            let mid = round_to((low + high) / 2.0, 2);
            // Two-decimal grid exhausted.
            if mid <= low || mid >= high {
                break;
            }

            let pages = measure(mid)?;
            iterations += 1;
            debug!("Font size {}pt: {} page(s)", mid, pages);

            if pages > 1 {
                high = mid;
            } else {
                best = mid;
                low = mid;
            }
        }

        Ok((best, iterations))
    }

    /// Fit the document on one page and render it at the chosen size.
    ///
    /// # Errors
    ///
    /// Any oracle failure is returned as `Render`.
    pub fn fit<O>(&self, oracle: &O, document: &PosterDocument) -> Result<FitResult>
    where
        O: RenderingOracle + ?Sized,
    {
        let (font_size, iterations) = self.search(|size| {
            oracle
                .measure(document, &self.config.style(size))
                .map_err(|e| e.into_render(&format!("measuring at {}pt", size)))
        })?;

        info!(
            "Best font size: {}pt after {} measurement(s)",
            font_size, iterations
        );

        let artifact = oracle
            .render(document, &self.config.style(font_size))
            .map_err(|e| e.into_render(&format!("rendering at {}pt", font_size)))?;

        Ok(FitResult {
            font_size,
            artifact,
            iterations,
        })
    }
}
