//! Error types for poster generation.

use thiserror::Error;

/// Main error type for all poster operations.
#[derive(Debug, Error)]
pub enum PosterError {
    /// Artist is absent at the data source.
    #[error("Artist not found: {0}")]
    ArtistNotFound(String),

    /// An album, track or lyric could not be retrieved.
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Nothing is left to render after filtering.
    #[error("No content to render for artist: {0}")]
    EmptyContent(String),

    /// The rendering oracle failed to measure or produce the document.
    #[error("Render error: {0}")]
    Render(String),

    /// Fitter, page or pipeline configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid or expired credentials (ARL token).
    #[error("Bad credentials: {0}")]
    BadCredentials(String),

    /// Generic API error with message.
    #[error("API error: {0}")]
    ApiError(String),

    /// HTTP request failed.
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    /// PDF could not be written or read back.
    #[error("PDF error: {0}")]
    PdfError(#[from] lopdf::Error),

    /// I/O operation failed.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PosterError {
    /// Fold a data-source failure into [`PosterError::Fetch`].
    ///
    /// Terminal lookup and credential errors keep their own variant.
    pub fn into_fetch(self, context: &str) -> Self {
        match self {
            e @ (PosterError::ArtistNotFound(_)
            | PosterError::BadCredentials(_)
            | PosterError::Fetch(_)) => e,
            other => PosterError::Fetch(format!("{}: {}", context, other)),
        }
    }

    /// Fold an oracle failure into [`PosterError::Render`].
    pub fn into_render(self, context: &str) -> Self {
        match self {
            e @ PosterError::Render(_) => e,
            other => PosterError::Render(format!("{}: {}", context, other)),
        }
    }
}

/// Result type alias for poster operations.
pub type Result<T> = std::result::Result<T, PosterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_fetch_keeps_not_found() {
        let err = PosterError::ArtistNotFound("Nobody".to_string()).into_fetch("albums");
        assert!(matches!(err, PosterError::ArtistNotFound(_)));
    }

    #[test]
    fn test_into_fetch_wraps_api_error() {
        let err = PosterError::ApiError("boom".to_string()).into_fetch("album 42");
        match err {
            PosterError::Fetch(msg) => {
                assert!(msg.contains("album 42"));
                assert!(msg.contains("boom"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_into_render_wraps_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "weasyprint");
        let err = PosterError::from(io).into_render("measure");
        assert!(matches!(err, PosterError::Render(_)));
    }
}
