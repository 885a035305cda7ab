//! HTML poster template rendered through WeasyPrint.
//!
//! The template reproduces the printed poster: justified Courier text,
//! red album titles, an optional faded background image and an optional
//! signature in the lower right corner. [`WeasyprintRenderer`] pipes it
//! through the `weasyprint` command and reads the resulting PDF back with
//! `lopdf` to count pages.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use maud::{html, PreEscaped, DOCTYPE};
use tracing::debug;

use super::{RenderingOracle, StyleConfig};
use crate::error::{PosterError, Result};
use crate::models::{ContentBlock, PosterDocument};

/// Default WeasyPrint executable, looked up on `PATH`.
pub const DEFAULT_WEASYPRINT: &str = "weasyprint";

const BASE_STYLESHEET: &str = r#"
body {
  font-family: "Courier New", monospace;
  text-align: justify;
}
.background {
  position: fixed;
  top: 0;
  left: 0;
  width: 100%;
  height: 100%;
  background-size: cover;
  background-repeat: no-repeat;
  background-position: center;
  opacity: 0.4;
  z-index: -1;
}
.signature {
  position: fixed;
  bottom: 60px;
  right: 0px;
  width: 800px;
  height: 400px;
  background-size: cover;
  background-repeat: no-repeat;
  background-position: center;
  opacity: 0.2;
  z-index: -1;
}
.album_title {
  font-weight: bolder;
  color: #ef0000;
}
.song_title {
  font-weight: bold;
}
.content {
  padding: 70px;
}
"#;

/// Quote a URL for use inside a CSS `url("...")`.
fn css_url(url: &str) -> String {
    url.replace('\\', "%5C")
        .replace('"', "%22")
        .replace(['\n', '\r'], "")
}

/// Page geometry and font size for one render.
fn page_stylesheet(style: &StyleConfig) -> String {
    format!(
        "@page {{ size: {}mm {}mm; margin: 0mm; }}\nhtml {{ font-size: {}pt; }}\n",
        style.page.width_mm, style.page.height_mm, style.font_size
    )
}

/// Build the poster HTML for a document in a given style.
pub fn poster_html(document: &PosterDocument, style: &StyleConfig) -> String {
    let mut stylesheet = String::from(BASE_STYLESHEET);
    stylesheet.push_str(&page_stylesheet(style));

    let markup = html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { "Song Lyrics" }
                style { (PreEscaped(stylesheet)) }
            }
            body {
                @if let Some(url) = &document.background_url {
                    div.background style=(format!("background-image: url(\"{}\");", css_url(url))) {}
                }
                @if let Some(url) = &document.signature_url {
                    div.signature style=(format!("background-image: url(\"{}\");", css_url(url))) {}
                }
                div.content {
                    @for block in &document.blocks {
                        @match block {
                            ContentBlock::AlbumHeader { title, display_year } => {
                                span.album_title { (title) " (" (display_year) ")" }
                                " "
                            }
                            ContentBlock::SongEntry { title, cleaned_lyrics } => {
                                span.song_title { " • " (title) " • " }
                                " " (cleaned_lyrics) " "
                            }
                        }
                    }
                }
            }
        }
    };

    markup.into_string()
}

/// Oracle backed by the `weasyprint` command line tool.
#[derive(Debug, Clone)]
pub struct WeasyprintRenderer {
    command: PathBuf,
}

impl Default for WeasyprintRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_WEASYPRINT)
    }
}

impl WeasyprintRenderer {
    /// Create a renderer using a specific executable.
    pub fn new<P: AsRef<Path>>(command: P) -> Self {
        Self {
            command: command.as_ref().to_path_buf(),
        }
    }

    /// Run WeasyPrint with the HTML on stdin and collect the PDF from stdout.
    fn run(&self, html: &str) -> Result<Vec<u8>> {
        let mut child = Command::new(&self.command)
            .args(["--encoding", "utf-8", "-", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                PosterError::Render(format!(
                    "could not start {}: {}",
                    self.command.display(),
                    e
                ))
            })?;

        // WeasyPrint reads all of its input before writing any output.
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(html.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PosterError::Render(format!(
                "{} exited with {}: {}",
                self.command.display(),
                output.status,
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }
}

impl RenderingOracle for WeasyprintRenderer {
    fn measure(&self, document: &PosterDocument, style: &StyleConfig) -> Result<usize> {
        let pdf = self.render(document, style)?;
        let pages = lopdf::Document::load_mem(&pdf)?.get_pages().len();
        debug!("WeasyPrint at {}pt: {} pages", style.font_size, pages);
        Ok(pages)
    }

    fn render(&self, document: &PosterDocument, style: &StyleConfig) -> Result<Vec<u8>> {
        self.run(&poster_html(document, style))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::PageSize;

    fn style() -> StyleConfig {
        StyleConfig::new(PageSize::default(), 7.25)
    }

    #[test]
    fn test_poster_html_contains_blocks() {
        let doc = PosterDocument::new(vec![
            ContentBlock::header("Album B", 1999),
            ContentBlock::song("Outro", "bye"),
        ]);
        let html = poster_html(&doc, &style());

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<span class="album_title">Album B (1999)</span>"#));
        assert!(html.contains(r#"<span class="song_title"> • Outro • </span> bye"#));
        assert!(html.contains("size: 1000mm 1380mm"));
        assert!(html.contains("font-size: 7.25pt"));
    }

    #[test]
    fn test_poster_html_escapes_text() {
        let doc = PosterDocument::new(vec![ContentBlock::song("<b>", "a & b")]);
        let html = poster_html(&doc, &style());
        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains("a &amp; b"));
    }

    #[test]
    fn test_poster_html_artwork_is_optional() {
        let doc = PosterDocument::new(vec![ContentBlock::song("Outro", "bye")]);
        let html = poster_html(&doc, &style());
        assert!(!html.contains(r#"class="background""#));
        assert!(!html.contains(r#"class="signature""#));

        let doc = doc
            .with_background(Some("https://example.com/bg.jpg".to_string()))
            .with_signature(Some("https://example.com/sig\".png".to_string()));
        let html = poster_html(&doc, &style());
        assert!(html.contains("https://example.com/bg.jpg"));
        assert!(html.contains("sig%22.png"));
    }

    #[test]
    fn test_missing_executable_is_render_error() {
        let renderer = WeasyprintRenderer::new("/nonexistent/weasyprint");
        let doc = PosterDocument::new(vec![ContentBlock::song("Outro", "bye")]);
        assert!(matches!(
            renderer.measure(&doc, &style()),
            Err(PosterError::Render(_))
        ));
    }
}
