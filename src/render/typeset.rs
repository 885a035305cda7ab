//! Built-in monospace typesetter.
//!
//! Lays the whole document out as one flowing paragraph in Courier, the
//! poster's typeface. Every glyph of a monospace font has the same advance,
//! so line breaking reduces to counting characters; the result is written as
//! a PDF using the standard Type 1 Courier fonts, which readers provide
//! without embedding.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use tracing::debug;

use super::{RenderingOracle, StyleConfig, CONTENT_PADDING_PT};
use crate::error::{PosterError, Result};
use crate::models::{ContentBlock, PosterDocument};

/// Courier advance width, in ems.
const GLYPH_ADVANCE_EM: f64 = 0.6;

/// Baseline-to-baseline distance, in ems.
const LINE_HEIGHT_EM: f64 = 1.2;

/// Courier ascent, in ems.
const ASCENT_EM: f64 = 0.8;

/// Album title color (#ef0000).
const ALBUM_TITLE_RGB: [f32; 3] = [0.937, 0.0, 0.0];

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";

/// Typographic role of a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunStyle {
    AlbumTitle,
    SongTitle,
    Lyrics,
}

impl RunStyle {
    fn font(self) -> &'static str {
        match self {
            RunStyle::AlbumTitle | RunStyle::SongTitle => BOLD_FONT,
            RunStyle::Lyrics => REGULAR_FONT,
        }
    }

    fn rgb(self) -> [f32; 3] {
        match self {
            RunStyle::AlbumTitle => ALBUM_TITLE_RGB,
            RunStyle::SongTitle | RunStyle::Lyrics => [0.0, 0.0, 0.0],
        }
    }
}

/// Same-style text on one line.
#[derive(Debug, Clone, PartialEq)]
struct Segment {
    style: RunStyle,
    text: String,
}

type Line = Vec<Segment>;

/// The document broken into lines and pages.
#[derive(Debug)]
struct TextLayout {
    lines: Vec<Line>,
    lines_per_page: usize,
}

impl TextLayout {
    fn page_count(&self) -> usize {
        self.lines.len().div_ceil(self.lines_per_page).max(1)
    }
}

/// Styled words in reading order.
fn document_words(document: &PosterDocument) -> Vec<(RunStyle, String)> {
    let mut words = Vec::new();

    for block in &document.blocks {
        match block {
            ContentBlock::AlbumHeader {
                title,
                display_year,
            } => {
                push_words(&mut words, RunStyle::AlbumTitle, title);
                words.push((RunStyle::AlbumTitle, format!("({})", display_year)));
            }
            ContentBlock::SongEntry {
                title,
                cleaned_lyrics,
            } => {
                words.push((RunStyle::SongTitle, "•".to_string()));
                push_words(&mut words, RunStyle::SongTitle, title);
                words.push((RunStyle::SongTitle, "•".to_string()));
                push_words(&mut words, RunStyle::Lyrics, cleaned_lyrics);
            }
        }
    }

    words
}

fn push_words(words: &mut Vec<(RunStyle, String)>, style: RunStyle, text: &str) {
    words.extend(text.split_whitespace().map(|w| (style, w.to_string())));
}

fn append_text(line: &mut Line, style: RunStyle, text: &str) {
    match line.last_mut() {
        Some(last) if last.style == style => last.text.push_str(text),
        _ => line.push(Segment {
            style,
            text: text.to_string(),
        }),
    }
}

/// Greedy line breaking at a fixed number of characters per line.
///
/// Words longer than a line are hard-broken.
fn break_lines(words: &[(RunStyle, String)], chars_per_line: usize) -> Vec<Line> {
    let mut lines: Vec<Line> = Vec::new();
    let mut line: Line = Vec::new();
    let mut used = 0usize;

    for (style, word) in words {
        let style = *style;
        let width = word.chars().count();

        if width > chars_per_line {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            let chars: Vec<char> = word.chars().collect();
            let mut chunks = chars.chunks(chars_per_line).peekable();
            while let Some(chunk) = chunks.next() {
                let piece: String = chunk.iter().collect();
                if chunks.peek().is_some() {
                    lines.push(vec![Segment { style, text: piece }]);
                } else {
                    used = chunk.len();
                    append_text(&mut line, style, &piece);
                }
            }
            continue;
        }

        if line.is_empty() {
            append_text(&mut line, style, word);
            used = width;
        } else if used + 1 + width <= chars_per_line {
            append_text(&mut line, style, " ");
            append_text(&mut line, style, word);
            used += 1 + width;
        } else {
            lines.push(std::mem::take(&mut line));
            append_text(&mut line, style, word);
            used = width;
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Encode text for a WinAnsiEncoding Type 1 font.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => c as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}

/// Monospace flow-layout oracle.
#[derive(Debug, Clone)]
pub struct TypesetRenderer {
    padding_pt: f64,
}

impl Default for TypesetRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TypesetRenderer {
    /// Create a renderer with the poster's standard padding.
    pub fn new() -> Self {
        Self {
            padding_pt: CONTENT_PADDING_PT,
        }
    }

    fn layout(&self, document: &PosterDocument, style: &StyleConfig) -> Result<TextLayout> {
        if !(style.font_size.is_finite() && style.font_size > 0.0) {
            return Err(PosterError::Render(format!(
                "font size must be positive, got {}",
                style.font_size
            )));
        }

        let (width, height) = style.page.to_points();
        let usable_width = width - 2.0 * self.padding_pt;
        let usable_height = height - 2.0 * self.padding_pt;
        if usable_width <= 0.0 || usable_height <= 0.0 {
            return Err(PosterError::Render(
                "page is smaller than its padding".to_string(),
            ));
        }

        let chars_per_line =
            ((usable_width / (GLYPH_ADVANCE_EM * style.font_size)).floor() as usize).max(1);
        let lines_per_page =
            ((usable_height / (LINE_HEIGHT_EM * style.font_size)).floor() as usize).max(1);

        let lines = break_lines(&document_words(document), chars_per_line);
        debug!(
            "Typeset at {}pt: {} lines, {} chars/line, {} lines/page",
            style.font_size,
            lines.len(),
            chars_per_line,
            lines_per_page
        );

        Ok(TextLayout {
            lines,
            lines_per_page,
        })
    }

    fn page_content(&self, lines: &[Line], font_size: f64, page_height: f64) -> Content {
        let size = Object::Real(font_size as f32);
        let mut operations = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            let baseline = page_height
                - self.padding_pt
                - ASCENT_EM * font_size
                - i as f64 * LINE_HEIGHT_EM * font_size;

            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Td",
                vec![
                    Object::Real(self.padding_pt as f32),
                    Object::Real(baseline as f32),
                ],
            ));
            for segment in line {
                let [r, g, b] = segment.style.rgb();
                operations.push(Operation::new(
                    "Tf",
                    vec![Object::Name(segment.style.font().into()), size.clone()],
                ));
                operations.push(Operation::new(
                    "rg",
                    vec![Object::Real(r), Object::Real(g), Object::Real(b)],
                ));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::String(
                        encode_win_ansi(&segment.text),
                        StringFormat::Literal,
                    )],
                ));
            }
            operations.push(Operation::new("ET", vec![]));
        }

        Content { operations }
    }

    fn write_pdf(&self, layout: &TextLayout, style: &StyleConfig) -> Result<Vec<u8>> {
        let (width, height) = style.page.to_points();
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                REGULAR_FONT => regular_id,
                BOLD_FONT => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        let blank: &[Line] = &[];
        let pages: Vec<&[Line]> = if layout.lines.is_empty() {
            vec![blank]
        } else {
            layout.lines.chunks(layout.lines_per_page).collect()
        };

        for page_lines in pages {
            let content = self.page_content(page_lines, style.font_size, height);
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(width as f32),
                Object::Real(height as f32),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

impl RenderingOracle for TypesetRenderer {
    fn measure(&self, document: &PosterDocument, style: &StyleConfig) -> Result<usize> {
        Ok(self.layout(document, style)?.page_count())
    }

    fn render(&self, document: &PosterDocument, style: &StyleConfig) -> Result<Vec<u8>> {
        let layout = self.layout(document, style)?;
        self.write_pdf(&layout, style)
    }
}
