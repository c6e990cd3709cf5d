pub mod color;
pub mod native;
pub mod table;

use crate::error::RegalError;
use serde::Serialize;

/// One piece of rendered text with its baseline origin in page space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedFragment {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

impl PositionedFragment {
    pub fn new(text: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintTarget {
    Fill,
    Stroke,
}

/// Element of a spaced text show: a glyph run or a kerning adjustment.
#[derive(Debug, Clone, PartialEq)]
pub enum TextPart {
    Text(String),
    Adjust(f32),
}

/// The drawing operations that matter for colour tracking, in stream order.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// An RGB colour with components in `[0, 1]`.
    SetColor {
        target: PaintTarget,
        r: f32,
        g: f32,
        b: f32,
    },
    ShowText {
        text: String,
    },
    ShowSpacedText {
        parts: Vec<TextPart>,
    },
}

impl DrawOp {
    /// Text a show operation puts on the page; kerning adjustments are dropped.
    pub fn shown_text(&self) -> Option<String> {
        match self {
            DrawOp::ShowText { text } => Some(text.clone()),
            DrawOp::ShowSpacedText { parts } => Some(
                parts
                    .iter()
                    .filter_map(|p| match p {
                        TextPart::Text(s) => Some(s.as_str()),
                        TextPart::Adjust(_) => None,
                    })
                    .collect(),
            ),
            DrawOp::SetColor { .. } => None,
        }
    }
}

/// Content extracted from a single page of a PDF.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    pub page_number: usize,
    pub fragments: Vec<PositionedFragment>,
    pub ops: Vec<DrawOp>,
}

/// Trait for PDF content extraction backends.
pub trait PdfExtractor: Send + Sync {
    /// Extract positioned text and drawing operations, one PageContent per
    /// page in ascending page order.
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, RegalError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spaced_text_drops_adjustments() {
        let op = DrawOp::ShowSpacedText {
            parts: vec![
                TextPart::Text("1".into()),
                TextPart::Adjust(-120.0),
                TextPart::Text("2".into()),
            ],
        };
        assert_eq!(op.shown_text().as_deref(), Some("12"));
    }

    #[test]
    fn test_set_color_shows_nothing() {
        let op = DrawOp::SetColor {
            target: PaintTarget::Fill,
            r: 1.0,
            g: 0.0,
            b: 0.0,
        };
        assert!(op.shown_text().is_none());
    }
}
