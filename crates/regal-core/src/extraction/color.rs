use crate::extraction::DrawOp;
use crate::model::{DefectColor, SemanticColor};
use std::collections::HashMap;

/// Classify an RGB colour (components in `[0, 1]`) into a semantic colour.
///
/// The checks run in a fixed order; the first match wins.
pub fn classify_rgb(r: f32, g: f32, b: f32) -> SemanticColor {
    if r > 0.8 && g < 0.3 && b < 0.3 {
        SemanticColor::Rot
    } else if r > 0.8 && g > 0.5 && b < 0.3 {
        SemanticColor::Orange
    } else if r < 0.3 && g > 0.6 && b < 0.3 {
        SemanticColor::Gruen
    } else {
        SemanticColor::Black
    }
}

/// Literal text drawn on a page, mapped to the defect colour it was
/// drawn in. Text drawn in black is never recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorMap {
    entries: HashMap<String, DefectColor>,
}

impl ColorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, text: &str) -> Option<DefectColor> {
        self.entries.get(text).copied()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.entries.contains_key(text)
    }

    /// Record a colour; a later draw of the same text overwrites it.
    pub fn insert(&mut self, text: impl Into<String>, color: DefectColor) {
        self.entries.insert(text.into(), color);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by text, for stable output.
    pub fn sorted_entries(&self) -> Vec<(&str, DefectColor)> {
        let mut entries: Vec<_> = self.entries.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl FromIterator<(String, DefectColor)> for ColorMap {
    fn from_iter<I: IntoIterator<Item = (String, DefectColor)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Walk a page's drawing operations and associate shown text with the
/// colour that was current when it was drawn.
///
/// Fill and stroke colour share a single cursor, which starts out black.
pub fn build_color_map(ops: &[DrawOp]) -> ColorMap {
    let mut map = ColorMap::new();
    let mut current = SemanticColor::Black;

    for op in ops {
        match op {
            DrawOp::SetColor { r, g, b, .. } => {
                current = classify_rgb(*r, *g, *b);
            }
            DrawOp::ShowText { .. } | DrawOp::ShowSpacedText { .. } => {
                let Some(color) = current.defect() else {
                    continue;
                };
                if let Some(text) = op.shown_text().filter(|t| !t.is_empty()) {
                    map.insert(text, color);
                }
            }
        }
    }

    tracing::trace!(entries = map.len(), "built colour map");
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::{PaintTarget, TextPart};

    fn fill(r: f32, g: f32, b: f32) -> DrawOp {
        DrawOp::SetColor {
            target: PaintTarget::Fill,
            r,
            g,
            b,
        }
    }

    fn stroke(r: f32, g: f32, b: f32) -> DrawOp {
        DrawOp::SetColor {
            target: PaintTarget::Stroke,
            r,
            g,
            b,
        }
    }

    fn show(text: &str) -> DrawOp {
        DrawOp::ShowText { text: text.into() }
    }

    #[test]
    fn test_classify_buckets() {
        assert_eq!(classify_rgb(1.0, 0.0, 0.0), SemanticColor::Rot);
        assert_eq!(classify_rgb(1.0, 0.65, 0.0), SemanticColor::Orange);
        assert_eq!(classify_rgb(0.0, 0.8, 0.0), SemanticColor::Gruen);
        assert_eq!(classify_rgb(0.0, 0.0, 0.0), SemanticColor::Black);
        assert_eq!(classify_rgb(1.0, 1.0, 1.0), SemanticColor::Black);
        assert_eq!(classify_rgb(0.0, 0.0, 1.0), SemanticColor::Black);
    }

    #[test]
    fn test_classify_thresholds_are_strict() {
        // r must exceed 0.8, not equal it
        assert_eq!(classify_rgb(0.8, 0.0, 0.0), SemanticColor::Black);
        // g of exactly 0.3 is neither red nor orange
        assert_eq!(classify_rgb(0.9, 0.3, 0.0), SemanticColor::Black);
        assert_eq!(classify_rgb(0.9, 0.5, 0.0), SemanticColor::Black);
        assert_eq!(classify_rgb(0.2, 0.6, 0.2), SemanticColor::Black);
        assert_eq!(classify_rgb(0.29, 0.61, 0.29), SemanticColor::Gruen);
    }

    #[test]
    fn test_classify_is_deterministic_over_grid() {
        let steps: Vec<f32> = (0..=10).map(|i| i as f32 / 10.0).collect();
        for &r in &steps {
            for &g in &steps {
                for &b in &steps {
                    let hits = [
                        r > 0.8 && g < 0.3 && b < 0.3,
                        r > 0.8 && g > 0.5 && b < 0.3,
                        r < 0.3 && g > 0.6 && b < 0.3,
                    ];
                    let expected = match hits.iter().position(|h| *h) {
                        Some(0) => SemanticColor::Rot,
                        Some(1) => SemanticColor::Orange,
                        Some(2) => SemanticColor::Gruen,
                        _ => SemanticColor::Black,
                    };
                    assert!(hits.iter().filter(|h| **h).count() <= 1);
                    assert_eq!(classify_rgb(r, g, b), expected);
                    assert_eq!(classify_rgb(r, g, b), classify_rgb(r, g, b));
                }
            }
        }
    }

    #[test]
    fn test_text_takes_most_recent_color() {
        let ops = vec![
            fill(1.0, 0.0, 0.0),
            show("5"),
            stroke(1.0, 0.6, 0.0),
            show("10"),
            fill(0.1, 0.9, 0.1),
            show("3"),
        ];
        let map = build_color_map(&ops);
        assert_eq!(map.get("5"), Some(DefectColor::Rot));
        assert_eq!(map.get("10"), Some(DefectColor::Orange));
        assert_eq!(map.get("3"), Some(DefectColor::Gruen));
    }

    #[test]
    fn test_black_text_not_recorded() {
        let ops = vec![show("AB"), fill(1.0, 0.0, 0.0), fill(0.0, 0.0, 0.0), show("7")];
        let map = build_color_map(&ops);
        assert!(map.is_empty());
    }

    #[test]
    fn test_last_write_wins() {
        let ops = vec![fill(1.0, 0.0, 0.0), show("2"), fill(0.0, 1.0, 0.0), show("2")];
        let map = build_color_map(&ops);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("2"), Some(DefectColor::Gruen));
    }

    #[test]
    fn test_spaced_text_joined_without_adjustments() {
        let ops = vec![
            fill(1.0, 0.7, 0.0),
            DrawOp::ShowSpacedText {
                parts: vec![
                    TextPart::Text("1".into()),
                    TextPart::Adjust(-40.0),
                    TextPart::Text("4".into()),
                ],
            },
        ];
        let map = build_color_map(&ops);
        assert_eq!(map.get("14"), Some(DefectColor::Orange));
    }

    #[test]
    fn test_empty_text_ignored() {
        let ops = vec![fill(1.0, 0.0, 0.0), show("")];
        assert!(build_color_map(&ops).is_empty());
    }
}
