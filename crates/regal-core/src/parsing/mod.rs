pub mod header;
pub mod values;

use crate::config::ParserConfig;
use crate::extraction::color::ColorMap;
use crate::extraction::table::Row;
use crate::extraction::PositionedFragment;
use crate::model::{ColorEvidence, DefectColor, Issue, Regal};
use header::{extract_code, extract_label, has_shelf_evidence};
use values::parse_count;

/// Parse one table row into a shelf record.
///
/// Returns None when the row carries no shelf label or yields no issues.
/// Counts are assigned to components by their position in the row: the
/// fragment at sorted index `i` belongs to column `(i - 1) / 2`; counts
/// outside the component catalog are dropped.
pub fn parse_row(row: &Row, colors: &ColorMap, config: &ParserConfig) -> Option<Regal> {
    let mut sorted: Vec<&PositionedFragment> = row.iter().collect();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x));

    let row_text = sorted
        .iter()
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    if !has_shelf_evidence(&row_text) {
        tracing::trace!(row = %row_text, "row rejected: no shelf label");
        return None;
    }

    let label = extract_label(&row_text)?;
    let code = extract_code(&row_text);

    let mut issues = Vec::new();
    for (i, fragment) in sorted.iter().enumerate() {
        let text = fragment.text.trim();
        let Some(count) = parse_count(text) else {
            continue;
        };

        let (color, color_evidence) = resolve_color(&sorted, i, text, colors, config);

        let Some(component) = component_for_position(i, config) else {
            tracing::trace!(row = %row_text, position = i, count, "count outside component columns, dropped");
            continue;
        };

        if color_evidence == ColorEvidence::Fallback {
            tracing::trace!(row = %row_text, component, count, "no colour evidence, assuming Rot");
        }

        issues.push(Issue {
            component: component.to_string(),
            color,
            count,
            color_evidence,
        });
    }

    if issues.is_empty() {
        tracing::trace!(row = %row_text, "row rejected: no issues");
        return None;
    }

    Some(Regal {
        label,
        code,
        issues,
    })
}

/// Colour for the count at `index`: its own entry first, then the fragment
/// itself and up to `color_lookahead` following fragments by their raw
/// text, falling back to Rot.
fn resolve_color(
    sorted: &[&PositionedFragment],
    index: usize,
    trimmed: &str,
    colors: &ColorMap,
    config: &ParserConfig,
) -> (DefectColor, ColorEvidence) {
    if let Some(color) = colors.get(trimmed) {
        return (color, ColorEvidence::Direct);
    }

    let window_end = index
        .saturating_add(config.color_lookahead)
        .saturating_add(1)
        .min(sorted.len());
    for (j, candidate) in sorted[index..window_end].iter().enumerate() {
        if let Some(color) = colors.get(&candidate.text) {
            let evidence = if j == 0 {
                ColorEvidence::Direct
            } else {
                ColorEvidence::Neighbor
            };
            return (color, evidence);
        }
    }

    (DefectColor::Rot, ColorEvidence::Fallback)
}

fn component_for_position(index: usize, config: &ParserConfig) -> Option<&str> {
    let column = index.checked_sub(1)? / 2;
    config.components.get(column).map(|s| s.as_str())
}
