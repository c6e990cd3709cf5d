use crate::config::ParserConfig;
use crate::extraction::PositionedFragment;

/// Fragments sharing (approximately) one baseline.
pub type Row = Vec<PositionedFragment>;

/// Reconstruct table rows from a page's positioned text fragments.
///
/// Fragments before the section marker are ignored, as is the marker
/// itself. Inside the section, a fragment starts a new row when its
/// vertical distance to the previous fragment exceeds the row tolerance.
/// Scanning stops after the first fragment containing an end marker; that
/// fragment still belongs to its row.
pub fn reconstruct_rows(fragments: &[PositionedFragment], config: &ParserConfig) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut in_section = false;
    let mut current: Row = Vec::new();
    let mut last_y: Option<f32> = None;

    for fragment in fragments {
        if fragment.text.contains(config.section_marker.as_str()) {
            in_section = true;
            continue;
        }

        if !in_section || fragment.text.trim().is_empty() {
            continue;
        }

        if let Some(y) = last_y {
            if (fragment.y - y).abs() > config.row_tolerance && !current.is_empty() {
                rows.push(std::mem::take(&mut current));
            }
        }

        current.push(fragment.clone());
        last_y = Some(fragment.y);

        if is_end_marker(&fragment.text, config) {
            break;
        }
    }

    if !current.is_empty() {
        rows.push(current);
    }

    if !in_section {
        tracing::trace!("section marker not found on page");
    }

    rows
}

fn is_end_marker(text: &str, config: &ParserConfig) -> bool {
    config
        .end_markers
        .iter()
        .any(|marker| text.contains(marker.as_str()))
}
