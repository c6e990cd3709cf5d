use regal_core::extraction::color::build_color_map;
use regal_core::extraction::native::LopdfExtractor;
use regal_core::extraction::table::reconstruct_rows;
use regal_core::extraction::PdfExtractor;
use regal_core::parsing::parse_row;
use std::path::PathBuf;

pub fn run(
    pdf_file: PathBuf,
    only_page: Option<usize>,
    config_file: Option<PathBuf>,
) -> Result<(), regal_core::error::RegalError> {
    let config = super::resolve_config(config_file.as_deref())?;
    let pdf_bytes = std::fs::read(&pdf_file)?;
    let extractor = LopdfExtractor::new();
    let pages = extractor.extract_pages(&pdf_bytes)?;

    for page in pages
        .iter()
        .filter(|p| only_page.map_or(true, |n| p.page_number == n))
    {
        println!("=== Page {} ===\n", page.page_number);

        let colors = build_color_map(&page.ops);
        if colors.is_empty() {
            println!("  Colour map: (empty)");
        } else {
            println!("  Colour map:");
            for (text, color) in colors.sorted_entries() {
                println!("    {:<20} {}", format!("{text:?}"), color);
            }
        }
        println!();

        let rows = reconstruct_rows(&page.fragments, &config);
        if rows.is_empty() {
            println!("  No rows (section marker '{}' not found)\n", config.section_marker);
            continue;
        }

        for (i, row) in rows.iter().enumerate() {
            let cells: Vec<String> = row
                .iter()
                .map(|f| format!("{}@{:.1}", f.text, f.x))
                .collect();
            let y = row.first().map(|f| f.y).unwrap_or_default();
            let verdict = match parse_row(row, &colors, &config) {
                Some(regal) => format!("-> {} ({} issue(s))", regal.label, regal.issues.len()),
                None => "-> skipped".to_string(),
            };
            println!("  row {:>3} y={:<7.1} {}  {}", i + 1, y, cells.join(" | "), verdict);
        }
        println!();
    }

    Ok(())
}
