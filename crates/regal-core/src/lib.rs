pub mod config;
pub mod error;
pub mod extraction;
pub mod model;
pub mod parsing;
pub mod views;

use config::ParserConfig;
use error::RegalError;
use extraction::color::build_color_map;
use extraction::table::reconstruct_rows;
use extraction::{PageContent, PdfExtractor};
use model::{ParsedReport, Regal};
use std::path::Path;

/// Main API entry point: extract every shelf record from an inspection
/// report PDF.
///
/// Pages are processed one after another; shelves are returned in page
/// order, then row order. The only failures are those of the extraction
/// backend.
pub fn parse_report(
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
    config: &ParserConfig,
) -> Result<ParsedReport, RegalError> {
    let pages = extractor.extract_pages(pdf_bytes)?;
    tracing::debug!(
        backend = extractor.backend_name(),
        pages = pages.len(),
        "extracted report"
    );
    Ok(parse_pages(&pages, config))
}

/// Read a report from disk and parse it, recording the file name.
pub fn parse_report_file(
    path: &Path,
    extractor: &dyn PdfExtractor,
    config: &ParserConfig,
) -> Result<ParsedReport, RegalError> {
    let pdf_bytes = std::fs::read(path)?;
    let mut report = parse_report(&pdf_bytes, extractor, config)?;
    report.source_file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    Ok(report)
}

/// Assemble shelf records from already extracted pages.
pub fn parse_pages(pages: &[PageContent], config: &ParserConfig) -> ParsedReport {
    let mut regale = Vec::new();
    for page in pages {
        regale.extend(parse_page(page, config));
    }
    ParsedReport {
        source_file: None,
        regale,
    }
}

/// Shelf records of a single page. Colour map and rows live only for the
/// duration of this call.
pub fn parse_page(page: &PageContent, config: &ParserConfig) -> Vec<Regal> {
    let colors = build_color_map(&page.ops);
    let rows = reconstruct_rows(&page.fragments, config);

    let regale: Vec<Regal> = rows
        .iter()
        .filter_map(|row| parsing::parse_row(row, &colors, config))
        .collect();

    tracing::debug!(
        page = page.page_number,
        colored_texts = colors.len(),
        rows = rows.len(),
        regale = regale.len(),
        "parsed page"
    );

    regale
}
