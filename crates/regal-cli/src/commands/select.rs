use regal_core::extraction::native::LopdfExtractor;
use regal_core::views::{selection_from_report, ViewPayload};
use std::path::PathBuf;

use crate::output;

pub fn run(
    pdf_file: PathBuf,
    output_format: &str,
    config_file: Option<PathBuf>,
) -> Result<(), regal_core::error::RegalError> {
    let config = super::resolve_config(config_file.as_deref())?;
    let extractor = LopdfExtractor::new();
    let parsed = regal_core::parse_report_file(&pdf_file, &extractor, &config)?;
    let payload = ViewPayload::RegalAuswahl(selection_from_report(&parsed));

    match output_format {
        "table" => output::table::print_view(&payload),
        _ => output::json::print(&payload)?,
    }

    Ok(())
}
