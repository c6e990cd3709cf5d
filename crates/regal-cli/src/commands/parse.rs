use regal_core::extraction::native::LopdfExtractor;
use std::path::PathBuf;

use crate::output;

pub fn run(
    pdf_file: PathBuf,
    output_format: &str,
    output_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
) -> Result<(), regal_core::error::RegalError> {
    let config = super::resolve_config(config_file.as_deref())?;
    let extractor = LopdfExtractor::new();
    let parsed = regal_core::parse_report_file(&pdf_file, &extractor, &config)?;

    match output_file {
        Some(path) => {
            // Always write JSON when saving to file
            let json = serde_json::to_string_pretty(&parsed)?;
            std::fs::write(&path, json)?;
            eprintln!(
                "Parsed {} shelf record(s), written to {}",
                parsed.regale.len(),
                path.display()
            );
            let fallback = output::table::fallback_count(&parsed);
            if fallback > 0 {
                eprintln!("  {fallback} count(s) without colour evidence, assumed Rot");
            }
        }
        None => match output_format {
            "json" => output::json::print(&parsed)?,
            _ => output::table::print_report(&parsed),
        },
    }

    Ok(())
}
