use regal_core::error::RegalError;
use regal_core::views::{parse_view_document, JobOutcome};
use std::path::PathBuf;

use crate::output;

/// Render a view payload, or the payload inside a finished job record.
pub fn run(input_file: PathBuf, output_format: &str) -> Result<(), RegalError> {
    let json = std::fs::read_to_string(&input_file)?;

    let payload = match parse_view_document(&json)? {
        JobOutcome::Done(payload) => payload,
        JobOutcome::Pending => {
            eprintln!("Job is still being processed, no result yet.");
            return Ok(());
        }
        JobOutcome::Failed(message) => return Err(RegalError::JobFailed(message)),
    };
    tracing::debug!(view = payload.view_name(), "loaded view payload");

    match output_format {
        "json" => output::json::print(&payload)?,
        _ => output::table::print_view(&payload),
    }

    Ok(())
}
