use crate::error::RegalError;
use crate::model::COMPONENT_COLUMNS;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Heuristic constants used while reading the summary table.
///
/// Every field has a default, so a config file only needs to name the
/// values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Text that opens the summary section on a page.
    pub section_marker: String,
    /// A fragment containing any of these ends the section (inclusive).
    pub end_markers: Vec<String>,
    /// Maximum vertical distance between fragments of one row.
    pub row_tolerance: f32,
    /// How many fragments after a count are searched for a colour.
    pub color_lookahead: usize,
    /// Component names, indexed by table column.
    pub components: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            section_marker: "Kurzbericht Regalprüfung".into(),
            end_markers: vec!["Seite".into(), "Ende".into()],
            row_tolerance: 5.0,
            color_lookahead: 2,
            components: COMPONENT_COLUMNS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Load a parser config from a JSON file.
pub fn load_config(path: &Path) -> Result<ParserConfig, RegalError> {
    let content = std::fs::read_to_string(path).map_err(|e| RegalError::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let config: ParserConfig =
        serde_json::from_str(&content).map_err(|e| RegalError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_config(&config)?;
    Ok(config)
}

/// Parse a parser config from a JSON string.
pub fn parse_config_str(json: &str) -> Result<ParserConfig, RegalError> {
    let config: ParserConfig = serde_json::from_str(json)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &ParserConfig) -> Result<(), RegalError> {
    if config.section_marker.trim().is_empty() {
        return Err(RegalError::ConfigInvalid(
            "section_marker must not be empty".into(),
        ));
    }

    if !config.row_tolerance.is_finite() || config.row_tolerance < 0.0 {
        return Err(RegalError::ConfigInvalid(format!(
            "row_tolerance must be a non-negative number, got {}",
            config.row_tolerance
        )));
    }

    if config.components.len() != COMPONENT_COLUMNS.len() {
        return Err(RegalError::ConfigInvalid(format!(
            "components must name exactly {} columns, got {}",
            COMPONENT_COLUMNS.len(),
            config.components.len()
        )));
    }

    if let Some(marker) = config.end_markers.iter().find(|m| m.is_empty()) {
        return Err(RegalError::ConfigInvalid(format!(
            "end marker {marker:?} would match every fragment"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ParserConfig::default();
        assert_eq!(config.section_marker, "Kurzbericht Regalprüfung");
        assert_eq!(config.row_tolerance, 5.0);
        assert_eq!(config.color_lookahead, 2);
        assert_eq!(config.components.len(), 5);
        assert_eq!(config.components[2], "Horizontale Strebe");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = parse_config_str(r#"{"row_tolerance": 3.5}"#).unwrap();
        assert_eq!(config.row_tolerance, 3.5);
        assert_eq!(config.end_markers, vec!["Seite", "Ende"]);
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        let err = parse_config_str(r#"{"row_tolerance": -1}"#).unwrap_err();
        assert!(matches!(err, RegalError::ConfigInvalid(_)));
    }

    #[test]
    fn test_empty_components_rejected() {
        assert!(parse_config_str(r#"{"components": []}"#).is_err());
    }

    #[test]
    fn test_component_count_must_match_columns() {
        let err = parse_config_str(r#"{"components": ["A", "B", "C"]}"#).unwrap_err();
        assert!(matches!(err, RegalError::ConfigInvalid(ref m) if m.contains("exactly 5")));

        let renamed = parse_config_str(r#"{"components": ["a", "b", "c", "d", "e"]}"#).unwrap();
        assert_eq!(renamed.components[4], "e");
    }

    #[test]
    fn test_large_lookahead_accepted() {
        let config = parse_config_str(r#"{"color_lookahead": 18446744073709551615}"#).unwrap();
        assert_eq!(config.color_lookahead, usize::MAX);
    }

    #[test]
    fn test_empty_end_marker_rejected() {
        assert!(parse_config_str(r#"{"end_markers": ["Seite", ""]}"#).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/nonexistent/regal.json")).unwrap_err();
        assert!(matches!(err, RegalError::Config { .. }));
    }
}
