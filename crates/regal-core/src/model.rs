use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural components of a shelf bay, in the column order of the
/// summary table.
pub const COMPONENT_COLUMNS: [&str; 5] = [
    "Stütze vorn",
    "Stütze hinten",
    "Horizontale Strebe",
    "Diagonale Strebe 1",
    "Diagonale Strebe 2",
];

/// Colour of drawn text as classified from the content stream.
///
/// `Black` stands for every colour that is not one of the tracked
/// defect colours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemanticColor {
    Rot,
    Orange,
    #[serde(rename = "Grün")]
    Gruen,
    #[default]
    #[serde(rename = "black")]
    Black,
}

impl SemanticColor {
    /// The defect colour this maps to, or `None` for black.
    pub fn defect(self) -> Option<DefectColor> {
        match self {
            SemanticColor::Rot => Some(DefectColor::Rot),
            SemanticColor::Orange => Some(DefectColor::Orange),
            SemanticColor::Gruen => Some(DefectColor::Gruen),
            SemanticColor::Black => None,
        }
    }
}

impl fmt::Display for SemanticColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticColor::Rot => write!(f, "Rot"),
            SemanticColor::Orange => write!(f, "Orange"),
            SemanticColor::Gruen => write!(f, "Grün"),
            SemanticColor::Black => write!(f, "black"),
        }
    }
}

/// Severity colour attached to a defect count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefectColor {
    Rot,
    Orange,
    #[serde(rename = "Grün")]
    Gruen,
}

impl fmt::Display for DefectColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefectColor::Rot => write!(f, "Rot"),
            DefectColor::Orange => write!(f, "Orange"),
            DefectColor::Gruen => write!(f, "Grün"),
        }
    }
}

/// How the colour of an issue was determined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorEvidence {
    /// The count itself was drawn in a tracked colour.
    #[default]
    Direct,
    /// A neighbouring fragment in the same row carried the colour.
    Neighbor,
    /// No colour evidence; defaulted to Rot.
    Fallback,
}

impl ColorEvidence {
    pub fn is_direct(&self) -> bool {
        matches!(self, ColorEvidence::Direct)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub component: String,
    pub color: DefectColor,
    pub count: u64,
    #[serde(default, skip_serializing_if = "ColorEvidence::is_direct")]
    pub color_evidence: ColorEvidence,
}

/// A shelf unit and the defects reported for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Regal {
    pub label: String,
    pub code: Option<String>,
    pub issues: Vec<Issue>,
}

/// Per component and colour total of a shelf's issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueSummary {
    pub component: String,
    pub color: DefectColor,
    pub count: u64,
}

impl Regal {
    /// Merge issues sharing a component and colour, summing their counts.
    ///
    /// Components appear in the order they were first seen, and colours
    /// within a component likewise.
    pub fn summary(&self) -> Vec<IssueSummary> {
        let mut grouped: Vec<(&str, Vec<(DefectColor, u64)>)> = Vec::new();

        for issue in &self.issues {
            let idx = match grouped.iter().position(|(c, _)| *c == issue.component) {
                Some(i) => i,
                None => {
                    grouped.push((issue.component.as_str(), Vec::new()));
                    grouped.len() - 1
                }
            };
            let colors = &mut grouped[idx].1;
            match colors.iter_mut().find(|(color, _)| *color == issue.color) {
                Some((_, total)) => *total = total.saturating_add(issue.count),
                None => colors.push((issue.color, issue.count)),
            }
        }

        grouped
            .into_iter()
            .flat_map(|(component, colors)| {
                colors.into_iter().map(move |(color, count)| IssueSummary {
                    component: component.to_string(),
                    color,
                    count,
                })
            })
            .collect()
    }

    /// Sum of all counts on this shelf.
    pub fn total_count(&self) -> u64 {
        self.issues
            .iter()
            .fold(0u64, |acc, i| acc.saturating_add(i.count))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    pub regale: Vec<Regal>,
}
