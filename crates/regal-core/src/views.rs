//! Payloads of the remote processing pipeline and the selection view built
//! from a locally parsed report.
//!
//! The pipeline answers with a JSON document tagged by `view`: either a
//! flat shelf selection (`regal-auswahl`) or a nested inspection matrix
//! (`pruef-matrix`). Results are fetched by polling a job record.

use crate::error::RegalError;
use crate::model::ParsedReport;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view")]
pub enum ViewPayload {
    #[serde(rename = "regal-auswahl")]
    RegalAuswahl(SelectionView),
    #[serde(rename = "pruef-matrix")]
    PruefMatrix(PruefMatrixView),
}

impl ViewPayload {
    pub fn view_name(&self) -> &'static str {
        match self {
            ViewPayload::RegalAuswahl(_) => "regal-auswahl",
            ViewPayload::PruefMatrix(_) => "pruef-matrix",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionItem {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionView {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub items: Vec<SelectionItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BewertungTyp {
    Rot,
    Orange,
    #[serde(rename = "Grün")]
    Gruen,
    Grau,
}

/// Severity rating attached to an object or checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bewertung {
    pub typ: BewertungTyp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anzahl: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PruefStatus {
    Ok,
    Mangel,
    Kritisch,
    NichtGeprueft,
}

/// A single checkpoint of an inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pruefpunkt {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PruefStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bewertung: Option<Bewertung>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bemerkung: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegalObjekt {
    pub name: String,
    #[serde(default)]
    pub bewertungen: Vec<Bewertung>,
    #[serde(default)]
    pub pruefpunkte: Vec<Pruefpunkt>,
}

/// One shelf section, located by hall, area and shelf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegalAbschnitt {
    pub id: String,
    pub halle: String,
    pub bereich: String,
    pub regal: String,
    pub abschnitt: String,
    #[serde(default)]
    pub objekte: Vec<RegalObjekt>,
    #[serde(default)]
    pub pruefpunkte: Vec<Pruefpunkt>,
    #[serde(default)]
    pub infos: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixSchema {
    #[serde(default)]
    pub objekte: Vec<String>,
    #[serde(default)]
    pub bewertungen: Vec<String>,
    #[serde(default)]
    pub pruefpunkte: Vec<String>,
    #[serde(default, rename = "infoFelder")]
    pub info_felder: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PruefMatrixView {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub schema: MatrixSchema,
    #[serde(default)]
    pub abschnitte: Vec<RegalAbschnitt>,
}

/// Sections of one area within a hall.
#[derive(Debug)]
pub struct BereichGroup<'a> {
    pub bereich: &'a str,
    pub abschnitte: Vec<&'a RegalAbschnitt>,
}

#[derive(Debug)]
pub struct HalleGroup<'a> {
    pub halle: &'a str,
    pub bereiche: Vec<BereichGroup<'a>>,
}

impl PruefMatrixView {
    /// Sections nested by hall, then area, both in first-seen order.
    pub fn grouped(&self) -> Vec<HalleGroup<'_>> {
        let mut hallen: Vec<HalleGroup<'_>> = Vec::new();

        for abschnitt in &self.abschnitte {
            let halle_idx = match hallen.iter().position(|h| h.halle == abschnitt.halle) {
                Some(i) => i,
                None => {
                    hallen.push(HalleGroup {
                        halle: &abschnitt.halle,
                        bereiche: Vec::new(),
                    });
                    hallen.len() - 1
                }
            };
            let bereiche = &mut hallen[halle_idx].bereiche;
            match bereiche.iter_mut().find(|b| b.bereich == abschnitt.bereich) {
                Some(group) => group.abschnitte.push(abschnitt),
                None => bereiche.push(BereichGroup {
                    bereich: &abschnitt.bereich,
                    abschnitte: vec![abschnitt],
                }),
            }
        }

        hallen
    }
}

/// Parse a view payload returned by the processing pipeline.
pub fn parse_view_payload(json: &str) -> Result<ViewPayload, RegalError> {
    let trimmed = json.trim();
    if trimmed.is_empty() {
        return Err(RegalError::ViewPayload("empty payload".into()));
    }

    let value: serde_json::Value = serde_json::from_str(trimmed)?;
    let Some(object) = value.as_object() else {
        return Err(RegalError::ViewPayload("payload is not an object".into()));
    };

    match object.get("view").and_then(|v| v.as_str()) {
        Some("regal-auswahl") | Some("pruef-matrix") => {}
        Some(other) => {
            return Err(RegalError::ViewPayload(format!("unknown view '{other}'")));
        }
        None => {
            return Err(RegalError::ViewPayload("missing 'view' field".into()));
        }
    }

    Ok(serde_json::from_value(value)?)
}

/// Build a shelf selection from a parsed report. Item ids are the shelf's
/// position in the report.
pub fn selection_from_report(report: &ParsedReport) -> SelectionView {
    let items = report
        .regale
        .iter()
        .enumerate()
        .map(|(i, regal)| SelectionItem {
            id: i.to_string(),
            label: match &regal.code {
                Some(code) => format!("{} ({code})", regal.label),
                None => regal.label.clone(),
            },
        })
        .collect();

    let description = match &report.source_file {
        Some(file) => format!("{} Regale aus {file}", report.regale.len()),
        None => format!("{} Regale", report.regale.len()),
    };

    SelectionView {
        title: "Gefundene Regale".into(),
        description,
        items,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Done,
    Error,
}

/// Row of the job table the pipeline writes its result into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ViewPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// Keep polling.
    Pending,
    Done(ViewPayload),
    Failed(String),
}

impl JobRecord {
    pub fn outcome(self) -> JobOutcome {
        match self.status {
            JobStatus::Pending | JobStatus::Processing => JobOutcome::Pending,
            JobStatus::Done => match self.result {
                Some(payload) => JobOutcome::Done(payload),
                None => JobOutcome::Failed("job finished without a result".into()),
            },
            JobStatus::Error => JobOutcome::Failed(
                self.error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| "Unbekannter Fehler".into()),
            ),
        }
    }
}

/// Parse either a bare view payload or a polled job record wrapping one.
///
/// A document with a `status` field and no `view` field is read as a job
/// record; anything else must be a view payload.
pub fn parse_view_document(json: &str) -> Result<JobOutcome, RegalError> {
    let trimmed = json.trim();
    if trimmed.is_empty() {
        return parse_view_payload(trimmed).map(JobOutcome::Done);
    }

    let value: serde_json::Value = serde_json::from_str(trimmed)?;
    let is_job = value.get("status").is_some() && value.get("view").is_none();
    if is_job {
        let record: JobRecord = serde_json::from_value(value)?;
        return Ok(record.outcome());
    }

    parse_view_payload(trimmed).map(JobOutcome::Done)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColorEvidence, DefectColor, Issue, Regal};

    const MATRIX_JSON: &str = r#"{
        "view": "pruef-matrix",
        "title": "Prüfmatrix",
        "description": "Halle 1",
        "schema": {
            "objekte": ["Stütze vorn"],
            "bewertungen": ["Rot", "Orange", "Grün", "Grau"],
            "pruefpunkte": ["Anfahrschutz"],
            "infoFelder": ["Baujahr"]
        },
        "abschnitte": [
            {
                "id": "1", "halle": "H1", "bereich": "A", "regal": "R1", "abschnitt": "1",
                "objekte": [{"name": "Stütze vorn", "bewertungen": [{"typ": "Rot", "anzahl": 2}], "pruefpunkte": []}],
                "pruefpunkte": [{"name": "Anfahrschutz", "status": "nicht_geprueft"}],
                "infos": {"Baujahr": 2011, "Last": null}
            },
            {"id": "2", "halle": "H2", "bereich": "B", "regal": "R5", "abschnitt": "1"},
            {"id": "3", "halle": "H1", "bereich": "A", "regal": "R2", "abschnitt": "2"},
            {"id": "4", "halle": "H1", "bereich": "C", "regal": "R9", "abschnitt": "1"}
        ]
    }"#;

    #[test]
    fn test_parse_selection() {
        let payload = parse_view_payload(
            r#"{"view": "regal-auswahl", "title": "Regale", "description": "", "items": [{"id": "a", "label": "AB R1"}]}"#,
        )
        .unwrap();
        match payload {
            ViewPayload::RegalAuswahl(view) => {
                assert_eq!(view.items.len(), 1);
                assert_eq!(view.items[0].label, "AB R1");
            }
            other => panic!("unexpected view {}", other.view_name()),
        }
    }

    #[test]
    fn test_parse_matrix() {
        let ViewPayload::PruefMatrix(matrix) = parse_view_payload(MATRIX_JSON).unwrap() else {
            panic!("expected matrix");
        };
        assert_eq!(matrix.schema.info_felder, vec!["Baujahr"]);
        let first = &matrix.abschnitte[0];
        assert_eq!(first.objekte[0].bewertungen[0].typ, BewertungTyp::Rot);
        assert_eq!(first.objekte[0].bewertungen[0].anzahl, Some(2));
        assert_eq!(first.pruefpunkte[0].status, Some(PruefStatus::NichtGeprueft));
        assert_eq!(first.infos["Baujahr"], 2011);
        assert!(matrix.abschnitte[1].objekte.is_empty());
    }

    #[test]
    fn test_matrix_grouping_first_seen_order() {
        let ViewPayload::PruefMatrix(matrix) = parse_view_payload(MATRIX_JSON).unwrap() else {
            panic!("expected matrix");
        };
        let groups = matrix.grouped();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].halle, "H1");
        assert_eq!(groups[0].bereiche.len(), 2);
        assert_eq!(groups[0].bereiche[0].bereich, "A");
        assert_eq!(groups[0].bereiche[0].abschnitte.len(), 2);
        assert_eq!(groups[0].bereiche[1].bereich, "C");
        assert_eq!(groups[1].halle, "H2");
    }

    #[test]
    fn test_payload_errors() {
        assert!(matches!(
            parse_view_payload("   "),
            Err(RegalError::ViewPayload(_))
        ));
        assert!(matches!(
            parse_view_payload("[1, 2]"),
            Err(RegalError::ViewPayload(_))
        ));
        assert!(matches!(
            parse_view_payload(r#"{"title": "x"}"#),
            Err(RegalError::ViewPayload(_))
        ));
        assert!(matches!(
            parse_view_payload(r#"{"view": "liste"}"#),
            Err(RegalError::ViewPayload(_))
        ));
        assert!(matches!(
            parse_view_payload("{not json"),
            Err(RegalError::Json(_))
        ));
        assert!(matches!(
            parse_view_payload(r#"{"view": "regal-auswahl", "title": "x"}"#),
            Err(RegalError::Json(_))
        ));
    }

    #[test]
    fn test_selection_from_report() {
        let report = ParsedReport {
            source_file: Some("bericht.pdf".into()),
            regale: vec![
                Regal {
                    label: "AB R12".into(),
                    code: Some("001.11.2.33".into()),
                    issues: vec![Issue {
                        component: "Stütze vorn".into(),
                        color: DefectColor::Rot,
                        count: 1,
                        color_evidence: ColorEvidence::Direct,
                    }],
                },
                Regal {
                    label: "CD".into(),
                    code: None,
                    issues: vec![],
                },
            ],
        };
        let view = selection_from_report(&report);
        assert_eq!(view.description, "2 Regale aus bericht.pdf");
        assert_eq!(view.items[0].id, "0");
        assert_eq!(view.items[0].label, "AB R12 (001.11.2.33)");
        assert_eq!(view.items[1].label, "CD");

        let json = serde_json::to_value(ViewPayload::RegalAuswahl(view)).unwrap();
        assert_eq!(json["view"], "regal-auswahl");
    }

    #[test]
    fn test_job_outcomes() {
        let pending: JobRecord = serde_json::from_str(r#"{"status": "processing"}"#).unwrap();
        assert_eq!(pending.outcome(), JobOutcome::Pending);

        let failed: JobRecord = serde_json::from_str(r#"{"status": "error", "error": null}"#).unwrap();
        assert_eq!(failed.outcome(), JobOutcome::Failed("Unbekannter Fehler".into()));

        let empty_done: JobRecord = serde_json::from_str(r#"{"status": "done"}"#).unwrap();
        assert!(matches!(empty_done.outcome(), JobOutcome::Failed(_)));

        let done: JobRecord = serde_json::from_str(
            r#"{"status": "done", "result": {"view": "regal-auswahl", "title": "t", "items": []}}"#,
        )
        .unwrap();
        assert!(matches!(done.outcome(), JobOutcome::Done(ViewPayload::RegalAuswahl(_))));
    }

    #[test]
    fn test_view_document_accepts_payload_or_job() {
        let bare = parse_view_document(r#"{"view": "regal-auswahl", "title": "t", "items": []}"#)
            .unwrap();
        assert!(matches!(bare, JobOutcome::Done(ViewPayload::RegalAuswahl(_))));

        let job = parse_view_document(&format!(r#"{{"status": "done", "result": {MATRIX_JSON}}}"#))
            .unwrap();
        match job {
            JobOutcome::Done(ViewPayload::PruefMatrix(view)) => assert_eq!(view.abschnitte.len(), 4),
            other => panic!("unexpected outcome: {other:?}"),
        }

        let pending = parse_view_document(r#"{"status": "pending"}"#).unwrap();
        assert_eq!(pending, JobOutcome::Pending);

        let failed = parse_view_document(r#"{"status": "error", "error": "Timeout"}"#).unwrap();
        assert_eq!(failed, JobOutcome::Failed("Timeout".into()));

        assert!(matches!(
            parse_view_document("  "),
            Err(RegalError::ViewPayload(_))
        ));
        assert!(matches!(
            parse_view_document(r#"{"title": "x"}"#),
            Err(RegalError::ViewPayload(_))
        ));
    }
}
