use regal_core::model::{ColorEvidence, ParsedReport};
use regal_core::views::{
    Bewertung, BewertungTyp, PruefMatrixView, PruefStatus, Pruefpunkt, SelectionView, ViewPayload,
};

pub fn print_report(report: &ParsedReport) {
    if let Some(ref name) = report.source_file {
        println!("=== {} ===\n", name);
    }

    if report.regale.is_empty() {
        println!("  No shelves with defects found.");
        return;
    }

    let max_component = report
        .regale
        .iter()
        .flat_map(|r| r.issues.iter())
        .map(|i| i.component.chars().count())
        .max()
        .unwrap_or(10);

    for regal in &report.regale {
        match regal.code {
            Some(ref code) => println!("  {} ({})  total {}", regal.label, code, regal.total_count()),
            None => println!("  {}  total {}", regal.label, regal.total_count()),
        }
        for entry in regal.summary() {
            println!(
                "    {:<width$}  {:<6} {:>4}",
                entry.component,
                entry.color.to_string(),
                entry.count,
                width = max_component
            );
        }
        println!();
    }

    println!("  {} shelf record(s)", report.regale.len());
    let fallback = fallback_count(report);
    if fallback > 0 {
        println!("  {fallback} count(s) without colour evidence, assumed Rot");
    }
}

/// Number of issues whose colour was not observed in the page drawing.
pub fn fallback_count(report: &ParsedReport) -> usize {
    report
        .regale
        .iter()
        .flat_map(|r| r.issues.iter())
        .filter(|i| i.color_evidence == ColorEvidence::Fallback)
        .count()
}

pub fn print_view(payload: &ViewPayload) {
    match payload {
        ViewPayload::RegalAuswahl(view) => print_selection(view),
        ViewPayload::PruefMatrix(view) => print_matrix(view),
    }
}

fn print_selection(view: &SelectionView) {
    println!("=== {} ===", view.title);
    if !view.description.is_empty() {
        println!("  {}", view.description);
    }
    println!();

    if view.items.is_empty() {
        println!("  (no entries)");
        return;
    }
    for item in &view.items {
        println!("  [{}] {}", item.id, item.label);
    }
}

fn print_matrix(view: &PruefMatrixView) {
    println!("=== {} ===", view.title);
    if !view.description.is_empty() {
        println!("  {}", view.description);
    }
    println!();

    for halle in view.grouped() {
        println!("Halle {}", halle.halle);
        for bereich in &halle.bereiche {
            println!("  Bereich {}", bereich.bereich);
            for abschnitt in &bereich.abschnitte {
                println!(
                    "    Regal {} / Abschnitt {}",
                    abschnitt.regal, abschnitt.abschnitt
                );
                for objekt in &abschnitt.objekte {
                    let ratings: Vec<String> = objekt.bewertungen.iter().map(rating).collect();
                    if ratings.is_empty() {
                        println!("      {}", objekt.name);
                    } else {
                        println!("      {}: {}", objekt.name, ratings.join(", "));
                    }
                    for punkt in &objekt.pruefpunkte {
                        print_pruefpunkt(punkt, 8);
                    }
                }
                for punkt in &abschnitt.pruefpunkte {
                    print_pruefpunkt(punkt, 6);
                }
                for field in &view.schema.info_felder {
                    if let Some(value) = abschnitt.infos.get(field) {
                        println!("      {}: {}", field, info_value(value));
                    }
                }
            }
        }
        println!();
    }
}

fn print_pruefpunkt(punkt: &Pruefpunkt, indent: usize) {
    let mut line = format!("{:indent$}- {}", "", punkt.name, indent = indent);
    if let Some(status) = punkt.status {
        line.push_str(&format!(" [{}]", status_label(status)));
    }
    if let Some(ref b) = punkt.bewertung {
        line.push_str(&format!(" {}", rating(b)));
    }
    if let Some(ref note) = punkt.bemerkung {
        line.push_str(&format!(" ({note})"));
    }
    println!("{line}");
}

fn rating(b: &Bewertung) -> String {
    let typ = match b.typ {
        BewertungTyp::Rot => "Rot",
        BewertungTyp::Orange => "Orange",
        BewertungTyp::Gruen => "Grün",
        BewertungTyp::Grau => "Grau",
    };
    match b.anzahl {
        Some(n) => format!("{typ} x{n}"),
        None => typ.to_string(),
    }
}

fn status_label(status: PruefStatus) -> &'static str {
    match status {
        PruefStatus::Ok => "ok",
        PruefStatus::Mangel => "Mangel",
        PruefStatus::Kritisch => "kritisch",
        PruefStatus::NichtGeprueft => "nicht geprüft",
    }
}

fn info_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
