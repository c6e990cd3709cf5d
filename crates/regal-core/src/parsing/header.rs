use regex::Regex;
use std::sync::LazyLock;

// Character classes are spelled out as ASCII ranges: `\d` would also
// accept non-ASCII digits.
static SHELF_EVIDENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]{2,}|R\s*[0-9]+").expect("valid regex"));

static LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z\s]+(?:R\s*[0-9]+)?[A-Z\s0-9]*)").expect("valid regex")
});

static CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{3}\.[0-9]{2}\.[0-9]\.[0-9]{2}").expect("valid regex"));

/// Whether the row text names a shelf at all: an uppercase run of two or
/// more letters, or an `R` followed by digits.
pub fn has_shelf_evidence(row_text: &str) -> bool {
    SHELF_EVIDENCE.is_match(row_text)
}

/// Extract the shelf label from the start of the row text.
///
/// The label pattern also accepts digits after the shelf number, so it can
/// run into the leading digits of the location code; when it does, the
/// label is cut where the code starts.
pub fn extract_label(row_text: &str) -> Option<String> {
    let captured = LABEL.captures(row_text)?.get(1)?;

    let end = match CODE.find(row_text) {
        Some(code) if code.start() < captured.end() => code.start(),
        _ => captured.end(),
    };

    Some(row_text[captured.start()..end].trim().to_string())
}

/// Location code in the form `DDD.DD.D.DD`, anywhere in the row.
pub fn extract_code(row_text: &str) -> Option<String> {
    CODE.find(row_text).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shelf_evidence() {
        assert!(has_shelf_evidence("AB 5 4"));
        assert!(has_shelf_evidence("12 R 7 3"));
        assert!(has_shelf_evidence("R12"));
        assert!(!has_shelf_evidence("12 34 56"));
        assert!(!has_shelf_evidence("A 1 2"));
        assert!(!has_shelf_evidence("ab r12"));
    }

    #[test]
    fn test_label_stops_at_code() {
        assert_eq!(
            extract_label("AB R12 001.11.2.33 5 10 3").as_deref(),
            Some("AB R12")
        );
    }

    #[test]
    fn test_label_without_code_keeps_trailing_digits() {
        assert_eq!(extract_label("HALLE R 4 7 2").as_deref(), Some("HALLE R 4 7 2"));
        // uppercase letters after the number are swallowed up to the first
        // character outside the class
        assert_eq!(extract_label("AB R3 Stütze").as_deref(), Some("AB R3 St"));
    }

    #[test]
    fn test_label_must_lead() {
        assert_eq!(extract_label("12 AB R3"), None);
        assert_eq!(extract_label("R12 3"), Some("R12 3".into()));
    }

    #[test]
    fn test_label_cut_to_nothing_by_leading_code() {
        assert_eq!(extract_label(" 001.11.2.33 R5").as_deref(), Some(""));
    }

    #[test]
    fn test_extract_code() {
        assert_eq!(
            extract_code("AB R12 001.11.2.33 5").as_deref(),
            Some("001.11.2.33")
        );
        assert_eq!(extract_code("AB R12 01.11.2.33"), None);
        assert_eq!(extract_code("AB R12"), None);
    }
}
