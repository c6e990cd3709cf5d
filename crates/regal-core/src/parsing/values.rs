/// Parse a defect count cell.
///
/// Only pure ASCII digit strings (after trimming) are counts:
/// - "5" -> Some(5)
/// - " 12 " -> Some(12)
/// - "007" -> Some(7)
/// - "1.5", "-3", "5x", "" -> None
///
/// Digit strings too large for a u64 are not counts either.
pub fn parse_count(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match s.parse::<u64>() {
        Ok(n) => Some(n),
        Err(e) => {
            tracing::trace!(text = s, error = %e, "digit cell out of range, ignored");
            None
        }
    }
}
