//! Timestamp parsing for temporal anchors
//!
//! Accepts `MM:SS` and `HH:MM:SS`, padded or not. Field ranges are not
//! checked, so `"99:99"` is 99 minutes plus 99 seconds.

/// Placeholder the backend emits for findings without a time anchor
pub const NOT_APPLICABLE: &str = "N/A";

/// Parse a timestamp into whole seconds.
///
/// Returns `None` for `"N/A"`, empty input, non-numeric groups, a group count
/// other than 2 or 3, and values that overflow.
pub fn parse_timestamp(text: &str) -> Option<u64> {
    let text = text.trim();
    if text.is_empty() || text.eq_ignore_ascii_case(NOT_APPLICABLE) {
        return None;
    }

    let mut groups = Vec::with_capacity(3);
    for part in text.split(':') {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        groups.push(part.parse::<u64>().ok()?);
    }

    match groups.as_slice() {
        [minutes, seconds] => minutes.checked_mul(60)?.checked_add(*seconds),
        [hours, minutes, seconds] => hours
            .checked_mul(3600)?
            .checked_add(minutes.checked_mul(60)?)?
            .checked_add(*seconds),
        _ => None,
    }
}

/// Start offset of an optional anchor, in seconds
pub fn anchor_offset(anchor: Option<&str>) -> Option<f64> {
    anchor.and_then(parse_timestamp).map(|secs| secs as f64)
}

/// Format seconds as `M:SS`, or `H:MM:SS` from one hour up
pub fn format_timestamp(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}
