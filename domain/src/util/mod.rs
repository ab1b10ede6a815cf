//! Small text helpers shared across the domain.

pub mod payload;

/// Truncate to at most `max` characters, appending "..." when cut.
pub fn truncate_str(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
