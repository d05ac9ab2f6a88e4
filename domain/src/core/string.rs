//! String utilities for the domain layer.

/// Truncate to at most `max_chars` characters, appending `...` when cut.
///
/// Counts Unicode scalar values, so multi-byte text is never split.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &s[..end]),
        None => s.to_string(),
    }
}
