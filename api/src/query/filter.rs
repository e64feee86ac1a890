//! Optional text filter semantics
//!
//! A filter applies only when its input has at least one non-whitespace
//! character. Matching is a case-sensitive substring test against the trimmed
//! input; nothing is case-folded.

/// The trimmed needle for a filter input, or `None` when no predicate applies
pub fn text_filter(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
