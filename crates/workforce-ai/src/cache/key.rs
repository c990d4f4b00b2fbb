//! Helpers for composing per-parameter cache keys under one logical kind.
//!
//! Keys are plain strings; keeping distinct kinds from colliding is up to the
//! caller.

/// Lowercases and collapses all whitespace runs to a single space.
pub fn normalize_parameter(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Appends the normalized `parameter` to `base` as `base:parameter`. A blank
/// parameter yields `base` unchanged.
pub fn compose_key(base: &str, parameter: &str) -> String {
    let normalized = normalize_parameter(parameter);
    if normalized.is_empty() {
        base.to_string()
    } else {
        format!("{base}:{normalized}")
    }
}
