//! Small numeric and text helpers shared by the scoring components.

/// Treat a missing or non-finite value as zero.
pub fn finite_or_zero(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Clamp into `[min, max]`, mapping NaN to `min`.
pub fn clamp_score(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.clamp(min, max)
}

/// Lowercased, trimmed copy used for every case-insensitive comparison.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Case-insensitive substring test. `haystack_lower` must already be lowercased.
/// Blank needles never match.
pub fn contains_term(haystack_lower: &str, needle: &str) -> bool {
    let needle = normalize(needle);
    !needle.is_empty() && haystack_lower.contains(&needle)
}
