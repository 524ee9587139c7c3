//! Response extractors: one per raw payload format, all producing the
//! canonical `ChartResult`. Shared key normalization and failure-page
//! detection live here so the per-format extractors stay small.

pub mod html;
pub mod json;

pub use html::HtmlExtractor;
pub use json::ApiJsonExtractor;

use regex::Regex;

/// Property labels whose snake_case form differs from what the regex
/// default would produce, or that the site spells inconsistently.
const KEY_RENAMES: &[(&str, &str)] = &[
    ("inner authority", "authority"),
    ("energy type", "type"),
    ("aura type", "type"),
    ("not-self theme", "not_self_theme"),
    ("incarnation cross", "incarnation_cross"),
];

/// Normalize a scraped property label to lower_snake_case: fixed rename
/// table first, then a regex-based default.
pub(crate) fn normalize_key(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    for (from, to) in KEY_RENAMES {
        if lowered == *from {
            return (*to).to_string();
        }
    }

    match Regex::new(r"[^a-z0-9]+") {
        Ok(re) => re
            .replace_all(&lowered, "_")
            .trim_matches('_')
            .to_string(),
        Err(_) => lowered,
    }
}

/// Phrases in a page's visible text that mark a hard failure response.
const FAILURE_PHRASES: &[&str] = &[
    "something went wrong",
    "an error occurred",
    "an unexpected error",
    "page you requested could not be found",
    "temporarily unavailable",
    "service unavailable",
];

/// Returns the matched phrase when the visible text is a known failure
/// page. Matching is case-insensitive.
pub(crate) fn detect_failure_page(visible_text: &str) -> Option<&'static str> {
    let haystack = visible_text.to_lowercase();
    FAILURE_PHRASES
        .iter()
        .find(|phrase| haystack.contains(*phrase))
        .copied()
}
