//! Evidence grounding.
//!
//! A quote counts as grounded when, after light normalization, it is a
//! case-insensitive substring of the abstract. Normalization removes wrapping
//! quote marks, a leading dimension label (`"Domain: ..."`), leading or
//! trailing ellipses, and collapses whitespace.

const QUOTE_CHARS: &[char] = &['"', '\'', '\u{201c}', '\u{201d}', '\u{2018}', '\u{2019}', '`'];

const LABELS: &[&str] = &[
    "domain",
    "intervention",
    "method",
    "methods",
    "outcome",
    "outcomes",
    "exclusion",
    "title bonus",
    "title_bonus",
    "evidence",
    "quote",
];

fn collapse_lowercase(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn strip_ellipses(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("...")
        .or_else(|| text.strip_prefix('\u{2026}'))
        .unwrap_or(text);
    let text = text
        .strip_suffix("...")
        .or_else(|| text.strip_suffix('\u{2026}'))
        .unwrap_or(text);
    text.trim()
}

fn strip_label(text: &str) -> &str {
    if let Some((prefix, rest)) = text.split_once(':') {
        let label = prefix.trim().to_lowercase();
        if LABELS.contains(&label.as_str()) {
            return rest.trim();
        }
    }
    text
}

/// Normalized form used for matching. Empty when nothing is left.
pub fn normalize_quote(quote: &str) -> String {
    let text = quote.trim().trim_matches(QUOTE_CHARS).trim();
    let text = strip_label(text).trim_matches(QUOTE_CHARS);
    let text = strip_ellipses(text).trim_matches(QUOTE_CHARS);
    collapse_lowercase(strip_ellipses(text))
}

/// `true` if the quote is grounded in the abstract. Empty quotes are
/// vacuously grounded.
pub fn quote_in_abstract(quote: &str, abstract_text: &str) -> bool {
    let needle = normalize_quote(quote);
    needle.is_empty() || collapse_lowercase(abstract_text).contains(&needle)
}

/// Returns the quotes not found in the abstract, in their original form.
pub fn unverified_quotes(quotes: &[String], abstract_text: &str) -> Vec<String> {
    let haystack = collapse_lowercase(abstract_text);
    quotes
        .iter()
        .filter(|q| {
            let needle = normalize_quote(q);
            !needle.is_empty() && !haystack.contains(&needle)
        })
        .cloned()
        .collect()
}
