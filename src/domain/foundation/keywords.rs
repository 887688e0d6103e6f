//! Case-insensitive keyword matching.
//!
//! Every keyword-driven decision in the pipeline (stage triggers, regional
//! lookup, sentiment, parental tags) uses these helpers so that matching
//! semantics stay identical: lowercase both sides, plain substring search.

/// Returns true if `text` contains any of `keywords` (case-insensitive substring).
///
/// Empty keywords never match.
pub fn contains_any<S: AsRef<str>>(text: &str, keywords: &[S]) -> bool {
    first_match(text, keywords).is_some()
}

/// Returns the first keyword (in list order) found in `text`.
pub fn first_match<'k, S: AsRef<str>>(text: &str, keywords: &'k [S]) -> Option<&'k str> {
    let lower = text.to_lowercase();
    keywords
        .iter()
        .map(AsRef::as_ref)
        .find(|keyword| !keyword.is_empty() && lower.contains(&keyword.to_lowercase()))
}
