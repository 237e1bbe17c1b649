//! Person name normalization
//!
//! The same person is spelled slightly differently across role categories of
//! one export ("Matthew J. Christensen", "matthew christensen"). Comparisons go
//! through these helpers so every component agrees on what "same name" means.

/// Lowercase, replace punctuation with spaces, collapse whitespace.
///
/// ```
/// use estate_model::names::normalize_name;
///
/// assert_eq!(normalize_name("  Christensen,  Matthew J. "), "christensen matthew j");
/// ```
#[must_use]
pub fn normalize_name(s: &str) -> String {
    let stripped: String = s
        .chars()
        .flat_map(|c| {
            let keep = c.is_alphanumeric() || c == '\'' || c == '-';
            // Either the lowercase expansion or a single separator
            c.to_lowercase().filter(move |_| keep).chain((!keep).then_some(' '))
        })
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized name tokens
#[must_use]
pub fn name_tokens(s: &str) -> Vec<String> {
    normalize_name(s)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// First and last token of a normalized name, ignoring middle names
#[must_use]
pub fn first_last(s: &str) -> Option<(String, String)> {
    let tokens = name_tokens(s);
    match tokens.as_slice() {
        [first, .., last] => Some((first.clone(), last.clone())),
        _ => None,
    }
}

/// Whether two display names denote the same person.
///
/// Exact match after normalization, or same first and last name when either
/// side carries a middle name the other lacks.
#[must_use]
pub fn names_match(a: &str, b: &str) -> bool {
    let (na, nb) = (normalize_name(a), normalize_name(b));
    if na.is_empty() || nb.is_empty() {
        return false;
    }
    if na == nb {
        return true;
    }
    match (first_last(&na), first_last(&nb)) {
        (Some(fa), Some(fb)) => fa == fb,
        _ => false,
    }
}

/// Every word of `query` appears in `candidate` (normalized, order-free)
#[must_use]
pub fn tokens_contained(query: &str, candidate: &str) -> bool {
    let query = name_tokens(query);
    if query.is_empty() {
        return false;
    }
    let candidate = name_tokens(candidate);
    query.iter().all(|q| candidate.contains(q))
}
