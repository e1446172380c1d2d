//! `@handle` preference extraction from free-text descriptions (spec.md §4.4).
//!
//! Grounded in `original_source/internal/matcher/matcher.go`'s
//! `extractPreferences`. Matching is case-insensitive (Open Question
//! decision recorded in DESIGN.md): chat handles are case-insensitive in
//! practice, and the Go original's exact-case map lookup was a latent bug
//! rather than an intended behavior worth preserving.

use std::collections::HashSet;

use regex::Regex;
use std::sync::LazyLock;

static HANDLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(\w+)").expect("static regex is valid"));

/// The set of handles (lowercased, without the leading `@`) mentioned in
/// `about`. Empty if none are mentioned.
pub fn extract_handles(about: &str) -> HashSet<String> {
    HANDLE_PATTERN
        .captures_iter(about)
        .map(|c| c[1].to_lowercase())
        .collect()
}

/// True if `about` mentions `handle` (case-insensitive, without `@`).
pub fn mentions(about: &str, handle: &str) -> bool {
    extract_handles(about).contains(&handle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_multiple_distinct_handles() {
        let handles = extract_handles("into hiking, cooking. message @Alice or @bob!");
        assert_eq!(handles.len(), 2);
        assert!(handles.contains("alice"));
        assert!(handles.contains("bob"));
    }

    #[test]
    fn no_mentions_yields_empty_set() {
        assert!(extract_handles("no handles here").is_empty());
    }

    #[test]
    fn mentions_is_case_insensitive() {
        assert!(mentions("ping @Alice sometime", "alice"));
        assert!(mentions("ping @alice sometime", "ALICE"));
        assert!(!mentions("no mention", "alice"));
    }
}
