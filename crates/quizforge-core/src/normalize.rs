//! Text normalization for fill-in-blank comparison.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize free text for case- and accent-insensitive comparison.
///
/// Trims surrounding whitespace, lower-cases, decomposes to NFD and drops
/// combining marks, so `" Café "` and `"CAFE"` both become `"cafe"`.
pub fn normalize_answer(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Compare two answers after normalization.
pub fn answers_match(submitted: &str, canonical: &str) -> bool {
    normalize_answer(submitted) == normalize_answer(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_case_accents_and_whitespace() {
        assert_eq!(normalize_answer(" Café "), "cafe");
        assert_eq!(normalize_answer("CAFÉ"), "cafe");
        assert_eq!(normalize_answer("Żółć"), "zołc");
    }

    #[test]
    fn precomposed_and_decomposed_forms_match() {
        // U+00E9 vs 'e' + U+0301
        assert!(answers_match("caf\u{e9}", "cafe\u{301}"));
    }

    #[test]
    fn inner_whitespace_is_kept() {
        assert!(!answers_match("new york", "newyork"));
        assert!(answers_match("  New York\t", "new york"));
    }

    #[test]
    fn empty_input() {
        assert_eq!(normalize_answer("   "), "");
    }
}
