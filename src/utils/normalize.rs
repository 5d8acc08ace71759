//! Text normalization for case-insensitive dataset lookups.

/// Fold a name for stable comparison: trimmed, lowercase, single spaces.
pub(crate) fn fold(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize a country code for lookup: trimmed, ASCII upper case.
pub(crate) fn code(s: &str) -> String {
    s.trim().to_ascii_uppercase()
}

/// Whether `s` has the shape of an ISO 3166-1 alpha-2 or alpha-3 code.
pub(crate) fn looks_like_code(s: &str) -> bool {
    matches!(s.len(), 2 | 3) && s.bytes().all(|b| b.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_basic() {
        assert_eq!(fold("Western Europe"), "western europe");
        assert_eq!(fold("  NORTH   America "), "north america");
        assert_eq!(fold("Åland Islands"), "åland islands");
    }

    #[test]
    fn test_code() {
        assert_eq!(code(" fr "), "FR");
        assert_eq!(code("usa"), "USA");
    }

    #[test]
    fn test_looks_like_code() {
        assert!(looks_like_code("FR"));
        assert!(looks_like_code("fra"));
        assert!(!looks_like_code("France"));
        assert!(!looks_like_code("F1"));
        assert!(!looks_like_code("É"));
    }
}
