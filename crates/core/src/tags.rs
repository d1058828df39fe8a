//! Tech-stack tag parsing.
//!
//! Projects accept their tech stack as a single comma-separated string at
//! creation time and store it as an ordered list of trimmed tags.

/// Parse a comma-separated tech-stack string into an ordered tag list.
///
/// Each segment is whitespace-trimmed; empty segments (doubled commas,
/// trailing commas, all-whitespace input) are dropped. Order is preserved.
pub fn parse_tech_stack(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_and_trims() {
        assert_eq!(
            parse_tech_stack("Next.js, Supabase, Tailwind"),
            vec!["Next.js", "Supabase", "Tailwind"]
        );
    }

    #[test]
    fn test_preserves_order() {
        assert_eq!(
            parse_tech_stack("Rust,Postgres,Redis"),
            vec!["Rust", "Postgres", "Redis"]
        );
    }

    #[test]
    fn test_drops_empty_segments() {
        assert_eq!(parse_tech_stack("a,,b, ,c,"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        assert!(parse_tech_stack("").is_empty());
        assert!(parse_tech_stack("   ").is_empty());
        assert!(parse_tech_stack(",,,").is_empty());
    }

    #[test]
    fn test_single_tag() {
        assert_eq!(parse_tech_stack("  Axum  "), vec!["Axum"]);
    }
}
