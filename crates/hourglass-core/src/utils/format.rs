/// Truncate a string to a maximum number of characters, adding an ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional string, returning a default if None or blank
pub fn display_or<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => default,
    }
}

/// Case-insensitive substring match
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Hello World", 8), "Hello...");
        assert_eq!(truncate("Hi", 2), "Hi");
        assert_eq!(truncate("Hello", 3), "Hel");
        assert_eq!(truncate("Événement", 6), "Évé...");
    }

    #[test]
    fn test_display_or() {
        assert_eq!(display_or(Some("Lab"), "-"), "Lab");
        assert_eq!(display_or(Some("  "), "-"), "-");
        assert_eq!(display_or(None, "-"), "-");
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Linear Algebra Midterm", "algebra"));
        assert!(!contains_ignore_case("Linear Algebra", "calculus"));
    }
}
