//! Centralized validation and helper functions.

/// Smallest number a draw or query cell may hold
pub const MIN_NUMBER: u8 = 1;

/// Largest number a draw or query cell may hold
pub const MAX_NUMBER: u8 = 99;

/// Maximum number of draws allowed in a single history (DOS protection)
pub const MAX_DRAWS: usize = 1_000_000;

/// Maximum size of a history file's text, after decompression (DOS protection)
pub const MAX_HISTORY_BYTES: u64 = 512 * 1024 * 1024;

/// Maximum number of cells in one query row
pub const MAX_ROW_CELLS: usize = 20;

/// Check that a value is a valid draw number (1..=99).
///
/// # Examples
///
/// ```
/// use draw_solver::utils::validation::is_valid_number;
///
/// assert!(is_valid_number(1));
/// assert!(is_valid_number(99));
/// assert!(!is_valid_number(0));
/// assert!(!is_valid_number(100));
/// ```
#[must_use]
pub fn is_valid_number(value: u8) -> bool {
    (MIN_NUMBER..=MAX_NUMBER).contains(&value)
}

/// Parse a trimmed decimal string into a draw number.
/// Returns None if the text is not an integer in 1..=99.
#[must_use]
pub fn parse_number(s: &str) -> Option<u8> {
    let trimmed = s.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<u8>().ok().filter(|&n| is_valid_number(n))
}

/// Check if adding another draw would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new draw.
/// Returns an error message if adding would exceed the limit, None if safe to add.
#[must_use]
pub fn check_draw_limit(count: usize) -> Option<String> {
    if count >= MAX_DRAWS {
        Some(format!(
            "Too many draws: adding another would exceed maximum of {MAX_DRAWS}"
        ))
    } else {
        None
    }
}

/// Check whether a path names a gzip-compressed file
#[must_use]
pub fn is_gzipped(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz") || e.eq_ignore_ascii_case("bgz"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("7"), Some(7));
        assert_eq!(parse_number(" 42 "), Some(42));
        assert_eq!(parse_number("07"), Some(7));
        assert_eq!(parse_number("0"), None);
        assert_eq!(parse_number("100"), None);
        assert_eq!(parse_number("-3"), None);
        assert_eq!(parse_number("+3"), None);
        assert_eq!(parse_number("3.0"), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("999999999999"), None);
    }

    #[test]
    fn test_check_draw_limit() {
        assert!(check_draw_limit(0).is_none());
        assert!(check_draw_limit(MAX_DRAWS - 1).is_none());
        assert!(check_draw_limit(MAX_DRAWS).is_some());
    }

    #[test]
    fn test_is_gzipped() {
        assert!(is_gzipped(Path::new("draws.json.gz")));
        assert!(is_gzipped(Path::new("draws.CSV.GZ")));
        assert!(!is_gzipped(Path::new("draws.json")));
        assert!(!is_gzipped(Path::new("draws")));
    }
}
