//! SQL utility functions

/// Escape SQL LIKE metacharacters (%, _, \) in user input
///
/// Patterns built from this must be used with `ESCAPE '\'`.
///
/// ```
/// use weims_server::utils::sql::escape_like_pattern;
///
/// assert_eq!(escape_like_pattern("100% match_test"), "100\\% match\\_test");
/// ```
pub fn escape_like_pattern(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Substring pattern for `LIKE ? ESCAPE '\'`
pub fn contains_pattern(needle: &str) -> String {
    format!("%{}%", escape_like_pattern(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_pattern() {
        assert_eq!(escape_like_pattern("hello"), "hello");
        assert_eq!(escape_like_pattern("foo_bar"), "foo\\_bar");
        assert_eq!(escape_like_pattern("path\\file"), "path\\\\file");
        assert_eq!(escape_like_pattern("100%_\\test"), "100\\%\\_\\\\test");
        assert_eq!(escape_like_pattern(""), "");
    }

    #[test]
    fn test_contains_pattern() {
        assert_eq!(contains_pattern("50%"), "%50\\%%");
        assert_eq!(contains_pattern(""), "%%");
    }
}
