// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node names and dag paths.
//!
//! A dag path is the root marker followed by every ancestor name and the
//! node name, all separated by `|`: `|parent|child`.

use regex::Regex;

/// Separator between dag path segments; a leading one marks the root
pub const PATH_SEPARATOR: char = '|';

/// Separator between a node path and a port name
pub const PORT_SEPARATOR: char = '.';

/// Keywords of the host scripting language. These can never be used as-is.
pub const RESERVED_NAMES: [&str; 21] = [
    "break", "case", "default", "do", "else", "false", "float", "global", "for", "if", "in",
    "int", "matrix", "no", "proc", "string", "switch", "true", "vector", "while", "yes",
];

/// Remove every character that is not legal in a path segment.
///
/// Legal characters are ASCII alphanumerics, `_` and the namespace colon.
/// Leading digits are dropped as well. The result may be empty.
pub fn sanitize(name: &str) -> String {
    let legal: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == ':')
        .collect();
    legal.trim_start_matches(|c: char| c.is_ascii_digit()).to_string()
}

/// Whether the name is a reserved keyword
pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
}

/// Join a dag path (or name) with a child name.
///
/// The result is absolute only if `parent` is.
pub fn join(parent: &str, child: &str) -> String {
    let left = parent.trim_matches(PATH_SEPARATOR);
    let right = child.trim_matches(PATH_SEPARATOR);

    let mut path = String::with_capacity(left.len() + right.len() + 2);
    if parent.starts_with(PATH_SEPARATOR) {
        path.push(PATH_SEPARATOR);
    }
    if !left.is_empty() {
        path.push_str(left);
        path.push(PATH_SEPARATOR);
    }
    path.push_str(right);
    path
}

/// `foo12` → `foo`
pub fn strip_trailing_digits(name: &str) -> &str {
    name.trim_end_matches(|c: char| c.is_ascii_digit())
}

/// Translate a dag path pattern into an anchored regular expression.
///
/// - `name` → `^(?:.*\|)?name$` (any depth)
/// - `name*` → `^(?:.*\|)?name\w*$`
/// - `a|b` → `^(?:.*\|)?a\|b$`
/// - `|a|b` → `^\|a\|b$` (absolute)
pub fn pattern_to_regex(pattern: &str) -> String {
    let mut body = String::with_capacity(pattern.len() * 2);
    let mut buffer = [0u8; 4];
    for c in pattern.chars() {
        if c == '*' {
            body.push_str(r"\w*");
        } else {
            body.push_str(&regex::escape(c.encode_utf8(&mut buffer)));
        }
    }

    if pattern.starts_with(PATH_SEPARATOR) {
        format!("^{body}$")
    } else {
        format!(r"^(?:.*\|)?{body}$")
    }
}

/// Compiled dag path pattern.
///
/// An absent or empty pattern matches every path.
#[derive(Debug, Clone)]
pub struct DagPattern {
    regex: Option<Regex>,
}

impl DagPattern {
    /// Compile a pattern
    pub fn new(pattern: Option<&str>) -> Result<Self, regex::Error> {
        let regex = match pattern {
            Some(pattern) if !pattern.is_empty() => Some(Regex::new(&pattern_to_regex(pattern))?),
            _ => None,
        };
        Ok(Self { regex })
    }

    /// Whether the pattern matches a dag path
    pub fn matches(&self, path: &str) -> bool {
        self.regex.as_ref().map_or(true, |regex| regex.is_match(path))
    }
}

/// Build a predicate over dag paths from a pattern
pub fn pattern_to_predicate(pattern: Option<&str>) -> Result<DagPattern, regex::Error> {
    DagPattern::new(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("foo"), "foo");
        assert_eq!(sanitize("foo bar/baz"), "foobarbaz");
        assert_eq!(sanitize("ns:foo_1"), "ns:foo_1");
        assert_eq!(sanitize("|a|b"), "ab");
        assert_eq!(sanitize("12abc3"), "abc3");
        assert_eq!(sanitize("0"), "");
        assert_eq!(sanitize("!!"), "");
    }

    #[test]
    fn test_reserved() {
        assert!(is_reserved("int"));
        assert!(is_reserved("while"));
        assert!(!is_reserved("int1"));
        assert!(!is_reserved("transform"));
    }

    #[test]
    fn test_join() {
        assert_eq!(join("|a", "b"), "|a|b");
        assert_eq!(join("a", "b"), "a|b");
        assert_eq!(join("|a|", "|b"), "|a|b");
        assert_eq!(join("|", "b"), "|b");
        assert_eq!(join("", "b"), "b");
    }

    #[test]
    fn test_strip_trailing_digits() {
        assert_eq!(strip_trailing_digits("foo12"), "foo");
        assert_eq!(strip_trailing_digits("f1oo"), "f1oo");
    }

    #[test]
    fn test_pattern_to_regex() {
        assert_eq!(pattern_to_regex("name"), r"^(?:.*\|)?name$");
        assert_eq!(pattern_to_regex("name*"), r"^(?:.*\|)?name\w*$");
        assert_eq!(pattern_to_regex("a|b"), r"^(?:.*\|)?a\|b$");
        assert_eq!(pattern_to_regex("|a|b"), r"^\|a\|b$");
    }

    #[test]
    fn test_predicate_partial_and_absolute() {
        let partial = pattern_to_predicate(Some("B")).unwrap();
        assert!(partial.matches("|B"));
        assert!(partial.matches("|A|B"));
        assert!(!partial.matches("|AB"));
        assert!(!partial.matches("|B|C"));

        let absolute = pattern_to_predicate(Some("|B")).unwrap();
        assert!(absolute.matches("|B"));
        assert!(!absolute.matches("|A|B"));

        let nested = pattern_to_predicate(Some("A|B")).unwrap();
        assert!(nested.matches("|A|B"));
        assert!(nested.matches("|root|A|B"));
        assert!(!nested.matches("|XA|B"));
    }

    #[test]
    fn test_predicate_wildcard() {
        let pattern = pattern_to_predicate(Some("transform*")).unwrap();
        assert!(pattern.matches("|transform"));
        assert!(pattern.matches("|transform12"));
        assert!(!pattern.matches("|transform1|child"));
        assert!(!pattern.matches("|transform.tx"));
    }

    #[test]
    fn test_predicate_escapes_regex_characters() {
        let pattern = pattern_to_predicate(Some("a.b")).unwrap();
        assert!(pattern.matches("|a.b"));
        assert!(!pattern.matches("|axb"));
    }

    #[test]
    fn test_empty_pattern_matches_everything() {
        assert!(pattern_to_predicate(None).unwrap().matches("|anything|at|all"));
        assert!(pattern_to_predicate(Some("")).unwrap().matches("|x"));
    }
}
