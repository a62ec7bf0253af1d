// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dotted type namespaces (`containerBase.entity.dagNode.transform`).

/// Parent of a namespace, or `None` for a top-level namespace.
///
/// `org.foo.bar` → `org.foo`
pub fn namespace_parent(namespace: &str) -> Option<&str> {
    namespace.rsplit_once('.').map(|(parent, _)| parent)
}

/// Last segment of a namespace. `foo.bar` → `bar`, `foo` → `foo`.
pub fn namespace_leaf(namespace: &str) -> &str {
    namespace.rsplit_once('.').map_or(namespace, |(_, leaf)| leaf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_parent() {
        assert_eq!(namespace_parent("org.foo.bar"), Some("org.foo"));
        assert_eq!(namespace_parent("org"), None);
    }

    #[test]
    fn test_namespace_leaf() {
        assert_eq!(namespace_leaf("foo.bar"), "bar");
        assert_eq!(namespace_leaf("foo"), "foo");
    }
}
