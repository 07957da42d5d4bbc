// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

/// A single entry in the component tree, keyed by its dotted name
/// (`a.b.c`). Parent links aren't stored explicitly -- they're
/// inferred from the name on demand by [`parent_name`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub name: String,
    pub dependencies: Vec<String>,
    pub auto_depend: Vec<String>,
    pub replaces: Vec<String>,
    pub tri_state: bool,
    pub is_default: bool,
    pub is_installer: bool,
    pub installed: bool,
    pub sort_priority: i64,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            auto_depend: Vec::new(),
            replaces: Vec::new(),
            tri_state: false,
            is_default: false,
            is_installer: false,
            installed: false,
            sort_priority: 0,
        }
    }
}

/// The parent of `a.b.c` is `a.b`; a root name with no dot has no parent.
pub fn parent_name(name: &str) -> Option<&str> {
    name.rsplit_once('.').map(|(parent, _)| parent)
}

/// Strips a trailing version suffix (`foo-1.2.3` -> `foo`) the way
/// dependency edges do before comparing component identities.
pub fn strip_version_suffix(name: &str) -> &str {
    match name.rsplit_once('-') {
        Some((base, suffix)) if suffix.chars().next().is_some_and(|c| c.is_ascii_digit()) => base,
        _ => name,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parent_name_splits_on_last_dot() {
        assert_eq!(parent_name("a.b.c"), Some("a.b"));
        assert_eq!(parent_name("a"), None);
    }

    #[test]
    fn strip_version_suffix_only_strips_numeric_suffixes() {
        assert_eq!(strip_version_suffix("foo-1.2.3"), "foo");
        assert_eq!(strip_version_suffix("foo-bar"), "foo-bar");
        assert_eq!(strip_version_suffix("foo"), "foo");
    }
}
