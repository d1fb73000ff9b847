use std::borrow::Cow;
use std::path::MAIN_SEPARATOR;

/// How path strings are compared against each other.
///
/// Resolved once per run (usually via [`CaseSensitivity::host`]) and passed
/// to every component that compares paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaseSensitivity {
    Sensitive,
    Insensitive,
}

impl CaseSensitivity {
    /// Filesystem convention of the platform this binary was built for.
    pub fn host() -> Self {
        if cfg!(any(target_os = "macos", target_os = "windows")) {
            Self::Insensitive
        } else {
            Self::Sensitive
        }
    }

    pub fn is_insensitive(self) -> bool {
        matches!(self, Self::Insensitive)
    }

    /// Comparison form of `path`. Never used for output.
    pub fn normalize(self, path: &str) -> Cow<'_, str> {
        match self {
            Self::Sensitive => Cow::Borrowed(path),
            Self::Insensitive => Cow::Owned(path.to_lowercase()),
        }
    }

    /// Returns the part of `path` following `root` when `root` is a
    /// directory-boundary prefix of it. The returned slice keeps the casing
    /// of `path`.
    ///
    /// `/a/b` is a prefix of `/a/b` and `/a/b/c` but not of `/a/bc`. Trailing
    /// separators on `root` are ignored, and a root made only of separators
    /// matches nothing but itself.
    pub fn strip_dir_prefix<'p>(self, path: &'p str, root: &str) -> Option<&'p str> {
        let trimmed = root.trim_end_matches(is_separator);
        if trimmed.is_empty() {
            return (!root.is_empty() && path == root).then_some("");
        }
        let rest = match self {
            Self::Sensitive => path.strip_prefix(trimmed)?,
            Self::Insensitive => strip_prefix_folded(path, trimmed)?,
        };
        if rest.is_empty() || rest.starts_with(is_separator) {
            Some(rest)
        } else {
            None
        }
    }
}

pub fn is_separator(c: char) -> bool {
    c == '/' || c == MAIN_SEPARATOR
}

fn strip_prefix_folded<'p>(path: &'p str, prefix: &str) -> Option<&'p str> {
    let mut chars = path.char_indices();
    for expected in prefix.chars() {
        let (_, actual) = chars.next()?;
        if actual != expected && !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    let offset = chars.next().map_or(path.len(), |(index, _)| index);
    Some(&path[offset..])
}

#[cfg(test)]
mod tests {
    use super::*;

    use CaseSensitivity::{Insensitive, Sensitive};

    #[test]
    fn normalize_is_identity_when_sensitive() {
        assert!(matches!(Sensitive.normalize("/Users/Me"), Cow::Borrowed("/Users/Me")));
        assert_eq!(Insensitive.normalize("/Users/Me"), "/users/me");
    }

    #[test]
    fn boundary_rules() {
        assert_eq!(Sensitive.strip_dir_prefix("/a/b", "/a/b"), Some(""));
        assert_eq!(Sensitive.strip_dir_prefix("/a/b/c.md", "/a/b"), Some("/c.md"));
        assert_eq!(Sensitive.strip_dir_prefix("/a/bc/d", "/a/b"), None);
        assert_eq!(Sensitive.strip_dir_prefix("/a/b/c", "/a/b/"), Some("/c"));
        assert_eq!(Sensitive.strip_dir_prefix("/a/bc", "/a/b/"), None);
        assert_eq!(Sensitive.strip_dir_prefix("/a", "/a/b"), None);
        assert_eq!(Sensitive.strip_dir_prefix("/a/b", ""), None);
    }

    #[test]
    fn bare_root_only_matches_itself() {
        assert_eq!(Sensitive.strip_dir_prefix("/", "/"), Some(""));
        assert_eq!(Sensitive.strip_dir_prefix("/home/u/x.md", "/"), None);
        assert_eq!(Insensitive.strip_dir_prefix("/home/u/x.md", "//"), None);
    }

    #[test]
    fn folded_prefix_keeps_original_casing() {
        assert_eq!(Sensitive.strip_dir_prefix("/users/me/proj/F.go", "/Users/Me/Proj"), None);
        assert_eq!(
            Insensitive.strip_dir_prefix("/users/me/proj/F.go", "/Users/Me/Proj"),
            Some("/F.go")
        );
        assert_eq!(
            Insensitive.strip_dir_prefix("/USERS/ME/PROJ-x/f.go", "/Users/Me/Proj"),
            None
        );
    }

    #[test]
    fn folded_prefix_handles_non_ascii() {
        assert_eq!(
            Insensitive.strip_dir_prefix("/Ärger/ÖL/x", "/ärger/öl"),
            Some("/x")
        );
    }
}
