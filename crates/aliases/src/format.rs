use std::borrow::Cow;
use std::path::{Component, Path};

use neogrove_project::WorkspaceNode;

use crate::normalize::CaseSensitivity;

/// Prefix shared by every alias.
pub const ALIAS_PREFIX: &str = "@a:";

/// Path of `path` relative to `base`, joined with `/` whatever the host
/// separator is. Returns `.` when both are the same directory and `None`
/// when `path` is not below `base`.
pub fn relative_slash_path(base: &str, path: &str) -> Option<String> {
    let relative = Path::new(path).strip_prefix(Path::new(base)).ok()?;
    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => segments.push(segment.to_str()?),
            Component::ParentDir => segments.push(".."),
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if segments.is_empty() {
        Some(".".to_string())
    } else {
        Some(segments.join("/"))
    }
}

/// Turns a workspace identifier into its alias namespace (`a_b_c` → `a:b:c`).
pub fn alias_namespace(identifier: &str) -> String {
    identifier.replace('_', ":")
}

/// Renders `@a:<namespace>/<relative>` for `path` inside `node`.
///
/// When the comparison folds case, the matched prefix of `path` is replaced
/// with the node's own spelling before the relative path is computed.
/// Returns `None` when no relative path can be derived.
pub fn workspace_alias(node: &WorkspaceNode, path: &str, case: CaseSensitivity) -> Option<String> {
    let aligned: Cow<'_, str> = match case.strip_dir_prefix(path, &node.path) {
        Some(rest) if case.is_insensitive() => Cow::Owned(format!("{}{}", node.path, rest)),
        _ => Cow::Borrowed(path),
    };
    let relative = relative_slash_path(&node.path, &aligned)?;
    Some(format!(
        "{ALIAS_PREFIX}{}/{}",
        alias_namespace(node.identifier()),
        relative
    ))
}
