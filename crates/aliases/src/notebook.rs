use std::cmp::Reverse;
use std::path::PathBuf;

use neogrove_settings::{expand_path, ExpandError, GroveConfig};

use crate::batch::{ResolveEvent, ResolveLog};
use crate::format::{relative_slash_path, ALIAS_PREFIX};
use crate::normalize::CaseSensitivity;
use crate::prefix::longest_prefix_match;

/// Notebook name whose aliases omit the name segment.
pub const DEFAULT_NOTEBOOK: &str = "default";

/// A configured notebook with its expanded, absolute root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookRoot {
    pub name: String,
    pub root_dir: String,
}

impl NotebookRoot {
    pub fn new(name: impl Into<String>, root_dir: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root_dir: root_dir.into(),
        }
    }

    fn render(&self, relative: &str) -> String {
        if self.name == DEFAULT_NOTEBOOK {
            format!("{ALIAS_PREFIX}nb:{relative}")
        } else {
            format!("{ALIAS_PREFIX}nb:{}:{relative}", self.name)
        }
    }
}

/// Notebook roots ordered from most to least specific.
#[derive(Debug, Clone, Default)]
pub struct NotebookSet {
    roots: Vec<NotebookRoot>,
}

impl NotebookSet {
    pub fn new(roots: impl IntoIterator<Item = NotebookRoot>) -> Self {
        let mut roots: Vec<NotebookRoot> = roots.into_iter().collect();
        roots.sort_by(|a, b| {
            (Reverse(a.root_dir.len()), &a.root_dir, &a.name)
                .cmp(&(Reverse(b.root_dir.len()), &b.root_dir, &b.name))
        });
        Self { roots }
    }

    /// Expands every `(name, raw_root)` pair. Entries that fail to expand are
    /// reported to `log` and left out.
    pub fn from_definitions<'d, I, E>(definitions: I, expand: E, log: &dyn ResolveLog) -> Self
    where
        I: IntoIterator<Item = (&'d str, &'d str)>,
        E: Fn(&str) -> Result<PathBuf, ExpandError>,
    {
        let mut roots = Vec::new();
        for (name, raw) in definitions {
            let reason = match expand(raw) {
                Ok(path) => match path.to_str() {
                    Some(root) => {
                        roots.push(NotebookRoot::new(name, root));
                        continue;
                    }
                    None => "expanded root is not valid UTF-8".to_string(),
                },
                Err(err) => err.to_string(),
            };
            log.record(ResolveEvent::NotebookSkipped {
                name,
                root_dir: raw,
                reason: &reason,
            });
        }
        Self::new(roots)
    }

    pub fn from_config(config: &GroveConfig, log: &dyn ResolveLog) -> Self {
        Self::from_definitions(config.notebook_definitions(), expand_path, log)
    }

    pub fn roots(&self) -> &[NotebookRoot] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Alias for `path` when it lies inside one of the notebooks.
    /// Root matching is exact-case.
    pub fn alias_for(&self, path: &str) -> Option<String> {
        let matched = longest_prefix_match(
            &self.roots,
            path,
            |root| root.root_dir.as_str(),
            CaseSensitivity::Sensitive,
        )?;
        let relative = relative_slash_path(&matched.candidate.root_dir, path)?;
        Some(matched.candidate.render(&relative))
    }
}
