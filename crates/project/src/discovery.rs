use std::collections::HashMap;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::workspace::{DiscoveryResult, Project, WorkspaceNode};

/// Marker file identifying a project directory.
pub const PROJECT_MARKER: &str = "grove.yml";
/// Directory holding a project's git worktrees.
pub const WORKTREES_DIR: &str = ".grove-worktrees";

const MAX_SCAN_DEPTH: usize = 4;
const SKIPPED_DIRS: &[&str] = &["node_modules", "target", "vendor"];

/// Errors raised while discovering workspaces.
/// 探索工作區時可能發生的錯誤。
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to read discovery snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse discovery snapshot {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to access search root {path}: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Source of the known projects and workspaces.
/// 提供已知專案與工作區的來源。
pub trait Discovery {
    fn discover(&self) -> Result<DiscoveryResult, DiscoveryError>;
}

/// Loads a previously serialised [`DiscoveryResult`] from a JSON file.
#[derive(Debug, Clone)]
pub struct SnapshotDiscovery {
    path: PathBuf,
}

impl SnapshotDiscovery {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Discovery for SnapshotDiscovery {
    fn discover(&self) -> Result<DiscoveryResult, DiscoveryError> {
        let contents = fs::read_to_string(&self.path).map_err(|source| DiscoveryError::Read {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| DiscoveryError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

/// Walks search roots looking for directories that carry a [`PROJECT_MARKER`].
/// 走訪搜尋根目錄，找出含有 [`PROJECT_MARKER`] 的專案資料夾。
///
/// A project nested under another project inherits its identifier as a
/// prefix (`parent_child`). Worktrees under [`WORKTREES_DIR`] become extra
/// workspaces of their project, and projects found inside a worktree are
/// prefixed with `project_worktree`.
#[derive(Debug, Clone)]
pub struct ScanDiscovery {
    roots: Vec<PathBuf>,
}

impl ScanDiscovery {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    fn scan(&self, dir: &Path, anchor: Option<&Anchor>, projects: &mut Vec<Project>) {
        // Inside a worktree the checkout root is the worktree workspace itself.
        let min_depth = usize::from(anchor.is_some());
        let mut found: Vec<PathBuf> = WalkDir::new(dir)
            .min_depth(min_depth)
            .max_depth(MAX_SCAN_DEPTH)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || is_candidate_dir(entry))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    debug!(error = %err, "skipping unreadable entry during discovery");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_dir())
            .filter(|entry| entry.path().join(PROJECT_MARKER).is_file())
            .map(DirEntry::into_path)
            .collect();
        // Parents sort before their children, so ancestors are always registered first.
        found.sort();

        let mut identifiers: HashMap<PathBuf, String> = HashMap::new();
        for project_dir in found {
            let Some(path) = path_string(&project_dir) else {
                continue;
            };
            let name = dir_name(&project_dir);
            let parent = project_dir
                .ancestors()
                .skip(1)
                .find_map(|ancestor| {
                    identifiers
                        .get(ancestor)
                        .map(|id| (ancestor.to_path_buf(), id.clone()))
                })
                .or_else(|| anchor.map(|a| (a.path.clone(), a.identifier.clone())));

            let identifier = match &parent {
                Some((_, prefix)) => format!("{prefix}_{name}"),
                None => name.clone(),
            };
            identifiers.insert(project_dir.clone(), identifier.clone());

            let mut root_node = WorkspaceNode::new(&name, &path, &identifier);
            if let Some(parent_path) = parent.as_ref().and_then(|(p, _)| path_string(p)) {
                root_node = root_node.with_parent(parent_path);
            }
            let mut project = Project::new(&name, &path);
            project.push_workspace(root_node);

            let mut worktrees = Vec::new();
            for worktree_dir in list_worktrees(&project_dir) {
                let Some(worktree_path) = path_string(&worktree_dir) else {
                    continue;
                };
                let worktree_name = dir_name(&worktree_dir);
                let worktree_id = format!("{identifier}_{worktree_name}");
                project.push_workspace(
                    WorkspaceNode::new(&worktree_name, worktree_path, &worktree_id)
                        .with_parent(&path),
                );
                worktrees.push(Anchor {
                    path: worktree_dir,
                    identifier: worktree_id,
                });
            }
            projects.push(project);

            for worktree in &worktrees {
                self.scan(&worktree.path, Some(worktree), projects);
            }
        }
    }
}

impl Default for ScanDiscovery {
    fn default() -> Self {
        Self::new(Vec::<PathBuf>::new())
    }
}

impl Discovery for ScanDiscovery {
    fn discover(&self) -> Result<DiscoveryResult, DiscoveryError> {
        let mut projects = Vec::new();
        for root in &self.roots {
            match fs::metadata(root) {
                Ok(meta) if meta.is_dir() => {}
                Ok(_) => {
                    warn!(root = %root.display(), "search root is not a directory; skipping");
                    continue;
                }
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    warn!(root = %root.display(), "search root does not exist; skipping");
                    continue;
                }
                Err(source) => {
                    return Err(DiscoveryError::Root {
                        path: root.clone(),
                        source,
                    })
                }
            }
            self.scan(root, None, &mut projects);
        }
        debug!(projects = projects.len(), "discovery scan finished");
        Ok(DiscoveryResult::new(projects))
    }
}

struct Anchor {
    path: PathBuf,
    identifier: String,
}

fn is_candidate_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    !name.starts_with('.') && !SKIPPED_DIRS.contains(&name.as_ref())
}

fn list_worktrees(project_dir: &Path) -> Vec<PathBuf> {
    let dir = project_dir.join(WORKTREES_DIR);
    let Ok(entries) = fs::read_dir(&dir) else {
        return Vec::new();
    };
    let mut worktrees: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    worktrees.sort();
    worktrees
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn path_string(path: &Path) -> Option<String> {
    match path.to_str() {
        Some(text) => Some(text.to_string()),
        None => {
            debug!(path = %path.display(), "skipping non UTF-8 workspace path");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn mark(dir: &Path) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(PROJECT_MARKER), "name: test\n").unwrap();
    }

    fn identifiers(result: &DiscoveryResult) -> Vec<String> {
        let mut ids: Vec<String> = result
            .workspaces()
            .map(|node| node.identifier.clone())
            .collect();
        ids.sort();
        ids
    }

    #[test]
    fn scan_builds_nested_identifiers() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        mark(&root.join("eco"));
        mark(&root.join("eco").join("api"));
        mark(&root.join("eco-tools"));
        fs::create_dir_all(root.join("plain")).unwrap();

        let result = ScanDiscovery::new([root]).discover().unwrap();
        assert_eq!(identifiers(&result), vec!["eco", "eco-tools", "eco_api"]);

        let api = result
            .workspaces()
            .find(|node| node.identifier == "eco_api")
            .unwrap();
        assert_eq!(
            api.parent_path.as_deref(),
            root.join("eco").to_str()
        );
    }

    #[test]
    fn scan_registers_worktrees_and_their_subprojects() {
        let tmp = tempdir().unwrap();
        let eco = tmp.path().join("eco");
        mark(&eco);
        let feature = eco.join(WORKTREES_DIR).join("feature");
        mark(&feature);
        mark(&feature.join("sub"));

        let result = ScanDiscovery::new([tmp.path()]).discover().unwrap();
        assert_eq!(
            identifiers(&result),
            vec!["eco", "eco_feature", "eco_feature_sub"]
        );
        let eco_project = result.projects.iter().find(|p| p.name == "eco").unwrap();
        assert_eq!(eco_project.workspaces.len(), 2);
    }

    #[test]
    fn scan_skips_hidden_and_build_dirs() {
        let tmp = tempdir().unwrap();
        mark(&tmp.path().join(".cache").join("proj"));
        mark(&tmp.path().join("node_modules").join("dep"));
        let result = ScanDiscovery::new([tmp.path()]).discover().unwrap();
        assert!(result.projects.is_empty());
    }

    #[test]
    fn missing_root_is_skipped() {
        let tmp = tempdir().unwrap();
        let result = ScanDiscovery::new([tmp.path().join("absent")])
            .discover()
            .unwrap();
        assert!(result.projects.is_empty());
    }

    #[test]
    fn snapshot_discovery_round_trips_json() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("discovery.json");
        fs::write(
            &path,
            r#"{"projects":[{"name":"w","path":"/w","workspaces":[{"name":"w","path":"/w","identifier":"eco_feat_sub"}]}]}"#,
        )
        .unwrap();
        let result = SnapshotDiscovery::new(&path).discover().unwrap();
        assert_eq!(result.workspace_count(), 1);
        assert_eq!(result.projects[0].workspaces[0].identifier, "eco_feat_sub");
    }

    #[test]
    fn snapshot_discovery_reports_parse_errors() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        let err = SnapshotDiscovery::new(&path).discover().unwrap_err();
        assert!(matches!(err, DiscoveryError::Parse { .. }));
    }
}
