use std::collections::HashMap;
use std::path::{Path, MAIN_SEPARATOR};

use serde::{Deserialize, Serialize};

/// A single discovered workspace (project root, worktree, or sub-project).
/// 探索到的單一工作區（專案根目錄、worktree 或子專案）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceNode {
    pub name: String,
    /// Absolute path with the casing observed during discovery.
    pub path: String,
    /// Namespaced identifier using `_` as the hierarchy separator,
    /// e.g. `ecosystem_feature_subproject`.
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_path: Option<String>,
}

impl WorkspaceNode {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            identifier: identifier.into(),
            parent_path: None,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_path = Some(parent.into());
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

/// A project together with the workspaces it owns. The project root itself is
/// the first workspace.
/// 專案與其擁有的工作區；專案根目錄為第一個工作區。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub workspaces: Vec<WorkspaceNode>,
}

impl Project {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            workspaces: Vec::new(),
        }
    }

    pub fn push_workspace(&mut self, node: WorkspaceNode) {
        self.workspaces.push(node);
    }
}

/// Output of a discovery pass.
/// 一次探索的結果。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryResult {
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl DiscoveryResult {
    pub fn new(projects: Vec<Project>) -> Self {
        Self { projects }
    }

    /// Iterates every workspace of every project in discovery order.
    pub fn workspaces(&self) -> impl Iterator<Item = &WorkspaceNode> {
        self.projects
            .iter()
            .flat_map(|project| project.workspaces.iter())
    }

    pub fn workspace_count(&self) -> usize {
        self.projects
            .iter()
            .map(|project| project.workspaces.len())
            .sum()
    }
}

/// Read-only lookup index over a [`DiscoveryResult`].
/// 由探索結果建立的唯讀查詢索引。
///
/// Lookups are exact string probes against the index. A path that is not a
/// workspace root itself is resolved by probing its ancestors from the
/// deepest one upwards, so the first hit is always the most specific
/// workspace and partial component matches (`/a/b` vs `/a/bc`) cannot occur.
#[derive(Debug, Clone, Default)]
pub struct Provider {
    by_path: HashMap<String, WorkspaceNode>,
}

impl Provider {
    pub fn new(result: &DiscoveryResult) -> Self {
        let mut by_path = HashMap::with_capacity(result.workspace_count());
        for node in result.workspaces() {
            let key = trim_trailing_separators(&node.path).to_string();
            // Earlier discoveries win when a path is reported twice.
            by_path.entry(key).or_insert_with(|| node.clone());
        }
        Self { by_path }
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// Returns the workspace registered exactly at `path`.
    pub fn get(&self, path: &str) -> Option<&WorkspaceNode> {
        self.by_path.get(trim_trailing_separators(path))
    }

    /// Returns the most specific workspace containing `path`.
    /// 回傳包含 `path` 的最精確工作區。
    pub fn find_by_path(&self, path: &str) -> Option<&WorkspaceNode> {
        if let Some(node) = self.get(path) {
            return Some(node);
        }
        Path::new(path)
            .ancestors()
            .skip(1)
            .filter_map(|ancestor| ancestor.to_str())
            .find_map(|ancestor| self.get(ancestor))
    }
}

fn trim_trailing_separators(path: &str) -> &str {
    let trimmed = path.trim_end_matches(['/', MAIN_SEPARATOR]);
    if trimmed.is_empty() && !path.is_empty() {
        &path[..1]
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DiscoveryResult {
        let mut eco = Project::new("eco", "/src/eco");
        eco.push_workspace(WorkspaceNode::new("eco", "/src/eco", "eco"));
        eco.push_workspace(
            WorkspaceNode::new("api", "/src/eco/api", "eco_api").with_parent("/src/eco"),
        );
        let mut app = Project::new("app", "/proj/app");
        app.push_workspace(WorkspaceNode::new("app", "/proj/app", "app"));
        DiscoveryResult::new(vec![eco, app])
    }

    #[test]
    fn exact_lookup_hits_index() {
        let provider = Provider::new(&sample());
        assert_eq!(provider.len(), 3);
        let node = provider.find_by_path("/src/eco/api").unwrap();
        assert_eq!(node.identifier(), "eco_api");
    }

    #[test]
    fn nested_file_resolves_to_deepest_workspace() {
        let provider = Provider::new(&sample());
        let node = provider.find_by_path("/src/eco/api/handlers/user.go").unwrap();
        assert_eq!(node.identifier(), "eco_api");
        let node = provider.find_by_path("/src/eco/README.md").unwrap();
        assert_eq!(node.identifier(), "eco");
    }

    #[test]
    fn sibling_with_shared_prefix_does_not_match() {
        let provider = Provider::new(&sample());
        assert!(provider.find_by_path("/proj/app-extra/x.go").is_none());
        assert!(provider.find_by_path("/proj/app/x.go").is_some());
    }

    #[test]
    fn trailing_separator_is_ignored() {
        let provider = Provider::new(&sample());
        assert_eq!(provider.find_by_path("/proj/app/").unwrap().name, "app");
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let provider = Provider::new(&sample());
        assert!(provider.find_by_path("/PROJ/app/x.go").is_none());
    }

    #[test]
    fn snapshot_json_uses_plain_fields() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["projects"][0]["workspaces"][1]["identifier"], "eco_api");
        assert!(json["projects"][0]["workspaces"][0]
            .get("parent_path")
            .is_none());
    }
}
