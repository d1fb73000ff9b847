//! Workspace model, lookup index and discovery for neogrove.
//! neogrove 的工作區模型、查詢索引與探索功能。

pub mod discovery;
pub mod workspace;

pub use discovery::{
    Discovery, DiscoveryError, ScanDiscovery, SnapshotDiscovery, PROJECT_MARKER, WORKTREES_DIR,
};
pub use workspace::{DiscoveryResult, Project, Provider, WorkspaceNode};
