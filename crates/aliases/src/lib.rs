//! Path-to-alias resolution for editor buffers.
//!
//! A path is first matched against the configured notebooks, then against the
//! discovered workspaces. Aliases look like `@a:nb:<rel>`,
//! `@a:nb:<name>:<rel>` or `@a:<eco>:<project>/<rel>`; paths that match
//! nothing are returned unchanged.

pub mod batch;
pub mod format;
pub mod matcher;
pub mod normalize;
pub mod notebook;
pub mod prefix;

pub use batch::{
    resolve_batch, AliasResolver, AliasSource, BatchError, ResolutionResult, ResolveEvent,
    ResolveLog, TracingLog,
};
pub use format::{alias_namespace, relative_slash_path, workspace_alias, ALIAS_PREFIX};
pub use matcher::WorkspaceMatcher;
pub use normalize::CaseSensitivity;
pub use notebook::{NotebookRoot, NotebookSet, DEFAULT_NOTEBOOK};
pub use prefix::{longest_prefix_match, PrefixMatch};
