use std::collections::BTreeMap;
use std::io::{self, BufRead};

use neogrove_project::{DiscoveryResult, Provider};
use thiserror::Error;
use tracing::{debug, warn};

use crate::format::workspace_alias;
use crate::matcher::WorkspaceMatcher;
use crate::normalize::CaseSensitivity;
use crate::notebook::NotebookSet;

/// Input path → alias (or the unchanged input when nothing matched).
pub type ResolutionResult = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("error reading from stdin: {0}")]
    Read(#[from] io::Error),
}

/// Where an alias came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AliasSource {
    Notebook,
    Workspace,
    Unmatched,
}

/// Diagnostics emitted while resolving aliases.
#[derive(Debug)]
pub enum ResolveEvent<'a> {
    NotebookSkipped {
        name: &'a str,
        root_dir: &'a str,
        reason: &'a str,
    },
    RelativePathFailed {
        path: &'a str,
        workspace: &'a str,
    },
    Resolved {
        path: &'a str,
        alias: &'a str,
        source: AliasSource,
    },
}

/// Sink for [`ResolveEvent`]s.
pub trait ResolveLog {
    fn record(&self, event: ResolveEvent<'_>);
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl ResolveLog for TracingLog {
    fn record(&self, event: ResolveEvent<'_>) {
        match event {
            ResolveEvent::NotebookSkipped {
                name,
                root_dir,
                reason,
            } => warn!(notebook = name, root_dir, reason, "skipping notebook"),
            ResolveEvent::RelativePathFailed { path, workspace } => {
                debug!(path, workspace, "could not compute relative path; keeping absolute path")
            }
            ResolveEvent::Resolved {
                path,
                alias,
                source,
            } => debug!(path, alias, source = ?source, "resolved alias"),
        }
    }
}

/// Resolves single paths against notebooks first and workspaces second.
#[derive(Debug, Clone, Copy)]
pub struct AliasResolver<'a> {
    notebooks: &'a NotebookSet,
    workspaces: WorkspaceMatcher<'a>,
}

impl<'a> AliasResolver<'a> {
    pub fn new(
        notebooks: &'a NotebookSet,
        provider: &'a Provider,
        discovery: &'a DiscoveryResult,
        case: CaseSensitivity,
    ) -> Self {
        Self {
            notebooks,
            workspaces: WorkspaceMatcher::new(provider, discovery, case),
        }
    }

    pub fn resolve(&self, path: &str, log: &dyn ResolveLog) -> String {
        let (alias, source) = self.resolve_with_source(path, log);
        log.record(ResolveEvent::Resolved {
            path,
            alias: &alias,
            source,
        });
        alias
    }

    fn resolve_with_source(&self, path: &str, log: &dyn ResolveLog) -> (String, AliasSource) {
        if let Some(alias) = self.notebooks.alias_for(path) {
            return (alias, AliasSource::Notebook);
        }
        if let Some(node) = self.workspaces.find(path) {
            match workspace_alias(node, path, self.workspaces.case()) {
                Some(alias) => return (alias, AliasSource::Workspace),
                None => log.record(ResolveEvent::RelativePathFailed {
                    path,
                    workspace: &node.path,
                }),
            }
        }
        (path.to_string(), AliasSource::Unmatched)
    }
}

/// Reads one path per line and resolves each non-empty one.
///
/// The mapping is returned only once the input is exhausted. A read error
/// aborts the batch; a path that cannot be aliased maps to itself. Lines that
/// are not valid UTF-8 are decoded lossily and resolved like any other.
pub fn resolve_batch<R: BufRead>(
    mut reader: R,
    resolver: &AliasResolver<'_>,
    log: &dyn ResolveLog,
) -> Result<ResolutionResult, BatchError> {
    let mut results = ResolutionResult::new();
    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer)? == 0 {
            break;
        }
        let line = strip_line_ending(&buffer);
        if line.is_empty() {
            continue;
        }
        let path = String::from_utf8_lossy(line).into_owned();
        if results.contains_key(&path) {
            continue;
        }
        let alias = resolver.resolve(&path, log);
        results.insert(path, alias);
    }
    Ok(results)
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
