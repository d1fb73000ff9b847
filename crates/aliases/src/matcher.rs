use neogrove_project::{DiscoveryResult, Provider, WorkspaceNode};

use crate::normalize::CaseSensitivity;
use crate::prefix::longest_prefix_match;

/// Finds the most specific workspace containing a path.
///
/// The provider index answers first. Only when paths compare
/// case-insensitively is the full workspace list scanned with folded
/// comparison, and the winner is then looked up again through the provider so
/// the returned node is always the indexed one.
#[derive(Debug, Clone, Copy)]
pub struct WorkspaceMatcher<'a> {
    provider: &'a Provider,
    discovery: &'a DiscoveryResult,
    case: CaseSensitivity,
}

impl<'a> WorkspaceMatcher<'a> {
    pub fn new(
        provider: &'a Provider,
        discovery: &'a DiscoveryResult,
        case: CaseSensitivity,
    ) -> Self {
        Self {
            provider,
            discovery,
            case,
        }
    }

    pub fn case(&self) -> CaseSensitivity {
        self.case
    }

    pub fn find(&self, path: &str) -> Option<&'a WorkspaceNode> {
        if let Some(node) = self.provider.find_by_path(path) {
            return Some(node);
        }
        if !self.case.is_insensitive() {
            return None;
        }
        let best = longest_prefix_match(
            self.discovery.workspaces(),
            path,
            |node| node.path.as_str(),
            self.case,
        )?;
        self.provider.find_by_path(&best.candidate.path)
    }
}
