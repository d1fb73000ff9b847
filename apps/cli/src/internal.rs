//! Plugin-facing commands: alias resolution and git status.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use neogrove_aliases::{resolve_batch, AliasResolver, CaseSensitivity, NotebookSet, TracingLog};
use neogrove_project::{Discovery, DiscoveryResult, Provider, ScanDiscovery, SnapshotDiscovery};
use neogrove_settings::{expand_path, resolve_config_path, GroveConfig};
use tracing::{debug, warn};

pub fn resolve_aliases(config_path: Option<&Path>, snapshot: Option<&Path>) -> Result<()> {
    let config = load_config(config_path);
    let log = TracingLog;
    let notebooks = NotebookSet::from_config(&config, &log);
    let discovery = discover(&config, snapshot).context("failed to discover workspaces")?;
    let provider = Provider::new(&discovery);
    debug!(
        notebooks = notebooks.roots().len(),
        workspaces = provider.len(),
        "alias sources ready"
    );
    if notebooks.is_empty() && provider.is_empty() {
        debug!("no notebooks or workspaces known; paths resolve to themselves");
    }

    let resolver = AliasResolver::new(&notebooks, &provider, &discovery, CaseSensitivity::host());
    let results = resolve_batch(io::stdin().lock(), &resolver, &log)?;
    println!("{}", serde_json::to_string(&results)?);
    Ok(())
}

/// Prints the extended status, or `{}` when anything goes wrong.
pub fn git_status(path: Option<PathBuf>) {
    let json = path
        .map_or_else(env::current_dir, Ok)
        .map_err(|err| debug!(error = %err, "cannot determine current directory"))
        .ok()
        .and_then(|path| match neogrove_git::collect(&path) {
            Ok(status) => serde_json::to_string(&status).ok(),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "git status unavailable");
                None
            }
        });
    println!("{}", json.as_deref().unwrap_or("{}"));
}

/// A configuration that cannot be loaded degrades to the empty one.
fn load_config(explicit: Option<&Path>) -> GroveConfig {
    let Some(path) = resolve_config_path(explicit) else {
        warn!("no configuration location available");
        return GroveConfig::default();
    };
    match GroveConfig::load(&path) {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, "could not load grove config for notebook aliases");
            GroveConfig::default()
        }
    }
}

fn discover(config: &GroveConfig, snapshot: Option<&Path>) -> Result<DiscoveryResult> {
    if let Some(path) = snapshot {
        debug!(path = %path.display(), "loading discovery snapshot");
        return Ok(SnapshotDiscovery::new(path).discover()?);
    }
    let roots: Vec<PathBuf> = config
        .enabled_search_paths()
        .filter_map(|(name, raw)| match expand_path(raw) {
            Ok(path) => Some(path),
            Err(err) => {
                warn!(search_path = name, error = %err, "skipping search path");
                None
            }
        })
        .collect();
    Ok(ScanDiscovery::new(roots).discover()?)
}
