use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV: &str = "GROVE_CONFIG";
const CONFIG_FILE: &str = "grove.yml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Subset of the grove configuration used by the editor helper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroveConfig {
    #[serde(default, alias = "groves")]
    pub search_paths: BTreeMap<String, SearchPath>,
    #[serde(default)]
    pub notebooks: Option<NotebooksConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPath {
    pub path: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebooksConfig {
    #[serde(default)]
    pub definitions: BTreeMap<String, NotebookDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookDefinition {
    #[serde(default)]
    pub root_dir: String,
}

impl GroveConfig {
    /// Loads the configuration at `path`. A missing file yields the default
    /// (empty) configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_yaml(&contents).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
    }

    /// Notebook definitions with a non-empty root directory, in name order.
    pub fn notebook_definitions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.notebooks
            .iter()
            .flat_map(|notebooks| notebooks.definitions.iter())
            .filter(|(_, definition)| !definition.root_dir.trim().is_empty())
            .map(|(name, definition)| (name.as_str(), definition.root_dir.as_str()))
    }

    /// Raw (unexpanded) paths of the enabled search roots.
    pub fn enabled_search_paths(&self) -> impl Iterator<Item = (&str, &str)> {
        self.search_paths
            .iter()
            .filter(|(_, search)| search.enabled && !search.path.trim().is_empty())
            .map(|(name, search)| (name.as_str(), search.path.as_str()))
    }
}

/// Resolves the configuration file location: an explicit override, then
/// `GROVE_CONFIG`, then `$XDG_CONFIG_HOME/grove/grove.yml`, then
/// `~/.config/grove/grove.yml`.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env::var_os(CONFIG_ENV).filter(|value| !value.is_empty()) {
        return Some(PathBuf::from(path));
    }
    let config_home = env::var_os("XDG_CONFIG_HOME")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))?;
    Some(config_home.join("grove").join(CONFIG_FILE))
}
