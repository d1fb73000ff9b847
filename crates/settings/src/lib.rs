//! Grove configuration loading and path expansion for neogrove.

pub mod config;
pub mod expand;

pub use config::{
    resolve_config_path, ConfigError, GroveConfig, NotebookDefinition, NotebooksConfig,
    SearchPath, CONFIG_ENV,
};
pub use expand::{expand_path, expand_with, ExpandError};
