//! Config file discovery and loading.

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::types::KvRealmConfig;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "KVREALM_CONFIG";

/// File name looked up in the project directory.
pub const PROJECT_CONFIG_FILE: &str = "kvrealm.toml";

/// Result of config discovery.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The parsed configuration.
    pub config: KvRealmConfig,
    /// File it came from, if any.
    pub source: Option<PathBuf>,
}

/// Load configuration.
///
/// Resolution order:
/// 1. The file named by `KVREALM_CONFIG`, which must exist.
/// 2. `kvrealm.toml` in `project_dir` (or the working directory), if present.
/// 3. Built-in defaults.
pub fn load_config(project_dir: Option<&Path>) -> Result<LoadedConfig> {
    let explicit = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
    load_config_with_options(explicit.as_deref(), project_dir)
}

/// Load configuration with an explicit file override instead of the env var.
pub fn load_config_with_options(
    explicit: Option<&Path>,
    project_dir: Option<&Path>,
) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        return Ok(LoadedConfig {
            config: load_config_file(path)?,
            source: Some(path.to_path_buf()),
        });
    }

    let project_path = project_dir
        .map(|d| d.join(PROJECT_CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_FILE));
    if project_path.exists() {
        return Ok(LoadedConfig {
            config: load_config_file(&project_path)?,
            source: Some(project_path),
        });
    }

    Ok(LoadedConfig {
        config: KvRealmConfig::new(),
        source: None,
    })
}

/// Load a single config file.
pub fn load_config_file(path: &Path) -> Result<KvRealmConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    KvRealmConfig::from_toml(&contents)
}
