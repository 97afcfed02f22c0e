// src/config/loader.rs

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};

/// Load a configuration file through `fs` and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] to get
/// a checked [`ConfigFile`].
pub fn load_raw(fs: &dyn FileSystem, path: &Path) -> Result<RawConfigFile> {
    let contents = fs.read_to_string(path)?;
    let config: RawConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a configuration file from disk and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    load_with_fs(&RealFileSystem, path.as_ref())
}

pub fn load_with_fs(fs: &dyn FileSystem, path: &Path) -> Result<ConfigFile> {
    let raw_config = load_raw(fs, path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Environment variable naming a config file to use instead of the default.
pub const CONFIG_ENV: &str = "O2REAP_CONFIG";

/// Config file looked for in the current directory when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "O2reap.toml";

/// Resolve the configuration the CLI should use.
///
/// `explicit` comes from `--config`; `$O2REAP_CONFIG` is consulted next.
/// See [`load_from_sources`] for the rules.
pub fn load_or_default(fs: &dyn FileSystem, explicit: Option<&Path>) -> Result<ConfigFile> {
    let from_env = std::env::var_os(CONFIG_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    load_from_sources(fs, explicit, from_env.as_deref())
}

/// - A `--config` path must exist and be valid.
/// - Likewise a path named by the environment.
/// - Otherwise `O2reap.toml` is used if it exists.
/// - Otherwise the built-in defaults apply (no named operations).
pub fn load_from_sources(
    fs: &dyn FileSystem,
    explicit: Option<&Path>,
    from_env: Option<&Path>,
) -> Result<ConfigFile> {
    if let Some(path) = explicit.or(from_env) {
        debug!(path = %path.display(), "loading config");
        return load_with_fs(fs, path);
    }

    let path = Path::new(DEFAULT_CONFIG_FILE);
    if fs.is_file(path) {
        debug!(path = %path.display(), "loading default config");
        load_with_fs(fs, path)
    } else {
        debug!(path = %path.display(), "no config file; using built-in defaults");
        Ok(ConfigFile::default())
    }
}
