//! Configuration resolution and path discovery.
//!
//! Resolution order: CLI argument → `BP_CONFIG` → XDG path → built-in defaults.
//! A path named explicitly (CLI or env) must exist; the XDG path is optional.

use std::path::{Path, PathBuf};

use crate::model::ClassifierConfig;
use crate::validate::{validate_config, ValidationError, ValidationResult};

/// Where the configuration came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via `--config`.
    CliArgument,

    /// Set via `BP_CONFIG`.
    Environment,

    /// Found in the XDG config directory.
    XdgConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CliArgument => write!(f, "CLI argument"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::XdgConfig => write!(f, "XDG config"),
            ConfigSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Environment variable naming a config file.
pub const ENV_CONFIG_PATH: &str = "BP_CONFIG";

/// Standard config file name.
const CONFIG_FILENAME: &str = "config.json";

/// Application name for XDG directories.
const APP_NAME: &str = "bird_plane";

/// A loaded, validated configuration with its provenance.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: ClassifierConfig,
    pub source: ConfigSource,
    pub path: Option<PathBuf>,
    /// Raw file content, kept for snapshot hashing.
    pub raw: Option<String>,
}

impl ResolvedConfig {
    /// Built-in defaults with no backing file.
    pub fn builtin() -> Self {
        ResolvedConfig {
            config: ClassifierConfig::default(),
            source: ConfigSource::BuiltinDefault,
            path: None,
            raw: None,
        }
    }
}

/// Resolve which config file applies, without reading it.
pub fn resolve_config_path(
    cli_path: Option<&Path>,
) -> ValidationResult<(Option<PathBuf>, ConfigSource)> {
    let env_path = std::env::var_os(ENV_CONFIG_PATH).map(PathBuf::from);
    resolve_with(cli_path, env_path.as_deref(), xdg_config_dir().as_deref())
}

fn resolve_with(
    cli_path: Option<&Path>,
    env_path: Option<&Path>,
    xdg_dir: Option<&Path>,
) -> ValidationResult<(Option<PathBuf>, ConfigSource)> {
    // 1. CLI argument
    if let Some(path) = cli_path {
        return require_file(path, ConfigSource::CliArgument);
    }

    // 2. Environment variable
    if let Some(path) = env_path.filter(|p| !p.as_os_str().is_empty()) {
        return require_file(path, ConfigSource::Environment);
    }

    // 3. XDG config directory
    if let Some(dir) = xdg_dir {
        let path = dir.join(CONFIG_FILENAME);
        if path.is_file() {
            return Ok((Some(path), ConfigSource::XdgConfig));
        }
    }

    // 4. Built-in defaults
    Ok((None, ConfigSource::BuiltinDefault))
}

fn require_file(
    path: &Path,
    source: ConfigSource,
) -> ValidationResult<(Option<PathBuf>, ConfigSource)> {
    if path.is_file() {
        Ok((Some(path.to_path_buf()), source))
    } else {
        Err(ValidationError::IoError(format!(
            "Config file from {} not found: {}",
            source,
            path.display()
        )))
    }
}

/// Resolve, read, parse and validate the effective configuration.
pub fn load_config(cli_path: Option<&Path>) -> ValidationResult<ResolvedConfig> {
    let (path, source) = resolve_config_path(cli_path)?;
    let Some(path) = path else {
        return Ok(ResolvedConfig::builtin());
    };
    load_from(&path, source)
}

/// Read, parse and validate a config file.
pub fn load_from(path: &Path, source: ConfigSource) -> ValidationResult<ResolvedConfig> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
    })?;
    let config = ClassifierConfig::from_json(&raw)?;
    validate_config(&config)?;
    Ok(ResolvedConfig {
        config,
        source,
        path: Some(path.to_path_buf()),
        raw: Some(raw),
    })
}

/// Get the XDG config directory for bird_plane.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}
