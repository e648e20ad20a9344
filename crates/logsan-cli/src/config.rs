//! Configuration resolution and loading.
//!
//! Resolution order for the config file: `--config` → `LOGSAN_CONFIG` →
//! `<config dir>/logsan/config.toml` → built-in defaults. Command-line
//! flags are applied on top of whatever the file provided.

use crate::error::{CliError, Result};
use logsan_redact::{PiiCategory, SanitizationConfig};
use std::path::{Path, PathBuf};

/// Environment variable naming a config file.
pub const ENV_CONFIG_PATH: &str = "LOGSAN_CONFIG";

const APP_NAME: &str = "logsan";
const CONFIG_FILENAME: &str = "config.toml";

/// Where the configuration came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly provided via CLI argument.
    CliArgument,
    /// Named by `LOGSAN_CONFIG`.
    Environment,
    /// Found in the per-user config directory.
    XdgConfig,
    /// No file; built-in defaults.
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

/// Values given on the command line that replace file settings.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub targets: Option<Vec<PiiCategory>>,
    pub placeholder: Option<String>,
    pub salt: Option<String>,
    pub extensions: Option<Vec<String>>,
    pub no_hash: bool,
    pub no_json: bool,
    pub overwrite: bool,
}

impl ConfigOverrides {
    /// Apply every override that was set.
    pub fn apply(&self, config: &mut SanitizationConfig) {
        if let Some(targets) = &self.targets {
            config.targets = targets.iter().copied().collect();
        }
        if let Some(placeholder) = &self.placeholder {
            config.mask_placeholder = placeholder.clone();
        }
        if let Some(salt) = &self.salt {
            config.salt = salt.clone();
        }
        if let Some(extensions) = &self.extensions {
            config.allowed_extensions = extensions.clone();
        }
        if self.no_hash {
            config.enable_hashing = false;
        }
        if self.no_json {
            config.detect_json = false;
        }
        if self.overwrite {
            config.overwrite_output = true;
        }
    }
}

/// Final engine configuration and its provenance.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: SanitizationConfig,
    pub path: Option<PathBuf>,
    pub source: ConfigSource,
}

/// Locate the config file using the process environment.
pub fn resolve_config_path(cli_path: Option<&Path>) -> (Option<PathBuf>, ConfigSource) {
    resolve_config_path_from(
        cli_path,
        std::env::var_os(ENV_CONFIG_PATH).map(PathBuf::from),
        dirs::config_dir(),
    )
}

/// Locate the config file from explicit inputs.
///
/// Explicit paths (CLI, environment) are returned even when missing so the
/// caller can report them; the per-user default is used only if it exists.
pub fn resolve_config_path_from(
    cli_path: Option<&Path>,
    env_path: Option<PathBuf>,
    config_dir: Option<PathBuf>,
) -> (Option<PathBuf>, ConfigSource) {
    if let Some(path) = cli_path {
        return (Some(path.to_path_buf()), ConfigSource::CliArgument);
    }
    if let Some(path) = env_path.filter(|p| !p.as_os_str().is_empty()) {
        return (Some(path), ConfigSource::Environment);
    }
    if let Some(dir) = config_dir {
        let path = dir.join(APP_NAME).join(CONFIG_FILENAME);
        if path.is_file() {
            return (Some(path), ConfigSource::XdgConfig);
        }
    }
    (None, ConfigSource::BuiltinDefault)
}

/// Read a config file; `.json` files are parsed as JSON, anything else as TOML.
pub fn load_config_file(path: &Path) -> Result<SanitizationConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(path, &text)
}

fn parse_config(path: &Path, text: &str) -> Result<SanitizationConfig> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let parsed = if is_json {
        serde_json::from_str(text).map_err(|e| e.to_string())
    } else {
        toml::from_str(text).map_err(|e| e.to_string())
    };
    parsed.map_err(|message| CliError::ConfigParse {
        path: path.to_path_buf(),
        message,
    })
}

/// Resolve, load, override and validate the engine configuration.
pub fn load(cli_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    let (path, source) = resolve_config_path(cli_path);
    let mut config = match &path {
        Some(p) => load_config_file(p)?,
        None => SanitizationConfig::default(),
    };
    overrides.apply(&mut config);
    config.validate()?;
    tracing::debug!(
        source = %source,
        path = ?path,
        targets = config.targets.len(),
        hashing = config.enable_hashing,
        "configuration resolved"
    );
    Ok(ResolvedConfig {
        config,
        path,
        source,
    })
}
