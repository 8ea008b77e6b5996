use std::{
    env,
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::menu::MenuDefinition;

pub const CONFIG_ENV: &str = "CONMENU_CONFIG";
const LOCAL_CONFIG: &str = "conmenu.json";
const APP_DIR: &str = "conmenu";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Replaces the "Select Option: " prompt in every menu built from config.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu: Option<MenuDefinition>,
}

impl Config {
    pub fn starter() -> Self {
        Self {
            prompt: None,
            menu: Some(MenuDefinition::starter()),
        }
    }
}

/// Which lookup rule produced the config path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Env,
    WorkingDir,
    AppData,
    Home,
}

/// Picks the config path from `lookup` (an environment accessor) in priority
/// order. `local_exists` says whether `./conmenu.json` is present.
pub fn locate<F>(lookup: F, local_exists: bool) -> Option<(PathBuf, ConfigSource)>
where
    F: Fn(&str) -> Option<OsString>,
{
    let explicit = lookup(CONFIG_ENV).filter(|p| !p.to_string_lossy().trim().is_empty());
    if let Some(path) = explicit {
        return Some((PathBuf::from(path), ConfigSource::Env));
    }
    if local_exists {
        return Some((PathBuf::from(LOCAL_CONFIG), ConfigSource::WorkingDir));
    }

    let per_user = |base: OsString, nested: &[&str]| {
        nested
            .iter()
            .fold(PathBuf::from(base), |path, part| path.join(part))
            .join(APP_DIR)
            .join(CONFIG_FILE)
    };
    lookup("APPDATA")
        .map(|base| (per_user(base, &[]), ConfigSource::AppData))
        .or_else(|| lookup("HOME").map(|base| (per_user(base, &[".config"]), ConfigSource::Home)))
}

pub fn resolve_config_path() -> Option<PathBuf> {
    let (path, source) = locate(|key| env::var_os(key), Path::new(LOCAL_CONFIG).exists())?;
    debug!(path = %path.display(), ?source, "resolved config path");
    Some(path)
}

pub fn load_optional() -> Result<Option<Config>> {
    match resolve_config_path() {
        Some(path) if path.exists() => load_from(&path).map(Some),
        _ => Ok(None),
    }
}

pub fn load_from(path: &Path) -> Result<Config> {
    let bytes = fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}

/// Reads a file holding a bare menu definition (no config wrapper).
pub fn load_menu_file(path: &Path) -> Result<MenuDefinition> {
    let bytes = fs::read(path).with_context(|| format!("reading menu {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}

/// Writes [`Config::starter`] to `path` unless a file is already there.
/// Returns whether anything was written.
pub fn write_starter(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create config dir {}", parent.display()))?;
    }

    let mut text =
        serde_json::to_string_pretty(&Config::starter()).context("serialize starter config")?;
    text.push('\n');
    fs::write(path, text).with_context(|| format!("write {}", path.display()))?;
    Ok(true)
}

pub fn ensure_config_file_exists() -> Result<PathBuf> {
    let path = resolve_config_path().ok_or_else(|| {
        anyhow!("No config path available (set {CONFIG_ENV} or ensure APPDATA/HOME is present)")
    })?;
    if write_starter(&path)? {
        debug!(path = %path.display(), "wrote starter config");
    }
    Ok(path)
}
