//! `~/.config/gridport/settings.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CliError;

/// Environment variable that takes precedence over `[catalog] api_key`.
pub(crate) const API_KEY_ENV: &str = "GRIDPORT_API_KEY";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub catalog: CatalogSettings,
    pub steam: SteamSettings,
    pub oculus: OculusSettings,
    pub library: LibrarySettings,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub(crate) struct CatalogSettings {
    pub api_key: Option<String>,
    /// Alternative API root
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub(crate) struct SteamSettings {
    pub path: Option<PathBuf>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub(crate) struct OculusSettings {
    pub library_paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub(crate) struct LibrarySettings {
    pub path: Option<PathBuf>,
}

/// Default settings file location.
pub(crate) fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("gridport").join("settings.toml")
}

impl Settings {
    /// Load settings from `path`; a missing file is all defaults.
    pub(crate) fn load(path: &Path) -> Result<Self, CliError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        Self::parse(&contents)
            .map_err(|e| CliError::config(format!("{}: {e}", path.display())))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// The API key, preferring `env_value` (the environment) over the file.
    pub(crate) fn api_key(&self, env_value: Option<String>) -> Option<String> {
        env_value
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.catalog.api_key.clone())
            .filter(|k| !k.trim().is_empty())
    }

    pub(crate) fn steam_root(&self) -> Option<PathBuf> {
        self.steam.path.as_deref().map(expand_home)
    }

    pub(crate) fn oculus_libraries(&self) -> Vec<PathBuf> {
        self.oculus
            .library_paths
            .iter()
            .map(|p| expand_home(p))
            .collect()
    }

    pub(crate) fn library_path(&self) -> Option<PathBuf> {
        self.library
            .path
            .as_deref()
            .map(expand_home)
            .or_else(gridport_steam::GameLibrary::default_path)
    }
}

/// Expand a leading `~` to the home directory.
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
