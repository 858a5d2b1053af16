use std::path::{Path, PathBuf};

use crate::error::SteamError;

/// Locations inside a Steam installation for one Steam user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SteamPaths {
    pub root: PathBuf,
    pub user_id: String,
}

impl SteamPaths {
    /// Resolve the Steam root and user, falling back to the platform default
    /// root and the first user found under `userdata`.
    pub fn detect(root: Option<PathBuf>, user_id: Option<String>) -> Result<Self, SteamError> {
        let root = match root.or_else(default_root) {
            Some(root) if root.is_dir() => root,
            Some(root) => return Err(SteamError::NotInstalled(root.display().to_string())),
            None => return Err(SteamError::NotInstalled("<unknown>".to_string())),
        };
        let user_id = match user_id {
            Some(id) => id,
            None => first_user(&root.join("userdata"))?,
        };
        log::debug!("Steam root {} (user {user_id})", root.display());
        Ok(Self { root, user_id })
    }

    pub fn user_config_dir(&self) -> PathBuf {
        self.root
            .join("userdata")
            .join(&self.user_id)
            .join("config")
    }

    /// Directory Steam reads custom artwork from.
    pub fn grid_dir(&self) -> PathBuf {
        self.user_config_dir().join("grid")
    }

    pub fn shortcuts_path(&self) -> PathBuf {
        self.user_config_dir().join("shortcuts.vdf")
    }
}

/// Where Steam is installed by default on this OS.
pub fn default_root() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        Some(PathBuf::from(r"C:\Program Files (x86)\Steam"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir().map(|d| d.join("Steam"))
    } else {
        dirs::home_dir().map(|h| h.join(".steam").join("steam"))
    }
}

/// First numeric directory under `userdata`, skipping the anonymous `0`.
fn first_user(userdata: &Path) -> Result<String, SteamError> {
    let no_user = || SteamError::NoUser(userdata.display().to_string());
    let mut users: Vec<String> = std::fs::read_dir(userdata)
        .map_err(|_| no_user())?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| name != "0" && name.chars().all(|c| c.is_ascii_digit()))
        .collect();
    users.sort();
    users.into_iter().next().ok_or_else(no_user)
}
