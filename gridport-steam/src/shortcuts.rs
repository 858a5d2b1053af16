//! Non-Steam game shortcuts in `shortcuts.vdf`.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use gridport_core::{ImportedGame, Platform};

use crate::error::SteamError;
use crate::vdf::{VdfMap, VdfValue};

const ROOT_KEY: &str = "shortcuts";

/// A single shortcut entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    /// The new-scheme app id, stored as Steam stores it (signed)
    pub app_id: u32,
    pub name: String,
    pub exe: String,
    pub start_dir: String,
    pub icon: String,
    pub launch_options: String,
    pub tags: Vec<String>,
    /// Launch through SteamVR
    pub open_vr: bool,
}

impl Shortcut {
    pub fn from_game(game: &ImportedGame) -> Self {
        Self {
            app_id: game.app_ids().new,
            name: game.name.clone(),
            exe: game.exe.clone(),
            start_dir: game.start_in.clone(),
            icon: game.icon.clone(),
            launch_options: game.params.clone(),
            tags: game.tags.clone(),
            open_vr: game.platform == Platform::Oculus,
        }
    }

    fn to_vdf(&self) -> VdfMap {
        let mut tags = VdfMap::new();
        for (i, tag) in self.tags.iter().enumerate() {
            tags.insert(i.to_string(), VdfValue::String(tag.clone()));
        }

        let mut map = VdfMap::new();
        map.insert("appid", VdfValue::Int(self.app_id as i32));
        map.insert("AppName", VdfValue::String(self.name.clone()));
        map.insert("Exe", VdfValue::String(quote(&self.exe)));
        map.insert("StartDir", VdfValue::String(quote(&self.start_dir)));
        map.insert("icon", VdfValue::String(self.icon.clone()));
        map.insert("ShortcutPath", VdfValue::String(String::new()));
        map.insert(
            "LaunchOptions",
            VdfValue::String(self.launch_options.clone()),
        );
        map.insert("IsHidden", VdfValue::Int(0));
        map.insert("AllowDesktopConfig", VdfValue::Int(1));
        map.insert("AllowOverlay", VdfValue::Int(1));
        map.insert("OpenVR", VdfValue::Int(i32::from(self.open_vr)));
        map.insert("LastPlayTime", VdfValue::Int(0));
        map.insert("tags", VdfValue::Map(tags));
        map
    }

    fn from_vdf(map: &VdfMap) -> Self {
        let text = |key: &str| map.get_str(key).unwrap_or_default().to_string();
        let tags = map
            .get_map("tags")
            .map(|tags| {
                tags.iter()
                    .filter_map(|(_, v)| match v {
                        VdfValue::String(s) => Some(s.clone()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            app_id: map.get_int("appid").unwrap_or_default() as u32,
            name: text("AppName"),
            exe: unquote(map.get_str("Exe").unwrap_or_default()).to_string(),
            start_dir: unquote(map.get_str("StartDir").unwrap_or_default()).to_string(),
            icon: text("icon"),
            launch_options: text("LaunchOptions"),
            tags,
            open_vr: map.get_int("OpenVR").unwrap_or_default() != 0,
        }
    }
}

fn quote(path: &str) -> String {
    if path.is_empty() || path.starts_with('"') {
        path.to_string()
    } else {
        format!("\"{path}\"")
    }
}

fn unquote(path: &str) -> &str {
    path.strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
        .unwrap_or(path)
}

/// Registers shortcuts with Steam.
pub trait ShortcutRegistry {
    /// Add or replace shortcuts, matching existing entries by app id.
    fn add_shortcuts(&self, shortcuts: &[Shortcut]) -> Result<(), SteamError>;

    /// Put the shortcuts for `app_ids` into `category`.
    fn add_category(&self, app_ids: &[u32], category: &str) -> Result<(), SteamError>;
}

/// `userdata/<user>/config/shortcuts.vdf`.
pub struct ShortcutsFile {
    path: PathBuf,
}

impl ShortcutsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All shortcuts currently registered.
    pub fn read(&self) -> Result<Vec<Shortcut>, SteamError> {
        let root = self.load()?;
        Ok(root
            .get_map(ROOT_KEY)
            .map(|list| {
                list.iter()
                    .filter_map(|(_, v)| match v {
                        VdfValue::Map(m) => Some(Shortcut::from_vdf(m)),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn load(&self) -> Result<VdfMap, SteamError> {
        if !self.path.exists() {
            return Ok(VdfMap::new());
        }
        VdfMap::parse(&std::fs::read(&self.path)?)
    }

    fn store(&self, root: &VdfMap) -> Result<(), SteamError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        // Steam keeps the file locked while running
        let steam_running = |e: std::io::Error| {
            log::debug!("Replacing {} failed: {e}", self.path.display());
            SteamError::SteamRunning {
                path: self.path.display().to_string(),
            }
        };
        if self.path.exists() {
            OpenOptions::new()
                .write(true)
                .open(&self.path)
                .map_err(steam_running)?;
        }

        let tmp = self.path.with_extension("vdf.tmp");
        let mut file = File::create(&tmp)?;
        if let Err(e) = file.write_all(&root.to_bytes()).and_then(|()| file.sync_all()) {
            drop(file);
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        drop(file);

        std::fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            steam_running(e)
        })
    }

    /// Re-number the list as `"0".."n"`, which Steam expects.
    fn renumber(list: Vec<VdfMap>) -> VdfMap {
        let mut out = VdfMap::new();
        for (i, entry) in list.into_iter().enumerate() {
            out.insert(i.to_string(), VdfValue::Map(entry));
        }
        out
    }

    fn entries(root: &VdfMap) -> Vec<VdfMap> {
        root.get_map(ROOT_KEY)
            .map(|list| {
                list.iter()
                    .filter_map(|(_, v)| match v {
                        VdfValue::Map(m) => Some(m.clone()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl ShortcutRegistry for ShortcutsFile {
    fn add_shortcuts(&self, shortcuts: &[Shortcut]) -> Result<(), SteamError> {
        let mut root = self.load()?;
        let mut entries = Self::entries(&root);

        for shortcut in shortcuts {
            let app_id = shortcut.app_id as i32;
            let existing = entries
                .iter()
                .position(|e| e.get_int("appid") == Some(app_id));
            match existing {
                Some(i) => entries[i] = shortcut.to_vdf(),
                None => entries.push(shortcut.to_vdf()),
            }
        }

        log::debug!(
            "Writing {} shortcut(s) to {}",
            entries.len(),
            self.path.display()
        );
        root.insert(ROOT_KEY, VdfValue::Map(Self::renumber(entries)));
        self.store(&root)
    }

    fn add_category(&self, app_ids: &[u32], category: &str) -> Result<(), SteamError> {
        let mut root = self.load()?;
        let mut entries = Self::entries(&root);
        let mut changed = false;

        for entry in entries.iter_mut() {
            let Some(app_id) = entry.get_int("appid") else {
                continue;
            };
            if !app_ids.iter().any(|&id| id as i32 == app_id) {
                continue;
            }
            let mut shortcut = Shortcut::from_vdf(entry);
            if shortcut.tags.iter().any(|t| t == category) {
                continue;
            }
            shortcut.tags.push(category.to_string());
            let mut tags = VdfMap::new();
            for (i, tag) in shortcut.tags.iter().enumerate() {
                tags.insert(i.to_string(), VdfValue::String(tag.clone()));
            }
            entry.insert("tags", VdfValue::Map(tags));
            changed = true;
        }

        if !changed {
            return Ok(());
        }
        root.insert(ROOT_KEY, VdfValue::Map(Self::renumber(entries)));
        self.store(&root)
    }
}
