//! The persisted library of imported games.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use gridport_core::ImportedGame;
use serde::{Deserialize, Serialize};

use crate::error::SteamError;

const LIBRARY_VERSION: u32 = 1;
pub const LIBRARY_FILE: &str = "games.json";

/// Storage for imported games, keyed by content hash.
pub trait GameStore {
    /// Insert or overwrite `games`. Returns the number of records stored.
    fn upsert(&self, games: &[ImportedGame]) -> Result<usize, SteamError>;

    fn load(&self) -> Result<BTreeMap<String, ImportedGame>, SteamError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct LibraryFile {
    version: u32,
    saved_at: String,
    games: BTreeMap<String, ImportedGame>,
}

/// A JSON file holding every imported game.
pub struct GameLibrary {
    path: PathBuf,
}

impl GameLibrary {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `games.json` in the user's gridport config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("gridport").join(LIBRARY_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn library_error(&self, message: impl std::fmt::Display) -> SteamError {
        SteamError::Library {
            path: self.path.display().to_string(),
            message: message.to_string(),
        }
    }
}

impl GameStore for GameLibrary {
    fn load(&self) -> Result<BTreeMap<String, ImportedGame>, SteamError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        let file: LibraryFile =
            serde_json::from_str(&contents).map_err(|e| self.library_error(e))?;
        if file.version != LIBRARY_VERSION {
            return Err(self.library_error(format!("unsupported version {}", file.version)));
        }
        Ok(file.games)
    }

    fn upsert(&self, games: &[ImportedGame]) -> Result<usize, SteamError> {
        let mut stored = self.load()?;
        for game in games {
            stored.insert(game.content_hash(), game.clone());
        }

        let file = LibraryFile {
            version: LIBRARY_VERSION,
            saved_at: chrono::Utc::now().to_rfc3339(),
            games: stored,
        };
        let contents = serde_json::to_string_pretty(&file)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)?;
        log::debug!(
            "Saved {} game(s) to {}",
            file.games.len(),
            self.path.display()
        );
        Ok(file.games.len())
    }
}
