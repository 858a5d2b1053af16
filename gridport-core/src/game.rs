use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::app_id::AppIds;
use crate::platform::Platform;

/// A game as reported by a platform source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalGameRef {
    /// Platform the game was found on
    pub platform: Platform,
    /// The platform's own identifier for the game
    pub id: String,
    /// Display name
    pub name: String,
    /// Executable path
    pub exe: String,
    /// Working directory for the shortcut
    #[serde(default)]
    pub start_in: String,
    /// Launch parameters (may be empty)
    #[serde(default)]
    pub params: String,
    /// Icon path (often the executable itself)
    #[serde(default)]
    pub icon: String,
}

impl ExternalGameRef {
    /// Storage key for this game, see [`content_hash`].
    pub fn content_hash(&self) -> String {
        content_hash(&self.exe, &self.params)
    }

    /// Both Steam app ids for a shortcut pointing at this game.
    pub fn app_ids(&self) -> AppIds {
        AppIds::for_game(&self.exe, &self.name)
    }
}

/// A game record persisted after a confirmed import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedGame {
    pub name: String,
    pub exe: String,
    pub start_in: String,
    pub params: String,
    /// Steam categories; the platform display name
    pub tags: Vec<String>,
    pub icon: String,
    pub platform: Platform,
    pub source_id: String,
}

impl ImportedGame {
    /// Build the persisted record for a game, tagged with its platform name.
    pub fn from_ref(game: &ExternalGameRef) -> Self {
        Self {
            name: game.name.clone(),
            exe: game.exe.clone(),
            start_in: game.start_in.clone(),
            params: game.params.clone(),
            tags: vec![game.platform.display_name().to_string()],
            icon: game.icon.clone(),
            platform: game.platform,
            source_id: game.id.clone(),
        }
    }

    pub fn content_hash(&self) -> String {
        content_hash(&self.exe, &self.params)
    }

    pub fn app_ids(&self) -> AppIds {
        AppIds::for_game(&self.exe, &self.name)
    }
}

/// Stable storage key for an (executable, params) pair.
///
/// SHA-256 of `exe + params`, truncated to 16 hex chars. Re-importing the
/// same executable with the same params yields the same key.
pub fn content_hash(exe: &str, params: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(exe.as_bytes());
    hasher.update(params.as_bytes());
    let hash = hasher.finalize();
    hash[..8].iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(exe: &str, params: &str, name: &str) -> ExternalGameRef {
        ExternalGameRef {
            platform: Platform::Oculus,
            id: "1".to_string(),
            name: name.to_string(),
            exe: exe.to_string(),
            start_in: String::new(),
            params: params.to_string(),
            icon: exe.to_string(),
        }
    }

    #[test]
    fn content_hash_is_16_hex_chars() {
        let hash = content_hash("game.exe", "");
        assert_eq!(hash.len(), 16);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn content_hash_ignores_name() {
        let a = game("C:\\a.exe", "-vr", "First");
        let b = game("C:\\a.exe", "-vr", "Renamed");
        assert_eq!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn content_hash_depends_on_params() {
        let a = game("C:\\a.exe", "", "A");
        let b = game("C:\\a.exe", "-windowed", "A");
        assert_ne!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn imported_game_is_tagged_with_platform_name() {
        let record = ImportedGame::from_ref(&game("C:\\a.exe", "", "A"));
        assert_eq!(record.tags, vec!["Oculus".to_string()]);
        assert_eq!(record.content_hash(), content_hash("C:\\a.exe", ""));
    }
}
