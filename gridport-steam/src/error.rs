/// Errors from the local Steam installation and the game library.
#[derive(Debug, thiserror::Error)]
pub enum SteamError {
    /// Steam holds the file open; nothing can be written until it exits.
    #[error("Cannot write {path} while Steam is running. Close Steam and try again.")]
    SteamRunning { path: String },

    #[error("Steam installation not found at {0}")]
    NotInstalled(String),

    #[error("No Steam user found in {0}")]
    NoUser(String),

    #[error("Invalid shortcuts file: {0}")]
    Vdf(String),

    #[error("Game library {path}: {message}")]
    Library { path: String, message: String },

    #[error("Download of {url} failed (HTTP {status})")]
    Download { url: String, status: u16 },

    #[error("Unknown asset kind '{0}'")]
    UnknownAssetKind(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SteamError {
    pub fn is_steam_running(&self) -> bool {
        matches!(self, Self::SteamRunning { .. })
    }
}
