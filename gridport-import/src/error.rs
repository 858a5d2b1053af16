use gridport_catalog::CatalogError;
use gridport_steam::SteamError;

/// Errors that stop an import run.
///
/// Per-platform and per-game failures are logged where they happen and
/// never surface here.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Could not save imported games: {0}")]
    Persistence(SteamError),

    #[error("Steam error: {0}")]
    Steam(#[from] SteamError),

    #[error("{platform}: {message}")]
    Source { platform: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ImportError {
    pub fn source_failed(platform: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Source {
            platform: platform.into(),
            message: message.to_string(),
        }
    }
}
