/// Errors that can occur while talking to the artwork catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate limited by SteamGridDB API")]
    RateLimit,

    /// The catalog has no match for the requested id.
    #[error("Game not found")]
    NotFound { errors: Vec<String> },

    #[error("Invalid API key: {0}")]
    InvalidCredentials(String),

    #[error("Server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid override file {path}: {message}")]
    Overrides { path: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Errors that make every further catalog call pointless.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials(_) | Self::Config(_) | Self::Overrides { .. }
        )
    }
}
