use serde::Deserialize;

/// Error string the catalog reports for ids it has no entry for.
pub const GAME_NOT_FOUND: &str = "Game not found";

/// Which artwork endpoint a lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtworkKind {
    Grids,
    Heroes,
    Logos,
}

impl ArtworkKind {
    /// Path segment of the endpoint.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Grids => "grids",
            Self::Heroes => "heroes",
            Self::Logos => "logos",
        }
    }
}

impl std::fmt::Display for ArtworkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.endpoint())
    }
}

/// One downstream artwork request: a single id type and its ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtworkQuery {
    pub id_type: String,
    pub ids: Vec<String>,
    /// Size filters such as `600x900`; empty means any
    pub dimensions: Vec<String>,
}

impl ArtworkQuery {
    pub fn joined_ids(&self) -> String {
        self.ids.join(",")
    }
}

/// A single image in the catalog.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Artwork {
    pub id: u64,
    pub url: String,
    #[serde(default)]
    pub thumb: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub mime: Option<String>,
    #[serde(default)]
    pub score: i64,
}

/// Per-id entry of a multi-id artwork response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatchEntry {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<Artwork>,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl BatchEntry {
    pub fn found(data: Vec<Artwork>) -> Self {
        Self {
            success: true,
            data,
            errors: Vec::new(),
        }
    }

    pub fn not_found(errors: Vec<String>) -> Self {
        let errors = if errors.is_empty() {
            vec![GAME_NOT_FOUND.to_string()]
        } else {
            errors
        };
        Self {
            success: false,
            data: Vec::new(),
            errors,
        }
    }

    pub fn is_not_found(&self) -> bool {
        !self.success && self.errors.iter().any(|e| e == GAME_NOT_FOUND)
    }

    /// First artwork of a successful entry.
    pub fn first(&self) -> Option<&Artwork> {
        if self.success { self.data.first() } else { None }
    }
}

/// An artwork response in the shape the catalog uses for the request.
///
/// A request for exactly one id yields a flat list of images; a request
/// for several ids yields one nested entry per id, in request order.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtworkResponse {
    Flat(Vec<Artwork>),
    Nested(Vec<BatchEntry>),
}

impl ArtworkResponse {
    /// The first image for each requested id, `None` where there is none.
    pub fn first_per_id(&self) -> Vec<Option<Artwork>> {
        match self {
            Self::Flat(data) => vec![data.first().cloned()],
            Self::Nested(entries) => entries.iter().map(|e| e.first().cloned()).collect(),
        }
    }

    /// Positions of entries reporting "not found". Always empty for a flat
    /// response, which signals not-found through an error instead.
    pub fn not_found_positions(&self) -> Vec<usize> {
        match self {
            Self::Flat(_) => Vec::new(),
            Self::Nested(entries) => entries
                .iter()
                .enumerate()
                .filter(|(_, e)| e.is_not_found())
                .map(|(i, _)| i)
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Flat(_) => 1,
            Self::Nested(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Game record from the catalog (lookup and search results).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GameInfo {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub release_date: Option<i64>,
}

/// Envelope every catalog response is wrapped in.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<String>,
}
