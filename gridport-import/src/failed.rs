//! Games the catalog could not find, and what a name search suggests
//! instead. Suggestions are only reported, never applied.

use std::fmt;

use gridport_catalog::{ArtworkFetch, CatalogClient, GameInfo};
use gridport_core::ExternalGameRef;

/// One search hit offered as a possible match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative {
    pub index: usize,
    pub name: String,
    pub id: u64,
    pub types: Vec<String>,
}

impl Alternative {
    pub fn from_search(results: &[GameInfo]) -> Vec<Self> {
        results
            .iter()
            .enumerate()
            .map(|(index, game)| Self {
                index,
                name: game.name.clone(),
                id: game.id,
                types: game.types.clone(),
            })
            .collect()
    }
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: name: '{}', id: '{}', type: '{:?}'",
            self.index, self.name, self.id, self.types
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedLookup {
    pub game: ExternalGameRef,
    pub alternatives: Vec<Alternative>,
    /// Set when the search itself failed
    pub search_error: Option<String>,
}

impl FailedLookup {
    /// Header line, as logged before the alternatives.
    pub fn summary(&self) -> String {
        format!(
            "Game '{}', id '{}' not found, looking for alternatives...",
            self.game.name, self.game.id
        )
    }

    pub fn log(&self) {
        log::info!("{}", self.summary());
        if let Some(err) = &self.search_error {
            log::info!("searchGame: {err}");
        }
        for alt in &self.alternatives {
            log::info!("{alt}");
        }
    }
}

/// Search the catalog by name for `game`.
pub async fn search_alternatives<F: ArtworkFetch>(
    catalog: &CatalogClient<F>,
    game: ExternalGameRef,
) -> FailedLookup {
    match catalog.search_game(&game.name).await {
        Ok(results) => FailedLookup {
            alternatives: Alternative::from_search(&results),
            game,
            search_error: None,
        },
        Err(e) => FailedLookup {
            game,
            alternatives: Vec::new(),
            search_error: Some(e.to_string()),
        },
    }
}
