use crate::api::{ArtworkFetch, SteamGridDbApi};
use crate::error::CatalogError;
use crate::overrides::LocalOverrideTable;
use crate::resolver::BatchedIdResolver;
use crate::types::{ArtworkKind, ArtworkResponse, GameInfo};

/// Catalog facade used by the importer.
///
/// Every lookup goes through the override table. Multi-id artwork lookups
/// are split per effective id type and merged back in request order.
pub struct CatalogClient<F = SteamGridDbApi> {
    resolver: BatchedIdResolver<F>,
}

impl CatalogClient<SteamGridDbApi> {
    /// Client for the public SteamGridDB API.
    pub fn connect(api_key: &str, overrides: LocalOverrideTable) -> Result<Self, CatalogError> {
        Ok(Self::new(SteamGridDbApi::new(api_key)?, overrides))
    }
}

impl<F: ArtworkFetch> CatalogClient<F> {
    pub fn new(fetch: F, overrides: LocalOverrideTable) -> Self {
        Self {
            resolver: BatchedIdResolver::new(fetch, overrides),
        }
    }

    pub fn overrides(&self) -> &LocalOverrideTable {
        self.resolver.overrides()
    }

    /// The underlying fetcher.
    pub fn fetch(&self) -> &F {
        self.resolver.fetch()
    }

    pub async fn get_grids(
        &self,
        id_type: &str,
        ids: &[String],
        dimensions: &[String],
    ) -> Result<ArtworkResponse, CatalogError> {
        self.resolver
            .resolve_batched(ArtworkKind::Grids, id_type, ids, dimensions)
            .await
    }

    pub async fn get_heroes(
        &self,
        id_type: &str,
        ids: &[String],
        dimensions: &[String],
    ) -> Result<ArtworkResponse, CatalogError> {
        self.resolver
            .resolve_batched(ArtworkKind::Heroes, id_type, ids, dimensions)
            .await
    }

    pub async fn get_logos(
        &self,
        id_type: &str,
        ids: &[String],
        dimensions: &[String],
    ) -> Result<ArtworkResponse, CatalogError> {
        self.resolver
            .resolve_batched(ArtworkKind::Logos, id_type, ids, dimensions)
            .await
    }

    pub async fn get_game(&self, id_type: &str, id: &str) -> Result<GameInfo, CatalogError> {
        self.resolver.resolve_game(id_type, id).await
    }

    /// Free-text search; never consults the override table.
    pub async fn search_game(&self, term: &str) -> Result<Vec<GameInfo>, CatalogError> {
        self.resolver.fetch().search_game(term).await
    }
}
