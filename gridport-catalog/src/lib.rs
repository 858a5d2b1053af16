//! SteamGridDB artwork catalog access.
//!
//! [`CatalogClient`] is the entry point. It wraps an [`ArtworkFetch`]
//! implementation (the HTTP client by default) with local id overrides and
//! per-type request batching.

pub mod api;
pub mod client;
pub mod error;
pub mod overrides;
pub mod resolver;
pub mod types;

pub use api::{ArtworkFetch, SteamGridDbApi};
pub use client::CatalogClient;
pub use error::CatalogError;
pub use overrides::{
    LEGACY_OVERRIDES_FILE, LocalOverrideTable, OVERRIDES_FILE, OverrideEntry,
    default_overrides_path, overrides_path_in,
};
pub use resolver::{
    BATCH_CANONICAL_TYPE, BatchPlan, BatchedIdResolver, GAME_CANONICAL_TYPE, TypeGroup,
};
pub use types::{
    Artwork, ArtworkKind, ArtworkQuery, ArtworkResponse, BatchEntry, GAME_NOT_FOUND, GameInfo,
};
