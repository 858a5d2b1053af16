//! Override-aware batching in front of the catalog.
//!
//! The catalog can only be queried for one id type per request, and it does
//! not know every platform id. Before a multi-id lookup, every id is checked
//! against the [`LocalOverrideTable`]; ids with an override move into the
//! catalog's own id space. The ids are then partitioned by effective type,
//! one request is issued per type, and the answers are stitched back into
//! the order and shape the caller asked for.

use futures::future::join_all;

use crate::api::ArtworkFetch;
use crate::error::CatalogError;
use crate::overrides::LocalOverrideTable;
use crate::types::{ArtworkKind, ArtworkQuery, ArtworkResponse, BatchEntry, GameInfo};

/// Id type for native catalog ids on the single-game endpoint.
pub const GAME_CANONICAL_TYPE: &str = "id";

/// Id type for native catalog ids on the artwork endpoints.
pub const BATCH_CANONICAL_TYPE: &str = "game";

/// Ids sharing one effective type, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeGroup {
    pub id_type: String,
    pub ids: Vec<String>,
}

/// How a request's ids are spread over per-type downstream queries.
///
/// Groups keep insertion order. Each original position remembers its group
/// and its index inside that group, so duplicate ids are answered
/// independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchPlan {
    groups: Vec<TypeGroup>,
    slots: Vec<(usize, usize)>,
}

impl BatchPlan {
    /// Partition `ids` (all of type `id_type`) after applying overrides.
    /// Overridden ids are moved to `canonical_type`.
    pub fn build(
        overrides: &LocalOverrideTable,
        id_type: &str,
        ids: &[String],
        canonical_type: &str,
    ) -> Self {
        let mut plan = Self::default();
        for id in ids {
            let (effective_type, effective_id) = match overrides.lookup(id_type, id) {
                Some(canonical) => (canonical_type, canonical),
                None => (id_type, id.as_str()),
            };
            plan.push(effective_type, effective_id);
        }
        plan
    }

    fn push(&mut self, id_type: &str, id: &str) {
        let group_index = match self.groups.iter().position(|g| g.id_type == id_type) {
            Some(index) => index,
            None => {
                self.groups.push(TypeGroup {
                    id_type: id_type.to_string(),
                    ids: Vec::new(),
                });
                self.groups.len() - 1
            }
        };
        let group = &mut self.groups[group_index];
        group.ids.push(id.to_string());
        self.slots.push((group_index, group.ids.len() - 1));
    }

    pub fn groups(&self) -> &[TypeGroup] {
        &self.groups
    }

    /// Number of ids in the original request.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Effective `(type, id)` for an original position.
    pub fn effective(&self, position: usize) -> Option<(&str, &str)> {
        let &(group, index) = self.slots.get(position)?;
        let group = &self.groups[group];
        Some((group.id_type.as_str(), group.ids[index].as_str()))
    }

    /// Combine one downstream result per group into the caller's shape.
    ///
    /// A single-id request gets its downstream answer back untouched. For
    /// multi-id requests every group is first brought into nested form; a
    /// group that ended up with a single id answered flat and is wrapped,
    /// and a "not found" for such a group becomes a not-found entry rather
    /// than failing its neighbours. Any other failure fails the request.
    pub fn reconcile(
        &self,
        results: Vec<Result<ArtworkResponse, CatalogError>>,
    ) -> Result<ArtworkResponse, CatalogError> {
        if results.len() != self.groups.len() {
            return Err(CatalogError::Api(format!(
                "expected {} group responses, got {}",
                self.groups.len(),
                results.len()
            )));
        }

        if self.slots.len() == 1 {
            return results
                .into_iter()
                .next()
                .unwrap_or_else(|| Err(CatalogError::Api("no response".to_string())));
        }

        let mut per_group = Vec::with_capacity(self.groups.len());
        for (group, result) in self.groups.iter().zip(results) {
            per_group.push(nest(group, result)?);
        }

        let entries = self
            .slots
            .iter()
            .map(|&(group, index)| per_group[group][index].clone())
            .collect();
        Ok(ArtworkResponse::Nested(entries))
    }
}

/// Bring one group's downstream result into one entry per id.
fn nest(
    group: &TypeGroup,
    result: Result<ArtworkResponse, CatalogError>,
) -> Result<Vec<BatchEntry>, CatalogError> {
    let single = group.ids.len() == 1;
    match result {
        Ok(ArtworkResponse::Flat(data)) if single => Ok(vec![BatchEntry::found(data)]),
        Ok(ArtworkResponse::Nested(entries)) if entries.len() == group.ids.len() => Ok(entries),
        Ok(other) => Err(CatalogError::Api(format!(
            "type '{}': expected {} entries, got {}",
            group.id_type,
            group.ids.len(),
            other.len()
        ))),
        Err(CatalogError::NotFound { errors }) if single => {
            Ok(vec![BatchEntry::not_found(errors)])
        }
        Err(e) => Err(e),
    }
}

/// Resolves lookups through the override table before delegating to `F`.
pub struct BatchedIdResolver<F> {
    fetch: F,
    overrides: LocalOverrideTable,
}

impl<F: ArtworkFetch> BatchedIdResolver<F> {
    pub fn new(fetch: F, overrides: LocalOverrideTable) -> Self {
        Self { fetch, overrides }
    }

    pub fn fetch(&self) -> &F {
        &self.fetch
    }

    pub fn overrides(&self) -> &LocalOverrideTable {
        &self.overrides
    }

    /// Look up one game, rewriting an overridden id to the catalog's own id.
    pub async fn resolve_game(&self, id_type: &str, id: &str) -> Result<GameInfo, CatalogError> {
        match self.overrides.lookup(id_type, id) {
            Some(canonical) => {
                log::debug!("{id_type}/{id} overridden to {GAME_CANONICAL_TYPE}/{canonical}");
                self.fetch.fetch_game(GAME_CANONICAL_TYPE, canonical).await
            }
            None => self.fetch.fetch_game(id_type, id).await,
        }
    }

    /// Artwork lookup for `ids`, one downstream request per effective type.
    ///
    /// Returns [`ArtworkResponse::Flat`] for a single id and
    /// [`ArtworkResponse::Nested`] with exactly `ids.len()` entries otherwise,
    /// entry `i` answering `ids[i]`.
    pub async fn resolve_batched(
        &self,
        kind: ArtworkKind,
        id_type: &str,
        ids: &[String],
        dimensions: &[String],
    ) -> Result<ArtworkResponse, CatalogError> {
        let plan = BatchPlan::build(&self.overrides, id_type, ids, BATCH_CANONICAL_TYPE);
        if plan.is_empty() {
            return Ok(ArtworkResponse::Nested(Vec::new()));
        }
        log::debug!(
            "{kind} for {} {id_type} id(s) in {} request(s)",
            plan.len(),
            plan.groups().len()
        );

        let requests = plan.groups().iter().map(|group| {
            let query = ArtworkQuery {
                id_type: group.id_type.clone(),
                ids: group.ids.clone(),
                dimensions: dimensions.to_vec(),
            };
            async move { self.fetch.fetch_artwork(kind, &query).await }
        });
        let results = join_all(requests).await;

        plan.reconcile(results)
    }
}
